//! The app users store: two ordered lists and the transitions between them.
//!
//! Everything here is synchronous. `AppUsersCtx` sets busy flags through
//! these methods, runs the network call, and feeds the outcome back as an
//! [`AppUsersEvent`]. Every completion re-locates its record by `user_id`;
//! list positions are never remembered across a suspension point.
//!
//! Ordering: both lists are kept newest first by `creation_date`. Load sorts
//! once (stable, so equal dates keep server order); after that records are
//! moved in one at a time at the position that preserves the order.

use ustr::Ustr;
use userbase_states::State;

use super::api::ServiceError;
use super::confirm::ConfirmPrompt;
use super::record::{PendingOperation, UserRecord};

/// Status of the one-shot list load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppUsersLoad {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Status of the whole-app deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppDeletion {
    #[default]
    Idle,
    InFlight,
    /// The app is gone; the caller should navigate away.
    Deleted,
}

/// Per-user destructive actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppUsersActionKind {
    /// Active → pending deletion.
    DeleteUser,
    /// Pending deletion → gone.
    PermanentlyDeleteUser,
}

impl AppUsersActionKind {
    pub fn pending_operation(self) -> PendingOperation {
        match self {
            Self::DeleteUser => PendingOperation::Deleting,
            Self::PermanentlyDeleteUser => PendingOperation::PermanentlyDeleting,
        }
    }

    pub fn prompt(self, username: impl Into<String>) -> ConfirmPrompt {
        let username = username.into();
        match self {
            Self::DeleteUser => ConfirmPrompt::DeleteUser { username },
            Self::PermanentlyDeleteUser => ConfirmPrompt::PermanentlyDeleteUser { username },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DeleteUser => "delete user",
            Self::PermanentlyDeleteUser => "permanently delete user",
        }
    }
}

/// Why a per-user action was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRejection {
    /// No record with that id in the list the action applies to.
    NotFound,
    /// The record already has an operation in flight.
    Busy,
}

/// Error banner content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppUsersError {
    /// The initial list call failed; both lists stay empty.
    #[error("{0}")]
    Load(String),

    /// A single delete / permanent delete failed; the record was left as it was.
    #[error("{message}")]
    Mutation {
        kind: AppUsersActionKind,
        user_id: Ustr,
        message: String,
    },

    #[error("{0}")]
    DeleteApp(String),
}

/// Result of `list_users`, already converted to records.
#[derive(Debug, Clone)]
pub struct ListedUsers {
    pub app_id: String,
    pub users: Vec<UserRecord>,
}

/// Completions sent back by service tasks.
#[derive(Debug, Clone)]
pub enum AppUsersEvent {
    Listed(Result<ListedUsers, ServiceError>),
    UserAction {
        kind: AppUsersActionKind,
        user_id: Ustr,
        result: Result<(), ServiceError>,
    },
    AppDeleted(Result<(), ServiceError>),
}

/// Users of one app, split into active and pending-deletion lists.
#[derive(Debug, Clone, Default)]
pub struct AppUsersState {
    app_name: Ustr,
    app_id: Option<String>,
    load: AppUsersLoad,

    active_users: Vec<UserRecord>,
    deleted_users: Vec<UserRecord>,
    show_deleted_users: bool,

    error: Option<AppUsersError>,
    app_deletion: AppDeletion,
}

fn position(users: &[UserRecord], user_id: Ustr) -> Option<usize> {
    users.iter().position(|u| u.user_id() == user_id)
}

/// Newest first; stable, so equal dates keep their relative order.
fn sort_newest_first(users: &mut [UserRecord]) {
    users.sort_by(|a, b| b.creation_date().cmp(&a.creation_date()));
}

/// Insert before the first record created strictly earlier, or append.
fn insert_by_creation_date(users: &mut Vec<UserRecord>, record: UserRecord) {
    let at = users
        .iter()
        .position(|u| record.creation_date() > u.creation_date())
        .unwrap_or(users.len());
    users.insert(at, record);
}

impl AppUsersState {
    pub fn new(app_name: impl Into<Ustr>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    // =====================
    // Reads
    // =====================

    pub fn app_name(&self) -> Ustr {
        self.app_name
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn load(&self) -> &AppUsersLoad {
        &self.load
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, AppUsersLoad::Loading)
    }

    pub fn active_users(&self) -> &[UserRecord] {
        &self.active_users
    }

    pub fn deleted_users(&self) -> &[UserRecord] {
        &self.deleted_users
    }

    pub fn is_showing_deleted_users(&self) -> bool {
        self.show_deleted_users
    }

    pub fn error(&self) -> Option<&AppUsersError> {
        self.error.as_ref()
    }

    pub fn app_deletion(&self) -> AppDeletion {
        self.app_deletion
    }

    pub fn has_users(&self) -> bool {
        !self.active_users.is_empty() || !self.deleted_users.is_empty()
    }

    /// Looks in both lists; a record is never in both.
    pub fn find(&self, user_id: impl Into<Ustr>) -> Option<&UserRecord> {
        let user_id = user_id.into();
        self.active_users
            .iter()
            .chain(self.deleted_users.iter())
            .find(|u| u.user_id() == user_id)
    }

    pub fn is_busy(&self, user_id: impl Into<Ustr>) -> bool {
        self.find(user_id).is_some_and(UserRecord::is_busy)
    }

    /// Records with a destructive call in flight.
    pub fn in_flight_count(&self) -> usize {
        self.active_users
            .iter()
            .chain(self.deleted_users.iter())
            .filter(|u| u.is_busy())
            .count()
    }

    /// `"1 user"` / `"3 users"`, counting active users only.
    pub fn user_count_label(&self) -> String {
        let count = self.active_users.len();
        format!("{count} user{}", if count == 1 { "" } else { "s" })
    }

    // =====================
    // Load
    // =====================

    /// Marks the load as started. Only allowed from `Idle` or `Failed`.
    pub fn begin_load(&mut self) -> bool {
        match self.load {
            AppUsersLoad::Idle | AppUsersLoad::Failed(_) => {
                self.load = AppUsersLoad::Loading;
                self.error = None;
                true
            }
            AppUsersLoad::Loading | AppUsersLoad::Loaded => false,
        }
    }

    /// Partition by `deleted` and sort each list once.
    pub fn apply_loaded(&mut self, listed: ListedUsers) {
        let (mut deleted, mut active): (Vec<_>, Vec<_>) =
            listed.users.into_iter().partition(UserRecord::is_deleted);
        sort_newest_first(&mut active);
        sort_newest_first(&mut deleted);

        log::debug!(
            "loaded app {} ({} active, {} pending deletion)",
            self.app_name,
            active.len(),
            deleted.len()
        );

        self.app_id = Some(listed.app_id);
        self.active_users = active;
        self.deleted_users = deleted;
        self.load = AppUsersLoad::Loaded;
    }

    pub fn fail_load(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("loading users of {} failed: {message}", self.app_name);
        self.active_users.clear();
        self.deleted_users.clear();
        self.load = AppUsersLoad::Failed(message.clone());
        self.error = Some(AppUsersError::Load(message));
    }

    // =====================
    // Per-user actions
    // =====================

    fn list_for(&self, kind: AppUsersActionKind) -> &[UserRecord] {
        match kind {
            AppUsersActionKind::DeleteUser => &self.active_users,
            AppUsersActionKind::PermanentlyDeleteUser => &self.deleted_users,
        }
    }

    fn list_for_mut(&mut self, kind: AppUsersActionKind) -> &mut Vec<UserRecord> {
        match kind {
            AppUsersActionKind::DeleteUser => &mut self.active_users,
            AppUsersActionKind::PermanentlyDeleteUser => &mut self.deleted_users,
        }
    }

    /// Whether `kind` could start on `user_id` right now.
    pub fn check_user_action(
        &self,
        kind: AppUsersActionKind,
        user_id: Ustr,
    ) -> Result<&UserRecord, ActionRejection> {
        let record = self
            .list_for(kind)
            .iter()
            .find(|u| u.user_id() == user_id)
            .ok_or(ActionRejection::NotFound)?;
        if record.is_busy() {
            return Err(ActionRejection::Busy);
        }
        Ok(record)
    }

    /// Set the busy flag. Returns the username the service call needs.
    pub fn begin_user_action(
        &mut self,
        kind: AppUsersActionKind,
        user_id: Ustr,
    ) -> Result<String, ActionRejection> {
        let list = self.list_for_mut(kind);
        let record = list
            .iter_mut()
            .find(|u| u.user_id() == user_id)
            .ok_or(ActionRejection::NotFound)?;
        if record.is_busy() {
            return Err(ActionRejection::Busy);
        }
        record.pending_operation = kind.pending_operation();
        record.last_error = None;
        Ok(record.username().to_owned())
    }

    pub fn complete_user_action(&mut self, kind: AppUsersActionKind, user_id: Ustr) {
        match kind {
            AppUsersActionKind::DeleteUser => self.complete_delete(user_id),
            AppUsersActionKind::PermanentlyDeleteUser => self.complete_permanent_delete(user_id),
        }
    }

    fn complete_delete(&mut self, user_id: Ustr) {
        let Some(index) = position(&self.active_users, user_id) else {
            log::warn!("deleted user {user_id} is no longer in the active list");
            return;
        };

        let mut record = self.active_users.remove(index);
        record.deleted = true;
        record.pending_operation = PendingOperation::None;
        insert_by_creation_date(&mut self.deleted_users, record);
    }

    fn complete_permanent_delete(&mut self, user_id: Ustr) {
        let Some(index) = position(&self.deleted_users, user_id) else {
            log::warn!("permanently deleted user {user_id} is no longer in the deleted list");
            return;
        };
        self.deleted_users.remove(index);
    }

    /// Clear the busy flag and record the error, both on the record and in the
    /// banner. The record stays where it is.
    pub fn fail_user_action(
        &mut self,
        kind: AppUsersActionKind,
        user_id: Ustr,
        message: impl Into<String>,
    ) {
        let message = message.into();
        log::warn!("{} {user_id} failed: {message}", kind.label());

        if let Some(record) = self
            .list_for_mut(kind)
            .iter_mut()
            .find(|u| u.user_id() == user_id)
        {
            record.pending_operation = PendingOperation::None;
            record.last_error = Some(message.clone());
        }

        self.error = Some(AppUsersError::Mutation {
            kind,
            user_id,
            message,
        });
    }

    // =====================
    // App deletion
    // =====================

    pub fn begin_app_deletion(&mut self) -> bool {
        if self.app_deletion != AppDeletion::Idle {
            return false;
        }
        self.app_deletion = AppDeletion::InFlight;
        true
    }

    pub fn complete_app_deletion(&mut self) {
        self.app_deletion = AppDeletion::Deleted;
    }

    pub fn fail_app_deletion(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("deleting app {} failed: {message}", self.app_name);
        self.app_deletion = AppDeletion::Idle;
        self.error = Some(AppUsersError::DeleteApp(message));
    }

    // =====================
    // Presentation toggles
    // =====================

    /// Flip metadata visibility of one record. Returns `false` if unknown.
    ///
    /// Allowed while the record is busy; the flag moves with the record.
    pub fn toggle_metadata(&mut self, user_id: impl Into<Ustr>) -> bool {
        let user_id = user_id.into();
        match self
            .active_users
            .iter_mut()
            .chain(self.deleted_users.iter_mut())
            .find(|u| u.user_id() == user_id)
        {
            Some(record) => {
                record.display_metadata_expanded = !record.display_metadata_expanded;
                true
            }
            None => false,
        }
    }

    fn set_all_metadata(&mut self, expanded: bool) {
        for record in self
            .active_users
            .iter_mut()
            .chain(self.deleted_users.iter_mut())
        {
            record.display_metadata_expanded = expanded;
        }
        self.show_deleted_users = expanded;
    }

    /// Expand every record and show the deleted list.
    pub fn expand_all(&mut self) {
        self.set_all_metadata(true);
    }

    /// Collapse every record and hide the deleted list.
    pub fn collapse_all(&mut self) {
        self.set_all_metadata(false);
    }

    pub fn show_deleted_users(&mut self) {
        self.show_deleted_users = true;
    }

    pub fn hide_deleted_users(&mut self) {
        self.show_deleted_users = false;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

impl State for AppUsersState {
    type Event = AppUsersEvent;

    fn apply(&mut self, event: AppUsersEvent) {
        match event {
            AppUsersEvent::Listed(Ok(listed)) => self.apply_loaded(listed),
            AppUsersEvent::Listed(Err(err)) => self.fail_load(err.to_string()),
            AppUsersEvent::UserAction {
                kind,
                user_id,
                result: Ok(()),
            } => self.complete_user_action(kind, user_id),
            AppUsersEvent::UserAction {
                kind,
                user_id,
                result: Err(err),
            } => self.fail_user_action(kind, user_id, err.to_string()),
            AppUsersEvent::AppDeleted(Ok(())) => self.complete_app_deletion(),
            AppUsersEvent::AppDeleted(Err(err)) => self.fail_app_deletion(err.to_string()),
        }
    }
}
