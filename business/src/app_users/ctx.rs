//! Drives an [`AppUsersState`] against an [`AccountService`].
//!
//! Each dispatch method checks eligibility, asks the confirmation gate for
//! destructive operations, flips the busy flag synchronously, then spawns
//! the service call. Results come back as [`AppUsersEvent`]s and are applied
//! on [`AppUsersCtx::sync`] / [`AppUsersCtx::settle`].

use std::sync::Arc;

use userbase_states::{StateCtx, TaskId};
use ustr::Ustr;

use super::api::AccountService;
use super::confirm::{ConfirmPrompt, ConfirmationGate};
use super::format::{ChronoDateFormatter, DateFormatter};
use super::record::UserRecord;
use super::state::{
    ActionRejection, AppDeletion, AppUsersActionKind, AppUsersEvent, AppUsersState, ListedUsers,
};

/// What a dispatch call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A service call was spawned.
    Started(TaskId),
    /// The confirmation gate said no.
    Declined,
    /// The record already has an operation in flight.
    Busy,
    /// No such record in the list the operation applies to.
    NotFound,
    /// Nothing to do in the current state (already loaded, app deletion in flight).
    Ignored,
    /// The context has been torn down.
    Disposed,
}

impl DispatchOutcome {
    pub fn is_started(self) -> bool {
        matches!(self, Self::Started(_))
    }
}

pub struct AppUsersCtx {
    ctx: StateCtx<AppUsersState>,
    service: Arc<dyn AccountService>,
    formatter: Arc<dyn DateFormatter>,
    gate: Box<dyn ConfirmationGate>,
}

impl AppUsersCtx {
    pub fn new(
        app_name: impl Into<Ustr>,
        service: Arc<dyn AccountService>,
        gate: impl ConfirmationGate + 'static,
    ) -> Self {
        Self {
            ctx: StateCtx::new(AppUsersState::new(app_name)),
            service,
            formatter: Arc::new(ChronoDateFormatter::default()),
            gate: Box::new(gate),
        }
    }

    pub fn with_formatter(mut self, formatter: impl DateFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn state(&self) -> &AppUsersState {
        self.ctx.state()
    }

    /// Service calls spawned and not yet settled.
    pub fn pending_tasks(&self) -> usize {
        self.ctx.task_count()
    }

    // =====================
    // Service-backed operations
    // =====================

    /// Fetch the user list. Only from `Idle` or after a failed load.
    pub fn load(&mut self) -> DispatchOutcome {
        if self.ctx.is_disposed() {
            return DispatchOutcome::Disposed;
        }
        if !self.ctx.update(AppUsersState::begin_load) {
            log::debug!("load ignored: {:?}", self.ctx.state().load());
            return DispatchOutcome::Ignored;
        }

        let service = Arc::clone(&self.service);
        let formatter = Arc::clone(&self.formatter);
        let app_name = self.ctx.state().app_name();

        self.spawn("list users", move |updater| async move {
            let result = service.list_users(&app_name).await.map(|response| ListedUsers {
                app_id: response.app_id,
                users: response
                    .users
                    .into_iter()
                    .map(|item| UserRecord::from_item(item, formatter.as_ref()))
                    .collect(),
            });
            if updater.set(AppUsersEvent::Listed(result)).is_err() {
                log::debug!("user list for {app_name} arrived after teardown; discarded");
            }
        })
    }

    /// Move an active user to the pending-deletion list.
    pub fn delete_user(&mut self, user_id: impl Into<Ustr>) -> DispatchOutcome {
        self.user_action(AppUsersActionKind::DeleteUser, user_id.into())
    }

    /// Purge a pending-deletion user.
    pub fn permanently_delete_user(&mut self, user_id: impl Into<Ustr>) -> DispatchOutcome {
        self.user_action(AppUsersActionKind::PermanentlyDeleteUser, user_id.into())
    }

    fn user_action(&mut self, kind: AppUsersActionKind, user_id: Ustr) -> DispatchOutcome {
        if self.ctx.is_disposed() {
            return DispatchOutcome::Disposed;
        }

        let prompt = match self.ctx.state().check_user_action(kind, user_id) {
            Ok(record) => kind.prompt(record.username()),
            Err(rejection) => return rejection.into(),
        };
        if !self.gate.confirm(&prompt) {
            log::debug!("{} {user_id} declined", kind.label());
            return DispatchOutcome::Declined;
        }

        let username = match self.ctx.update(|s| s.begin_user_action(kind, user_id)) {
            Ok(username) => username,
            Err(rejection) => return rejection.into(),
        };

        let service = Arc::clone(&self.service);
        let app_name = self.ctx.state().app_name();

        self.spawn(kind.label(), move |updater| async move {
            let result = match kind {
                AppUsersActionKind::DeleteUser => {
                    service
                        .delete_user(user_id.as_str(), app_name.as_str(), &username)
                        .await
                }
                AppUsersActionKind::PermanentlyDeleteUser => {
                    service
                        .permanently_delete_user(user_id.as_str(), app_name.as_str(), &username)
                        .await
                }
            };
            let event = AppUsersEvent::UserAction {
                kind,
                user_id,
                result,
            };
            if updater.set(event).is_err() {
                log::debug!("{} {user_id} finished after teardown; discarded", kind.label());
            }
        })
    }

    /// Delete the whole app. Watch [`AppUsersState::app_deletion`] for the result.
    pub fn delete_app(&mut self) -> DispatchOutcome {
        if self.ctx.is_disposed() {
            return DispatchOutcome::Disposed;
        }
        if self.ctx.state().app_deletion() != AppDeletion::Idle {
            return DispatchOutcome::Ignored;
        }

        let app_name = self.ctx.state().app_name();
        if !self.gate.confirm(&ConfirmPrompt::DeleteApp { app_name }) {
            log::debug!("delete app {app_name} declined");
            return DispatchOutcome::Declined;
        }
        if !self.ctx.update(AppUsersState::begin_app_deletion) {
            return DispatchOutcome::Ignored;
        }

        let service = Arc::clone(&self.service);
        self.spawn("delete app", move |updater| async move {
            let result = service.delete_app(app_name.as_str()).await;
            if updater.set(AppUsersEvent::AppDeleted(result)).is_err() {
                log::debug!("delete app {app_name} finished after teardown; discarded");
            }
        })
    }

    fn spawn<F, Fut>(&mut self, key: &str, task: F) -> DispatchOutcome
    where
        F: FnOnce(userbase_states::Updater<AppUsersEvent>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        match self.ctx.spawn(key, task) {
            Ok(handle) => DispatchOutcome::Started(handle.id()),
            Err(_disposed) => DispatchOutcome::Disposed,
        }
    }

    // =====================
    // Synchronous toggles
    // =====================

    pub fn toggle_metadata(&mut self, user_id: impl Into<Ustr>) -> bool {
        let user_id = user_id.into();
        self.ctx.update(|s| s.toggle_metadata(user_id))
    }

    pub fn expand_all(&mut self) {
        self.ctx.update(AppUsersState::expand_all);
    }

    pub fn collapse_all(&mut self) {
        self.ctx.update(AppUsersState::collapse_all);
    }

    pub fn show_deleted_users(&mut self) {
        self.ctx.update(AppUsersState::show_deleted_users);
    }

    pub fn hide_deleted_users(&mut self) {
        self.ctx.update(AppUsersState::hide_deleted_users);
    }

    pub fn clear_error(&mut self) {
        self.ctx.update(AppUsersState::clear_error);
    }

    // =====================
    // Completion handling
    // =====================

    /// Apply completions that have already arrived.
    pub fn sync(&mut self) -> usize {
        self.ctx.sync()
    }

    /// Wait for one service call to finish and apply its result.
    pub async fn settle_one(&mut self) -> bool {
        self.ctx.settle_one().await
    }

    /// Wait for every spawned call and apply the results in completion order.
    pub async fn settle(&mut self) {
        self.ctx.settle().await;
    }

    /// Stop accepting completions. In-flight calls are not cancelled.
    pub fn dispose(&mut self) {
        self.ctx.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.ctx.is_disposed()
    }
}

impl From<ActionRejection> for DispatchOutcome {
    fn from(rejection: ActionRejection) -> Self {
        match rejection {
            ActionRejection::NotFound => Self::NotFound,
            ActionRejection::Busy => Self::Busy,
        }
    }
}

impl std::fmt::Debug for AppUsersCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppUsersCtx")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}
