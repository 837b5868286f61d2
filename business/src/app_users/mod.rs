//! App users domain module.
//!
//! Holds one application's users in two lists (active and pending deletion)
//! and drives the destructive admin operations on them:
//! - [`AppUsersState`]: the synchronous store, one transition per method
//! - [`AppUsersCtx`]: confirmation, busy flags, service calls, teardown
//! - [`AccountService`] / [`HttpAccountService`]: the admin API boundary

pub mod api;
pub mod confirm;
pub mod ctx;
pub mod format;
pub mod record;
pub mod state;

pub use api::{AccountService, HttpAccountService, ServiceError, ServiceResult, UNKNOWN_ERROR};
pub use confirm::{AutoConfirm, ConfirmPrompt, ConfirmationGate};
pub use ctx::{AppUsersCtx, DispatchOutcome};
pub use format::{ChronoDateFormatter, DateFormatter};
pub use record::{
    AppUserItem, DeleteAppRequest, ListAppUsersResponse, PendingOperation, Profile,
    UserActionRequest, UserRecord,
};
pub use state::{
    ActionRejection, AppDeletion, AppUsersActionKind, AppUsersError, AppUsersEvent, AppUsersLoad,
    AppUsersState, ListedUsers,
};
