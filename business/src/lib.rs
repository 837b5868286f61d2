//! Business layer for the Userbase admin tools.
//!
//! Everything a front end needs to list an app's users and delete them,
//! without any rendering: see [`app_users`].

pub mod app_users;
mod config;

#[cfg(test)]
mod test_utils;

pub use app_users::{
    AccountService, AppDeletion, AppUsersActionKind, AppUsersCtx, AppUsersError, AppUsersLoad,
    AppUsersState, AutoConfirm, ChronoDateFormatter, ConfirmPrompt, ConfirmationGate,
    DateFormatter, DispatchOutcome, HttpAccountService, PendingOperation, ServiceError,
    UserRecord,
};
pub use config::BusinessConfig;
