//! Command implementations for the admin CLI.
//!
//! Each subcommand is implemented in its own module.

pub mod completions;
pub mod delete;
pub mod delete_app;
pub mod users;

pub use completions::generate_completions;
pub use delete::{run_delete, run_purge};
pub use delete_app::run_delete_app;
pub use users::run_users;
