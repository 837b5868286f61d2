//! Yes/no confirmation asked before every destructive operation.

use ustr::Ustr;

/// What the user is being asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    DeleteApp { app_name: Ustr },
    DeleteUser { username: String },
    PermanentlyDeleteUser { username: String },
}

impl ConfirmPrompt {
    pub fn message(&self) -> String {
        match self {
            Self::DeleteApp { app_name } => {
                format!("Are you sure you want to delete app '{app_name}'?")
            }
            Self::DeleteUser { username } => {
                format!("Are you sure you want to delete user '{username}'?")
            }
            Self::PermanentlyDeleteUser { username } => format!(
                "Are you sure you want to permanently delete user '{username}'? There is no guarantee the account can be recovered after this."
            ),
        }
    }
}

impl std::fmt::Display for ConfirmPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// External yes/no collaborator. Returning `false` cancels the operation
/// without recording an error.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

impl<T: ConfirmationGate + ?Sized> ConfirmationGate for std::sync::Arc<T> {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        (**self).confirm(prompt)
    }
}

/// Accepts everything. Used for non-interactive runs (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl ConfirmationGate for AutoConfirm {
    fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        true
    }
}
