//! Terminal confirmation prompts.

use inquire::Confirm;
use userbase_business::{ConfirmPrompt, ConfirmationGate};

/// Asks on the terminal; anything but an explicit yes is a no.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquireGate;

impl ConfirmationGate for InquireGate {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        match Confirm::new(&prompt.message()).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!("confirmation prompt failed: {err}");
                false
            }
        }
    }
}
