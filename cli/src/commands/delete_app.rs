//! `delete-app`: remove an app and all of its users.

use anyhow::{Result, bail};
use tracing::instrument;
use userbase_business::{AppDeletion, AppUsersCtx, DispatchOutcome};

use crate::output::Output;

#[instrument(skip_all, name = "delete_app", fields(app = %ctx.state().app_name()))]
pub async fn run_delete_app(mut ctx: AppUsersCtx) -> Result<()> {
    let out = Output::new();
    let app_name = ctx.state().app_name();

    match ctx.delete_app() {
        DispatchOutcome::Started(task) => tracing::debug!(%task, "delete app {app_name} started"),
        DispatchOutcome::Declined => {
            out.dim("Cancelled.");
            return Ok(());
        }
        outcome => bail!("Could not start deleting app {app_name}: {outcome:?}"),
    }

    ctx.settle().await;
    let deletion = ctx.state().app_deletion();
    let error = ctx.state().error().map(ToString::to_string);
    ctx.dispose();

    match (deletion, error) {
        (AppDeletion::Deleted, _) => {
            out.success(format!("Deleted app {app_name}"));
            Ok(())
        }
        (_, Some(message)) => bail!("Failed to delete app {app_name}: {message}"),
        (_, None) => bail!("Deleting app {app_name} did not complete"),
    }
}
