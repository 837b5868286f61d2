//! `userbase-admin`: command-line admin panel for Userbase apps.

mod cli;
mod commands;
mod confirm;
mod context;
mod output;
mod timing;

use anyhow::Result;
use clap::Parser as _;

use crate::cli::{Cli, Commands};
use crate::commands::{
    generate_completions, run_delete, run_delete_app, run_purge, run_users,
};
use crate::context::{build_app_users_ctx, load_config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    timing::init_tracing(cli.verbose, cli.timing);

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let config = load_config(cli.api_url.as_deref(), cli.session.as_deref())?;
    let assume_yes = cli.yes;

    match cli.command {
        Commands::Users {
            app,
            deleted,
            expand,
            interactive,
        } => run_users(build_app_users_ctx(&app, &config, assume_yes), deleted, expand, interactive).await,
        Commands::Delete { app, user_ids } => {
            run_delete(build_app_users_ctx(&app, &config, assume_yes), user_ids).await
        }
        Commands::Purge { app, user_ids } => {
            run_purge(build_app_users_ctx(&app, &config, assume_yes), user_ids).await
        }
        Commands::DeleteApp { app } => {
            run_delete_app(build_app_users_ctx(&app, &config, assume_yes)).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}
