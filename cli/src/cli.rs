use clap::{Parser, Subcommand};
use clap_complete::Shell;
use userbase_business::BusinessConfig;

#[derive(Parser)]
#[command(name = "userbase-admin")]
#[command(about = "Manage the users of a Userbase app", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Admin API base URL
    #[arg(long, global = true, env = BusinessConfig::API_BASE_URL_VAR)]
    pub api_url: Option<String>,

    /// Admin session id
    #[arg(long, global = true, env = BusinessConfig::ADMIN_SESSION_ID_VAR, hide_env_values = true)]
    pub session: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the users of an app
    Users {
        /// App name
        app: String,

        /// Also show users pending deletion
        #[arg(long, short = 'd')]
        deleted: bool,

        /// Show email and profiles of every user (implies --deleted)
        #[arg(long, short = 'e')]
        expand: bool,

        /// Interactive mode (select users to inspect or delete)
        #[arg(long, short = 'I')]
        interactive: bool,
    },
    /// Mark users as deleted
    Delete {
        /// App name
        app: String,

        /// User ids to delete
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
    /// Permanently delete users that are already marked as deleted
    Purge {
        /// App name
        app: String,

        /// User ids to purge
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
    /// Delete an app and all of its users
    DeleteApp {
        /// App name
        app: String,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
