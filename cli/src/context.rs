//! Configuration and `AppUsersCtx` construction for the commands.

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use tracing::instrument;
use userbase_business::{
    AppUsersCtx, AppUsersLoad, AutoConfirm, BusinessConfig, HttpAccountService,
};

use crate::confirm::InquireGate;

/// Config variables for the values clap resolved from flags or the environment.
fn config_vars<'a>(api_url: Option<&'a str>, session: Option<&'a str>) -> Vec<(&'static str, &'a str)> {
    [
        (BusinessConfig::API_BASE_URL_VAR, api_url),
        (BusinessConfig::ADMIN_SESSION_ID_VAR, session),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| (name, v)))
    .collect()
}

pub fn load_config(api_url: Option<&str>, session: Option<&str>) -> Result<BusinessConfig> {
    let config =
        BusinessConfig::from_vars(config_vars(api_url, session)).context("Invalid configuration")?;
    if config.admin_session_id().is_none() {
        tracing::warn!(
            "no admin session id configured; set {} or pass --session",
            BusinessConfig::ADMIN_SESSION_ID_VAR
        );
    }
    Ok(config)
}

/// Build the store for `app`. `assume_yes` skips every confirmation prompt.
pub fn build_app_users_ctx(app: &str, config: &BusinessConfig, assume_yes: bool) -> AppUsersCtx {
    let service = Arc::new(HttpAccountService::new(config));
    if assume_yes {
        AppUsersCtx::new(app, service, AutoConfirm)
    } else {
        AppUsersCtx::new(app, service, InquireGate)
    }
}

/// Fetch the user list and wait for it.
#[instrument(skip_all, name = "load_users", fields(app = %ctx.state().app_name()))]
pub async fn load_users(ctx: &mut AppUsersCtx) -> Result<()> {
    ctx.load();
    ctx.settle().await;

    match ctx.state().load() {
        AppUsersLoad::Loaded => Ok(()),
        AppUsersLoad::Failed(message) => {
            bail!("Failed to load users of {}: {message}", ctx.state().app_name())
        }
        AppUsersLoad::Idle | AppUsersLoad::Loading => bail!("Loading users did not complete"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_are_left_out() {
        assert_eq!(
            config_vars(Some("http://localhost:9000"), None),
            vec![("USERBASE_API_BASE_URL", "http://localhost:9000")]
        );
        assert!(config_vars(None, None).is_empty());
    }

    #[test]
    fn defaults_without_values() {
        let config = load_config(None, None).expect("defaults are valid");

        assert_eq!(config.api_base_url(), BusinessConfig::DEFAULT_API_BASE_URL);
        assert!(config.admin_session_id().is_none());
    }

    #[test]
    fn values_build_config() {
        let config = load_config(Some("http://localhost:9000/"), Some("s-1")).expect("valid values");

        assert_eq!(config.api_base_url(), "http://localhost:9000");
        assert_eq!(config.admin_session_id(), Some("s-1"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = load_config(Some("localhost:9000"), None).expect_err("no scheme");
        assert_eq!(err.to_string(), "Invalid configuration");
    }
}
