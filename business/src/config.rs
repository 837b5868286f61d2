use serde::Deserialize;

/// Where the admin API lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    api_base_url: String,
    /// Admin session id, sent as the `adminSessionId` cookie when present.
    admin_session_id: Option<String>,
}

// Environment variables, before defaults are applied.
#[derive(Deserialize)]
struct RawConfig {
    userbase_api_base_url: Option<String>,
    userbase_admin_session_id: Option<String>,
}

impl BusinessConfig {
    pub const DEFAULT_API_BASE_URL: &'static str = "https://v1.userbase.com/v1";
    pub const API_BASE_URL_VAR: &'static str = "USERBASE_API_BASE_URL";
    pub const ADMIN_SESSION_ID_VAR: &'static str = "USERBASE_ADMIN_SESSION_ID";

    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            admin_session_id: None,
        }
    }

    pub fn with_admin_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.admin_session_id = Some(session_id.into());
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn admin_session_id(&self) -> Option<&str> {
        self.admin_session_id.as_deref()
    }

    /// Reads `USERBASE_API_BASE_URL` and `USERBASE_ADMIN_SESSION_ID`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect();
        let raw: RawConfig = serde_env::from_iter(vars)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            userbase_api_base_url,
            userbase_admin_session_id,
        } = raw;

        let api_base_url = match userbase_api_base_url {
            Some(url) if url.trim().is_empty() => {
                anyhow::bail!("USERBASE_API_BASE_URL is set but empty")
            }
            Some(url) => {
                log::debug!("using USERBASE_API_BASE_URL={url}");
                url
            }
            None => Self::DEFAULT_API_BASE_URL.to_owned(),
        };

        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            anyhow::bail!("USERBASE_API_BASE_URL must be an http(s) URL, got {api_base_url}");
        }

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_owned(),
            admin_session_id: userbase_admin_session_id.filter(|id| !id.trim().is_empty()),
        })
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_API_BASE_URL)
    }
}
