//! Configuration loading: service settings and the report configuration file.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Deserializer, Serialize};
use tr_core::{Config, ConfigFile};
use tr_toggl::{ClientOptions, DEFAULT_BASE_URL};

/// Service connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Toggl API token.
    #[serde(default, deserialize_with = "lenient_string")]
    pub api_token: Option<String>,
    /// Workspace to report on.
    #[serde(default, deserialize_with = "lenient_string")]
    pub workspace_id: Option<String>,
    /// Sent as the `user_agent` query parameter.
    pub user_agent: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("workspace_id", &self.workspace_id)
            .field("user_agent", &self.user_agent)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_token: None,
            workspace_id: None,
            user_agent: "toggl-report".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Settings {
    /// Loads settings, optionally from a specific file.
    ///
    /// Later sources win: defaults, `~/.config/toggl-report/config.toml`,
    /// the given file, then `TOGGL_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(settings_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = settings_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("TOGGL_"));

        figment.extract()
    }

    /// Splits the settings into the token and the client options.
    pub fn client_parts(&self) -> Result<(String, ClientOptions)> {
        let api_token = self
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("missing Toggl API token (set TOGGL_API_TOKEN or api_token)"))?;
        let workspace_id = self
            .workspace_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                anyhow!("missing Toggl workspace id (set TOGGL_WORKSPACE_ID or workspace_id)")
            })?;

        Ok((
            api_token.to_string(),
            ClientOptions {
                base_url: self.base_url.clone(),
                workspace_id: workspace_id.to_string(),
                user_agent: self.user_agent.clone(),
                timeout: Duration::from_secs(self.timeout_secs),
            },
        ))
    }
}

/// Accepts strings and bare numbers, since environment values like
/// `TOGGL_WORKSPACE_ID=123` arrive as integers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Unsigned(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Int(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    }))
}

/// Returns the platform-specific config directory for toggl-report.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("toggl-report"))
}

/// Reads and validates the JSON report configuration.
pub fn load_report_config(path: &Path) -> Result<Config> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            bail!("configuration file \"{}\" not found", path.display());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let file: ConfigFile = serde_json::from_str(&text)
        .map_err(|err| anyhow!("error reading JSON settings file: {err}"))?;
    file.resolve()
        .with_context(|| format!("invalid configuration in {}", path.display()))
}
