use crate::api::gemini::DEFAULT_REQUEST_TIMEOUT;
use crate::cli::Cli;
use crate::error::{ChatError, Result};
use crate::error_ext::ResultExt;
use crate::model_config::ModelId;
use crate::ui::UI;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = ".gemini-chat";
const CONFIG_FILE: &str = "config.toml";
const SECRETS_FILE: &str = "secrets.toml";
const API_KEY_NAME: &str = "GOOGLE_API_KEY";

/// What happens to the transcript when the selected model changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChangePolicy {
    /// Start over with an empty transcript and an unseeded session
    #[default]
    Clear,
    /// Keep the transcript and seed the new session with it
    Preserve,
}

/// Optional settings read from `.gemini-chat/config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: Option<ModelId>,
    pub model_change_policy: Option<ModelChangePolicy>,
    pub api_base: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(workspace: &Path) -> Result<Self> {
        let path = config_dir(workspace).join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if config.request_timeout_secs == Some(0) {
            return Err(ChatError::Configuration(format!(
                "request_timeout_secs in {} must be greater than 0",
                path.display()
            )));
        }
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

/// Effective settings after merging CLI flags over the config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub model: ModelId,
    pub policy: ModelChangePolicy,
    pub api_base: Option<String>,
    pub request_timeout: Duration,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let policy = if cli.preserve_history {
            ModelChangePolicy::Preserve
        } else {
            file.model_change_policy.unwrap_or_default()
        };

        Self {
            model: cli.model.or(file.model).unwrap_or_default(),
            policy,
            api_base: cli.api_base.clone().or(file.api_base),
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

fn config_dir(workspace: &Path) -> PathBuf {
    workspace.join(CONFIG_DIR)
}

/// Reads the API key from `.gemini-chat/secrets.toml`, if present
pub fn load_secret_api_key(workspace: &Path) -> Result<Option<String>> {
    let path = config_dir(workspace).join(SECRETS_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let secrets: toml::Table = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(secrets
        .get(API_KEY_NAME)
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string))
}

/// Finds a credential: flag or environment, then the secrets file, then an
/// interactive prompt when attached to a terminal.
pub fn resolve_api_key(cli_key: Option<&str>, workspace: &Path) -> Result<String> {
    if let Some(key) = cli_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    match load_secret_api_key(workspace) {
        Ok(Some(key)) => return Ok(key),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable secrets file");
            UI::print_warning(&format!("Could not load API key from secrets file: {}", e));
        }
    }

    if std::io::stdin().is_terminal() {
        if let Some(key) = UI::read_secret("Google AI Studio API key: ")? {
            return Ok(key);
        }
    }

    Err(ChatError::Configuration(format!(
        "{} not found. Please set it as an environment variable, use --api-key, or add it to {}/{}",
        API_KEY_NAME, CONFIG_DIR, SECRETS_FILE
    )))
}
