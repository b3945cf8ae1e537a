use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_VERSION: u64 = 1;

/// Environment overrides, checked after the config file is read.
const ENV_REMOTE_URL: &str = "FLOWSTATE_REMOTE_URL";
const ENV_REMOTE_KEY: &str = "FLOWSTATE_REMOTE_KEY";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("flowstate")
}

/// Endpoint and public API key of the remote table store.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
}

impl RemoteConfig {
    fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.api_key.is_empty()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FlowstateConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for FlowstateConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            remote: None,
            debug_logging: false,
        }
    }
}

impl FlowstateConfig {
    pub fn config_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Read the config file, falling back to defaults when it is missing or
    /// unreadable. Environment variables override the remote section.
    pub fn load() -> Self {
        let path = Self::config_path();
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let (Ok(url), Ok(api_key)) = (
            std::env::var(ENV_REMOTE_URL),
            std::env::var(ENV_REMOTE_KEY),
        ) {
            config.remote = Some(RemoteConfig { url, api_key });
        }

        config
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&path, content)
    }

    /// The remote section, only when both url and key are present.
    pub fn remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref().filter(|r| r.is_complete())
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trip() {
        let config = FlowstateConfig {
            data_dir: PathBuf::from("/tmp/flowstate-test"),
            remote: Some(RemoteConfig {
                url: "https://example.supabase.co".to_string(),
                api_key: "anon-key".to_string(),
            }),
            debug_logging: true,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: FlowstateConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let parsed: FlowstateConfig = toml::from_str("").unwrap();
        assert_eq!(parsed, FlowstateConfig::default());
    }

    #[test]
    fn incomplete_remote_is_not_configured() {
        let config = FlowstateConfig {
            remote: Some(RemoteConfig {
                url: "https://example.supabase.co".to_string(),
                api_key: String::new(),
            }),
            ..Default::default()
        };
        assert!(config.remote().is_none());
    }
}
