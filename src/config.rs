use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ChatError;
use crate::layout::LayoutMetrics;
use crate::session::Capabilities;
use crate::stream::DeliveryMode;

#[derive(Debug, Default, Deserialize)]
pub struct SparkConfig {
    #[serde(default)]
    pub bridge: Bridge,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub layout: LayoutMetrics,
    #[serde(default)]
    pub theme: ThemeSettings,
}

#[derive(Debug, Deserialize)]
pub struct Bridge {
    #[serde(default = "default_bridge_url")]
    pub url: String,
}

/// Which product variant the session runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// Back navigation, manual scrolling, chunked replies.
    #[default]
    Browse,
    /// Dictation starts immediately, no back navigation, whole-text replies.
    Quick,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub mode: LaunchMode,
    /// Overrides the variant's delivery mode.
    #[serde(default)]
    pub delivery: Option<DeliveryMode>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeSettings {
    #[serde(default = "default_theme")]
    pub name: String,
}

fn default_bridge_url() -> String {
    "ws://localhost:18790".into()
}

fn default_theme() -> String {
    "spark".into()
}

impl Default for Bridge {
    fn default() -> Self {
        Self {
            url: default_bridge_url(),
        }
    }
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            name: default_theme(),
        }
    }
}

impl SparkConfig {
    /// Session capabilities for the configured launch mode.
    pub fn capabilities(&self) -> Capabilities {
        let mut caps = match self.session.mode {
            LaunchMode::Browse => Capabilities::browse(),
            LaunchMode::Quick => Capabilities::quick_launch(),
        };
        if let Some(delivery) = self.session.delivery {
            caps.delivery_mode = delivery;
        }
        caps
    }
}

/// Read and parse one config file.
pub fn load_from(path: &Path) -> Result<SparkConfig, ChatError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str::<SparkConfig>(&content)?)
}

/// Load the spark-chat config file.
/// Search order:
///   1. `explicit` (from the command line)
///   2. SPARK_CHAT_CONFIG env var
///   3. ~/.spark-chat/config.toml
///   4. Default values
pub fn load(explicit: Option<&Path>) -> SparkConfig {
    let candidates = [
        explicit.map(Path::to_path_buf),
        std::env::var("SPARK_CHAT_CONFIG").ok().map(PathBuf::from),
        dirs::home_dir().map(|h| h.join(".spark-chat/config.toml")),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            match load_from(&candidate) {
                Ok(config) => {
                    info!(
                        path = %candidate.display(),
                        mode = ?config.session.mode,
                        "loaded spark-chat config"
                    );
                    return config;
                }
                Err(e) => {
                    warn!(path = %candidate.display(), error = %e, "failed to load config");
                }
            }
        }
    }

    info!("no config file found, using defaults");
    SparkConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SparkConfig::default();
        assert_eq!(config.bridge.url, "ws://localhost:18790");
        assert_eq!(config.session.mode, LaunchMode::Browse);
        assert_eq!(config.layout, LayoutMetrics::terminal());
        assert_eq!(config.theme.name, "spark");
        assert_eq!(config.capabilities(), Capabilities::browse());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[bridge]
url = "ws://phone.local:9000"

[session]
mode = "quick"
delivery = "chunked"

[layout]
bubble_padding = 2
"#
        )
        .unwrap();

        let config = load_from(file.path()).unwrap();
        assert_eq!(config.bridge.url, "ws://phone.local:9000");
        assert_eq!(config.session.mode, LaunchMode::Quick);
        assert_eq!(config.layout.bubble_padding, 2);
        // Unset layout keys keep their defaults.
        assert_eq!(config.layout.scroll_step, LayoutMetrics::terminal().scroll_step);

        let caps = config.capabilities();
        assert!(caps.auto_start_dictation);
        assert!(!caps.has_back_navigation);
        assert_eq!(caps.delivery_mode, DeliveryMode::Chunked);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nmode = \"sideways\"").unwrap();
        assert!(matches!(load_from(file.path()), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_load_falls_back_on_bad_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("broken.toml");
        fs::write(&bad, "not = [valid").unwrap();
        // Falls through to the remaining candidates; whatever is found must parse.
        let config = load(Some(&bad));
        assert!(!config.bridge.url.is_empty());
    }
}
