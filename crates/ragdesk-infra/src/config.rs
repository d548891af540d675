//! Client configuration loader for ragdesk.
//!
//! Reads `config.toml` from the data directory (`~/.ragdesk/` in production)
//! and deserializes it into [`ClientConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use ragdesk_core::chat::MIN_CHAT_LIMIT;
use ragdesk_types::config::ClientConfig;

/// Environment override for the per-session chat limit.
pub const CHAT_LIMIT_ENV: &str = "RAGDESK_CHAT_LIMIT";

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ClientConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Resolve the per-session chat limit.
///
/// An explicit override (from [`CHAT_LIMIT_ENV`]) beats the config file.
/// The result is never below [`MIN_CHAT_LIMIT`].
pub fn resolve_chat_limit(config: &ClientConfig, env_override: Option<&str>) -> u32 {
    let parsed = env_override.and_then(|raw| match raw.trim().parse::<u32>() {
        Ok(limit) => Some(limit),
        Err(err) => {
            tracing::warn!("Ignoring {CHAT_LIMIT_ENV}={raw:?}: {err}");
            None
        }
    });
    parsed.unwrap_or(config.chat_limit).max(MIN_CHAT_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_client_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_client_config(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.chat_limit, 3);
    }

    #[tokio::test]
    async fn load_client_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
indexing_url = "http://indexer.internal:8080"
chat_limit = 10
stage_idle_timeout_secs = 120
"#,
        )
        .await
        .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.indexing_url, "http://indexer.internal:8080");
        assert_eq!(config.chat_limit, 10);
        assert_eq!(config.stage_idle_timeout_secs, Some(120));
        // Unspecified fields keep their defaults.
        assert_eq!(config.channel_url, "ws://localhost:3000/ws");
        assert_eq!(config.completion_grace_ms, 2_000);
    }

    #[tokio::test]
    async fn load_client_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "chat_limit = = 4")
            .await
            .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn resolve_chat_limit_prefers_override() {
        let config = ClientConfig::default();
        assert_eq!(resolve_chat_limit(&config, Some("7")), 7);
        assert_eq!(resolve_chat_limit(&config, None), 3);
    }

    #[test]
    fn resolve_chat_limit_ignores_garbage_override() {
        let config = ClientConfig {
            chat_limit: 5,
            ..ClientConfig::default()
        };
        assert_eq!(resolve_chat_limit(&config, Some("lots")), 5);
    }

    #[test]
    fn resolve_chat_limit_enforces_minimum() {
        let config = ClientConfig {
            chat_limit: 0,
            ..ClientConfig::default()
        };
        assert_eq!(resolve_chat_limit(&config, None), MIN_CHAT_LIMIT);
        assert_eq!(resolve_chat_limit(&config, Some("0")), MIN_CHAT_LIMIT);
    }
}
