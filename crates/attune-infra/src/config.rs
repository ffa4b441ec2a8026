//! Global configuration loader for Attune.
//!
//! Reads `config.toml` from the data directory (`~/.attune/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use attune_types::config::GlobalConfig;

/// Resolve the data directory: `ATTUNE_DATA_DIR`, else `~/.attune`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ATTUNE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".attune")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config; omitted keys take their defaults.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use attune_types::config::MemoryWritePolicy;
    use attune_types::llm::ProviderKind;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.rotation.pool_size, 5);
        assert_eq!(config.models.router, "gemini-2.5-flash-lite");
        assert_eq!(config.memory.write_policy, MemoryWritePolicy::Strict);
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[models]
chat_provider = "nvidia"
coach = "meta/llama-3.1-70b-instruct"

[rotation]
pool_size = 3
base_delay_ms = 250

[memory]
write_policy = "best_effort"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.models.chat_provider, ProviderKind::Nvidia);
        assert_eq!(config.models.coach, "meta/llama-3.1-70b-instruct");
        assert_eq!(config.models.router, "gemini-2.5-flash-lite");
        assert_eq!(config.rotation.pool_size, 3);
        assert_eq!(config.rotation.max_attempts, 3);
        assert_eq!(config.rotation.base_delay_ms, 250);
        assert_eq!(config.memory.write_policy, MemoryWritePolicy::BestEffort);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.rotation.max_attempts, 3);
    }
}
