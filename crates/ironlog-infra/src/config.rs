//! Global configuration loader for ironlog.
//!
//! Reads `config.toml` from the data directory (`~/.ironlog/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use ironlog_types::config::GlobalConfig;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
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

/// Directory holding campaign journals: `[journal] dir`, else the data dir.
pub fn resolve_journal_dir(config: &GlobalConfig, data_dir: &Path) -> PathBuf {
    config
        .journal
        .dir
        .clone()
        .unwrap_or_else(|| data_dir.to_path_buf())
}

/// LanceDB directory: `[memory] vector_store_dir`, else `{data_dir}/vector_store`.
pub fn resolve_vector_store_dir(config: &GlobalConfig, data_dir: &Path) -> PathBuf {
    config
        .memory
        .vector_store_dir
        .clone()
        .unwrap_or_else(|| data_dir.join("vector_store"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert!(config.memory.enabled);
        assert_eq!(config.memory.debounce_ms, 500);
        assert!(config.journal.dir.is_none());
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[journal]
dir = "/srv/campaigns"

[memory]
max_results = 3
min_score = 0.5
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.journal.dir, Some(PathBuf::from("/srv/campaigns")));
        assert_eq!(config.memory.max_results, 3);
        assert!((config.memory.min_score - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.memory.max_chars, 1200);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.memory.max_results, 6);
    }

    #[test]
    fn resolve_dirs_default_to_data_dir() {
        let data_dir = Path::new("/home/user/.ironlog");
        let config = GlobalConfig::default();
        assert_eq!(resolve_journal_dir(&config, data_dir), data_dir);
        assert_eq!(
            resolve_vector_store_dir(&config, data_dir),
            PathBuf::from("/home/user/.ironlog/vector_store")
        );
    }

    #[test]
    fn resolve_dirs_honour_overrides() {
        let mut config = GlobalConfig::default();
        config.journal.dir = Some(PathBuf::from("/srv/campaigns"));
        config.memory.vector_store_dir = Some(PathBuf::from("/srv/vectors"));
        let data_dir = Path::new("/home/user/.ironlog");
        assert_eq!(
            resolve_journal_dir(&config, data_dir),
            PathBuf::from("/srv/campaigns")
        );
        assert_eq!(
            resolve_vector_store_dir(&config, data_dir),
            PathBuf::from("/srv/vectors")
        );
    }
}
