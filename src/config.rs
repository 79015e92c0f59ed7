use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path, path::PathBuf};
use voxelgen_world::WorldConfig;

pub const DEFAULT_CONFIG_PATH: &str = "voxelgen.toml";
const DEFAULT_WORLD_FILE: &str = "world.vxw";

/// Settings for the embedding binary.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    /// Where player edits are saved. `None` keeps everything in memory.
    pub world_file: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Pregeneration threads; defaults to one per CPU.
    pub workers: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            world_file: Some(PathBuf::from(DEFAULT_WORLD_FILE)),
            log_filter: "warn".to_string(),
            workers: None,
        }
    }
}

/// How the configuration was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// The file did not exist.
    Defaults,
}

impl AppConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file yields defaults. Unreadable, malformed or invalid
    /// configuration is an error.
    pub fn load_from_path(path: &Path) -> Result<(Self, ConfigSource)> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok((Self::default(), ConfigSource::Defaults));
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok((config, ConfigSource::File))
    }

    /// Parse and validate TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse TOML")?;
        config.world.validate()?;
        if config.workers == Some(0) {
            anyhow::bail!("workers must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_world_table_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_filter = "voxelgen_world=debug"
            workers = 2

            [world]
            seed = 12345
            sea_level = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.world.seed, 12345);
        assert_eq!(config.world.sea_level, 40);
        assert_eq!(config.world.chunk_size, 16);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.log_filter, "voxelgen_world=debug");
    }

    #[test]
    fn invalid_world_is_rejected() {
        let err = AppConfig::from_toml("[world]\nchunk_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("chunk size"));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(AppConfig::from_toml("world = [").is_err());
        assert!(AppConfig::from_toml("workers = 0").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let (config, source) =
            AppConfig::load_from_path(Path::new("/nonexistent/voxelgen.toml")).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config, AppConfig::default());
    }
}
