//! Configuration provider using Figment

use crate::{
    discovery::{ConfigFile, ConfigFormat, FileDiscovery},
    types::ReplicaConfig,
    ConfigResult,
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, info, trace};

/// Environment variable prefix, e.g. `SYNCBOARD_ROOM`, `SYNCBOARD_DATA_DIR`
pub const ENV_PREFIX: &str = "SYNCBOARD_";

/// Configuration provider using figment
///
/// Configuration is read fresh on every call; nothing is cached.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    discovery: FileDiscovery,
}

impl ConfigProvider {
    /// Create a provider that discovers files in the standard locations
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with a custom file discovery
    pub fn with_discovery(discovery: FileDiscovery) -> Self {
        Self { discovery }
    }

    /// Load and validate the replica configuration from all sources
    pub fn load_replica_config(&self) -> ConfigResult<ReplicaConfig> {
        debug!("Loading replica configuration");

        let config: ReplicaConfig = self.build_figment().extract()?;
        config.validate()?;

        info!(
            room = %config.room,
            persistent = config.data_dir.is_some(),
            "Loaded replica configuration"
        );
        Ok(config)
    }

    /// Build the figment configuration with all sources in precedence order
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. Configuration files (global, then project)
    /// 3. Environment variables (`SYNCBOARD_` prefix)
    fn build_figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(ReplicaConfig::default()));

        for config_file in self.discovery.discover_all() {
            trace!(
                "Loading config file: {} ({:?})",
                config_file.path.display(),
                config_file.format
            );
            figment = figment.merge(Self::load_config_file(&config_file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
    }

    fn load_config_file(config_file: &ConfigFile) -> Figment {
        let path = &config_file.path;
        match config_file.format {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_load_defaults_without_files() {
        let provider = ConfigProvider::with_discovery(FileDiscovery::with_directories(None, None));
        let config = provider.load_replica_config().unwrap();
        assert_eq!(config, ReplicaConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_from_yaml() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "room: planning\nreplica_id: laptop\ndata_dir: /var/lib/syncboard\n",
        )
        .unwrap();

        let provider = ConfigProvider::with_discovery(FileDiscovery::with_directories(
            Some(temp_dir.path().to_path_buf()),
            None,
        ));
        let config = provider.load_replica_config().unwrap();

        assert_eq!(config.room, "planning");
        assert_eq!(config.replica_id.as_deref(), Some("laptop"));
    }

    #[test]
    #[serial]
    fn test_invalid_file_value_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.toml"), "room = \"\"\n").unwrap();

        let provider = ConfigProvider::with_discovery(FileDiscovery::with_directories(
            Some(temp_dir.path().to_path_buf()),
            None,
        ));
        assert!(provider.load_replica_config().is_err());
    }
}
