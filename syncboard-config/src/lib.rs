//! Replica configuration for syncboard using Figment
//!
//! Sources, later ones overriding earlier ones:
//!
//! - Defaults (`room = "my_board"`, in-memory history)
//! - Global files: `~/.syncboard/{config,syncboard}.{toml,yaml,yml,json}`
//! - Project files: `./.syncboard/{config,syncboard}.{toml,yaml,yml,json}`
//! - Environment: `SYNCBOARD_ROOM`, `SYNCBOARD_REPLICA_ID`, `SYNCBOARD_DATA_DIR`,
//!   `SYNCBOARD_ACTOR`
//!
//! ```no_run
//! use syncboard_config::load_configuration;
//!
//! let config = load_configuration()?;
//! println!("joining room {}", config.room);
//! # Ok::<(), syncboard_config::ConfigError>(())
//! ```
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! room = "team-board"
//! replica_id = "laptop"
//! data_dir = "/home/me/.local/share/syncboard"
//! ```

mod discovery;
mod error;
mod provider;
mod types;

#[cfg(test)]
mod tests;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery, CONFIG_DIR_NAME};
pub use error::ConfigError;
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{ReplicaConfig, DEFAULT_ROOM};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load the replica configuration from all standard sources
pub fn load_configuration() -> ConfigResult<ReplicaConfig> {
    ConfigProvider::new().load_replica_config()
}
