//! Configuration file discovery
//!
//! Finds replica configuration files in the project (`./.syncboard/`) and global
//! (`~/.syncboard/`) directories, ordered so that project files override global ones.

use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Name of the configuration directory in both scopes
pub const CONFIG_DIR_NAME: &str = ".syncboard";

const CONFIG_FILE_NAMES: [&str; 8] = [
    "config.toml",
    "config.yaml",
    "config.yml",
    "config.json",
    "syncboard.toml",
    "syncboard.yaml",
    "syncboard.yml",
    "syncboard.json",
];

/// Represents a discovered configuration file with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Full path to the configuration file
    pub path: PathBuf,
    /// Detected format of the file (TOML, YAML, JSON)
    pub format: ConfigFormat,
    /// Scope indicating where the file was found (global vs project)
    pub scope: ConfigScope,
    /// Priority for ordering (higher values take precedence)
    pub priority: u8,
}

impl ConfigFile {
    /// Create a new ConfigFile with the given path, format, and scope
    pub fn new(path: PathBuf, format: ConfigFormat, scope: ConfigScope) -> Self {
        let priority = scope.priority();
        Self {
            path,
            format,
            scope,
            priority,
        }
    }
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration scope indicating where the file was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// Global configuration from ~/.syncboard/
    Global,
    /// Project configuration from ./.syncboard/
    Project,
}

impl ConfigScope {
    /// Get priority value for this scope (higher values override lower ones)
    pub fn priority(self) -> u8 {
        match self {
            Self::Global => 10,
            Self::Project => 20,
        }
    }
}

/// File discovery service for finding configuration files
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    project_dir: Option<PathBuf>,
    global_dir: Option<PathBuf>,
    /// When set, directories that were not given explicitly are not resolved
    pinned: bool,
}

impl FileDiscovery {
    /// Create a FileDiscovery that resolves both directories at discovery time
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a FileDiscovery restricted to the given directories
    pub fn with_directories(project_dir: Option<PathBuf>, global_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            global_dir,
            pinned: true,
        }
    }

    /// Discover all configuration files in priority order
    ///
    /// Returns files sorted by priority (lower priority first, so higher priority
    /// files can override when merged by figment).
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let (project_dir, global_dir) = if self.pinned {
            (self.project_dir.clone(), self.global_dir.clone())
        } else {
            (
                self.project_dir.clone().or_else(Self::resolve_project_dir),
                self.global_dir.clone().or_else(Self::resolve_global_dir),
            )
        };

        let mut files = Vec::new();
        if let Some(ref global_dir) = global_dir {
            files.extend(self.search_directory(global_dir, ConfigScope::Global));
        }
        if let Some(ref project_dir) = project_dir {
            files.extend(self.search_directory(project_dir, ConfigScope::Project));
        }

        // Stable sort keeps the candidate order within one scope
        files.sort_by_key(|f| f.priority);

        debug!("Discovered {} configuration files", files.len());
        for file in &files {
            trace!("Found config: {} ({:?})", file.path.display(), file.format);
        }

        files
    }

    fn search_directory(&self, dir: &Path, scope: ConfigScope) -> Vec<ConfigFile> {
        if !dir.exists() {
            debug!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }

        if !dir.is_dir() {
            warn!("Path exists but is not a directory: {}", dir.display());
            return Vec::new();
        }

        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .filter(|candidate| candidate.is_file())
            .filter_map(|candidate| Self::classify_file(&candidate, scope))
            .collect()
    }

    fn classify_file(path: &Path, scope: ConfigScope) -> Option<ConfigFile> {
        let filename = path.file_name()?.to_str()?;
        if !CONFIG_FILE_NAMES.contains(&filename) {
            return None;
        }
        let format = ConfigFormat::from_extension(path.extension()?.to_str()?)?;
        Some(ConfigFile::new(path.to_path_buf(), format, scope))
    }

    fn resolve_project_dir() -> Option<PathBuf> {
        let dir = std::env::current_dir().ok()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }

    fn resolve_global_dir() -> Option<PathBuf> {
        let dir = dirs::home_dir()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }
}
