//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use cavern_terrain::{
    BootstrapParams, CaveBootstrap, CaveParams, DecorParams, ShaftParams, TunnelParams,
    VoxelCaveParams,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Seed used when time seeding is off.
    pub seed: u64,
    /// Main shaft shape.
    pub shaft: ShaftParams,
    /// Branch tunnels.
    pub tunnels: TunnelParams,
    /// Wall decor placement.
    pub decor: DecorParams,
    /// Cellular-automata voxel cave.
    pub voxel: VoxelConfig,
    /// Time seeding, top opening and spawn placement.
    pub bootstrap: BootstrapParams,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: CaveParams::default().seed,
            shaft: ShaftParams::default(),
            tunnels: TunnelParams::default(),
            decor: DecorParams::default(),
            voxel: VoxelConfig::default(),
            bootstrap: BootstrapParams::default(),
            debug: DebugConfig::default(),
        }
    }
}

/// Voxel cave configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoxelConfig {
    /// Also generate a voxel cave.
    pub enabled: bool,
    pub params: VoxelCaveParams,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write a JSON log file next to the config in debug builds.
    pub log_to_file: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

/// `<platform config dir>/cavern`, or `./cavern` when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cavern")
}

impl Config {
    /// Cave generator parameters assembled from the config sections.
    pub fn cave_params(&self) -> CaveParams {
        CaveParams {
            seed: self.seed,
            shaft: self.shaft.clone(),
            tunnels: self.tunnels.clone(),
            decor: self.decor.clone(),
        }
    }

    /// Bootstrap ready to run with these settings.
    pub fn bootstrap(&self) -> CaveBootstrap {
        CaveBootstrap::new(self.bootstrap.clone(), self.cave_params())
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it differs from `self`, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
