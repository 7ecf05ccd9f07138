//! Editor settings read from `wizard-dungeon.toml`.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

/// Config file picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "wizard-dungeon.toml";

/// Settings that shape editing sessions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EditorConfig {
    /// Whether placements are checked for conflicts.
    pub(crate) overlap_prevention: bool,
    /// Pixel size of one tile when resolving `--pixel` targets.
    pub(crate) tile_size: u32,
    /// Time limit given to new levels, in seconds.
    pub(crate) default_time_limit: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            overlap_prevention: true,
            tile_size: 32,
            default_time_limit: 60,
        }
    }
}

impl EditorConfig {
    /// Loads the explicit config, else the default file if present, else defaults.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_path(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))?;
        debug!("[Config] Loaded {config:?} from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse editor config toml contents")
    }
}
