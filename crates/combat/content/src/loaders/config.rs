//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Shipped rules configuration.
const DEFAULT_CONFIG: &str = include_str!("../../data/combat.toml");

/// Loader for combat configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parses a TOML document into a [`CombatConfig`].
    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.min_difficulty > config.max_difficulty {
            anyhow::bail!(
                "min_difficulty ({}) exceeds max_difficulty ({})",
                config.min_difficulty,
                config.max_difficulty
            );
        }
        if config.initiative_die == 0 || config.pool_die == 0 {
            anyhow::bail!("dice need at least one face");
        }
        Ok(config)
    }

    /// The configuration shipped with this crate.
    pub fn load_embedded() -> LoadResult<CombatConfig> {
        Self::parse(DEFAULT_CONFIG)
    }
}
