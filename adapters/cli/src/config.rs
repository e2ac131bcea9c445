//! File-backed settings for the command-line adapter.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use labyrinth_core::{ensure_probability, CostTable, GenerationConfig};
use serde::{Deserialize, Serialize};

/// Every tunable the adapter reads from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub(crate) generation: GenerationConfig,
    pub(crate) costs: CostTable,
    pub(crate) spawning: SpawningSettings,
    pub(crate) agents: AgentSettings,
}

/// Power-up placement settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SpawningSettings {
    pub(crate) powerup_chance: f64,
    /// How long a collected power-up shields the target from pursuers.
    pub(crate) invulnerability_ms: u64,
    pub(crate) seed: u64,
}

impl Default for SpawningSettings {
    fn default() -> Self {
        Self {
            powerup_chance: 0.02,
            invulnerability_ms: 5_000,
            seed: 0x5eed_0002,
        }
    }
}

impl SpawningSettings {
    pub(crate) fn invulnerability(&self) -> Duration {
        Duration::from_millis(self.invulnerability_ms)
    }
}

/// Step cadence for the pursuing agents and the wandering target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AgentSettings {
    pub(crate) step_interval_ms: u64,
    pub(crate) target_interval_ms: u64,
    pub(crate) seed: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            step_interval_ms: 250,
            target_interval_ms: 150,
            seed: 0x5eed_0003,
        }
    }
}

impl AgentSettings {
    pub(crate) fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub(crate) fn target_interval(&self) -> Duration {
        Duration::from_millis(self.target_interval_ms)
    }
}

impl CliConfig {
    /// Reads the configuration from `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse TOML")
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.generation
            .validate()
            .context("invalid [generation] settings")?;
        self.costs.validate().context("invalid [costs] settings")?;
        ensure_probability("powerup_chance", self.spawning.powerup_chance)
            .context("invalid [spawning] settings")?;
        Ok(())
    }
}
