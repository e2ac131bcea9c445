//! Tunable parameters for generation and pathfinding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TileKind;

/// Parameters controlling a single labyrinth generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of cell columns, including the outer wall ring.
    pub width: u32,
    /// Number of cell rows, including the outer wall ring.
    pub height: u32,
    /// Smallest room width a split must leave room for.
    pub min_room_width: u32,
    /// Smallest room height a split must leave room for.
    pub min_room_height: u32,
    /// Number of split levels below the root. Zero yields a single room.
    pub max_depth: u32,
    /// Seed for every random draw made during generation.
    pub seed: u64,
    /// Probability that a processed partition joins the extra-corridor pool.
    pub extra_corridor_chance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 40,
            min_room_width: 5,
            min_room_height: 4,
            max_depth: 4,
            seed: 0x1ab7_2f1e_5eed_0001,
            extra_corridor_chance: 0.5,
        }
    }
}

impl GenerationConfig {
    /// Rejects parameters that would only produce a degenerate labyrinth.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.min_room_width == 0 || self.min_room_height == 0 {
            return Err(ConfigError::ZeroRoomSize {
                width: self.min_room_width,
                height: self.min_room_height,
            });
        }

        let interior_width = self.width.saturating_sub(2);
        if self.min_room_width > interior_width {
            return Err(ConfigError::RoomExceedsRegion {
                dimension: "width",
                minimum: self.min_room_width,
                available: interior_width,
            });
        }
        let interior_height = self.height.saturating_sub(2);
        if self.min_room_height > interior_height {
            return Err(ConfigError::RoomExceedsRegion {
                dimension: "height",
                minimum: self.min_room_height,
                available: interior_height,
            });
        }

        ensure_probability("extra_corridor_chance", self.extra_corridor_chance)
    }
}

/// Per-tile surcharges added to the pathfinder's traversal cost.
///
/// Three tiers are configurable but only two are consulted: cells that are
/// neither room nor corridor pay the corridor surcharge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    /// Surcharge for room floors and room walls.
    pub room: f64,
    /// Surcharge for corridor cells and anything unclassified.
    pub corridor: f64,
    /// Reserved base tier. Not consulted by the search.
    pub base: f64,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            room: 2.0,
            corridor: 1.0,
            base: 1.0,
        }
    }
}

impl CostTable {
    /// Surcharge paid for entering a cell with the provided classification.
    #[must_use]
    pub fn surcharge(&self, kind: Option<TileKind>) -> f64 {
        match kind {
            Some(kind) if kind.is_room() => self.room,
            _ => self.corridor,
        }
    }

    /// Rejects surcharges that would break the search ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("room", self.room),
            ("corridor", self.corridor),
            ("base", self.base),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCost { name, value });
            }
        }
        Ok(())
    }
}

/// Verifies that `value` is a probability in `[0, 1]`.
pub fn ensure_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

/// Reasons a configuration is rejected before any work starts.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The labyrinth would contain no cells.
    #[error("labyrinth dimensions must be positive, got {width}x{height}")]
    ZeroDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The minimum room size is zero along at least one axis.
    #[error("minimum room size must be positive, got {width}x{height}")]
    ZeroRoomSize {
        /// Requested minimum room width.
        width: u32,
        /// Requested minimum room height.
        height: u32,
    },
    /// The minimum room size does not fit inside the outer wall ring.
    #[error("minimum room {dimension} {minimum} exceeds the {available} interior cells")]
    RoomExceedsRegion {
        /// Axis that does not fit.
        dimension: &'static str,
        /// Requested minimum along that axis.
        minimum: u32,
        /// Cells available inside the outer wall along that axis.
        available: u32,
    },
    /// A probability lies outside `[0, 1]`.
    #[error("{name} must lie within [0, 1], got {value}")]
    InvalidProbability {
        /// Name of the offending parameter.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A traversal surcharge is negative or not finite.
    #[error("{name} cost must be finite and non-negative, got {value}")]
    InvalidCost {
        /// Name of the offending tier.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}
