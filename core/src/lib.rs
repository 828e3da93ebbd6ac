#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Contagion rule engine.
//!
//! This crate defines the value types and the message surface that connect
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and presentation layers to react to. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod bimap;
mod hex;
mod power;

pub use bimap::{BidirectionalMap, DuplicateKeyError, MapSide};
pub use hex::{CoordError, HexCoord};
pub use power::{LevelTransition, PowerError, PowerLevel, MAX_LEVEL, MIN_LEVEL};

/// Radius used when no board configuration is supplied.
pub const DEFAULT_RADIUS: u32 = 8;
/// Spacing between cell centres used when no board configuration is supplied.
pub const DEFAULT_DISTANCE: f32 = 1.0;
/// Largest accepted board radius. A board of this radius holds 3,142,657 cells.
pub const MAX_RADIUS: u32 = 1024;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the board when the configuration differs from the current one.
    ConfigureBoard {
        /// Requested board layout.
        config: BoardConfig,
    },
    /// Applies a power level to a cell and spreads the result outward.
    ApplyPower {
        /// Cell receiving the power.
        cell: CellId,
        /// Level of power being applied.
        level: PowerLevel,
        /// Player credited with the action.
        player: PlayerId,
    },
    /// Advances the game clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the game clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that every cell was discarded and the board regenerated.
    BoardRebuilt {
        /// Configuration the new board was built from.
        config: BoardConfig,
        /// Number of cells on the new board.
        cells: usize,
    },
    /// Reports that a board configuration request was rejected.
    BoardConfigurationRejected {
        /// Configuration that failed validation.
        config: BoardConfig,
        /// Specific reason the configuration failed.
        reason: ConfigError,
    },
    /// Notifies that the power level of a single cell changed.
    PowerLevelChanged {
        /// Cell whose level changed.
        cell: CellId,
        /// Board coordinate of the cell.
        coord: HexCoord,
        /// Level held before the change.
        from: u8,
        /// Level held after the change.
        to: u8,
        /// Player credited with the change and now owning the cell.
        player: PlayerId,
    },
    /// Confirms that a power application and its spread completed.
    PowerApplied {
        /// Cell the power was applied to.
        origin: CellId,
        /// Player credited with the action.
        player: PlayerId,
        /// Number of cells that received power, the origin included.
        affected: usize,
    },
    /// Reports that a power application was rejected before touching the board.
    PowerRejected {
        /// Cell targeted by the request.
        cell: CellId,
        /// Level that was offered.
        level: u8,
        /// Player that issued the request.
        player: PlayerId,
        /// Specific reason the application failed.
        reason: SpreadError,
    },
}

/// Unique identifier assigned to a player.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a cell when a board is built.
///
/// Identifiers are never reused across rebuilds, so an identifier kept from a
/// discarded board no longer resolves.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new cell identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier that follows this one, or `None` once the space is exhausted.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

/// Layout parameters of a hexagonal board.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Coordinates whose length is strictly below the radius are on the board.
    pub radius: u32,
    /// Spacing between cell centres measured in world units.
    pub distance: f32,
}

impl BoardConfig {
    /// Creates a new board configuration.
    #[must_use]
    pub const fn new(radius: u32, distance: f32) -> Self {
        Self { radius, distance }
    }

    /// Checks that the configuration describes a buildable board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius > MAX_RADIUS {
            return Err(ConfigError::RadiusTooLarge {
                radius: self.radius,
            });
        }
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(ConfigError::InvalidDistance {
                distance: self.distance,
            });
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS, DEFAULT_DISTANCE)
    }
}

/// Reasons a board configuration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The radius exceeds [`MAX_RADIUS`].
    #[error("board radius {radius} exceeds the maximum of 1024")]
    RadiusTooLarge {
        /// Provided radius that failed validation.
        radius: u32,
    },
    /// Cell spacing must be a positive, finite number.
    #[error("cell distance must be positive and finite (received {distance})")]
    InvalidDistance {
        /// Provided spacing that failed validation.
        distance: f32,
    },
}

/// Errors raised by board queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The cell does not belong to the current board.
    #[error("cell {} is not on the board", .cell.get())]
    NotOnBoard {
        /// Identifier that failed to resolve.
        cell: CellId,
    },
    /// The radius exceeds [`MAX_RADIUS`].
    #[error("board radius {radius} exceeds the maximum of 1024")]
    RadiusTooLarge {
        /// Requested radius.
        radius: u32,
    },
    /// Every cell identifier has been handed out.
    #[error("cell identifiers are exhausted")]
    IdsExhausted,
    /// Board generation attempted to index a coordinate or cell twice.
    #[error("board index rejected a cell: {0}")]
    DuplicateCell(#[from] DuplicateKeyError),
}

/// Reasons a power application may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum SpreadError {
    /// The target cell cannot accept the offered level.
    #[error("cannot apply level {incoming} to cell {} at level {current}", .cell.get())]
    InvalidApplication {
        /// Cell targeted by the request.
        cell: CellId,
        /// Level the cell holds.
        current: u8,
        /// Level that was offered.
        incoming: u8,
    },
    /// The target cell does not belong to the current board.
    #[error("cell {} is not on the board", .cell.get())]
    NotOnBoard {
        /// Identifier that failed to resolve.
        cell: CellId,
    },
}

#[cfg(test)]
mod tests {
    use super::{BoardConfig, CellId, ConfigError, DEFAULT_DISTANCE, DEFAULT_RADIUS, MAX_RADIUS};

    #[test]
    fn default_config_matches_documented_values() {
        let config = BoardConfig::default();
        assert_eq!(config.radius, DEFAULT_RADIUS);
        assert_eq!(config.distance, DEFAULT_DISTANCE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_spacing() {
        for distance in [0.0, -1.0, f32::INFINITY] {
            assert_eq!(
                BoardConfig::new(3, distance).validate(),
                Err(ConfigError::InvalidDistance { distance })
            );
        }
        assert!(BoardConfig::new(3, f32::NAN).validate().is_err());
    }

    #[test]
    fn validate_caps_the_radius() {
        assert!(BoardConfig::new(MAX_RADIUS, 1.0).validate().is_ok());
        assert_eq!(
            BoardConfig::new(2_000_000_000, 1.0).validate(),
            Err(ConfigError::RadiusTooLarge {
                radius: 2_000_000_000
            })
        );
    }

    #[test]
    fn zero_radius_is_a_valid_empty_board() {
        assert!(BoardConfig::new(0, 1.0).validate().is_ok());
    }

    #[test]
    fn cell_ids_advance_monotonically() {
        let first = CellId::new(41);
        assert_eq!(first.next(), Some(CellId::new(42)));
        assert_eq!(CellId::new(u32::MAX).next(), None);
    }
}
