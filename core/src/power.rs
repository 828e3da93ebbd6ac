//! Power level state machine shared by cells and player powers.

use thiserror::Error;

use crate::PlayerId;

/// Lowest level a power can hold. Cells at this level do not spread.
pub const MIN_LEVEL: u8 = 1;
/// Highest level a power can hold. Cells at this level accept nothing.
pub const MAX_LEVEL: u8 = 4;

/// Level of power held by a cell or carried by a power effect.
///
/// The level always lies within [`MIN_LEVEL`]`..=`[`MAX_LEVEL`] and the charge
/// within `0.0..=1.0`. Only [`PowerLevel::apply`] changes the level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerLevel {
    level: u8,
    charge: f32,
    owner: Option<PlayerId>,
}

impl PowerLevel {
    /// Creates a fully charged, unowned power at `level`.
    pub fn new(level: u8) -> Result<Self, PowerError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(PowerError::OutOfRange { level });
        }
        Ok(Self {
            level,
            charge: 1.0,
            owner: None,
        })
    }

    /// Creates an unowned power at `level` that still has to charge up.
    pub fn uncharged(level: u8) -> Result<Self, PowerError> {
        Ok(Self {
            charge: 0.0,
            ..Self::new(level)?
        })
    }

    /// Power at [`MIN_LEVEL`], the state every cell starts in.
    #[must_use]
    pub const fn minimum() -> Self {
        Self {
            level: MIN_LEVEL,
            charge: 1.0,
            owner: None,
        }
    }

    /// Replaces the charge fraction, rejecting values outside `0.0..=1.0`.
    pub fn with_charge(self, charge: f32) -> Result<Self, PowerError> {
        if !(0.0..=1.0).contains(&charge) {
            return Err(PowerError::ChargeOutOfRange);
        }
        Ok(Self { charge, ..self })
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Charge fraction in `0.0..=1.0`.
    #[must_use]
    pub const fn charge(&self) -> f32 {
        self.charge
    }

    /// Reports whether the power is fully charged and therefore usable.
    #[must_use]
    pub fn is_charged(&self) -> bool {
        self.charge >= 1.0
    }

    /// Player that last raised the level, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Adds `fraction` to the charge, saturating at full charge.
    ///
    /// Negative and NaN fractions leave the charge untouched.
    pub fn recharge(&mut self, fraction: f32) {
        if fraction.is_nan() || fraction <= 0.0 {
            return;
        }
        self.charge = (self.charge + fraction).min(1.0);
    }

    /// Empties the charge after the power was used.
    pub fn discharge(&mut self) {
        self.charge = 0.0;
    }

    /// Reports whether `incoming` may be applied to this power.
    ///
    /// A power at [`MAX_LEVEL`] accepts nothing, and a lower incoming level
    /// can never overwrite a higher one.
    #[must_use]
    pub fn can_apply(&self, incoming: &PowerLevel) -> bool {
        self.level != MAX_LEVEL && self.level <= incoming.level
    }

    /// Absorbs `incoming` on behalf of `player`.
    ///
    /// Equal levels collide and escalate by one; a higher incoming level
    /// replaces the current one. The acting player becomes the owner.
    pub fn apply(
        &mut self,
        incoming: &PowerLevel,
        player: PlayerId,
    ) -> Result<LevelTransition, PowerError> {
        if !self.can_apply(incoming) {
            return Err(PowerError::CannotApply {
                current: self.level,
                incoming: incoming.level,
            });
        }

        let from = self.level;
        self.level = if from == incoming.level {
            from + 1
        } else {
            incoming.level
        };
        self.owner = Some(player);

        Ok(LevelTransition {
            from,
            to: self.level,
            player,
        })
    }

    /// Power that escapes to neighbours, or `None` at [`MIN_LEVEL`].
    #[must_use]
    pub fn spread_power(&self) -> Option<PowerLevel> {
        if self.level == MIN_LEVEL {
            return None;
        }
        Some(Self {
            level: self.level - 1,
            charge: 1.0,
            owner: None,
        })
    }
}

impl Default for PowerLevel {
    fn default() -> Self {
        Self::minimum()
    }
}

impl TryFrom<u8> for PowerLevel {
    type Error = PowerError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

/// Change produced by a successful [`PowerLevel::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelTransition {
    /// Level before the application.
    pub from: u8,
    /// Level after the application.
    pub to: u8,
    /// Player credited with the change.
    pub player: PlayerId,
}

/// Errors raised by the power level state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PowerError {
    /// The requested level lies outside the supported range.
    #[error("power level {level} is outside 1..=4")]
    OutOfRange {
        /// Rejected level.
        level: u8,
    },
    /// The incoming level cannot be applied to the current one.
    #[error("cannot apply level {incoming} to a power at level {current}")]
    CannotApply {
        /// Level held before the attempt.
        current: u8,
        /// Level that was offered.
        incoming: u8,
    },
    /// The charge fraction lies outside `0.0..=1.0`.
    #[error("charge must lie within 0.0..=1.0")]
    ChargeOutOfRange,
}
