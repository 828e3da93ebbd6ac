#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure player controller that turns frame input into power application commands.

use std::time::Duration;

use contagion_core::{CellId, Command, Event, PlayerId, PowerError, PowerLevel};

/// Levels a player starts with, one power per slot.
pub const DEFAULT_ARSENAL: [u8; 5] = [1, 1, 2, 3, 4];

/// Time a power needs to charge up from empty unless configured otherwise.
pub const DEFAULT_RECHARGE_TIME: Duration = Duration::from_secs(1);

/// Configuration describing the player driven by a [`Controller`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Player credited with every emitted command.
    pub player: PlayerId,
    /// Time an emptied power needs to become usable again.
    pub recharge_time: Duration,
    /// Level of each power slot.
    pub arsenal: Vec<u8>,
}

impl Config {
    /// Creates a configuration for `player` with the default arsenal.
    #[must_use]
    pub fn new(player: PlayerId, recharge_time: Duration) -> Self {
        Self {
            player,
            recharge_time,
            arsenal: DEFAULT_ARSENAL.to_vec(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(PlayerId::new(1), DEFAULT_RECHARGE_TIME)
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerInput {
    /// Cell currently selected by the player.
    pub selected_cell: Option<CellId>,
    /// Arsenal slot currently selected by the player.
    pub power_slot: Option<usize>,
    /// Indicates whether the player confirmed the selection on this frame.
    pub confirm: bool,
}

impl ControllerInput {
    /// Creates an input that confirms applying `power_slot` to `cell`.
    #[must_use]
    pub const fn confirmed(cell: CellId, power_slot: usize) -> Self {
        Self {
            selected_cell: Some(cell),
            power_slot: Some(power_slot),
            confirm: true,
        }
    }
}

/// System that owns a player's powers and requests their application.
///
/// Powers charge while time advances. A confirmed selection produces a
/// [`Command::ApplyPower`] only when the slot is charged and the target accepts
/// its level. The slot is emptied once the world reports the application, and
/// no further request is issued while one is awaiting its outcome.
#[derive(Clone, Debug)]
pub struct Controller {
    player: PlayerId,
    recharge_time: Duration,
    arsenal: Vec<PowerLevel>,
    pending: Option<usize>,
}

impl Controller {
    /// Creates a controller whose powers all start empty.
    pub fn new(config: Config) -> Result<Self, PowerError> {
        let arsenal = config
            .arsenal
            .iter()
            .map(|level| PowerLevel::uncharged(*level))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            player: config.player,
            recharge_time: config.recharge_time,
            arsenal,
            pending: None,
        })
    }

    /// Player driven by this controller.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Current powers in slot order, with their charge.
    #[must_use]
    pub fn arsenal(&self) -> &[PowerLevel] {
        &self.arsenal
    }

    /// Slot whose request is waiting for the world's verdict.
    #[must_use]
    pub const fn pending_slot(&self) -> Option<usize> {
        self.pending
    }

    /// Consumes world events and frame input to emit power commands.
    ///
    /// The `can_apply` closure should mirror the semantics of the world's
    /// `query::can_apply` helper.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: ControllerInput,
        mut can_apply: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellId, &PowerLevel) -> bool,
    {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.recharge(*dt),
                Event::PowerApplied { player, .. } if *player == self.player => {
                    if let Some(power) = self
                        .pending
                        .take()
                        .and_then(|slot| self.arsenal.get_mut(slot))
                    {
                        power.discharge();
                    }
                }
                Event::PowerRejected { player, .. } if *player == self.player => {
                    self.pending = None;
                }
                Event::BoardRebuilt { .. } => self.pending = None,
                _ => {}
            }
        }

        if !input.confirm || self.pending.is_some() {
            return;
        }

        let (Some(cell), Some(slot)) = (input.selected_cell, input.power_slot) else {
            return;
        };
        let Some(power) = self.arsenal.get(slot) else {
            return;
        };
        if !power.is_charged() || !can_apply(cell, power) {
            return;
        }

        out.push(Command::ApplyPower {
            cell,
            level: *power,
            player: self.player,
        });
        self.pending = Some(slot);
    }

    fn recharge(&mut self, dt: Duration) {
        let fraction = if self.recharge_time.is_zero() {
            1.0
        } else {
            dt.as_secs_f32() / self.recharge_time.as_secs_f32()
        };
        for power in &mut self.arsenal {
            power.recharge(fraction);
        }
    }
}
