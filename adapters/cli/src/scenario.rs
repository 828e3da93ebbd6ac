//! Scenario files describing a board and a scripted sequence of player actions.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use contagion_core::{BoardConfig, HexCoord, PlayerId};
use contagion_system_controller::{Config as ControllerConfig, DEFAULT_ARSENAL};
use serde::Deserialize;

/// Fully parsed scenario.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Scenario {
    pub(crate) board: BoardConfig,
    pub(crate) controller: ControllerSection,
    pub(crate) actions: Vec<Action>,
}

/// Player settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ControllerSection {
    pub(crate) player: u32,
    pub(crate) recharge_ms: u64,
    pub(crate) arsenal: Vec<u8>,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            player: 1,
            recharge_ms: 1000,
            arsenal: DEFAULT_ARSENAL.to_vec(),
        }
    }
}

impl ControllerSection {
    pub(crate) fn to_config(&self) -> ControllerConfig {
        ControllerConfig {
            player: PlayerId::new(self.player),
            recharge_time: Duration::from_millis(self.recharge_ms),
            arsenal: self.arsenal.clone(),
        }
    }
}

/// Single scripted selection: wait, then confirm `slot` on the cell at `(q, r)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Action {
    pub(crate) q: i32,
    pub(crate) r: i32,
    pub(crate) slot: usize,
    #[serde(default)]
    pub(crate) wait_ms: u64,
}

impl Action {
    pub(crate) const fn coord(&self) -> HexCoord {
        HexCoord::axial(self.q, self.r)
    }

    pub(crate) const fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

/// Reads and validates the scenario stored at `path`.
pub(crate) fn load(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid scenario at {}", path.display()))
}

/// Parses and validates scenario TOML contents.
pub(crate) fn parse(contents: &str) -> Result<Scenario> {
    let scenario: Scenario =
        toml::from_str(contents).context("failed to parse scenario toml contents")?;
    scenario.validate()?;
    Ok(scenario)
}

impl Scenario {
    /// Checks the settings that can be verified without building a board.
    pub(crate) fn validate(&self) -> Result<()> {
        self.board
            .validate()
            .context("scenario board configuration is invalid")?;

        if self.controller.arsenal.is_empty() {
            bail!("scenario arsenal must hold at least one power");
        }

        for (index, action) in self.actions.iter().enumerate() {
            if action.slot >= self.controller.arsenal.len() {
                bail!(
                    "action {index} selects slot {}; the arsenal has {} slots",
                    action.slot,
                    self.controller.arsenal.len()
                );
            }
        }

        Ok(())
    }
}
