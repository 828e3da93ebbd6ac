#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Contagion scenario headlessly.

mod scenario;

use std::{collections::BTreeMap, fmt, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use contagion_core::{BoardConfig, Command, Event, PlayerId, MAX_LEVEL, MIN_LEVEL};
use contagion_system_controller::{Controller, ControllerInput};
use contagion_world::{self as world, query, World};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Plays a Contagion scenario and prints the resulting board.
#[derive(Debug, Parser)]
#[command(name = "contagion")]
struct Args {
    /// Scenario TOML describing the board and the scripted actions
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Board radius, overriding the scenario
    #[arg(long)]
    radius: Option<u32>,

    /// Spacing between cell centres, overriding the scenario
    #[arg(long)]
    distance: Option<f32>,

    /// Player identifier, overriding the scenario
    #[arg(long)]
    player: Option<u32>,
}

impl Args {
    fn scenario(&self) -> Result<Scenario> {
        let mut scenario = match &self.scenario {
            Some(path) => scenario::load(path)?,
            None => Scenario::default(),
        };

        if let Some(radius) = self.radius {
            scenario.board.radius = radius;
        }
        if let Some(distance) = self.distance {
            scenario.board.distance = distance;
        }
        if let Some(player) = self.player {
            scenario.controller.player = player;
        }

        scenario.validate().context("command-line overrides are invalid")?;
        Ok(scenario)
    }
}

/// Entry point for the Contagion command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let scenario = args.scenario()?;
    let report = play(&scenario)?;
    println!("{report}");
    Ok(())
}

/// Summary of the board once every scripted action has been attempted.
#[derive(Debug, PartialEq, Eq)]
struct Report {
    cells: usize,
    applied: usize,
    skipped: usize,
    levels: BTreeMap<u8, usize>,
    owners: BTreeMap<PlayerId, usize>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} cells, {} actions applied, {} skipped",
            self.cells, self.applied, self.skipped
        )?;
        for (level, count) in &self.levels {
            writeln!(f, "  level {level}: {count}")?;
        }
        for (player, count) in &self.owners {
            writeln!(f, "  player {}: {count}", player.get())?;
        }
        Ok(())
    }
}

fn play(scenario: &Scenario) -> Result<Report> {
    let mut world = World::new();
    let mut events = Vec::new();
    configure(&mut world, scenario.board, &mut events)?;

    let mut controller = Controller::new(scenario.controller.to_config())
        .context("scenario arsenal is invalid")?;
    let mut commands = Vec::new();
    let mut applied = 0;
    let mut skipped = 0;

    for (index, action) in scenario.actions.iter().enumerate() {
        let coord = action.coord();
        let cell = query::cell_at(&world, coord)
            .with_context(|| format!("action {index} targets {coord}, which is off the board"))?;

        world::apply(&mut world, Command::Tick { dt: action.wait() }, &mut events);

        controller.handle(
            &events,
            ControllerInput::confirmed(cell, action.slot),
            |cell, level| query::can_apply(&world, cell, level),
            &mut commands,
        );
        events.clear();

        if commands.is_empty() {
            tracing::info!(index, %coord, slot = action.slot, "action skipped");
            skipped += 1;
            continue;
        }

        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        if events
            .iter()
            .any(|event| matches!(event, Event::PowerApplied { .. }))
        {
            applied += 1;
        } else {
            skipped += 1;
        }
    }

    Ok(summarise(&world, applied, skipped))
}

fn configure(world: &mut World, config: BoardConfig, events: &mut Vec<Event>) -> Result<()> {
    world::apply(world, Command::ConfigureBoard { config }, events);
    if let Some(Event::BoardConfigurationRejected { reason, .. }) = events
        .iter()
        .find(|event| matches!(event, Event::BoardConfigurationRejected { .. }))
    {
        bail!("board configuration rejected: {reason}");
    }
    Ok(())
}

fn summarise(world: &World, applied: usize, skipped: usize) -> Report {
    let view = query::board_view(world);
    let mut levels: BTreeMap<u8, usize> = (MIN_LEVEL..=MAX_LEVEL).map(|level| (level, 0)).collect();
    let mut owners = BTreeMap::new();

    for cell in view.iter() {
        *levels.entry(cell.level).or_default() += 1;
        if let Some(owner) = cell.owner {
            *owners.entry(owner).or_default() += 1;
        }
    }

    Report {
        cells: view.len(),
        applied,
        skipped,
        levels,
        owners,
    }
}
