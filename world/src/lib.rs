#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Contagion.

use contagion_core::{BoardConfig, CellId, Command, Event};

mod board;
mod spread;

pub use board::{planar_position, Board, Cell};
pub use spread::{SpreadEffect, SpreadOutcome};

/// Represents the authoritative Contagion game state.
#[derive(Debug)]
pub struct World {
    board: Board,
}

impl World {
    /// Creates a new world holding a board built from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        let config = BoardConfig::default();
        let board = Board::build(config, CellId::new(0)).unwrap_or_else(|error| {
            tracing::error!(%error, "default board could not be generated");
            Board::empty(config, CellId::new(0))
        });
        Self { board }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard { config } => {
            if let Err(reason) = config.validate() {
                tracing::warn!(%reason, "board configuration rejected");
                out_events.push(Event::BoardConfigurationRejected { config, reason });
                return;
            }

            if world.board.config() == config {
                return;
            }

            match world.board.rebuild(config) {
                Ok(()) => out_events.push(Event::BoardRebuilt {
                    config,
                    cells: world.board.len(),
                }),
                Err(error) => {
                    tracing::error!(%error, "board rebuild failed; keeping previous board");
                }
            }
        }
        Command::ApplyPower {
            cell,
            level,
            player,
        } => {
            let effect = SpreadEffect::new(level, player);
            match effect.apply(&mut world.board, cell, out_events) {
                Ok(outcome) => out_events.push(Event::PowerApplied {
                    origin: outcome.origin,
                    player,
                    affected: outcome.affected.len(),
                }),
                Err(reason) => {
                    tracing::warn!(%reason, player = player.get(), "power application rejected");
                    out_events.push(Event::PowerRejected {
                        cell,
                        level: level.level(),
                        player,
                        reason,
                    });
                }
            }
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use contagion_core::{BoardConfig, BoardError, CellId, HexCoord, PlayerId, PowerLevel};
    use glam::Vec3;

    use super::{Board, World};

    /// Provides read-only access to the current board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Layout the current board was generated from.
    #[must_use]
    pub fn config(world: &World) -> BoardConfig {
        world.board.config()
    }

    /// Identifier of the cell at `coord`, if the coordinate lies on the board.
    #[must_use]
    pub fn cell_at(world: &World, coord: HexCoord) -> Option<CellId> {
        world.board.cell_at(coord)
    }

    /// Coordinate of `cell`, if the cell belongs to the current board.
    #[must_use]
    pub fn coord_of(world: &World, cell: CellId) -> Option<HexCoord> {
        world.board.coord_of(cell)
    }

    /// Identifiers of the cells adjacent to `cell`, in direction order.
    pub fn adjacent_cells(world: &World, cell: CellId) -> Result<Vec<CellId>, BoardError> {
        Ok(world.board.adjacent_cells(cell)?.collect())
    }

    /// Reports whether `level` could currently be applied to `cell`.
    ///
    /// Cells that are not on the board accept nothing.
    #[must_use]
    pub fn can_apply(world: &World, cell: CellId, level: &PowerLevel) -> bool {
        world
            .board
            .cell(cell)
            .is_some_and(|cell| cell.power().can_apply(level))
    }

    /// Captures a read-only snapshot of a single cell.
    #[must_use]
    pub fn cell_view(world: &World, cell: CellId) -> Option<CellSnapshot> {
        world.board.cell(cell).map(CellSnapshot::from)
    }

    /// Captures a read-only view of every cell on the board.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView {
        BoardView {
            snapshots: world.board.iter().map(CellSnapshot::from).collect(),
        }
    }

    /// Read-only snapshot describing all cells on the board.
    #[derive(Clone, Debug, PartialEq)]
    pub struct BoardView {
        snapshots: Vec<CellSnapshot>,
    }

    impl BoardView {
        /// Iterator over the captured cell snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &CellSnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured cells.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the view holds no cells.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<CellSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single cell's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CellSnapshot {
        /// Identifier allocated to the cell.
        pub id: CellId,
        /// Board coordinate of the cell.
        pub coord: HexCoord,
        /// Centre of the cell in world units.
        pub position: Vec3,
        /// Current power level.
        pub level: u8,
        /// Player controlling the cell, if any.
        pub owner: Option<PlayerId>,
    }

    impl From<&super::Cell> for CellSnapshot {
        fn from(cell: &super::Cell) -> Self {
            Self {
                id: cell.id(),
                coord: cell.coord(),
                position: cell.position(),
                level: cell.power().level(),
                owner: cell.owner(),
            }
        }
    }
}
