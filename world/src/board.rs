//! Hexagonal board generation and adjacency queries.

use std::collections::{BTreeMap, HashSet, VecDeque};

use contagion_core::{
    BidirectionalMap, BoardConfig, BoardError, CellId, HexCoord, PlayerId, PowerLevel, MAX_RADIUS,
};
use glam::Vec3;

/// Single hexagon of the board together with its power state.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    id: CellId,
    coord: HexCoord,
    position: Vec3,
    power: PowerLevel,
}

impl Cell {
    fn new(id: CellId, coord: HexCoord, position: Vec3) -> Self {
        Self {
            id,
            coord,
            position,
            power: PowerLevel::minimum(),
        }
    }

    /// Identifier allocated when the board was built.
    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Board coordinate of the cell.
    #[must_use]
    pub const fn coord(&self) -> HexCoord {
        self.coord
    }

    /// Centre of the cell in world units.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Current power state.
    #[must_use]
    pub const fn power(&self) -> &PowerLevel {
        &self.power
    }

    /// Player controlling the cell, `None` while neutral.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.power.owner()
    }

    pub(crate) fn power_mut(&mut self) -> &mut PowerLevel {
        &mut self.power
    }
}

/// Bounded hexagonal grid of cells indexed by coordinate and by identifier.
///
/// A board of radius `R` holds exactly the coordinates whose length is below
/// `R`, which is `3R² − 3R + 1` cells for any positive radius. The board never
/// changes shape; a new layout means a new board.
#[derive(Clone, Debug)]
pub struct Board {
    config: BoardConfig,
    index: BidirectionalMap<HexCoord, CellId>,
    cells: BTreeMap<CellId, Cell>,
    next_cell_id: CellId,
}

impl Board {
    /// Generates a board, numbering its cells from `first_id`.
    ///
    /// Coordinates are discovered with a breadth-first flood fill from the
    /// origin. Neighbours are enqueued unconditionally and filtered when
    /// dequeued, so the frontier may briefly hold duplicates. Radii above
    /// [`MAX_RADIUS`] are rejected. The distance in `config` is used as-is;
    /// callers validate it beforehand.
    ///
    /// Identifiers are handed out up to, but excluding, `u32::MAX`; a board
    /// that would need more fails with [`BoardError::IdsExhausted`].
    pub fn build(config: BoardConfig, first_id: CellId) -> Result<Self, BoardError> {
        if config.radius > MAX_RADIUS {
            return Err(BoardError::RadiusTooLarge {
                radius: config.radius,
            });
        }

        let expected = usize::try_from(HexCoord::count_within(config.radius)).unwrap_or(0);
        let mut board = Self {
            config,
            index: BidirectionalMap::with_capacity(expected),
            cells: BTreeMap::new(),
            next_cell_id: first_id,
        };

        let mut frontier = VecDeque::from([HexCoord::ORIGIN]);
        let mut visited = HashSet::with_capacity(expected);

        while let Some(coord) = frontier.pop_front() {
            if coord.length() >= config.radius {
                continue;
            }

            if !visited.insert(coord) {
                continue;
            }

            board.add_cell(coord)?;
            frontier.extend(coord.neighbors());
        }

        tracing::debug!(
            radius = config.radius,
            distance = config.distance,
            cells = board.len(),
            "board generated"
        );

        Ok(board)
    }

    /// Board without cells that allocates identifiers from `next_cell_id`.
    #[must_use]
    pub fn empty(config: BoardConfig, next_cell_id: CellId) -> Self {
        Self {
            config,
            index: BidirectionalMap::new(),
            cells: BTreeMap::new(),
            next_cell_id,
        }
    }

    /// Discards every cell and generates a fresh board for `config`.
    ///
    /// New identifiers continue after the ones handed out so far. On failure
    /// the current board is kept.
    pub fn rebuild(&mut self, config: BoardConfig) -> Result<(), BoardError> {
        *self = Self::build(config, self.next_cell_id)?;
        Ok(())
    }

    fn add_cell(&mut self, coord: HexCoord) -> Result<(), BoardError> {
        let id = self.next_cell_id;
        let next = id.next().ok_or(BoardError::IdsExhausted)?;
        self.index.insert(coord, id)?;
        let position = planar_position(coord, self.config.distance);
        let _ = self.cells.insert(id, Cell::new(id, coord, position));
        self.next_cell_id = next;
        Ok(())
    }

    /// Layout the board was generated from.
    #[must_use]
    pub const fn config(&self) -> BoardConfig {
        self.config
    }

    /// Number of cells on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the board has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Identifier the next generated cell would receive.
    #[must_use]
    pub const fn next_cell_id(&self) -> CellId {
        self.next_cell_id
    }

    /// Looks up a cell by identifier.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(&id)
    }

    /// Identifier of the cell placed at `coord`, if it lies on the board.
    #[must_use]
    pub fn cell_at(&self, coord: HexCoord) -> Option<CellId> {
        self.index.get_by_left(&coord).copied()
    }

    /// Coordinate of the cell identified by `id`.
    #[must_use]
    pub fn coord_of(&self, id: CellId) -> Option<HexCoord> {
        self.index.get_by_right(&id).copied()
    }

    /// Coordinate-to-cell index backing the board.
    #[must_use]
    pub fn index(&self) -> &BidirectionalMap<HexCoord, CellId> {
        &self.index
    }

    /// Iterates over the cells in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Cells adjacent to `cell`, in neighbour direction order.
    ///
    /// Cells on the rim have fewer than six neighbours. The iterator is lazy
    /// and borrows the board.
    pub fn adjacent_cells(
        &self,
        cell: CellId,
    ) -> Result<impl Iterator<Item = CellId> + '_, BoardError> {
        let coord = self.coord_of(cell).ok_or(BoardError::NotOnBoard { cell })?;
        Ok(coord
            .neighbors()
            .into_iter()
            .filter_map(move |neighbor| self.cell_at(neighbor)))
    }
}

/// Projects a coordinate onto the `y = 0` plane, `distance` units per step.
#[must_use]
pub fn planar_position(coord: HexCoord, distance: f32) -> Vec3 {
    let sqrt_3 = 3.0_f32.sqrt();
    let q = coord.q() as f32;
    let r = coord.r() as f32;
    Vec3::new(
        distance * (sqrt_3 * q + sqrt_3 / 2.0 * r),
        0.0,
        distance * (1.5 * r),
    )
}
