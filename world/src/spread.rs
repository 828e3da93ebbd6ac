//! Power propagation across the board.

use std::collections::{BTreeMap, BTreeSet};

use contagion_core::{CellId, Event, LevelTransition, PlayerId, PowerLevel, SpreadError};

use crate::board::Board;

/// Request to apply a power level to a cell and cascade the spill-over.
///
/// An effect is created per player action and consumed by
/// [`SpreadEffect::apply`]. It carries the guard set of cells that already
/// radiated during the pass, so every cell acts as a spread source at most
/// once while still absorbing every spill that reaches it.
#[derive(Clone, Debug)]
pub struct SpreadEffect {
    level: PowerLevel,
    player: PlayerId,
    radiated: BTreeSet<CellId>,
}

/// Result of a completed propagation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpreadOutcome {
    /// Cell the effect was applied to.
    pub origin: CellId,
    /// Every cell that received power at least once, the origin included.
    pub affected: BTreeSet<CellId>,
    /// Cells that radiated power to their neighbours, in processing order.
    pub sources: Vec<CellId>,
    /// Level changes in the order they were applied.
    pub transitions: Vec<(CellId, LevelTransition)>,
}

impl SpreadEffect {
    /// Creates an effect applying `level` on behalf of `player`.
    #[must_use]
    pub fn new(level: PowerLevel, player: PlayerId) -> Self {
        Self {
            level,
            player,
            radiated: BTreeSet::new(),
        }
    }

    /// Level the effect applies to its target.
    #[must_use]
    pub const fn level(&self) -> &PowerLevel {
        &self.level
    }

    /// Player credited with every change made by the effect.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Applies the effect to `target` and spreads the result across `board`.
    ///
    /// The target must accept the effect's level; otherwise the board is left
    /// untouched and an error is returned.
    ///
    /// Spill-over advances in plies. Every source of a ply computes its spill
    /// from its current level before any neighbour is touched. Each receiving
    /// cell then absorbs the spills addressed to it in ascending level order,
    /// skipping those it cannot accept. Cells that changed and have not yet
    /// radiated form the next ply. The final board therefore does not depend
    /// on neighbour enumeration order.
    ///
    /// One [`Event::PowerLevelChanged`] is pushed to `out` per level change.
    pub fn apply(
        mut self,
        board: &mut Board,
        target: CellId,
        out: &mut Vec<Event>,
    ) -> Result<SpreadOutcome, SpreadError> {
        let current = board
            .cell(target)
            .ok_or(SpreadError::NotOnBoard { cell: target })?
            .power();
        if !current.can_apply(&self.level) {
            return Err(SpreadError::InvalidApplication {
                cell: target,
                current: current.level(),
                incoming: self.level.level(),
            });
        }

        let mut outcome = SpreadOutcome {
            origin: target,
            ..SpreadOutcome::default()
        };

        let level = self.level;
        if !self.charge(board, target, &level, &mut outcome, out) {
            return Err(SpreadError::InvalidApplication {
                cell: target,
                current: current_level(board, target),
                incoming: level.level(),
            });
        }

        let mut ply = vec![target];
        while !ply.is_empty() {
            let mut inbox: BTreeMap<CellId, Vec<PowerLevel>> = BTreeMap::new();
            for source in std::mem::take(&mut ply) {
                let Some(spill) = board
                    .cell(source)
                    .and_then(|cell| cell.power().spread_power())
                else {
                    continue;
                };
                let Ok(neighbours) = board.adjacent_cells(source) else {
                    continue;
                };

                for neighbour in neighbours {
                    inbox.entry(neighbour).or_default().push(spill);
                }
                let _ = self.radiated.insert(source);
                outcome.sources.push(source);
            }

            for (cell, mut spills) in inbox {
                spills.sort_by_key(PowerLevel::level);
                let mut changed = false;
                for spill in &spills {
                    changed |= self.charge(board, cell, spill, &mut outcome, out);
                }
                if changed && !self.radiated.contains(&cell) {
                    ply.push(cell);
                }
            }
        }

        tracing::debug!(
            origin = target.get(),
            player = self.player.get(),
            level = self.level.level(),
            affected = outcome.affected.len(),
            sources = outcome.sources.len(),
            "power spread complete"
        );

        Ok(outcome)
    }

    fn charge(
        &self,
        board: &mut Board,
        cell: CellId,
        incoming: &PowerLevel,
        outcome: &mut SpreadOutcome,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(target) = board.cell_mut(cell) else {
            return false;
        };
        let coord = target.coord();

        match target.power_mut().apply(incoming, self.player) {
            Ok(transition) => {
                let _ = outcome.affected.insert(cell);
                outcome.transitions.push((cell, transition));
                out.push(Event::PowerLevelChanged {
                    cell,
                    coord,
                    from: transition.from,
                    to: transition.to,
                    player: transition.player,
                });
                true
            }
            Err(error) => {
                tracing::trace!(cell = cell.get(), %error, "spill not absorbed");
                false
            }
        }
    }
}

fn current_level(board: &Board, cell: CellId) -> u8 {
    board
        .cell(cell)
        .map_or(contagion_core::MIN_LEVEL, |cell| cell.power().level())
}

#[cfg(test)]
mod tests {
    use contagion_core::{BoardConfig, HexCoord};
    use proptest::prelude::*;

    use super::*;
    use crate::board::Cell;

    const PLAYER_A: PlayerId = PlayerId::new(1);
    const PLAYER_B: PlayerId = PlayerId::new(2);

    fn board(radius: u32) -> Board {
        Board::build(BoardConfig::new(radius, 1.0), CellId::new(0)).expect("board builds")
    }

    fn level(value: u8) -> PowerLevel {
        PowerLevel::new(value).expect("valid level")
    }

    fn level_at(board: &Board, coord: HexCoord) -> u8 {
        let id = board.cell_at(coord).expect("coordinate on board");
        board.cell(id).expect("cell present").power().level()
    }

    #[test]
    fn radius_two_scenario_charges_origin_and_ring() {
        let mut board = board(2);
        let origin = board.cell_at(HexCoord::ORIGIN).expect("origin");
        let mut events = Vec::new();

        let outcome = SpreadEffect::new(level(2), PLAYER_A)
            .apply(&mut board, origin, &mut events)
            .expect("origin accepts level two");

        assert_eq!(level_at(&board, HexCoord::ORIGIN), 2);
        for neighbour in HexCoord::ORIGIN.neighbors() {
            assert_eq!(level_at(&board, neighbour), 2, "neighbour {neighbour}");
        }
        assert!(board.iter().all(|cell| cell.owner() == Some(PLAYER_A)));
        assert_eq!(outcome.affected.len(), 7);
        assert_eq!(outcome.transitions.len(), 7);
        assert_eq!(events.len(), 7);

        let unique: BTreeSet<CellId> = outcome.sources.iter().copied().collect();
        assert_eq!(unique.len(), outcome.sources.len());
        assert_eq!(outcome.sources.first(), Some(&origin));
    }

    #[test]
    fn first_event_reports_the_origin_transition() {
        let mut board = board(2);
        let origin = board.cell_at(HexCoord::ORIGIN).expect("origin");
        let mut events = Vec::new();

        let _ = SpreadEffect::new(level(3), PLAYER_A)
            .apply(&mut board, origin, &mut events)
            .expect("applicable");

        assert_eq!(
            events.first(),
            Some(&Event::PowerLevelChanged {
                cell: origin,
                coord: HexCoord::ORIGIN,
                from: 1,
                to: 3,
                player: PLAYER_A,
            })
        );
    }

    #[test]
    fn rejected_target_leaves_board_untouched() {
        let mut board = board(2);
        let origin = board.cell_at(HexCoord::ORIGIN).expect("origin");
        let mut events = Vec::new();
        let _ = SpreadEffect::new(level(4), PLAYER_A)
            .apply(&mut board, origin, &mut events)
            .expect("applicable");
        let before: Vec<u8> = board.iter().map(|cell| cell.power().level()).collect();
        events.clear();

        let error = SpreadEffect::new(level(2), PLAYER_B)
            .apply(&mut board, origin, &mut events)
            .expect_err("maximum level accepts nothing");

        assert_eq!(
            error,
            SpreadError::InvalidApplication {
                cell: origin,
                current: 4,
                incoming: 2
            }
        );
        let after: Vec<u8> = board.iter().map(|cell| cell.power().level()).collect();
        assert_eq!(before, after);
        assert!(events.is_empty());
    }

    #[test]
    fn unknown_target_is_not_on_board() {
        let mut board = board(2);
        let mut events = Vec::new();
        let stranger = CellId::new(500);

        assert_eq!(
            SpreadEffect::new(level(2), PLAYER_A).apply(&mut board, stranger, &mut events),
            Err(SpreadError::NotOnBoard { cell: stranger })
        );
    }

    #[test]
    fn level_one_on_a_fresh_cell_escalates_and_spills() {
        let mut board = board(3);
        let origin = board.cell_at(HexCoord::ORIGIN).expect("origin");
        let mut events = Vec::new();

        let outcome = SpreadEffect::new(level(1), PLAYER_A)
            .apply(&mut board, origin, &mut events)
            .expect("level one accepted by a fresh cell");

        // A fresh cell escalates to two, which spills level one outward.
        assert_eq!(level_at(&board, HexCoord::ORIGIN), 2);
        assert!(outcome.affected.len() > 1);
        assert!(outcome
            .transitions
            .iter()
            .all(|(_, transition)| transition.to == 2));
    }

    #[test]
    fn incompatible_neighbours_are_skipped_not_fatal() {
        let mut board = board(2);
        let east = board.cell_at(HexCoord::axial(1, -1)).expect("ring cell");
        let origin = board.cell_at(HexCoord::ORIGIN).expect("origin");
        let mut events = Vec::new();

        let _ = board
            .cell_mut(east)
            .expect("ring cell")
            .power_mut()
            .apply(&level(4), PLAYER_B)
            .expect("applicable");

        let outcome = SpreadEffect::new(level(3), PLAYER_A)
            .apply(&mut board, origin, &mut events)
            .expect("origin accepts");

        assert!(!outcome.affected.contains(&east));
        let cell = board.cell(east).expect("ring cell");
        assert_eq!(cell.power().level(), 4);
        assert_eq!(cell.owner(), Some(PLAYER_B));
        assert_eq!(outcome.affected.len(), 6);
    }

    #[test]
    fn every_cell_radiates_at_most_once() {
        let mut board = board(6);
        let origin = board.cell_at(HexCoord::ORIGIN).expect("origin");
        let mut events = Vec::new();

        let outcome = SpreadEffect::new(level(4), PLAYER_A)
            .apply(&mut board, origin, &mut events)
            .expect("applicable");

        let charged: BTreeSet<CellId> =
            outcome.transitions.iter().map(|(cell, _)| *cell).collect();
        assert_eq!(charged, outcome.affected);
        assert_eq!(events.len(), outcome.transitions.len());

        let unique_sources: BTreeSet<CellId> = outcome.sources.iter().copied().collect();
        assert_eq!(unique_sources.len(), outcome.sources.len());
        assert!(unique_sources.is_subset(&outcome.affected));
        assert_eq!(outcome.affected.len(), board.len());
    }

    fn preset(board: &mut Board, coord: HexCoord, value: u8) {
        let id = board.cell_at(coord).expect("coordinate on board");
        let _ = board
            .cell_mut(id)
            .expect("cell present")
            .power_mut()
            .apply(&level(value), PLAYER_B)
            .expect("fresh cell accepts the preset");
    }

    #[test]
    fn cell_between_two_sources_absorbs_both_spills() {
        let shared = HexCoord::axial(2, -1);
        for direction in [0, 1] {
            let mut board = board(3);
            preset(&mut board, HexCoord::DIRECTIONS[direction], 3);
            let origin = board.cell_at(HexCoord::ORIGIN).expect("origin");
            let mut events = Vec::new();

            let outcome = SpreadEffect::new(level(4), PLAYER_A)
                .apply(&mut board, origin, &mut events)
                .expect("applicable");

            let id = board.cell_at(shared).expect("on board");
            let steps: Vec<(u8, u8)> = outcome
                .transitions
                .iter()
                .filter(|(cell, _)| *cell == id)
                .map(|(_, transition)| (transition.from, transition.to))
                .collect();
            assert_eq!(steps, vec![(1, 2), (2, 3)], "preset in direction {direction}");
            assert_eq!(level_at(&board, shared), 3);
            assert_eq!(level_at(&board, HexCoord::DIRECTIONS[0]), 4);
            assert_eq!(level_at(&board, HexCoord::DIRECTIONS[1]), 4);
        }
    }

    fn rotate(coord: HexCoord) -> HexCoord {
        HexCoord::cube(-coord.r(), -coord.s(), -coord.q()).expect("rotation stays on the plane")
    }

    fn reflect(coord: HexCoord) -> HexCoord {
        HexCoord::cube(coord.q(), coord.s(), coord.r()).expect("reflection stays on the plane")
    }

    fn levels_after(
        presets: &[(HexCoord, u8)],
        incoming: u8,
        transform: fn(HexCoord) -> HexCoord,
    ) -> BTreeMap<HexCoord, u8> {
        let mut board = board(4);
        for (coord, value) in presets {
            if *value > 1 {
                preset(&mut board, transform(*coord), *value);
            }
        }
        let origin = board.cell_at(HexCoord::ORIGIN).expect("origin");
        let mut events = Vec::new();
        let _ = SpreadEffect::new(level(incoming), PLAYER_A)
            .apply(&mut board, origin, &mut events)
            .expect("fresh origin accepts");
        board
            .iter()
            .map(|cell| (cell.coord(), cell.power().level()))
            .collect()
    }

    proptest! {
        #[test]
        fn symmetric_boards_end_symmetric(
            values in proptest::collection::vec(1u8..=4, 37),
            incoming in 2u8..=4,
        ) {
            let mut coords: Vec<HexCoord> = board(4).iter().map(Cell::coord).collect();
            coords.sort();
            let presets: Vec<(HexCoord, u8)> = coords
                .into_iter()
                .zip(values)
                .map(|(coord, value)| (coord, if coord == HexCoord::ORIGIN { 1 } else { value }))
                .collect();

            let plain = levels_after(&presets, incoming, |coord| coord);
            for transform in [rotate as fn(HexCoord) -> HexCoord, reflect] {
                let moved = levels_after(&presets, incoming, transform);
                for (coord, value) in &plain {
                    prop_assert_eq!(moved.get(&transform(*coord)), Some(value));
                }
            }
        }
    }

    #[test]
    fn propagation_is_deterministic() {
        let run = || {
            let mut board = board(5);
            let start = board.cell_at(HexCoord::axial(1, 1)).expect("on board");
            let mut events = Vec::new();
            let outcome = SpreadEffect::new(level(3), PLAYER_A)
                .apply(&mut board, start, &mut events)
                .expect("applicable");
            let levels: Vec<u8> = board.iter().map(|cell| cell.power().level()).collect();
            (outcome, events, levels)
        };

        assert_eq!(run(), run());
    }
}
