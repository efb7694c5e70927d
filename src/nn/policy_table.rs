//! Fixed-size policy layout.
//!
//! Every cell owns a block of [`SLOTS_PER_CELL`] slots:
//!
//! ```text
//! 0          place flat
//! 1          place wall
//! 2 + 64*d   stack moves in direction d (Direction::index order),
//!            slot (drop1 - 1) * 8 + drop2 within the block
//! ```
//!
//! `drop3` is not stored; it is whatever is left of the source stack. That is
//! why decoding needs the state.

use crate::core::{Cell, Direction, GameState, Move, CELL_COUNT, MAX_HEIGHT};
use crate::rules::legal_moves;

/// Stack-move slots per direction.
const SPREAD_SLOTS: usize = MAX_HEIGHT * MAX_HEIGHT;

/// Slots per cell: two placements plus four direction blocks.
pub const SLOTS_PER_CELL: usize = 2 + Direction::ALL.len() * SPREAD_SLOTS;

/// Length of every policy vector.
pub const POLICY_SIZE: usize = CELL_COUNT * SLOTS_PER_CELL;

/// Bidirectional move ↔ policy index mapping.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolicyTable;

impl PolicyTable {
    /// Policy index of a move. Always below [`POLICY_SIZE`] for legal moves.
    ///
    /// Slots are laid out per cell as `(direction, drop1 - 1, drop2)`, which
    /// does not line up with a 6×7×8×8 TakNet policy tensor.
    #[must_use]
    pub fn index_of(mv: &Move) -> usize {
        let base = mv.cell().index() * SLOTS_PER_CELL;
        match *mv {
            Move::PlaceFlat { .. } => base,
            Move::PlaceWall { .. } => base + 1,
            Move::MoveStack {
                direction, drops, ..
            } => {
                let drop1 = usize::from(drops[0]).saturating_sub(1);
                let drop2 = usize::from(drops[1]);
                base + 2 + direction.index() * SPREAD_SLOTS + drop1 * MAX_HEIGHT + drop2
            }
        }
    }

    /// The legal move stored at `index` in `state`, if any.
    #[must_use]
    pub fn move_at(index: usize, state: &GameState) -> Option<Move> {
        if index >= POLICY_SIZE {
            return None;
        }
        let cell = Cell::from_index(index / SLOTS_PER_CELL);
        let mv = match index % SLOTS_PER_CELL {
            0 => Move::PlaceFlat { cell },
            1 => Move::PlaceWall { cell },
            slot => {
                let slot = slot - 2;
                let direction = Direction::ALL[slot / SPREAD_SLOTS];
                let drop1 = slot % SPREAD_SLOTS / MAX_HEIGHT + 1;
                let drop2 = slot % MAX_HEIGHT;
                let drop3 = state.board().height(cell).checked_sub(drop1 + drop2)?;
                Move::MoveStack {
                    cell,
                    direction,
                    drops: [drop1 as u8, drop2 as u8, drop3 as u8],
                }
            }
        };
        legal_moves(state).contains(&mv).then_some(mv)
    }

    /// Gather one entry of a full policy vector per move.
    #[must_use]
    pub fn gather(policy: &[f32], moves: &[Move]) -> Vec<f32> {
        moves
            .iter()
            .map(|mv| policy.get(Self::index_of(mv)).copied().unwrap_or(0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::apply_move;
    use std::collections::HashSet;

    #[test]
    fn test_policy_size() {
        assert_eq!(SLOTS_PER_CELL, 258);
        assert_eq!(POLICY_SIZE, 4128);
    }

    #[test]
    fn test_placement_indices() {
        assert_eq!(PolicyTable::index_of(&Move::PlaceFlat { cell: Cell::new(0, 0) }), 0);
        assert_eq!(PolicyTable::index_of(&Move::PlaceWall { cell: Cell::new(0, 0) }), 1);
        assert_eq!(
            PolicyTable::index_of(&Move::PlaceFlat { cell: Cell::new(1, 0) }),
            SLOTS_PER_CELL
        );
        assert_eq!(
            PolicyTable::index_of(&Move::PlaceWall { cell: Cell::new(3, 3) }),
            15 * SLOTS_PER_CELL + 1
        );
    }

    #[test]
    fn test_spread_index() {
        let mv = Move::MoveStack {
            cell: Cell::new(0, 0),
            direction: Direction::East,
            drops: [2, 1, 0],
        };
        assert_eq!(PolicyTable::index_of(&mv), 2 + 3 * 64 + 8 + 1);
    }

    #[test]
    fn test_round_trip_on_played_position() {
        let mut state = GameState::new();
        for mv in [
            Move::PlaceFlat { cell: Cell::new(1, 1) },
            Move::PlaceFlat { cell: Cell::new(2, 1) },
            Move::MoveStack {
                cell: Cell::new(1, 1),
                direction: Direction::East,
                drops: [1, 0, 0],
            },
            Move::PlaceFlat { cell: Cell::new(0, 0) },
            Move::PlaceWall { cell: Cell::new(3, 3) },
            Move::PlaceFlat { cell: Cell::new(1, 0) },
        ] {
            state = apply_move(&state, &mv);
        }

        let moves = legal_moves(&state);
        let mut seen = HashSet::new();
        for mv in &moves {
            let index = PolicyTable::index_of(mv);
            assert!(index < POLICY_SIZE);
            assert!(seen.insert(index), "duplicate index for {mv:?}");
            assert_eq!(PolicyTable::move_at(index, &state), Some(*mv));
        }
    }

    #[test]
    fn test_move_at_rejects_illegal_slots() {
        let state = apply_move(&GameState::new(), &Move::PlaceFlat { cell: Cell::new(0, 0) });
        // Occupied cell.
        assert_eq!(PolicyTable::move_at(0, &state), None);
        // Opponent's stack.
        assert_eq!(PolicyTable::move_at(2 + 3 * 64, &state), None);
        assert_eq!(PolicyTable::move_at(POLICY_SIZE, &state), None);
    }

    #[test]
    fn test_gather() {
        let mut policy = vec![0.0; POLICY_SIZE];
        policy[SLOTS_PER_CELL + 1] = 0.5;
        let moves = [
            Move::PlaceFlat { cell: Cell::new(0, 0) },
            Move::PlaceWall { cell: Cell::new(1, 0) },
        ];
        assert_eq!(PolicyTable::gather(&policy, &moves), vec![0.0, 0.5]);
    }
}
