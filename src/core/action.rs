//! Move representation.
//!
//! A move is one of three variants:
//! - place a flat on an empty cell,
//! - place a wall on an empty cell,
//! - pick up a whole stack and spread it along one direction.
//!
//! Equality is structural: two stack moves are equal only if cell, direction
//! and all three drop counts match.

use serde::{Deserialize, Serialize};

use super::board::{Cell, Direction, PieceKind};

/// Number of cells beyond the source that a stack move can reach.
pub const MAX_DROPS: usize = 3;

/// A complete game move.
///
/// ```
/// use tak_zero::core::{Cell, Direction, Move};
///
/// let place = Move::PlaceFlat { cell: Cell::new(0, 0) };
/// let spread = Move::MoveStack {
///     cell: Cell::new(1, 1),
///     direction: Direction::East,
///     drops: [2, 1, 0],
/// };
///
/// assert!(place.is_placement());
/// assert_eq!(spread.carried(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    /// Place a flat from the mover's reserve.
    PlaceFlat { cell: Cell },

    /// Place a wall from the mover's reserve.
    PlaceWall { cell: Cell },

    /// Carry the whole stack on `cell` and leave `drops[k]` pieces on the
    /// `k + 1`-th cell in `direction`. Trailing entries are zero when the
    /// line is shorter than three cells.
    MoveStack {
        cell: Cell,
        direction: Direction,
        drops: [u8; MAX_DROPS],
    },
}

impl Move {
    /// The source cell for stack moves, the target cell for placements.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        match *self {
            Move::PlaceFlat { cell } | Move::PlaceWall { cell } | Move::MoveStack { cell, .. } => {
                cell
            }
        }
    }

    /// Check if this move places a new piece.
    #[must_use]
    pub const fn is_placement(&self) -> bool {
        matches!(self, Move::PlaceFlat { .. } | Move::PlaceWall { .. })
    }

    /// Piece kind placed, if this is a placement.
    #[must_use]
    pub const fn placed_kind(&self) -> Option<PieceKind> {
        match self {
            Move::PlaceFlat { .. } => Some(PieceKind::Flat),
            Move::PlaceWall { .. } => Some(PieceKind::Wall),
            Move::MoveStack { .. } => None,
        }
    }

    /// Total pieces carried by a stack move (0 for placements).
    #[must_use]
    pub fn carried(&self) -> usize {
        match self {
            Move::MoveStack { drops, .. } => drops.iter().map(|&d| usize::from(d)).sum(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Move::MoveStack {
            cell: Cell::new(1, 1),
            direction: Direction::North,
            drops: [1, 0, 0],
        };
        let b = Move::MoveStack {
            cell: Cell::new(1, 1),
            direction: Direction::North,
            drops: [1, 0, 0],
        };
        let c = Move::MoveStack {
            cell: Cell::new(1, 1),
            direction: Direction::South,
            drops: [1, 0, 0],
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(
            Move::PlaceFlat { cell: Cell::new(0, 0) },
            Move::PlaceWall { cell: Cell::new(0, 0) }
        );
    }

    #[test]
    fn test_move_accessors() {
        let spread = Move::MoveStack {
            cell: Cell::new(0, 3),
            direction: Direction::East,
            drops: [1, 2, 0],
        };
        assert_eq!(spread.cell(), Cell::new(0, 3));
        assert_eq!(spread.carried(), 3);
        assert!(!spread.is_placement());
        assert_eq!(spread.placed_kind(), None);

        let wall = Move::PlaceWall { cell: Cell::new(2, 2) };
        assert_eq!(wall.placed_kind(), Some(PieceKind::Wall));
        assert_eq!(wall.carried(), 0);
    }

    #[test]
    fn test_serialization() {
        let spread = Move::MoveStack {
            cell: Cell::new(2, 0),
            direction: Direction::West,
            drops: [1, 1, 0],
        };
        let json = serde_json::to_string(&spread).unwrap();
        assert!(json.contains("\"type\":\"move_stack\""));
        let deserialized: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(spread, deserialized);

        let flat = Move::PlaceFlat { cell: Cell::new(3, 1) };
        let json = serde_json::to_string(&flat).unwrap();
        assert_eq!(json, r#"{"type":"place_flat","cell":{"file":3,"rank":1}}"#);
    }
}
