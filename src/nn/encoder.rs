//! Board encoding for network input.
//!
//! The board becomes a `[4, 4, 9]` tensor indexed `[file][rank][depth]` with
//! depth 0 at the top of each stack. Values are relative to the side to move:
//!
//! | piece            | value |
//! |------------------|-------|
//! | empty            |  0    |
//! | own flat         | -1    |
//! | opponent flat    | +1    |
//! | own wall         | -2    |
//! | opponent wall    | +2    |
//!
//! Because the encoding is relative, the same position looks identical to
//! the network whichever physical player is to move.

use crate::core::{Cell, GameState, Piece, PieceKind, BOARD_SIZE, DEPTH_SLOTS};

use super::policy_table::POLICY_SIZE;
use super::traits::EncodedState;

/// Encodes game state into tensors for neural network input.
pub trait StateEncoder: Send + Sync {
    /// Encode the state from the perspective of the side to move.
    fn encode(&self, state: &GameState) -> EncodedState;

    /// Shape of encoded states.
    fn output_shape(&self) -> Vec<usize>;

    /// Length of the policy vector the network must produce.
    fn action_space_size(&self) -> usize;
}

/// The `[file][rank][depth]` board encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoardEncoder;

impl BoardEncoder {
    /// Flat tensor offset of a `(cell, depth)` slot.
    #[inline]
    #[must_use]
    pub fn offset(cell: Cell, depth: usize) -> usize {
        (usize::from(cell.file) * BOARD_SIZE + usize::from(cell.rank)) * DEPTH_SLOTS + depth
    }

    fn piece_value(piece: Piece, state: &GameState) -> f32 {
        let magnitude = match piece.kind {
            PieceKind::Flat => 1.0,
            PieceKind::Wall => 2.0,
        };
        if piece.owner == state.turn() {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl StateEncoder for BoardEncoder {
    fn encode(&self, state: &GameState) -> EncodedState {
        let mut tensor = vec![0.0f32; BOARD_SIZE * BOARD_SIZE * DEPTH_SLOTS];
        for cell in Cell::all() {
            for (depth, piece) in state.board().stack(cell).top_down().enumerate() {
                tensor[Self::offset(cell, depth)] = Self::piece_value(piece, state);
            }
        }
        EncodedState::new(tensor, self.output_shape())
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![BOARD_SIZE, BOARD_SIZE, DEPTH_SLOTS]
    }

    fn action_space_size(&self) -> usize {
        POLICY_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, Move};
    use crate::rules::apply_move;

    #[test]
    fn test_empty_board_encodes_to_zeros() {
        let encoded = BoardEncoder.encode(&GameState::new());
        assert_eq!(encoded.shape, vec![4, 4, 9]);
        assert_eq!(encoded.len(), 144);
        assert!(encoded.tensor.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_encoding_is_relative_to_mover() {
        let state = apply_move(&GameState::new(), &Move::PlaceFlat { cell: Cell::new(1, 2) });
        let state = apply_move(&state, &Move::PlaceWall { cell: Cell::new(3, 0) });
        // Player 1 to move: own flat -1, opponent wall +2.
        let encoded = BoardEncoder.encode(&state);
        assert_eq!(encoded.get(BoardEncoder::offset(Cell::new(1, 2), 0)), Some(-1.0));
        assert_eq!(encoded.get(BoardEncoder::offset(Cell::new(3, 0), 0)), Some(2.0));

        let state = apply_move(&state, &Move::PlaceFlat { cell: Cell::new(0, 0) });
        // Player 2 to move: signs flip.
        let encoded = BoardEncoder.encode(&state);
        assert_eq!(encoded.get(BoardEncoder::offset(Cell::new(1, 2), 0)), Some(1.0));
        assert_eq!(encoded.get(BoardEncoder::offset(Cell::new(3, 0), 0)), Some(-2.0));
    }

    #[test]
    fn test_depth_zero_is_top() {
        let state = apply_move(&GameState::new(), &Move::PlaceFlat { cell: Cell::new(0, 0) });
        let state = apply_move(&state, &Move::PlaceFlat { cell: Cell::new(1, 0) });
        let state = apply_move(
            &state,
            &Move::MoveStack {
                cell: Cell::new(0, 0),
                direction: Direction::East,
                drops: [1, 0, 0],
            },
        );
        // b1 now holds P1 flat over P2 flat; player 2 to move.
        let encoded = BoardEncoder.encode(&state);
        assert_eq!(encoded.get(BoardEncoder::offset(Cell::new(1, 0), 0)), Some(1.0));
        assert_eq!(encoded.get(BoardEncoder::offset(Cell::new(1, 0), 1)), Some(-1.0));
        assert_eq!(encoded.get(BoardEncoder::offset(Cell::new(1, 0), 2)), Some(0.0));
        assert_eq!(encoded.get(BoardEncoder::offset(Cell::new(0, 0), 0)), Some(0.0));
    }
}
