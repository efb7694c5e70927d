//! Game state: board, piece reserves and the side to move.
//!
//! A `GameState` is never mutated once handed out. The rules engine derives
//! successor states from it (see [`crate::rules::apply_move`]).
//!
//! `StateSnapshot` is the plain-data form written into training records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{Board, Cell, PieceKind, BOARD_SIZE, DEPTH_SLOTS, MAX_HEIGHT};
use super::player::{Player, PlayerMap};

/// Pieces each player starts with in reserve.
pub const STARTING_PIECES: u8 = 15;

/// Errors raised when rebuilding a state from external data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown piece code in board data")]
    UnknownPieceCode,

    #[error("stack on {0} exceeds the height limit of {MAX_HEIGHT}")]
    StackTooTall(Cell),

    #[error("reserve of {count} exceeds the starting reserve of {STARTING_PIECES}")]
    ReserveTooLarge { count: u8 },
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    board: Board,
    pieces_remaining: PlayerMap<u8>,
    turn: Player,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Empty board, full reserves, player 1 to move.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            pieces_remaining: PlayerMap::with_value(STARTING_PIECES),
            turn: Player::One,
        }
    }

    /// Assemble a state from parts, checking reserve and height invariants.
    pub fn from_parts(
        board: Board,
        pieces_remaining: PlayerMap<u8>,
        turn: Player,
    ) -> Result<Self, StateError> {
        for (_, &count) in pieces_remaining.iter() {
            if count > STARTING_PIECES {
                return Err(StateError::ReserveTooLarge { count });
            }
        }
        if let Some(cell) = Cell::all().find(|&c| board.height(c) > MAX_HEIGHT) {
            return Err(StateError::StackTooTall(cell));
        }
        Ok(Self {
            board,
            pieces_remaining,
            turn,
        })
    }

    #[inline]
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The player about to move.
    #[inline]
    #[must_use]
    pub fn turn(&self) -> Player {
        self.turn
    }

    #[inline]
    #[must_use]
    pub fn pieces_remaining(&self, player: Player) -> u8 {
        self.pieces_remaining[player]
    }

    /// Derive a successor. Only the rules engine changes states.
    pub(crate) fn successor(&self, change: impl FnOnce(&mut Board, &mut PlayerMap<u8>)) -> Self {
        let mut next = self.clone();
        change(&mut next.board, &mut next.pieces_remaining);
        next.turn = next.turn.opponent();
        next
    }

    /// Plain-data snapshot for serialization.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            board: self.board.codes(),
            pieces_remaining: *self.pieces_remaining.as_array(),
            turn: self.turn,
        }
    }
}

/// Serializable view of a [`GameState`].
///
/// `board` is indexed `[file][rank][depth]` with depth 0 on top; piece codes
/// are 0 (empty), 1/2 (flats) and 11/12 (walls).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub board: [[[u8; DEPTH_SLOTS]; BOARD_SIZE]; BOARD_SIZE],
    pub pieces_remaining: [u8; 2],
    pub turn: Player,
}

impl TryFrom<&StateSnapshot> for GameState {
    type Error = StateError;

    fn try_from(snapshot: &StateSnapshot) -> Result<Self, Self::Error> {
        for (file, ranks) in snapshot.board.iter().enumerate() {
            for (rank, codes) in ranks.iter().enumerate() {
                if codes[MAX_HEIGHT] != 0 {
                    return Err(StateError::StackTooTall(Cell::new(file as u8, rank as u8)));
                }
            }
        }
        let board = Board::from_codes(&snapshot.board).ok_or(StateError::UnknownPieceCode)?;
        let [one, two] = snapshot.pieces_remaining;
        GameState::from_parts(board, PlayerMap::new(one, two), snapshot.turn)
    }
}

impl std::fmt::Display for GameState {
    /// Compact grid: stacks top-first, `1`/`2` for flats, `A`/`B` for walls.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.board.tallest().max(1) + 1;
        write!(f, "  ")?;
        for file in 0..BOARD_SIZE {
            write!(f, " {:<width$}", (b'a' + file as u8) as char)?;
        }
        writeln!(f)?;
        for rank in 0..BOARD_SIZE {
            write!(f, "{} ", rank + 1)?;
            for file in 0..BOARD_SIZE {
                let stack = self.board.stack(Cell::new(file as u8, rank as u8));
                let text: String = if stack.is_empty() {
                    ".".to_string()
                } else {
                    stack
                        .top_down()
                        .map(|p| match (p.kind, p.owner) {
                            (PieceKind::Flat, Player::One) => '1',
                            (PieceKind::Flat, Player::Two) => '2',
                            (PieceKind::Wall, Player::One) => 'A',
                            (PieceKind::Wall, Player::Two) => 'B',
                        })
                        .collect()
                };
                write!(f, " {text:<width$}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "reserves: {} / {}, to move: {}",
            self.pieces_remaining[Player::One],
            self.pieces_remaining[Player::Two],
            self.turn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::Piece;

    #[test]
    fn test_new_state() {
        let state = GameState::new();
        assert_eq!(state.turn(), Player::One);
        assert_eq!(state.pieces_remaining(Player::One), 15);
        assert_eq!(state.pieces_remaining(Player::Two), 15);
        assert!(Cell::all().all(|c| state.board().stack(c).is_empty()));
    }

    #[test]
    fn test_successor_flips_turn_and_keeps_parent() {
        let state = GameState::new();
        let next = state.successor(|board, reserves| {
            board.stack_mut(Cell::new(0, 0)).push(Piece::flat(Player::One));
            reserves[Player::One] -= 1;
        });

        assert_eq!(next.turn(), Player::Two);
        assert_eq!(next.pieces_remaining(Player::One), 14);
        assert_eq!(next.board().height(Cell::new(0, 0)), 1);
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let state = GameState::new().successor(|board, reserves| {
            board.stack_mut(Cell::new(2, 3)).push(Piece::wall(Player::One));
            reserves[Player::One] -= 1;
        });
        let snapshot = state.snapshot();
        assert_eq!(snapshot.board[2][3][0], 11);
        assert_eq!(snapshot.pieces_remaining, [14, 15]);
        assert_eq!(snapshot.turn, Player::Two);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: StateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(GameState::try_from(&back).unwrap(), state);
    }

    #[test]
    fn test_snapshot_rejects_bad_data() {
        let mut snapshot = GameState::new().snapshot();
        snapshot.board[0][0][0] = 7;
        assert_eq!(
            GameState::try_from(&snapshot),
            Err(StateError::UnknownPieceCode)
        );

        let mut snapshot = GameState::new().snapshot();
        snapshot.pieces_remaining = [16, 15];
        assert_eq!(
            GameState::try_from(&snapshot),
            Err(StateError::ReserveTooLarge { count: 16 })
        );
    }

    #[test]
    fn test_display() {
        let state = GameState::new().successor(|board, _| {
            board.stack_mut(Cell::new(0, 0)).push(Piece::flat(Player::Two));
            board.stack_mut(Cell::new(0, 0)).push(Piece::wall(Player::One));
        });
        let text = format!("{state}");
        assert!(text.contains("A2"));
        assert!(text.contains("to move: Player 2"));
    }
}
