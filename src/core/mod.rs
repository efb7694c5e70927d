//! Core types: players, board geometry, moves, game state and RNG.
//!
//! Nothing here knows the rules; legality and outcomes live in
//! [`crate::rules`].

pub mod action;
pub mod board;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Move, MAX_DROPS};
pub use board::{
    Board, Cell, Direction, Piece, PieceKind, Stack, BOARD_SIZE, CELL_COUNT, DEPTH_SLOTS,
    MAX_HEIGHT, WALL_CODE_OFFSET,
};
pub use player::{Player, PlayerMap};
pub use rng::GameRng;
pub use state::{GameState, StateError, StateSnapshot, STARTING_PIECES};
