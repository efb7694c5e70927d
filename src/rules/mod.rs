//! Rules of the 4×4 stacking game.
//!
//! - `engine`: legal move enumeration, move application, game outcome
//! - `roads`: union-find road detection
//! - `notation`: move text parsing and formatting
//!
//! The search and the self-play driver only ever see states produced here.

pub mod engine;
pub mod notation;
pub mod roads;

pub use engine::{apply_move, legal_moves, outcome, tiles_eval, try_apply, Outcome, RulesError};
pub use notation::{parse_move, NotationError};
pub use roads::road_winner;
