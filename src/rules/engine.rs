//! Move generation, move application and terminal detection.
//!
//! Everything here is a pure function of a [`GameState`]:
//! - [`legal_moves`] enumerates placements and stack spreads in a fixed order,
//! - [`apply_move`] / [`try_apply`] derive the successor state,
//! - [`outcome`] decides whether the game is over and who won,
//! - [`tiles_eval`] is the cheap flat-count heuristic used as a fallback value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    Cell, Direction, GameState, Move, Piece, Player, MAX_DROPS, MAX_HEIGHT,
};

use super::roads::road_winner;

/// Result of evaluating a position for game end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    Player1Win,
    Player2Win,
    Tie,
}

impl Outcome {
    /// A win for `player`.
    #[must_use]
    pub const fn win_for(player: Player) -> Self {
        match player {
            Player::One => Outcome::Player1Win,
            Player::Two => Outcome::Player2Win,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// The winning player, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Player> {
        match self {
            Outcome::Player1Win => Some(Player::One),
            Outcome::Player2Win => Some(Player::Two),
            Outcome::InProgress | Outcome::Tie => None,
        }
    }

    /// Check if a player won.
    #[must_use]
    pub fn is_winner(self, player: Player) -> bool {
        self.winner() == Some(player)
    }

    /// +1 for a win by `player`, -1 for a loss, 0 for a tie or unfinished game.
    #[must_use]
    pub fn value_for(self, player: Player) -> f32 {
        match self.winner() {
            Some(winner) if winner == player => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "in progress"),
            Outcome::Player1Win => write!(f, "player 1 wins"),
            Outcome::Player2Win => write!(f, "player 2 wins"),
            Outcome::Tie => write!(f, "tie"),
        }
    }
}

/// Errors raised by checked move application.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("move {mv:?} is not legal for {player}: {reason}")]
    IllegalMove {
        mv: Move,
        player: Player,
        reason: &'static str,
    },
}

/// All legal moves for the side to move.
///
/// Cells are visited in row-major order. For each cell the placements come
/// first (flat, wall), then stack spreads by direction in
/// [`Direction::ALL`] order, each direction's drop tuples in lexicographic
/// order. Search ties are broken by this order.
///
/// Placements are generated even when the mover's reserve is empty; a
/// position with an empty reserve is already terminal.
#[must_use]
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    let board = state.board();
    let mover = state.turn();
    let mut moves = Vec::with_capacity(64);

    for cell in Cell::all() {
        match board.top(cell) {
            None => {
                moves.push(Move::PlaceFlat { cell });
                moves.push(Move::PlaceWall { cell });
            }
            Some(top) if top.owner == mover => {
                let height = board.height(cell);
                for direction in Direction::ALL {
                    push_spreads(state, cell, direction, height, &mut moves);
                }
            }
            Some(_) => {}
        }
    }

    moves
}

/// Free space on each cell a spread can reach, in order along `direction`.
///
/// The line stops at the board edge and before the first wall.
fn line_capacities(state: &GameState, cell: Cell, direction: Direction) -> Vec<usize> {
    let board = state.board();
    let mut capacities = Vec::with_capacity(MAX_DROPS);
    for distance in 1..=MAX_DROPS as u8 {
        let Some(next) = cell.step(direction, distance) else {
            break;
        };
        if board.top(next).is_some_and(Piece::is_wall) {
            break;
        }
        let free = MAX_HEIGHT - board.height(next);
        if free == 0 {
            break;
        }
        capacities.push(free);
    }
    capacities
}

fn push_spreads(
    state: &GameState,
    cell: Cell,
    direction: Direction,
    height: usize,
    out: &mut Vec<Move>,
) {
    let capacities = line_capacities(state, cell, direction);
    let mut spread = |drops: [usize; MAX_DROPS]| {
        out.push(Move::MoveStack {
            cell,
            direction,
            drops: drops.map(|d| d as u8),
        });
    };

    let Some(&first) = capacities.first() else {
        return;
    };
    for d1 in 1..=height.min(first) {
        let rest = height - d1;
        if rest == 0 {
            spread([d1, 0, 0]);
            continue;
        }
        let Some(&second) = capacities.get(1) else {
            continue;
        };
        for d2 in 1..=rest.min(second) {
            let rest = rest - d2;
            if rest == 0 {
                spread([d1, d2, 0]);
            } else if capacities.get(2).is_some_and(|&third| rest <= third) {
                spread([d1, d2, rest]);
            }
        }
    }
}

/// Apply a move obtained from [`legal_moves`] for this state.
///
/// The move is trusted; use [`try_apply`] for moves from outside the engine.
#[must_use]
pub fn apply_move(state: &GameState, mv: &Move) -> GameState {
    let mover = state.turn();
    match *mv {
        Move::PlaceFlat { cell } => place(state, cell, Piece::flat(mover)),
        Move::PlaceWall { cell } => place(state, cell, Piece::wall(mover)),
        Move::MoveStack {
            cell,
            direction,
            drops,
        } => state.successor(|board, _| {
            let carried = board.stack_mut(cell).take_all();
            debug_assert_eq!(carried.len(), mv.carried(), "spread must carry the whole stack");
            let mut offset = 0;
            for (distance, &drop) in (1u8..).zip(drops.iter()) {
                if drop == 0 {
                    break;
                }
                let Some(target) = cell.step(direction, distance) else {
                    debug_assert!(false, "spread runs off the board");
                    break;
                };
                let end = offset + usize::from(drop);
                board.stack_mut(target).drop_onto(&carried[offset..end]);
                offset = end;
            }
        }),
    }
}

fn place(state: &GameState, cell: Cell, piece: Piece) -> GameState {
    state.successor(|board, reserves| {
        board.stack_mut(cell).push(piece);
        reserves[piece.owner] = reserves[piece.owner].saturating_sub(1);
    })
}

/// Apply a move after checking it against the rules.
///
/// An illegal move leaves the input state untouched and returns
/// [`RulesError::IllegalMove`] naming the first violated constraint.
pub fn try_apply(state: &GameState, mv: &Move) -> Result<GameState, RulesError> {
    check_legal(state, mv).map_err(|reason| RulesError::IllegalMove {
        mv: *mv,
        player: state.turn(),
        reason,
    })?;
    Ok(apply_move(state, mv))
}

fn check_legal(state: &GameState, mv: &Move) -> Result<(), &'static str> {
    if outcome(state).is_terminal() {
        return Err("the game is over");
    }
    let board = state.board();
    match *mv {
        Move::PlaceFlat { cell } | Move::PlaceWall { cell } => {
            if board.top(cell).is_some() {
                return Err("cell is occupied");
            }
            Ok(())
        }
        Move::MoveStack {
            cell,
            direction,
            drops,
        } => {
            match board.top(cell) {
                None => return Err("source cell is empty"),
                Some(top) if top.owner != state.turn() => {
                    return Err("source stack belongs to the opponent")
                }
                Some(_) => {}
            }
            if drops[0] == 0 {
                return Err("first cell must receive at least one piece");
            }
            if drops.windows(2).any(|w| w[0] == 0 && w[1] != 0) {
                return Err("drops skip a cell");
            }
            if mv.carried() != board.height(cell) {
                return Err("drops must add up to the stack height");
            }
            let capacities = line_capacities(state, cell, direction);
            for (k, &drop) in drops.iter().enumerate().take_while(|(_, &d)| d > 0) {
                match capacities.get(k) {
                    None => return Err("drop lands off the board, on a wall or on a full stack"),
                    Some(&free) if usize::from(drop) > free => {
                        return Err("drop exceeds the height limit")
                    }
                    Some(_) => {}
                }
            }
            Ok(())
        }
    }
}

/// Decide whether the game is over.
///
/// Checked in order: reserve exhaustion (flat-top majority), a road for
/// either player, then a full board (flat-top majority).
#[must_use]
pub fn outcome(state: &GameState) -> Outcome {
    let board = state.board();
    let exhausted = Player::ALL
        .iter()
        .any(|&p| state.pieces_remaining(p) == 0);

    if exhausted {
        return flat_majority(state);
    }
    if let Some(winner) = road_winner(board) {
        return Outcome::win_for(winner);
    }
    if board.is_full() {
        return flat_majority(state);
    }
    Outcome::InProgress
}

fn flat_majority(state: &GameState) -> Outcome {
    let board = state.board();
    let one = board.flat_tops(Player::One);
    let two = board.flat_tops(Player::Two);
    match one.cmp(&two) {
        std::cmp::Ordering::Greater => Outcome::Player1Win,
        std::cmp::Ordering::Less => Outcome::Player2Win,
        std::cmp::Ordering::Equal => Outcome::Tie,
    }
}

/// Flat-top balance from the mover's perspective, in `[-1, 1]`.
#[must_use]
pub fn tiles_eval(state: &GameState) -> f32 {
    let board = state.board();
    let mine = board.flat_tops(state.turn()) as f32;
    let theirs = board.flat_tops(state.turn().opponent()) as f32;
    if mine + theirs == 0.0 {
        0.0
    } else {
        (mine - theirs) / (mine + theirs)
    }
}

impl GameState {
    /// See [`legal_moves`].
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(self)
    }

    /// See [`apply_move`].
    #[must_use]
    pub fn apply(&self, mv: &Move) -> GameState {
        apply_move(self, mv)
    }

    /// See [`outcome`].
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        outcome(self)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.outcome().is_terminal()
    }
}
