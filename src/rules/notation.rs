//! Move text.
//!
//! Moves are written `<type><file><rank>[<direction><drops>]`:
//!
//! | part      | values                               |
//! |-----------|--------------------------------------|
//! | type      | `f` flat, `w` wall, `m` stack move   |
//! | file      | `a`..`d`                             |
//! | rank      | `1`..`4`                             |
//! | direction | `w` north, `s` south, `a` west, `d` east |
//! | drops     | up to three digits                   |
//!
//! Examples: `fa1`, `wc3`, `mb2d21`.
//!
//! Drops can be abbreviated when parsing against a position. With no digits
//! the whole stack goes to the first cell. A digit after the first is raised
//! to 1 while pieces remain, every digit is capped at what is still carried,
//! and whatever is left after the last digit goes to the following cell.
//! Formatting always writes the exact non-zero drops, so formatted text
//! parses back to the same move.

use thiserror::Error;

use crate::core::{Cell, Direction, GameState, Move, BOARD_SIZE, MAX_DROPS};

use super::engine::{try_apply, RulesError};

/// Malformed or inapplicable move text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty move text")]
    Empty,

    #[error("unknown move type '{0}', expected f, w or m")]
    UnknownMoveType(char),

    #[error("bad cell '{0}', expected a1..d4")]
    BadCell(String),

    #[error("stack move needs a direction (w, a, s or d)")]
    MissingDirection,

    #[error("unknown direction '{0}', expected w, a, s or d")]
    UnknownDirection(char),

    #[error("bad drop count '{0}'")]
    BadDrop(char),

    #[error("at most {MAX_DROPS} drop counts")]
    TooManyDrops,

    #[error("unexpected trailing text '{0}'")]
    Trailing(String),

    #[error("no stack on {0}")]
    EmptySource(Cell),

    #[error("{remaining} piece(s) left over after the last drop")]
    Leftover { remaining: usize },

    #[error(transparent)]
    Illegal(#[from] RulesError),
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::PlaceFlat { cell } => write!(f, "f{cell}"),
            Move::PlaceWall { cell } => write!(f, "w{cell}"),
            Move::MoveStack {
                cell,
                direction,
                drops,
            } => {
                write!(f, "m{cell}{}", direction.key())?;
                for drop in drops.iter().take_while(|&&d| d > 0) {
                    write!(f, "{drop}")?;
                }
                Ok(())
            }
        }
    }
}

fn parse_cell(text: &str) -> Result<Cell, NotationError> {
    let bad = || NotationError::BadCell(text.to_string());
    let mut chars = text.chars();
    let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(bad());
    };
    let file = (file as i32) - ('a' as i32);
    let rank = rank.to_digit(10).ok_or_else(bad)? as i32 - 1;
    if !(0..BOARD_SIZE as i32).contains(&rank) {
        return Err(bad());
    }
    Cell::try_new(file, rank).ok_or_else(bad)
}

/// Parse move text against `state`, filling in abbreviated drops.
///
/// The resulting move is checked against the rules, so an `Ok` move can be
/// applied to `state` directly.
pub fn parse_move(text: &str, state: &GameState) -> Result<Move, NotationError> {
    let text = text.trim();
    let mut chars = text.chars();
    let kind = chars.next().ok_or(NotationError::Empty)?;
    let rest = chars.as_str();

    let mv = match kind {
        'f' | 'w' => {
            let cell_text = rest.get(..2).unwrap_or(rest);
            let cell = parse_cell(cell_text)?;
            if rest.len() > cell_text.len() {
                return Err(NotationError::Trailing(rest[cell_text.len()..].to_string()));
            }
            if kind == 'f' {
                Move::PlaceFlat { cell }
            } else {
                Move::PlaceWall { cell }
            }
        }
        'm' => {
            let cell = parse_cell(rest.get(..2).unwrap_or(rest))?;
            let mut tail = rest[2..].chars();
            let key = tail.next().ok_or(NotationError::MissingDirection)?;
            let direction = Direction::from_key(key).ok_or(NotationError::UnknownDirection(key))?;

            let mut digits = Vec::with_capacity(MAX_DROPS);
            for c in tail {
                let digit = c.to_digit(10).ok_or(NotationError::BadDrop(c))?;
                if digits.len() == MAX_DROPS {
                    return Err(NotationError::TooManyDrops);
                }
                digits.push(digit as usize);
            }

            let height = state.board().height(cell);
            if height == 0 {
                return Err(NotationError::EmptySource(cell));
            }
            Move::MoveStack {
                cell,
                direction,
                drops: resolve_drops(height, &digits)?,
            }
        }
        other => return Err(NotationError::UnknownMoveType(other)),
    };

    try_apply(state, &mv)?;
    Ok(mv)
}

/// Expand possibly abbreviated drop digits into a full distribution.
///
/// A missing first digit carries the whole stack. Every later drop, given
/// or missing, is at least 1 while pieces remain and never more than the
/// pieces still carried.
fn resolve_drops(height: usize, digits: &[usize]) -> Result<[u8; MAX_DROPS], NotationError> {
    let mut drops = [0u8; MAX_DROPS];
    let mut remaining = height;

    for (k, slot) in drops.iter_mut().enumerate() {
        if remaining == 0 {
            break;
        }
        let drop = match digits.get(k) {
            Some(&digit) if k == 0 => digit.min(remaining),
            None if k == 0 => remaining,
            Some(&digit) => digit.max(1).min(remaining),
            None => 1,
        };
        if drop == 0 {
            break;
        }
        *slot = drop as u8;
        remaining -= drop;
    }

    if remaining > 0 {
        return Err(NotationError::Leftover { remaining });
    }
    Ok(drops)
}
