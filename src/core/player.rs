//! Player identification and per-player data storage.
//!
//! ## Player
//!
//! The two sides of the game. Player 1 always moves first.
//!
//! ## PlayerMap
//!
//! Fixed two-slot storage indexed by `Player`, used for piece reserves and
//! result tallies.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two players.
///
/// Serialized as the numbers `1` and `2`, matching the piece codes used in
/// training records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Player {
    /// Moves first.
    One,
    /// Moves second.
    Two,
}

impl Player {
    /// Both players in turn order.
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    /// The other player.
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// 0-based index for array storage.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// 1-based player number as printed and serialized.
    #[inline]
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(format!("player must be 1 or 2, got {other}")),
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.number()
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Per-player data storage with O(1) access.
///
/// ```
/// use tak_zero::core::{Player, PlayerMap};
///
/// let mut reserves = PlayerMap::with_value(15u8);
/// reserves[Player::Two] -= 1;
/// assert_eq!(reserves[Player::One], 15);
/// assert_eq!(reserves[Player::Two], 14);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; 2],
}

impl<T> PlayerMap<T> {
    /// Create a map from explicit values for player 1 and player 2.
    pub const fn new(one: T, two: T) -> Self {
        Self { data: [one, two] }
    }

    /// Create a map with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            data: [value.clone(), value],
        }
    }

    /// Iterate over `(player, value)` pairs in turn order.
    pub fn iter(&self) -> impl Iterator<Item = (Player, &T)> {
        Player::ALL.into_iter().zip(self.data.iter())
    }

    /// Raw values in turn order.
    #[must_use]
    pub fn as_array(&self) -> &[T; 2] {
        &self.data
    }
}

impl<T> Index<Player> for PlayerMap<T> {
    type Output = T;

    #[inline]
    fn index(&self, player: Player) -> &T {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<Player> for PlayerMap<T> {
    #[inline]
    fn index_mut(&mut self, player: Player) -> &mut T {
        &mut self.data[player.index()]
    }
}
