//! Board geometry: cells, directions, pieces and stacks.
//!
//! The board is a 4×4 grid. Files are printed `a..d` left to right and ranks
//! `1..4` top to bottom. Each cell holds a stack of at most
//! [`MAX_HEIGHT`] pieces; only the top piece decides ownership.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::player::Player;

/// Side length of the board.
pub const BOARD_SIZE: usize = 4;

/// Number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Maximum number of pieces in one stack.
pub const MAX_HEIGHT: usize = 8;

/// Depth slots per cell in the encoded board (one spare beyond `MAX_HEIGHT`).
pub const DEPTH_SLOTS: usize = MAX_HEIGHT + 1;

/// Offset added to the owner's number to get a wall's piece code.
pub const WALL_CODE_OFFSET: u8 = 10;

/// A board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Column, 0-based (`a` = 0).
    pub file: u8,
    /// Row, 0-based (`1` = 0).
    pub rank: u8,
}

impl Cell {
    /// Create a cell. Both coordinates must be below [`BOARD_SIZE`].
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Self {
        debug_assert!((file as usize) < BOARD_SIZE && (rank as usize) < BOARD_SIZE);
        Self { file, rank }
    }

    /// Create a cell, returning `None` when off the board.
    #[must_use]
    pub fn try_new(file: i32, rank: i32) -> Option<Self> {
        let size = BOARD_SIZE as i32;
        if (0..size).contains(&file) && (0..size).contains(&rank) {
            Some(Self::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Linear index `rank * 4 + file`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.rank as usize * BOARD_SIZE + self.file as usize
    }

    /// Inverse of [`Cell::index`].
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::new((index % BOARD_SIZE) as u8, (index / BOARD_SIZE) as u8)
    }

    /// All cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..CELL_COUNT).map(Cell::from_index)
    }

    /// The neighbouring cell `distance` steps away, if on the board.
    #[must_use]
    pub fn step(self, direction: Direction, distance: u8) -> Option<Cell> {
        let (df, dr) = direction.offset();
        let d = i32::from(distance);
        Cell::try_new(i32::from(self.file) + df * d, i32::from(self.rank) + dr * d)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

/// Direction of a stack move.
///
/// North points toward rank 1, which is printed at the top of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All directions in move-enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// `(file delta, rank delta)` of one step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }

    /// Position in [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::East => 3,
        }
    }

    /// Key used in move text (`w`, `s`, `a`, `d`).
    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Direction::North => 'w',
            Direction::South => 's',
            Direction::West => 'a',
            Direction::East => 'd',
        }
    }

    /// Parse a move-text direction key.
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'w' => Some(Direction::North),
            's' => Some(Direction::South),
            'a' => Some(Direction::West),
            'd' => Some(Direction::East),
            _ => None,
        }
    }
}

/// The two piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    /// Counts toward roads and flat majority.
    Flat,
    /// Blocks roads and stack movement.
    Wall,
}

/// A single piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Player,
    pub kind: PieceKind,
}

impl Piece {
    #[must_use]
    pub const fn new(owner: Player, kind: PieceKind) -> Self {
        Self { owner, kind }
    }

    #[must_use]
    pub const fn flat(owner: Player) -> Self {
        Self::new(owner, PieceKind::Flat)
    }

    #[must_use]
    pub const fn wall(owner: Player) -> Self {
        Self::new(owner, PieceKind::Wall)
    }

    #[inline]
    #[must_use]
    pub fn is_wall(self) -> bool {
        self.kind == PieceKind::Wall
    }

    /// Piece code used in training records: 1/2 for flats, 11/12 for walls.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self.kind {
            PieceKind::Flat => self.owner.number(),
            PieceKind::Wall => self.owner.number() + WALL_CODE_OFFSET,
        }
    }

    /// Inverse of [`Piece::code`]; `None` for 0 and unknown codes.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Piece::flat(Player::One)),
            2 => Some(Piece::flat(Player::Two)),
            11 => Some(Piece::wall(Player::One)),
            12 => Some(Piece::wall(Player::Two)),
            _ => None,
        }
    }
}

/// A stack of pieces on one cell.
///
/// Stored bottom-first so pushing a new top is cheap; [`Stack::top_down`]
/// gives the external top-first view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stack {
    pieces: SmallVec<[Piece; MAX_HEIGHT]>,
}

impl Stack {
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The piece that controls this cell.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<Piece> {
        self.pieces.last().copied()
    }

    /// Pieces from the top of the stack down.
    pub fn top_down(&self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces.iter().rev().copied()
    }

    /// Place a piece on top.
    pub(crate) fn push(&mut self, piece: Piece) {
        debug_assert!(self.height() < MAX_HEIGHT, "stack overflow on push");
        self.pieces.push(piece);
    }

    /// Lift the whole stack, leaving the cell empty. Returned top-first.
    pub(crate) fn take_all(&mut self) -> SmallVec<[Piece; MAX_HEIGHT]> {
        let mut carried = std::mem::take(&mut self.pieces);
        carried.reverse();
        carried
    }

    /// Drop pieces given top-first so the first of them ends up on top.
    pub(crate) fn drop_onto(&mut self, top_first: &[Piece]) {
        debug_assert!(self.height() + top_first.len() <= MAX_HEIGHT);
        self.pieces.extend(top_first.iter().rev().copied());
    }

    /// Piece codes top-first, padded with zeros to [`DEPTH_SLOTS`].
    #[must_use]
    pub fn codes(&self) -> [u8; DEPTH_SLOTS] {
        let mut codes = [0u8; DEPTH_SLOTS];
        for (slot, piece) in codes.iter_mut().zip(self.top_down()) {
            *slot = piece.code();
        }
        codes
    }

    /// Rebuild a stack from top-first codes; stops at the first 0.
    pub fn from_codes(codes: &[u8]) -> Option<Self> {
        let mut top_first = SmallVec::<[Piece; MAX_HEIGHT]>::new();
        for &code in codes.iter().take_while(|&&c| c != 0) {
            if top_first.len() == MAX_HEIGHT {
                return None;
            }
            top_first.push(Piece::from_code(code)?);
        }
        let mut stack = Stack::default();
        stack.drop_onto(&top_first);
        Some(stack)
    }
}

/// The 16 stacks of the board, indexed by [`Cell::index`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    stacks: [Stack; CELL_COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            stacks: std::array::from_fn(|_| Stack::default()),
        }
    }
}

impl Board {
    #[inline]
    #[must_use]
    pub fn stack(&self, cell: Cell) -> &Stack {
        &self.stacks[cell.index()]
    }

    #[inline]
    pub(crate) fn stack_mut(&mut self, cell: Cell) -> &mut Stack {
        &mut self.stacks[cell.index()]
    }

    #[inline]
    #[must_use]
    pub fn top(&self, cell: Cell) -> Option<Piece> {
        self.stack(cell).top()
    }

    #[inline]
    #[must_use]
    pub fn height(&self, cell: Cell) -> usize {
        self.stack(cell).height()
    }

    /// Number of cells whose top is a flat of `player`.
    #[must_use]
    pub fn flat_tops(&self, player: Player) -> usize {
        self.stacks
            .iter()
            .filter(|s| s.top() == Some(Piece::flat(player)))
            .count()
    }

    /// True when no cell is empty.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.stacks.iter().all(|s| !s.is_empty())
    }

    /// Tallest stack on the board.
    #[must_use]
    pub fn tallest(&self) -> usize {
        self.stacks.iter().map(Stack::height).max().unwrap_or(0)
    }

    /// Piece codes indexed `[file][rank][depth]`, depth 0 on top.
    #[must_use]
    pub fn codes(&self) -> [[[u8; DEPTH_SLOTS]; BOARD_SIZE]; BOARD_SIZE] {
        let mut out = [[[0u8; DEPTH_SLOTS]; BOARD_SIZE]; BOARD_SIZE];
        for cell in Cell::all() {
            out[cell.file as usize][cell.rank as usize] = self.stack(cell).codes();
        }
        out
    }

    /// Inverse of [`Board::codes`]; `None` if any code is unknown.
    pub fn from_codes(codes: &[[[u8; DEPTH_SLOTS]; BOARD_SIZE]; BOARD_SIZE]) -> Option<Self> {
        let mut board = Board::default();
        for cell in Cell::all() {
            *board.stack_mut(cell) = Stack::from_codes(&codes[cell.file as usize][cell.rank as usize])?;
        }
        Some(board)
    }
}
