//! Road detection with a union-find over the 16 cells.
//!
//! Each component root carries a bitmask of the board edges the component
//! touches. A road exists as soon as one union produces a component touching
//! both left and right, or both top and bottom.

use crate::core::{Board, Cell, Piece, Player, BOARD_SIZE, CELL_COUNT, Direction};

const LEFT: u8 = 0b0001;
const RIGHT: u8 = 0b0010;
const TOP: u8 = 0b0100;
const BOTTOM: u8 = 0b1000;

/// Union-find with per-root edge masks.
struct EdgeUnionFind {
    parent: [u8; CELL_COUNT],
    edges: [u8; CELL_COUNT],
}

impl EdgeUnionFind {
    fn new() -> Self {
        let mut edges = [0u8; CELL_COUNT];
        for cell in Cell::all() {
            let last = (BOARD_SIZE - 1) as u8;
            let mut mask = 0;
            if cell.file == 0 {
                mask |= LEFT;
            }
            if cell.file == last {
                mask |= RIGHT;
            }
            if cell.rank == 0 {
                mask |= TOP;
            }
            if cell.rank == last {
                mask |= BOTTOM;
            }
            edges[cell.index()] = mask;
        }
        Self {
            parent: std::array::from_fn(|i| i as u8),
            edges,
        }
    }

    fn find(&mut self, mut a: usize) -> usize {
        while self.parent[a] as usize != a {
            let grandparent = self.parent[self.parent[a] as usize];
            self.parent[a] = grandparent;
            a = grandparent as usize;
        }
        a
    }

    /// Merge two components and return the merged root's edge mask.
    fn union(&mut self, a: usize, b: usize) -> u8 {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra as u8;
            self.edges[ra] |= self.edges[rb];
        }
        self.edges[ra]
    }
}

fn spans_board(mask: u8) -> bool {
    (mask & (LEFT | RIGHT)) == (LEFT | RIGHT) || (mask & (TOP | BOTTOM)) == (TOP | BOTTOM)
}

/// The owner of the first road completed while scanning cells in row-major
/// order, or `None` if neither player has a road.
///
/// Only flat tops connect; walls break roads.
#[must_use]
pub fn road_winner(board: &Board) -> Option<Player> {
    let mut uf = EdgeUnionFind::new();

    for cell in Cell::all() {
        let Some(top) = board.top(cell) else {
            continue;
        };
        if top.is_wall() {
            continue;
        }
        for direction in [Direction::East, Direction::South] {
            let Some(next) = cell.step(direction, 1) else {
                continue;
            };
            if board.top(next) == Some(Piece::flat(top.owner)) {
                let mask = uf.union(cell.index(), next.index());
                if spans_board(mask) {
                    return Some(top.owner);
                }
            }
        }
    }

    None
}
