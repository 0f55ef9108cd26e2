use std::fmt;

mod board;
mod local;
mod macroboard;

pub use board::{Board, Occupied};
pub use local::LocalBoard;
pub use macroboard::Macroboard;

/// Rows, columns and diagonals of a 3x3 grid, as row-major indices.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [6, 4, 2],
];

/// Returns the player owning all three squares of some line, if any.
fn line_owner(owners: &[Option<Player>; 9]) -> Option<Player> {
    LINES.iter().find_map(|&[a, b, c]| match owners[a] {
        Some(p) if owners[b] == Some(p) && owners[c] == Some(p) => Some(p),
        _ => None,
    })
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Player {
    Zero,
    One,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Zero => Player::One,
            Player::One => Player::Zero,
        }
    }

    pub fn to_index(self) -> usize {
        match self {
            Player::Zero => 0,
            Player::One => 1,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Player::Zero => '0',
            Player::One => '1',
        }
    }

    #[cfg(test)]
    pub fn from_char(c: char) -> Option<Player> {
        match c {
            '0' => Some(Player::Zero),
            '1' => Some(Player::One),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Taken(Player),
}

impl Cell {
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Taken(p) => Some(p),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Taken(p) => p.to_char(),
        }
    }

    #[cfg(test)]
    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' => Some(Cell::Empty),
            c => Player::from_char(c).map(Cell::Taken),
        }
    }
}

/// Result of a sub-board or of the whole board.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Status {
    #[default]
    Open,
    Won(Player),
    Draw,
}

impl Status {
    pub fn is_open(self) -> bool {
        self == Status::Open
    }

    pub fn is_closed(self) -> bool {
        !self.is_open()
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            Status::Won(p) => Some(p),
            Status::Open | Status::Draw => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Status::Open => '.',
            Status::Won(p) => p.to_char(),
            Status::Draw => '#',
        }
    }
}

/// A cell of the 9x9 grid. `i` is the column, `j` the row, as on the wire.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Move {
    pub i: usize,
    pub j: usize,
}

impl Move {
    pub fn new(i: usize, j: usize) -> Option<Move> {
        (i < 9 && j < 9).then_some(Move { i, j })
    }

    /// (row, col) of the sub-board containing this cell.
    pub fn local_board(self) -> (usize, usize) {
        (self.j / 3, self.i / 3)
    }

    /// (row, col) of the cell inside its sub-board.
    pub fn local_cell(self) -> (usize, usize) {
        (self.j % 3, self.i % 3)
    }

    /// Row-major index of the sub-board the opponent is sent to.
    pub fn target_index(self) -> usize {
        let (y, x) = self.local_cell();
        3 * y + x
    }

    pub fn board_index(self) -> usize {
        let (row, col) = self.local_board();
        3 * row + col
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.i, self.j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_coordinates_split_into_board_and_cell() {
        let m = Move::new(6, 1).unwrap();
        assert_eq!(m.local_board(), (0, 2));
        assert_eq!(m.local_cell(), (1, 0));
        assert_eq!(m.board_index(), 2);
        assert_eq!(m.target_index(), 3);
    }

    #[test]
    fn move_out_of_range() {
        assert!(Move::new(9, 0).is_none());
        assert!(Move::new(0, 9).is_none());
        assert!(Move::new(8, 8).is_some());
    }

    #[test]
    fn line_owner_ignores_mixed_lines() {
        let z = Some(Player::Zero);
        let o = Some(Player::One);
        assert_eq!(line_owner(&[z, o, z, o, z, o, o, z, o]), None);
        assert_eq!(line_owner(&[None, None, o, None, o, None, o, None, None]), o);
    }

    #[test]
    fn symbols() {
        assert_eq!(Cell::from_char('.'), Some(Cell::Empty));
        assert_eq!(Cell::from_char('1'), Some(Cell::Taken(Player::One)));
        assert_eq!(Cell::from_char('x'), None);
        assert_eq!(Status::Draw.to_char(), '#');
        assert_eq!(Player::Zero.opponent(), Player::One);
    }
}
