use super::{Cell, Status, line_owner};

/// One of the nine 3x3 boards, copied out of the big board.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct LocalBoard {
    cells: [Cell; 9],
}

impl LocalBoard {
    pub fn new(cells: [Cell; 9]) -> LocalBoard {
        LocalBoard { cells }
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[3 * row + col]
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    pub fn winner(&self) -> Status {
        let owners = self.cells.map(Cell::owner);
        match line_owner(&owners) {
            Some(p) => Status::Won(p),
            None if self.is_full() => Status::Draw,
            None => Status::Open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uttt::Player;

    fn local(s: &str) -> LocalBoard {
        let cells: Vec<Cell> = s.chars().filter_map(Cell::from_char).collect();
        LocalBoard::new(cells.try_into().unwrap())
    }

    #[test]
    fn empty_is_open() {
        assert_eq!(LocalBoard::default().winner(), Status::Open);
    }

    #[test]
    fn rows_columns_diagonals() {
        assert_eq!(local("000 .1. 1..").winner(), Status::Won(Player::Zero));
        assert_eq!(local("1.0 1.0 1..").winner(), Status::Won(Player::One));
        assert_eq!(local("0.1 .01 ..0").winner(), Status::Won(Player::Zero));
        assert_eq!(local("0.1 .10 1..").winner(), Status::Won(Player::One));
    }

    #[test]
    fn full_without_line_is_draw() {
        assert_eq!(local("010 011 101").winner(), Status::Draw);
    }

    #[test]
    fn full_with_line_is_won() {
        assert_eq!(local("000 110 101").winner(), Status::Won(Player::Zero));
    }

    #[test]
    fn two_in_a_row_stays_open() {
        let b = local("00. 11. ...");
        assert_eq!(b.winner(), Status::Open);
        assert_eq!(b.get(1, 0), Cell::Taken(Player::One));
    }
}
