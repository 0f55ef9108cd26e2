use super::{Cell, LocalBoard, Move, Player, Status, line_owner};
use itertools::Itertools;
use std::fmt;

/// The cell a move was aimed at already holds a stone.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Occupied(pub Player);

/// The 9x9 grid, addressed as `[row][col]`.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Board {
    cells: [[Cell; 9]; 9],
}

impl Board {
    pub fn new() -> Board {
        Board::default()
    }

    /// Parses the comma separated `field` value of the protocol.
    #[cfg(test)]
    pub fn parse(field: &str) -> Option<Board> {
        let tokens: Vec<&str> = field.trim().split(',').collect();
        if tokens.len() != 81 {
            return None;
        }
        let mut board = Board::new();
        for (index, tok) in tokens.iter().enumerate() {
            let mut chars = tok.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return None;
            };
            board.cells[index / 9][index % 9] = Cell::from_char(c)?;
        }
        Some(board)
    }

    #[cfg(test)]
    pub fn get(&self, m: Move) -> Cell {
        self.cells[m.j][m.i]
    }

    pub fn place(&mut self, m: Move, player: Player) -> Result<(), Occupied> {
        match self.cells[m.j][m.i] {
            Cell::Taken(p) => Err(Occupied(p)),
            Cell::Empty => {
                self.cells[m.j][m.i] = Cell::Taken(player);
                Ok(())
            }
        }
    }

    pub fn local(&self, row: usize, col: usize) -> LocalBoard {
        let mut cells = [Cell::Empty; 9];
        for y in 0..3 {
            for x in 0..3 {
                cells[3 * y + x] = self.cells[3 * row + y][3 * col + x];
            }
        }
        LocalBoard::new(cells)
    }

    /// Sub-board results in row-major order.
    pub fn local_results(&self) -> [Status; 9] {
        std::array::from_fn(|index| self.local(index / 3, index % 3).winner())
    }

    pub fn winner(&self) -> Status {
        let results = self.local_results();
        match line_owner(&results.map(Status::winner)) {
            Some(p) => Status::Won(p),
            None if results.iter().all(|s| s.is_closed()) => Status::Draw,
            None => Status::Open,
        }
    }

    pub fn serialize(&self) -> String {
        self.cells.iter().flatten().map(|c| c.to_char()).join(",")
    }

    /// Nine text lines with separators between sub-boards.
    pub fn pretty(&self) -> String {
        self.cells
            .iter()
            .enumerate()
            .map(|(row, line)| {
                let text = line
                    .chunks(3)
                    .map(|chunk| chunk.iter().map(|c| c.to_char()).collect::<String>())
                    .join("|");
                if row % 3 == 2 && row != 8 {
                    format!("{text}\n---+---+---")
                } else {
                    text
                }
            })
            .join("\n")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialize())
    }
}
