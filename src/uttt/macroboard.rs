use super::{Board, Move, Status};
use itertools::Itertools;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Target {
    Playable,
    /// Not available for the next move. Carries the sub-board's result,
    /// which is `Status::Open` for open boards that were not chosen.
    Unavailable(Status),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Playable => write!(f, "-1"),
            Target::Unavailable(status) => write!(f, "{}", status.to_char()),
        }
    }
}

/// The sub-boards the side to move may play in, row-major.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Macroboard([Target; 9]);

impl Macroboard {
    pub fn initial() -> Macroboard {
        Macroboard([Target::Playable; 9])
    }

    /// Legal targets for the opponent once `last` has been applied to `board`.
    ///
    /// The opponent is sent to the sub-board matching the cell just played
    /// inside its own sub-board. If that sub-board is already decided, every
    /// open sub-board becomes playable.
    pub fn after_move(board: &Board, last: Move) -> Macroboard {
        let results = board.local_results();
        let forced = last.target_index();
        let targets = if results[forced].is_open() {
            std::array::from_fn(|index| {
                if index == forced {
                    Target::Playable
                } else {
                    Target::Unavailable(results[index])
                }
            })
        } else {
            results.map(|status| match status {
                Status::Open => Target::Playable,
                closed => Target::Unavailable(closed),
            })
        };
        Macroboard(targets)
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Target {
        self.0[index]
    }

    pub fn is_playable(&self, index: usize) -> bool {
        self.0[index] == Target::Playable
    }

    pub fn allows(&self, m: Move) -> bool {
        self.is_playable(m.board_index())
    }

    pub fn playable(&self) -> impl Iterator<Item = usize> + '_ {
        (0..9).filter(|&index| self.is_playable(index))
    }
}

impl fmt::Display for Macroboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(","))
    }
}
