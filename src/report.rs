use crate::referee::MatchOutcome;
use crate::uttt::Player;

/// Running tally over all matches played so far.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Statistics {
    wins: [u64; 2],
    draws: u64,
}

impl Statistics {
    pub fn record(&mut self, outcome: &MatchOutcome) {
        match outcome.winner {
            Some(p) => self.wins[p.to_index()] += 1,
            None => self.draws += 1,
        }
    }

    pub fn wins(&self, player: Player) -> u64 {
        self.wins[player.to_index()]
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn games(&self) -> u64 {
        self.wins[0] + self.wins[1] + self.draws
    }

    /// The line printed after each match.
    pub fn summary(&self, outcome: &MatchOutcome, names: &[String; 2]) -> String {
        let tally = format!("{}, {}, draw: {}, ", self.wins[0], self.wins[1], self.draws);
        match outcome.winner {
            None => format!("{tally}game is draw"),
            Some(p) => format!(
                "{tally}winner is : {} reason : {}",
                names[p.to_index()],
                outcome.reason
            ),
        }
    }
}
