use crate::engine::BotIo;
use crate::tc::{self, StepResult, TimeBank};
use crate::uttt::{Board, Macroboard, Move, Occupied, Player, Status};
use log::{debug, warn};
use std::{
    fmt,
    io::ErrorKind,
    time::{Duration, Instant},
};

pub const INITIAL_ROUND: u64 = 1;

/// Why a match ended.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Reason {
    TimeLimit,
    /// Carries the offending reply, or the transport error.
    InvalidOutput(String),
    AbusiveNoMoves,
    InvalidMove,
    FairVictory,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::TimeLimit => write!(f, "Exceeded time limit"),
            Reason::InvalidOutput(reply) => write!(f, "Invalid output from bot : {reply:?}"),
            Reason::AbusiveNoMoves => write!(f, "Abusive no_moves"),
            Reason::InvalidMove => write!(f, "Invalid move"),
            Reason::FairVictory => write!(f, "Fair victory"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MatchOutcome {
    /// `None` for a draw.
    pub winner: Option<Player>,
    pub reason: Reason,
}

impl MatchOutcome {
    fn forfeit(loser: Player, reason: Reason) -> MatchOutcome {
        MatchOutcome {
            winner: Some(loser.opponent()),
            reason,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Turn {
    Continue(Macroboard),
    Ended(MatchOutcome),
}

#[derive(Clone, PartialEq, Debug)]
pub struct MoveRecord {
    pub player: Player,
    pub round: u64,
    pub reply: String,
    pub elapsed: Duration,
    pub timebank_ms: f64,
}

/// A seat at the table: who plays, their clock, and the transport to them.
#[derive(Debug)]
pub struct Contestant<B> {
    pub id: Player,
    pub name: String,
    pub bank: TimeBank,
    pub bot: B,
}

#[derive(Clone, PartialEq, Debug)]
pub struct RefereeOptions {
    pub advertised_timebank: Duration,
    pub time_per_move: Duration,
    /// Reject moves outside the current legal targets.
    pub strict: bool,
    /// Hard limit on waiting for a single reply.
    pub move_timeout: Option<Duration>,
    pub verbose: bool,
}

impl Default for RefereeOptions {
    fn default() -> Self {
        RefereeOptions {
            advertised_timebank: tc::ADVERTISED_TIMEBANK,
            time_per_move: tc::TIME_PER_MOVE,
            strict: false,
            move_timeout: None,
            verbose: false,
        }
    }
}

enum Reply {
    Place(Move),
    NoMoves,
}

fn parse_reply(line: &str) -> Option<Reply> {
    let mut it = line.split_whitespace();
    match it.next()? {
        "place_move" => {
            let i = it.next()?.parse::<usize>().ok()?;
            let j = it.next()?.parse::<usize>().ok()?;
            if it.next().is_some() {
                return None;
            }
            Move::new(i, j).map(Reply::Place)
        }
        "no_moves" => Some(Reply::NoMoves),
        _ => None,
    }
}

/// Owns the board for one match and rules on every turn.
#[derive(Debug)]
pub struct Referee {
    board: Board,
    names: [String; 2],
    options: RefereeOptions,
    moves: Vec<MoveRecord>,
}

impl Referee {
    pub fn new(names: [String; 2], options: RefereeOptions) -> Referee {
        Referee {
            board: Board::new(),
            names,
            options,
            moves: vec![],
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn into_moves(self) -> Vec<MoveRecord> {
        self.moves
    }

    fn settings<B>(&self, player: &Contestant<B>) -> Vec<String> {
        vec![
            format!("settings player_names {},{}", self.names[0], self.names[1]),
            format!("settings your_bot {}", player.name),
            format!("settings timebank {}", self.options.advertised_timebank.as_millis()),
            format!("settings time_per_move {}", self.options.time_per_move.as_millis()),
            format!("settings your_botid {}", player.id),
        ]
    }

    /// Runs one full exchange with `player` and rules on the reply.
    pub fn play_turn<B: BotIo>(
        &mut self,
        player: &mut Contestant<B>,
        round: u64,
        targets: &Macroboard,
    ) -> Turn {
        let mut lines = vec![];
        if round == INITIAL_ROUND {
            lines.extend(self.settings(player));
        }
        lines.push(format!("update game round {round}"));
        lines.push(format!("update game field {}", self.board));
        lines.push(format!("update game macroboard {targets}"));
        lines.push(format!("action move {}", player.bank));
        debug!(
            "round {round}: {} may play in sub-boards {:?}",
            player.name,
            targets.playable().collect::<Vec<_>>()
        );

        let start = Instant::now();
        let reply = player
            .bot
            .write_lines(&lines)
            .and_then(|_| player.bot.read_line(self.options.move_timeout));
        let elapsed = start.elapsed();
        let step = player.bank.step(elapsed);

        if let Err(e) = &reply
            && e.kind() == ErrorKind::TimedOut
        {
            warn!("{} gave no reply within {elapsed:?}", player.name);
            return Turn::Ended(MatchOutcome::forfeit(player.id, Reason::TimeLimit));
        }

        if step == StepResult::TimeElapsed {
            warn!("{} ran out of time after {elapsed:?}", player.name);
            return Turn::Ended(MatchOutcome::forfeit(player.id, Reason::TimeLimit));
        }

        let reply = match reply {
            Ok(reply) => reply.trim_end().to_string(),
            Err(e) => {
                warn!("{} could not be talked to: {e}", player.name);
                return Turn::Ended(MatchOutcome::forfeit(
                    player.id,
                    Reason::InvalidOutput(e.to_string()),
                ));
            }
        };

        self.moves.push(MoveRecord {
            player: player.id,
            round,
            reply: reply.clone(),
            elapsed,
            timebank_ms: player.bank.remaining_ms(),
        });
        debug!(
            "{} replied {reply:?} after {elapsed:?}, timebank {}",
            player.name, player.bank
        );

        let next_targets = match parse_reply(&reply) {
            Some(Reply::Place(m)) => {
                if self.options.strict && !targets.allows(m) {
                    warn!("{} played {m} outside the legal targets", player.name);
                    return Turn::Ended(MatchOutcome::forfeit(player.id, Reason::InvalidMove));
                }
                if let Err(Occupied(holder)) = self.board.place(m, player.id) {
                    warn!("{} played {m} onto a cell held by player{holder}", player.name);
                    return Turn::Ended(MatchOutcome::forfeit(player.id, Reason::InvalidMove));
                }
                Macroboard::after_move(&self.board, m)
            }
            Some(Reply::NoMoves) => {
                if self.board.winner().is_open() {
                    warn!("{} claimed no_moves on an open board", player.name);
                    return Turn::Ended(MatchOutcome::forfeit(player.id, Reason::AbusiveNoMoves));
                }
                *targets
            }
            None => {
                warn!("{} sent invalid output {reply:?}", player.name);
                return Turn::Ended(MatchOutcome::forfeit(
                    player.id,
                    Reason::InvalidOutput(reply),
                ));
            }
        };

        if self.options.verbose {
            println!("{}", self.board.pretty());
        }

        match self.board.winner() {
            Status::Open => Turn::Continue(next_targets),
            status => Turn::Ended(MatchOutcome {
                winner: status.winner(),
                reason: Reason::FairVictory,
            }),
        }
    }
}
