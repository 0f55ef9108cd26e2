use crate::bench::Throughput;
use crate::cli;
use crate::engine::{BotIo, EngineBuilder};
use crate::referee::{Contestant, INITIAL_ROUND, MatchOutcome, MoveRecord, Referee, Turn};
use crate::report::Statistics;
use crate::tc::TimeBank;
use crate::uttt::{Macroboard, Player};
use chrono::{DateTime, Utc};
use log::{debug, info};

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub id: u64,
    pub game_start: DateTime<Utc>,
    pub outcome: MatchOutcome,
    pub rounds: u64,
    pub moves: Vec<MoveRecord>,
}

#[derive(Debug)]
pub struct Runner {
    options: cli::CliOptions,
}

impl Runner {
    pub fn new(options: cli::CliOptions) -> Runner {
        Runner { options }
    }

    pub fn run(&self) -> Result<(), std::io::Error> {
        let builders = self.options.engine_builders();
        let names = builders.clone().map(|b| b.name);

        let mut statistics = Statistics::default();
        let mut throughput = Throughput::default();

        let mut id = 0;
        while self.options.games.is_none_or(|games| id < games) {
            let (result, diagnostics) = self.run_match(id, &builders)?;
            info!(
                "Match {} started {} ended in round {} after {} moves: {:?}",
                result.id + 1,
                result.game_start.to_rfc3339(),
                result.rounds,
                result.moves.len(),
                result.outcome
            );

            statistics.record(&result.outcome);
            println!("{}", statistics.summary(&result.outcome, &names));
            info!(
                "{} games played: {} won by {}, {} by {}, {} drawn",
                statistics.games(),
                statistics.wins(Player::Zero),
                names[0],
                statistics.wins(Player::One),
                names[1],
                statistics.draws()
            );

            if self.options.bench {
                throughput.extend(diagnostics.iter().map(String::as_str));
                println!("{throughput}");
            }

            id += 1;
        }
        Ok(())
    }

    /// Plays one match with freshly spawned players. Also returns the
    /// diagnostic lines of player0 when they are captured.
    fn run_match(
        &self,
        id: u64,
        builders: &[EngineBuilder; 2],
    ) -> Result<(MatchResult, Vec<String>), std::io::Error> {
        let bots = [builders[0].init()?, builders[1].init()?];
        let mut players = {
            let [bot0, bot1] = bots;
            [
                self.contestant(Player::Zero, &builders[0], bot0),
                self.contestant(Player::One, &builders[1], bot1),
            ]
        };

        let game_start = Utc::now();
        let mut referee = Referee::new(
            builders.clone().map(|b| b.name),
            self.options.referee_options(),
        );
        let (outcome, rounds) = play_match(&mut referee, &mut players);
        debug!("final board\n{}", referee.board().pretty());

        for player in &mut players {
            player.bot.shutdown();
        }
        let diagnostics = players[0].bot.diagnostics();

        Ok((
            MatchResult {
                id,
                game_start,
                outcome,
                rounds,
                moves: referee.into_moves(),
            },
            diagnostics,
        ))
    }

    fn contestant<B>(&self, id: Player, builder: &EngineBuilder, bot: B) -> Contestant<B> {
        Contestant {
            id,
            name: builder.name.clone(),
            bank: TimeBank::new(self.options.timebank, self.options.debit),
            bot,
        }
    }
}

/// Alternates turns, player0 first in every round, until the referee ends
/// the match. Returns the outcome and the round it ended in.
pub fn play_match<B: BotIo>(
    referee: &mut Referee,
    players: &mut [Contestant<B>; 2],
) -> (MatchOutcome, u64) {
    let mut targets = Macroboard::initial();
    let mut round = INITIAL_ROUND;
    loop {
        for player in players.iter_mut() {
            match referee.play_turn(player, round, &targets) {
                Turn::Continue(next) => targets = next,
                Turn::Ended(outcome) => return (outcome, round),
            }
        }
        round += 1;
    }
}
