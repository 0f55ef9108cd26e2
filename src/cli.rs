use std::time::Duration;

use crate::engine;
use crate::referee::RefereeOptions;
use crate::tc;

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub players: Vec<String>,
    pub reverse: bool,
    pub verbose: bool,
    pub bench: bool,
    pub games: Option<u64>,
    pub timebank: Duration,
    /// Values announced in the `settings` lines; they do not drive the clock.
    pub advertised_timebank: Duration,
    pub time_per_move: Duration,
    pub debit: tc::DebitPolicy,
    pub strict: bool,
    pub move_timeout: Option<Duration>,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            players: vec![],
            reverse: false,
            verbose: false,
            bench: false,
            games: None,
            timebank: tc::STARTING_TIMEBANK,
            advertised_timebank: tc::ADVERTISED_TIMEBANK,
            time_per_move: tc::TIME_PER_MOVE,
            debit: tc::DebitPolicy::default(),
            strict: false,
            move_timeout: None,
        }
    }
}

impl CliOptions {
    /// Builders for player0 and player1, after `-reverse` is applied.
    pub fn engine_builders(&self) -> [engine::EngineBuilder; 2] {
        let order = if self.reverse { [1, 0] } else { [0, 1] };
        std::array::from_fn(|seat| engine::EngineBuilder {
            cmd: self.players[order[seat]].clone(),
            name: format!("player{seat}"),
            verbose: self.verbose,
            capture_diagnostics: self.bench && seat == 0,
        })
    }

    pub fn referee_options(&self) -> RefereeOptions {
        RefereeOptions {
            advertised_timebank: self.advertised_timebank,
            time_per_move: self.time_per_move,
            strict: self.strict,
            move_timeout: self.move_timeout,
            verbose: self.verbose,
        }
    }
}

fn parse_positive(flag: &str, value: &str) -> Option<u64> {
    match value.parse::<u64>() {
        Ok(0) => {
            eprintln!("invalid {flag} value {value} (must be bigger than zero)");
            None
        }
        Ok(value) => Some(value),
        Err(_) => {
            eprintln!("invalid {flag} value {value} (must be unsigned integer)");
            None
        }
    }
}

fn parse_time(flag: &str, value: &str) -> Option<Duration> {
    let parsed = tc::parse_duration(value);
    if parsed.is_none() {
        eprintln!("invalid {flag} value {value} (expected e.g. 20000, 20s or 1m)");
    }
    parsed
}

pub fn parse() -> Option<CliOptions> {
    parse_from(std::env::args().skip(1))
}

pub fn parse_from(args: impl IntoIterator<Item = String>) -> Option<CliOptions> {
    let args: Vec<String> = args.into_iter().collect();

    let mut options = CliOptions::default();

    let mut it = args.iter();
    while let Some(flag) = it.next() {
        // --flag is accepted for -flag
        let name = flag
            .strip_prefix('-')
            .filter(|rest| rest.starts_with('-'))
            .unwrap_or(flag.as_str());
        match name {
            "-version" | "-V" => {
                println!("uttt-referee version {}", env!("CARGO_PKG_VERSION"));
                return None;
            }

            "-reverse" => options.reverse = true,

            "-verbose" => options.verbose = true,

            "-bench" => options.bench = true,

            "-strict" => options.strict = true,

            "-fulldebit" => options.debit = tc::DebitPolicy::Full,

            "-games" => {
                let Some(value) = it.next() else { break };
                options.games = Some(parse_positive("games", value)?);
            }

            "-timebank" => {
                let Some(value) = it.next() else { break };
                options.timebank = parse_time("timebank", value)?;
            }

            "-settimebank" => {
                let Some(value) = it.next() else { break };
                options.advertised_timebank = parse_time("settimebank", value)?;
            }

            "-timepermove" => {
                let Some(value) = it.next() else { break };
                options.time_per_move = parse_time("timepermove", value)?;
            }

            "-movetimeout" => {
                let Some(value) = it.next() else { break };
                options.move_timeout = Some(parse_time("movetimeout", value)?);
            }

            _ if !flag.starts_with('-') => options.players.push(flag.clone()),

            _ => {
                eprintln!("unknown flag {flag}");
                return None;
            }
        }
    }

    if options.players.len() != 2 {
        eprintln!("We require exactly two player programs to be supplied.");
        return None;
    }

    Some(options)
}
