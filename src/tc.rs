use lazy_static::lazy_static;
use regex::Regex;
use std::{fmt, time::Duration};

pub const STARTING_TIMEBANK: Duration = Duration::from_millis(20000);
pub const ADVERTISED_TIMEBANK: Duration = Duration::from_millis(10000);
pub const TIME_PER_MOVE: Duration = Duration::from_millis(100);

lazy_static! {
    static ref DURATION_RE: Regex =
        Regex::new(r"^(?<value>[0-9]+(?:\.[0-9]+)?)(?<unit>ms|s|m)?$").unwrap();
}

/// Parses `1500`, `1500ms`, `20s`, `1.5s` or `2m`. A bare number is milliseconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let captures = DURATION_RE.captures(s.trim())?;
    let value = captures.name("value")?.as_str().parse::<f64>().ok()?;
    let ms = match captures.name("unit").map(|m| m.as_str()) {
        None | Some("ms") => value,
        Some("s") => value * 1000.0,
        Some("m") => value * 60_000.0,
        Some(_) => return None,
    };
    Duration::try_from_secs_f64(ms / 1000.0).ok()
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StepResult {
    Ok,
    TimeElapsed,
}

/// How the wall-clock time spent on a reply is charged.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum DebitPolicy {
    /// Only the sub-second part of the elapsed time is charged.
    #[default]
    SubSecond,
    Full,
}

impl DebitPolicy {
    pub fn charge(self, elapsed: Duration) -> Duration {
        match self {
            DebitPolicy::SubSecond => Duration::from_nanos(elapsed.subsec_nanos() as u64),
            DebitPolicy::Full => elapsed,
        }
    }
}

/// Remaining thinking time of one player, in milliseconds.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TimeBank {
    policy: DebitPolicy,
    remaining_ms: f64,
}

impl TimeBank {
    pub fn new(start: Duration, policy: DebitPolicy) -> TimeBank {
        TimeBank {
            policy,
            remaining_ms: start.as_secs_f64() * 1000.0,
        }
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_ms < 0.0
    }

    pub fn step(&mut self, elapsed: Duration) -> StepResult {
        self.remaining_ms -= self.policy.charge(elapsed).as_secs_f64() * 1000.0;
        if self.is_exhausted() {
            StepResult::TimeElapsed
        } else {
            StepResult::Ok
        }
    }
}

impl fmt::Display for TimeBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.remaining_ms.trunc() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("1500"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("1500ms"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("20s"), Some(Duration::from_secs(20)));
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("fast"), None);
        assert_eq!(parse_duration("-3s"), None);
        assert_eq!(parse_duration("99999999999999999999999s"), None);
    }

    #[test]
    fn sub_second_policy_drops_whole_seconds() {
        let mut bank = TimeBank::new(STARTING_TIMEBANK, DebitPolicy::SubSecond);
        assert_eq!(bank.step(Duration::from_millis(2250)), StepResult::Ok);
        assert!((bank.remaining_ms() - 19750.0).abs() < 1e-6);
    }

    #[test]
    fn full_policy_charges_everything() {
        let mut bank = TimeBank::new(STARTING_TIMEBANK, DebitPolicy::Full);
        bank.step(Duration::from_millis(2250));
        assert!((bank.remaining_ms() - 17750.0).abs() < 1e-6);
    }

    #[test]
    fn going_negative_elapses() {
        let mut bank = TimeBank::new(Duration::from_millis(5), DebitPolicy::Full);
        assert_eq!(bank.step(Duration::from_millis(5)), StepResult::Ok);
        assert!(!bank.is_exhausted());
        assert_eq!(bank.step(Duration::from_micros(1)), StepResult::TimeElapsed);
        assert!(bank.is_exhausted());
    }

    #[test]
    fn never_increases() {
        let mut bank = TimeBank::new(STARTING_TIMEBANK, DebitPolicy::SubSecond);
        let mut last = bank.remaining_ms();
        for ms in [0, 1, 999, 1000, 1001, 37] {
            bank.step(Duration::from_millis(ms));
            assert!(bank.remaining_ms() <= last);
            last = bank.remaining_ms();
        }
    }

    #[test]
    fn displays_whole_milliseconds() {
        let mut bank = TimeBank::new(STARTING_TIMEBANK, DebitPolicy::Full);
        bank.step(Duration::from_micros(1500));
        assert_eq!(bank.to_string(), "19998");
    }
}
