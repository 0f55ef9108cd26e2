use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref THROUGHPUT_RE: Regex = Regex::new(r"positions/s:\s*(?<nps>[0-9]+)").unwrap();
}

/// Search speed samples scraped from a bot's diagnostic stream.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Throughput {
    samples: Vec<u64>,
}

impl Throughput {
    pub fn parse_line(line: &str) -> Option<u64> {
        let captures = THROUGHPUT_RE.captures(line)?;
        captures.name("nps")?.as_str().parse::<u64>().ok()
    }

    pub fn extend<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        self.samples
            .extend(lines.into_iter().filter_map(Throughput::parse_line));
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<u64>() as f64 / self.samples.len() as f64)
    }

    pub fn min(&self) -> Option<u64> {
        self.samples.iter().copied().min()
    }

    pub fn max(&self) -> Option<u64> {
        self.samples.iter().copied().max()
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.mean(), self.min(), self.max()) {
            (Some(mean), Some(min), Some(max)) => write!(
                f,
                "positions/s over {} searches: mean {mean:.0}, min {min}, max {max}",
                self.count()
            ),
            _ => write!(f, "no positions/s samples"),
        }
    }
}
