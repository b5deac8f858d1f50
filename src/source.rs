//! Candidate string sources.
//!
//! A source is pulled one string at a time and may be unbounded. `None`
//! means the source has nothing more to give.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, warn};

pub trait StringSource {
    /// The next candidate, or `None` once the source is exhausted.
    fn next_candidate(&mut self) -> Option<String>;
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("candidate generator needs at least one repeat unit and one end group")]
    EmptyAlphabet,
    #[error("invalid repeat unit range {min}..={max}")]
    InvalidUnitRange { min: usize, max: usize },
    #[error("cannot open candidate file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
}

/// Adapts any iterator of strings.
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    pub fn new<T>(items: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: items.into_iter(),
        }
    }
}

impl<I> StringSource for IterSource<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    fn next_candidate(&mut self) -> Option<String> {
        self.iter.next().map(Into::into)
    }
}

/// Reads one candidate per line, skipping blank lines and `#` comments.
/// Lines that are not valid UTF-8 are logged and skipped. Any other read
/// error ends the source.
pub struct LineSource<R> {
    lines: Lines<R>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl LineSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Reading candidates from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> StringSource for LineSource<R> {
    fn next_candidate(&mut self) -> Option<String> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Skipping unreadable candidate line: {e}");
                    continue;
                }
                Err(e) => {
                    error!("Stopped reading candidates: {e}");
                    return None;
                }
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Some(line.to_string());
        }
    }
}

/// Settings of the random chain generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainOptions {
    pub seed: u64,
    pub min_units: usize,
    pub max_units: usize,
    /// Repeat units. Each must be a complete SMILES fragment whose first
    /// and last atoms carry the chain bonds.
    pub units: Vec<String>,
    pub end_groups: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            min_units: 1,
            max_units: 12,
            units: strings(&[
                "CC",
                "CC(C)",
                "CC(c1ccccc1)",
                "CC(Cl)",
                "CC(F)(F)",
                "CC(C)(C(=O)OC)",
                "CC(C#N)",
                "CC(O)",
                "OCC",
                "C(=O)OCCO",
                "C(=O)NCCCCCCN",
                "c1ccc(cc1)",
                "CC=CC",
                "CSC",
            ]),
            end_groups: strings(&["C", "O", "N", "F", "Cl", "Br", "CC(=O)O", "[H]"]),
        }
    }
}

impl ChainOptions {
    pub fn check(&self) -> Result<(), SourceError> {
        if self.units.is_empty() || self.end_groups.is_empty() {
            return Err(SourceError::EmptyAlphabet);
        }
        if self.min_units > self.max_units {
            return Err(SourceError::InvalidUnitRange {
                min: self.min_units,
                max: self.max_units,
            });
        }
        Ok(())
    }
}

/// An unbounded, reproducible stream of linear chain SMILES: an end group,
/// a random number of repeat units, and another end group.
#[derive(Debug, Clone)]
pub struct RandomSmilesSource {
    options: ChainOptions,
    rng: ChaCha8Rng,
}

impl RandomSmilesSource {
    pub fn new(options: ChainOptions) -> Result<Self, SourceError> {
        options.check()?;
        let rng = ChaCha8Rng::seed_from_u64(options.seed);
        Ok(Self { options, rng })
    }

    pub fn options(&self) -> &ChainOptions {
        &self.options
    }

    fn pick<'a>(rng: &mut ChaCha8Rng, items: &'a [String]) -> &'a str {
        items.choose(rng).map(String::as_str).unwrap_or_default()
    }
}

impl StringSource for RandomSmilesSource {
    fn next_candidate(&mut self) -> Option<String> {
        let count = self
            .rng
            .gen_range(self.options.min_units..=self.options.max_units);
        let mut smiles = String::from(Self::pick(&mut self.rng, &self.options.end_groups));
        for _ in 0..count {
            smiles.push_str(Self::pick(&mut self.rng, &self.options.units));
        }
        smiles.push_str(Self::pick(&mut self.rng, &self.options.end_groups));
        Some(smiles)
    }
}
