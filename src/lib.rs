//! Builds reproducible training and competition datasets of attributed
//! molecular graphs from a stream of SMILES candidates.
//!
//! A run pulls candidates from a [`StringSource`], turns each one into a typed
//! molecule with a [`MoleculeBuilder`], projects it into a [`MolecularGraph`],
//! keeps the graphs below a node limit until the pool is full ([`curate`]),
//! shuffles and splits the pool with a fixed seed ([`split`]), and hands both
//! sets to a [`Persister`].

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

mod element;
pub use element::*;

mod molecule;
pub use molecule::*;

mod parse;
pub use parse::*;

mod perceive;
pub use perceive::*;

mod forcefield;
pub use forcefield::*;

mod builder;
pub use builder::*;

mod graph;
pub use graph::*;

mod visualize;
pub use visualize::*;

mod source;
pub use source::*;

mod curate;
pub use curate::*;

mod split;
pub use split::*;

mod store;
pub use store::*;

mod config;
pub use config::*;

mod pipeline;
pub use pipeline::*;

/// Bond order, encoded with the ordinal codes used by RDKit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BondType {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondType {
    pub fn code(self) -> u8 {
        match self {
            BondType::Single => 1,
            BondType::Double => 2,
            BondType::Triple => 3,
            BondType::Aromatic => 12,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(BondType::Single),
            2 => Some(BondType::Double),
            3 => Some(BondType::Triple),
            12 => Some(BondType::Aromatic),
            _ => None,
        }
    }

    /// Bond order counted against an atom's valence. Aromatic bonds count
    /// as one; the extra pi contribution is added per atom.
    pub fn valence_contribution(self) -> u8 {
        match self {
            BondType::Single | BondType::Aromatic => 1,
            BondType::Double => 2,
            BondType::Triple => 3,
        }
    }
}

/// Orbital hybridization, encoded with the ordinal codes used by RDKit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hybridization {
    Unspecified,
    S,
    SP,
    SP2,
    SP3,
}

impl Hybridization {
    pub fn code(self) -> u8 {
        match self {
            Hybridization::Unspecified => 0,
            Hybridization::S => 1,
            Hybridization::SP => 2,
            Hybridization::SP2 => 3,
            Hybridization::SP3 => 4,
        }
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
