mod bracket;
pub use bracket::*;

mod smiles;
pub use smiles::*;

use crate::{BondType, Element};
use petgraph::graph::UnGraph;
use thiserror::Error;

/// An atom exactly as written in the SMILES string, before any chemistry
/// perception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAtom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    /// Explicit hydrogen count. Only bracket atoms carry one; organic-subset
    /// atoms get their hydrogens from the default valence.
    pub hydrogens: Option<u8>,
    pub isotope: Option<u16>,
}

impl ParsedAtom {
    pub fn organic(element: Element, aromatic: bool) -> Self {
        Self {
            element,
            aromatic,
            charge: 0,
            hydrogens: None,
            isotope: None,
        }
    }
}

pub type ParsedGraph = UnGraph<ParsedAtom, BondType>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,
    #[error("Branch start '(' at position {0} without a current atom")]
    BranchNoCurrentAtom(usize),
    #[error("Branch end ')' at position {0} without a matching '('")]
    BranchEndNoStart(usize),
    #[error("unclosed branch: {0} '(' left open")]
    UnclosedBranch(usize),
    #[error("Ring closure {0} at position {1} without a current atom")]
    RingClosureNoCurrentAtom(u8, usize),
    #[error("ring closure {0} at position {1} bonds an atom to itself")]
    RingClosureSelfBond(u8, usize),
    #[error("unclosed ring {0}")]
    UnclosedRing(u8),
    #[error("duplicate bond between atoms {0} and {1}")]
    DuplicateBond(usize, usize),
    #[error("Unclosed bracket '[' at position {0}")]
    UnclosedBracket(usize),
    #[error("invalid bracket atom '[{content}]': {reason}")]
    InvalidBracketAtom { content: String, reason: String },
    #[error("unknown element '{0}' at position {1}")]
    UnknownElement(String, usize),
    #[error("bond symbol at position {0} is not between two atoms")]
    DanglingBond(usize),
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),
}
