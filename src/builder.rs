use crate::{
    assign_parameters, default_table, load_table, parse_smiles, perceive, ForcefieldTable,
    Molecule, ParamMapping, SmilesError, TypingError, ValenceError,
};
use thiserror::Error;
use tracing::trace;

/// Why a candidate string could not be turned into a typed molecule.
///
/// The first three kinds reject one candidate; [`BuildError::Other`] means
/// the builder itself is broken and the run cannot continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("chemical value error: {0}")]
    ChemicalValue(String),
    #[error("forcefield assignment failed: {0}")]
    ForcefieldAssignment(String),
    #[error("molecule builder failure: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildErrorKind {
    MalformedInput,
    ChemicalValue,
    ForcefieldAssignment,
    Other,
}

impl BuildError {
    pub fn kind(&self) -> BuildErrorKind {
        match self {
            BuildError::MalformedInput(_) => BuildErrorKind::MalformedInput,
            BuildError::ChemicalValue(_) => BuildErrorKind::ChemicalValue,
            BuildError::ForcefieldAssignment(_) => BuildErrorKind::ForcefieldAssignment,
            BuildError::Other(_) => BuildErrorKind::Other,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind() != BuildErrorKind::Other
    }
}

impl From<SmilesError> for BuildError {
    fn from(e: SmilesError) -> Self {
        BuildError::MalformedInput(e.to_string())
    }
}

impl From<ValenceError> for BuildError {
    fn from(e: ValenceError) -> Self {
        BuildError::ChemicalValue(e.to_string())
    }
}

impl From<TypingError> for BuildError {
    fn from(e: TypingError) -> Self {
        BuildError::ForcefieldAssignment(e.to_string())
    }
}

/// A molecule together with the forcefield parameters of its atoms.
#[derive(Debug, Clone)]
pub struct TypedMolecule {
    pub molecule: Molecule,
    pub params: ParamMapping,
}

/// Turns one candidate string into a typed molecule.
pub trait MoleculeBuilder {
    fn build(&mut self, candidate: &str) -> Result<TypedMolecule, BuildError>;
}

impl<F> MoleculeBuilder for F
where
    F: FnMut(&str) -> Result<TypedMolecule, BuildError>,
{
    fn build(&mut self, candidate: &str) -> Result<TypedMolecule, BuildError> {
        self(candidate)
    }
}

/// Builds typed molecules from SMILES: parse, add hydrogens and perceive
/// valence and hybridization, then assign forcefield parameters.
#[derive(Debug, Clone)]
pub struct SmilesBuilder {
    table: ForcefieldTable,
}

impl SmilesBuilder {
    /// A builder using the embedded parameter table.
    pub fn new() -> Self {
        Self {
            table: default_table().clone(),
        }
    }

    /// A builder using a custom TOML parameter table. A table that does not
    /// parse is a builder failure, not a candidate failure.
    pub fn with_parameters(toml: &str) -> Result<Self, BuildError> {
        let table = load_table(Some(toml))
            .map_err(|e| BuildError::Other(format!("invalid forcefield table: {e}")))?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &ForcefieldTable {
        &self.table
    }
}

impl Default for SmilesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MoleculeBuilder for SmilesBuilder {
    fn build(&mut self, candidate: &str) -> Result<TypedMolecule, BuildError> {
        if self.table.types.is_empty() {
            return Err(BuildError::Other(
                "forcefield table has no atom types".to_string(),
            ));
        }
        let parsed = parse_smiles(candidate)?;
        let molecule = perceive(&parsed)?;
        let params = assign_parameters(&molecule, &self.table)?;
        trace!(
            "Built {candidate}: {} atoms, {} bonds",
            molecule.atom_count(),
            molecule.bond_count()
        );
        Ok(TypedMolecule { molecule, params })
    }
}
