//! End-to-end dataset preparation: curate, split, persist.

use crate::{
    curate, project, split, BuildError, CompetitionSet, ConfigError, CurateError, DataSet,
    KeyValueStore, LineSource, MoleculeBuilder, Persister, PrepConfig, RandomSmilesSource,
    SmilesBuilder, SourceConfig, SourceError, SplitError, StoreError, StringSource,
};
use std::fs;
use thiserror::Error;
use tracing::info;

/// The entry point was given arguments. It accepts none.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected no arguments, got {}: {}", .arguments.len(), .arguments.join(" "))]
pub struct UsageError {
    pub arguments: Vec<String>,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Curate(#[from] CurateError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rejects any argument list that is not empty. `arguments` excludes the
/// program name.
pub fn check_arguments<S: AsRef<str>>(arguments: &[S]) -> Result<(), UsageError> {
    if arguments.is_empty() {
        Ok(())
    } else {
        Err(UsageError {
            arguments: arguments.iter().map(|a| a.as_ref().to_string()).collect(),
        })
    }
}

pub fn build_source(config: &SourceConfig) -> Result<Box<dyn StringSource>, SourceError> {
    Ok(match config {
        SourceConfig::Random(options) => {
            info!("Generating random chains with seed {}", options.seed);
            Box::new(RandomSmilesSource::new(options.clone())?)
        }
        SourceConfig::File { path } => {
            info!("Reading candidates from {}", path.display());
            Box::new(LineSource::open(path)?)
        }
    })
}

/// The SMILES builder, with the configured parameter table if there is one.
pub fn build_builder(config: &PrepConfig) -> Result<SmilesBuilder, PipelineError> {
    let Some(path) = &config.forcefield else {
        return Ok(SmilesBuilder::new());
    };
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    info!("Using forcefield parameters from {}", path.display());
    Ok(SmilesBuilder::with_parameters(&text)?)
}

/// Curates `data_size + competition_size` graphs and splits them.
pub fn prepare_sets<S, B>(
    config: &PrepConfig,
    source: &mut S,
    builder: &mut B,
) -> Result<(DataSet, CompetitionSet), PipelineError>
where
    S: StringSource + ?Sized,
    B: MoleculeBuilder + ?Sized,
{
    config.validate()?;
    let (pool, _report) = curate(
        source,
        builder,
        project,
        config.target_size(),
        config.max_nodes,
    )?;
    let sets = split(pool, config.seed, config.data_size, config.competition_size)?;
    Ok(sets)
}

/// Opens `name` fresh, writes one entry per member of `set`, and closes it.
pub fn write_set<P: Persister>(
    persister: &mut P,
    name: &str,
    set: &DataSet,
) -> Result<(), StoreError> {
    let mut store = persister.open_fresh(name)?;
    for (candidate, graph) in set.iter() {
        store.put(candidate, graph)?;
    }
    store.close()?;
    info!("Stored {} entries in '{name}'", set.len());
    Ok(())
}

/// Writes the training set, then the competition set.
pub fn write_sets<P: Persister>(
    persister: &mut P,
    config: &PrepConfig,
    data: &DataSet,
    competition: &CompetitionSet,
) -> Result<(), StoreError> {
    write_set(persister, &config.data_store, data)?;
    write_set(persister, &config.competition_store, competition)
}

/// Prepares both sets in memory and only then persists them, so a failed
/// run leaves no stores behind.
pub fn run<S, B, P>(
    config: &PrepConfig,
    source: &mut S,
    builder: &mut B,
    persister: &mut P,
) -> Result<(), PipelineError>
where
    S: StringSource + ?Sized,
    B: MoleculeBuilder + ?Sized,
    P: Persister,
{
    let (data, competition) = prepare_sets(config, source, builder)?;
    write_sets(persister, config, &data, &competition)?;
    Ok(())
}
