use crate::{CandidatePool, MolecularGraph};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;

/// One output set: candidate strings and their graphs, index-aligned, plus
/// the position each entry had in the pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    pub strings: Vec<String>,
    pub graphs: Vec<MolecularGraph>,
    pub pool_indices: Vec<usize>,
}

/// The held-out set has the same shape as the training set.
pub type CompetitionSet = DataSet;

impl DataSet {
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MolecularGraph)> + '_ {
        self.strings
            .iter()
            .map(String::as_str)
            .zip(self.graphs.iter())
    }

    fn from_entries(entries: Vec<(usize, String, MolecularGraph)>) -> Self {
        let mut set = DataSet {
            strings: Vec::with_capacity(entries.len()),
            graphs: Vec::with_capacity(entries.len()),
            pool_indices: Vec::with_capacity(entries.len()),
        };
        for (index, candidate, graph) in entries {
            set.pool_indices.push(index);
            set.strings.push(candidate);
            set.graphs.push(graph);
        }
        set
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("pool holds {pool} entries but the sets need {data} + {competition}")]
    SizeMismatch {
        pool: usize,
        data: usize,
        competition: usize,
    },
}

/// A uniformly shuffled permutation of `0..len`, fixed by `seed`.
pub fn permutation(len: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(&mut rng);
    order
}

/// Shuffles the pool with `seed` and cuts it into a training set of
/// `data_size` entries followed by a competition set of the rest.
///
/// Strings and graphs move together. Position `k` of the shuffled pool holds
/// pool entry `permutation(len, seed)[k]`.
pub fn split(
    pool: CandidatePool,
    seed: u64,
    data_size: usize,
    competition_size: usize,
) -> Result<(DataSet, CompetitionSet), SplitError> {
    if data_size.checked_add(competition_size) != Some(pool.len()) {
        return Err(SplitError::SizeMismatch {
            pool: pool.len(),
            data: data_size,
            competition: competition_size,
        });
    }

    let order = permutation(pool.len(), seed);
    let mut rank = vec![0; order.len()];
    for (position, &index) in order.iter().enumerate() {
        rank[index] = position;
    }

    let (strings, graphs) = pool.into_parts();
    let mut entries: Vec<(usize, String, MolecularGraph)> = strings
        .into_iter()
        .zip(graphs)
        .enumerate()
        .map(|(index, (candidate, graph))| (index, candidate, graph))
        .collect();
    entries.sort_unstable_by_key(|(index, _, _)| rank[*index]);

    let competition = entries.split_off(data_size);
    let data = DataSet::from_entries(entries);
    let competition = DataSet::from_entries(competition);
    info!(
        "Split {} graphs into {} training and {} competition entries (seed {seed})",
        order.len(),
        data.len(),
        competition.len()
    );
    Ok((data, competition))
}
