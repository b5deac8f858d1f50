use crate::{BuildError, Molecule, MolecularGraph, MoleculeBuilder, ParamMapping, StringSource};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Accepted candidates and their graphs, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    strings: Vec<String>,
    graphs: Vec<MolecularGraph>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strings: Vec::with_capacity(capacity),
            graphs: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, candidate: String, graph: MolecularGraph) {
        self.strings.push(candidate);
        self.graphs.push(graph);
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn graphs(&self) -> &[MolecularGraph] {
        &self.graphs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MolecularGraph)> + '_ {
        self.strings
            .iter()
            .map(String::as_str)
            .zip(self.graphs.iter())
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<MolecularGraph>) {
        (self.strings, self.graphs)
    }
}

impl FromIterator<(String, MolecularGraph)> for CandidatePool {
    fn from_iter<T: IntoIterator<Item = (String, MolecularGraph)>>(iter: T) -> Self {
        let mut pool = CandidatePool::new();
        for (candidate, graph) in iter {
            pool.push(candidate, graph);
        }
        pool
    }
}

/// Counters of one curation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurationReport {
    pub pulled: usize,
    pub accepted: usize,
    /// Candidates rejected with a recoverable build error.
    pub failed: usize,
    /// Candidates whose graph had too many nodes.
    pub oversized: usize,
}

#[derive(Error, Debug)]
pub enum CurateError {
    #[error("unrecoverable error while building '{candidate}'")]
    Fatal {
        candidate: String,
        #[source]
        source: BuildError,
    },
    #[error("candidate source exhausted after {accepted} of {target} graphs")]
    SourceExhausted { accepted: usize, target: usize },
    #[error("no graph has fewer than {max_nodes} nodes")]
    NoGraphFits { max_nodes: usize },
}

/// Pulls candidates until `target` graphs with fewer than `max_nodes` nodes
/// have been accepted.
///
/// Recoverable build errors are logged and the candidate is dropped. Any
/// other build error ends the run. Oversized graphs are dropped without
/// counting against anything. The loop only ends early if `source` runs dry.
pub fn curate<S, B, P>(
    source: &mut S,
    builder: &mut B,
    projector: P,
    target: usize,
    max_nodes: usize,
) -> Result<(CandidatePool, CurationReport), CurateError>
where
    S: StringSource + ?Sized,
    B: MoleculeBuilder + ?Sized,
    P: Fn(&Molecule, &ParamMapping) -> MolecularGraph,
{
    if max_nodes == 0 {
        return Err(CurateError::NoGraphFits { max_nodes });
    }

    info!("Curating {target} graphs with fewer than {max_nodes} nodes");
    let mut pool = CandidatePool::with_capacity(target);
    let mut report = CurationReport::default();

    while pool.len() < target {
        let Some(candidate) = source.next_candidate() else {
            return Err(CurateError::SourceExhausted {
                accepted: pool.len(),
                target,
            });
        };
        report.pulled += 1;

        let typed = match builder.build(&candidate) {
            Ok(typed) => typed,
            Err(e) if e.is_recoverable() => {
                report.failed += 1;
                let progress = pool.len() as f64 / target as f64;
                warn!("{progress:.4} {candidate}: {e}");
                continue;
            }
            Err(e) => {
                return Err(CurateError::Fatal {
                    candidate,
                    source: e,
                })
            }
        };

        let graph = projector(&typed.molecule, &typed.params);
        if graph.node_count() < max_nodes {
            debug!("Accepted {candidate} ({} nodes)", graph.node_count());
            pool.push(candidate, graph);
        } else {
            report.oversized += 1;
            trace!("Dropped {candidate}: {} nodes", graph.node_count());
        }
    }

    report.accepted = pool.len();
    info!(
        "Curated {} graphs from {} candidates ({} failed, {} oversized)",
        report.accepted, report.pulled, report.failed, report.oversized
    );
    Ok((pool, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        project, Atom, BondType, Element, ForcefieldParams, IterSource, SmilesBuilder,
        TypedMolecule,
    };

    /// A chain of `n` carbons with a parameter record for every atom.
    fn chain(n: usize) -> TypedMolecule {
        let mut molecule = Molecule::new();
        let mut params = ParamMapping::new();
        for i in 0..n {
            let atom = molecule.add_atom(Atom::new(Element::C).with_valence(4));
            if i > 0 {
                molecule.add_bond(atom - 1, atom, BondType::Single);
            }
            params.insert(
                atom,
                ForcefieldParams {
                    atom_type: "C_3".to_string(),
                    type_id: 3,
                    mass: 12.011,
                    charge: 0.0,
                    sigma: 3.4,
                    epsilon: 0.1,
                },
            );
        }
        TypedMolecule { molecule, params }
    }

    /// `n<digits>` builds an `n`-atom chain, `fatal` fails fatally and
    /// anything else is malformed.
    fn scripted(candidate: &str) -> Result<TypedMolecule, BuildError> {
        if candidate == "fatal" {
            return Err(BuildError::Other("builder crashed".to_string()));
        }
        candidate
            .strip_prefix('n')
            .and_then(|n| n.parse().ok())
            .map(chain)
            .ok_or_else(|| BuildError::MalformedInput(candidate.to_string()))
    }

    #[test]
    fn test_size_filter() {
        let mut source = IterSource::new(["n3", "n6", "n5", "n4"]);
        let mut builder = scripted;
        let (pool, report) = curate(&mut source, &mut builder, project, 2, 5).unwrap();
        assert_eq!(pool.strings(), ["n3", "n4"]);
        assert_eq!(report.oversized, 2);
        assert_eq!(report.accepted, 2);
        assert!(pool.graphs().iter().all(|g| g.node_count() < 5));
    }

    #[test]
    fn test_alternating_failures() {
        let mut pulls = 0;
        let mut candidates = ["bad", "n2", "bad", "n2", "n2", "n2"].into_iter();
        let mut source = IterSource::new(std::iter::from_fn(|| {
            pulls += 1;
            candidates.next()
        }));
        let mut builder = scripted;
        let (pool, report) = curate(&mut source, &mut builder, project, 2, 100).unwrap();
        drop(source);

        assert_eq!(pulls, 4);
        assert_eq!(
            report,
            CurationReport {
                pulled: 4,
                accepted: 2,
                failed: 2,
                oversized: 0
            }
        );
        assert_eq!(pool.len(), 2);
        for (candidate, graph) in pool.iter() {
            assert_eq!(candidate, "n2");
            assert_eq!(graph.node_count(), 2);
            assert_eq!(graph.edge_count(), 1);
        }
    }

    #[test]
    fn test_stops_at_target() {
        let mut source = IterSource::new((0..).map(|_| "n1"));
        let mut builder = scripted;
        let (pool, report) = curate(&mut source, &mut builder, project, 7, 10).unwrap();
        assert_eq!(pool.len(), 7);
        assert_eq!(report.pulled, 7);
        // The next pull still comes from where curation stopped.
        assert_eq!(source.next_candidate().as_deref(), Some("n1"));
    }

    #[test]
    fn test_zero_target() {
        let mut source = IterSource::new(Vec::<String>::new());
        let mut builder = scripted;
        let (pool, report) = curate(&mut source, &mut builder, project, 0, 10).unwrap();
        assert!(pool.is_empty());
        assert_eq!(report.pulled, 0);
    }

    #[test]
    fn test_fatal_error_aborts() {
        let mut source = IterSource::new(["n2", "bad", "fatal", "n2"]);
        let mut builder = scripted;
        let err = curate(&mut source, &mut builder, project, 3, 10).unwrap_err();
        match err {
            CurateError::Fatal { candidate, source } => {
                assert_eq!(candidate, "fatal");
                assert!(!source.is_recoverable());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(source.next_candidate().as_deref(), Some("n2"));
    }

    #[test]
    fn test_source_exhaustion() {
        let mut source = IterSource::new(["n2", "bad", "n9"]);
        let mut builder = scripted;
        let err = curate(&mut source, &mut builder, project, 3, 5).unwrap_err();
        assert!(matches!(
            err,
            CurateError::SourceExhausted {
                accepted: 1,
                target: 3
            }
        ));

        let err = curate(&mut source, &mut builder, project, 1, 0).unwrap_err();
        assert!(matches!(err, CurateError::NoGraphFits { max_nodes: 0 }));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut source = IterSource::new(["CC", "CC"]);
        let mut builder = SmilesBuilder::new();
        let (pool, _) = curate(&mut source, &mut builder, project, 2, 100).unwrap();
        assert_eq!(pool.strings(), ["CC", "CC"]);
        assert_eq!(pool.graphs()[0], pool.graphs()[1]);
    }

    #[test]
    fn test_real_builder() {
        let mut source = IterSource::new(["CCO", "C1CC", "CC(C)(C)(C)C", "c1ccccc1", "C[Si](C)(C)C", "CN"]);
        let mut builder = SmilesBuilder::new();
        let (pool, report) = curate(&mut source, &mut builder, project, 2, 10).unwrap();
        // Benzene has 12 atoms with hydrogens.
        assert_eq!(pool.strings(), ["CCO", "CN"]);
        assert_eq!(report.failed, 3);
        assert_eq!(report.oversized, 1);
        assert_eq!(report.pulled, 6);
    }

    #[test]
    fn test_pathological_candidates_are_skipped() {
        let mut source = IterSource::new([
            format!("C{}", "(C)".repeat(256)),
            format!("[O{}]", "-".repeat(128)),
            "CC".to_string(),
            "CN".to_string(),
        ]);
        let mut builder = SmilesBuilder::new();
        let (pool, report) = curate(&mut source, &mut builder, project, 2, 100).unwrap();
        assert_eq!(pool.strings(), ["CC", "CN"]);
        assert_eq!(report.failed, 2);
        assert_eq!(report.pulled, 4);
    }

    #[test]
    fn test_undecodable_line_does_not_end_the_file() {
        let mut source = crate::LineSource::new(&b"CC\n\xff\xfe\nCN\nCO\n"[..]);
        let mut builder = SmilesBuilder::new();
        let (pool, report) = curate(&mut source, &mut builder, project, 3, 100).unwrap();
        assert_eq!(pool.strings(), ["CC", "CN", "CO"]);
        assert_eq!(report.pulled, 3);
    }
}
