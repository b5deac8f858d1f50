//! Attributed molecular graphs, the unit stored in every dataset.
//!
//! Nodes are the typed atoms of a molecule, keyed by atom index and carrying
//! the atom's features and its forcefield parameter record. Edges are bonds
//! between two nodes, labelled with the bond type code.

use crate::{Molecule, ParamMapping, ParamRecord};
use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Per-node attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomFeatures {
    pub atomic: u8,
    pub valence: u8,
    pub formal_charge: i8,
    pub aromatic: bool,
    pub hybridization: u8,
    pub param: ParamRecord,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphFormatError {
    #[error("node {0} appears more than once")]
    DuplicateNode(usize),
    #[error("edge {0}-{1} references a missing node")]
    DanglingEdge(usize, usize),
    #[error("edge {0}-{0} is a self loop")]
    SelfLoop(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NodeRecord {
    index: usize,
    #[serde(flatten)]
    features: AtomFeatures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct EdgeRecord {
    source: usize,
    target: usize,
    bond_type: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GraphRecord {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

/// An undirected graph of atoms with at most one edge per pair of nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "GraphRecord", try_from = "GraphRecord")]
pub struct MolecularGraph {
    nodes: BTreeMap<usize, AtomFeatures>,
    bonds: UnGraphMap<usize, u8>,
}

impl MolecularGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the node `index`.
    pub fn add_node(&mut self, index: usize, features: AtomFeatures) {
        self.nodes.insert(index, features);
        self.bonds.add_node(index);
    }

    /// Adds an edge between two existing nodes, overwriting the bond code if
    /// the pair is already connected. Returns `false` and leaves the graph
    /// untouched if an endpoint is missing or both endpoints are the same.
    pub fn add_edge(&mut self, a: usize, b: usize, bond_type: u8) -> bool {
        if a == b || !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            return false;
        }
        self.bonds.add_edge(a, b, bond_type);
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.bonds.edge_count()
    }

    pub fn node(&self, index: usize) -> Option<&AtomFeatures> {
        self.nodes.get(&index)
    }

    /// Nodes in ascending index order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &AtomFeatures)> + '_ {
        self.nodes.iter().map(|(&index, features)| (index, features))
    }

    /// Edges as `(low, high, bond_type)`, sorted.
    pub fn edges(&self) -> Vec<(usize, usize, u8)> {
        let mut edges: Vec<(usize, usize, u8)> = self
            .bonds
            .all_edges()
            .map(|(a, b, &code)| (a.min(b), a.max(b), code))
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn bond_type(&self, a: usize, b: usize) -> Option<u8> {
        self.bonds.edge_weight(a, b).copied()
    }

    pub fn contains_edge(&self, a: usize, b: usize) -> bool {
        self.bonds.contains_edge(a, b)
    }

    pub fn degree(&self, index: usize) -> usize {
        if self.nodes.contains_key(&index) {
            self.bonds.neighbors(index).count()
        } else {
            0
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl PartialEq for MolecularGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges() == other.edges()
    }
}

impl From<MolecularGraph> for GraphRecord {
    fn from(graph: MolecularGraph) -> Self {
        let edges = graph
            .edges()
            .into_iter()
            .map(|(source, target, bond_type)| EdgeRecord {
                source,
                target,
                bond_type,
            })
            .collect();
        let nodes = graph
            .nodes
            .into_iter()
            .map(|(index, features)| NodeRecord { index, features })
            .collect();
        GraphRecord { nodes, edges }
    }
}

impl TryFrom<GraphRecord> for MolecularGraph {
    type Error = GraphFormatError;

    fn try_from(record: GraphRecord) -> Result<Self, Self::Error> {
        let mut graph = MolecularGraph::new();
        for node in record.nodes {
            if graph.nodes.contains_key(&node.index) {
                return Err(GraphFormatError::DuplicateNode(node.index));
            }
            graph.add_node(node.index, node.features);
        }
        for edge in record.edges {
            if edge.source == edge.target {
                return Err(GraphFormatError::SelfLoop(edge.source));
            }
            if !graph.add_edge(edge.source, edge.target, edge.bond_type) {
                return Err(GraphFormatError::DanglingEdge(edge.source, edge.target));
            }
        }
        Ok(graph)
    }
}

/// Projects a typed molecule into an attributed graph.
///
/// Every key of `params` becomes a node with the features of that atom. Each
/// bond incident to a node becomes an edge when its other endpoint is also a
/// node; a bond seen from both of its atoms is stored once.
///
/// The keys of `params` are expected to be atom indices of `molecule`, as
/// parameter assignment produces them. A key with no such atom is logged and
/// left out, so the node count then falls short of `params.len()`.
pub fn project(molecule: &Molecule, params: &ParamMapping) -> MolecularGraph {
    let mut graph = MolecularGraph::new();
    for (&index, record) in params {
        let Some(atom) = molecule.atom(index) else {
            warn!(
                "Parameter record for atom {index} has no atom among {}",
                molecule.atom_count()
            );
            continue;
        };
        graph.add_node(
            index,
            AtomFeatures {
                atomic: atom.element.atomic_number(),
                valence: atom.total_valence,
                formal_charge: atom.formal_charge,
                aromatic: atom.aromatic,
                hybridization: atom.hybridization.code(),
                param: record.to_record(),
            },
        );
    }

    for &index in params.keys() {
        for bond in molecule.bonds_of(index) {
            graph.add_edge(bond.begin, bond.end, bond.bond_type.code());
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assign_parameters, default_table, parse_smiles, perceive, Atom, BondType, Element,
        ForcefieldParams, Hybridization,
    };

    fn typed(smiles: &str) -> (Molecule, ParamMapping) {
        let molecule = perceive(&parse_smiles(smiles).unwrap()).unwrap();
        let params = assign_parameters(&molecule, default_table()).unwrap();
        (molecule, params)
    }

    fn features(atomic: u8) -> AtomFeatures {
        AtomFeatures {
            atomic,
            valence: 4,
            formal_charge: 0,
            aromatic: false,
            hybridization: Hybridization::SP3.code(),
            param: ParamRecord::new(),
        }
    }

    #[test]
    fn test_project_formaldehyde() {
        let (molecule, params) = typed("C=O");
        let graph = project(&molecule, &params);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.bond_type(0, 1), Some(BondType::Double.code()));
        assert_eq!(graph.bond_type(1, 0), Some(2));

        let carbon = graph.node(0).unwrap();
        assert_eq!(carbon.atomic, 6);
        assert_eq!(carbon.valence, 4);
        assert_eq!(carbon.hybridization, 3);
        assert!(!carbon.aromatic);
        assert_eq!(carbon.param["type_id"], 4.0);
        assert_eq!(carbon.param.len(), 5);
    }

    #[test]
    fn test_aromatic_bond_codes() {
        let (molecule, params) = typed("c1ccccc1");
        let graph = project(&molecule, &params);
        assert_eq!(graph.node_count(), 12);
        assert_eq!(graph.edge_count(), 12);
        let ring: Vec<u8> = graph
            .edges()
            .into_iter()
            .filter(|&(a, b, _)| a < 6 && b < 6)
            .map(|(_, _, code)| code)
            .collect();
        assert_eq!(ring, vec![12; 6]);
        assert!(graph.node(0).unwrap().aromatic);
    }

    #[test]
    fn test_node_count_follows_mapping() {
        let (molecule, mut params) = typed("CCO");
        assert_eq!(molecule.atom_count(), 9);
        params.retain(|&index, _| index < 3);

        let graph = project(&molecule, &params);
        assert_eq!(graph.node_count(), params.len());
        assert_eq!(graph.node_count(), 3);
        // Bonds to the unmapped hydrogens are left out.
        assert_eq!(graph.edges(), vec![(0, 1, 1), (1, 2, 1)]);
    }

    #[test]
    fn test_key_without_atom_is_left_out() {
        let (molecule, mut params) = typed("C=O");
        let record = params[&0].clone();
        params.insert(40, record);

        let graph = project(&molecule, &params);
        assert_eq!(graph.node_count(), molecule.atom_count());
        assert_eq!(graph.node_count(), params.len() - 1);
        assert!(graph.node(40).is_none());
    }

    #[test]
    fn test_bond_seen_from_both_ends_is_one_edge() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(Atom::new(Element::C).with_valence(4));
        let b = molecule.add_atom(Atom::new(Element::C).with_valence(4));
        molecule.add_bond(a, b, BondType::Single);

        let record = ForcefieldParams {
            atom_type: "C_3".to_string(),
            type_id: 3,
            mass: 12.011,
            charge: 0.0,
            sigma: 3.4,
            epsilon: 0.1,
        };
        let params: ParamMapping = [(a, record.clone()), (b, record)].into_iter().collect();

        let graph = project(&molecule, &params);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(a), 1);
    }

    #[test]
    fn test_add_edge_overwrites() {
        let mut graph = MolecularGraph::new();
        graph.add_node(0, features(6));
        graph.add_node(1, features(8));
        assert!(graph.add_edge(0, 1, 1));
        assert!(graph.add_edge(1, 0, 2));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.bond_type(0, 1), Some(2));

        assert!(!graph.add_edge(0, 5, 1));
        assert!(!graph.add_edge(0, 0, 1));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_json_form() {
        let (molecule, params) = typed("CO");
        let graph = project(&molecule, &params);
        let value: serde_json::Value = serde_json::to_value(&graph).unwrap();

        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes[0]["index"], 0);
        assert_eq!(nodes[0]["atomic"], 6);
        assert_eq!(nodes[1]["atomic"], 8);
        assert_eq!(nodes[0]["param"]["type_id"], 3.0);
        let edges = value["edges"].as_array().unwrap();
        assert_eq!(edges.len(), 5);
        assert_eq!(edges[0]["source"], 0);
        assert_eq!(edges[0]["target"], 1);
        assert_eq!(edges[0]["bond_type"], 1);

        let back = MolecularGraph::from_json(&graph.to_json().unwrap()).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn test_rejects_inconsistent_json() {
        let node = r#"{"index":0,"atomic":6,"valence":4,"formal_charge":0,"aromatic":false,"hybridization":4,"param":{}}"#;
        let dangling = format!(
            r#"{{"nodes":[{node}],"edges":[{{"source":0,"target":1,"bond_type":1}}]}}"#
        );
        assert!(MolecularGraph::from_json(&dangling).is_err());

        let duplicate = format!(r#"{{"nodes":[{node},{node}],"edges":[]}}"#);
        assert!(MolecularGraph::from_json(&duplicate).is_err());
    }
}
