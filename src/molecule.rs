use crate::{BondType, Element, Hybridization};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

pub type MoleculeGraph = UnGraph<Atom, BondType>;

/// A perceived atom: element plus the properties the graph features read.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub formal_charge: i8,
    pub aromatic: bool,
    pub hybridization: Hybridization,
    /// Sum of bond orders including attached hydrogens.
    pub total_valence: u8,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            aromatic: false,
            hybridization: Hybridization::Unspecified,
            total_valence: 0,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }

    pub fn with_aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = aromatic;
        self
    }

    pub fn with_hybridization(mut self, hybridization: Hybridization) -> Self {
        self.hybridization = hybridization;
        self
    }

    pub fn with_valence(mut self, total_valence: u8) -> Self {
        self.total_valence = total_valence;
        self
    }
}

/// One bond as seen from either endpoint, with the endpoints in the order
/// the bond was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondRef {
    pub begin: usize,
    pub end: usize,
    pub bond_type: BondType,
}

/// A typed molecule with atoms addressed by their index.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    graph: MoleculeGraph,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: MoleculeGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.graph.add_node(atom).index()
    }

    /// Adds a bond between two existing atoms. Returns `None` if either atom
    /// does not exist.
    pub fn add_bond(&mut self, begin: usize, end: usize, bond_type: BondType) -> Option<usize> {
        if begin >= self.atom_count() || end >= self.atom_count() {
            return None;
        }
        let edge = self
            .graph
            .add_edge(NodeIndex::new(begin), NodeIndex::new(end), bond_type);
        Some(edge.index())
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.graph.node_weight(NodeIndex::new(index))
    }

    pub fn atoms(&self) -> impl Iterator<Item = (usize, &Atom)> + '_ {
        self.graph
            .node_indices()
            .map(move |node| (node.index(), &self.graph[node]))
    }

    /// All bonds incident to `index`. Unknown atoms have no bonds.
    pub fn bonds_of(&self, index: usize) -> impl Iterator<Item = BondRef> + '_ {
        self.graph
            .edges(NodeIndex::new(index))
            .filter_map(move |edge| {
                let (begin, end) = self.graph.edge_endpoints(edge.id())?;
                Some(BondRef {
                    begin: begin.index(),
                    end: end.index(),
                    bond_type: *edge.weight(),
                })
            })
    }

    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (usize, &Atom)> + '_ {
        self.graph
            .neighbors(NodeIndex::new(index))
            .map(move |node| (node.index(), &self.graph[node]))
    }
}
