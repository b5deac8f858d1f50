use crate::{Atom, BondType, Element, Hybridization, Molecule, ParsedGraph};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValenceError {
    #[error("non-ring atom {0} ({1}) marked aromatic")]
    NonRingAromatic(usize, Element),
    #[error("explicit valence for atom # {index} {element}, {valence}, is greater than permitted")]
    ExceedsValence {
        index: usize,
        element: Element,
        valence: u8,
    },
}

/// Bond summary of one parsed atom. Counts saturate at `u8::MAX`, which is
/// beyond every allowed valence.
#[derive(Debug, Default, Clone, Copy)]
struct BondTally {
    aromatic: u8,
    double: u8,
    triple: u8,
    /// Sum of bond orders with aromatic bonds counted as one.
    order_sum: u8,
}

fn tally(graph: &ParsedGraph, node: NodeIndex) -> BondTally {
    let mut tally = BondTally::default();
    for edge in graph.edges(node) {
        let bond = *edge.weight();
        match bond {
            BondType::Aromatic => tally.aromatic = tally.aromatic.saturating_add(1),
            BondType::Double => tally.double = tally.double.saturating_add(1),
            BondType::Triple => tally.triple = tally.triple.saturating_add(1),
            BondType::Single => {}
        }
        tally.order_sum = tally.order_sum.saturating_add(bond.valence_contribution());
    }
    tally
}

/// The extra valence an aromatic atom spends on the pi system. Carbon always
/// contributes one unless it already carries an exocyclic double bond;
/// nitrogen and phosphorus contribute one only when two-connected without
/// hydrogens (pyridine-like). Oxygen, sulfur and boron donate lone pairs or
/// empty orbitals instead.
fn pi_contribution(element: Element, tally: &BondTally, explicit_h: Option<u8>) -> u8 {
    match element {
        Element::C if tally.double == 0 => 1,
        Element::N | Element::P if tally.order_sum < 3 && explicit_h.unwrap_or(0) == 0 => 1,
        _ => 0,
    }
}

fn hybridization(element: Element, aromatic: bool, tally: &BondTally) -> Hybridization {
    if element == Element::H {
        Hybridization::S
    } else if aromatic {
        Hybridization::SP2
    } else if tally.triple > 0 || tally.double > 1 {
        Hybridization::SP
    } else if tally.double == 1 {
        Hybridization::SP2
    } else {
        Hybridization::SP3
    }
}

/// Completes a parsed molecule: checks valences, adds the implicit
/// hydrogens as explicit atoms (appended after the heavy atoms), and
/// computes total valence and hybridization for every atom.
pub fn perceive(parsed: &ParsedGraph) -> Result<Molecule, ValenceError> {
    let mut molecule = Molecule::new();
    let mut hydrogens = Vec::with_capacity(parsed.node_count());

    for node in parsed.node_indices() {
        let index = node.index();
        let atom = &parsed[node];
        let tally = tally(parsed, node);

        if atom.aromatic && tally.aromatic < 2 {
            return Err(ValenceError::NonRingAromatic(index, atom.element));
        }

        let pi = if atom.aromatic {
            pi_contribution(atom.element, &tally, atom.hydrogens)
        } else {
            0
        };
        let explicit = tally.order_sum.saturating_add(pi);
        let mut allowed = atom.element.allowed_valences(atom.charge);
        if atom.aromatic {
            allowed.truncate(1);
        }

        let h_count = match atom.hydrogens {
            Some(h) => {
                let valence = explicit.saturating_add(h);
                if allowed.iter().all(|&v| valence > v) {
                    return Err(ValenceError::ExceedsValence {
                        index,
                        element: atom.element,
                        valence,
                    });
                }
                h
            }
            None => allowed
                .iter()
                .find(|&&v| v >= explicit)
                .map(|&v| v - explicit)
                .ok_or(ValenceError::ExceedsValence {
                    index,
                    element: atom.element,
                    valence: explicit,
                })?,
        };

        let heavy = Atom::new(atom.element)
            .with_charge(atom.charge)
            .with_aromatic(atom.aromatic)
            .with_hybridization(hybridization(atom.element, atom.aromatic, &tally))
            .with_valence(explicit + h_count);
        molecule.add_atom(heavy);
        hydrogens.push(h_count);
    }

    for edge in parsed.edge_references() {
        molecule.add_bond(edge.source().index(), edge.target().index(), *edge.weight());
    }

    for (parent, count) in hydrogens.into_iter().enumerate() {
        for _ in 0..count {
            let h = molecule.add_atom(
                Atom::new(Element::H)
                    .with_hybridization(Hybridization::S)
                    .with_valence(1),
            );
            molecule.add_bond(parent, h, BondType::Single);
        }
    }

    Ok(molecule)
}
