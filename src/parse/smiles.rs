use super::{parse_bracket_atom, ParsedAtom, ParsedGraph, SmilesError};
use crate::{BondType, Element};
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;

/// An open ring closure: the atom that opened it and any bond symbol
/// written before the label.
#[derive(Debug, Clone, Copy)]
struct OpenRing {
    atom: NodeIndex,
    bond: Option<BondType>,
}

/// The bond used when none is written: aromatic between two aromatic
/// atoms, single otherwise.
fn implied_bond(graph: &ParsedGraph, a: NodeIndex, b: NodeIndex) -> BondType {
    if graph[a].aromatic && graph[b].aromatic {
        BondType::Aromatic
    } else {
        BondType::Single
    }
}

fn add_atom(
    graph: &mut ParsedGraph,
    atom: ParsedAtom,
    current_atom: &mut Option<NodeIndex>,
    pending_bond: &mut Option<BondType>,
) {
    let new_atom = graph.add_node(atom);
    if let Some(prev_atom) = *current_atom {
        let bond = pending_bond
            .take()
            .unwrap_or_else(|| implied_bond(graph, prev_atom, new_atom));
        graph.add_edge(prev_atom, new_atom, bond);
    }
    *current_atom = Some(new_atom);
}

fn close_ring(
    graph: &mut ParsedGraph,
    ring_map: &mut BTreeMap<u8, OpenRing>,
    label: u8,
    position: usize,
    current_atom: Option<NodeIndex>,
    pending_bond: &mut Option<BondType>,
) -> Result<(), SmilesError> {
    let current = current_atom.ok_or(SmilesError::RingClosureNoCurrentAtom(label, position))?;
    match ring_map.remove(&label) {
        Some(open) => {
            if open.atom == current {
                return Err(SmilesError::RingClosureSelfBond(label, position));
            }
            if graph.find_edge(open.atom, current).is_some() {
                return Err(SmilesError::DuplicateBond(
                    open.atom.index(),
                    current.index(),
                ));
            }
            let bond = pending_bond
                .take()
                .or(open.bond)
                .unwrap_or_else(|| implied_bond(graph, open.atom, current));
            graph.add_edge(open.atom, current, bond);
        }
        None => {
            ring_map.insert(
                label,
                OpenRing {
                    atom: current,
                    bond: pending_bond.take(),
                },
            );
        }
    }
    Ok(())
}

/// Parses a SMILES string into a graph of atoms as written.
///
/// Supports the organic subset (`B C N O P S F Cl Br I`), aromatic
/// lowercase atoms, bracket atoms, branches, ring closures (`1`-`9` and
/// `%nn`), bond symbols `- = # :`, the directional markers `/` and `\`
/// (read as single bonds) and `.` for disconnected components.
pub fn parse_smiles(smiles: &str) -> Result<ParsedGraph, SmilesError> {
    let smiles = smiles.trim();
    if smiles.is_empty() {
        return Err(SmilesError::Empty);
    }

    let mut graph = ParsedGraph::new_undirected();
    let mut current_atom: Option<NodeIndex> = None;
    let mut pending_bond: Option<BondType> = None;
    let mut branch_stack: Vec<NodeIndex> = Vec::new();
    let mut ring_map: BTreeMap<u8, OpenRing> = BTreeMap::new();

    let chars: Vec<char> = smiles.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                let atom = current_atom.ok_or(SmilesError::BranchNoCurrentAtom(i))?;
                branch_stack.push(atom);
                i += 1;
            }
            ')' => {
                if pending_bond.is_some() {
                    return Err(SmilesError::DanglingBond(i));
                }
                current_atom = Some(branch_stack.pop().ok_or(SmilesError::BranchEndNoStart(i))?);
                i += 1;
            }
            '-' | '=' | '#' | ':' | '/' | '\\' => {
                if current_atom.is_none() || pending_bond.is_some() {
                    return Err(SmilesError::DanglingBond(i));
                }
                pending_bond = Some(match c {
                    '=' => BondType::Double,
                    '#' => BondType::Triple,
                    ':' => BondType::Aromatic,
                    _ => BondType::Single,
                });
                i += 1;
            }
            '.' => {
                if pending_bond.is_some() {
                    return Err(SmilesError::DanglingBond(i));
                }
                current_atom = None;
                i += 1;
            }
            '%' => {
                let digits: String = chars.iter().skip(i + 1).take(2).collect();
                let label = match digits.parse::<u8>() {
                    Ok(label) if digits.len() == 2 => label,
                    _ => return Err(SmilesError::UnexpectedCharacter('%', i)),
                };
                close_ring(
                    &mut graph,
                    &mut ring_map,
                    label,
                    i,
                    current_atom,
                    &mut pending_bond,
                )?;
                i += 3;
            }
            '0'..='9' => {
                let label = c as u8 - b'0';
                close_ring(
                    &mut graph,
                    &mut ring_map,
                    label,
                    i,
                    current_atom,
                    &mut pending_bond,
                )?;
                i += 1;
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&x| x == ']')
                    .map(|offset| i + offset)
                    .ok_or(SmilesError::UnclosedBracket(i))?;
                let content: String = chars[i + 1..end].iter().collect();
                let bracket = parse_bracket_atom(&content)?;
                let atom = ParsedAtom {
                    element: bracket.element,
                    aromatic: bracket.aromatic,
                    charge: bracket.charge,
                    hydrogens: Some(bracket.hydrogens),
                    isotope: bracket.isotope,
                };
                add_atom(&mut graph, atom, &mut current_atom, &mut pending_bond);
                i = end + 1;
            }
            _ if c.is_ascii_alphabetic() => {
                // Two-letter organic atoms are only Cl and Br.
                let two_letter = match (c, chars.get(i + 1)) {
                    ('C', Some('l')) => Some(Element::Cl),
                    ('B', Some('r')) => Some(Element::Br),
                    _ => None,
                };
                let (atom, width) = match two_letter {
                    Some(element) => (ParsedAtom::organic(element, false), 2),
                    None => {
                        let symbol = c.to_string();
                        let atom = if c.is_ascii_lowercase() {
                            Element::from_aromatic_symbol(&symbol)
                                .map(|element| ParsedAtom::organic(element, true))
                        } else {
                            Element::from_symbol(&symbol)
                                .filter(|element| element.in_organic_subset())
                                .map(|element| ParsedAtom::organic(element, false))
                        };
                        (atom.ok_or(SmilesError::UnknownElement(symbol, i))?, 1)
                    }
                };
                add_atom(&mut graph, atom, &mut current_atom, &mut pending_bond);
                i += width;
            }
            _ => return Err(SmilesError::UnexpectedCharacter(c, i)),
        }
    }

    if !branch_stack.is_empty() {
        return Err(SmilesError::UnclosedBranch(branch_stack.len()));
    }
    if let Some(label) = ring_map.keys().next() {
        return Err(SmilesError::UnclosedRing(*label));
    }
    if pending_bond.is_some() {
        return Err(SmilesError::DanglingBond(chars.len()));
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bond_between(graph: &ParsedGraph, a: usize, b: usize) -> Option<BondType> {
        graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .map(|edge| graph[edge])
    }

    #[test]
    fn test_parse_isobutane() {
        let molecule = parse_smiles("CC(C)C").unwrap();
        assert_eq!(molecule.node_count(), 4);
        assert_eq!(molecule.edge_count(), 3);
        assert!(bond_between(&molecule, 0, 1).is_some());
        assert!(bond_between(&molecule, 1, 2).is_some());
        assert!(bond_between(&molecule, 1, 3).is_some());
        assert!(bond_between(&molecule, 2, 3).is_none());
    }

    #[test]
    fn test_parse_benzene() {
        let molecule = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(molecule.node_count(), 6);
        assert_eq!(molecule.edge_count(), 6);
        for edge in molecule.edge_references() {
            assert_eq!(*edge.weight(), BondType::Aromatic);
        }
        for node in molecule.node_indices() {
            assert_eq!(molecule.edges(node).count(), 2);
        }
    }

    #[test]
    fn test_parse_bonds_and_halogens() {
        let molecule = parse_smiles("C=CC#N.ClCBr").unwrap();
        assert_eq!(molecule.node_count(), 7);
        assert_eq!(bond_between(&molecule, 0, 1), Some(BondType::Double));
        assert_eq!(bond_between(&molecule, 2, 3), Some(BondType::Triple));
        // The dot starts a new component.
        assert_eq!(bond_between(&molecule, 3, 4), None);
        assert_eq!(molecule[NodeIndex::new(4)].element, Element::Cl);
        assert_eq!(molecule[NodeIndex::new(6)].element, Element::Br);
    }

    #[test]
    fn test_ring_closure_bond_symbols() {
        let molecule = parse_smiles("C=1CCC1").unwrap();
        assert_eq!(bond_between(&molecule, 0, 3), Some(BondType::Double));

        let molecule = parse_smiles("C%12CCC%12").unwrap();
        assert_eq!(molecule.edge_count(), 4);
    }

    #[test]
    fn test_explicit_single_between_aromatic_rings() {
        let molecule = parse_smiles("c1ccccc1-c1ccccc1").unwrap();
        assert_eq!(molecule.node_count(), 12);
        assert_eq!(bond_between(&molecule, 5, 6), Some(BondType::Single));
    }

    #[test]
    fn test_bracket_atoms() {
        let molecule = parse_smiles("C[NH3+].[O-]c1cc[nH]c1").unwrap();
        let nitrogen = &molecule[NodeIndex::new(1)];
        assert_eq!(nitrogen.element, Element::N);
        assert_eq!(nitrogen.hydrogens, Some(3));
        assert_eq!(nitrogen.charge, 1);
        assert_eq!(molecule[NodeIndex::new(2)].charge, -1);
        assert!(molecule[NodeIndex::new(6)].aromatic);
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse_smiles("  ").map(|_| ()), Err(SmilesError::Empty));
        assert_eq!(parse_smiles("C1CC").map(|_| ()), Err(SmilesError::UnclosedRing(1)));
        assert_eq!(parse_smiles("CC)C").map(|_| ()), Err(SmilesError::BranchEndNoStart(2)));
        assert_eq!(parse_smiles("C(C").map(|_| ()), Err(SmilesError::UnclosedBranch(1)));
        assert_eq!(parse_smiles("(C)").map(|_| ()), Err(SmilesError::BranchNoCurrentAtom(0)));
        assert_eq!(parse_smiles("C[NH4").map(|_| ()), Err(SmilesError::UnclosedBracket(1)));
        assert_eq!(parse_smiles("CC=").map(|_| ()), Err(SmilesError::DanglingBond(3)));
        assert_eq!(
            parse_smiles("CXC").map(|_| ()),
            Err(SmilesError::UnknownElement("X".to_string(), 1))
        );
        assert_eq!(
            parse_smiles("C11").map(|_| ()),
            Err(SmilesError::RingClosureSelfBond(1, 2))
        );
        assert_eq!(parse_smiles("C$").map(|_| ()), Err(SmilesError::UnexpectedCharacter('$', 1)));
        assert!(matches!(
            parse_smiles("[Zz]"),
            Err(SmilesError::InvalidBracketAtom { .. })
        ));
    }
}
