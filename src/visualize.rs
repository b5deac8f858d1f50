use crate::{BondType, Element, MolecularGraph};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Renders a [`MolecularGraph`] as a Graphviz DOT document.
pub struct DotGraph<'a>(pub &'a MolecularGraph);

/// Generates a DOT representation of the graph, one node per atom labelled
/// with its element and one edge statement per bond.
pub fn to_dot(graph: &MolecularGraph) -> String {
    DotGraph(graph).to_string()
}

/// The label drawn inside a node. Unknown atomic numbers are shown as `#n`.
fn element_label(atomic: u8) -> String {
    Element::from_atomic_number(atomic)
        .map(|element| element.symbol().to_string())
        .unwrap_or_else(|| format!("#{atomic}"))
}

fn element_color(atomic: u8) -> &'static str {
    match Element::from_atomic_number(atomic) {
        Some(Element::C) => "black",
        Some(Element::H) => "gray",
        Some(Element::O) => "red",
        Some(Element::N) => "blue",
        Some(Element::Cl) => "darkgreen",
        Some(Element::Br) => "brown",
        Some(Element::F) => "pink",
        Some(Element::S) => "yellow",
        Some(Element::P) => "orange",
        Some(Element::I) => "purple",
        _ => "slategray",
    }
}

/// Maps a bond type code to a Graphviz edge style, pen width and any extra
/// attributes.
fn bond_style(code: u8) -> (&'static str, f64, &'static str) {
    match BondType::from_code(code) {
        Some(BondType::Single) => ("solid", 2.0, ""),
        Some(BondType::Double) => ("solid", 4.0, ""),
        Some(BondType::Triple) => ("solid", 6.0, ""),
        Some(BondType::Aromatic) => ("dashed", 2.0, ", color=purple"),
        None => ("dotted", 1.0, ""),
    }
}

impl Display for DotGraph<'_> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "graph Molecule {{")?;
        writeln!(f, "    layout=neato;")?;

        for (index, features) in self.0.nodes() {
            let charge = match features.formal_charge {
                0 => String::new(),
                1 => "+".to_string(),
                -1 => "-".to_string(),
                c if c > 0 => format!("{c}+"),
                c => format!("{}-", c.unsigned_abs()),
            };
            writeln!(
                f,
                "    {index} [label=\"{}{charge}\", fontcolor=white, shape=circle, style=filled, fillcolor={}];",
                element_label(features.atomic),
                element_color(features.atomic),
            )?;
        }

        for (source, target, code) in self.0.edges() {
            let (style, penwidth, extra) = bond_style(code);
            writeln!(
                f,
                "    {source} -- {target} [style={style}, penwidth={penwidth}{extra}];"
            )?;
        }

        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assign_parameters, default_table, parse_smiles, perceive, project};

    fn graph(smiles: &str) -> MolecularGraph {
        let molecule = perceive(&parse_smiles(smiles).unwrap()).unwrap();
        let params = assign_parameters(&molecule, default_table()).unwrap();
        project(&molecule, &params)
    }

    #[test]
    fn test_element_labels() {
        assert_eq!(element_label(6), "C");
        assert_eq!(element_label(17), "Cl");
        assert_eq!(element_label(92), "#92");
        assert_eq!(element_color(8), "red");
    }

    #[test]
    fn test_dot_ethanol() {
        let dot = to_dot(&graph("CCO"));
        assert!(dot.starts_with("graph Molecule {"));
        assert!(dot.trim_end().ends_with('}'));
        assert_eq!(dot.matches("label=").count(), 9);
        assert_eq!(dot.matches(" -- ").count(), 8);
        assert!(dot.contains("2 [label=\"O\""));
        assert!(dot.contains("0 -- 1 [style=solid, penwidth=2]"));
    }

    #[test]
    fn test_dot_bond_styles_and_charges() {
        let dot = to_dot(&graph("c1ccccc1C(=O)[O-]"));
        assert!(dot.contains("0 -- 1 [style=dashed, penwidth=2, color=purple]"));
        assert!(dot.contains("6 -- 7 [style=solid, penwidth=4]"));
        assert!(dot.contains("8 [label=\"O-\""));
    }
}
