//! Forcefield atom typing.
//!
//! Atoms are typed with DREIDING-style names: the element symbol followed by
//! a hybridization suffix (`_1` sp, `_2` sp2, `_3` sp3, `_R` aromatic).
//! Hydrogens bonded to nitrogen or oxygen are hydrogen-bond donors (`H_HB`).
//! Every typed atom must have an entry in the [`ForcefieldTable`].

mod params;
pub use params::{default_table, load_table, ForcefieldTable, TypeParams};

use crate::{Element, Hybridization, Molecule};
use std::collections::BTreeMap;
use thiserror::Error;

/// A flat parameter record, parameter name to value.
pub type ParamRecord = BTreeMap<String, f64>;

/// Forcefield parameters of every typed atom, keyed by atom index.
pub type ParamMapping = BTreeMap<usize, ForcefieldParams>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypingError {
    #[error("no forcefield parameters for atom type '{atom_type}' (atom # {index})")]
    MissingParameter { index: usize, atom_type: String },
}

/// The parameters assigned to one atom.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcefieldParams {
    pub atom_type: String,
    pub type_id: u32,
    pub mass: f64,
    pub charge: f64,
    pub sigma: f64,
    pub epsilon: f64,
}

impl ForcefieldParams {
    /// The numeric fields as a name to value record.
    pub fn to_record(&self) -> ParamRecord {
        [
            ("mass", self.mass),
            ("charge", self.charge),
            ("sigma", self.sigma),
            ("epsilon", self.epsilon),
            ("type_id", f64::from(self.type_id)),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }
}

/// The atom type name of atom `index`, or `None` if there is no such atom.
pub fn atom_type(molecule: &Molecule, index: usize) -> Option<String> {
    let atom = molecule.atom(index)?;
    let name = match atom.element {
        Element::H => {
            let donor = molecule
                .neighbors(index)
                .any(|(_, n)| matches!(n.element, Element::N | Element::O));
            let name = if donor { "H_HB" } else { "H_" };
            name.to_string()
        }
        Element::F => "F_".to_string(),
        Element::Cl => "Cl".to_string(),
        Element::Br => "Br".to_string(),
        Element::I => "I_".to_string(),
        Element::P => "P_3".to_string(),
        element => {
            let suffix = if atom.aromatic {
                "R"
            } else {
                match atom.hybridization {
                    Hybridization::SP => "1",
                    Hybridization::SP2 => "2",
                    _ => "3",
                }
            };
            format!("{}_{}", element.symbol(), suffix)
        }
    };
    Some(name)
}

/// Types every atom of `molecule` and looks up its parameters.
pub fn assign_parameters(
    molecule: &Molecule,
    table: &ForcefieldTable,
) -> Result<ParamMapping, TypingError> {
    let mut mapping = ParamMapping::new();
    for (index, atom) in molecule.atoms() {
        let Some(type_name) = atom_type(molecule, index) else {
            continue;
        };
        let params = table
            .get(&type_name)
            .ok_or_else(|| TypingError::MissingParameter {
                index,
                atom_type: type_name.clone(),
            })?;
        mapping.insert(
            index,
            ForcefieldParams {
                atom_type: type_name,
                type_id: params.type_id,
                mass: atom.element.mass(),
                charge: f64::from(atom.formal_charge),
                sigma: params.sigma,
                epsilon: params.epsilon,
            },
        );
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_smiles, perceive};

    fn typed(smiles: &str) -> Result<(Molecule, ParamMapping), TypingError> {
        let molecule = perceive(&parse_smiles(smiles).unwrap()).unwrap();
        let mapping = assign_parameters(&molecule, default_table())?;
        Ok((molecule, mapping))
    }

    #[test]
    fn test_ethanol_types() {
        let (molecule, mapping) = typed("CCO").unwrap();
        assert_eq!(mapping.len(), molecule.atom_count());
        assert_eq!(mapping[&0].atom_type, "C_3");
        assert_eq!(mapping[&2].atom_type, "O_3");
        // The hydroxyl hydrogen is the last atom added.
        assert_eq!(mapping[&8].atom_type, "H_HB");
        assert_eq!(mapping[&3].atom_type, "H_");
    }

    #[test]
    fn test_unsaturated_and_aromatic_types() {
        let (_, mapping) = typed("C=CC#N").unwrap();
        assert_eq!(mapping[&0].atom_type, "C_2");
        assert_eq!(mapping[&2].atom_type, "C_1");
        assert_eq!(mapping[&3].atom_type, "N_1");

        let (_, mapping) = typed("c1ccncc1Cl").unwrap();
        assert_eq!(mapping[&0].atom_type, "C_R");
        assert_eq!(mapping[&3].atom_type, "N_R");
        assert_eq!(mapping[&6].atom_type, "Cl");
    }

    #[test]
    fn test_record_fields() {
        let (_, mapping) = typed("[O-]C").unwrap();
        let record = mapping[&0].to_record();
        let names: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["charge", "epsilon", "mass", "sigma", "type_id"]);
        assert_eq!(record["charge"], -1.0);
        assert_eq!(record["mass"], Element::O.mass());
        assert_eq!(record["type_id"], 11.0);
    }

    #[test]
    fn test_missing_parameters() {
        let err = typed("C[Si](C)(C)C").unwrap_err();
        assert_eq!(
            err,
            TypingError::MissingParameter {
                index: 1,
                atom_type: "Si_3".to_string()
            }
        );
        assert!(typed("CB(C)C").is_err());
    }
}
