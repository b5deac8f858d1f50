use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const DEFAULT_TABLE_TOML: &str = include_str!("../../resources/forcefield.toml");

static DEFAULT_TABLE: OnceLock<ForcefieldTable> = OnceLock::new();

/// Nonbonded parameters keyed by atom type name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForcefieldTable {
    #[serde(default)]
    pub types: HashMap<String, TypeParams>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TypeParams {
    pub type_id: u32,
    pub sigma: f64,
    pub epsilon: f64,
}

impl ForcefieldTable {
    pub fn get(&self, atom_type: &str) -> Option<&TypeParams> {
        self.types.get(atom_type)
    }
}

/// Parses a parameter table, falling back to the embedded one.
pub fn load_table(custom_toml: Option<&str>) -> Result<ForcefieldTable, toml::de::Error> {
    match custom_toml {
        Some(text) => toml::from_str(text),
        None => Ok(default_table().clone()),
    }
}

pub fn default_table() -> &'static ForcefieldTable {
    DEFAULT_TABLE.get_or_init(|| {
        toml::from_str(DEFAULT_TABLE_TOML)
            .expect("Failed to parse embedded forcefield table. This is a library bug.")
    })
}
