use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element symbol '{0}'")]
pub struct ParseElementError(pub String);

/// The elements a candidate string may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    Si,
    P,
    S,
    Cl,
    Br,
    I,
}

lazy_static! {
    static ref SYMBOLS: HashMap<&'static str, Element> =
        Element::ALL.iter().map(|e| (e.symbol(), *e)).collect();
}

impl Element {
    pub const ALL: [Element; 12] = [
        Element::H,
        Element::B,
        Element::C,
        Element::N,
        Element::O,
        Element::F,
        Element::Si,
        Element::P,
        Element::S,
        Element::Cl,
        Element::Br,
        Element::I,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    pub fn atomic_number(self) -> u8 {
        match self {
            Element::H => 1,
            Element::B => 5,
            Element::C => 6,
            Element::N => 7,
            Element::O => 8,
            Element::F => 9,
            Element::Si => 14,
            Element::P => 15,
            Element::S => 16,
            Element::Cl => 17,
            Element::Br => 35,
            Element::I => 53,
        }
    }

    /// Standard atomic weight in daltons.
    pub fn mass(self) -> f64 {
        match self {
            Element::H => 1.008,
            Element::B => 10.81,
            Element::C => 12.011,
            Element::N => 14.007,
            Element::O => 15.999,
            Element::F => 18.998,
            Element::Si => 28.085,
            Element::P => 30.974,
            Element::S => 32.06,
            Element::Cl => 35.45,
            Element::Br => 79.904,
            Element::I => 126.904,
        }
    }

    /// Valences of the neutral atom, lowest first.
    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Element::H | Element::F | Element::Cl | Element::Br | Element::I => &[1],
            Element::B => &[3],
            Element::C | Element::Si => &[4],
            Element::N | Element::P => &[3, 5],
            Element::O => &[2],
            Element::S => &[2, 4, 6],
        }
    }

    /// Valences allowed for the atom carrying `charge`.
    ///
    /// Electron-rich atoms (N, O, P, S, halogens) gain a bond per unit of
    /// positive charge, boron gains one per unit of negative charge, and
    /// carbon-like atoms lose one per unit of charge of either sign.
    pub fn allowed_valences(self, charge: i8) -> Vec<u8> {
        let shift = match self {
            Element::N
            | Element::O
            | Element::P
            | Element::S
            | Element::F
            | Element::Cl
            | Element::Br
            | Element::I => i16::from(charge),
            Element::B => -i16::from(charge),
            Element::H | Element::C | Element::Si => -i16::from(charge).abs(),
        };
        self.default_valences()
            .iter()
            .filter_map(|&v| u8::try_from(i16::from(v) + shift).ok())
            .collect()
    }

    pub fn is_halogen(self) -> bool {
        matches!(self, Element::F | Element::Cl | Element::Br | Element::I)
    }

    /// Elements that may be written without brackets.
    pub fn in_organic_subset(self) -> bool {
        !matches!(self, Element::H | Element::Si)
    }

    /// Elements with a lowercase aromatic form.
    pub fn can_be_aromatic(self) -> bool {
        matches!(
            self,
            Element::B | Element::C | Element::N | Element::O | Element::P | Element::S
        )
    }

    pub fn from_symbol(symbol: &str) -> Option<Element> {
        SYMBOLS.get(symbol).copied()
    }

    /// Looks up a lowercase aromatic symbol such as `c` or `n`.
    pub fn from_aromatic_symbol(symbol: &str) -> Option<Element> {
        let mut chars = symbol.chars();
        let first = chars.next()?.to_ascii_uppercase();
        let capitalized: String = std::iter::once(first).chain(chars).collect();
        Element::from_symbol(&capitalized).filter(|e| e.can_be_aromatic())
    }

    pub fn from_atomic_number(number: u8) -> Option<Element> {
        Element::ALL
            .iter()
            .copied()
            .find(|e| e.atomic_number() == number)
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::from_symbol(s).ok_or_else(|| ParseElementError(s.to_string()))
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}
