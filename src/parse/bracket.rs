//! Parser for the inside of a bracket atom, e.g. `13CH3+`, `nH`, `O-`.

use nom::{
    branch::alt,
    bytes::complete::{take_while1, take_while_m_n},
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{convert_error, VerboseError},
    sequence::{pair, preceded, tuple},
    IResult,
};

use super::SmilesError;
use crate::Element;

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketAtom {
    pub isotope: Option<u16>,
    pub element: Element,
    pub aromatic: bool,
    pub hydrogens: u8,
    pub charge: i8,
    pub class: Option<u16>,
}

fn isotope(input: &str) -> Res<u16> {
    map_res(digit1, str::parse::<u16>)(input)
}

/// An uppercase symbol with an optional lowercase second letter, or a
/// single lowercase aromatic letter.
fn symbol(input: &str) -> Res<(&str, bool)> {
    alt((
        map(
            recognize(pair(
                satisfy(|c| c.is_ascii_uppercase()),
                opt(satisfy(|c| c.is_ascii_lowercase())),
            )),
            |s: &str| (s, false),
        ),
        map(recognize(satisfy(|c| c.is_ascii_lowercase())), |s: &str| {
            (s, true)
        }),
    ))(input)
}

fn chirality(input: &str) -> Res<&str> {
    recognize(pair(char('@'), opt(char('@'))))(input)
}

fn hydrogen_count(input: &str) -> Res<u8> {
    map(
        preceded(
            char('H'),
            opt(map_res(
                take_while_m_n(1, 1, |c: char| c.is_ascii_digit()),
                str::parse::<u8>,
            )),
        ),
        |count| count.unwrap_or(1),
    )(input)
}

fn charge(input: &str) -> Res<i8> {
    alt((
        map_res(
            pair(one_of("+-"), digit1),
            |(sign, digits): (char, &str)| {
                digits
                    .parse::<i8>()
                    .map(|n| if sign == '-' { -n } else { n })
            },
        ),
        map_res(take_while1(|c: char| c == '+'), |s: &str| i8::try_from(s.len())),
        map_res(take_while1(|c: char| c == '-'), |s: &str| {
            i8::try_from(s.len()).map(|n| -n)
        }),
    ))(input)
}

fn atom_class(input: &str) -> Res<u16> {
    preceded(char(':'), map_res(digit1, str::parse::<u16>))(input)
}

/// Parses the text between `[` and `]`.
pub fn parse_bracket_atom(content: &str) -> Result<BracketAtom, SmilesError> {
    let parsed = all_consuming(tuple((
        opt(isotope),
        symbol,
        opt(chirality),
        opt(hydrogen_count),
        opt(charge),
        opt(atom_class),
    )))(content);

    let (isotope, (symbol, aromatic), _, hydrogens, charge, class) = match parsed {
        Ok((_, fields)) => fields,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(SmilesError::InvalidBracketAtom {
                content: content.to_string(),
                reason: convert_error(content, e),
            })
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(SmilesError::InvalidBracketAtom {
                content: content.to_string(),
                reason: "incomplete".to_string(),
            })
        }
    };

    let element = if aromatic {
        Element::from_aromatic_symbol(symbol)
    } else {
        Element::from_symbol(symbol)
    }
    .ok_or_else(|| SmilesError::InvalidBracketAtom {
        content: content.to_string(),
        reason: format!("unknown element symbol '{symbol}'"),
    })?;

    Ok(BracketAtom {
        isotope,
        element,
        aromatic,
        hydrogens: hydrogens.unwrap_or(0),
        charge: charge.unwrap_or(0),
        class,
    })
}
