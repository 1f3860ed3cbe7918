use std::str::FromStr;

use log::debug;

use crate::cml::error::CmlError;
use crate::cml::tokenizer::{local_name, tokenize, StartTag, Tag};
use crate::element::Element;
use crate::graph::{AtomRecord, BondRecord};

/// Atom and bond records read from the first `<molecule>` of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmlMolecule {
    pub atoms: Vec<AtomRecord>,
    pub bonds: Vec<BondRecord>,
}

/// Read the atoms and bonds of a CML document.
///
/// Only the first `<molecule>` element is read. Its `<atomArray>` must be
/// present; a missing `<bondArray>` means the molecule has no bonds.
pub fn parse_cml(doc: &str) -> Result<CmlMolecule, CmlError> {
    let tags = tokenize(doc)?;
    let mut molecule = CmlMolecule::default();
    let mut open: Vec<&str> = Vec::new();
    // depth of the <molecule> being read, i.e. the number of its ancestors
    let mut molecule_depth: Option<usize> = None;
    let mut seen_molecule = false;
    let mut seen_atom_array = false;

    for tag in &tags {
        match tag {
            Tag::Start(start) => {
                let name = local_name(start.name);
                if !seen_molecule && name == "molecule" {
                    seen_molecule = true;
                    if !start.empty {
                        molecule_depth = Some(open.len());
                    }
                } else if let Some(depth) = molecule_depth {
                    let parent = open.last().map(|p| local_name(p));
                    if open.len() == depth + 1 && name == "atomArray" {
                        seen_atom_array = true;
                    } else if open.len() == depth + 2 {
                        match (parent, name) {
                            (Some("atomArray"), "atom") => molecule.atoms.push(atom_record(start)?),
                            (Some("bondArray"), "bond") => molecule.bonds.push(bond_record(start)?),
                            _ => {}
                        }
                    }
                }
                if !start.empty {
                    open.push(start.name);
                }
            }
            Tag::End { name, line } => {
                match open.pop() {
                    Some(expected) if expected == *name => {}
                    Some(expected) => {
                        return Err(CmlError::syntax(
                            *line,
                            format!("</{name}> closes <{expected}>"),
                        ))
                    }
                    None => return Err(CmlError::syntax(*line, format!("unexpected </{name}>"))),
                }
                if molecule_depth == Some(open.len()) {
                    molecule_depth = None;
                }
            }
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(CmlError::syntax(
            doc.lines().count().max(1),
            format!("<{unclosed}> is never closed"),
        ));
    }
    if !seen_molecule {
        return Err(CmlError::MissingElement("molecule"));
    }
    if !seen_atom_array {
        return Err(CmlError::MissingElement("atomArray"));
    }

    debug!(
        "read {} atoms and {} bonds from CML",
        molecule.atoms.len(),
        molecule.bonds.len()
    );
    Ok(molecule)
}

fn atom_record(tag: &StartTag<'_>) -> Result<AtomRecord, CmlError> {
    let id = required(tag, "atom", "id")?;
    let symbol = required(tag, "atom", "elementType")?;
    if Element::from_symbol(symbol).is_none() {
        return Err(CmlError::UnknownElement {
            symbol: symbol.to_string(),
            line: tag.line,
        });
    }
    Ok(AtomRecord {
        id: id.to_string(),
        element: symbol.to_string(),
        explicit_valence: optional(tag, "atom", "mrvValence")?,
        formal_charge: optional(tag, "atom", "formalCharge")?.unwrap_or(0),
    })
}

fn bond_record(tag: &StartTag<'_>) -> Result<BondRecord, CmlError> {
    let refs = required(tag, "bond", "atomRefs2")?;
    let ids: Vec<&str> = refs.split_whitespace().collect();
    let [id1, id2] = ids[..] else {
        return Err(CmlError::MalformedBond {
            atom_refs: refs.to_string(),
            line: tag.line,
        });
    };
    let value = required(tag, "bond", "order")?;
    let order = match value.trim() {
        "1" | "S" => 1,
        "2" | "D" => 2,
        "3" | "T" => 3,
        _ => return Err(invalid(tag, "bond", "order", value)),
    };
    Ok(BondRecord::new(id1, id2, order))
}

fn required<'t>(
    tag: &'t StartTag<'_>,
    tag_name: &'static str,
    attribute: &'static str,
) -> Result<&'t str, CmlError> {
    tag.attr(attribute).ok_or(CmlError::MissingAttribute {
        tag: tag_name,
        attribute,
        line: tag.line,
    })
}

fn optional<T: FromStr>(
    tag: &StartTag<'_>,
    tag_name: &'static str,
    attribute: &'static str,
) -> Result<Option<T>, CmlError> {
    tag.attr(attribute)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| invalid(tag, tag_name, attribute, value))
        })
        .transpose()
}

fn invalid(
    tag: &StartTag<'_>,
    tag_name: &'static str,
    attribute: &'static str,
    value: &str,
) -> CmlError {
    CmlError::InvalidAttribute {
        tag: tag_name,
        attribute,
        value: value.to_string(),
        line: tag.line,
    }
}
