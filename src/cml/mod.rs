//! Reading Chemical Markup Language documents.
//!
//! Only the parts needed for a formula are read: atom ids, element types,
//! optional `mrvValence` and `formalCharge`, and bonds with their orders.

pub mod error;
mod reader;
mod tokenizer;

use std::path::Path;

use crate::formula::{molecular_formula, FormulaOptions};
use crate::valence::ValenceTable;
pub use error::CmlError;
pub use reader::{parse_cml, CmlMolecule};

/// Derive the molecular formula of a CML document using the standard
/// valence table.
pub fn formula_from_cml(doc: &str, options: &FormulaOptions) -> Result<String, CmlError> {
    let molecule = parse_cml(doc)?;
    Ok(molecular_formula(
        &molecule.atoms,
        &molecule.bonds,
        &ValenceTable::standard(),
        options,
    )?)
}

/// Like [`formula_from_cml`], reading the document from `path`.
pub fn formula_from_cml_file(
    path: impl AsRef<Path>,
    options: &FormulaOptions,
) -> Result<String, CmlError> {
    let doc = std::fs::read_to_string(path)?;
    formula_from_cml(&doc, options)
}
