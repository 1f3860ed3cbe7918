pub mod atom;
pub mod bond;
pub mod cml;
pub mod element;
pub mod error;
pub mod formula;
pub mod graph;
pub mod traits;
pub mod valence;

pub use atom::Atom;
pub use bond::Bond;
pub use cml::{formula_from_cml, formula_from_cml_file, parse_cml, CmlError, CmlMolecule};
pub use element::Element;
pub use error::FormulaError;
pub use formula::{join, molecular_formula, render, ElementCounts, FormulaOptions, HydrogenPolicy};
pub use graph::{AtomRecord, BondRecord, Fragment, MolecularGraph};
pub use traits::ValenceLookup;
pub use valence::ValenceTable;
