use thiserror::Error;

use crate::error::FormulaError;

/// Errors produced when reading a CML document or deriving its formula.
///
/// Everything except [`CmlError::Structure`] is a problem with the document
/// itself; `Structure` wraps a failure of the molecular graph built from it.
#[derive(Debug, Error)]
pub enum CmlError {
    #[error("failed to read CML document: {0}")]
    Io(#[from] std::io::Error),

    /// The markup itself is broken (unterminated tag, mismatched close tag, ...).
    #[error("malformed CML at line {line}: {details}")]
    Syntax { line: usize, details: String },

    /// A required element such as `<molecule>` or `<atomArray>` is absent.
    #[error("CML document has no <{0}> element")]
    MissingElement(&'static str),

    #[error("<{tag}> at line {line} is missing the '{attribute}' attribute")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
        line: usize,
    },

    #[error("<{tag}> at line {line} has invalid {attribute}=\"{value}\"")]
    InvalidAttribute {
        tag: &'static str,
        attribute: &'static str,
        value: String,
        line: usize,
    },

    /// `elementType` is not a recognized chemical element.
    #[error("non-chemical element '{symbol}' at line {line}")]
    UnknownElement { symbol: String, line: usize },

    /// `atomRefs2` does not name exactly two atoms.
    #[error("wrong bond '{atom_refs}' at line {line}")]
    MalformedBond { atom_refs: String, line: usize },

    #[error(transparent)]
    Structure(#[from] FormulaError),
}

impl CmlError {
    pub(crate) fn syntax(line: usize, details: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            details: details.into(),
        }
    }
}
