//! Standard valences used to deduce how many hydrogens an atom carries.

use crate::error::FormulaError;
use crate::traits::ValenceLookup;

/// Element symbol to ascending list of chemically valid valences.
///
/// The table is plain borrowed data, so a single instance can be shared by
/// any number of concurrent derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValenceTable<'a> {
    entries: &'a [(&'a str, &'a [u32])],
}

const V1: &[u32] = &[1];
const V2: &[u32] = &[2];
const V3: &[u32] = &[3];
const V13: &[u32] = &[1, 3];
const V4: &[u32] = &[4];
const V24: &[u32] = &[2, 4];
const V35: &[u32] = &[3, 5];
const V246: &[u32] = &[2, 4, 6];
const V1357: &[u32] = &[1, 3, 5, 7];

const STANDARD_VALENCES: [(&str, &[u32]); 37] = [
    ("Li", V1),
    ("Na", V1),
    ("K", V1),
    ("Rb", V1),
    ("Cs", V1),
    ("Fr", V1),
    ("F", V1),
    ("Be", V2),
    ("Mg", V2),
    ("Ca", V2),
    ("Sr", V2),
    ("Ba", V2),
    ("Ra", V2),
    ("B", V3),
    ("Al", V3),
    ("Ga", V3),
    ("In", V3),
    ("Tl", V13),
    ("C", V4),
    ("Si", V4),
    ("Ge", V4),
    ("Pb", V24),
    ("Sn", V24),
    ("O", V24),
    ("N", V35),
    ("P", V35),
    ("As", V35),
    ("Sb", V35),
    ("Bi", V35),
    ("S", V246),
    ("Se", V246),
    ("Te", V246),
    ("Po", V246),
    ("Cl", V1357),
    ("Br", V1357),
    ("I", V1357),
    ("At", V1357),
];

impl ValenceTable<'static> {
    /// The fixed reference table.
    pub const fn standard() -> Self {
        Self {
            entries: &STANDARD_VALENCES,
        }
    }
}

impl Default for ValenceTable<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> ValenceTable<'a> {
    /// Build a table from caller-supplied entries.
    ///
    /// Each valence list must be in ascending order. An empty list behaves
    /// like an element missing from the table.
    pub const fn new(entries: &'a [(&'a str, &'a [u32])]) -> Self {
        Self { entries }
    }

    pub fn valences(&self, element: &str) -> Option<&'a [u32]> {
        self.entries
            .iter()
            .find(|(sym, _)| *sym == element)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ValenceLookup for ValenceTable<'_> {
    fn ceil_valence(&self, element: &str, lower_bound: u32) -> Result<u32, FormulaError> {
        let allowed = match self.valences(element) {
            Some(v) if !v.is_empty() => v,
            _ => return Ok(lower_bound),
        };
        allowed
            .iter()
            .copied()
            .find(|&v| v >= lower_bound)
            .ok_or_else(|| FormulaError::NoValidValence {
                element: element.to_string(),
                lower_bound,
            })
    }
}
