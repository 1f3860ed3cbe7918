//! Element counting and Hill system formula strings.
//!
//! [`render`] turns the element counts of one fragment into a Hill ordered
//! string, [`join`] puts fragment strings together with `.`, and
//! [`molecular_formula`] runs the whole derivation from reader records.

use std::collections::BTreeMap;
use std::fmt::Write;

use log::debug;

use crate::error::FormulaError;
use crate::graph::{AtomRecord, BondRecord, MolecularGraph};
use crate::traits::ValenceLookup;

/// What to do with an atom whose implicit hydrogen count comes out negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HydrogenPolicy {
    /// Fail with [`FormulaError::NegativeHydrogenCount`].
    #[default]
    Reject,
    /// Count the atom as carrying no implicit hydrogens.
    Clamp,
}

/// Options for formula derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FormulaOptions {
    pub hydrogens: HydrogenPolicy,
}

/// Element symbol to number of atoms, for one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCounts {
    counts: BTreeMap<String, u64>,
}

impl ElementCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` atoms of `symbol`. Adding zero leaves the counts untouched.
    pub fn add(&mut self, symbol: &str, n: u64) {
        if n == 0 {
            return;
        }
        *self.counts.entry(symbol.to_string()).or_default() += n;
    }

    pub fn get(&self, symbol: &str) -> u64 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.counts.contains_key(symbol)
    }

    /// Elements in alphabetical order of symbol.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(s, &n)| (s.as_str(), n))
    }

    pub fn total_atoms(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for ElementCounts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (symbol, n) in iter {
            counts.add(symbol.as_ref(), n);
        }
        counts
    }
}

/// Render element counts in Hill order.
///
/// With carbon present, C comes first, then H, then everything else
/// alphabetically. Without carbon every element, H included, is
/// alphabetical. A count of one is written as the bare symbol.
///
/// # Examples
///
/// ```
/// use cmlformula::{render, ElementCounts};
///
/// let ethane: ElementCounts = [("C", 2), ("H", 6)].into_iter().collect();
/// assert_eq!(render(&ethane), "C2H6");
/// ```
pub fn render(counts: &ElementCounts) -> String {
    let mut result = String::new();

    let has_carbon = counts.contains("C");
    if has_carbon {
        append_element(&mut result, "C", counts.get("C"));
        if counts.contains("H") {
            append_element(&mut result, "H", counts.get("H"));
        }
    }

    for (sym, count) in counts.iter() {
        if has_carbon && (sym == "C" || sym == "H") {
            continue;
        }
        append_element(&mut result, sym, count);
    }

    result
}

/// Join fragment formulas with `.` in the order given.
pub fn join<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = String::new();
    for (i, fragment) in fragments.into_iter().enumerate() {
        if i > 0 {
            result.push('.');
        }
        result.push_str(fragment.as_ref());
    }
    result
}

/// Derive the formula of a structure from reader records.
///
/// Builds the graph, resolves valences against `table`, and renders every
/// fragment. Any structural error aborts the whole derivation.
///
/// # Examples
///
/// ```
/// use cmlformula::{molecular_formula, AtomRecord, BondRecord, FormulaOptions, ValenceTable};
///
/// let atoms = [AtomRecord::new("a1", "C"), AtomRecord::new("a2", "O")];
/// let bonds = [BondRecord::new("a1", "a2", 1)];
/// let formula = molecular_formula(
///     &atoms,
///     &bonds,
///     &ValenceTable::standard(),
///     &FormulaOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(formula, "CH4O");
/// ```
pub fn molecular_formula<V: ValenceLookup + ?Sized>(
    atoms: &[AtomRecord],
    bonds: &[BondRecord],
    table: &V,
    options: &FormulaOptions,
) -> Result<String, FormulaError> {
    let mut graph = MolecularGraph::from_records(atoms, bonds)?;
    graph.correct_valences(table)?;
    let formula = graph.formula(options)?;
    debug!("derived formula {formula}");
    Ok(formula)
}

fn append_element(buf: &mut String, symbol: &str, count: u64) {
    buf.push_str(symbol);
    if count > 1 {
        // writing to a String cannot fail
        let _ = write!(buf, "{count}");
    }
}
