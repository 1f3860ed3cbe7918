use thiserror::Error;

/// Structural errors raised while deriving a formula.
///
/// Every variant aborts the derivation; no partial formula is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// An atom id was declared twice.
    #[error("atom with id '{0}' already exists")]
    DuplicateAtom(String),
    /// A bond references an id that was never declared.
    #[error("bond references unknown atom '{0}'")]
    UnknownAtom(String),
    /// Bond orders on an atom add up to more than its explicit valence.
    #[error("atom with id '{id}' has more bonds ({bond_order_sum}) than its valence ({valence})")]
    ValenceExceeded {
        id: String,
        valence: u32,
        bond_order_sum: u32,
    },
    /// The element is in the valence table but none of its valences fits.
    #[error("no valence >= {lower_bound} for element {element}")]
    NoValidValence { element: String, lower_bound: u32 },
    /// Bond orders must be positive.
    #[error("bond {id1}-{id2} has invalid order {order}")]
    InvalidBondOrder { id1: String, id2: String, order: u32 },
    /// The bond order sum of an atom no longer fits in a `u32`.
    #[error("bond of order {order} overflows the bond order sum of atom '{id}'")]
    BondOrderOverflow { id: String, order: u32 },
    /// Hydrogen accounting was requested before valences were resolved.
    #[error("valence of atom '{0}' has not been resolved")]
    UnresolvedValence(String),
    /// Charge and bond accounting leave the atom with fewer than zero hydrogens.
    #[error("atom with id '{id}' has a negative implicit hydrogen count ({count})")]
    NegativeHydrogenCount { id: String, count: i64 },
}
