use crate::error::FormulaError;
use crate::traits::ValenceLookup;

/// Per-atom bond and valence bookkeeping.
///
/// An `Atom` accumulates the orders of the bonds attached to it. Its valence
/// is either fixed up front (an explicit valence from the input) or deduced
/// later from the accumulated bond orders by [`Atom::correct_valence`]. Once
/// the valence is known, the number of implicit hydrogens follows from
/// `valence - bond_order_sum + formal_charge`.
///
/// # Examples
///
/// ```
/// use cmlformula::{Atom, ValenceTable};
///
/// let mut carbon = Atom::new("a1", "C", None, 0);
/// carbon.add_bond(2).unwrap();
/// carbon.correct_valence(&ValenceTable::standard()).unwrap();
/// assert_eq!(carbon.implicit_hydrogen_count(), Ok(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    id: String,
    element: String,
    explicit_valence: Option<u32>,
    bond_order_sum: u32,
    formal_charge: i32,
    resolved_valence: Option<u32>,
}

impl Atom {
    pub fn new(
        id: impl Into<String>,
        element: impl Into<String>,
        explicit_valence: Option<u32>,
        formal_charge: i32,
    ) -> Self {
        Self {
            id: id.into(),
            element: element.into(),
            explicit_valence,
            bond_order_sum: 0,
            formal_charge,
            resolved_valence: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn explicit_valence(&self) -> Option<u32> {
        self.explicit_valence
    }

    /// Sum of the orders of all bonds added so far.
    pub fn bond_order_sum(&self) -> u32 {
        self.bond_order_sum
    }

    pub fn formal_charge(&self) -> i32 {
        self.formal_charge
    }

    /// The valence fixed by [`Atom::correct_valence`], if it has run.
    pub fn resolved_valence(&self) -> Option<u32> {
        self.resolved_valence
    }

    /// Record a bond of the given order.
    ///
    /// Fails with [`FormulaError::ValenceExceeded`] when the atom has an
    /// explicit valence and the new bond order sum goes past it, and with
    /// [`FormulaError::BondOrderOverflow`] (leaving the atom untouched) when
    /// the sum would not fit in a `u32`.
    pub fn add_bond(&mut self, order: u32) -> Result<(), FormulaError> {
        let Some(sum) = self.bond_order_sum.checked_add(order) else {
            return Err(FormulaError::BondOrderOverflow {
                id: self.id.clone(),
                order,
            });
        };
        self.bond_order_sum = sum;
        match self.explicit_valence {
            Some(valence) if self.bond_order_sum > valence => Err(FormulaError::ValenceExceeded {
                id: self.id.clone(),
                valence,
                bond_order_sum: self.bond_order_sum,
            }),
            _ => Ok(()),
        }
    }

    /// Fix the atom's valence.
    ///
    /// An explicit valence is taken as is. Otherwise the smallest reference
    /// valence that can hold the current bond order sum is used.
    pub fn correct_valence<V: ValenceLookup + ?Sized>(
        &mut self,
        table: &V,
    ) -> Result<(), FormulaError> {
        let valence = match self.explicit_valence {
            Some(v) => v,
            None => table.ceil_valence(&self.element, self.bond_order_sum)?,
        };
        self.resolved_valence = Some(valence);
        Ok(())
    }

    /// Hydrogens implied by the resolved valence, bonds and formal charge.
    ///
    /// The result can be negative when the charge does not fit the bonding;
    /// callers decide how to treat that.
    pub fn implicit_hydrogen_count(&self) -> Result<i64, FormulaError> {
        let valence = self
            .resolved_valence
            .ok_or_else(|| FormulaError::UnresolvedValence(self.id.clone()))?;
        Ok(valence as i64 - self.bond_order_sum as i64 + self.formal_charge as i64)
    }
}
