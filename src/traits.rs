use crate::error::FormulaError;

/// Reference valences for elements.
///
/// Implementors answer "smallest valid valence that is at least `lower_bound`".
/// Elements the implementor knows nothing about accept any bond count, so
/// `lower_bound` itself comes back.
pub trait ValenceLookup {
    fn ceil_valence(&self, element: &str, lower_bound: u32) -> Result<u32, FormulaError>;
}

impl<T: ValenceLookup + ?Sized> ValenceLookup for &T {
    fn ceil_valence(&self, element: &str, lower_bound: u32) -> Result<u32, FormulaError> {
        (**self).ceil_valence(element, lower_bound)
    }
}
