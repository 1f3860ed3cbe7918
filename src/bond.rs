/// Edge weight of the molecular graph.
///
/// Only the order matters for hydrogen accounting: a double bond consumes two
/// units of valence on each end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub order: u32,
}
