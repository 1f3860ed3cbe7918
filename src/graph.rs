//! The molecular graph: atoms keyed by id, undirected bonds between them,
//! and the split into disconnected fragments.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, trace};
use petgraph::graph::{NodeIndex, UnGraph};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::error::FormulaError;
use crate::formula::{join, render, ElementCounts, FormulaOptions, HydrogenPolicy};
use crate::traits::ValenceLookup;

/// An atom as delivered by a document reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomRecord {
    pub id: String,
    pub element: String,
    /// Fixed valence; `None` means deduce it from the bonds.
    pub explicit_valence: Option<u32>,
    pub formal_charge: i32,
}

impl AtomRecord {
    pub fn new(id: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element: element.into(),
            explicit_valence: None,
            formal_charge: 0,
        }
    }

    pub fn with_valence(mut self, valence: u32) -> Self {
        self.explicit_valence = Some(valence);
        self
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.formal_charge = charge;
        self
    }
}

/// A bond as delivered by a document reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondRecord {
    pub id1: String,
    pub id2: String,
    pub order: u32,
}

impl BondRecord {
    pub fn new(id1: impl Into<String>, id2: impl Into<String>, order: u32) -> Self {
        Self {
            id1: id1.into(),
            id2: id2.into(),
            order,
        }
    }
}

/// One connected component of the graph, as atom ids in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    ids: Vec<String>,
}

impl Fragment {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }
}

/// Atoms and bonds of one structure description.
///
/// Built once (atoms first, then bonds), corrected once with
/// [`MolecularGraph::correct_valences`], then only read.
#[derive(Debug, Clone, Default)]
pub struct MolecularGraph {
    graph: UnGraph<Atom, Bond>,
    index: BTreeMap<String, NodeIndex>,
}

impl MolecularGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from reader records, atoms before bonds.
    pub fn from_records(atoms: &[AtomRecord], bonds: &[BondRecord]) -> Result<Self, FormulaError> {
        let mut graph = Self::new();
        for a in atoms {
            graph.add_atom(&a.id, &a.element, a.explicit_valence, a.formal_charge)?;
        }
        for b in bonds {
            graph.add_bond(&b.id1, &b.id2, b.order)?;
        }
        debug!(
            "built molecular graph with {} atoms and {} bonds",
            graph.atom_count(),
            graph.bond_count()
        );
        Ok(graph)
    }

    pub fn add_atom(
        &mut self,
        id: &str,
        element: &str,
        explicit_valence: Option<u32>,
        formal_charge: i32,
    ) -> Result<(), FormulaError> {
        if self.index.contains_key(id) {
            return Err(FormulaError::DuplicateAtom(id.to_string()));
        }
        let idx = self
            .graph
            .add_node(Atom::new(id, element, explicit_valence, formal_charge));
        self.index.insert(id.to_string(), idx);
        Ok(())
    }

    /// Connect two declared atoms and charge the bond order to both.
    pub fn add_bond(&mut self, id1: &str, id2: &str, order: u32) -> Result<(), FormulaError> {
        if order == 0 {
            return Err(FormulaError::InvalidBondOrder {
                id1: id1.to_string(),
                id2: id2.to_string(),
                order,
            });
        }
        let a = self.node(id1)?;
        let b = self.node(id2)?;
        self.graph.add_edge(a, b, Bond { order });
        self.graph[a].add_bond(order)?;
        self.graph[b].add_bond(order)?;
        Ok(())
    }

    /// Resolve the valence of every atom. Stops at the first failure.
    pub fn correct_valences<V: ValenceLookup + ?Sized>(
        &mut self,
        table: &V,
    ) -> Result<(), FormulaError> {
        for idx in self.index.values() {
            self.graph[*idx].correct_valence(table)?;
        }
        Ok(())
    }

    pub fn atom(&self, id: &str) -> Option<&Atom> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// All atoms in ascending id order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.index.values().map(move |&idx| &self.graph[idx])
    }

    /// Ids of the atoms bonded to `id`, one entry per bond.
    pub fn neighbors<'a>(&'a self, id: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = *self.index.get(id)?;
        Some(self.graph.neighbors(idx).map(move |n| self.graph[n].id()))
    }

    /// Total order of the bonds joining `id1` and `id2`.
    ///
    /// `None` when either atom is unknown or the two are not bonded.
    pub fn bond_order(&self, id1: &str, id2: &str) -> Option<u32> {
        let a = *self.index.get(id1)?;
        let b = *self.index.get(id2)?;
        self.graph
            .edges_connecting(a, b)
            .map(|edge| edge.weight().order)
            .reduce(|total, order| total.saturating_add(order))
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Split the graph into connected components.
    ///
    /// Components are discovered breadth-first, seeded in ascending id order,
    /// so the fragment holding the smallest id always comes first. Every atom
    /// lands in exactly one fragment.
    pub fn extract_fragments(&self) -> Vec<Fragment> {
        let mut visited = vec![false; self.graph.node_count()];
        let mut fragments = Vec::new();
        for &seed in self.index.values() {
            if visited[seed.index()] {
                continue;
            }
            visited[seed.index()] = true;
            let mut ids = Vec::new();
            let mut queue = VecDeque::from([seed]);
            while let Some(current) = queue.pop_front() {
                ids.push(self.graph[current].id().to_string());
                for neighbor in self.graph.neighbors(current) {
                    if !visited[neighbor.index()] {
                        visited[neighbor.index()] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
            fragments.push(Fragment { ids });
        }
        debug!("found {} fragments", fragments.len());
        fragments
    }

    /// Count the elements of a fragment, folding implicit hydrogens into `H`.
    pub fn aggregate(
        &self,
        fragment: &Fragment,
        options: &FormulaOptions,
    ) -> Result<ElementCounts, FormulaError> {
        let mut counts = ElementCounts::new();
        let mut hydrogens: u64 = 0;
        for id in fragment.ids() {
            let atom = &self.graph[self.node(id)?];
            counts.add(atom.element(), 1);
            let h = atom.implicit_hydrogen_count()?;
            if h < 0 {
                match options.hydrogens {
                    HydrogenPolicy::Reject => {
                        return Err(FormulaError::NegativeHydrogenCount {
                            id: id.clone(),
                            count: h,
                        })
                    }
                    HydrogenPolicy::Clamp => {
                        trace!("clamping {h} implicit hydrogens on atom '{id}' to 0");
                        continue;
                    }
                }
            }
            hydrogens += h as u64;
        }
        if hydrogens != 0 {
            counts.add("H", hydrogens);
        }
        Ok(counts)
    }

    /// Render every fragment and join them with `.`.
    ///
    /// Valences must already be resolved.
    pub fn formula(&self, options: &FormulaOptions) -> Result<String, FormulaError> {
        let parts = self
            .extract_fragments()
            .iter()
            .map(|fragment| {
                let counts = self.aggregate(fragment, options)?;
                let rendered = render(&counts);
                trace!("fragment of {} atoms: {rendered}", fragment.len());
                Ok(rendered)
            })
            .collect::<Result<Vec<_>, FormulaError>>()?;
        Ok(join(&parts))
    }

    fn node(&self, id: &str) -> Result<NodeIndex, FormulaError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| FormulaError::UnknownAtom(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valence::ValenceTable;

    fn graph(atoms: &[(&str, &str)], bonds: &[(&str, &str, u32)]) -> MolecularGraph {
        let atoms: Vec<_> = atoms.iter().map(|(id, el)| AtomRecord::new(*id, *el)).collect();
        let bonds: Vec<_> = bonds
            .iter()
            .map(|(a, b, o)| BondRecord::new(*a, *b, *o))
            .collect();
        MolecularGraph::from_records(&atoms, &bonds).unwrap()
    }

    fn sorted(fragment: &Fragment) -> Vec<&str> {
        let mut ids: Vec<&str> = fragment.ids().iter().map(String::as_str).collect();
        ids.sort();
        ids
    }

    #[test]
    fn duplicate_atom_rejected() {
        let mut g = MolecularGraph::new();
        g.add_atom("a1", "C", None, 0).unwrap();
        assert_eq!(
            g.add_atom("a1", "O", None, 0),
            Err(FormulaError::DuplicateAtom("a1".to_string()))
        );
        assert_eq!(g.atom_count(), 1);
    }

    #[test]
    fn bond_to_unknown_atom_rejected() {
        let mut g = MolecularGraph::new();
        g.add_atom("a1", "C", None, 0).unwrap();
        assert_eq!(
            g.add_bond("a1", "a9", 1),
            Err(FormulaError::UnknownAtom("a9".to_string()))
        );
        assert_eq!(g.bond_count(), 0);
        assert_eq!(g.atom("a1").unwrap().bond_order_sum(), 0);
    }

    #[test]
    fn zero_order_bond_rejected() {
        let mut g = MolecularGraph::new();
        g.add_atom("a1", "C", None, 0).unwrap();
        g.add_atom("a2", "C", None, 0).unwrap();
        assert!(matches!(
            g.add_bond("a1", "a2", 0),
            Err(FormulaError::InvalidBondOrder { order: 0, .. })
        ));
    }

    #[test]
    fn bonds_are_symmetric() {
        let g = graph(&[("a1", "C"), ("a2", "O")], &[("a1", "a2", 2)]);
        assert_eq!(g.neighbors("a1").unwrap().collect::<Vec<_>>(), vec!["a2"]);
        assert_eq!(g.neighbors("a2").unwrap().collect::<Vec<_>>(), vec!["a1"]);
        assert_eq!(g.atom("a1").unwrap().bond_order_sum(), 2);
        assert_eq!(g.atom("a2").unwrap().bond_order_sum(), 2);
        assert_eq!(g.bond_order("a1", "a2"), Some(2));
        assert_eq!(g.bond_order("a2", "a1"), Some(2));
        assert!(g.neighbors("zz").is_none());
    }

    #[test]
    fn bond_order_of_unbonded_pair() {
        let g = graph(&[("a1", "C"), ("a2", "O"), ("a3", "C")], &[("a1", "a2", 1)]);
        assert_eq!(g.bond_order("a1", "a3"), None);
        assert_eq!(g.bond_order("a1", "zz"), None);
    }

    #[test]
    fn overflowing_bond_orders_rejected() {
        let atoms = vec![
            AtomRecord::new("a1", "Fe"),
            AtomRecord::new("a2", "Fe"),
            AtomRecord::new("a3", "Fe"),
        ];
        let bonds = vec![
            BondRecord::new("a1", "a2", u32::MAX),
            BondRecord::new("a1", "a3", 1),
        ];
        let err = MolecularGraph::from_records(&atoms, &bonds).unwrap_err();
        assert_eq!(
            err,
            FormulaError::BondOrderOverflow {
                id: "a1".to_string(),
                order: 1,
            }
        );
    }

    #[test]
    fn overflowing_self_bond_rejected() {
        let mut g = MolecularGraph::new();
        g.add_atom("a1", "Fe", None, 0).unwrap();
        assert!(matches!(
            g.add_bond("a1", "a1", u32::MAX),
            Err(FormulaError::BondOrderOverflow { .. })
        ));
    }

    #[test]
    fn explicit_valence_violation_propagates() {
        let atoms = vec![
            AtomRecord::new("a1", "C"),
            AtomRecord::new("a2", "Cl").with_valence(1),
            AtomRecord::new("a3", "C"),
        ];
        let bonds = vec![BondRecord::new("a1", "a2", 1), BondRecord::new("a2", "a3", 1)];
        let err = MolecularGraph::from_records(&atoms, &bonds).unwrap_err();
        assert!(matches!(err, FormulaError::ValenceExceeded { ref id, .. } if id == "a2"));
    }

    #[test]
    fn atoms_iterate_by_id() {
        let g = graph(&[("b", "O"), ("c", "N"), ("a", "C")], &[]);
        let ids: Vec<&str> = g.atoms().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn fragments_of_isolated_atoms() {
        let g = graph(&[("a2", "Cl"), ("a1", "Na")], &[]);
        let frags = g.extract_fragments();
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[0].ids(), ["a1".to_string()]);
        assert_eq!(frags[1].ids(), ["a2".to_string()]);
    }

    #[test]
    fn fragments_follow_seed_order() {
        let g = graph(
            &[("a1", "C"), ("a2", "O"), ("a3", "N"), ("a4", "C"), ("a5", "S")],
            &[("a1", "a4", 1), ("a2", "a5", 1), ("a4", "a3", 1)],
        );
        let frags = g.extract_fragments();
        assert_eq!(frags.len(), 2);
        assert_eq!(sorted(&frags[0]), vec!["a1", "a3", "a4"]);
        assert_eq!(sorted(&frags[1]), vec!["a2", "a5"]);
        assert_eq!(frags[0].ids()[0], "a1");
        assert!(frags[1].contains("a5"));
    }

    #[test]
    fn parallel_bonds_do_not_duplicate_members() {
        let g = graph(&[("a1", "C"), ("a2", "C")], &[("a1", "a2", 1), ("a1", "a2", 1)]);
        let frags = g.extract_fragments();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].len(), 2);
        assert_eq!(g.atom("a1").unwrap().bond_order_sum(), 2);
        assert_eq!(g.bond_order("a1", "a2"), Some(2));
    }

    #[test]
    fn empty_graph_has_no_fragments() {
        let g = MolecularGraph::new();
        assert!(g.extract_fragments().is_empty());
        assert_eq!(g.formula(&FormulaOptions::default()), Ok(String::new()));
    }

    #[test]
    fn correct_valences_resolves_every_atom() {
        let mut g = graph(&[("a1", "C"), ("a2", "N"), ("a3", "Xe")], &[("a1", "a2", 3)]);
        g.correct_valences(&ValenceTable::standard()).unwrap();
        let resolved: Vec<_> = g.atoms().map(|a| a.resolved_valence()).collect();
        assert_eq!(resolved, vec![Some(4), Some(3), Some(0)]);
    }

    #[test]
    fn correct_valences_reports_overbonded_atom() {
        let mut g = graph(
            &[("a1", "O"), ("a2", "C"), ("a3", "C")],
            &[("a1", "a2", 3), ("a1", "a3", 2)],
        );
        assert_eq!(
            g.correct_valences(&ValenceTable::standard()),
            Err(FormulaError::NoValidValence {
                element: "O".to_string(),
                lower_bound: 5,
            })
        );
    }

    #[test]
    fn aggregate_folds_implicit_hydrogens() {
        let mut g = graph(&[("a1", "C"), ("a2", "O")], &[("a1", "a2", 1)]);
        g.correct_valences(&ValenceTable::standard()).unwrap();
        let frag = &g.extract_fragments()[0];
        let counts = g.aggregate(frag, &FormulaOptions::default()).unwrap();
        assert_eq!(counts.get("C"), 1);
        assert_eq!(counts.get("O"), 1);
        assert_eq!(counts.get("H"), 4);
    }

    #[test]
    fn aggregate_adds_to_explicit_hydrogen_atoms() {
        let mut g = graph(&[("a1", "C"), ("a2", "H")], &[("a1", "a2", 1)]);
        g.correct_valences(&ValenceTable::standard()).unwrap();
        let frag = &g.extract_fragments()[0];
        let counts = g.aggregate(frag, &FormulaOptions::default()).unwrap();
        // one explicit H atom plus three implicit on the carbon
        assert_eq!(counts.get("H"), 4);
    }

    #[test]
    fn aggregate_before_correction_fails() {
        let g = graph(&[("a1", "C")], &[]);
        let frag = &g.extract_fragments()[0];
        assert_eq!(
            g.aggregate(frag, &FormulaOptions::default()),
            Err(FormulaError::UnresolvedValence("a1".to_string()))
        );
    }

    #[test]
    fn negative_hydrogens_rejected_by_default() {
        let atoms = vec![AtomRecord::new("a1", "Na").with_charge(-2)];
        let mut g = MolecularGraph::from_records(&atoms, &[]).unwrap();
        g.correct_valences(&ValenceTable::standard()).unwrap();
        assert_eq!(
            g.formula(&FormulaOptions::default()),
            Err(FormulaError::NegativeHydrogenCount {
                id: "a1".to_string(),
                count: -1,
            })
        );
    }

    #[test]
    fn negative_hydrogens_clamped_on_request() {
        let atoms = vec![
            AtomRecord::new("a1", "Na").with_charge(-2),
            AtomRecord::new("a2", "O"),
        ];
        let bonds = vec![BondRecord::new("a1", "a2", 1)];
        let mut g = MolecularGraph::from_records(&atoms, &bonds).unwrap();
        g.correct_valences(&ValenceTable::standard()).unwrap();
        let options = FormulaOptions {
            hydrogens: HydrogenPolicy::Clamp,
        };
        // Na contributes nothing instead of -2, O keeps its one hydrogen
        assert_eq!(g.formula(&options), Ok("HNaO".to_string()));
    }

    #[test]
    fn formula_joins_fragments() {
        let mut g = graph(
            &[("a1", "C"), ("a2", "O"), ("a3", "O")],
            &[("a1", "a3", 2)],
        );
        g.correct_valences(&ValenceTable::standard()).unwrap();
        assert_eq!(g.formula(&FormulaOptions::default()), Ok("CH2O.H2O".to_string()));
    }
}
