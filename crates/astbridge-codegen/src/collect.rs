//! Subclass collection for one generation pass.

use crate::normalize::NormalizedGraph;
use astbridge_core::{ClassId, DeclRef, UnitId};
use std::collections::HashSet;

/// The root class of a family followed by every class derived from it.
///
/// Members keep the order in which the traversal of the family's units first
/// visited them, and each class appears once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubclassSet {
    members: Vec<ClassId>,
    index: HashSet<ClassId>,
}

impl SubclassSet {
    /// Collect `root` and the generated, complete classes derived from it
    /// that are reachable from `units`.
    pub fn collect(graph: &NormalizedGraph, root: ClassId, units: &[UnitId]) -> Self {
        let mut set = Self {
            members: vec![root],
            index: HashSet::from([root]),
        };

        for decl in graph.traverse(units) {
            let DeclRef::Class(id) = decl else {
                continue;
            };
            let class = graph.class(id);
            if class.ignored || class.is_incomplete {
                continue;
            }
            if graph.is_derived_from(id, root) {
                set.insert(id);
            }
        }

        set
    }

    /// Build a set from explicit members; the first one is the root.
    pub fn from_members(members: impl IntoIterator<Item = ClassId>) -> Self {
        let mut set = Self {
            members: Vec::new(),
            index: HashSet::new(),
        };
        for id in members {
            set.insert(id);
        }
        set
    }

    fn insert(&mut self, id: ClassId) -> bool {
        if self.index.insert(id) {
            self.members.push(id);
            true
        } else {
            false
        }
    }

    /// Append the members of `other` not already present.
    pub fn extend(&mut self, other: &SubclassSet) {
        for id in other.iter() {
            self.insert(id);
        }
    }

    pub fn root(&self) -> Option<ClassId> {
        self.members.first().copied()
    }

    /// All members, root first.
    pub fn iter(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.members.iter().copied()
    }

    /// Members excluding the root.
    pub fn derived(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.members.iter().skip(1).copied()
    }

    /// Members that are not abstract.
    pub fn concrete<'a>(
        &'a self,
        graph: &'a NormalizedGraph,
    ) -> impl Iterator<Item = ClassId> + 'a {
        self.iter().filter(|id| !graph.class(*id).is_abstract)
    }

    pub fn contains(&self, id: ClassId) -> bool {
        self.index.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
