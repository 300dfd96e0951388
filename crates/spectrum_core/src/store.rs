//! Active assignment arena with a cell → assignments spatial index.
//!
//! Every active assignment appears in the index entry of each cell its node
//! covers. `insert` and `remove` are exact inverses; `remove` is idempotent.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::assignment::{Assignment, AssignmentId};
use crate::topology::{CellId, NodeId, Topology};

/// Which assignments an admission or renewal check may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictScope {
    /// Every assignment in any cell of any node.
    Global,
    /// Only assignments owned by the node itself or one of its direct neighbors.
    Neighborhood,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    active: BTreeMap<AssignmentId, Assignment>,
    cell_index: HashMap<CellId, Vec<AssignmentId>>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, assignment: Assignment, topology: &Topology) {
        let id = assignment.id;
        debug_assert!(!self.active.contains_key(&id), "duplicate assignment id {id}");
        for cell in topology.cells(assignment.node) {
            self.cell_index.entry(*cell).or_default().push(id);
        }
        self.active.insert(id, assignment);
    }

    /// Removes the assignment and every index reference to it. Absent ids return `None`.
    pub fn remove(&mut self, id: AssignmentId, topology: &Topology) -> Option<Assignment> {
        let assignment = self.active.remove(&id)?;
        for cell in topology.cells(assignment.node) {
            if let Some(entries) = self.cell_index.get_mut(cell) {
                entries.retain(|entry| *entry != id);
                if entries.is_empty() {
                    self.cell_index.remove(cell);
                }
            }
        }
        debug_assert!(
            topology
                .cells(assignment.node)
                .iter()
                .all(|cell| !self.cell_entries(*cell).contains(&id)),
            "assignment {id} still indexed after removal"
        );
        Some(assignment)
    }

    pub fn get(&self, id: AssignmentId) -> Option<&Assignment> {
        self.active.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AssignmentId) -> Option<&mut Assignment> {
        self.active.get_mut(&id)
    }

    pub fn contains(&self, id: AssignmentId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active assignments in id (admission) order.
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.active.values()
    }

    pub fn cell_entries(&self, cell: CellId) -> &[AssignmentId] {
        self.cell_index.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// De-duplicated assignments whose node shares at least one cell with `node`.
    pub fn candidates_overlapping(&self, node: NodeId, topology: &Topology) -> Vec<AssignmentId> {
        let mut seen = HashSet::new();
        topology
            .cells(node)
            .iter()
            .flat_map(|cell| self.cell_entries(*cell).iter().copied())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// De-duplicated ids visible from `node` under `scope`, in discovery order.
    pub fn ids_in_scope(
        &self,
        scope: ConflictScope,
        node: NodeId,
        topology: &Topology,
    ) -> Vec<AssignmentId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        match scope {
            ConflictScope::Global => {
                for n in topology.nodes() {
                    for cell in &n.cells {
                        for id in self.cell_entries(*cell) {
                            if seen.insert(*id) {
                                out.push(*id);
                            }
                        }
                    }
                }
            }
            ConflictScope::Neighborhood => {
                let mut owners: Vec<NodeId> = topology.neighbors(node).to_vec();
                owners.push(node);
                owners.sort_unstable();
                owners.dedup();
                for owner in owners {
                    for cell in topology.cells(owner) {
                        for id in self.cell_entries(*cell) {
                            let owned = self.active.get(id).is_some_and(|a| a.node == owner);
                            if owned && seen.insert(*id) {
                                out.push(*id);
                            }
                        }
                    }
                }
            }
        }
        out
    }

    /// Full index check; used by tests and debug assertions.
    pub fn is_consistent(&self, topology: &Topology) -> bool {
        let indexed_everywhere = self.active.values().all(|a| {
            topology
                .cells(a.node)
                .iter()
                .all(|cell| self.cell_entries(*cell).iter().filter(|id| **id == a.id).count() == 1)
        });
        let no_stale_entries = self.cell_index.iter().all(|(cell, ids)| {
            ids.iter().all(|id| {
                self.active
                    .get(id)
                    .is_some_and(|a| topology.cells(a.node).contains(cell))
            })
        });
        indexed_everywhere && no_stale_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::{DeviceClass, FrequencyInterval};
    use crate::request::RequestId;
    use proptest::prelude::*;

    fn assignment(id: u64, node: usize) -> Assignment {
        Assignment {
            id: AssignmentId(id),
            request: RequestId(id as usize),
            node: NodeId(node),
            interval: FrequencyInterval::new(37_000, 37_040),
            class: DeviceClass::FiveG,
            quality: 1.0,
            tier: 0,
            next_check: None,
            expires_at: None,
        }
    }

    #[test]
    fn insert_indexes_every_covered_cell() {
        let topo = Topology::grid(3, 3).expect("grid");
        let mut store = AssignmentStore::new();
        store.insert(assignment(0, 5), &topo);
        for cell in topo.cells(NodeId(5)) {
            assert_eq!(store.cell_entries(*cell), &[AssignmentId(0)]);
        }
        assert!(store.is_consistent(&topo));
    }

    #[test]
    fn remove_is_idempotent() {
        let topo = Topology::grid(2, 2).expect("grid");
        let mut store = AssignmentStore::new();
        store.insert(assignment(0, 4), &topo);
        assert!(store.remove(AssignmentId(0), &topo).is_some());
        assert!(store.remove(AssignmentId(0), &topo).is_none());
        assert!(store.is_empty());
        assert!(store.is_consistent(&topo));
        for cell in topo.cells(NodeId(4)) {
            assert!(store.cell_entries(*cell).is_empty());
        }
    }

    #[test]
    fn neighborhood_scope_only_sees_owned_assignments() {
        // Nodes 0 and 2 share cell 1 but are not neighbors.
        let topo = Topology::custom(
            vec![
                crate::topology::Node::new(0, 0, 0, [0, 1]),
                crate::topology::Node::new(1, 0, 1, [1, 2]),
                crate::topology::Node::new(2, 0, 2, [1, 2]),
            ],
            vec![vec![NodeId(1)], vec![NodeId(0), NodeId(2)], vec![NodeId(1)]],
        )
        .expect("topology");
        let mut store = AssignmentStore::new();
        store.insert(assignment(0, 0), &topo);
        store.insert(assignment(1, 1), &topo);

        let local = store.ids_in_scope(ConflictScope::Neighborhood, NodeId(2), &topo);
        assert_eq!(local, vec![AssignmentId(1)]);

        let global = store.ids_in_scope(ConflictScope::Global, NodeId(2), &topo);
        assert_eq!(global, vec![AssignmentId(0), AssignmentId(1)]);
    }

    #[test]
    fn overlapping_candidates_are_deduplicated() {
        let topo = Topology::grid(2, 2).expect("grid");
        let mut store = AssignmentStore::new();
        // Center node 4 covers all four cells; its assignment must appear once.
        store.insert(assignment(0, 4), &topo);
        store.insert(assignment(1, 0), &topo);
        let ids = store.candidates_overlapping(NodeId(4), &topo);
        assert_eq!(ids, vec![AssignmentId(0), AssignmentId(1)]);
        assert_eq!(store.candidates_overlapping(NodeId(8), &topo), vec![AssignmentId(0)]);
    }

    proptest! {
        #[test]
        fn index_stays_consistent_under_random_churn(
            ops in prop::collection::vec((any::<bool>(), 0usize..16, 0u64..24), 1..80)
        ) {
            let topo = Topology::grid(3, 3).expect("grid");
            let mut store = AssignmentStore::new();
            for (insert, node, id) in ops {
                if insert {
                    if !store.contains(AssignmentId(id)) {
                        store.insert(assignment(id, node), &topo);
                    }
                } else {
                    let before = store.len();
                    let removed = store.remove(AssignmentId(id), &topo);
                    prop_assert_eq!(store.len(), before - usize::from(removed.is_some()));
                }
                prop_assert!(store.is_consistent(&topo));
            }
        }
    }
}
