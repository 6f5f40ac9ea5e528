//! In-memory hierarchy index over a flat snapshot of position records
//!
//! Children are derived by grouping records by `parent_id`; nothing here is
//! persisted. Every traversal carries a visited set, so a corrupted snapshot
//! (a parent cycle, or a parent that no longer exists) terminates and simply
//! leaves the affected records out of the forest.
//!
//! Traversals use explicit stacks and queues, so a long parent chain never
//! grows the thread stack.

use crate::models::{Position, PositionRecord, MAX_HIERARCHY_DEPTH};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Result of a read-only integrity sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Records whose `parent_id` names a missing record
    pub dangling: Vec<String>,
    /// Records that cannot be reached from any root
    pub unreachable: Vec<String>,
    /// No dangling or unreachable records
    pub healthy: bool,
}

/// Adjacency index built from one snapshot of all records
pub struct HierarchyIndex<'a> {
    records: &'a [PositionRecord],
    by_id: HashMap<&'a str, &'a PositionRecord>,
    children: HashMap<&'a str, Vec<&'a PositionRecord>>,
}

impl<'a> HierarchyIndex<'a> {
    /// Build the id map and the parent → children adjacency list
    ///
    /// Sibling order follows the order of `records`.
    pub fn build(records: &'a [PositionRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut children: HashMap<&'a str, Vec<&'a PositionRecord>> = HashMap::new();

        for record in records {
            by_id.insert(record.id.as_str(), record);
            if let Some(parent_id) = record.parent_id.as_deref() {
                children.entry(parent_id).or_default().push(record);
            }
        }

        Self {
            records,
            by_id,
            children,
        }
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&'a PositionRecord> {
        self.by_id.get(id).copied()
    }

    /// Name of the record's parent, if it has one and it exists
    pub fn parent_name(&self, record: &PositionRecord) -> Option<String> {
        record
            .parent_id
            .as_deref()
            .and_then(|parent_id| self.get(parent_id))
            .map(|parent| parent.name.clone())
    }

    /// Direct children of `id` in snapshot order
    pub fn children_of(&self, id: &str) -> &[&'a PositionRecord] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn roots(&self) -> impl Iterator<Item = &'a PositionRecord> + '_ {
        self.records.iter().filter(|record| record.is_root())
    }

    /// Nested trees rooted at every root, with `parent_name` resolved
    ///
    /// Each reachable record appears exactly once. Records deeper than
    /// `MAX_HIERARCHY_DEPTH` levels are left out, together with their subtrees.
    pub fn forest(&self) -> Vec<Position> {
        let order = self.preorder();

        // Children come after their parent in `order`, so walking it backwards
        // finishes every subtree before the position that owns it.
        let mut built: HashMap<&'a str, Position> = HashMap::with_capacity(order.len());
        for record in order.into_iter().rev() {
            let mut position = Position::with_parent_name(record.clone(), self.parent_name(record));
            position.children = self
                .children_of(&record.id)
                .iter()
                .filter_map(|child| built.remove(child.id.as_str()))
                .collect();
            built.insert(record.id.as_str(), position);
        }

        self.roots()
            .filter_map(|root| built.remove(root.id.as_str()))
            .collect()
    }

    /// Reachable records in depth-first preorder, depth-capped and visited-set guarded
    fn preorder(&self) -> Vec<&'a PositionRecord> {
        let mut visited: HashSet<&'a str> = HashSet::with_capacity(self.records.len());
        let mut order = Vec::with_capacity(self.records.len());

        let mut stack: Vec<(&'a PositionRecord, usize)> =
            self.roots().map(|root| (root, 1)).collect();
        stack.reverse();

        while let Some((record, depth)) = stack.pop() {
            if !visited.insert(record.id.as_str()) {
                continue;
            }
            order.push(record);
            if depth < MAX_HIERARCHY_DEPTH {
                stack.extend(
                    self.children_of(&record.id)
                        .iter()
                        .rev()
                        .map(|child| (*child, depth + 1)),
                );
            }
        }

        order
    }

    /// Number of levels in the subtree rooted at `id`, counting `id` itself
    ///
    /// 0 if `id` is not in the snapshot.
    pub fn height(&self, id: &str) -> usize {
        let Some(start) = self.get(id) else {
            return 0;
        };

        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(start.id.as_str());
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        queue.push_back((start.id.as_str(), 1));

        let mut height = 0;
        while let Some((current, level)) = queue.pop_front() {
            height = height.max(level);
            for child in self.children_of(current) {
                if visited.insert(child.id.as_str()) {
                    queue.push_back((child.id.as_str(), level + 1));
                }
            }
        }

        height
    }

    /// All transitive descendants of `id`, breadth-first, excluding `id`
    ///
    /// A parent always precedes its children in the returned order.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(id);

        let mut descendants = Vec::new();
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if visited.insert(child.id.as_str()) {
                    descendants.push(child.id.clone());
                    queue.push_back(child.id.as_str());
                }
            }
        }

        descendants
    }

    /// Sweep for dangling parents and records unreachable from any root
    pub fn integrity(&self) -> IntegrityReport {
        let mut reachable: HashSet<&'a str> = HashSet::with_capacity(self.records.len());
        let mut queue: VecDeque<&'a str> = self.roots().map(|root| root.id.as_str()).collect();
        reachable.extend(queue.iter().copied());

        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if reachable.insert(child.id.as_str()) {
                    queue.push_back(child.id.as_str());
                }
            }
        }

        let dangling: Vec<String> = self
            .records
            .iter()
            .filter(|record| {
                record
                    .parent_id
                    .as_deref()
                    .is_some_and(|parent_id| !self.by_id.contains_key(parent_id))
            })
            .map(|record| record.id.clone())
            .collect();

        let unreachable: Vec<String> = self
            .records
            .iter()
            .filter(|record| !reachable.contains(record.id.as_str()))
            .map(|record| record.id.clone())
            .collect();

        let healthy = dangling.is_empty() && unreachable.is_empty();
        IntegrityReport {
            dangling,
            unreachable,
            healthy,
        }
    }
}
