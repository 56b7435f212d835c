//! # Disjoint Set Union with Age-Ordered Roots
//!
//! Union-Find over contact ids where the representative of every component is
//! its oldest member. Used during a single resolution to pick the designated
//! primary; the outcome is reconciled back into persisted `linked_id` /
//! `link_precedence` before the transaction commits.

use crate::model::ContactId;
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

/// Ordering key: creation time, ties broken by ascending id.
type AgeKey = (DateTime<Utc>, ContactId);

/// Union-Find where union keeps the older root ("union by age").
#[derive(Debug, Clone, Default)]
pub struct AgeDsu {
    parent: FxHashMap<ContactId, ContactId>,
    age: FxHashMap<ContactId, AgeKey>,
    component_count: usize,
}

impl AgeDsu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contact as its own singleton component. Re-adding an
    /// already-known contact is a no-op.
    pub fn add(&mut self, id: ContactId, created_at: DateTime<Utc>) {
        if self.parent.contains_key(&id) {
            return;
        }
        self.parent.insert(id, id);
        self.age.insert(id, (created_at, id));
        self.component_count += 1;
    }

    pub fn contains(&self, id: ContactId) -> bool {
        self.parent.contains_key(&id)
    }

    /// Find the root of a contact, compressing the walked path by halving.
    /// Unknown contacts are treated as self-roots.
    pub fn find(&mut self, id: ContactId) -> ContactId {
        let Some(&initial_parent) = self.parent.get(&id) else {
            return id;
        };
        if initial_parent == id {
            return id;
        }

        let mut current = id;
        let mut parent = initial_parent;
        loop {
            let grandparent = self.parent.get(&parent).copied().unwrap_or(parent);
            if grandparent == parent {
                break;
            }
            // Point current past its parent, halving the path as we walk.
            self.parent.insert(current, grandparent);
            current = grandparent;
            parent = self.parent.get(&current).copied().unwrap_or(current);
            if parent == current {
                break;
            }
        }
        parent
    }

    /// Merge the components of `a` and `b`; the older root wins and becomes
    /// the representative of the merged component. Returns the merged root.
    pub fn union(&mut self, a: ContactId, b: ContactId) -> ContactId {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return root_a;
        }

        let age_a = self.age.get(&root_a).copied().unwrap_or_else(|| {
            (DateTime::<Utc>::MAX_UTC, root_a)
        });
        let age_b = self.age.get(&root_b).copied().unwrap_or_else(|| {
            (DateTime::<Utc>::MAX_UTC, root_b)
        });

        let (winner, loser) = if age_a <= age_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent.insert(loser, winner);
        self.component_count -= 1;
        winner
    }

    /// Number of disjoint components currently tracked.
    pub fn component_count(&self) -> usize {
        self.component_count
    }
}
