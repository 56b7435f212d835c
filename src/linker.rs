//! # Cluster Linker
//!
//! Discovers the full connected component around a set of directly matched
//! contacts. The component is computed as an iterative fixed point over store
//! queries rather than a recursive traversal, so store round-trips stay
//! bounded by the link depth and pathological chains cannot overflow the
//! stack.

use crate::model::{Contact, ContactId};
use crate::store::{ContactStore, StoreError};
use std::collections::BTreeSet;

/// Expand a seed id set to the full connected component.
///
/// Each pass fetches every contact whose id or parent id is already in the
/// set and folds the fetched ids and parent ids back in, until the set stops
/// growing. Connectivity through shared email/phone is already captured by
/// the seed (the direct-match query); this step chases primary/secondary
/// links in both directions, which is what stitches together two previously
/// independent clusters joined by the submitted identifier pair.
pub fn expand_closure<S: ContactStore>(
    store: &S,
    seeds: impl IntoIterator<Item = ContactId>,
) -> Result<Vec<ContactId>, StoreError> {
    let mut ids: BTreeSet<ContactId> = seeds.into_iter().collect();

    loop {
        let before = ids.len();
        let batch: Vec<ContactId> = ids.iter().copied().collect();
        let related = store.find_by_fields_or_ids(None, None, Some(&batch), Some(&batch))?;
        for contact in related {
            ids.insert(contact.id);
            if let Some(parent) = contact.linked_id {
                ids.insert(parent);
            }
        }
        if ids.len() == before {
            break;
        }
    }

    Ok(ids.into_iter().collect())
}

/// Fetch every member of the component, ordered oldest-first. The first
/// element is the designated primary for the resolution.
pub fn materialize_cluster<S: ContactStore>(
    store: &S,
    ids: &[ContactId],
) -> Result<Vec<Contact>, StoreError> {
    store.find_by_fields_or_ids(None, None, Some(ids), None)
}
