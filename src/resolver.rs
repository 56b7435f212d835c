//! # Identity Resolver
//!
//! The cluster-resolution core: given a partial identifier, find every
//! transitively connected contact, merge previously split clusters under the
//! oldest member, record genuinely new information as a secondary contact,
//! and assemble the consolidated cluster view.

use crate::dsu::AgeDsu;
use crate::linker;
use crate::model::{ClusterView, Contact, ContactId, LinkPrecedence};
use crate::store::{ContactStore, StoreError};
use thiserror::Error;

/// Errors produced by a resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Both identifiers absent or empty. Never touches the store.
    #[error("at least one of email or phoneNumber is required")]
    InvalidInput,
    /// Propagated store failure; the transaction rolled back, nothing was
    /// written, and the caller may retry.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Closure expansion of a non-empty direct match produced no members.
    /// Unreachable over an internally consistent store.
    #[error("closure expansion produced an empty cluster")]
    EmptyCluster,
}

impl ResolveError {
    /// Whether retrying the resolution can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveError::Store(StoreError::Transient(_)))
    }
}

/// Run one resolution against a store view that is already transactional:
/// the caller owns exclusivity and rollback (see `ContactStore::transaction`).
///
/// At least one identifier must be present; the public facade guards this.
pub fn resolve_in_store<S: ContactStore>(
    store: &mut S,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<ClusterView, ResolveError> {
    debug_assert!(email.is_some() || phone.is_some());

    // Step 1: direct match on the submitted identifiers.
    let matches = store.find_by_fields_or_ids(email, phone, None, None)?;

    // Step 2: nothing known, start a fresh cluster.
    if matches.is_empty() {
        let created = store.create(email, phone, None, LinkPrecedence::Primary)?;
        return Ok(ClusterView::for_single(&created));
    }

    // Steps 3-4: expand to the full connected component and fetch it
    // oldest-first.
    let ids = linker::expand_closure(&*store, matches.iter().map(|c| c.id))?;
    let mut cluster = linker::materialize_cluster(&*store, &ids)?;
    if cluster.is_empty() {
        tracing::error!("closure expansion produced an empty cluster from a non-empty match");
        return Err(ResolveError::EmptyCluster);
    }

    // Union by age across the component; the surviving root is the
    // designated primary.
    let mut dsu = AgeDsu::new();
    for member in &cluster {
        dsu.add(member.id, member.created_at);
    }
    let first = cluster[0].id;
    for member in &cluster[1..] {
        dsu.union(first, member.id);
    }
    let primary_id = dsu.find(first);

    // Step 5: does the submission carry information the cluster lacks?
    let email_is_new =
        email.is_some_and(|e| !cluster.iter().any(|c| c.email.as_deref() == Some(e)));
    let phone_is_new =
        phone.is_some_and(|p| !cluster.iter().any(|c| c.phone_number.as_deref() == Some(p)));

    // Step 6: demote any other primary and normalize stale parent pointers.
    for member in cluster.iter_mut() {
        if member.id == primary_id {
            continue;
        }
        if member.is_primary() || member.linked_id != Some(primary_id) {
            store.demote_to_secondary(member.id, primary_id)?;
            member.link_precedence = LinkPrecedence::Secondary;
            member.linked_id = Some(primary_id);
        }
    }

    // Step 7: one new secondary captures both novel fields at once.
    if email_is_new || phone_is_new {
        let created = store.create(email, phone, Some(primary_id), LinkPrecedence::Secondary)?;
        cluster.push(created);
    }

    // Step 8: consolidated summary.
    Ok(assemble_view(primary_id, &cluster))
}

/// Build the cluster view: primary identifiers first, remaining distinct
/// values in first-encountered order, secondary ids in fetch order.
fn assemble_view(primary_id: ContactId, cluster: &[Contact]) -> ClusterView {
    let mut emails: Vec<String> = Vec::new();
    let mut phone_numbers: Vec<String> = Vec::new();
    let mut secondary_contact_ids: Vec<ContactId> = Vec::new();

    if let Some(primary) = cluster.iter().find(|c| c.id == primary_id) {
        emails.extend(primary.email.iter().cloned());
        phone_numbers.extend(primary.phone_number.iter().cloned());
    }

    for member in cluster {
        if let Some(email) = &member.email {
            if !emails.contains(email) {
                emails.push(email.clone());
            }
        }
        if let Some(phone) = &member.phone_number {
            if !phone_numbers.contains(phone) {
                phone_numbers.push(phone.clone());
            }
        }
        if member.id != primary_id {
            secondary_contact_ids.push(member.id);
        }
    }

    ClusterView {
        primary_contact_id: primary_id,
        emails,
        phone_numbers,
        secondary_contact_ids,
    }
}
