//! # Idlink
//!
//! A contact identity resolution engine.
//!
//! Contact records (email, phone number) submitted over time are consolidated
//! into clusters with one canonical primary record per cluster. Resolving a
//! partial identifier finds every transitively connected record, merges
//! clusters the submission proves connected, records genuinely new
//! information as a secondary contact, and returns the consolidated view.

pub mod config;
pub mod dsu;
pub mod http_server;
pub mod linker;
pub mod model;
pub mod resolver;
pub mod store;

// Re-export main types for convenience
pub use config::{RetryTuning, ServerConfig};
pub use model::{ClusterView, Contact, ContactId, LinkPrecedence};
pub use resolver::ResolveError;
pub use store::{ContactStore, MemoryStore, StoreError};

use parking_lot::Mutex;

/// Main API for identity resolution.
///
/// Owns the contact store behind a lock held across each full resolution, so
/// concurrent calls that touch overlapping clusters serialize and the
/// read-compute-write sequence of every call appears atomic to every other.
pub struct IdentityResolver<S: ContactStore = MemoryStore> {
    store: Mutex<S>,
}

impl IdentityResolver<MemoryStore> {
    /// Create a resolver over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for IdentityResolver<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ContactStore> IdentityResolver<S> {
    /// Create a resolver over a custom store implementation.
    pub fn with_store(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Resolve a partial identifier into its consolidated cluster view,
    /// atomically updating the persisted record graph as a side effect.
    ///
    /// Empty strings count as absent; at least one identifier is required.
    pub fn resolve(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<ClusterView, ResolveError> {
        let email = present(email);
        let phone = present(phone);
        if email.is_none() && phone.is_none() {
            return Err(ResolveError::InvalidInput);
        }

        let mut store = self.store.lock();
        store.transaction(|tx| resolver::resolve_in_store(tx, email, phone))
    }

    /// Number of contacts in the underlying store.
    pub fn contact_count(&self) -> usize {
        self.store.lock().len()
    }

    /// Get a contact by id from the underlying store.
    pub fn get_contact(&self, id: ContactId) -> Option<Contact> {
        self.store.lock().get(id)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
