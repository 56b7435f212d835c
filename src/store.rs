//! # Contact Store
//!
//! Storage for contact records: lookup by field equality or id membership,
//! insertion with monotonic id assignment, demotion updates, and transactional
//! scoping spanning one full resolve invocation.

use crate::model::{Contact, ContactId, LinkPrecedence};
use chrono::Utc;
use hashbrown::{HashMap, HashSet};
use thiserror::Error;

/// Errors surfaced by a contact store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transaction conflict, connection loss, or rollback. The store
    /// guarantees no partial writes survive; callers may retry.
    #[error("transient store failure: {0}")]
    Transient(String),
    /// An update addressed a contact that does not exist.
    #[error("unknown contact {0}")]
    UnknownContact(ContactId),
}

/// Minimal store contract required by the resolver.
///
/// All multi-row reads return contacts ordered by `(created_at, id)`
/// ascending, so the first element of a cluster fetch is its oldest member.
pub trait ContactStore {
    /// Find contacts matching any of the present clauses, OR-combined:
    /// email equality, phone equality, id membership, parent-id membership.
    /// Absent clauses are omitted entirely; in particular an absent
    /// `email_eq`/`phone_eq` never matches stored records whose field is
    /// also absent.
    fn find_by_fields_or_ids(
        &self,
        email_eq: Option<&str>,
        phone_eq: Option<&str>,
        ids_in: Option<&[ContactId]>,
        linked_id_in: Option<&[ContactId]>,
    ) -> Result<Vec<Contact>, StoreError>;

    /// Insert a new contact, assigning its id and creation timestamp.
    fn create(
        &mut self,
        email: Option<&str>,
        phone_number: Option<&str>,
        linked_id: Option<ContactId>,
        link_precedence: LinkPrecedence,
    ) -> Result<Contact, StoreError>;

    /// Flip a contact to secondary and point it at the given primary.
    /// The only mutation the resolver ever issues.
    fn demote_to_secondary(
        &mut self,
        id: ContactId,
        primary_id: ContactId,
    ) -> Result<(), StoreError>;

    /// Get a contact by id.
    fn get(&self, id: ContactId) -> Option<Contact>;

    /// Number of stored contacts.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with all-or-nothing effect: every write inside `f` commits
    /// together, or none survive when `f` fails.
    fn transaction<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        Self: Sized,
        E: From<StoreError>;
}

/// In-memory contact store.
///
/// Transactions stage their writes on a snapshot and commit by swapping it
/// in, which makes the resolver's read-then-write sequence atomic as long as
/// the caller holds exclusive access for its duration.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    contacts: HashMap<ContactId, Contact>,
    next_contact_id: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            contacts: HashMap::new(),
            next_contact_id: 1,
        }
    }

    /// Insert a pre-built contact, keeping its timestamp. Assigns an id when
    /// the record carries the zero id; otherwise keeps the given id and bumps
    /// the id counter past it. Used for restores and test seeding.
    pub fn insert(&mut self, mut contact: Contact) -> ContactId {
        if contact.id.0 == 0 {
            contact.id = ContactId(self.next_contact_id);
            self.next_contact_id += 1;
        } else {
            self.next_contact_id = self.next_contact_id.max(contact.id.0 + 1);
        }
        let id = contact.id;
        self.contacts.insert(id, contact);
        id
    }

    /// All contacts ordered by `(created_at, id)` ascending.
    pub fn all_contacts(&self) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = self.contacts.values().cloned().collect();
        contacts.sort_by_key(|c| c.age_key());
        contacts
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactStore for MemoryStore {
    fn find_by_fields_or_ids(
        &self,
        email_eq: Option<&str>,
        phone_eq: Option<&str>,
        ids_in: Option<&[ContactId]>,
        linked_id_in: Option<&[ContactId]>,
    ) -> Result<Vec<Contact>, StoreError> {
        let id_set: Option<HashSet<ContactId>> =
            ids_in.map(|ids| ids.iter().copied().collect());
        let parent_set: Option<HashSet<ContactId>> =
            linked_id_in.map(|ids| ids.iter().copied().collect());

        let mut matches: Vec<Contact> = self
            .contacts
            .values()
            .filter(|c| {
                let by_email = email_eq.is_some_and(|e| c.email.as_deref() == Some(e));
                let by_phone = phone_eq.is_some_and(|p| c.phone_number.as_deref() == Some(p));
                let by_id = id_set.as_ref().is_some_and(|ids| ids.contains(&c.id));
                let by_parent = parent_set
                    .as_ref()
                    .is_some_and(|ids| c.linked_id.is_some_and(|p| ids.contains(&p)));
                by_email || by_phone || by_id || by_parent
            })
            .cloned()
            .collect();
        matches.sort_by_key(|c| c.age_key());
        Ok(matches)
    }

    fn create(
        &mut self,
        email: Option<&str>,
        phone_number: Option<&str>,
        linked_id: Option<ContactId>,
        link_precedence: LinkPrecedence,
    ) -> Result<Contact, StoreError> {
        let contact = Contact {
            id: ContactId(self.next_contact_id),
            email: email.map(String::from),
            phone_number: phone_number.map(String::from),
            linked_id,
            link_precedence,
            created_at: Utc::now(),
        };
        self.next_contact_id += 1;
        self.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    fn demote_to_secondary(
        &mut self,
        id: ContactId,
        primary_id: ContactId,
    ) -> Result<(), StoreError> {
        let contact = self
            .contacts
            .get_mut(&id)
            .ok_or(StoreError::UnknownContact(id))?;
        contact.link_precedence = LinkPrecedence::Secondary;
        contact.linked_id = Some(primary_id);
        Ok(())
    }

    fn get(&self, id: ContactId) -> Option<Contact> {
        self.contacts.get(&id).cloned()
    }

    fn len(&self) -> usize {
        self.contacts.len()
    }

    fn transaction<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut staged = self.clone();
        let out = f(&mut staged)?;
        *self = staged;
        Ok(out)
    }
}
