use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use idlink::store::{ContactStore, MemoryStore, StoreError};
use idlink::{Contact, ContactId, LinkPrecedence};

/// Fixed epoch all seeded timestamps are offset from, so age ordering in
/// fixtures is explicit rather than wall-clock dependent.
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// Seed a contact with a deterministic timestamp. A parent makes it
/// secondary; without one it is primary.
#[allow(dead_code)]
pub fn seed_contact(
    store: &mut MemoryStore,
    email: Option<&str>,
    phone: Option<&str>,
    parent: Option<ContactId>,
    offset_secs: i64,
) -> ContactId {
    let link_precedence = if parent.is_some() {
        LinkPrecedence::Secondary
    } else {
        LinkPrecedence::Primary
    };
    store.insert(Contact {
        id: ContactId(0),
        email: email.map(String::from),
        phone_number: phone.map(String::from),
        linked_id: parent,
        link_precedence,
        created_at: base_time() + Duration::seconds(offset_secs),
    })
}

/// A pool of identifier values for load-shaped tests. Pairs drawn from a
/// small pool collide often, which is exactly what exercises merging.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct IdentityPool {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

#[allow(dead_code)]
pub fn generate_identity_pool(count: usize, seed: u64) -> IdentityPool {
    let mut rng = StdRng::seed_from_u64(seed);
    let emails = (0..count)
        .map(|i| format!("person_{:04}_{:02}@example.com", i, rng.random_range(0..100)))
        .collect();
    let phones = (0..count)
        .map(|_| format!("555-{:04}", rng.random_range(1000..10_000)))
        .collect();
    IdentityPool { emails, phones }
}

impl IdentityPool {
    /// Draw a (email, phone) pair by independent indexes.
    #[allow(dead_code)]
    pub fn pair(&self, rng: &mut StdRng) -> (String, String) {
        let email = self.emails[rng.random_range(0..self.emails.len())].clone();
        let phone = self.phones[rng.random_range(0..self.phones.len())].clone();
        (email, phone)
    }
}

/// Store decorator that fails the next `failures` transactions with a
/// transient error before recovering. Exercises the gateway retry path.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct FlakyStore<S: ContactStore + Clone> {
    inner: S,
    failures_left: u32,
}

#[allow(dead_code)]
impl<S: ContactStore + Clone> FlakyStore<S> {
    pub fn failing(inner: S, failures: u32) -> Self {
        Self {
            inner,
            failures_left: failures,
        }
    }
}

impl<S: ContactStore + Clone> ContactStore for FlakyStore<S> {
    fn find_by_fields_or_ids(
        &self,
        email_eq: Option<&str>,
        phone_eq: Option<&str>,
        ids_in: Option<&[ContactId]>,
        linked_id_in: Option<&[ContactId]>,
    ) -> Result<Vec<Contact>, StoreError> {
        self.inner
            .find_by_fields_or_ids(email_eq, phone_eq, ids_in, linked_id_in)
    }

    fn create(
        &mut self,
        email: Option<&str>,
        phone_number: Option<&str>,
        linked_id: Option<ContactId>,
        link_precedence: LinkPrecedence,
    ) -> Result<Contact, StoreError> {
        self.inner
            .create(email, phone_number, linked_id, link_precedence)
    }

    fn demote_to_secondary(
        &mut self,
        id: ContactId,
        primary_id: ContactId,
    ) -> Result<(), StoreError> {
        self.inner.demote_to_secondary(id, primary_id)
    }

    fn get(&self, id: ContactId) -> Option<Contact> {
        self.inner.get(id)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn transaction<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        Self: Sized,
        E: From<StoreError>,
    {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(StoreError::Transient("injected transaction failure".to_string()).into());
        }
        let mut staged = self.clone();
        let out = f(&mut staged)?;
        *self = staged;
        Ok(out)
    }
}
