//! # Data Model
//!
//! Core data structures for contact identity resolution: the `Contact` entity,
//! its link precedence, and the consolidated cluster view returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact identifier for contacts, assigned monotonically by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub u32);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Whether a contact is the canonical record of its cluster or a subordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPrecedence {
    Primary,
    Secondary,
}

impl fmt::Display for LinkPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkPrecedence::Primary => write!(f, "primary"),
            LinkPrecedence::Secondary => write!(f, "secondary"),
        }
    }
}

/// A contact record. Immutable after creation except for `link_precedence` and
/// `linked_id`, which flip exactly once when the record is demoted from
/// primary to secondary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier for this contact
    pub id: ContactId,
    /// Email address, if known
    pub email: Option<String>,
    /// Phone number, if known
    pub phone_number: Option<String>,
    /// Parent contact in the cluster; present iff this record is secondary
    pub linked_id: Option<ContactId>,
    /// Canonical or subordinate
    pub link_precedence: LinkPrecedence,
    /// Creation timestamp; the cluster's oldest member is its primary
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn is_primary(&self) -> bool {
        self.link_precedence == LinkPrecedence::Primary
    }

    /// Ordering key for primary selection: oldest wins, ties broken by
    /// ascending id.
    pub fn age_key(&self) -> (DateTime<Utc>, ContactId) {
        (self.created_at, self.id)
    }
}

/// Consolidated view of a cluster, returned by every resolution.
///
/// `emails` and `phone_numbers` list the designated primary's value first,
/// then every other distinct value in the order first encountered.
/// `secondary_contact_ids` lists every member except the primary, in fetch
/// order, with a freshly created record last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterView {
    pub primary_contact_id: ContactId,
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub secondary_contact_ids: Vec<ContactId>,
}

impl ClusterView {
    /// View of a cluster that consists of a single, just-created primary.
    pub fn for_single(contact: &Contact) -> Self {
        Self {
            primary_contact_id: contact.id,
            emails: contact.email.iter().cloned().collect(),
            phone_numbers: contact.phone_number.iter().cloned().collect(),
            secondary_contact_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn contact(id: u32, email: Option<&str>, phone: Option<&str>) -> Contact {
        Contact {
            id: ContactId(id),
            email: email.map(String::from),
            phone_number: phone.map(String::from),
            linked_id: None,
            link_precedence: LinkPrecedence::Primary,
            created_at: Utc.timestamp_opt(1_700_000_000 + id as i64, 0).unwrap(),
        }
    }

    #[test]
    fn test_age_key_orders_by_time_then_id() {
        let older = contact(1, Some("a@x.com"), None);
        let newer = contact(2, Some("b@x.com"), None);
        assert!(older.age_key() < newer.age_key());

        let mut tied = contact(3, None, Some("111"));
        tied.created_at = older.created_at;
        assert!(older.age_key() < tied.age_key());
    }

    #[test]
    fn test_single_contact_view() {
        let c = contact(7, Some("solo@x.com"), Some("999"));
        let view = ClusterView::for_single(&c);
        assert_eq!(view.primary_contact_id, ContactId(7));
        assert_eq!(view.emails, vec!["solo@x.com".to_string()]);
        assert_eq!(view.phone_numbers, vec!["999".to_string()]);
        assert!(view.secondary_contact_ids.is_empty());
    }

    #[test]
    fn test_cluster_view_wire_shape() {
        let view = ClusterView {
            primary_contact_id: ContactId(1),
            emails: vec!["a@x.com".to_string()],
            phone_numbers: vec!["111".to_string()],
            secondary_contact_ids: vec![ContactId(2), ContactId(3)],
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["primaryContactId"], 1);
        assert_eq!(json["secondaryContactIds"][1], 3);
    }

    #[test]
    fn test_precedence_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&LinkPrecedence::Primary).unwrap(),
            "\"primary\""
        );
        assert_eq!(
            serde_json::to_string(&LinkPrecedence::Secondary).unwrap(),
            "\"secondary\""
        );
    }
}
