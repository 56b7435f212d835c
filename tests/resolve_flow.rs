#[path = "../src/test_support.rs"]
mod test_support;

use idlink::{ContactId, IdentityResolver, LinkPrecedence, MemoryStore, ResolveError};
use test_support::seed_contact;

#[test]
fn new_user_creates_primary() {
    let resolver = IdentityResolver::new();
    let view = resolver
        .resolve(Some("lorraine@hillvalley.edu"), Some("123456"))
        .unwrap();

    assert_eq!(view.emails, vec!["lorraine@hillvalley.edu".to_string()]);
    assert_eq!(view.phone_numbers, vec!["123456".to_string()]);
    assert!(view.secondary_contact_ids.is_empty());
    assert_eq!(resolver.contact_count(), 1);

    let primary = resolver.get_contact(view.primary_contact_id).unwrap();
    assert!(primary.is_primary());
    assert!(primary.linked_id.is_none());
}

#[test]
fn repeat_submission_is_idempotent() {
    let resolver = IdentityResolver::new();
    let first = resolver
        .resolve(Some("mcfly@hillvalley.edu"), Some("123456"))
        .unwrap();
    let second = resolver
        .resolve(Some("mcfly@hillvalley.edu"), Some("123456"))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(resolver.contact_count(), 1);
}

#[test]
fn new_email_with_known_phone_grows_a_secondary() {
    let resolver = IdentityResolver::new();
    let first = resolver
        .resolve(Some("doc@brown.com"), Some("987654"))
        .unwrap();
    let second = resolver
        .resolve(Some("emmett@brown.com"), Some("987654"))
        .unwrap();

    assert_eq!(second.primary_contact_id, first.primary_contact_id);
    assert_eq!(
        second.emails,
        vec!["doc@brown.com".to_string(), "emmett@brown.com".to_string()]
    );
    assert_eq!(second.phone_numbers, vec!["987654".to_string()]);
    assert_eq!(second.secondary_contact_ids.len(), 1);
    assert_eq!(resolver.contact_count(), 2);
}

#[test]
fn new_phone_with_known_email_grows_a_secondary() {
    let resolver = IdentityResolver::new();
    let first = resolver
        .resolve(Some("biff@tannen.com"), Some("111111"))
        .unwrap();
    let second = resolver
        .resolve(Some("biff@tannen.com"), Some("222222"))
        .unwrap();

    assert_eq!(second.primary_contact_id, first.primary_contact_id);
    assert_eq!(
        second.phone_numbers,
        vec!["111111".to_string(), "222222".to_string()]
    );
    assert_eq!(second.emails, vec!["biff@tannen.com".to_string()]);
    assert_eq!(second.secondary_contact_ids.len(), 1);
    assert_eq!(resolver.contact_count(), 2);
}

#[test]
fn merging_two_primaries_keeps_the_oldest() {
    let resolver = IdentityResolver::new();
    let older = resolver
        .resolve(Some("george@hillvalley.edu"), Some("888888"))
        .unwrap();
    let newer = resolver
        .resolve(Some("g.mcfly@hillvalley.edu"), Some("999999"))
        .unwrap();

    // One field from each cluster links them; nothing novel, no new record.
    let merged = resolver
        .resolve(Some("g.mcfly@hillvalley.edu"), Some("888888"))
        .unwrap();

    assert_eq!(resolver.contact_count(), 2);
    assert_eq!(merged.primary_contact_id, older.primary_contact_id);
    assert_eq!(merged.emails.len(), 2);
    assert_eq!(merged.phone_numbers.len(), 2);
    assert_eq!(merged.secondary_contact_ids, vec![newer.primary_contact_id]);

    let demoted = resolver.get_contact(newer.primary_contact_id).unwrap();
    assert_eq!(demoted.link_precedence, LinkPrecedence::Secondary);
    assert_eq!(demoted.linked_id, Some(older.primary_contact_id));
}

#[test]
fn closure_reaches_the_whole_chain_from_its_tail() {
    let resolver = IdentityResolver::new();
    // A and B share a phone, B and C share an email: A-B-C is one component
    // even though A and C share nothing directly.
    resolver.resolve(Some("a@chain.com"), Some("111")).unwrap();
    resolver.resolve(Some("b@chain.com"), Some("111")).unwrap();
    resolver.resolve(Some("b@chain.com"), Some("222")).unwrap();

    let view = resolver.resolve(None, Some("222")).unwrap();
    assert_eq!(resolver.contact_count(), 3);
    assert_eq!(view.primary_contact_id, ContactId(1));
    assert_eq!(
        view.emails,
        vec!["a@chain.com".to_string(), "b@chain.com".to_string()]
    );
    assert_eq!(
        view.phone_numbers,
        vec!["111".to_string(), "222".to_string()]
    );
    assert_eq!(view.secondary_contact_ids, vec![ContactId(2), ContactId(3)]);
}

#[test]
fn null_email_restricts_matching_to_phone() {
    let resolver = IdentityResolver::new();
    resolver
        .resolve(Some("nulltest@example.com"), Some("000000"))
        .unwrap();

    let view = resolver.resolve(None, Some("000000")).unwrap();
    assert_eq!(view.emails, vec!["nulltest@example.com".to_string()]);
    assert_eq!(view.phone_numbers, vec!["000000".to_string()]);
    assert!(view.secondary_contact_ids.is_empty());
    assert_eq!(resolver.contact_count(), 1);
}

#[test]
fn null_phone_restricts_matching_to_email() {
    let resolver = IdentityResolver::new();
    resolver
        .resolve(Some("onlyemail@example.com"), Some("555555"))
        .unwrap();

    let view = resolver.resolve(Some("onlyemail@example.com"), None).unwrap();
    assert_eq!(view.emails, vec!["onlyemail@example.com".to_string()]);
    assert_eq!(view.phone_numbers, vec!["555555".to_string()]);
    assert_eq!(resolver.contact_count(), 1);
}

#[test]
fn absent_field_never_matches_a_stored_null() {
    let mut store = MemoryStore::new();
    // Phone-only record: a later email-only submission must not connect to
    // it through their both-null email fields.
    seed_contact(&mut store, None, Some("777"), None, 0);
    let resolver = IdentityResolver::with_store(store);

    let view = resolver.resolve(Some("fresh@example.com"), None).unwrap();
    assert_eq!(resolver.contact_count(), 2);
    assert!(view.secondary_contact_ids.is_empty());
    assert_eq!(view.emails, vec!["fresh@example.com".to_string()]);
    assert!(view.phone_numbers.is_empty());
}

#[test]
fn rejects_requests_without_any_identifier() {
    let resolver = IdentityResolver::new();
    assert!(matches!(
        resolver.resolve(None, None),
        Err(ResolveError::InvalidInput)
    ));
    // Empty strings count as absent.
    assert!(matches!(
        resolver.resolve(Some(""), Some("")),
        Err(ResolveError::InvalidInput)
    ));
    assert_eq!(resolver.contact_count(), 0);
}
