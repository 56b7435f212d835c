#[path = "../src/test_support.rs"]
mod test_support;

use idlink::IdentityResolver;
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_support::generate_identity_pool;

#[test]
fn repeated_merge_request_changes_nothing() {
    let resolver = IdentityResolver::new();
    resolver
        .resolve(Some("cluster@test.com"), Some("333333"))
        .unwrap();
    resolver
        .resolve(Some("cluster-new@test.com"), Some("444444"))
        .unwrap();

    let merge_one = resolver
        .resolve(Some("cluster-new@test.com"), Some("333333"))
        .unwrap();
    let merge_two = resolver
        .resolve(Some("cluster-new@test.com"), Some("333333"))
        .unwrap();

    assert_eq!(merge_one, merge_two);
    assert_eq!(merge_one.secondary_contact_ids.len(), 1);
    assert_eq!(resolver.contact_count(), 2);
}

#[test]
fn replaying_a_workload_creates_no_extra_records() {
    let resolver = IdentityResolver::new();
    let pool = generate_identity_pool(40, 11);
    let mut rng = StdRng::seed_from_u64(23);

    let pairs: Vec<(String, String)> = (0..200).map(|_| pool.pair(&mut rng)).collect();

    for (email, phone) in &pairs {
        resolver.resolve(Some(email), Some(phone)).unwrap();
    }
    let count_after_first = resolver.contact_count();

    let mut replays = Vec::with_capacity(pairs.len());
    for (email, phone) in &pairs {
        replays.push(resolver.resolve(Some(email), Some(phone)).unwrap());
    }

    // Every pair is already fully known, so the replay is pure read.
    assert_eq!(resolver.contact_count(), count_after_first);
    for view in replays {
        let primary = resolver.get_contact(view.primary_contact_id).unwrap();
        assert!(primary.is_primary());
    }
}
