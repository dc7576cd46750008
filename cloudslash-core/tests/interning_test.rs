//! Intern pool invariants, including the property-based identity checks.

use cloudslash_core::types::interning::{self, InternedId, Interner};
use proptest::prelude::*;

#[test]
fn global_pool_is_shared_and_stable() {
    let a = interning::intern("arn:aws:ec2:us-east-1:123:instance/i-abc");
    let b = interning::intern("arn:aws:ec2:us-east-1:123:instance/i-abc");
    assert_eq!(a, b);
    assert_eq!(
        interning::resolve(a),
        "arn:aws:ec2:us-east-1:123:instance/i-abc"
    );
}

#[test]
fn sentinel_is_zero_and_invalid() {
    assert_eq!(interning::intern(""), InternedId::INVALID);
    assert_eq!(InternedId::INVALID.as_u32(), 0);
    assert!(!InternedId::INVALID.is_valid());
    assert_eq!(interning::resolve(InternedId::INVALID), "");
}

#[test]
fn serde_round_trips_through_strings() {
    let id = interning::intern("AWS::EC2::Volume");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"AWS::EC2::Volume\"");
    let back: InternedId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

proptest! {
    // Deterministic identity: resolve(intern(s)) == s and repeated interns
    // agree, for arbitrary non-empty strings.
    #[test]
    fn intern_resolve_round_trip(s in ".{1,64}") {
        let pool = Interner::new();
        let first = pool.intern(&s);
        let second = pool.intern(&s);
        prop_assert_eq!(first, second);
        prop_assert!(first.is_valid());
        prop_assert_eq!(pool.resolve(first), s.as_str());
    }

    #[test]
    fn distinct_strings_get_distinct_ids(a in "[a-z]{1,16}", b in "[A-Z]{1,16}") {
        let pool = Interner::new();
        let ia = pool.intern(&a);
        let ib = pool.intern(&b);
        prop_assert_ne!(ia, ib);
    }
}
