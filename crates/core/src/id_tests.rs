// SPDX-License-Identifier: MIT

use super::*;

crate::define_id! {
    pub struct TestId("tst-");
}

#[test]
fn new_id_has_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn from_string_round_trips_through_display() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.to_string(), "tst-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn ids_are_distinct() {
    let a = TestId::new();
    let b = TestId::new();
    assert_ne!(a, b);
}

#[test]
fn serde_round_trip() {
    let id = TestId::from_string("tst-xyz");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"tst-xyz\"");
    let back: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn empty_id_buf_is_empty() {
    let buf = IdBuf::empty();
    assert!(buf.is_empty());
    assert_eq!(buf.as_str(), "");
}
