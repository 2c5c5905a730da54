// SPDX-License-Identifier: MIT

use super::*;

#[tokio::test]
async fn resolve_delivers_the_value_to_the_matching_waiter() {
    let correlator: Correlator<u32> = Correlator::new();
    let rx = correlator.wait_for("req-1");
    assert!(correlator.resolve("req-1", 42));
    assert_eq!(rx.await.unwrap(), 42);
}

#[test]
fn resolve_on_unknown_id_returns_false() {
    let correlator: Correlator<u32> = Correlator::new();
    assert!(!correlator.resolve("missing", 1));
}

#[test]
fn clear_drops_every_outstanding_waiter() {
    let correlator: Correlator<u32> = Correlator::new();
    let _rx1 = correlator.wait_for("a");
    let _rx2 = correlator.wait_for("b");
    assert_eq!(correlator.outstanding_count(), 2);
    correlator.clear();
    assert_eq!(correlator.outstanding_count(), 0);
}
