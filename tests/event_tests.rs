//! Change notification tests
//!
//! Tests verify:
//! - Exact payloads for stored/updated/deleted events
//! - Commit ordering
//! - No events from rejected writes
//! - Fan-out to multiple subscribers

use scopekv::{KvStore, OwnerId, StoreEvent};

#[test]
fn test_stored_event_payload() {
    let store = KvStore::new();
    let u1 = OwnerId::new("u1");
    let events = store.subscribe();

    store.set(&u1, "newKey", "newValue").unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::ValueStored {
            owner: u1,
            key: "newKey".to_string(),
            value: "newValue".to_string(),
        }
    );
}

#[test]
fn test_updated_event_carries_old_and_new_value() {
    let store = KvStore::new();
    let u1 = OwnerId::new("u1");

    store.set(&u1, "updateKey", "oldValue").unwrap();

    let events = store.subscribe();
    store.set(&u1, "updateKey", "newValue").unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::ValueUpdated {
            owner: u1,
            key: "updateKey".to_string(),
            old_value: "oldValue".to_string(),
            new_value: "newValue".to_string(),
        }
    );
}

#[test]
fn test_deleted_event_carries_removed_value() {
    let store = KvStore::new();
    let u1 = OwnerId::new("u1");

    store.set(&u1, "key2", "value2").unwrap();

    let events = store.subscribe();
    store.remove(&u1, "key2").unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::ValueDeleted {
            owner: u1,
            key: "key2".to_string(),
            value: "value2".to_string(),
        }
    );
}

#[test]
fn test_events_arrive_in_commit_order() {
    let store = KvStore::new();
    let u1 = OwnerId::new("u1");
    let events = store.subscribe();

    store.set(&u1, "k", "v1").unwrap();
    store.set(&u1, "k", "v2").unwrap();
    store.remove(&u1, "k").unwrap();

    assert!(matches!(
        events.try_recv().unwrap(),
        StoreEvent::ValueStored { .. }
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        StoreEvent::ValueUpdated { .. }
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        StoreEvent::ValueDeleted { .. }
    ));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_rejected_writes_emit_nothing() {
    let store = KvStore::new();
    let u1 = OwnerId::new("u1");
    let events = store.subscribe();

    store.set(&u1, "", "value").unwrap_err();
    store.remove(&u1, "missing").unwrap_err();

    assert!(events.try_recv().is_err());
}

#[test]
fn test_every_subscriber_sees_every_event() {
    let store = KvStore::new();
    let u1 = OwnerId::new("u1");

    let first = store.subscribe();
    let second = store.subscribe();

    store.set(&u1, "key", "value").unwrap();

    assert!(matches!(
        first.try_recv().unwrap(),
        StoreEvent::ValueStored { .. }
    ));
    assert!(matches!(
        second.try_recv().unwrap(),
        StoreEvent::ValueStored { .. }
    ));
}

#[test]
fn test_dropped_subscriber_does_not_block_publishing() {
    let store = KvStore::new();
    let u1 = OwnerId::new("u1");

    let dead = store.subscribe();
    drop(dead);

    let live = store.subscribe();
    store.set(&u1, "key", "value").unwrap();

    assert!(matches!(
        live.try_recv().unwrap(),
        StoreEvent::ValueStored { .. }
    ));
}

#[test]
fn test_event_payload_serializes() {
    let event = StoreEvent::ValueUpdated {
        owner: OwnerId::new("u1"),
        key: "key".to_string(),
        old_value: "old".to_string(),
        new_value: "new".to_string(),
    };

    let json = serde_json::to_string(&event).unwrap();
    let back: StoreEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}
