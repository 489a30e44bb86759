//! Engine tests
//!
//! Tests verify:
//! - Ownership enforcement at the command boundary
//! - Public reads without an identity
//! - Error-to-result mapping for removal of absent keys

use scopekv::protocol::{Command, Reply};
use scopekv::{Engine, OwnerId, StoreError};

fn identified(engine: &Engine, id: &str, command: Command) -> scopekv::Result<Reply> {
    let owner = OwnerId::new(id);
    engine.execute(Some(&owner), command)
}

// =============================================================================
// Ownership Enforcement
// =============================================================================

#[test]
fn test_anonymous_write_is_unauthorized() {
    let engine = Engine::with_new_store();

    let err = engine
        .execute(
            None,
            Command::Set {
                key: "key".to_string(),
                value: "value".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized));

    let err = engine
        .execute(
            None,
            Command::Remove {
                key: "key".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized));
}

#[test]
fn test_anonymous_own_namespace_read_is_unauthorized() {
    let engine = Engine::with_new_store();

    for command in [
        Command::Get {
            key: "key".to_string(),
        },
        Command::Exists {
            key: "key".to_string(),
        },
        Command::Keys,
        Command::Count,
        Command::Page {
            offset: 0,
            limit: 10,
        },
    ] {
        let err = engine.execute(None, command).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }
}

#[test]
fn test_identified_write_lands_in_caller_namespace() {
    let engine = Engine::with_new_store();

    identified(
        &engine,
        "u1",
        Command::Set {
            key: "key".to_string(),
            value: "value".to_string(),
        },
    )
    .unwrap();

    let u1 = OwnerId::new("u1");
    let u2 = OwnerId::new("u2");
    assert_eq!(engine.store().get(&u1, "key"), "value");
    assert_eq!(engine.store().get(&u2, "key"), "");
}

// =============================================================================
// Public Reads
// =============================================================================

#[test]
fn test_anonymous_public_reads_are_allowed() {
    let engine = Engine::with_new_store();
    let u1 = OwnerId::new("u1");
    engine.store().set(&u1, "publicKey", "publicValue").unwrap();

    let reply = engine
        .execute(
            None,
            Command::GetFrom {
                owner: u1.clone(),
                key: "publicKey".to_string(),
            },
        )
        .unwrap();
    assert_eq!(reply, Reply::Value("publicValue".to_string()));

    let reply = engine
        .execute(
            None,
            Command::ExistsFor {
                owner: u1.clone(),
                key: "publicKey".to_string(),
            },
        )
        .unwrap();
    assert_eq!(reply, Reply::Flag(true));

    let reply = engine
        .execute(None, Command::KeysFor { owner: u1.clone() })
        .unwrap();
    assert_eq!(reply, Reply::Keys(vec!["publicKey".to_string()]));

    let reply = engine
        .execute(None, Command::CountFor { owner: u1 })
        .unwrap();
    assert_eq!(reply, Reply::Count(1));
}

#[test]
fn test_cross_namespace_read_through_engine() {
    let engine = Engine::with_new_store();

    identified(
        &engine,
        "u1",
        Command::Set {
            key: "shared".to_string(),
            value: "from-u1".to_string(),
        },
    )
    .unwrap();

    // u2 reads u1's namespace explicitly
    let reply = identified(
        &engine,
        "u2",
        Command::GetFrom {
            owner: OwnerId::new("u1"),
            key: "shared".to_string(),
        },
    )
    .unwrap();
    assert_eq!(reply, Reply::Value("from-u1".to_string()));

    // But u2's own namespace stays empty
    let reply = identified(
        &engine,
        "u2",
        Command::Get {
            key: "shared".to_string(),
        },
    )
    .unwrap();
    assert_eq!(reply, Reply::Value(String::new()));
}

// =============================================================================
// Routing
// =============================================================================

#[test]
fn test_remove_missing_key_maps_to_not_found() {
    let engine = Engine::with_new_store();

    let err = identified(
        &engine,
        "u1",
        Command::Remove {
            key: "missing".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, StoreError::KeyNotFound));
}

#[test]
fn test_pagination_through_engine() {
    let engine = Engine::with_new_store();

    for i in 0..3 {
        identified(
            &engine,
            "u1",
            Command::Set {
                key: format!("key{}", i),
                value: "v".to_string(),
            },
        )
        .unwrap();
    }

    let reply = identified(
        &engine,
        "u1",
        Command::Page {
            offset: 1,
            limit: 5,
        },
    )
    .unwrap();

    match reply {
        Reply::Page(page) => {
            assert_eq!(page.keys, vec!["key1", "key2"]);
            assert!(!page.has_more);
        }
        other => panic!("Expected page reply, got {:?}", other),
    }
}

#[test]
fn test_ping_answers_pong() {
    let engine = Engine::with_new_store();
    assert_eq!(engine.execute(None, Command::Ping).unwrap(), Reply::Pong);
}
