//! Integration tests for activity logging

use syncboard::{Intention, Replica, ReplicaConfig};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("syncboard=debug")
        .try_init();
}

#[tokio::test]
async fn test_activity_logging_end_to_end() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let config = ReplicaConfig::for_room("planning")
        .with_replica_id("replica-1")
        .with_data_dir(temp.path())
        .with_actor("alice[laptop]");
    let mut replica = Replica::open(config).await.unwrap();

    // Logged
    replica.dispatch(&Intention::AddColumn).await.unwrap();
    replica
        .dispatch(&Intention::AddCard { column: 0 })
        .await
        .unwrap();
    replica
        .dispatch(&Intention::UpdateCardName {
            column: 0,
            card: 0,
            name: "First card".into(),
        })
        .await
        .unwrap();

    // No-op move: not logged
    let value = replica
        .dispatch(&Intention::MoveCardUp { column: 0, card: 0 })
        .await
        .unwrap();
    assert_eq!(value["noop"], true);

    // Stale index: rejected but logged as a failure
    replica
        .dispatch(&Intention::DeleteCard { column: 0, card: 3 })
        .await
        .unwrap_err();

    let entries = replica.read_activity(None).await.unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].op, "delete card"); // Newest first
    assert!(entries[0].is_failure());
    assert_eq!(entries[1].op, "update card");
    assert_eq!(entries[2].op, "add card");
    assert_eq!(entries[3].op, "add column"); // Oldest last
    assert!(!entries[3].is_failure());

    for entry in &entries {
        assert_eq!(entry.actor.as_deref(), Some("alice[laptop]"));
    }
    assert_eq!(entries[1].input["intention"], "UPDATE_CARD_NAME");
    assert_eq!(entries[1].output["name"], "First card");

    let limited = replica.read_activity(Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, entries[0].id);

    // Activity log file exists where the configuration says
    let activity_path = replica.config().activity_path().unwrap();
    assert!(
        activity_path.exists(),
        "Activity log file should exist at {:?}",
        activity_path
    );
    let lines = std::fs::read_to_string(&activity_path).unwrap();
    assert_eq!(lines.lines().count(), 4);
}

#[tokio::test]
async fn test_actor_defaults_to_replica_id() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let config = ReplicaConfig::for_room("planning")
        .with_replica_id("replica-2")
        .with_data_dir(temp.path());
    let mut replica = Replica::open(config).await.unwrap();

    replica.dispatch(&Intention::AddColumn).await.unwrap();

    let entries = replica.read_activity(None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actor.as_deref(), Some("replica-2"));
}

#[tokio::test]
async fn test_no_activity_without_data_dir() {
    let config = ReplicaConfig::for_room("planning");
    let mut replica = Replica::open(config).await.unwrap();

    replica.dispatch(&Intention::AddColumn).await.unwrap();
    assert!(replica.read_activity(None).await.unwrap().is_empty());
}
