//! Integration tests for the event log against a real SQLite database.

use chrono::{TimeZone, Utc};
use pitchside_store::{EventStore, StoreError};
use pitchside_types::{Event, EventPayload, MatchId};

fn sample(n: u8) -> Event {
    Event::new(
        Utc.with_ymd_and_hms(2025, 8, 1, 15, u32::from(n), 0).unwrap(),
        EventPayload::KickOff {
            match_id: MatchId::new(format!("m{n}")),
        },
    )
}

#[tokio::test]
async fn sequences_are_monotonic_and_gap_free() {
    let store = EventStore::in_memory().await.expect("open");
    let events: Vec<Event> = (0..5).map(sample).collect();
    let last = store.append_batch(&events).await.expect("append");
    assert_eq!(last, 5);

    let read = store.read_from(0).await.expect("read");
    assert_eq!(read.len(), 5);
    for (i, sequenced) in read.iter().enumerate() {
        assert_eq!(sequenced.sequence, i as u64 + 1);
        assert_eq!(sequenced.event, events[i]);
    }
}

#[tokio::test]
async fn read_from_offset() {
    let store = EventStore::in_memory().await.expect("open");
    let events: Vec<Event> = (0..5).map(sample).collect();
    store.append_batch(&events).await.expect("append");

    let tail = store.read_from(4).await.expect("read");
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].sequence, 4);
}

#[tokio::test]
async fn empty_batch_is_a_noop() {
    let store = EventStore::in_memory().await.expect("open");
    store.append(&sample(1)).await.expect("append");
    let last = store.append_batch(&[]).await.expect("empty append");
    assert_eq!(last, 1);
    assert_eq!(store.latest_sequence().await.expect("latest"), 1);
}

#[tokio::test]
async fn reset_clears_and_restarts_sequences() {
    let store = EventStore::in_memory().await.expect("open");
    store
        .append_batch(&(0..3).map(sample).collect::<Vec<_>>())
        .await
        .expect("append");
    store.reset().await.expect("reset");
    assert_eq!(store.latest_sequence().await.expect("latest"), 0);

    let seq = store.append(&sample(9)).await.expect("append after reset");
    assert_eq!(seq, 1);
}

#[tokio::test]
async fn survives_reopen_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.db");
    let path = path.to_str().expect("utf8 path");

    {
        let store = EventStore::open(path).await.expect("open");
        store
            .append_batch(&(0..3).map(sample).collect::<Vec<_>>())
            .await
            .expect("append");
    }

    let store = EventStore::open(path).await.expect("reopen");
    let read = store.read_from(0).await.expect("read");
    assert_eq!(read.len(), 3);
    assert_eq!(store.latest_sequence().await.expect("latest"), 3);
}

#[tokio::test]
async fn unknown_kind_is_fatal_in_strict_mode() {
    let store = EventStore::in_memory().await.expect("open");
    store.append(&sample(1)).await.expect("append");
    // Forge a record with a kind this build does not know.
    sqlx::query("INSERT INTO events (timestamp, kind, payload) VALUES (?, ?, ?)")
        .bind("2025-08-01T15:00:00+00:00")
        .bind("TransferCompleted")
        .bind(b"{}".as_slice())
        .execute(store.pool())
        .await
        .expect("forge row");

    let err = store.read_from(0).await.expect_err("strict replay fails");
    assert!(matches!(err, StoreError::UnknownKind { sequence: 2, .. }));
}

#[tokio::test]
async fn unknown_kind_is_skipped_when_lenient() {
    let store = EventStore::in_memory().await.expect("open").with_strict(false);
    store.append(&sample(1)).await.expect("append");
    sqlx::query("INSERT INTO events (timestamp, kind, payload) VALUES (?, ?, ?)")
        .bind("2025-08-01T15:00:00+00:00")
        .bind("TransferCompleted")
        .bind(b"{}".as_slice())
        .execute(store.pool())
        .await
        .expect("forge row");

    let read = store.read_from(0).await.expect("lenient replay");
    assert_eq!(read.len(), 1);
}

#[tokio::test]
async fn snapshot_roundtrip() {
    let store = EventStore::in_memory().await.expect("open");
    assert!(store.latest_snapshot().await.expect("none yet").is_none());

    store.save_snapshot(10, b"{\"season\":1}").await.expect("save");
    store.save_snapshot(20, b"{\"season\":2}").await.expect("save");

    let snapshot = store
        .latest_snapshot()
        .await
        .expect("load")
        .expect("present");
    assert_eq!(snapshot.sequence, 20);
    assert_eq!(snapshot.data, b"{\"season\":2}");
}
