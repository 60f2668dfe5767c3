//! The append-only event log on embedded SQLite.
//!
//! A single `events` table holds the totally-ordered history:
//! `(sequence INTEGER PRIMARY KEY AUTOINCREMENT, timestamp TEXT,
//! kind TEXT, payload BLOB)`. Sequences are monotonic and gap-free.
//! Batches append inside one transaction, so a partial append rolls
//! back and the fsync cost is paid once per batch, not per event.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use pitchside_types::Event;

use crate::codec;
use crate::error::StoreError;

/// The durable event log plus its snapshot side-table.
pub struct EventStore {
    pub(crate) pool: SqlitePool,
    strict: bool,
}

/// An event paired with its assigned sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedEvent {
    /// Monotonic, gap-free sequence.
    pub sequence: u64,
    /// The decoded event.
    pub event: Event,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    sequence: i64,
    timestamp: String,
    kind: String,
    payload: Vec<u8>,
}

impl EventStore {
    /// Open (or create) the log at the given database path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] when the database cannot be
    /// opened or the schema cannot be created.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool, strict: true };
        store.init_schema().await?;
        info!(path, "event store opened");
        Ok(store)
    }

    /// Open an in-memory log (tests, the offline self-check).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] on connection failure.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool, strict: true };
        store.init_schema().await?;
        Ok(store)
    }

    /// Toggle strict replay mode. Strict (the default) fails on unknown
    /// event kinds; lenient skips them with a warning.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The underlying connection pool (tests, maintenance tooling).
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"CREATE TABLE IF NOT EXISTS events (
                  sequence INTEGER PRIMARY KEY AUTOINCREMENT,
                  timestamp TEXT NOT NULL,
                  kind TEXT NOT NULL,
                  payload BLOB NOT NULL
              )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r"CREATE TABLE IF NOT EXISTS snapshots (
                  sequence INTEGER PRIMARY KEY,
                  created_at TEXT NOT NULL,
                  data BLOB NOT NULL
              )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_kind ON events(kind)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Append a batch of events atomically, in order.
    ///
    /// Returns the sequence assigned to the last event, or the current
    /// latest sequence for an empty batch. Either every event in the
    /// batch is durable or none is.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on serialization or I/O failure; the
    /// transaction is rolled back.
    pub async fn append_batch(&self, events: &[Event]) -> Result<u64, StoreError> {
        if events.is_empty() {
            return self.latest_sequence().await;
        }

        let mut tx = self.pool.begin().await?;
        let mut last_sequence: i64 = 0;
        for event in events {
            let encoded = codec::encode(event)?;
            let result =
                sqlx::query("INSERT INTO events (timestamp, kind, payload) VALUES (?, ?, ?)")
                    .bind(&encoded.timestamp)
                    .bind(encoded.kind)
                    .bind(&encoded.payload)
                    .execute(&mut *tx)
                    .await?;
            last_sequence = result.last_insert_rowid();
        }
        tx.commit().await?;

        debug!(count = events.len(), last_sequence, "appended event batch");
        Ok(last_sequence as u64)
    }

    /// Append a single event. Returns its assigned sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on serialization or I/O failure.
    pub async fn append(&self, event: &Event) -> Result<u64, StoreError> {
        self.append_batch(core::slice::from_ref(event)).await
    }

    /// Read all events with `sequence >= from`, in sequence order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] or [`StoreError::UnknownKind`]
    /// per the codec's strictness rules, and [`StoreError::Sqlite`] on
    /// I/O failure.
    pub async fn read_from(&self, from: u64) -> Result<Vec<SequencedEvent>, StoreError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT sequence, timestamp, kind, payload FROM events \
             WHERE sequence >= ? ORDER BY sequence",
        )
        .bind(from as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let sequence = row.sequence as u64;
            if let Some(event) =
                codec::decode(sequence, &row.timestamp, &row.kind, &row.payload, self.strict)?
            {
                events.push(SequencedEvent { sequence, event });
            }
        }
        Ok(events)
    }

    /// The highest assigned sequence, or 0 for an empty log.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] on I/O failure.
    pub async fn latest_sequence(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COALESCE(MAX(sequence), 0) AS seq FROM events")
            .fetch_one(&self.pool)
            .await?;
        let seq: i64 = row.try_get("seq")?;
        Ok(seq as u64)
    }

    /// Drop the log and snapshots and start fresh. Sequences restart
    /// from 1.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] on I/O failure.
    pub async fn reset(&self) -> Result<(), StoreError> {
        sqlx::query("DROP TABLE IF EXISTS events")
            .execute(&self.pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS snapshots")
            .execute(&self.pool)
            .await?;
        self.init_schema().await?;
        info!("event store reset");
        Ok(())
    }
}
