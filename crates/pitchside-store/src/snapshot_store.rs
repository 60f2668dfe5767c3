//! World snapshot persistence.
//!
//! Snapshots are an optimization, not a source of truth: a snapshot is
//! a compact world encoding tagged with the last event sequence it
//! includes. Loading one skips replaying the prefix; replaying from
//! zero must produce the same world.

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::error::StoreError;
use crate::event_store::EventStore;

/// A loaded snapshot: the last included sequence and the encoded world.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Sequence of the last event folded into this snapshot.
    pub sequence: u64,
    /// Encoded world bytes (JSON).
    pub data: Vec<u8>,
}

impl EventStore {
    /// Persist a snapshot for the given sequence, replacing any
    /// existing snapshot at that sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] on I/O failure.
    pub async fn save_snapshot(&self, sequence: u64, data: &[u8]) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO snapshots (sequence, created_at, data) VALUES (?, ?, ?)",
        )
        .bind(sequence as i64)
        .bind(Utc::now().to_rfc3339())
        .bind(data)
        .execute(&self.pool)
        .await?;
        debug!(sequence, bytes = data.len(), "snapshot saved");
        Ok(())
    }

    /// Load the most recent snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] on I/O failure.
    pub async fn latest_snapshot(&self) -> Result<Option<Snapshot>, StoreError> {
        let row = sqlx::query(
            "SELECT sequence, data FROM snapshots ORDER BY sequence DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| {
            let sequence: i64 = r.get("sequence");
            Snapshot {
                sequence: sequence as u64,
                data: r.get("data"),
            }
        }))
    }
}
