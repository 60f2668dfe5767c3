//! Event codec: stable, self-describing records for the log.
//!
//! Each event is stored as `(timestamp TEXT, kind TEXT, payload BLOB)`.
//! The payload is the JSON of the tagged [`EventPayload`] union, so a
//! record is decodable on its own; the `kind` column duplicates the tag
//! for indexing and for the forward-compatibility check without
//! touching the payload.

use chrono::{DateTime, Utc};
use pitchside_types::{Event, EventPayload};
use tracing::warn;

use crate::error::StoreError;

/// An encoded record ready for insertion.
#[derive(Debug, Clone)]
pub struct EncodedEvent {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// The kind tag.
    pub kind: &'static str,
    /// JSON payload bytes.
    pub payload: Vec<u8>,
}

/// Encode one event.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if the payload cannot be
/// serialized (which would indicate a bug in the event types).
pub fn encode(event: &Event) -> Result<EncodedEvent, StoreError> {
    Ok(EncodedEvent {
        timestamp: event.timestamp.to_rfc3339(),
        kind: event.kind(),
        payload: serde_json::to_vec(&event.payload)?,
    })
}

/// Decode one stored record.
///
/// Returns `Ok(None)` when the record carries an unknown kind and
/// strict mode is off: the record is skipped with a warning. In strict
/// mode (the default) an unknown kind is fatal, naming the sequence.
///
/// # Errors
///
/// Returns [`StoreError::UnknownKind`] for an unknown tag in strict
/// mode and [`StoreError::Corrupt`] for a record that names a known
/// kind but fails to parse.
pub fn decode(
    sequence: u64,
    timestamp: &str,
    kind: &str,
    payload: &[u8],
    strict: bool,
) -> Result<Option<Event>, StoreError> {
    if !EventPayload::is_known_kind(kind) {
        if strict {
            return Err(StoreError::UnknownKind {
                sequence,
                kind: kind.to_owned(),
            });
        }
        warn!(sequence, kind, "skipping event with unknown kind (strict mode off)");
        return Ok(None);
    }

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| StoreError::Corrupt {
            sequence,
            detail: format!("bad timestamp: {e}"),
        })?
        .with_timezone(&Utc);

    let payload: EventPayload =
        serde_json::from_slice(payload).map_err(|e| StoreError::Corrupt {
            sequence,
            detail: format!("payload does not parse: {e}"),
        })?;

    Ok(Some(Event { timestamp, payload }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pitchside_types::MatchId;

    fn sample() -> Event {
        Event::new(
            Utc.with_ymd_and_hms(2025, 8, 1, 15, 0, 0).unwrap(),
            EventPayload::KickOff {
                match_id: MatchId::new("m1"),
            },
        )
    }

    #[test]
    fn encode_decode_roundtrip() {
        let event = sample();
        let encoded = encode(&event).expect("encode");
        assert_eq!(encoded.kind, "KickOff");
        let decoded = decode(1, &encoded.timestamp, encoded.kind, &encoded.payload, true)
            .expect("decode")
            .expect("known kind");
        assert_eq!(decoded, event);
    }

    #[test]
    fn unknown_kind_fatal_in_strict_mode() {
        let err = decode(7, "2025-08-01T15:00:00+00:00", "TransferCompleted", b"{}", true)
            .expect_err("must fail");
        let text = err.to_string();
        assert!(text.contains("TransferCompleted"));
        assert!(text.contains('7'));
    }

    #[test]
    fn unknown_kind_skipped_when_lenient() {
        let decoded = decode(7, "2025-08-01T15:00:00+00:00", "TransferCompleted", b"{}", false)
            .expect("lenient decode");
        assert!(decoded.is_none());
    }

    #[test]
    fn garbage_payload_is_corrupt() {
        let err = decode(3, "2025-08-01T15:00:00+00:00", "KickOff", b"not json", true)
            .expect_err("must fail");
        assert!(matches!(err, StoreError::Corrupt { sequence: 3, .. }));
    }
}
