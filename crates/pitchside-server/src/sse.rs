//! Server-sent events: replay-then-follow of the event log.
//!
//! `GET /events/stream?from=<seq>` first replays every stored event
//! with `sequence >= from`, then switches to the live broadcast feed.
//! Events that arrive on the live feed with sequences already covered
//! by the replay are dropped, so a client sees every event exactly
//! once, in order.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::sse::{Event as SseFrame, KeepAlive, Sse};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::ServerError;
use crate::state::{AppState, StreamedEvent};

/// Query parameters for the stream endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// First sequence to deliver (default 1: the whole history).
    pub from: Option<u64>,
}

fn to_frame(event: &StreamedEvent) -> Result<SseFrame, Infallible> {
    let frame = SseFrame::default().id(event.sequence.to_string());
    match serde_json::to_string(event) {
        Ok(json) => Ok(frame.data(json)),
        Err(e) => {
            debug!(error = %e, "failed to serialize streamed event");
            Ok(frame.data("{}"))
        }
    }
}

/// `GET /events/stream?from=` handler.
pub async fn stream_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<SseFrame, Infallible>>>, ServerError> {
    let from = query.from.unwrap_or(1);

    // Subscribe before reading the backlog so nothing falls in the gap.
    let rx = state.subscribe();
    let backlog = {
        let orchestrator = state.orchestrator.read().await;
        orchestrator.store().read_from(from).await?
    };
    let mut last_delivered = from.saturating_sub(1);
    let backlog: Vec<StreamedEvent> = backlog
        .into_iter()
        .map(|sequenced| StreamedEvent {
            sequence: sequenced.sequence,
            event: sequenced.event,
        })
        .collect();
    if let Some(tail) = backlog.last() {
        last_delivered = tail.sequence;
    }

    let replay = futures::stream::iter(
        backlog
            .into_iter()
            .map(|event| to_frame(&event))
            .collect::<Vec<_>>(),
    );

    let live = futures::stream::unfold(
        (rx, last_delivered),
        |(mut rx, last)| async move {
            loop {
                match rx.recv().await {
                    Ok(event) if event.sequence > last => {
                        let sequence = event.sequence;
                        return Some((to_frame(&event), (rx, sequence)));
                    }
                    // Already delivered during replay.
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "SSE subscriber lagged, skipping ahead");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        },
    );

    Ok(Sse::new(replay.chain(live)).keep_alive(KeepAlive::default()))
}
