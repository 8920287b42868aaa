//! # Journal Routes
//!
//! - GET /v1/events?since=N&limit=M — up to M committed transitions with
//!   sequence >= N

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use idreg_state::RegistryEvent;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// First sequence number to return. Defaults to 0.
    pub since: Option<u64>,
    /// Maximum number of events to return (default: 100, max: 1000).
    pub limit: Option<usize>,
}

impl EventsQuery {
    pub const DEFAULT_LIMIT: usize = 100;
    pub const MAX_LIMIT: usize = 1000;

    fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }
}

/// A page of the registry journal.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventsResponse {
    /// Events in commit order.
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<RegistryEvent>,
    /// Value of `since` that continues after this page.
    pub next_sequence: u64,
    /// Whether events past this page already exist.
    pub has_more: bool,
}

/// Build the journal router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/events", get(list_events))
}

/// GET /v1/events — Journal of committed transitions.
#[utoipa::path(
    get,
    path = "/v1/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "One page of journal entries", body = EventsResponse),
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let since = query.since.unwrap_or(0);
    let limit = query.effective_limit();

    let registry = state.registry.lock();
    let tail = registry.events_since(since);
    let page = &tail[..tail.len().min(limit)];
    let next_sequence = page
        .last()
        .map_or_else(|| since.min(registry.events().len() as u64), |e| e.sequence + 1);
    Json(EventsResponse {
        events: page.to_vec(),
        next_sequence,
        has_more: tail.len() > page.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(EventsQuery::default().effective_limit(), 100);
        let huge = EventsQuery {
            limit: Some(1_000_000),
            ..EventsQuery::default()
        };
        assert_eq!(huge.effective_limit(), EventsQuery::MAX_LIMIT);
    }
}
