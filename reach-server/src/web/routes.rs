//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::engine::{QueryError, SearchOutcome};
use crate::planner::CancellationToken;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/stations/:external_id", get(station))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Destinations reachable from an origin.
///
/// The search runs on the blocking pool. Tier 2 is cancelled once the
/// configured timeout elapses; whatever it found by then is kept.
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.into_query();
    let engine = Arc::clone(&state.engine);
    let cancel = CancellationToken::new();

    let timer = {
        let cancel = cancel.clone();
        let timeout = engine.config().tier2_timeout();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        })
    };

    let origin = query.origin.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let outcome = engine.search(&query, &cancel)?;
        let resolved = engine
            .resolve(&query.origin)
            .map(|idx| engine.store().stop(idx).id.to_string());
        Ok::<_, QueryError>((outcome, resolved))
    })
    .await;
    timer.abort();

    let (outcome, resolved) = outcome.map_err(|e| AppError::Internal {
        message: format!("search task failed: {e}"),
    })??;

    let destinations = match outcome {
        SearchOutcome::OriginNotFound => {
            return Err(AppError::NotFound {
                message: format!("Unknown origin: {origin}"),
            });
        }
        SearchOutcome::NoDestinations => Vec::new(),
        SearchOutcome::Destinations(results) => {
            results.iter().map(DestinationDto::from_result).collect()
        }
    };

    Ok(Json(SearchResponse {
        origin: resolved.unwrap_or(origin),
        destinations,
    }))
}

/// Resolve an external station id.
async fn station(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<Json<StationResponse>, AppError> {
    let engine = Arc::clone(&state.engine);
    let id = external_id.clone();
    let resolved = tokio::task::spawn_blocking(move || {
        engine
            .resolve(&id)
            .map(|idx| StationResponse::from_stop(&id, engine.store().stop(idx)))
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("lookup task failed: {e}"),
    })?;

    resolved.map(Json).ok_or_else(|| AppError::NotFound {
        message: format!("Unknown station: {external_id}"),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::planner::SearchConfig;
    use crate::testing::{hm, paris_lyon};

    fn state() -> AppState {
        AppState::new(Engine::new(paris_lyon(hm(9, 50)), SearchConfig::default()))
    }

    fn params(origin: &str, start: &str) -> SearchParams {
        SearchParams {
            origin: origin.into(),
            date: "2024-06-03".into(),
            start: start.into(),
            end: "09:00".into(),
            max_duration: None,
            max_transfers: None,
        }
    }

    #[tokio::test]
    async fn search_returns_ranked_destinations() {
        let Json(response) = search(State(state()), Query(params("87686006", "08:00")))
            .await
            .unwrap();

        assert_eq!(response.origin, "StopArea:OCE87686006");
        let names: Vec<_> = response.destinations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Mâcon Ville", "Lyon Part Dieu"]);
        assert_eq!(
            response.destinations[1].transfer_station.as_deref(),
            Some("Mâcon Ville")
        );
    }

    #[tokio::test]
    async fn empty_result_is_ok() {
        let Json(response) = search(State(state()), Query(params("87713040", "08:00")))
            .await
            .unwrap();
        assert!(response.destinations.is_empty());
    }

    #[tokio::test]
    async fn unknown_origin_is_not_found() {
        let err = search(State(state()), Query(params("11111111", "08:00")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_window_is_bad_request() {
        let err = search(State(state()), Query(params("87686006", "10:00")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn station_lookup() {
        let Json(found) = station(State(state()), Path("87725002".to_string()))
            .await
            .unwrap();
        assert_eq!(found.stop_id, "StopArea:OCE87725002");
        assert_eq!(found.name, "Mâcon Ville");

        let err = station(State(state()), Path("Atlantis".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
