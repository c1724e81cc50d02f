//! `GET /api/feature-flags`: the resolved set for browser-side consumers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::resolver::FlagResolver;
use crate::source::OverrideSource;

pub const FEATURE_FLAGS_PATH: &str = "/api/feature-flags";
pub(crate) const CACHE_CONTROL_VALUE: &str = "public, max-age=60";

pub fn router<S: OverrideSource>(resolver: Arc<FlagResolver<S>>) -> Router {
    Router::new()
        .route(FEATURE_FLAGS_PATH, get(get_feature_flags::<S>))
        .with_state(resolver)
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Feature flag resolution did not complete: {0}")]
    Resolution(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Failed to serve feature flags");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to fetch feature flags" })),
        )
            .into_response()
    }
}

#[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip_all))]
async fn get_feature_flags<S: OverrideSource>(
    State(resolver): State<Arc<FlagResolver<S>>>,
) -> Result<Response, ApiError> {
    // Resolution reads the environment and may block.
    let flags = tokio::task::spawn_blocking(move || resolver.resolve_all(false)).await?;

    Ok((
        [(header::CACHE_CONTROL, CACHE_CONTROL_VALUE)],
        Json(flags),
    )
        .into_response())
}
