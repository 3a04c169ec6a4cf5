//! REST endpoint handlers for the pool log query API.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/v1/api/pool/health` | Service health and version |
//! | `GET` | `/v1/api/pool/{pool_id}?block=latest\|<n>` | Latest or nearest-block sample |
//! | `GET` | `/v1/api/pool/{pool_id}/historic` | Full history, newest first |

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tokio::time::timeout;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::state::AppState;
use crate::db::models::PoolLog;
use crate::db::postgres::LATEST_BLOCK;

/// Deadline applied to every store call made on behalf of a request.
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters for the sample lookup endpoint.
#[derive(Debug, Deserialize)]
pub struct BlockQuery {
    /// `latest` (default) or a block number
    pub block: Option<String>,
}

fn validate_pool_id(pool_id: &str) -> Result<(), ApiError> {
    if pool_id.trim().is_empty() {
        return Err(ApiError::BadRequest("missing pool identifier".to_string()));
    }
    Ok(())
}

/// `GET /v1/api/pool/health`
///
/// Verifies database connectivity and reports the service version.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    state
        .db
        .postgres
        .health_check()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            "version",
            serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }),
        )),
    ))
}

/// `GET /v1/api/pool/{pool_id}`
///
/// Returns the latest sample for the pool, or with `?block=<n>` the sample
/// whose block number is nearest to `n`. An unknown pool yields a success
/// envelope with null data, never an error.
pub async fn get_pool_log(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
    Query(params): Query<BlockQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Option<PoolLog>>>), ApiError> {
    validate_pool_id(&pool_id)?;

    let block = params.block.unwrap_or_else(|| LATEST_BLOCK.to_string());

    let sample = timeout(
        QUERY_TIMEOUT,
        state.db.postgres.get_latest_or_nearest(&pool_id, &block),
    )
    .await
    .map_err(|_| ApiError::Timeout)??;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok("Requested Log Info", sample)),
    ))
}

/// `GET /v1/api/pool/{pool_id}/historic`
///
/// Returns every stored sample for the pool ordered newest first; an empty
/// list for an unknown pool.
pub async fn get_pool_log_history(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<PoolLog>>>), ApiError> {
    validate_pool_id(&pool_id)?;

    let history = timeout(
        QUERY_TIMEOUT,
        state.db.postgres.get_pool_log_history(&pool_id),
    )
    .await
    .map_err(|_| ApiError::Timeout)??;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok("Requested Log Info", history)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pool_ids_are_rejected() {
        assert!(validate_pool_id("").is_err());
        assert!(validate_pool_id("   ").is_err());
        assert!(validate_pool_id("0xabc").is_ok());
    }
}
