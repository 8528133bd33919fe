use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::application::ports::image_store::StorageBackendStatus;
use crate::application::services::uploads::storage_fallback::StorageFallback;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResp {
    pub status: &'static str,
    pub database: &'static str,
    pub remote_storage: RemoteStorageHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemoteStorageHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<StorageBackendStatus> for RemoteStorageHealth {
    fn from(status: StorageBackendStatus) -> Self {
        match status {
            StorageBackendStatus::Configured => Self {
                status: "configured",
                reason: None,
            },
            StorageBackendStatus::Unavailable { reason } => Self {
                status: "unavailable",
                reason: Some(reason),
            },
        }
    }
}

#[derive(Clone)]
pub struct HealthState {
    pub pool: PgPool,
    pub storage: Arc<StorageFallback>,
}

/// Remote storage being unavailable is not degraded: uploads still land locally.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, body = HealthResp))
)]
pub async fn health(State(state): State<HealthState>) -> Json<HealthResp> {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();
    Json(HealthResp {
        status: if db_ok { "ok" } else { "degraded" },
        database: if db_ok { "up" } else { "down" },
        remote_storage: state.storage.remote_status().into(),
    })
}

pub fn routes(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}
