use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use carewise_db::DbPool;
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

/// Row counts, so an operator can tell an empty store from a loaded one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DatasetCounts {
    pub products: i64,
    pub service_centers: i64,
    pub active_service_centers: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetCounts>,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, dataset) = match dataset_counts(&state.db_pool).await {
        Ok(counts) => (
            HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
            Some(counts),
        ),
        Err(error) => {
            warn!(
                event_name = "system.health.degraded",
                correlation_id = "health",
                error = %error,
                "database health query failed"
            );
            (
                HealthCheck { status: "degraded", detail: format!("database query failed: {error}") },
                None,
            )
        }
    };
    let ready = database.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "carewise-server runtime initialized".to_string(),
        },
        database,
        dataset,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn dataset_counts(pool: &DbPool) -> Result<DatasetCounts, sqlx::Error> {
    let (products, service_centers, active_service_centers): (i64, i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM product),
                (SELECT COUNT(*) FROM service_center),
                (SELECT COUNT(*) FROM service_center WHERE active = 1)",
    )
    .fetch_one(pool)
    .await?;

    Ok(DatasetCounts { products, service_centers, active_service_centers })
}
