use axum::http::StatusCode;
use sea_orm::DatabaseConnection;

/// Liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness check body: 200 when the database answers a ping, 503 otherwise.
pub async fn check_database(db: &DatabaseConnection) -> StatusCode {
    match db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
