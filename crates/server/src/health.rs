use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use samm_db::DbPool;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

/// Readiness report for the process. The service is degraded exactly
/// when the meeting store cannot be queried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub database: DatabaseHealth,
    pub checked_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    pub detail: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

pub async fn spawn(bind_address: &str, port: u16, db_pool: DbPool) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(db_pool)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;

    let (status, status_code) = if database.reachable {
        ("ready", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let payload = HealthResponse {
        status,
        service: "samm-server",
        database,
        checked_at: Utc::now().to_rfc3339(),
    };

    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> DatabaseHealth {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM meetings").fetch_one(pool).await {
        Ok(count) => {
            DatabaseHealth { reachable: true, detail: format!("{count} meetings on record") }
        }
        Err(error) => {
            DatabaseHealth { reachable: false, detail: format!("database query failed: {error}") }
        }
    }
}
