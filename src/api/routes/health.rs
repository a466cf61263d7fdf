use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct Dependencies {
    pub cache: &'static str,
    pub optimizer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since startup
    pub uptime: f64,
    pub dependencies: Dependencies,
}

fn status_label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

/// Liveness plus dependency checks. Always 200.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = status_label(state.profiles.cache().health_check().await);
    let optimizer = match &state.optimizer {
        Some(client) => status_label(client.health_check().await),
        None => "disabled",
    };

    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        dependencies: Dependencies { cache, optimizer },
    })
}
