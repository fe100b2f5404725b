use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Liveness plus the state of the pieces the journal depends on.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let body = json!({
        "status": if db_ok { "healthy" } else { "unhealthy" },
        "db": if db_ok { "connected" } else { "disconnected" },
        "jarvis": state.llm.is_some(),
        "session_auth": state.config.has_session_auth(),
    });

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
