use axum::extract::State;
use axum::{Extension, Json};

use crate::services::dashboard::{self, DashboardSummary};
use crate::session::Session;
use crate::AppState;

use super::ApiResponse;

/// GET /api/dashboard/summary: demo payload when nobody is signed in
pub async fn summary(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<ApiResponse<DashboardSummary>> {
    let summary = match &session.user {
        Some(user) => dashboard::summary(&state.db, user).await,
        None => dashboard::demo_summary(),
    };

    ApiResponse::ok(summary)
}
