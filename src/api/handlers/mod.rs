pub mod canvases;
pub mod dashboard;
pub mod health;
pub mod jarvis;
pub mod journal;
pub mod market;
pub mod metrics;
pub mod notes;
pub mod rules;
pub mod settings;
pub mod setups;
pub mod trades;
pub mod watchlist;

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    /// Success with no payload (deletes, accepted drafts).
    pub fn done() -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data: None,
            error: None,
        })
    }
}
