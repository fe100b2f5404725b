use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::resolve_session;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes, no session
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::scrape));

    // API routes: every handler receives the resolved Session
    let api = Router::new()
        // Dashboard
        .route("/api/dashboard/summary", get(handlers::dashboard::summary))
        // Trades
        .route("/api/trades", get(handlers::trades::list).post(handlers::trades::create))
        .route(
            "/api/trades/:id",
            get(handlers::trades::detail)
                .patch(handlers::trades::update)
                .delete(handlers::trades::delete),
        )
        .route("/api/trades/:id/journal", get(handlers::trades::journal))
        .route("/api/import/trades", post(handlers::trades::import))
        // Journal
        .route("/api/journal", get(handlers::journal::list).post(handlers::journal::create))
        .route(
            "/api/journal/:id",
            patch(handlers::journal::update).delete(handlers::journal::delete),
        )
        .route(
            "/api/journal-days/:date",
            get(handlers::journal::get_day).put(handlers::journal::save_day),
        )
        .route("/api/journal-days/:date/draft", put(handlers::journal::save_draft))
        // Rules & setups
        .route("/api/rules", get(handlers::rules::list).post(handlers::rules::create))
        .route(
            "/api/rules/:id",
            patch(handlers::rules::update).delete(handlers::rules::delete),
        )
        .route("/api/rules/:id/toggle", post(handlers::rules::toggle))
        .route("/api/setups", get(handlers::setups::list).post(handlers::setups::create))
        .route(
            "/api/setups/:id",
            patch(handlers::setups::update).delete(handlers::setups::delete),
        )
        // Watchlist & notes (account or device)
        .route("/api/watchlist", get(handlers::watchlist::list).post(handlers::watchlist::add))
        .route(
            "/api/watchlist/:symbol",
            patch(handlers::watchlist::update).delete(handlers::watchlist::remove),
        )
        .route("/api/notes", get(handlers::notes::list_all))
        .route(
            "/api/notes/:symbol",
            get(handlers::notes::list_for_symbol).post(handlers::notes::create),
        )
        .route(
            "/api/notes/:symbol/:id",
            patch(handlers::notes::update).delete(handlers::notes::delete),
        )
        // Canvases
        .route("/api/canvases", get(handlers::canvases::list).post(handlers::canvases::create))
        .route(
            "/api/canvases/:id",
            get(handlers::canvases::detail)
                .patch(handlers::canvases::update)
                .delete(handlers::canvases::delete),
        )
        .route("/api/canvases/:id/publish", post(handlers::canvases::publish))
        .route("/api/canvases/:id/unpublish", post(handlers::canvases::unpublish))
        .route("/api/canvases/:id/import", post(handlers::canvases::import))
        .route("/api/canvases/:id/like", post(handlers::canvases::like))
        .route("/api/community/canvases", get(handlers::canvases::community))
        // Market data
        .route("/api/market/search", get(handlers::market::search))
        .route("/api/market/quotes", get(handlers::market::quotes))
        // Jarvis
        .route("/api/jarvis", post(handlers::jarvis::chat))
        .route("/api/jarvis/context", get(handlers::jarvis::context))
        // Profile settings
        .route(
            "/api/me/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
