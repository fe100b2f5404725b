use axum::extract::Query;
use axum::Json;
use serde::Deserialize;

use crate::models::MarketStock;
use crate::services::market;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct QuotesQuery {
    #[serde(default)]
    pub tickers: String,
}

/// GET /api/market/search?q=
pub async fn search(Query(query): Query<SearchQuery>) -> Json<ApiResponse<Vec<MarketStock>>> {
    ApiResponse::ok(market::search(&query.q))
}

/// GET /api/market/quotes?tickers=AAPL,MSFT
pub async fn quotes(Query(query): Query<QuotesQuery>) -> Json<ApiResponse<Vec<MarketStock>>> {
    let tickers = market::parse_tickers(&query.tickers);
    ApiResponse::ok(market::quotes(&tickers))
}
