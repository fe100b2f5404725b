use serde::{Deserialize, Serialize};

/// A quote row from the (mock) market data table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStock {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub sector: String,
}
