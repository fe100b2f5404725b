use crate::models::MarketStock;

// (ticker, name, price, day change %, sector)
const MOCK_MARKET: [(&str, &str, f64, f64, &str); 20] = [
    ("AAPL", "Apple Inc.", 182.50, 1.2, "Technology"),
    ("MSFT", "Microsoft Corp.", 415.10, 0.5, "Technology"),
    ("GOOGL", "Alphabet Inc.", 173.90, -0.8, "Technology"),
    ("AMZN", "Amazon.com Inc.", 178.30, 1.5, "Consumer Cyclical"),
    ("NVDA", "NVIDIA Corp.", 875.90, 3.8, "Technology"),
    ("TSLA", "Tesla, Inc.", 175.30, -2.5, "Consumer Cyclical"),
    ("META", "Meta Platforms", 485.50, 2.1, "Technology"),
    ("AMD", "Advanced Micro Devices", 170.20, -1.1, "Technology"),
    ("NFLX", "Netflix, Inc.", 605.40, 0.9, "Communication Services"),
    ("INTC", "Intel Corp.", 43.50, -0.5, "Technology"),
    ("V", "Visa Inc.", 275.40, 0.3, "Financial Services"),
    ("JPM", "JPMorgan Chase", 195.20, 1.1, "Financial Services"),
    ("WMT", "Walmart Inc.", 60.10, 0.2, "Consumer Defensive"),
    ("PG", "Procter & Gamble", 161.80, 0.4, "Consumer Defensive"),
    ("JNJ", "Johnson & Johnson", 158.20, -0.2, "Healthcare"),
    ("UNH", "UnitedHealth Group", 480.50, -1.5, "Healthcare"),
    ("XOM", "Exxon Mobil", 115.30, 1.8, "Energy"),
    ("CVX", "Chevron Corp.", 155.60, 1.2, "Energy"),
    ("KO", "Coca-Cola Co.", 59.40, 0.1, "Consumer Defensive"),
    ("PEP", "PepsiCo, Inc.", 168.90, -0.3, "Consumer Defensive"),
];

fn to_stock(row: &(&str, &str, f64, f64, &str)) -> MarketStock {
    let (ticker, name, price, change, sector) = *row;
    MarketStock {
        ticker: ticker.into(),
        name: name.into(),
        price,
        change,
        sector: sector.into(),
    }
}

/// Case-insensitive substring match on ticker or company name.
pub fn search(query: &str) -> Vec<MarketStock> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    MOCK_MARKET
        .iter()
        .filter(|(ticker, name, ..)| {
            ticker.to_lowercase().contains(&query) || name.to_lowercase().contains(&query)
        })
        .map(to_stock)
        .collect()
}

/// Quotes for known tickers, in request order. Unknown tickers are dropped.
pub fn quotes<S: AsRef<str>>(tickers: &[S]) -> Vec<MarketStock> {
    tickers
        .iter()
        .filter_map(|t| {
            let wanted = t.as_ref().trim().to_uppercase();
            MOCK_MARKET.iter().find(|(ticker, ..)| *ticker == wanted)
        })
        .map(to_stock)
        .collect()
}

/// Split a `tickers=AAPL,MSFT` query value.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_matches_ticker_or_name() {
        let tickers: Vec<String> = search("micro").into_iter().map(|s| s.ticker).collect();
        assert_eq!(tickers, vec!["MSFT", "AMD"]);

        assert_eq!(search("nvda")[0].name, "NVIDIA Corp.");
        assert!(search("   ").is_empty());
        assert!(search("zzzz").is_empty());
    }

    #[test]
    fn quotes_keep_request_order_and_drop_unknown() {
        let tickers = parse_tickers("tsla, aapl,,NOPE");
        assert_eq!(tickers, vec!["TSLA", "AAPL", "NOPE"]);

        let quoted: Vec<String> = quotes(&tickers).into_iter().map(|s| s.ticker).collect();
        assert_eq!(quoted, vec!["TSLA", "AAPL"]);
    }
}
