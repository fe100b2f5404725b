use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Direction, NewTrade};

const COL_ACTION: &str = "Action";
const COL_TICKER: &str = "Ticker";
const COL_TIME: &str = "Time";
const COL_SHARES: &str = "No. of shares";
const COL_PRICE: &str = "Price / share";
const COL_CURRENCY: &str = "Currency (Price / share)";
const COL_STAMP_DUTY: &str = "Stamp duty reserve tax";
const COL_CONVERSION_FEE: &str = "Currency conversion fee";
const COL_NOTES: &str = "Notes";
const COL_ID: &str = "ID";

const DEFAULT_CURRENCY: &str = "USD";

/// One buy/sell row of a broker export, normalized to the trade shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTrade {
    pub broker_id: String,
    pub symbol: String,
    pub direction: Direction,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
    pub fee: Decimal,
    pub currency: String,
    pub notes: String,
}

impl ParsedTrade {
    pub fn into_new_trade(self) -> NewTrade {
        NewTrade {
            symbol: self.symbol,
            direction: self.direction,
            quantity: self.quantity,
            price: self.price,
            timestamp: self.timestamp,
            fee: self.fee,
            currency: self.currency,
            notes: Some(self.notes).filter(|n| !n.is_empty()),
            broker_id: Some(self.broker_id),
        }
    }
}

/// Result of parsing an export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvParse {
    pub trades: Vec<ParsedTrade>,
    /// Rows after the header that were not buy/sell orders or could not be read.
    pub skipped_rows: usize,
}

/// Parse a broker export.
///
/// The header is the first line mentioning both `Action` and `Ticker`; lines
/// before it are ignored. Only buy/sell actions are kept (dividends, deposits
/// and the like are skipped). `fee` is stamp duty plus currency conversion fee.
pub fn parse_broker_csv(text: &str) -> CsvParse {
    let lines: Vec<&str> = text.split('\n').collect();

    let Some(header_index) = lines
        .iter()
        .position(|l| l.contains(COL_ACTION) && l.contains(COL_TICKER))
    else {
        return CsvParse::default();
    };

    let headers = split_csv_line(lines[header_index].trim());
    let generated_prefix = format!("generated-{}", Utc::now().timestamp_millis());
    let mut parsed = CsvParse::default();

    for (index, raw) in lines.iter().enumerate().skip(header_index + 1) {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let values = split_csv_line(line);
        let row: HashMap<&str, &str> = headers
            .iter()
            .zip(values.iter())
            .map(|(h, v)| (h.as_str(), v.as_str()))
            .collect();

        match parse_row(&row, || format!("{generated_prefix}-{index}")) {
            Some(trade) => parsed.trades.push(trade),
            None => parsed.skipped_rows += 1,
        }
    }

    parsed
}

fn parse_row(row: &HashMap<&str, &str>, generated_id: impl FnOnce() -> String) -> Option<ParsedTrade> {
    let action = row.get(COL_ACTION)?.to_lowercase();
    let direction = action_direction(&action)?;

    let symbol = field(row, COL_TICKER)?.to_string();
    let timestamp = parse_timestamp(field(row, COL_TIME)?)?;

    let fee = parse_decimal(row.get(COL_STAMP_DUTY).copied())
        + parse_decimal(row.get(COL_CONVERSION_FEE).copied());

    Some(ParsedTrade {
        broker_id: field(row, COL_ID)
            .map(str::to_string)
            .unwrap_or_else(generated_id),
        symbol,
        direction,
        quantity: parse_decimal(row.get(COL_SHARES).copied()),
        price: parse_decimal(row.get(COL_PRICE).copied()),
        timestamp,
        fee,
        currency: field(row, COL_CURRENCY).unwrap_or(DEFAULT_CURRENCY).to_string(),
        notes: field(row, COL_NOTES).unwrap_or_default().to_string(),
    })
}

/// "Market buy", "Limit sell", ... → direction. Dividends and deposits → None.
fn action_direction(action: &str) -> Option<Direction> {
    if action.contains("dividend") || action.contains("deposit") {
        return None;
    }
    if action.contains("buy") {
        Some(Direction::Buy)
    } else if action.contains("sell") {
        Some(Direction::Sell)
    } else {
        None
    }
}

fn field<'a>(row: &HashMap<&str, &'a str>, name: &str) -> Option<&'a str> {
    row.get(name).copied().filter(|v| !v.is_empty())
}

/// Missing, blank or unreadable amounts count as zero.
fn parse_decimal(value: Option<&str>) -> Decimal {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Decimal::ZERO;
    };
    Decimal::from_str(v)
        .or_else(|_| Decimal::from_scientific(v))
        .unwrap_or(Decimal::ZERO)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Comma-split a CSV line, honouring double quotes. Quote characters are
/// dropped; a doubled quote inside a quoted field is a literal quote.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quote && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quote = !in_quote,
            ',' if !in_quote => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    values.push(current.trim().to_string());

    values
}
