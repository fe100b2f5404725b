//! Broker CSV import.

pub mod csv;

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::trade_repo;

pub use self::csv::{parse_broker_csv, CsvParse, ParsedTrade};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Buy/sell rows recognised in the export.
    pub parsed: usize,
    pub imported: usize,
    pub failed: usize,
    /// Rows after the header that were not buy/sell orders or were unreadable.
    pub skipped_rows: usize,
}

/// Insert each parsed trade independently. A failing row is logged and
/// counted; rows already inserted stay inserted.
pub async fn import_trades(pool: &PgPool, owner: Uuid, parsed: CsvParse) -> ImportReport {
    let mut report = ImportReport {
        parsed: parsed.trades.len(),
        skipped_rows: parsed.skipped_rows,
        ..Default::default()
    };

    for trade in parsed.trades {
        let broker_id = trade.broker_id.clone();
        match trade_repo::insert_trade(pool, owner, &trade.into_new_trade()).await {
            Ok(_) => report.imported += 1,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(
                    error = %e,
                    owner = %owner,
                    broker_id = %broker_id,
                    "Failed to insert imported trade"
                );
            }
        }
    }

    metrics::counter!("trades_imported_total").increment(report.imported as u64);
    tracing::info!(
        owner = %owner,
        imported = report.imported,
        failed = report.failed,
        skipped = report.skipped_rows,
        "CSV import finished"
    );

    report
}
