use chrono::{Duration, Local, NaiveDate};
use tracing::error;

use crate::{alphavantage::DailyPrices, error::FetchError, timeseries::PriceSeries};

/// Major banks and hedge funds charted on every run.
pub const SYMBOLS: [&str; 8] = ["JPM", "BAC", "C", "WFC", "GS", "MS", "BLK", "BX"];

/// How far back each run looks.
pub const LOOKBACK_DAYS: i64 = 365;

/// Inclusive calendar range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateWindow { start, end }
    }

    /// The year ending on `end`.
    pub fn ending_on(end: NaiveDate) -> Self {
        DateWindow::new(end - Duration::days(LOOKBACK_DAYS), end)
    }

    pub fn past_year() -> Self {
        DateWindow::ending_on(Local::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Object name for the chart of a run ending on `end`.
pub fn report_filename(end: NaiveDate) -> String {
    format!("stock_prices_{}.png", end.format("%Y-%m-%d"))
}

/// What fetching one symbol produced.
#[derive(Debug)]
pub enum FetchOutcome {
    Series(PriceSeries),
    /// The provider answered, but nothing fell inside the window.
    Empty,
    Failed(FetchError),
}

/// Fetches the full history for `symbol` and keeps the closes inside `window`.
/// Failures are logged here and reported as [`FetchOutcome::Failed`].
pub fn fetch_closes(provider: &dyn DailyPrices, symbol: &str, window: &DateWindow) -> FetchOutcome {
    match provider.daily_history(symbol) {
        Ok(history) => {
            let closes = history.between(window);
            if closes.is_empty() {
                FetchOutcome::Empty
            } else {
                FetchOutcome::Series(closes)
            }
        }
        Err(e) => {
            error!("Error fetching data for {}: {}", symbol, e);
            FetchOutcome::Failed(e)
        }
    }
}
