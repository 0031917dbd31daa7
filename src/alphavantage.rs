use std::str::FromStr;

use chrono::NaiveDate;
use json::JsonValue;
use tracing::debug;

use crate::{error::FetchError, timeseries::PriceSeries};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";

/// Source of a symbol's complete daily closing-price history.
pub trait DailyPrices {
    fn daily_history(&self, symbol: &str) -> Result<PriceSeries, FetchError>;
}

pub struct AlphaVantage {
    key: String,
    client: reqwest::blocking::Client,
}

impl AlphaVantage {
    pub fn with_key(key: &str) -> Self {
        AlphaVantage {
            key: key.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn daily_url(&self, symbol: &str, compact: bool) -> String {
        let outputsize = if compact { "compact" } else { "full" };
        format!(
            "{}?function=TIME_SERIES_DAILY&outputsize={}&symbol={}&apikey={}&datatype=json",
            BASE_URL, outputsize, symbol, self.key
        )
    }

    /// Requests the daily series for `symbol`. `compact` limits the answer to
    /// the last 100 trading days.
    pub fn fetch_daily(&self, symbol: &str, compact: bool) -> Result<PriceSeries, FetchError> {
        let url = self.daily_url(symbol, compact);
        debug!("Requesting daily series for {}", symbol);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }
        let body = response
            .text()
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        AlphaVantage::parse_daily(symbol, &body)
    }

    /// Turns a `TIME_SERIES_DAILY` JSON body into a date-sorted close series.
    pub fn parse_daily(symbol: &str, body: &str) -> Result<PriceSeries, FetchError> {
        let parsed = json::parse(body).map_err(|e| FetchError::Parse(e.to_string()))?;

        if let Some(message) = parsed["Error Message"].as_str() {
            return Err(FetchError::Provider(message.to_string()));
        }
        for notice in ["Note", "Information"] {
            if let Some(message) = parsed[notice].as_str() {
                return Err(FetchError::RateLimited(message.to_string()));
            }
        }

        let daily = &parsed[SERIES_KEY];
        if !daily.is_object() {
            return Err(FetchError::Parse(format!(
                "response has no '{}' object",
                SERIES_KEY
            )));
        }

        let mut series = PriceSeries::new(symbol);
        for (date, entry) in daily.entries() {
            let date = NaiveDate::from_str(date)
                .map_err(|e| FetchError::Parse(format!("bad date '{}': {}", date, e)))?;
            series.insert(date, parse_close(&entry[CLOSE_KEY], date)?);
        }
        Ok(series)
    }
}

fn parse_close(value: &JsonValue, date: NaiveDate) -> Result<f64, FetchError> {
    let close = match value.as_str() {
        Some(s) => s.trim().parse::<f64>().ok(),
        None => value.as_f64(),
    };
    close
        .filter(|c| c.is_finite())
        .ok_or_else(|| FetchError::Parse(format!("bad close '{}' on {}", value, date)))
}

impl DailyPrices for AlphaVantage {
    fn daily_history(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        self.fetch_daily(symbol, false)
    }
}
