pub mod alphavantage;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod s3_store;
pub mod stock;
pub mod stockplotter;
pub mod timeseries;

use tracing::{error, info, warn};

use crate::{
    alphavantage::{AlphaVantage, DailyPrices},
    config::Config,
    error::FetchError,
    ratelimit::{FixedDelay, Throttle},
    s3_store::{upload_chart, ObjectStore, S3Store},
    stock::{fetch_closes, report_filename, DateWindow, FetchOutcome, SYMBOLS},
    stockplotter::{ChartRenderer, StockPlotter},
    timeseries::PriceTable,
};

/// What became of the chart at the end of a run.
#[derive(Debug, PartialEq)]
pub enum ChartOutcome {
    Uploaded(String),
    UploadFailed { filename: String, reason: String },
    RenderFailed(String),
    NothingToPlot,
}

#[derive(Debug)]
pub struct RunSummary {
    pub table: PriceTable,
    pub empty: Vec<String>,
    pub failed: Vec<(String, FetchError)>,
    pub chart: ChartOutcome,
}

/// One pass over the symbol list: fetch, plot, upload.
pub struct StockReport<'a> {
    pub provider: &'a dyn DailyPrices,
    pub renderer: &'a dyn ChartRenderer,
    pub store: &'a dyn ObjectStore,
    pub symbols: &'a [&'a str],
    pub window: DateWindow,
}

impl StockReport<'_> {
    pub fn run(&self, throttle: &mut dyn Throttle) -> RunSummary {
        let mut table = PriceTable::new();
        let mut empty = Vec::new();
        let mut failed = Vec::new();

        for symbol in self.symbols {
            match fetch_closes(self.provider, symbol, &self.window) {
                FetchOutcome::Series(series) => {
                    info!("Fetched data for {} ({} closes)", symbol, series.len());
                    table.insert(series);
                }
                FetchOutcome::Empty => {
                    warn!("No data available for {}", symbol);
                    empty.push(symbol.to_string());
                }
                FetchOutcome::Failed(e) => {
                    warn!("No data available for {}", symbol);
                    failed.push((symbol.to_string(), e));
                }
            }
            // Unconditional, including after the last symbol.
            throttle.pause();
        }

        let chart = if table.is_empty() {
            warn!("No data available to plot or upload.");
            ChartOutcome::NothingToPlot
        } else {
            self.publish(&table)
        };

        RunSummary {
            table,
            empty,
            failed,
            chart,
        }
    }

    fn publish(&self, table: &PriceTable) -> ChartOutcome {
        let filename = report_filename(self.window.end);
        let png = match self.renderer.render(table) {
            Ok(png) => png,
            Err(e) => {
                error!("Error rendering plot: {}", e);
                return ChartOutcome::RenderFailed(e.to_string());
            }
        };

        match upload_chart(self.store, &png, &filename) {
            Ok(()) => {
                info!(
                    "Plot successfully uploaded to S3: {}/{}",
                    self.store.bucket_name(),
                    filename
                );
                ChartOutcome::Uploaded(filename)
            }
            Err(e) => {
                error!("Error uploading plot to S3: {}", e);
                ChartOutcome::UploadFailed {
                    filename,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Runs the report against the real provider and bucket for the past year.
pub fn run(config: &Config) -> error::Result<RunSummary> {
    let window = DateWindow::past_year();
    info!("Charting {} symbols from {} to {}", SYMBOLS.len(), window.start, window.end);

    let store = S3Store::from_config(config)?;
    let provider = AlphaVantage::with_key(&config.key);
    let plotter = StockPlotter::from_config(config);

    let report = StockReport {
        provider: &provider,
        renderer: &plotter,
        store: &store,
        symbols: &SYMBOLS,
        window,
    };
    Ok(report.run(&mut FixedDelay::default()))
}
