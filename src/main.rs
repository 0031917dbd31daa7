use stock_visualizer::{config::Config, ChartOutcome};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stock_visualizer=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    dotenv::dotenv().ok();
    init_logging();

    let config = match Config::read_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Environment validation error: {}", e);
            return;
        }
    };

    match stock_visualizer::run(&config) {
        Ok(summary) => {
            info!(
                "Run finished: {} charted, {} empty, {} failed",
                summary.table.len(),
                summary.empty.len(),
                summary.failed.len()
            );
            if let ChartOutcome::Uploaded(name) = summary.chart {
                info!("Chart available as {}", name);
            }
        }
        Err(e) => error!("An unexpected error occurred: {}", e),
    }
}
