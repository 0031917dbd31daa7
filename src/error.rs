use thiserror::Error;

/// Problems found while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("problem reading config file: {0}")]
    Io(String),

    #[error("please check your config.toml syntax: {0}")]
    Syntax(String),

    #[error("invalid value for '{key}' in config.toml: {reason}")]
    InvalidSetting { key: String, reason: String },
}

/// Why a symbol produced no price history.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} from data provider")]
    Http { status: u16 },

    #[error("provider rejected request: {0}")]
    Provider(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no series with data to plot")]
    NoData,

    #[error("failed to draw chart: {0}")]
    Draw(String),

    #[error("failed to encode chart as PNG: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to initialise object store client: {0}")]
    Init(String),

    #[error("upload of '{name}' failed: {reason}")]
    Upload { name: String, reason: String },

    #[error("upload of '{name}' returned HTTP {status}")]
    Status { name: String, status: u16 },
}

/// Errors that end a run early. Everything else is logged and absorbed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("object store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, AppError>;
