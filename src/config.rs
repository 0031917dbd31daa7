use std::{fmt, io::ErrorKind};

use toml::Value;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";
pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const BUCKET_VAR: &str = "S3_BUCKET_NAME";

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Optional, non-secret knobs read from `config.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub img_width: u32,
    pub img_height: u32,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            img_width: 1200,
            img_height: 600,
            region: None,
            endpoint: None,
        }
    }
}

impl Settings {
    /// Reads `path`; a missing file yields the defaults.
    pub fn read(path: &str) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) => match error.kind() {
                ErrorKind::NotFound => return Ok(Settings::default()),
                _ => return Err(ConfigError::Io(format!("{}: {}", path, error))),
            },
        };
        Settings::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config_toml = contents
            .parse::<Value>()
            .map_err(|e| ConfigError::Syntax(e.to_string()))?;

        let mut settings = Settings::default();
        if let Some(width) = get_u32(&config_toml, "chart", "width")? {
            settings.img_width = width;
        }
        if let Some(height) = get_u32(&config_toml, "chart", "height")? {
            settings.img_height = height;
        }
        settings.region = get_str(&config_toml, "store", "region")?;
        settings.endpoint = get_str(&config_toml, "store", "endpoint")?;
        Ok(settings)
    }
}

fn get_u32(toml: &Value, table: &str, key: &str) -> Result<Option<u32>, ConfigError> {
    let value = match toml.get(table).and_then(|t| t.get(key)) {
        Some(value) => value,
        None => return Ok(None),
    };
    let invalid = |reason: &str| ConfigError::InvalidSetting {
        key: format!("{}.{}", table, key),
        reason: reason.to_string(),
    };
    match value.as_integer() {
        Some(n) if n > 0 && n <= u32::MAX as i64 => Ok(Some(n as u32)),
        Some(_) => Err(invalid("must be a positive integer")),
        None => Err(invalid("expected an integer")),
    }
}

fn get_str(toml: &Value, table: &str, key: &str) -> Result<Option<String>, ConfigError> {
    match toml.get(table).and_then(|t| t.get(key)) {
        Some(value) => match value.as_str() {
            Some(s) => Ok(Some(s.to_string())),
            None => Err(ConfigError::InvalidSetting {
                key: format!("{}.{}", table, key),
                reason: "expected a string".to_string(),
            }),
        },
        None => Ok(None),
    }
}

/// Everything a run needs, built once at startup and passed by reference.
#[derive(Clone)]
pub struct Config {
    pub key: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub img_width: u32,
    pub img_height: u32,
}

impl Config {
    /// Loads `config.toml` (if any) and the process environment.
    pub fn read_config() -> Result<Self, ConfigError> {
        let settings = Settings::read(CONFIG_FILE)?;
        Config::from_lookup(
            |name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()),
            settings,
        )
    }

    /// Builds a config from an arbitrary variable source. Every missing
    /// required variable is reported, not just the first.
    pub fn from_lookup<F>(lookup: F, settings: Settings) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut require = |name: &'static str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let key = require(API_KEY_VAR);
        let aws_access_key_id = require(ACCESS_KEY_VAR);
        let aws_secret_access_key = require(SECRET_KEY_VAR);
        let bucket = require(BUCKET_VAR);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let region = lookup("AWS_REGION")
            .or_else(|| lookup("AWS_DEFAULT_REGION"))
            .or(settings.region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let endpoint = lookup("S3_ENDPOINT").or(settings.endpoint);

        Ok(Config {
            key,
            aws_access_key_id,
            aws_secret_access_key,
            bucket,
            region,
            endpoint,
            img_width: settings.img_width,
            img_height: settings.img_height,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("key", &"<redacted>")
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("img_width", &self.img_width)
            .field("img_height", &self.img_height)
            .finish()
    }
}
