//! Agent configuration
//!
//! Built once at startup and injected into the pipeline. Credentials are
//! required up front so a missing key fails before any question is read.

use crate::error::AgentError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_WINDOW_YEARS: u32 = 4;
pub const MAX_WINDOW_YEARS: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org";

/// Fixed year length used for the trailing window; leap days are ignored.
pub const DAYS_PER_YEAR: i64 = 365;

/// An indicator code offered to the model as an example, with an optional
/// human-readable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleCode {
    pub code: String,
    pub label: Option<String>,
}

impl ExampleCode {
    pub fn new(code: &str, label: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            label: label.map(str::to_string),
        }
    }

    /// Parses `CODE` or `CODE=label`.
    fn parse(raw: &str) -> Option<Self> {
        let (code, label) = match raw.split_once('=') {
            Some((code, label)) => (code.trim(), Some(label.trim())),
            None => (raw.trim(), None),
        };

        if code.is_empty() {
            return None;
        }

        Some(Self::new(code, label.filter(|l| !l.is_empty())))
    }
}

pub fn default_example_codes() -> Vec<ExampleCode> {
    vec![
        ExampleCode::new("UNRATE", Some("unemployment")),
        ExampleCode::new("FPCPITOTLZGUSA", Some("CPI inflation")),
        ExampleCode::new("GDP", None),
        ExampleCode::new("DFF", Some("fed funds rate")),
    ]
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub gemini_api_key: String,
    pub fred_api_key: String,
    pub model: String,
    pub gemini_base_url: String,
    pub fred_base_url: String,
    pub window_years: u32,
    pub example_codes: Vec<ExampleCode>,
    pub request_timeout: Duration,
}

impl AgentConfig {
    /// Config with defaults for everything but the two credentials.
    pub fn new(gemini_api_key: impl Into<String>, fred_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            fred_api_key: fred_api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            fred_base_url: DEFAULT_FRED_BASE_URL.to_string(),
            window_years: DEFAULT_WINDOW_YEARS,
            example_codes: default_example_codes(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let fred_api_key = get("FRED_API_KEY")
            .ok_or_else(|| AgentError::Config("FRED_API_KEY not set".to_string()))?;

        let gemini_api_key = get("GOOGLE_API_KEY")
            .or_else(|| get("GEMINI_API_KEY"))
            .ok_or_else(|| {
                AgentError::Config("GOOGLE_API_KEY (or GEMINI_API_KEY) not set".to_string())
            })?;

        let mut config = Self::new(gemini_api_key, fred_api_key);

        if let Some(model) = get("ECONDATA_MODEL") {
            config.model = model;
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            config.gemini_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("FRED_BASE_URL") {
            config.fred_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(years) = get("ECONDATA_WINDOW_YEARS") {
            config.window_years = parse_number("ECONDATA_WINDOW_YEARS", &years)?;
            if !(1..=MAX_WINDOW_YEARS).contains(&config.window_years) {
                return Err(AgentError::Config(format!(
                    "ECONDATA_WINDOW_YEARS must be between 1 and {}",
                    MAX_WINDOW_YEARS
                )));
            }
        }
        if let Some(secs) = get("ECONDATA_TIMEOUT_SECS") {
            let secs: u64 = parse_number("ECONDATA_TIMEOUT_SECS", &secs)?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(codes) = get("ECONDATA_EXAMPLE_CODES") {
            let parsed: Vec<ExampleCode> = codes.split(',').filter_map(ExampleCode::parse).collect();
            if parsed.is_empty() {
                return Err(AgentError::Config(
                    "ECONDATA_EXAMPLE_CODES contains no codes".to_string(),
                ));
            }
            config.example_codes = parsed;
        }

        Ok(config)
    }

    /// Length of the trailing observation window in days.
    pub fn window_days(&self) -> i64 {
        i64::from(self.window_years) * DAYS_PER_YEAR
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| AgentError::Config(format!("{} is not a valid number: {}", key, raw)))
}
