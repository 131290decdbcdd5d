use crate::error::DashboardError;
use crate::nse::config as nse_config;
use crate::presenter::DEFAULT_TOP_STRIKES;
use crate::table::{TableFilter, TypeFilter};
use crate::us::config as us_config;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_EXPORT_DIR: &str = "exports";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Which surface the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Us,
    Nifty,
    Server,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Some(Mode::Us),
            "nifty" | "india" => Some(Mode::Nifty),
            "server" => Some(Mode::Server),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    #[default]
    Wide,
    Centered,
}

impl std::str::FromStr for PageLayout {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wide" => Ok(PageLayout::Wide),
            "centered" => Ok(PageLayout::Centered),
            other => Err(DashboardError::Config(format!("unknown page layout '{}'", other))),
        }
    }
}

/// Settings every dashboard view is rendered with.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardConfig {
    pub layout: PageLayout,
    pub us_symbols: Vec<String>,
    pub index_name: String,
    pub top_n: usize,
    pub export_dir: PathBuf,
    #[serde(skip)]
    pub http_timeout: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            layout: PageLayout::Wide,
            us_symbols: us_config::US_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            index_name: nse_config::DEFAULT_INDEX.to_string(),
            top_n: DEFAULT_TOP_STRIKES,
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            http_timeout: None,
        }
    }
}

impl DashboardConfig {
    pub fn is_offered(&self, symbol: &str) -> bool {
        self.us_symbols.iter().any(|s| s == symbol)
    }

    /// File name prefix of the index table download, e.g. `nifty_options`.
    pub fn export_prefix(&self) -> String {
        format!("{}_options", self.index_name.to_ascii_lowercase())
    }
}

/// Application configuration handler
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub port: u16,
    pub symbol: String,
    pub filter: TableFilter,
    pub log_dir: PathBuf,
    pub dashboard: DashboardConfig,
    /// Values that could not be parsed and were replaced by defaults.
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Create new configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match get("DASH_MODE") {
            Some(raw) => Mode::parse(&raw).unwrap_or_else(|| {
                warnings.push(format!("DASH_MODE '{}' not recognised, using server", raw));
                Mode::Server
            }),
            None => Mode::Server,
        };

        let port = parse_or(&mut warnings, "DASH_PORT", get("DASH_PORT"), DEFAULT_PORT);

        let mut dashboard = DashboardConfig::default();

        if let Some(raw) = get("DASH_LAYOUT") {
            dashboard.layout = raw.parse::<PageLayout>().unwrap_or_else(|e| {
                warnings.push(format!("DASH_LAYOUT: {}, using wide", e));
                PageLayout::Wide
            });
        }

        if let Some(raw) = get("DASH_SYMBOLS") {
            let symbols: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !symbols.is_empty() {
                dashboard.us_symbols = symbols;
            }
        }

        if let Some(raw) = get("DASH_INDEX") {
            dashboard.index_name = raw.trim().to_ascii_uppercase();
        }

        let top_n = parse_or(&mut warnings, "DASH_TOP_N", get("DASH_TOP_N"), DEFAULT_TOP_STRIKES);
        dashboard.top_n = top_n.max(1);

        if let Some(raw) = get("DASH_EXPORT_DIR") {
            dashboard.export_dir = PathBuf::from(raw);
        }

        if let Some(raw) = get("DASH_HTTP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => dashboard.http_timeout = Some(Duration::from_secs(secs)),
                _ => warnings.push(format!(
                    "DASH_HTTP_TIMEOUT_SECS '{}' is not a positive number, leaving the client default",
                    raw
                )),
            }
        }

        let symbol = get("DASH_SYMBOL")
            .map(|s| s.trim().to_ascii_uppercase())
            .unwrap_or_else(|| us_config::DEFAULT_SYMBOL.to_string());

        let option_type = match get("DASH_OPTION_TYPE") {
            Some(raw) => TypeFilter::parse(&raw).unwrap_or_else(|| {
                warnings.push(format!("DASH_OPTION_TYPE '{}' not recognised, using All", raw));
                TypeFilter::All
            }),
            None => TypeFilter::All,
        };

        let min_strike = get("DASH_MIN_STRIKE").and_then(|raw| parse_optional(&mut warnings, "DASH_MIN_STRIKE", &raw));
        let max_strike = get("DASH_MAX_STRIKE").and_then(|raw| parse_optional(&mut warnings, "DASH_MAX_STRIKE", &raw));

        let log_dir = get("DASH_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        Self {
            mode,
            port,
            symbol,
            filter: TableFilter {
                option_type,
                min_strike,
                max_strike,
            },
            log_dir,
            dashboard,
            warnings,
        }
    }

    /// Print the effective configuration and log anything that fell back to a default.
    pub fn log_config(&self) {
        println!("{} Mode: {}", "→".cyan(), format!("{:?}", self.mode).yellow());
        if self.mode == Mode::Server {
            println!("{} Port: {}", "→".cyan(), self.port.to_string().yellow());
        }
        for w in &self.warnings {
            warn!("{}", w);
        }
    }
}

fn parse_or<T: std::str::FromStr>(warnings: &mut Vec<String>, key: &str, raw: Option<String>, default: T) -> T
where
    T: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warnings.push(format!("{} '{}' is invalid, using {}", key, raw, default));
            default
        }),
        None => default,
    }
}

fn parse_optional(warnings: &mut Vec<String>, key: &str, raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warnings.push(format!("{} '{}' is not a number, ignoring", key, raw));
            None
        }
    }
}
