//! Per-market pipelines: fetch, shape, aggregate and package everything a
//! front end needs to draw one dashboard tab.

use crate::app_config::{DashboardConfig, PageLayout};
use crate::charts::{self, ChartSpec};
use crate::error::{DashboardError, Result};
use crate::models::{OptionRecord, Quote};
use crate::nse::{self, NSEClient};
use crate::table::{self, TableFilter};
use crate::us::{self, OptionsChain, YahooClient};
use crate::utility::Timer;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

pub const US_IDLE_PROMPT: &str =
    "Select a US stock symbol and fetch US options data to begin.";

// -----------------------------------------------
// VIEW MODELS
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A message shown in place of (or next to) data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsDashboard {
    pub symbol: String,
    pub layout: PageLayout,
    /// "Apple Inc. (AAPL)" when the quote lookup succeeded.
    pub heading: Option<String>,
    pub quote: Option<Quote>,
    pub metrics: Vec<Metric>,
    pub expiration_date: Option<String>,
    pub charts: Vec<ChartSpec>,
    pub records: Vec<OptionRecord>,
    pub notices: Vec<Notice>,
}

impl UsDashboard {
    fn empty(config: &DashboardConfig, symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            layout: config.layout,
            heading: None,
            quote: None,
            metrics: Vec::new(),
            expiration_date: None,
            charts: Vec::new(),
            records: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Nothing fetched yet.
    pub fn idle(config: &DashboardConfig) -> Self {
        let mut dashboard = Self::empty(config, "");
        dashboard.notices.push(Notice::info(US_IDLE_PROMPT));
        dashboard
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSummary {
    pub total_contracts: usize,
    pub call_count: usize,
    pub put_count: usize,
    pub underlying_value: Option<f64>,
}

impl IndexSummary {
    pub fn from_records(records: &[OptionRecord]) -> Self {
        let call_count = records.iter().filter(|r| r.option_type.is_call()).count();
        Self {
            total_contracts: records.len(),
            call_count,
            put_count: records.len() - call_count,
            underlying_value: records.iter().find_map(|r| r.underlying),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NiftyDashboard {
    pub index: String,
    pub layout: PageLayout,
    pub summary: Option<IndexSummary>,
    pub metrics: Vec<Metric>,
    pub charts: Vec<ChartSpec>,
    /// Whole-number strike bounds of the unfiltered table.
    pub strike_range: Option<(i64, i64)>,
    pub filter: TableFilter,
    pub total_rows: usize,
    pub records: Vec<OptionRecord>,
    pub download_file_name: Option<String>,
    pub notices: Vec<Notice>,
}

impl NiftyDashboard {
    fn empty(config: &DashboardConfig, filter: &TableFilter) -> Self {
        Self {
            index: config.index_name.clone(),
            layout: config.layout,
            summary: None,
            metrics: Vec::new(),
            charts: Vec::new(),
            strike_range: None,
            filter: filter.clone(),
            total_rows: 0,
            records: Vec::new(),
            download_file_name: None,
            notices: Vec::new(),
        }
    }

    /// Nothing fetched yet.
    pub fn idle(config: &DashboardConfig) -> Self {
        let mut dashboard = Self::empty(config, &TableFilter::default());
        dashboard.notices.push(Notice::info(index_idle_prompt(&config.index_name)));
        dashboard
    }
}

pub fn index_idle_prompt(index: &str) -> String {
    format!(
        "Fetch {} options data to load the latest {} options chain data.",
        index, index
    )
}

pub fn index_fetch_failed(index: &str) -> String {
    format!("Failed to fetch {} options data.", index)
}

pub fn index_empty_table(index: &str) -> String {
    format!("Could not process {} options data.", index)
}

// -----------------------------------------------
// FORMATTING
// -----------------------------------------------

pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn format_market_cap(value: f64) -> String {
    format!("${:.2}T", value / 1e12)
}

/// `₹24,512.35`
pub fn format_inr(value: f64) -> String {
    format!("₹{}", group_thousands(value))
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

// -----------------------------------------------
// PIPELINE ASSEMBLY
// -----------------------------------------------

/// Reject symbols outside the configured list before any request goes out.
pub fn check_symbol(config: &DashboardConfig, symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_ascii_uppercase();
    if config.is_offered(&symbol) {
        Ok(symbol)
    } else {
        Err(DashboardError::UnknownSymbol(symbol))
    }
}

pub fn quote_metrics(quote: &Quote) -> Vec<Metric> {
    vec![
        Metric::new("Current Price", format_usd(quote.current_price)),
        Metric::new("Market Cap", format_market_cap(quote.market_cap)),
        Metric::new("Sector", quote.sector.clone()),
    ]
}

pub fn index_metrics(index: &str, summary: &IndexSummary) -> Vec<Metric> {
    vec![
        Metric::new("Total Contracts", summary.total_contracts.to_string()),
        Metric::new("Call Options (CE)", summary.call_count.to_string()),
        Metric::new("Put Options (PE)", summary.put_count.to_string()),
        Metric::new(
            format!("{} Value", index),
            summary
                .underlying_value
                .map(format_inr)
                .unwrap_or_else(|| "N/A".to_string()),
        ),
    ]
}

/// Assemble the US tab from whatever the fetchers returned.
pub fn build_us_dashboard(
    config: &DashboardConfig,
    symbol: &str,
    quote: Option<Quote>,
    chain: Option<&OptionsChain>,
) -> UsDashboard {
    let mut dashboard = UsDashboard::empty(config, symbol);

    if let Some(q) = &quote {
        dashboard.heading = Some(format!("{} ({})", q.name, q.symbol));
        dashboard.metrics = quote_metrics(q);
    }
    dashboard.quote = quote;

    let Some(chain) = chain else {
        dashboard
            .notices
            .push(Notice::warning(format!("Could not fetch options data for {}.", symbol)));
        return dashboard;
    };

    dashboard.expiration_date = Some(chain.expiration_date.clone());
    let records = us::flatten_equity_chain(chain);
    if records.is_empty() {
        dashboard
            .notices
            .push(Notice::warning("Could not process options data."));
        return dashboard;
    }

    dashboard.charts = vec![
        charts::open_interest_pie(&records, format!("Open Interest Distribution for {}", symbol)),
        charts::volume_by_strike_chart(
            &records,
            config.top_n,
            format!(
                "Volume by Strike Price for {} (Top {} Active Strikes)",
                symbol, config.top_n
            ),
        ),
    ];
    dashboard.records = records;
    dashboard
}

/// Assemble the index tab. `records` is `None` when the fetch failed.
pub fn build_nifty_dashboard(
    config: &DashboardConfig,
    records: Option<Vec<OptionRecord>>,
    filter: &TableFilter,
    now: NaiveDateTime,
) -> NiftyDashboard {
    let index = config.index_name.as_str();
    let mut dashboard = NiftyDashboard::empty(config, filter);

    let Some(records) = records else {
        dashboard.notices.push(Notice::warning(index_fetch_failed(index)));
        return dashboard;
    };
    if records.is_empty() {
        dashboard.notices.push(Notice::warning(index_empty_table(index)));
        return dashboard;
    }

    let summary = IndexSummary::from_records(&records);
    dashboard.metrics = index_metrics(index, &summary);
    dashboard.summary = Some(summary);

    dashboard.charts = vec![
        charts::open_interest_pie(&records, format!("{} Open Interest Distribution", index)),
        charts::put_call_ratio_chart(&records, index),
        charts::volume_by_strike_chart(
            &records,
            config.top_n,
            format!("{} Volume by Strike Price (Top {} Active Strikes)", index, config.top_n),
        ),
    ];

    dashboard.strike_range = table::strike_range(&records);
    dashboard.total_rows = records.len();
    dashboard.records = match table::apply_filter(&records, filter) {
        Ok(filtered) => filtered,
        Err(e) => {
            dashboard.notices.push(Notice::warning(e.to_string()));
            records
        }
    };
    dashboard.download_file_name = Some(table::export_file_name(&config.export_prefix(), now));
    dashboard
}

// -----------------------------------------------
// DASHBOARD (CLIENTS + CONFIG)
// -----------------------------------------------

/// Both market clients plus the settings every view is rendered with.
pub struct Dashboard {
    config: DashboardConfig,
    yahoo: YahooClient,
    nse: NSEClient,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> anyhow::Result<Self> {
        let yahoo = YahooClient::new(config.http_timeout)?;
        let nse = NSEClient::new(config.http_timeout)?;
        Ok(Self::with_clients(config, yahoo, nse))
    }

    pub fn with_clients(config: DashboardConfig, yahoo: YahooClient, nse: NSEClient) -> Self {
        Self { config, yahoo, nse }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// One "Fetch US Options Data" press.
    pub async fn us_dashboard(&self, symbol: &str) -> UsDashboard {
        let symbol = match check_symbol(&self.config, symbol) {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!(symbol, "Rejected symbol outside the configured list");
                let mut dashboard = UsDashboard::empty(&self.config, symbol.trim());
                dashboard.notices.push(Notice::warning(format!(
                    "{}. Choose one of: {}",
                    e,
                    self.config.us_symbols.join(", ")
                )));
                return dashboard;
            }
        };

        let _timer = Timer::start(format!("US dashboard {}", symbol));
        info!(%symbol, "Fetching US options data");

        let quote = self.yahoo.fetch_quote(&symbol).await;
        let chain = self.yahoo.fetch_nearest_expiration_chain(&symbol).await;
        build_us_dashboard(&self.config, &symbol, quote, chain.as_ref())
    }

    /// Shaped index table, `None` when the fetch failed.
    pub async fn index_records(&self, now: NaiveDateTime) -> Option<Vec<OptionRecord>> {
        let index = self.config.index_name.as_str();
        let payload = self.nse.fetch_index_chain(index).await?;
        Some(nse::flatten_index_chain(index, &payload, now))
    }

    /// One "Fetch NIFTY Options Data" press.
    pub async fn nifty_dashboard(&self, filter: &TableFilter) -> NiftyDashboard {
        let _timer = Timer::start(format!("{} dashboard", self.config.index_name));
        info!(index = %self.config.index_name, "Fetching index options data");

        let now = Local::now().naive_local();
        let records = self.index_records(now).await;
        build_nifty_dashboard(&self.config, records, filter, now)
    }
}
