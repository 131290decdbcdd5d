use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Option side as labelled by the feed it came from.
///
/// The US feed says `Call`/`Put`, the NSE feed says `CE`/`PE`. Within one feed
/// calls always order before puts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
    #[serde(rename = "CE")]
    Ce,
    #[serde(rename = "PE")]
    Pe,
}

impl OptionType {
    pub fn is_call(self) -> bool {
        matches!(self, OptionType::Call | OptionType::Ce)
    }

    pub fn is_put(self) -> bool {
        !self.is_call()
    }

    pub fn label(self) -> &'static str {
        match self {
            OptionType::Call => "Call",
            OptionType::Put => "Put",
            OptionType::Ce => "CE",
            OptionType::Pe => "PE",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Call" | "call" | "CALL" => Some(OptionType::Call),
            "Put" | "put" | "PUT" => Some(OptionType::Put),
            "CE" | "ce" => Some(OptionType::Ce),
            "PE" | "pe" => Some(OptionType::Pe),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One flattened option-chain row.
///
/// Carries the union of both markets' columns; a column the source market does
/// not report stays `None` and exports as an empty cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,

    #[serde(rename = "Type")]
    pub option_type: OptionType,

    #[serde(rename = "Strike")]
    pub strike: f64,

    #[serde(rename = "Last_Price")]
    pub last_price: Option<f64>,

    #[serde(rename = "Bid")]
    pub bid: Option<f64>,

    #[serde(rename = "Ask")]
    pub ask: Option<f64>,

    #[serde(rename = "Volume")]
    pub volume: Option<f64>,

    #[serde(rename = "Open_Interest")]
    pub open_interest: Option<f64>,

    #[serde(rename = "Implied_Volatility")]
    pub implied_volatility: Option<f64>,

    #[serde(rename = "Change_in_OI")]
    pub change_in_oi: Option<f64>,

    #[serde(rename = "Underlying")]
    pub underlying: Option<f64>,

    #[serde(rename = "Expiration_Date")]
    pub expiration_date: Option<String>,

    #[serde(rename = "Timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

/// Column order of [`OptionRecord`] as written to CSV.
pub const RECORD_COLUMNS: &[&str] = &[
    "Symbol",
    "Type",
    "Strike",
    "Last_Price",
    "Bid",
    "Ask",
    "Volume",
    "Open_Interest",
    "Implied_Volatility",
    "Change_in_OI",
    "Underlying",
    "Expiration_Date",
    "Timestamp",
];

impl OptionRecord {
    pub fn volume_or_zero(&self) -> f64 {
        self.volume.unwrap_or(0.0)
    }

    pub fn open_interest_or_zero(&self) -> f64 {
        self.open_interest.unwrap_or(0.0)
    }

    /// Display order: option type, then strike ascending.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.option_type
            .cmp(&other.option_type)
            .then_with(|| self.strike.total_cmp(&other.strike))
    }
}

/// Sort rows into display order (stable).
pub fn sort_for_display(records: &mut [OptionRecord]) {
    records.sort_by(OptionRecord::display_cmp);
}

/// Snapshot of a US equity looked up for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub sector: String,
    pub industry: String,
}
