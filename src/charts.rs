//! Chart descriptors handed to the front end, plus a plain-text rendering for
//! the terminal dashboard.

use crate::models::{OptionRecord, OptionType};
use crate::presenter;
use serde::Serialize;
use std::fmt::Write;

pub const CALL_COLOR: &str = "green";
pub const PUT_COLOR: &str = "red";
pub const RATIO_COLOR: &str = "orange";
pub const NEUTRAL_RATIO: f64 = 1.0;

const TEXT_BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub percent: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub value: f64,
    pub label: String,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie {
        title: String,
        slices: Vec<PieSlice>,
    },
    GroupedBar {
        title: String,
        x_label: String,
        y_label: String,
        categories: Vec<f64>,
        series: Vec<BarSeries>,
    },
    SingleBar {
        title: String,
        label: String,
        value: f64,
        y_label: String,
        color: String,
        reference: ReferenceLine,
    },
    /// Placeholder shown where a chart had nothing to plot.
    Empty { title: String, message: String },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Pie { title, .. }
            | ChartSpec::GroupedBar { title, .. }
            | ChartSpec::SingleBar { title, .. }
            | ChartSpec::Empty { title, .. } => title,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartSpec::Empty { .. })
    }
}

fn side_color(option_type: OptionType) -> &'static str {
    if option_type.is_call() { CALL_COLOR } else { PUT_COLOR }
}

/// Open-interest share per type.
pub fn open_interest_pie(records: &[OptionRecord], title: impl Into<String>) -> ChartSpec {
    let title = title.into();
    let summary = presenter::summarize_open_interest(records);
    let total: f64 = summary.values().sum();

    if summary.is_empty() || total <= 0.0 {
        return ChartSpec::Empty {
            title,
            message: "No Open Interest Data".to_string(),
        };
    }

    let slices = summary
        .into_iter()
        .map(|(option_type, value)| PieSlice {
            label: option_type.label().to_string(),
            value,
            percent: value / total * 100.0,
            color: side_color(option_type).to_string(),
        })
        .collect();

    ChartSpec::Pie { title, slices }
}

/// Grouped bars of volume for the most active strikes, one series per type.
pub fn volume_by_strike_chart(records: &[OptionRecord], top_n: usize, title: impl Into<String>) -> ChartSpec {
    let title = title.into();
    let strikes = presenter::top_strikes_by_volume(records, top_n);
    let bars = presenter::volume_by_strike(records, &strikes);
    let total: f64 = bars.iter().flat_map(|b| b.volumes.values()).sum();

    if bars.is_empty() || total <= 0.0 {
        return ChartSpec::Empty {
            title,
            message: "No Volume Data".to_string(),
        };
    }

    let mut types: Vec<OptionType> = records.iter().map(|r| r.option_type).collect();
    types.sort();
    types.dedup();

    let series = types
        .into_iter()
        .map(|option_type| BarSeries {
            name: option_type.label().to_string(),
            color: side_color(option_type).to_string(),
            values: bars
                .iter()
                .map(|b| b.volumes.get(&option_type).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    ChartSpec::GroupedBar {
        title,
        x_label: "Strike Price".to_string(),
        y_label: "Volume".to_string(),
        categories: strikes,
        series,
    }
}

/// Single put/call ratio bar against the neutral line.
pub fn put_call_ratio_chart(records: &[OptionRecord], name: &str) -> ChartSpec {
    match presenter::put_call_ratio(records) {
        Some(ratio) => ChartSpec::SingleBar {
            title: format!("{} Put-Call Ratio: {:.2}", name, ratio),
            label: "Put-Call Ratio".to_string(),
            value: ratio,
            y_label: "Ratio".to_string(),
            color: RATIO_COLOR.to_string(),
            reference: ReferenceLine {
                value: NEUTRAL_RATIO,
                label: "Neutral (1.0)".to_string(),
                dashed: true,
            },
        },
        None => ChartSpec::Empty {
            title: format!("{} Put-Call Ratio", name),
            message: "Insufficient data for Put-Call Ratio".to_string(),
        },
    }
}

// -----------------------------------------------
// TERMINAL RENDERING
// -----------------------------------------------

fn bar(value: f64, max: f64) -> String {
    let filled = if max > 0.0 {
        ((value / max) * TEXT_BAR_WIDTH as f64).round() as usize
    } else {
        0
    };
    "#".repeat(filled.min(TEXT_BAR_WIDTH))
}

pub fn render_text(chart: &ChartSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", chart.title());

    match chart {
        ChartSpec::Pie { slices, .. } => {
            for s in slices {
                let _ = writeln!(
                    out,
                    "  {:<5} {:>6.1}%  {}",
                    s.label,
                    s.percent,
                    bar(s.percent, 100.0)
                );
            }
        }
        ChartSpec::GroupedBar { categories, series, .. } => {
            let max = series
                .iter()
                .flat_map(|s| s.values.iter().copied())
                .fold(0.0, f64::max);
            for (idx, strike) in categories.iter().enumerate() {
                for s in series {
                    let value = s.values.get(idx).copied().unwrap_or(0.0);
                    let _ = writeln!(
                        out,
                        "  {:>10.2} {:<4} {:>12.0}  {}",
                        strike,
                        s.name,
                        value,
                        bar(value, max)
                    );
                }
            }
        }
        ChartSpec::SingleBar { label, value, reference, .. } => {
            let max = value.max(reference.value) * 1.25;
            let _ = writeln!(out, "  {:<16} {:>6.2}  {}", label, value, bar(*value, max));
            let _ = writeln!(
                out,
                "  {:<16} {:>6.2}  {}",
                reference.label,
                reference.value,
                "-".repeat(bar(reference.value, max).len())
            );
        }
        ChartSpec::Empty { message, .. } => {
            let _ = writeln!(out, "  {}", message);
        }
    }

    out
}
