use crate::models::{OptionRecord, OptionType};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_TOP_STRIKES: usize = 20;

/// Total open interest per option type. Missing open interest counts as zero.
pub fn summarize_open_interest(records: &[OptionRecord]) -> BTreeMap<OptionType, f64> {
    let mut summary = BTreeMap::new();
    for r in records {
        *summary.entry(r.option_type).or_insert(0.0) += r.open_interest_or_zero();
    }
    summary
}

/// Summed volume per strike across types, strikes ascending.
pub fn volume_per_strike(records: &[OptionRecord]) -> Vec<(f64, f64)> {
    let mut pairs: Vec<(f64, f64)> = records
        .iter()
        .map(|r| (r.strike, r.volume_or_zero()))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut grouped: Vec<(f64, f64)> = Vec::new();
    for (strike, volume) in pairs {
        match grouped.last_mut() {
            Some((last, total)) if last.total_cmp(&strike) == Ordering::Equal => *total += volume,
            _ => grouped.push((strike, volume)),
        }
    }
    grouped
}

/// The `n` most traded strikes, returned ascending.
///
/// Ranking is by summed volume; equal volumes rank the lower strike first.
pub fn top_strikes_by_volume(records: &[OptionRecord], n: usize) -> Vec<f64> {
    let mut ranked = volume_per_strike(records);
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.total_cmp(&b.0)));
    ranked.truncate(n);

    let mut strikes: Vec<f64> = ranked.into_iter().map(|(strike, _)| strike).collect();
    strikes.sort_by(|a, b| a.total_cmp(b));
    strikes
}

/// Per-type volume at one strike, for the grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrikeVolume {
    pub strike: f64,
    pub volumes: BTreeMap<OptionType, f64>,
}

/// Volume split by type for the given strikes (kept in the given order).
pub fn volume_by_strike(records: &[OptionRecord], strikes: &[f64]) -> Vec<StrikeVolume> {
    strikes
        .iter()
        .map(|&strike| {
            let mut volumes = BTreeMap::new();
            for r in records.iter().filter(|r| r.strike.total_cmp(&strike) == Ordering::Equal) {
                *volumes.entry(r.option_type).or_insert(0.0) += r.volume_or_zero();
            }
            StrikeVolume { strike, volumes }
        })
        .collect()
}

/// Put open interest over call open interest.
///
/// `None` when there is no call open interest to divide by.
pub fn put_call_ratio(records: &[OptionRecord]) -> Option<f64> {
    let (calls, puts) = records.iter().fold((0.0, 0.0), |(calls, puts), r| {
        if r.option_type.is_call() {
            (calls + r.open_interest_or_zero(), puts)
        } else {
            (calls, puts + r.open_interest_or_zero())
        }
    });

    if calls > 0.0 && calls.is_finite() {
        Some(puts / calls)
    } else {
        None
    }
}
