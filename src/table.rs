use crate::error::{DashboardError, Result};
use crate::models::OptionRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Option-type choice of the table filter. `Puts` covers both PE and Put rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Calls,
    Puts,
}

impl TypeFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "ALL" => Some(TypeFilter::All),
            "CE" | "CALL" | "CALLS" => Some(TypeFilter::Calls),
            "PE" | "PUT" | "PUTS" => Some(TypeFilter::Puts),
            _ => None,
        }
    }

    fn accepts(self, record: &OptionRecord) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Calls => record.option_type.is_call(),
            TypeFilter::Puts => record.option_type.is_put(),
        }
    }
}

/// Post-fetch table filter. Strike bounds are inclusive; an absent bound is open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableFilter {
    pub option_type: TypeFilter,
    pub min_strike: Option<f64>,
    pub max_strike: Option<f64>,
}

impl TableFilter {
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_strike, self.max_strike) {
            if min > max {
                return Err(DashboardError::InvalidFilter(format!(
                    "min strike {} is above max strike {}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    fn accepts(&self, record: &OptionRecord) -> bool {
        self.option_type.accepts(record)
            && self.min_strike.is_none_or(|min| record.strike >= min)
            && self.max_strike.is_none_or(|max| record.strike <= max)
    }
}

/// Whole-number strike bounds of a table, the default range of the strike filter.
pub fn strike_range(records: &[OptionRecord]) -> Option<(i64, i64)> {
    let min = records.iter().map(|r| r.strike).min_by(|a, b| a.total_cmp(b))?;
    let max = records.iter().map(|r| r.strike).max_by(|a, b| a.total_cmp(b))?;
    Some((min.floor() as i64, max.floor() as i64))
}

/// Rows accepted by `filter`, order preserved.
pub fn apply_filter(records: &[OptionRecord], filter: &TableFilter) -> Result<Vec<OptionRecord>> {
    filter.validate()?;
    Ok(records.iter().filter(|r| filter.accepts(r)).cloned().collect())
}

// -----------------------------------------------
// CSV EXPORT
// -----------------------------------------------

/// CSV text with a header row, even for an empty table.
pub fn to_csv(records: &[OptionRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(crate::models::RECORD_COLUMNS)?;
    for r in records {
        writer.serialize(r)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| DashboardError::Io(std::io::Error::other(e)))
}

pub fn from_csv(text: &str) -> Result<Vec<OptionRecord>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<OptionRecord>, _>>()?;
    Ok(rows)
}

/// `<prefix>_YYYYMMDD_HHMMSS.csv`
pub fn export_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{}_{}.csv", prefix, now.format(EXPORT_TIMESTAMP_FORMAT))
}

/// Write the table to a timestamped file inside `dir`, returning its path.
pub fn write_csv(dir: &Path, prefix: &str, records: &[OptionRecord], now: NaiveDateTime) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(prefix, now));
    std::fs::write(&path, to_csv(records)?)?;
    Ok(path)
}
