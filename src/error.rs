/// Errors raised by the dashboard's own table and configuration handling.
///
/// Provider failures never show up here: the fetchers swallow them into `None`
/// and a log line.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
