pub mod api_server_axum;
pub mod app_config;
pub mod charts;
pub mod dashboard;
pub mod dashboard_commands;
pub mod error;
pub mod logging;
pub mod models;
pub mod nse;
pub mod presenter;
pub mod table;
pub mod us;
pub mod utility;

// Re-exports for convenience
pub use app_config::{AppConfig, DashboardConfig, Mode, PageLayout};
pub use charts::ChartSpec;
pub use dashboard::{Dashboard, NiftyDashboard, Notice, NoticeLevel, UsDashboard};
pub use error::{DashboardError, Result};
pub use models::{OptionRecord, OptionType, Quote};
pub use nse::NSEClient;
pub use table::{TableFilter, TypeFilter};
pub use us::YahooClient;
