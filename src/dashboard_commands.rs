use crate::api_server_axum;
use crate::app_config::DashboardConfig;
use crate::charts;
use crate::dashboard::{Dashboard, Metric, NiftyDashboard, Notice, NoticeLevel, UsDashboard};
use crate::models::OptionRecord;
use crate::table::{self, TableFilter};

use anyhow::Result;
use chrono::Local;
use colored::Colorize;

/// Terminal dashboard - one pipeline run per invocation
pub struct DashboardCommands;

impl DashboardCommands {
    /// Fetch and print the US tab for one symbol
    pub async fn run_us(config: DashboardConfig, symbol: &str) -> Result<()> {
        Self::banner("US Market Options Analysis");

        let dashboard = Dashboard::new(config)?;
        println!("{} Fetching data for {}...", "→".cyan(), symbol.yellow());
        println!();

        let view = dashboard.us_dashboard(symbol).await;
        Self::display_us(&view);

        Self::footer();
        Ok(())
    }

    /// Fetch and print the index tab, then save the filtered table as CSV
    pub async fn run_nifty(config: DashboardConfig, filter: TableFilter) -> Result<()> {
        Self::banner("Indian Market Options Analysis");

        let export_dir = config.export_dir.clone();
        let prefix = config.export_prefix();
        let dashboard = Dashboard::new(config)?;
        println!(
            "{} Fetching {} options data...",
            "→".cyan(),
            dashboard.config().index_name.yellow()
        );
        println!();

        let view = dashboard.nifty_dashboard(&filter).await;
        Self::display_nifty(&view);

        if view.summary.is_some() {
            let path = table::write_csv(&export_dir, &prefix, &view.records, Local::now().naive_local())?;
            println!(
                "{} Saved {} rows to {}",
                "✓".green(),
                view.records.len(),
                path.display().to_string().yellow()
            );
        }

        Self::footer();
        Ok(())
    }

    /// Run API server mode
    pub async fn run_server(config: DashboardConfig, port: u16) -> Result<()> {
        Self::banner("Options Dashboard API Server");
        api_server_axum::start_server(config, port).await
    }

    // -----------------------------------------------
    // DISPLAY HELPERS
    // -----------------------------------------------

    fn banner(title: &str) {
        println!("{}", "=".repeat(60).blue());
        println!("{}", title.green().bold());
        println!("{}", "=".repeat(60).blue());
        println!();
    }

    fn footer() {
        println!();
        println!("{}", "=".repeat(60).blue());
        println!("{}", "Done!".green().bold());
        println!("{}", "=".repeat(60).blue());
    }

    fn section(title: &str) {
        println!("{}", title.cyan().bold());
        println!("{}", "-".repeat(60).blue());
    }

    fn display_us(view: &UsDashboard) {
        if let Some(heading) = &view.heading {
            Self::section(heading);
            Self::display_metrics(&view.metrics);
        }

        if !view.charts.is_empty() {
            Self::section("Options Analysis");
            if let Some(expiration) = &view.expiration_date {
                println!("{} Expiration: {}", "ℹ".blue(), expiration.yellow());
            }
            for chart in &view.charts {
                println!("{}", charts::render_text(chart));
            }

            Self::section("Options Chain Data");
            Self::display_table(&view.records);
        }

        Self::display_notices(&view.notices);
    }

    fn display_nifty(view: &NiftyDashboard) {
        if view.summary.is_some() {
            Self::section(&format!("{} Options Summary", view.index));
            Self::display_metrics(&view.metrics);

            Self::section(&format!("{} Options Analysis", view.index));
            for chart in &view.charts {
                println!("{}", charts::render_text(chart));
            }

            Self::section(&format!("{} Options Chain Data", view.index));
            if let Some((min, max)) = view.strike_range {
                println!("{} Strike range: {} - {}", "ℹ".blue(), min, max);
            }
            println!(
                "{} Showing {} of {} rows ({:?})",
                "ℹ".blue(),
                view.records.len(),
                view.total_rows,
                view.filter.option_type
            );
            Self::display_table(&view.records);
        }

        Self::display_notices(&view.notices);
    }

    fn display_metrics(metrics: &[Metric]) {
        for m in metrics {
            println!("  {:<20} {}", m.label, m.value.yellow());
        }
        println!();
    }

    fn display_notices(notices: &[Notice]) {
        for n in notices {
            match n.level {
                NoticeLevel::Info => println!("{} {}", "ℹ".blue(), n.message),
                NoticeLevel::Warning => println!("{} {}", "⚠".yellow(), n.message.yellow()),
            }
        }
    }

    fn display_table(records: &[OptionRecord]) {
        println!(
            "  {:<4} {:>10} {:>10} {:>10} {:>12} {:>12} {:>8}",
            "Type", "Strike", "Last", "Bid/Ask", "Volume", "OI", "IV"
        );
        for r in records {
            let bid_ask = match (r.bid, r.ask) {
                (Some(bid), Some(ask)) => format!("{:.2}/{:.2}", bid, ask),
                _ => "-".to_string(),
            };
            println!(
                "  {:<4} {:>10.2} {:>10} {:>10} {:>12} {:>12} {:>8}",
                r.option_type.label(),
                r.strike,
                cell(r.last_price, 2),
                bid_ask,
                cell(r.volume, 0),
                cell(r.open_interest, 0),
                cell(r.implied_volatility, 2),
            );
        }
        println!();
    }
}

fn cell(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}
