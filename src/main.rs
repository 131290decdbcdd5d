use anyhow::Result;
use colored::Colorize;
use options_dashboard::app_config::{AppConfig, Mode};
use options_dashboard::dashboard_commands::DashboardCommands;
use options_dashboard::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // ========================================
    // CONFIGURATION - from environment
    // ========================================
    let app_config = AppConfig::from_env();
    logging::init_logging(&app_config.log_dir)?;

    println!("{}", "📈 Global Options Dashboard".green().bold());
    app_config.log_config();
    println!();

    let AppConfig {
        mode,
        port,
        symbol,
        filter,
        dashboard,
        ..
    } = app_config;

    match mode {
        Mode::Us => DashboardCommands::run_us(dashboard, &symbol).await?,
        Mode::Nifty => DashboardCommands::run_nifty(dashboard, filter).await?,
        Mode::Server => DashboardCommands::run_server(dashboard, port).await?,
    }

    Ok(())
}
