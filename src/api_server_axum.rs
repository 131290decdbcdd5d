use crate::app_config::DashboardConfig;
use crate::dashboard::{self, Dashboard, NiftyDashboard, UsDashboard};
use crate::table::{self, TableFilter, TypeFilter};
use crate::utility::Timer;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UsDashboardQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexTableQuery {
    pub option_type: Option<String>, // "All", "CE"/"Call" or "PE"/"Put"
    // Bounds stay text so a bad number is reported inside the response envelope
    pub min_strike: Option<String>,
    pub max_strike: Option<String>,
    /// `false` returns the idle view without touching the exchange.
    pub fetch: Option<bool>,
}

impl IndexTableQuery {
    fn to_filter(&self) -> std::result::Result<TableFilter, String> {
        let option_type = match self.option_type.as_deref() {
            Some(raw) => TypeFilter::parse(raw).ok_or_else(|| format!("Invalid option_type: {}", raw))?,
            None => TypeFilter::All,
        };
        Ok(TableFilter {
            option_type,
            min_strike: parse_strike("min_strike", self.min_strike.as_deref())?,
            max_strike: parse_strike("max_strike", self.max_strike.as_deref())?,
        })
    }
}

/// Empty means unbounded; anything else must be a finite number.
fn parse_strike(name: &str, raw: Option<&str>) -> std::result::Result<Option<f64>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(format!("Invalid {}: {}", name, s)),
        },
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, timer: &Timer) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(timer.elapsed_ms()),
        })
    }

    fn failed(error: impl Into<String>, timer: &Timer) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(error.into()),
            processing_time_ms: Some(timer.elapsed_ms()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SymbolListResponse {
    pub symbols: Vec<String>,
    pub default_symbol: Option<String>,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        Ok(Self::from_dashboard(Dashboard::new(config)?))
    }

    pub fn from_dashboard(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
        }
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/health
async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/us/symbols - Symbols offered on the US tab
async fn get_us_symbols(State(app_state): State<AppState>) -> Json<ApiResponse<SymbolListResponse>> {
    let timer = Timer::silent("us symbols");
    let symbols = app_state.dashboard.config().us_symbols.clone();
    ApiResponse::ok(
        SymbolListResponse {
            default_symbol: symbols.first().cloned(),
            symbols,
        },
        &timer,
    )
}

/// GET /api/us/dashboard?symbol=AAPL - US tab for one symbol
async fn get_us_dashboard(
    Query(query): Query<UsDashboardQuery>,
    State(app_state): State<AppState>,
) -> Json<ApiResponse<UsDashboard>> {
    let timer = Timer::silent("us dashboard");

    let view = match query.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(symbol) => app_state.dashboard.us_dashboard(symbol).await,
        None => UsDashboard::idle(app_state.dashboard.config()),
    };

    ApiResponse::ok(view, &timer)
}

/// GET /api/nifty/dashboard?option_type=CE&min_strike=24000&max_strike=25000 - Index tab
async fn get_nifty_dashboard(
    Query(query): Query<IndexTableQuery>,
    State(app_state): State<AppState>,
) -> Json<ApiResponse<NiftyDashboard>> {
    let timer = Timer::silent("index dashboard");

    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return ApiResponse::failed(e, &timer),
    };

    if query.fetch == Some(false) {
        return ApiResponse::ok(NiftyDashboard::idle(app_state.dashboard.config()), &timer);
    }

    let view = app_state.dashboard.nifty_dashboard(&filter).await;
    ApiResponse::ok(view, &timer)
}

/// GET /api/nifty/export?option_type=PE - Filtered index table as a CSV download
async fn get_nifty_export(
    Query(query): Query<IndexTableQuery>,
    State(app_state): State<AppState>,
) -> Response {
    let config = app_state.dashboard.config();
    let index = config.index_name.as_str();

    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };
    if let Err(e) = filter.validate() {
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    let now = Local::now().naive_local();
    let records = match app_state.dashboard.index_records(now).await {
        Some(records) if !records.is_empty() => records,
        Some(_) => return (StatusCode::BAD_GATEWAY, dashboard::index_empty_table(index)).into_response(),
        None => return (StatusCode::BAD_GATEWAY, dashboard::index_fetch_failed(index)).into_response(),
    };

    let csv = match table::apply_filter(&records, &filter).and_then(|rows| table::to_csv(&rows)) {
        Ok(csv) => csv,
        Err(e) => {
            warn!(error = %e, "CSV export failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let file_name = table::export_file_name(&config.export_prefix(), now);
    info!(%file_name, "Serving CSV export");

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        csv,
    )
        .into_response()
}

// -----------------------------------------------
// ROUTER + SERVER
// -----------------------------------------------

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/us/symbols", get(get_us_symbols))
        .route("/api/us/dashboard", get(get_us_dashboard))
        .route("/api/nifty/dashboard", get(get_nifty_dashboard))
        .route("/api/nifty/export", get(get_nifty_export))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn start_server(config: DashboardConfig, port: u16) -> Result<()> {
    let app = build_router(AppState::new(config)?);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "Options dashboard API server listening");
    println!("🚀 Options Dashboard API Server running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET  /api/health");
    println!("   GET  /api/us/symbols");
    println!("   GET  /api/us/dashboard?symbol=AAPL");
    println!("   GET  /api/nifty/dashboard?option_type=All&min_strike=24000&max_strike=25000");
    println!("   GET  /api/nifty/export?option_type=CE");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
