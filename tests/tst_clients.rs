use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use options_dashboard::app_config::DashboardConfig;
use options_dashboard::dashboard::{Dashboard, Notice};
use options_dashboard::models::OptionType;
use options_dashboard::nse::NSEClient;
use options_dashboard::table::{TableFilter, TypeFilter};
use options_dashboard::us::YahooClient;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const NEAREST_EPOCH: i64 = 1792713600; // 2026-10-23 UTC
const LATER_EPOCH: i64 = 1793318400; // 2026-10-30 UTC

/// Serve `app` on an ephemeral local port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// -----------------------------------------------
// NSE MOCK
// -----------------------------------------------

async fn nse_home() -> &'static str {
    "<html>home</html>"
}

async fn nse_contract_info() -> Json<serde_json::Value> {
    Json(json!({
        "expiryDates": ["31-Dec-2099", "24-Dec-2099"],
        "strikePrice": ["24000", "24100"]
    }))
}

async fn nse_option_chain(Query(params): Query<HashMap<String, String>>) -> Response {
    let expected = [("type", "Indices"), ("symbol", "NIFTY"), ("expiry", "24-Dec-2099")];
    if expected
        .iter()
        .any(|(k, v)| params.get(*k).map(String::as_str) != Some(*v))
    {
        return StatusCode::BAD_REQUEST.into_response();
    }

    Json(json!({
        "records": {
            "timestamp": "19-Oct-2026 11:00:00",
            "underlyingValue": 24512.35,
            "data": [
                {
                    "strikePrice": 24100,
                    "expiryDates": "24-Dec-2099",
                    "CE": {"openInterest": 400, "totalTradedVolume": 900, "lastPrice": 120.5, "underlyingValue": 24512.35},
                    "PE": {"openInterest": 600, "totalTradedVolume": 300, "lastPrice": "98.10", "underlyingValue": 24512.35}
                },
                {
                    "strikePrice": 24000,
                    "expiryDates": "24-Dec-2099",
                    "CE": {"openInterest": 100, "totalTradedVolume": "-", "underlyingValue": 24512.35}
                }
            ]
        }
    }))
    .into_response()
}

fn nse_mock() -> Router {
    Router::new()
        .route("/", get(nse_home))
        .route("/api/option-chain-contract-info", get(nse_contract_info))
        .route("/api/option-chain-v3", get(nse_option_chain))
}

fn nse_blocked_mock() -> Router {
    Router::new()
        .route("/", get(nse_home))
        .route("/api/option-chain-contract-info", get(nse_home))
}

/// Cookies expire after the first warmup: contract info answers 401 once.
fn nse_expiring_session_mock(home_hits: Arc<AtomicUsize>) -> Router {
    let info_calls = Arc::new(AtomicUsize::new(0));
    Router::new()
        .route(
            "/",
            get(move || {
                let hits = home_hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    "<html>home</html>"
                }
            }),
        )
        .route(
            "/api/option-chain-contract-info",
            get(move || {
                let calls = info_calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        StatusCode::UNAUTHORIZED.into_response()
                    } else {
                        nse_contract_info().await.into_response()
                    }
                }
            }),
        )
        .route("/api/option-chain-v3", get(nse_option_chain))
}

// -----------------------------------------------
// YAHOO MOCK
// -----------------------------------------------

async fn yahoo_cookie() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn yahoo_crumb() -> &'static str {
    "crumb123"
}

async fn yahoo_blocked_crumb() -> &'static str {
    "<html>Too Many Requests</html>"
}

async fn yahoo_quote(Path(symbol): Path<String>, Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("crumb").map(String::as_str) != Some("crumb123") {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({
        "quoteSummary": {
            "result": [{
                "price": {
                    "longName": "Apple Inc.",
                    "regularMarketPrice": {"raw": 229.0, "fmt": "229.00"},
                    "marketCap": {"raw": 3.4e12, "fmt": "3.4T"}
                },
                "assetProfile": {"sector": "Technology"},
                "financialData": {"currentPrice": {"raw": 230.1}}
            }],
            "error": null
        },
        "symbol": symbol
    }))
    .into_response()
}

fn contract(strike: f64, volume: Option<f64>, oi: f64) -> serde_json::Value {
    json!({
        "contractSymbol": format!("AAPL261023C{:08}", (strike * 1000.0) as i64),
        "strike": strike,
        "lastPrice": 3.2,
        "bid": 3.1,
        "ask": 3.3,
        "volume": volume,
        "openInterest": oi,
        "impliedVolatility": 0.28
    })
}

async fn yahoo_options(Path(symbol): Path<String>, Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    if symbol == "SPY" {
        return Json(json!({
            "optionChain": {"result": [{"underlyingSymbol": "SPY", "expirationDates": [], "options": []}], "error": null}
        }));
    }

    let slice = json!({
        "expirationDate": NEAREST_EPOCH,
        "calls": [contract(235.0, Some(50.0), 700.0), contract(230.0, None, 900.0)],
        "puts": [contract(225.0, Some(80.0), 1200.0)]
    });

    let options = match params.get("date") {
        Some(date) if date == &NEAREST_EPOCH.to_string() => vec![slice],
        Some(_) => vec![],
        None => vec![slice],
    };

    Json(json!({
        "optionChain": {
            "result": [{
                "underlyingSymbol": symbol,
                "expirationDates": [LATER_EPOCH, NEAREST_EPOCH],
                "options": options
            }],
            "error": null
        }
    }))
}

fn yahoo_mock() -> Router {
    Router::new()
        .route("/", get(yahoo_cookie))
        .route("/v1/test/getcrumb", get(yahoo_crumb))
        .route("/v10/finance/quoteSummary/{symbol}", get(yahoo_quote))
        .route("/v7/finance/options/{symbol}", get(yahoo_options))
}

fn yahoo_blocked_mock() -> Router {
    Router::new()
        .route("/", get(yahoo_cookie))
        .route("/v1/test/getcrumb", get(yahoo_blocked_crumb))
}

/// The first quote request is refused with 401 as if the crumb went stale.
fn yahoo_expiring_crumb_mock(crumb_hits: Arc<AtomicUsize>) -> Router {
    let quote_calls = Arc::new(AtomicUsize::new(0));
    Router::new()
        .route("/", get(yahoo_cookie))
        .route(
            "/v1/test/getcrumb",
            get(move || {
                let hits = crumb_hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    "crumb123"
                }
            }),
        )
        .route(
            "/v10/finance/quoteSummary/{symbol}",
            get(move |path: Path<String>, query: Query<HashMap<String, String>>| {
                let calls = quote_calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        StatusCode::UNAUTHORIZED.into_response()
                    } else {
                        yahoo_quote(path, query).await
                    }
                }
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nse_index_chain_uses_nearest_expiry() {
        let base = spawn(nse_mock()).await;
        let client = NSEClient::with_base_url(&base, None).unwrap();

        let payload = client.fetch_index_chain("NIFTY").await.expect("payload");
        let records = payload.records.unwrap();
        assert_eq!(records.data.len(), 2);
        assert_eq!(records.underlying_value, Some(24512.35));
    }

    #[tokio::test]
    async fn test_nse_html_response_is_a_failure() {
        let base = spawn(nse_blocked_mock()).await;
        let client = NSEClient::with_base_url(&base, None).unwrap();
        assert!(client.fetch_index_chain("NIFTY").await.is_none());
    }

    #[tokio::test]
    async fn test_nse_unreachable_host_is_a_failure() {
        let client = NSEClient::with_base_url("http://127.0.0.1:9", None).unwrap();
        assert!(client.fetch_index_chain("NIFTY").await.is_none());
    }

    #[tokio::test]
    async fn test_nse_session_is_renewed_after_401() {
        let home_hits = Arc::new(AtomicUsize::new(0));
        let base = spawn(nse_expiring_session_mock(home_hits.clone())).await;
        let client = NSEClient::with_base_url(&base, None).unwrap();

        assert!(client.fetch_index_chain("NIFTY").await.is_none());
        assert_eq!(home_hits.load(Ordering::SeqCst), 1);

        let payload = client.fetch_index_chain("NIFTY").await.expect("payload after re-warmup");
        assert_eq!(payload.records.unwrap().data.len(), 2);
        assert_eq!(home_hits.load(Ordering::SeqCst), 2);

        // A warm session is reused
        assert!(client.fetch_index_chain("NIFTY").await.is_some());
        assert_eq!(home_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_yahoo_crumb_is_renewed_after_401() {
        let crumb_hits = Arc::new(AtomicUsize::new(0));
        let base = spawn(yahoo_expiring_crumb_mock(crumb_hits.clone())).await;
        let client = YahooClient::with_base_url(&base, None).unwrap();

        assert!(client.fetch_quote("AAPL").await.is_none());
        assert_eq!(crumb_hits.load(Ordering::SeqCst), 1);

        let quote = client.fetch_quote("AAPL").await.expect("quote after new crumb");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(crumb_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_yahoo_quote() {
        let base = spawn(yahoo_mock()).await;
        let client = YahooClient::with_base_url(&base, None).unwrap();

        let quote = client.fetch_quote("AAPL").await.expect("quote");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.current_price, 230.1);
        assert_eq!(quote.market_cap, 3.4e12);
        assert_eq!(quote.sector, "Technology");
        assert_eq!(quote.industry, "Unknown");
    }

    #[tokio::test]
    async fn test_yahoo_nearest_expiration_chain() {
        let base = spawn(yahoo_mock()).await;
        let client = YahooClient::with_base_url(&base, None).unwrap();

        let chain = client.fetch_nearest_expiration_chain("AAPL").await.expect("chain");
        assert_eq!(chain.symbol, "AAPL");
        assert_eq!(chain.expiration_date, "2026-10-23");
        assert_eq!(chain.calls.len(), 2);
        assert_eq!(chain.puts.len(), 1);
        // null volume reads as zero
        assert!(chain.calls.iter().any(|c| c.strike == 230.0 && c.volume == 0.0));
    }

    #[tokio::test]
    async fn test_yahoo_symbol_without_options() {
        let base = spawn(yahoo_mock()).await;
        let client = YahooClient::with_base_url(&base, None).unwrap();
        assert!(client.fetch_nearest_expiration_chain("SPY").await.is_none());
    }

    #[tokio::test]
    async fn test_yahoo_rejected_crumb_is_a_failure() {
        let base = spawn(yahoo_blocked_mock()).await;
        let client = YahooClient::with_base_url(&base, None).unwrap();
        assert!(client.fetch_quote("AAPL").await.is_none());
        assert!(client.fetch_nearest_expiration_chain("AAPL").await.is_none());
    }

    #[tokio::test]
    async fn test_us_dashboard_end_to_end() {
        let yahoo = YahooClient::with_base_url(spawn(yahoo_mock()).await, None).unwrap();
        let nse = NSEClient::with_base_url(spawn(nse_mock()).await, None).unwrap();
        let dashboard = Dashboard::with_clients(DashboardConfig::default(), yahoo, nse);

        let view = dashboard.us_dashboard("aapl").await;
        assert_eq!(view.heading.as_deref(), Some("Apple Inc. (AAPL)"));
        assert_eq!(view.metrics[0].value, "$230.10");
        assert_eq!(view.records.len(), 3);
        assert_eq!(view.records[0].option_type, OptionType::Call);
        assert_eq!(view.charts.len(), 2);
        assert!(view.notices.is_empty());

        let spy = dashboard.us_dashboard("SPY").await;
        assert_eq!(spy.notices, vec![Notice::warning("Could not fetch options data for SPY.")]);

        let unknown = dashboard.us_dashboard("XYZ").await;
        assert!(unknown.records.is_empty());
        assert!(unknown.notices[0].message.starts_with("Unknown symbol: XYZ"));
    }

    #[tokio::test]
    async fn test_nifty_dashboard_end_to_end() {
        let yahoo = YahooClient::with_base_url(spawn(yahoo_mock()).await, None).unwrap();
        let nse = NSEClient::with_base_url(spawn(nse_mock()).await, None).unwrap();
        let dashboard = Dashboard::with_clients(DashboardConfig::default(), yahoo, nse);

        let filter = TableFilter {
            option_type: TypeFilter::Calls,
            ..Default::default()
        };
        let view = dashboard.nifty_dashboard(&filter).await;

        let summary = view.summary.as_ref().expect("summary");
        assert_eq!(summary.total_contracts, 3);
        assert_eq!(summary.call_count, 2);
        assert_eq!(summary.put_count, 1);
        assert_eq!(view.metrics[3].value, "₹24,512.35");
        assert_eq!(view.charts[1].title(), "NIFTY Put-Call Ratio: 1.20");
        assert_eq!(view.records.len(), 2);
        assert!(view.download_file_name.as_deref().unwrap().starts_with("nifty_options_"));
    }

    #[tokio::test]
    async fn test_nifty_dashboard_fetch_failure() {
        let yahoo = YahooClient::with_base_url(spawn(yahoo_mock()).await, None).unwrap();
        let nse = NSEClient::with_base_url(spawn(nse_blocked_mock()).await, None).unwrap();
        let dashboard = Dashboard::with_clients(DashboardConfig::default(), yahoo, nse);

        let view = dashboard.nifty_dashboard(&TableFilter::default()).await;
        assert!(view.summary.is_none());
        assert_eq!(view.notices, vec![Notice::warning("Failed to fetch NIFTY options data.")]);
    }
}
