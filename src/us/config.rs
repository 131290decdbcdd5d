// -----------------------------------------------
// YAHOO FINANCE ENDPOINTS
// -----------------------------------------------
pub const YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";

pub fn yahoo_crumb_url(base_url: &str) -> String {
    format!("{}/v1/test/getcrumb", base_url)
}

pub fn yahoo_quote_summary_url(base_url: &str, symbol: &str) -> String {
    format!(
        "{}/v10/finance/quoteSummary/{}?modules=price,assetProfile,financialData",
        base_url,
        urlencoding::encode(symbol)
    )
}

pub fn yahoo_options_url(base_url: &str, symbol: &str, expiration: Option<i64>) -> String {
    let mut url = format!("{}/v7/finance/options/{}", base_url, urlencoding::encode(symbol));
    if let Some(epoch) = expiration {
        url.push_str(&format!("?date={}", epoch));
    }
    url
}

// -----------------------------------------------
// SYMBOLS OFFERED IN THE US DASHBOARD
// -----------------------------------------------
pub const US_SYMBOLS: &[&str] = &[
    "AAPL", "SPY", "QQQ", "TSLA", "NVDA", "AMD", "MSFT", "GOOGL", "AMZN", "META",
];

pub const DEFAULT_SYMBOL: &str = "AAPL";

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const EXPIRATION_DATE_FORMAT: &str = "%Y-%m-%d";
pub const UNKNOWN: &str = "Unknown";
