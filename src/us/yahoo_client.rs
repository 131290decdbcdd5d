use super::config;
use super::models::{
    ExpirationSlice, OptionChainResponse, OptionChainResult, OptionsChain, QuoteSummaryResponse,
    QuoteSummaryResult,
};
use crate::models::Quote;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION CRUMB
// -----------------------------------------------
pub struct YahooClient {
    client: Client,
    base_url: String,
    cookie_url: String,
    crumb: RwLock<Option<String>>,
}

impl YahooClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: config::YAHOO_BASE_URL.to_string(),
            cookie_url: config::YAHOO_COOKIE_URL.to_string(),
            crumb: RwLock::new(None),
        })
    }

    /// Point the client at another host, e.g. a local mock server.
    /// The session cookie is fetched from the same host.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self {
            client: build_client(timeout)?,
            cookie_url: base_url.clone(),
            base_url,
            crumb: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session crumb, obtained once per client.
    async fn crumb(&self) -> Result<String> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        let mut cached = self.crumb.write().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the cookies matter here, the status is usually 404
        let _ = self
            .client
            .get(&self.cookie_url)
            .send()
            .await
            .context("Failed to obtain Yahoo session cookie")?;

        let res = self
            .client
            .get(config::yahoo_crumb_url(&self.base_url))
            .send()
            .await
            .context("Crumb request failed")?;

        let status = res.status();
        let crumb = res.text().await.context("Failed to read crumb")?;
        let crumb = crumb.trim().to_string();

        if !status.is_success() || crumb.is_empty() || crumb.starts_with('<') {
            anyhow::bail!("Crumb rejected ({})", status);
        }

        debug!("Yahoo session crumb acquired");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let crumb = self.crumb().await?;
        let separator = if url.contains('?') { '&' } else { '?' };
        let url = format!("{}{}crumb={}", url, separator, urlencoding::encode(&crumb));

        let res = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .context("Request send failed")?;

        let status = res.status();
        debug!(%url, status = status.as_u16(), "Yahoo response");

        if !status.is_success() {
            // Stale crumb: the next call fetches a fresh one
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                *self.crumb.write().await = None;
                warn!(status = status.as_u16(), "Yahoo crumb rejected, session will be renewed");
            }
            let body = res.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            anyhow::bail!("HTTP {}: {}", status, preview);
        }

        let text = res.text().await.context("Failed to read body")?;
        serde_json::from_str(&text).context("Failed to parse Yahoo response")
    }

    // -----------------------------------------------
    // QUOTE
    // -----------------------------------------------
    async fn try_fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = config::yahoo_quote_summary_url(&self.base_url, symbol);
        let response: QuoteSummaryResponse = self.fetch_json(&url).await?;

        if let Some(err) = response.quote_summary.error.filter(|e| !e.is_null()) {
            anyhow::bail!("Provider error: {}", err);
        }

        let result = response
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
            .ok_or_else(|| anyhow!("No quote data for {}", symbol))?;

        Ok(quote_from_summary(symbol, result))
    }

    /// Header data for a symbol; `None` (and a log line) on any failure.
    pub async fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
        match self.try_fetch_quote(symbol).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!(symbol, error = %format!("{:#}", e), "Error getting quote");
                None
            }
        }
    }

    // -----------------------------------------------
    // OPTION CHAIN
    // -----------------------------------------------
    async fn fetch_options(&self, symbol: &str, expiration: Option<i64>) -> Result<OptionChainResult> {
        let url = config::yahoo_options_url(&self.base_url, symbol, expiration);
        let response: OptionChainResponse = self.fetch_json(&url).await?;

        if let Some(err) = response.option_chain.error.filter(|e| !e.is_null()) {
            anyhow::bail!("Provider error: {}", err);
        }

        response
            .option_chain
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
            .ok_or_else(|| anyhow!("No option data for {}", symbol))
    }

    /// Listed expirations (unix seconds), earliest first.
    pub async fn fetch_expirations(&self, symbol: &str) -> Result<Vec<i64>> {
        let mut dates = self.fetch_options(symbol, None).await?.expiration_dates;
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    pub async fn fetch_expiration_slice(&self, symbol: &str, expiration: i64) -> Result<ExpirationSlice> {
        let result = self.fetch_options(symbol, Some(expiration)).await?;

        result
            .options
            .into_iter()
            .find(|slice| slice.expiration_date == expiration)
            .ok_or_else(|| anyhow!("Expiration {} missing from response", expiration))
    }

    async fn try_fetch_nearest_expiration_chain(&self, symbol: &str) -> Result<Option<OptionsChain>> {
        let expirations = self.fetch_expirations(symbol).await?;

        let Some(&nearest) = expirations.first() else {
            info!(symbol, "No options available");
            return Ok(None);
        };

        let expiration_date = format_expiration(nearest)?;
        info!(symbol, %expiration_date, "Using nearest expiration date");

        let slice = self.fetch_expiration_slice(symbol, nearest).await?;

        Ok(Some(OptionsChain {
            symbol: symbol.to_string(),
            expiration_date,
            calls: slice.calls,
            puts: slice.puts,
            fetched_at: Local::now(),
        }))
    }

    /// Call and put tables for the nearest listed expiration.
    ///
    /// `None` when the symbol lists no options or any request fails.
    pub async fn fetch_nearest_expiration_chain(&self, symbol: &str) -> Option<OptionsChain> {
        match self.try_fetch_nearest_expiration_chain(symbol).await {
            Ok(chain) => chain,
            Err(e) => {
                warn!(symbol, error = %format!("{:#}", e), "Error fetching options");
                None
            }
        }
    }
}

fn quote_from_summary(symbol: &str, result: QuoteSummaryResult) -> Quote {
    let price = result.price.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();

    let current_price = result
        .financial_data
        .and_then(|f| f.current_price)
        .and_then(|v| v.raw)
        .or_else(|| price.regular_market_price.as_ref().and_then(|v| v.raw))
        .unwrap_or(0.0);

    Quote {
        symbol: symbol.to_string(),
        name: price
            .long_name
            .or(price.short_name)
            .unwrap_or_else(|| symbol.to_string()),
        current_price,
        market_cap: price.market_cap.and_then(|v| v.raw).unwrap_or(0.0),
        sector: profile.sector.unwrap_or_else(|| config::UNKNOWN.to_string()),
        industry: profile.industry.unwrap_or_else(|| config::UNKNOWN.to_string()),
    }
}

/// Expiration timestamps are midnight UTC of the expiry day.
fn format_expiration(epoch: i64) -> Result<String> {
    let dt = DateTime::from_timestamp(epoch, 0)
        .ok_or_else(|| anyhow!("Invalid expiration timestamp {}", epoch))?;
    Ok(dt.date_naive().format(config::EXPIRATION_DATE_FORMAT).to_string())
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder()
        .cookie_store(true)
        .user_agent(config::USER_AGENT);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().context("Failed to build HTTP client")
}
