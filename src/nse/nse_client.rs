use super::config;
use super::models::{ContractInfo, IndexChainPayload};
use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
pub struct NSEClient {
    client: Client,
    base_url: String,
    warmed_up: RwLock<bool>,
}

/// Pick the nearest usable expiry.
///
/// Past dates are skipped; today's expiry counts only before market close.
pub fn select_expiry(expiry_dates: &[String], now: NaiveDateTime) -> Result<&String> {
    if expiry_dates.is_empty() {
        return Err(anyhow!("No expiry dates found"));
    }

    let mut parsed: Vec<(NaiveDate, usize)> = Vec::with_capacity(expiry_dates.len());
    for (idx, s) in expiry_dates.iter().enumerate() {
        let d = NaiveDate::parse_from_str(s, config::EXPIRY_DATE_FORMAT)
            .with_context(|| format!("Failed to parse expiry date: {}", s))?;
        parsed.push((d, idx));
    }
    parsed.sort_by_key(|(d, _)| *d);

    let today = now.date();
    let before_close = now.time() < config::market_close();

    parsed
        .into_iter()
        .find(|(date, _)| *date > today || (*date == today && before_close))
        .map(|(_, idx)| &expiry_dates[idx])
        .ok_or_else(|| anyhow!("No valid expiry found (all past or after cutoff)"))
}

impl NSEClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Self::with_base_url(config::NSE_BASE_URL, timeout)
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            warmed_up: RwLock::new(false),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Warmup NSE session (only once per client)
    async fn warmup_if_needed(&self) -> Result<()> {
        if *self.warmed_up.read().await {
            return Ok(());
        }

        let mut warmed = self.warmed_up.write().await;
        if !*warmed {
            // The home page hands out the cookies the API insists on
            let _ = self
                .client
                .get(&self.base_url)
                .header(header::ACCEPT, config::HEADER_ACCEPT_HTML)
                .send()
                .await
                .context("Failed to warm up NSE session")?;

            tokio::time::sleep(Duration::from_millis(config::WARMUP_DELAY_MS)).await;
            *warmed = true;
            debug!(base_url = %self.base_url, "NSE session warmed up");
        }

        Ok(())
    }

    /// Single GET returning the body, which must look like JSON.
    async fn fetch_json(&self, url: &str) -> Result<String> {
        self.warmup_if_needed().await?;

        let res = self
            .client
            .get(url)
            .header(header::REFERER, config::HEADER_REFERER)
            .header("X-Requested-With", config::HEADER_X_REQUESTED_WITH)
            .send()
            .await
            .context("Request send failed")?;

        let status = res.status();
        debug!(%url, status = status.as_u16(), "NSE response");

        if !status.is_success() {
            // Expired cookies: the next call warms the session up again
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                *self.warmed_up.write().await = false;
                warn!(status = status.as_u16(), "NSE session rejected, warmup will be repeated");
            }
            let body = res.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            anyhow::bail!("HTTP {}: {}", status, preview);
        }

        let text = res.text().await.context("Failed to read body")?;

        // Blocked requests come back as an HTML page with status 200
        let trimmed = text.trim();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            let preview: String = text.chars().take(200).collect();
            anyhow::bail!("Non-JSON response: {}", preview);
        }

        Ok(text)
    }

    pub async fn fetch_contract_info(&self, symbol: &str) -> Result<ContractInfo> {
        let url = config::nse_contract_info_url(&self.base_url, symbol);
        let text = self.fetch_json(&url).await?;
        let info: ContractInfo =
            serde_json::from_str(&text).context("Failed to parse contract info")?;

        Ok(info)
    }

    pub async fn fetch_option_chain(&self, symbol: &str, expiry: &str) -> Result<IndexChainPayload> {
        let url = config::nse_option_chain_url(&self.base_url, "Indices", symbol, expiry);
        let text = self.fetch_json(&url).await?;
        let chain: IndexChainPayload =
            serde_json::from_str(&text).context("Failed to parse option chain")?;

        Ok(chain)
    }

    async fn try_fetch_index_chain(&self, index_name: &str) -> Result<IndexChainPayload> {
        let contract_info = self.fetch_contract_info(index_name).await?;
        let expiry = select_expiry(&contract_info.expiry_dates, Local::now().naive_local())?;
        info!(index = index_name, %expiry, "Fetching index option chain");

        self.fetch_option_chain(index_name, expiry).await
    }

    /// Raw option chain for an index at its nearest usable expiry.
    ///
    /// Any failure is logged and reported as `None`.
    pub async fn fetch_index_chain(&self, index_name: &str) -> Option<IndexChainPayload> {
        match self.try_fetch_index_chain(index_name).await {
            Ok(payload) => {
                let strikes = payload.records.as_ref().map(|r| r.data.len()).unwrap_or(0);
                info!(index = index_name, strikes, "Index option chain fetched");
                Some(payload)
            }
            Err(e) => {
                warn!(index = index_name, error = %format!("{:#}", e), "Error fetching index option chain");
                None
            }
        }
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or("en-US,en;q=0.9");
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    let mut builder = Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().context("Failed to build HTTP client")
}
