use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// -----------------------------------------------
// QUOTE SUMMARY
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,

    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: Option<PriceModule>,

    #[serde(rename = "assetProfile", default)]
    pub asset_profile: Option<AssetProfile>,

    #[serde(rename = "financialData", default)]
    pub financial_data: Option<FinancialData>,
}

/// Yahoo wraps most numbers as `{"raw": 1.0, "fmt": "1.00"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawValue {
    #[serde(default)]
    pub raw: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceModule {
    #[serde(rename = "longName", default)]
    pub long_name: Option<String>,

    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,

    #[serde(rename = "regularMarketPrice", default)]
    pub regular_market_price: Option<RawValue>,

    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetProfile {
    #[serde(default)]
    pub sector: Option<String>,

    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinancialData {
    #[serde(rename = "currentPrice", default)]
    pub current_price: Option<RawValue>,
}

// -----------------------------------------------
// OPTION CHAIN
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainResponse {
    #[serde(rename = "optionChain")]
    pub option_chain: OptionChainEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainEnvelope {
    #[serde(default)]
    pub result: Option<Vec<OptionChainResult>>,

    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionChainResult {
    #[serde(rename = "underlyingSymbol", default)]
    pub underlying_symbol: Option<String>,

    /// Unix timestamps (seconds) of every listed expiration.
    #[serde(rename = "expirationDates", default)]
    pub expiration_dates: Vec<i64>,

    #[serde(default)]
    pub options: Vec<ExpirationSlice>,
}

/// Calls and puts of a single expiration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpirationSlice {
    #[serde(rename = "expirationDate", default)]
    pub expiration_date: i64,

    #[serde(default)]
    pub calls: Vec<EquityContract>,

    #[serde(default)]
    pub puts: Vec<EquityContract>,
}

/// One row of the provider's call or put table. Absent numbers read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityContract {
    #[serde(rename = "contractSymbol", default)]
    pub contract_symbol: String,

    #[serde(default, deserialize_with = "zero_if_null")]
    pub strike: f64,

    #[serde(rename = "lastPrice", default, deserialize_with = "zero_if_null")]
    pub last_price: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    pub bid: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    pub ask: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    pub volume: f64,

    #[serde(rename = "openInterest", default, deserialize_with = "zero_if_null")]
    pub open_interest: f64,

    #[serde(rename = "impliedVolatility", default, deserialize_with = "zero_if_null")]
    pub implied_volatility: f64,

    #[serde(rename = "inTheMoney", default)]
    pub in_the_money: bool,
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}

/// Call and put tables for one symbol's nearest expiration.
#[derive(Debug, Clone)]
pub struct OptionsChain {
    pub symbol: String,
    pub expiration_date: String,
    pub calls: Vec<EquityContract>,
    pub puts: Vec<EquityContract>,
    pub fetched_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contract_missing_fields_default_to_zero() {
        let contract: EquityContract = serde_json::from_value(json!({
            "contractSymbol": "AAPL261023C00230000",
            "strike": 230.0,
            "volume": null,
            "bid": "n/a"
        }))
        .unwrap();

        assert_eq!(contract.strike, 230.0);
        assert_eq!(contract.volume, 0.0);
        assert_eq!(contract.bid, 0.0);
        assert_eq!(contract.open_interest, 0.0);
        assert!(!contract.in_the_money);
    }

    #[test]
    fn test_option_chain_response() {
        let response: OptionChainResponse = serde_json::from_value(json!({
            "optionChain": {
                "result": [{
                    "underlyingSymbol": "AAPL",
                    "expirationDates": [1792713600, 1793318400],
                    "options": [{ "expirationDate": 1792713600, "calls": [{ "strike": 200 }], "puts": [] }]
                }],
                "error": null
            }
        }))
        .unwrap();

        let result = &response.option_chain.result.unwrap()[0];
        assert_eq!(result.expiration_dates.len(), 2);
        assert_eq!(result.options[0].calls[0].strike, 200.0);
    }
}
