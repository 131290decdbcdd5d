use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractInfo {
    #[serde(rename = "expiryDates", default)]
    pub expiry_dates: Vec<String>,

    #[serde(rename = "strikePrice", default)]
    pub strike_prices: Vec<String>,
}

/// Raw option-chain payload as served by the exchange.
///
/// Every field is optional: the exchange drops keys freely and the shaper has
/// to cope with whatever arrives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexChainPayload {
    #[serde(default)]
    pub records: Option<Records>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(rename = "underlyingValue", default, deserialize_with = "lenient_f64")]
    pub underlying_value: Option<f64>,

    #[serde(default, deserialize_with = "lenient_entries")]
    pub data: Vec<StrikeEntry>,

    #[serde(rename = "expiryDates", default)]
    pub expiry_dates: Vec<String>,
}

/// One strike row: CE and PE sides are independent and either may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrikeEntry {
    #[serde(rename = "strikePrice", default, deserialize_with = "lenient_f64")]
    pub strike_price: Option<f64>,

    #[serde(rename = "expiryDate", default, deserialize_with = "lenient_string")]
    pub expiry_date: Option<String>,

    // option-chain-v3 names the per-row expiry in the plural
    #[serde(rename = "expiryDates", default, deserialize_with = "lenient_string")]
    pub expiry_dates: Option<String>,

    #[serde(rename = "CE", default, deserialize_with = "lenient_side")]
    pub call: Option<SideQuote>,

    #[serde(rename = "PE", default, deserialize_with = "lenient_side")]
    pub put: Option<SideQuote>,
}

impl StrikeEntry {
    pub fn expiry(&self) -> Option<&str> {
        self.expiry_date
            .as_deref()
            .or(self.expiry_dates.as_deref())
    }
}

/// Quote details for one side (CE or PE) of a strike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideQuote {
    #[serde(rename = "strikePrice", default, deserialize_with = "lenient_f64")]
    pub strike_price: Option<f64>,

    #[serde(rename = "expiryDate", default, deserialize_with = "lenient_string")]
    pub expiry_date: Option<String>,

    #[serde(rename = "openInterest", default, deserialize_with = "lenient_f64")]
    pub open_interest: Option<f64>,

    #[serde(rename = "changeinOpenInterest", default, deserialize_with = "lenient_f64")]
    pub change_in_oi: Option<f64>,

    #[serde(rename = "totalTradedVolume", default, deserialize_with = "lenient_f64")]
    pub total_traded_volume: Option<f64>,

    #[serde(rename = "impliedVolatility", default, deserialize_with = "lenient_f64")]
    pub implied_volatility: Option<f64>,

    #[serde(rename = "lastPrice", default, deserialize_with = "lenient_f64")]
    pub last_price: Option<f64>,

    #[serde(rename = "underlyingValue", default, deserialize_with = "lenient_f64")]
    pub underlying_value: Option<f64>,

    #[serde(rename = "bidprice", default, deserialize_with = "lenient_f64")]
    pub bid_price: Option<f64>,

    #[serde(rename = "askPrice", default, deserialize_with = "lenient_f64")]
    pub ask_price: Option<f64>,
}

/// Numbers arrive as JSON numbers, as strings ("1,234.5"), or as "-" placeholders.
/// "NaN" and "inf" strings count as missing.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        })
        .filter(|v| v.is_finite()))
}

/// Strike rows that are not objects are dropped, the rest of the chain is kept.
fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<StrikeEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = values.len();

    let entries: Vec<StrikeEntry> = values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(_) => serde_json::from_value(v).ok(),
            _ => None,
        })
        .collect();

    if entries.len() < total {
        debug!(skipped = total - entries.len(), "Dropped malformed strike rows");
    }
    Ok(entries)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }))
}

/// A side that is not an object is treated as absent instead of failing the payload.
fn lenient_side<'de, D>(deserializer: D) -> Result<Option<SideQuote>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Object(_) => serde_json::from_value(v).ok(),
        _ => None,
    }))
}
