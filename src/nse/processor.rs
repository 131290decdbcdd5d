use super::models::{IndexChainPayload, SideQuote};
use crate::models::{sort_for_display, OptionRecord, OptionType};
use chrono::NaiveDateTime;
use tracing::debug;

/// Flatten the exchange payload into CE/PE rows.
///
/// Each strike yields a row per side that is present. Numeric fields the
/// exchange left out stay `None`. Output is in display order.
pub fn flatten_index_chain(
    symbol: &str,
    payload: &IndexChainPayload,
    fetched_at: NaiveDateTime,
) -> Vec<OptionRecord> {
    let Some(records) = payload.records.as_ref() else {
        debug!(symbol, "Payload has no records section");
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(records.data.len() * 2);

    for entry in &records.data {
        let Some(strike) = entry.strike_price else {
            debug!(symbol, "Skipping entry without strike price");
            continue;
        };
        let expiry = entry.expiry();

        if let Some(ce) = &entry.call {
            rows.push(side_to_record(symbol, OptionType::Ce, strike, expiry, ce, fetched_at));
        }

        if let Some(pe) = &entry.put {
            rows.push(side_to_record(symbol, OptionType::Pe, strike, expiry, pe, fetched_at));
        }
    }

    sort_for_display(&mut rows);
    rows
}

fn side_to_record(
    symbol: &str,
    option_type: OptionType,
    strike: f64,
    expiry: Option<&str>,
    side: &SideQuote,
    fetched_at: NaiveDateTime,
) -> OptionRecord {
    OptionRecord {
        symbol: symbol.to_string(),
        option_type,
        strike,
        last_price: side.last_price,
        bid: side.bid_price,
        ask: side.ask_price,
        volume: side.total_traded_volume,
        open_interest: side.open_interest,
        implied_volatility: side.implied_volatility,
        change_in_oi: side.change_in_oi,
        underlying: side.underlying_value,
        expiration_date: side
            .expiry_date
            .clone()
            .or_else(|| expiry.map(str::to_string)),
        timestamp: Some(fetched_at),
    }
}
