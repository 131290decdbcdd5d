use super::models::{EquityContract, OptionsChain};
use crate::models::{sort_for_display, OptionRecord, OptionType};

/// Flatten the call and put tables into rows, calls first, strikes ascending.
pub fn flatten_equity_chain(chain: &OptionsChain) -> Vec<OptionRecord> {
    let mut rows: Vec<OptionRecord> = chain
        .calls
        .iter()
        .map(|c| contract_to_record(chain, OptionType::Call, c))
        .chain(
            chain
                .puts
                .iter()
                .map(|p| contract_to_record(chain, OptionType::Put, p)),
        )
        .collect();

    sort_for_display(&mut rows);
    rows
}

fn contract_to_record(chain: &OptionsChain, option_type: OptionType, c: &EquityContract) -> OptionRecord {
    OptionRecord {
        symbol: chain.symbol.clone(),
        option_type,
        strike: c.strike,
        last_price: Some(c.last_price),
        bid: Some(c.bid),
        ask: Some(c.ask),
        volume: Some(c.volume),
        open_interest: Some(c.open_interest),
        implied_volatility: Some(c.implied_volatility),
        change_in_oi: None,
        underlying: None,
        expiration_date: Some(chain.expiration_date.clone()),
        timestamp: None,
    }
}
