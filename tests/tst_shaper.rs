use options_dashboard::models::OptionType;
use options_dashboard::nse::{flatten_index_chain, IndexChainPayload};
use options_dashboard::presenter::put_call_ratio;
use options_dashboard::table::to_csv;
use options_dashboard::us::{flatten_equity_chain, EquityContract, OptionsChain};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDateTime};
    use serde_json::json;

    fn contract(strike: f64) -> EquityContract {
        EquityContract {
            contract_symbol: format!("SPY{}", strike),
            strike,
            last_price: 2.5,
            bid: 2.4,
            ask: 2.6,
            volume: 10.0,
            open_interest: 100.0,
            implied_volatility: 0.2,
            in_the_money: false,
        }
    }

    fn fetched_at() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-10-19 11:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_equity_chain_flattens_every_contract() {
        let chain = OptionsChain {
            symbol: "SPY".to_string(),
            expiration_date: "2026-10-23".to_string(),
            calls: vec![contract(580.0), contract(570.0), contract(575.0)],
            puts: vec![contract(575.0), contract(565.0)],
            fetched_at: Local::now(),
        };

        let rows = flatten_equity_chain(&chain);

        // k calls + m puts
        assert_eq!(rows.len(), 5);
        let types: Vec<OptionType> = rows.iter().map(|r| r.option_type).collect();
        assert_eq!(
            types,
            vec![OptionType::Call, OptionType::Call, OptionType::Call, OptionType::Put, OptionType::Put]
        );
        let strikes: Vec<f64> = rows.iter().map(|r| r.strike).collect();
        assert_eq!(strikes, vec![570.0, 575.0, 580.0, 565.0, 575.0]);
        assert!(rows.iter().all(|r| r.expiration_date.as_deref() == Some("2026-10-23")));
        assert!(rows.iter().all(|r| r.change_in_oi.is_none() && r.underlying.is_none()));
    }

    #[test]
    fn test_equity_chain_without_contracts() {
        let chain = OptionsChain {
            symbol: "QQQ".to_string(),
            expiration_date: "2026-10-23".to_string(),
            calls: vec![],
            puts: vec![],
            fetched_at: Local::now(),
        };
        assert!(flatten_equity_chain(&chain).is_empty());
    }

    #[test]
    fn test_index_strike_with_only_ce() {
        let payload: IndexChainPayload = serde_json::from_value(json!({
            "records": {
                "timestamp": "19-Oct-2026 11:00:00",
                "underlyingValue": 24512.35,
                "data": [
                    {
                        "strikePrice": 100,
                        "expiryDates": "23-Oct-2026",
                        "CE": {"openInterest": 10, "totalTradedVolume": 5, "lastPrice": 1.5}
                    }
                ]
            }
        }))
        .unwrap();

        let rows = flatten_index_chain("NIFTY", &payload, fetched_at());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].option_type, OptionType::Ce);
        assert_eq!(rows[0].strike, 100.0);
        assert_eq!(rows[0].open_interest, Some(10.0));
        assert_eq!(rows[0].expiration_date.as_deref(), Some("23-Oct-2026"));
        assert_eq!(rows[0].timestamp, Some(fetched_at()));
    }

    #[test]
    fn test_index_partial_records_are_kept() {
        let payload: IndexChainPayload = serde_json::from_value(json!({
            "records": {
                "data": [
                    {"strikePrice": 24100, "CE": {"openInterest": "-"}, "PE": {"lastPrice": "12.5"}},
                    {"strikePrice": 24000, "CE": {}, "PE": null},
                    {"CE": {"openInterest": 99}},
                    {"strikePrice": 23900}
                ]
            }
        }))
        .unwrap();

        let rows = flatten_index_chain("NIFTY", &payload, fetched_at());

        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].option_type, rows[0].strike), (OptionType::Ce, 24000.0));
        assert_eq!((rows[1].option_type, rows[1].strike), (OptionType::Ce, 24100.0));
        assert_eq!(rows[1].open_interest, None);
        assert_eq!((rows[2].option_type, rows[2].strike), (OptionType::Pe, 24100.0));
        assert_eq!(rows[2].last_price, Some(12.5));
    }

    #[test]
    fn test_index_non_finite_values_stay_out_of_rows() {
        let payload: IndexChainPayload = serde_json::from_value(json!({
            "records": {
                "data": [
                    null,
                    {
                        "strikePrice": 100,
                        "CE": {"openInterest": 500, "lastPrice": 2.0},
                        "PE": {"openInterest": "NaN", "lastPrice": "inf"}
                    }
                ]
            }
        }))
        .unwrap();

        let rows = flatten_index_chain("NIFTY", &payload, fetched_at());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].option_type, OptionType::Pe);
        assert_eq!(rows[1].open_interest, None);
        assert_eq!(rows[1].last_price, None);

        let ratio = put_call_ratio(&rows).unwrap();
        assert!(ratio.is_finite());
        assert_eq!(ratio, 0.0);

        let csv = to_csv(&rows).unwrap();
        assert!(!csv.contains("NaN"));
        assert!(!csv.contains("inf"));
    }

    #[test]
    fn test_index_payload_without_records() {
        let payload: IndexChainPayload = serde_json::from_value(json!({})).unwrap();
        assert!(flatten_index_chain("NIFTY", &payload, fetched_at()).is_empty());
    }
}
