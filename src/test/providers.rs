#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::{
        api::{
            fmp::provider_symbol,
            fmp_dto::{FmpQuoteHistoryDto, FmpSplitDto},
            frank_dto::FrankTimeSeriesDto,
            utils::{parse_response_array, parse_response_object},
        },
        app::splits::adjust_holding,
        error::DataGapError,
        models::{Currency, Holding, SplitEvent},
        services::{
            CachingPriceProvider, PriceProvider, RateProvider, SplitProvider, StaticReferenceData,
            reference_data::fetch_with_retry,
        },
        test::fixtures::{date, symbol, trade},
    };

    #[test]
    fn frankfurter_series_becomes_rate_history() {
        let body = json!({
            "amount": 1.0,
            "base": "SGD",
            "start_date": "2024-01-02",
            "end_date": "2024-01-05",
            "rates": {
                "2024-01-02": { "USD": 0.7531 },
                "2024-01-03": { "USD": 0.7502 },
                "2024-01-04": { "EUR": 0.6871 }
            }
        });

        let dto: FrankTimeSeriesDto = parse_response_object(body, "no rates").unwrap();
        let history = dto.to_rate_history(Currency::Usd);

        assert_eq!(history.len(), 2);
        assert!((history[&date(2024, 1, 2)] - dec!(0.7531)).abs() < dec!(0.000001));
        assert!(!history.contains_key(&date(2024, 1, 4)));
    }

    #[test]
    fn fmp_split_ratio_is_numerator_over_denominator() {
        let body = json!([
            { "symbol": "NVDA", "date": "2024-06-10", "numerator": 10, "denominator": 1 },
            { "symbol": "NVDA", "date": "2000-06-27", "numerator": 1, "denominator": 0 }
        ]);

        let dtos: Vec<FmpSplitDto> = parse_response_array(body, "no splits").unwrap();
        let events: Vec<SplitEvent> = dtos
            .iter()
            .map(|dto| dto.to_split_event(&symbol("NVDA")))
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(*events[0].ratio(), dec!(10));
        assert_eq!(*events[0].effective_date(), date(2024, 6, 10));
        assert_eq!(*events[1].ratio(), dec!(0));
        assert!(!events[1].is_valid());
    }

    #[test]
    fn zero_denominator_split_invalidates_the_whole_list() {
        let body = json!([
            { "symbol": "NVDA", "date": "2024-06-10", "numerator": 10, "denominator": 1 },
            { "symbol": "NVDA", "date": "2000-06-27", "numerator": 1, "denominator": 0 }
        ]);
        let dtos: Vec<FmpSplitDto> = parse_response_array(body, "no splits").unwrap();
        let events: Vec<SplitEvent> = dtos
            .iter()
            .map(|dto| dto.to_split_event(&symbol("NVDA")))
            .collect();
        let ledger = vec![trade("NVDA", date(2020, 1, 2), dec!(10), dec!(400), Currency::Usd)];
        let holding = Holding::index(&ledger).remove(0);

        let outcome = adjust_holding(holding, &ledger, Ok(events));

        assert!(!outcome.holding().is_split_adjusted());
        assert_eq!(outcome.trades(), &ledger);
        assert_eq!(
            outcome.gap(),
            &Some(DataGapError::InvalidSplitRatio {
                symbol: symbol("NVDA"),
                date: date(2000, 6, 27),
                ratio: dec!(0),
            })
        );
    }

    #[test]
    fn fmp_light_history_parses() {
        let body = json!([
            { "symbol": "AAPL", "date": "2024-01-03", "price": 184.25, "volume": 58414460 },
            { "symbol": "AAPL", "date": "2024-01-02", "price": 185.64, "volume": 82488700 }
        ]);

        let dtos: Vec<FmpQuoteHistoryDto> = parse_response_array(body, "no prices").unwrap();

        assert_eq!(dtos.len(), 2);
        assert_eq!(*dtos[1].to_price_bar().date(), date(2024, 1, 2));
    }

    #[test]
    fn empty_array_is_no_data_but_garbage_is_an_error() {
        let empty: Vec<FmpSplitDto> = parse_response_array(json!([]), "no splits").unwrap();
        assert!(empty.is_empty());

        let garbage = parse_response_array::<FmpSplitDto>(json!([{ "foo": 1 }]), "no splits");
        assert!(garbage.is_err());

        let not_array = parse_response_array::<FmpSplitDto>(json!({ "Error Message": "x" }), "e");
        assert!(not_array.is_err());
    }

    #[test]
    fn provider_symbols_carry_exchange_suffix() {
        assert_eq!(provider_symbol(&symbol("D05"), Currency::Sgd), "D05.SI");
        assert_eq!(provider_symbol(&symbol("RELIANCE"), Currency::Inr), "RELIANCE.NS");
        assert_eq!(provider_symbol(&symbol("Z74.SI"), Currency::Sgd), "Z74.SI");
        assert_eq!(provider_symbol(&symbol("AAPL"), Currency::Usd), "AAPL");
    }

    #[tokio::test]
    async fn retry_recovers_from_transient_failures() {
        let attempts = AtomicUsize::new(0);

        let result = fetch_with_retry("flaky", 3, 0, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    anyhow::bail!("temporarily down");
                }
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_gives_up_after_the_bound() {
        let attempts = AtomicUsize::new(0);

        let result: anyhow::Result<()> = fetch_with_retry("down", 2, 0, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { anyhow::bail!("always down") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn static_data_serves_and_fails_on_request() {
        let data = StaticReferenceData::new()
            .with_split(SplitEvent::new(symbol("NVDA"), date(2024, 6, 10), dec!(10)))
            .with_rate(Currency::Eur, date(2024, 1, 2), dec!(1.09))
            .with_rate(Currency::Eur, date(2024, 3, 1), dec!(1.08))
            .fail_prices(&symbol("NVDA"));

        let splits = data.splits(&symbol("NVDA"), Currency::Usd).await.unwrap();
        let rates = data
            .rates(Currency::Eur, Currency::Usd, date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();
        let prices = data
            .history(&symbol("NVDA"), Currency::Usd, date(2024, 1, 1), date(2024, 1, 31))
            .await;

        assert_eq!(splits.len(), 1);
        assert_eq!(rates.len(), 1);
        assert!(prices.is_err());
    }

    #[tokio::test]
    async fn price_histories_are_cached_per_window() {
        let aapl = symbol("AAPL");
        let data = StaticReferenceData::new()
            .with_close(&aapl, date(2024, 1, 2), dec!(185.64))
            .fail_prices(&symbol("GONE"));
        let provider = CachingPriceProvider::new(data);

        let first = provider
            .history(&aapl, Currency::Usd, date(2024, 1, 1), date(2024, 1, 5))
            .await
            .unwrap();
        let second = provider
            .history(&aapl, Currency::Usd, date(2024, 1, 1), date(2024, 1, 5))
            .await
            .unwrap();
        let failed = provider
            .history(&symbol("GONE"), Currency::Usd, date(2024, 1, 1), date(2024, 1, 5))
            .await;

        assert_eq!(first, second);
        assert!(failed.is_err());
        assert_eq!(provider.cached().await, 1);
    }
}
