#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use rust_decimal_macros::dec;

    use crate::{
        app::{
            fx::CurrencyConverter,
            returns::{
                compute_portfolio_returns, compute_returns, mark_to_market, trade_cashflows,
            },
        },
        config::FallbackPolicy,
        error::ComputationError,
        models::{
            ConvertedTrade, Currency, PortfolioValueSeries, PriceOrigin, PriceSeries, Trade,
        },
        test::fixtures::{date, symbol, trade},
    };

    fn convert(trades: Vec<Trade>) -> Vec<ConvertedTrade> {
        let converter =
            CurrencyConverter::new(Currency::Usd, HashMap::new(), FallbackPolicy::usd_defaults());
        trades
            .into_iter()
            .map(|t| converter.convert_trade(t))
            .collect()
    }

    fn market(raw: &str, points: &[(chrono::NaiveDate, rust_decimal::Decimal)]) -> PriceSeries {
        PriceSeries::new(
            symbol(raw),
            points.iter().copied().collect(),
            PriceOrigin::Market,
            vec![],
        )
    }

    #[test]
    fn open_position_marked_to_market_after_one_year() {
        let trades = convert(vec![trade(
            "ACME",
            date(2023, 1, 1),
            dec!(100),
            dec!(100),
            Currency::Usd,
        )]);
        let prices = market("ACME", &[(date(2024, 1, 1), dec!(121))]);

        let result = compute_returns(&symbol("ACME"), &trades, Some(&prices), date(2024, 1, 1));

        assert_eq!(result.cashflows().len(), 2);
        assert_eq!(*result.cashflows()[1].amount(), dec!(12100));
        assert!((result.rate().unwrap() - 0.21).abs() < 1e-4);
        assert_eq!(result.status(), "ok");
    }

    #[test]
    fn failed_prices_leave_single_buy_insufficient() {
        let trades = convert(vec![trade(
            "ACME",
            date(2023, 1, 1),
            dec!(100),
            dec!(100),
            Currency::Usd,
        )]);
        let zero = PriceSeries::new(
            symbol("ACME"),
            BTreeMap::from([(date(2024, 1, 1), dec!(0))]),
            PriceOrigin::Zero,
            vec![],
        );

        let with_zero = compute_returns(&symbol("ACME"), &trades, Some(&zero), date(2024, 1, 1));
        let without = compute_returns(&symbol("ACME"), &trades, None, date(2024, 1, 1));

        assert_eq!(
            with_zero.outcome(),
            &Err(ComputationError::InsufficientData(1))
        );
        assert_eq!(with_zero.status(), "insufficient data");
        assert_eq!(without.rate(), None);
    }

    #[test]
    fn two_buys_without_markout_are_indeterminate() {
        let trades = convert(vec![
            trade("ACME", date(2023, 1, 1), dec!(10), dec!(100), Currency::Usd),
            trade("ACME", date(2023, 6, 1), dec!(10), dec!(110), Currency::Usd),
        ]);

        let result = compute_returns(&symbol("ACME"), &trades, None, date(2024, 1, 1));

        assert_eq!(result.status(), "indeterminate");
    }

    #[test]
    fn closed_position_uses_sale_proceeds() {
        let trades = convert(vec![
            trade("ACME", date(2023, 1, 1), dec!(10), dec!(100), Currency::Usd),
            trade("ACME", date(2024, 1, 1), dec!(-10), dec!(110), Currency::Usd),
        ]);
        let prices = market("ACME", &[(date(2024, 6, 1), dec!(500))]);

        assert!(mark_to_market(&trades, Some(&prices), date(2024, 6, 1)).is_none());

        let result = compute_returns(&symbol("ACME"), &trades, Some(&prices), date(2024, 6, 1));

        assert_eq!(result.cashflows().len(), 2);
        assert!((result.rate().unwrap() - 0.10).abs() < 1e-4);
    }

    #[test]
    fn fees_reduce_cashflows() {
        let buy = Trade::new(
            symbol("ACME"),
            date(2023, 1, 1).and_hms_opt(12, 0, 0).unwrap(),
            dec!(10),
            dec!(100),
            Currency::Usd,
            dec!(1.5),
            "trades.csv".to_string(),
        );
        let sell = Trade::new(
            symbol("ACME"),
            date(2023, 6, 1).and_hms_opt(12, 0, 0).unwrap(),
            dec!(-10),
            dec!(120),
            Currency::Usd,
            dec!(2),
            "trades.csv".to_string(),
        );

        let flows = trade_cashflows(&convert(vec![buy, sell]), date(2024, 1, 1));

        assert_eq!(*flows[0].amount(), dec!(-1001.5));
        assert_eq!(*flows[1].amount(), dec!(1198));
    }

    #[test]
    fn trades_after_as_of_are_excluded() {
        let trades = convert(vec![
            trade("ACME", date(2023, 1, 1), dec!(10), dec!(100), Currency::Usd),
            trade("ACME", date(2024, 2, 1), dec!(-10), dec!(130), Currency::Usd),
        ]);
        let prices = market("ACME", &[(date(2024, 1, 1), dec!(110))]);

        let result = compute_returns(&symbol("ACME"), &trades, Some(&prices), date(2024, 1, 1));

        assert_eq!(result.cashflows().len(), 2);
        assert_eq!(*result.cashflows()[1].amount(), dec!(1100));
    }

    fn valued(points: &[(chrono::NaiveDate, rust_decimal::Decimal)]) -> PortfolioValueSeries {
        PortfolioValueSeries::new(points.iter().copied().collect(), BTreeMap::new())
    }

    #[test]
    fn portfolio_pools_every_holding() {
        let trades = convert(vec![
            trade("ACME", date(2023, 1, 1), dec!(100), dec!(100), Currency::Usd),
            trade("BETA", date(2023, 1, 1), dec!(50), dec!(100), Currency::Usd),
        ]);
        let portfolio = valued(&[
            (date(2023, 1, 1), dec!(15000)),
            (date(2024, 1, 1), dec!(18150)),
        ]);

        let result = compute_portfolio_returns(&trades, &portfolio, date(2024, 1, 1));

        assert_eq!(result.cashflows().len(), 3);
        assert_eq!(*result.cashflows()[2].amount(), dec!(18150));
        assert!((result.rate().unwrap() - 0.21).abs() < 1e-4);
        assert_eq!(result.status(), "ok");
    }

    #[test]
    fn portfolio_uses_last_value_before_as_of() {
        let trades = convert(vec![trade(
            "ACME",
            date(2023, 1, 1),
            dec!(100),
            dec!(100),
            Currency::Usd,
        )]);
        let portfolio = valued(&[(date(2023, 12, 29), dec!(12100))]);

        let result = compute_portfolio_returns(&trades, &portfolio, date(2024, 1, 1));

        assert_eq!(result.cashflows().len(), 2);
        assert_eq!(*result.cashflows()[1].date(), date(2024, 1, 1));
        assert_eq!(*result.cashflows()[1].amount(), dec!(12100));
    }

    #[test]
    fn fully_sold_portfolio_has_no_terminal_value() {
        let trades = convert(vec![
            trade("ACME", date(2023, 1, 1), dec!(100), dec!(100), Currency::Usd),
            trade("ACME", date(2024, 1, 1), dec!(-100), dec!(110), Currency::Usd),
        ]);
        let portfolio = valued(&[(date(2024, 1, 1), dec!(0))]);

        let result = compute_portfolio_returns(&trades, &portfolio, date(2024, 1, 1));

        assert_eq!(result.cashflows().len(), 2);
        assert!((result.rate().unwrap() - 0.10).abs() < 1e-4);
    }

    #[test]
    fn unvalued_portfolio_is_insufficient() {
        let trades = convert(vec![trade(
            "ACME",
            date(2023, 1, 1),
            dec!(100),
            dec!(100),
            Currency::Usd,
        )]);

        let result =
            compute_portfolio_returns(&trades, &PortfolioValueSeries::default(), date(2024, 1, 1));

        assert_eq!(result.rate(), None);
        assert_eq!(
            result.outcome(),
            &Err(ComputationError::InsufficientData(1))
        );
        assert_eq!(result.status(), "insufficient data");
    }
}
