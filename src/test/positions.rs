#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::{
        app::positions::track_positions,
        config::ShortPositionPolicy,
        models::Currency,
        test::fixtures::{date, symbol, trade},
    };

    #[test]
    fn buys_only_never_decrease() {
        let trades = vec![
            trade("VWRA", date(2024, 1, 3), dec!(10), dec!(110), Currency::Usd),
            trade("VWRA", date(2024, 1, 3), dec!(2.5), dec!(110), Currency::Usd),
            trade("VWRA", date(2024, 2, 14), dec!(4), dec!(112), Currency::Usd),
            trade("VWRA", date(2024, 3, 1), dec!(0.25), dec!(115), Currency::Usd),
        ];

        let position = track_positions(
            &symbol("VWRA"),
            &trades,
            date(2024, 3, 31),
            ShortPositionPolicy::Flag,
        );

        let quantities: Vec<_> = position.quantities().values().copied().collect();
        assert!(quantities.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(position.quantity_on(date(2024, 1, 3)), Some(dec!(12.5)));
        assert_eq!(position.quantity_on(date(2024, 2, 13)), Some(dec!(12.5)));
        assert_eq!(position.last(), Some((date(2024, 3, 31), dec!(16.75))));
        assert_eq!(position.quantity_on(date(2024, 1, 2)), None);
    }

    #[test]
    fn sells_reduce_and_can_close_the_position() {
        let trades = vec![
            trade("TSLA", date(2024, 1, 3), dec!(10), dec!(240), Currency::Usd),
            trade("TSLA", date(2024, 1, 10), dec!(-4), dec!(230), Currency::Usd),
            trade("TSLA", date(2024, 1, 20), dec!(-6), dec!(210), Currency::Usd),
        ];

        let position = track_positions(
            &symbol("TSLA"),
            &trades,
            date(2024, 1, 31),
            ShortPositionPolicy::Flag,
        );

        assert_eq!(position.quantity_on(date(2024, 1, 9)), Some(dec!(10)));
        assert_eq!(position.quantity_on(date(2024, 1, 10)), Some(dec!(6)));
        assert_eq!(position.quantity_on(date(2024, 1, 31)), Some(dec!(0)));
        assert!(position.short_dates().is_empty());
    }

    #[test]
    fn oversold_days_are_flagged_only_when_asked() {
        let trades = vec![
            trade("GME", date(2024, 1, 3), dec!(5), dec!(20), Currency::Usd),
            trade("GME", date(2024, 1, 5), dec!(-8), dec!(22), Currency::Usd),
        ];

        let flagged =
            track_positions(&symbol("GME"), &trades, date(2024, 1, 7), ShortPositionPolicy::Flag);
        let allowed =
            track_positions(&symbol("GME"), &trades, date(2024, 1, 7), ShortPositionPolicy::Allow);

        assert_eq!(flagged.short_dates().len(), 3);
        assert_eq!(flagged.short_dates()[0], date(2024, 1, 5));
        assert_eq!(flagged.quantity_on(date(2024, 1, 7)), Some(dec!(-3)));
        assert!(allowed.short_dates().is_empty());
        assert_eq!(allowed.quantity_on(date(2024, 1, 7)), Some(dec!(-3)));
    }

    #[test]
    fn trades_after_the_end_are_ignored() {
        let trades = vec![
            trade("MSFT", date(2024, 1, 3), dec!(3), dec!(370), Currency::Usd),
            trade("MSFT", date(2024, 2, 1), dec!(3), dec!(400), Currency::Usd),
        ];

        let position = track_positions(
            &symbol("MSFT"),
            &trades,
            date(2024, 1, 15),
            ShortPositionPolicy::Flag,
        );

        assert_eq!(position.last(), Some((date(2024, 1, 15), dec!(3))));
    }

    #[test]
    fn no_trades_no_series() {
        let position =
            track_positions(&symbol("MSFT"), &[], date(2024, 1, 15), ShortPositionPolicy::Flag);

        assert!(position.quantities().is_empty());
        assert_eq!(position.last(), None);
    }
}
