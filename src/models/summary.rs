use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

use super::Symbol;

#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct CurrentHolding {
    symbol: Symbol,
    quantity: Decimal,
    price: Decimal,
    market_value: Decimal,
}

/// Headline figures shown next to the value chart.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct PortfolioSummary {
    holdings: Vec<CurrentHolding>,
    current_value: Decimal,
    total_invested: Decimal,
    total_sales: Decimal,
    total_gain: Decimal,
    total_return_percent: Option<Decimal>,
}
