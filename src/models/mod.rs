pub mod currency;
pub mod daily_position;
pub mod exchange_rate;
pub mod holding;
pub mod portfolio_value;
pub mod price_series;
pub mod quality;
pub mod split_event;
pub mod summary;
pub mod symbol;
pub mod trade;
pub mod xirr_result;

pub use currency::Currency;
pub use daily_position::DailyPosition;
pub use exchange_rate::{AppliedRate, RateHistory, RateSource};
pub use holding::{Holding, SplitStatus};
pub use portfolio_value::PortfolioValueSeries;
pub use price_series::{PriceBar, PriceHistory, PriceOrigin, PriceSeries};
pub use quality::{QualityNote, QualityReport, RejectedRecord};
pub use split_event::SplitEvent;
pub use summary::{CurrentHolding, PortfolioSummary};
pub use symbol::Symbol;
pub use trade::{ConvertedTrade, Trade, TradeSide};
pub use xirr_result::{Cashflow, PortfolioXirr, XirrResult};
