pub mod calc;
pub mod export;
pub mod fx;
pub mod ledger;
pub mod portfolio;
pub mod positions;
pub mod prices;
pub mod returns;
pub mod splits;
pub mod utils;

pub use fx::CurrencyConverter;
pub use ledger::{Ledger, load_ledger};
pub use prices::PriceResolver;
