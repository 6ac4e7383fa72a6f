pub mod analyzer_service;
pub mod cache;
pub mod reference_data;
pub mod static_data;

pub use analyzer_service::{Analysis, Analyzer};
pub use cache::CachingPriceProvider;
pub use reference_data::{PriceProvider, RateProvider, SplitProvider};
pub use static_data::StaticReferenceData;
