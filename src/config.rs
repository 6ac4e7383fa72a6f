use std::collections::HashMap;

use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum_macros::{Display, EnumString};

use crate::{error::FatalConfigError, models::Currency};

const DEFAULT_MAX_CONCURRENCY: usize = 4;
const DEFAULT_FETCH_RETRIES: usize = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;

/// How a symbol without any retrievable price history is valued.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum MissingPricePolicy {
    Zero,
    #[strum(serialize = "last-trade")]
    LastTradePrice,
}

/// What the position tracker does when a sell exceeds the quantity held.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum ShortPositionPolicy {
    Allow,
    Flag,
}

/// Constants used when reference data is missing entirely.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct FallbackPolicy {
    rates: HashMap<Currency, Decimal>,
    default_rate: Decimal,
    missing_price: MissingPricePolicy,
}

impl FallbackPolicy {
    /// Approximate USD rates for the currencies the importer usually sees.
    pub fn usd_defaults() -> FallbackPolicy {
        FallbackPolicy::new(
            HashMap::from([(Currency::Sgd, dec!(0.74)), (Currency::Inr, dec!(0.012))]),
            Decimal::ONE,
            MissingPricePolicy::Zero,
        )
    }

    pub fn rate_for(&self, currency: Currency) -> Decimal {
        self.rates
            .get(&currency)
            .copied()
            .unwrap_or(self.default_rate)
    }

    pub fn with_missing_price(self, missing_price: MissingPricePolicy) -> FallbackPolicy {
        FallbackPolicy {
            missing_price,
            ..self
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::new(HashMap::new(), Decimal::ONE, MissingPricePolicy::Zero)
    }
}

#[derive(Clone, Debug, Getters)]
pub struct AnalyzerConfig {
    base_currency: Currency,
    max_concurrency: usize,
    fetch_retries: usize,
    retry_base_delay_ms: u64,
    fallback: FallbackPolicy,
    short_positions: ShortPositionPolicy,
    fmp_api_key: Option<String>,
}

impl AnalyzerConfig {
    pub fn new(base_currency: Currency) -> Self {
        let fallback = if base_currency == Currency::Usd {
            FallbackPolicy::usd_defaults()
        } else {
            FallbackPolicy::default()
        };

        Self {
            base_currency,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_retries: DEFAULT_FETCH_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            fallback,
            short_positions: ShortPositionPolicy::Flag,
            fmp_api_key: None,
        }
    }

    /// Builds the configuration from environment-style keys. `lookup` is
    /// usually `std::env::var` after `.env` has been loaded.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FatalConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup("BASE_CURRENCY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(FatalConfigError::MissingBaseCurrency)?;
        let base_currency = Currency::parse_code(&base)
            .ok_or_else(|| FatalConfigError::UnknownBaseCurrency(base.clone()))?;

        let mut config = Self::new(base_currency);

        if let Some(value) = lookup("MAX_CONCURRENCY") {
            config = config.with_max_concurrency(parse_value("MAX_CONCURRENCY", &value)?)?;
        }
        if let Some(value) = lookup("FETCH_RETRIES") {
            config.fetch_retries = parse_value("FETCH_RETRIES", &value)?;
        }
        if let Some(value) = lookup("RETRY_BASE_DELAY_MS") {
            config.retry_base_delay_ms = parse_value("RETRY_BASE_DELAY_MS", &value)?;
        }
        if let Some(value) = lookup("FALLBACK_RATES") {
            config.fallback.rates = parse_fallback_rates(&value)?;
        }
        if let Some(value) = lookup("FALLBACK_DEFAULT_RATE") {
            let rate: Decimal = parse_value("FALLBACK_DEFAULT_RATE", &value)?;
            if rate <= Decimal::ZERO {
                return Err(invalid("FALLBACK_DEFAULT_RATE", &value));
            }
            config.fallback.default_rate = rate;
        }
        if let Some(value) = lookup("MISSING_PRICE_POLICY") {
            config.fallback.missing_price = parse_value("MISSING_PRICE_POLICY", &value)?;
        }
        if let Some(value) = lookup("SHORT_POSITION_POLICY") {
            config.short_positions = parse_value("SHORT_POSITION_POLICY", &value)?;
        }
        config.fmp_api_key = lookup("FMP_API_KEY").filter(|k| !k.is_empty());

        Ok(config)
    }

    pub fn with_base_currency(self, base_currency: Currency) -> Self {
        if base_currency == self.base_currency {
            return self;
        }
        let fallback = if base_currency == Currency::Usd {
            FallbackPolicy::usd_defaults().with_missing_price(self.fallback.missing_price)
        } else {
            FallbackPolicy::default().with_missing_price(self.fallback.missing_price)
        };
        Self {
            base_currency,
            fallback,
            ..self
        }
    }

    pub fn with_max_concurrency(self, max_concurrency: usize) -> Result<Self, FatalConfigError> {
        if max_concurrency == 0 {
            return Err(invalid("MAX_CONCURRENCY", "0"));
        }
        Ok(Self {
            max_concurrency,
            ..self
        })
    }

    pub fn with_fallback(self, fallback: FallbackPolicy) -> Self {
        Self { fallback, ..self }
    }

    pub fn with_short_positions(self, short_positions: ShortPositionPolicy) -> Self {
        Self {
            short_positions,
            ..self
        }
    }

    pub fn with_fetch_retries(self, fetch_retries: usize, retry_base_delay_ms: u64) -> Self {
        Self {
            fetch_retries,
            retry_base_delay_ms,
            ..self
        }
    }
}

fn invalid(key: &str, value: &str) -> FatalConfigError {
    FatalConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, FatalConfigError> {
    value.trim().parse::<T>().map_err(|_| invalid(key, value))
}

/// Parses `SGD=0.74,INR=0.012`.
fn parse_fallback_rates(value: &str) -> Result<HashMap<Currency, Decimal>, FatalConfigError> {
    let mut rates = HashMap::new();

    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (code, rate) = entry
            .split_once('=')
            .ok_or_else(|| invalid("FALLBACK_RATES", entry))?;
        let currency =
            Currency::parse_code(code).ok_or_else(|| invalid("FALLBACK_RATES", entry))?;
        let rate: Decimal = parse_value("FALLBACK_RATES", rate)?;
        if rate <= Decimal::ZERO {
            return Err(invalid("FALLBACK_RATES", entry));
        }
        rates.insert(currency, rate);
    }

    Ok(rates)
}
