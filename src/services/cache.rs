use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::reference_data::PriceProvider;
use crate::models::{Currency, PriceHistory, Symbol};

type CacheKey = (Symbol, NaiveDate, NaiveDate);

/// Memoizes successful price histories of an inner provider. Failures are not
/// cached so a later run retries them.
pub struct CachingPriceProvider<P> {
    inner: P,
    cache: Mutex<HashMap<CacheKey, PriceHistory>>,
}

impl<P: PriceProvider> CachingPriceProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn cached(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait]
impl<P: PriceProvider> PriceProvider for CachingPriceProvider<P> {
    async fn history(
        &self,
        symbol: &Symbol,
        currency: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory> {
        let key = (symbol.clone(), start, end);
        if let Some(history) = self.cache.lock().await.get(&key) {
            log::debug!("Price cache hit for {}", symbol);
            return Ok(history.clone());
        }

        let history = self.inner.history(symbol, currency, start, end).await?;
        self.cache.lock().await.insert(key, history.clone());
        Ok(history)
    }
}
