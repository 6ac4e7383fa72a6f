use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;

use super::{
    fmp_dto::{FmpQuoteHistoryDto, FmpSplitDto},
    utils::{make_request, parse_response_array},
};
use crate::{
    models::{Currency, PriceHistory, SplitEvent, Symbol},
    services::{PriceProvider, SplitProvider},
};

const BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Exchange suffix for listings whose ledger symbol carries none.
fn exchange_suffix(currency: Currency) -> Option<&'static str> {
    match currency {
        Currency::Sgd => Some(".SI"),
        Currency::Inr => Some(".NS"),
        _ => None,
    }
}

/// The symbol as FMP lists it, e.g. `D05` traded in SGD becomes `D05.SI`.
pub fn provider_symbol(symbol: &Symbol, currency: Currency) -> String {
    match exchange_suffix(currency) {
        Some(suffix) if !symbol.as_str().contains('.') => format!("{}{}", symbol, suffix),
        _ => symbol.to_string(),
    }
}

#[derive(Clone, Debug)]
pub struct FmpApi {
    client: Client,
    api_key: String,
}

impl FmpApi {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    async fn get(&self, endpoint: &str, query: &str) -> Result<serde_json::Value> {
        if self.api_key.is_empty() {
            bail!("FMP_API_KEY is not set");
        }
        let query = format!("{}&apikey={}", query, self.api_key);
        make_request(&self.client, BASE_URL, endpoint, &query).await
    }

    pub async fn get_splits(&self, symbol: &str) -> Result<Vec<FmpSplitDto>> {
        let res = self
            .get("splits", &format!("symbol={}", symbol))
            .await
            .with_context(|| format!("FMP splits for {}", symbol))?;
        parse_response_array(res, &format!("Malformed split data for {}", symbol))
    }

    pub async fn get_quote_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FmpQuoteHistoryDto>> {
        let res = self
            .get(
                "historical-price-eod/light",
                &format!("symbol={}&from={}&to={}", symbol, start, end),
            )
            .await
            .with_context(|| format!("FMP price history for {}", symbol))?;
        parse_response_array(res, &format!("Malformed price history for {}", symbol))
    }
}

#[async_trait]
impl SplitProvider for FmpApi {
    async fn splits(&self, symbol: &Symbol, currency: Currency) -> Result<Vec<SplitEvent>> {
        let listed = provider_symbol(symbol, currency);
        let dtos = self.get_splits(&listed).await?;

        Ok(dtos.iter().map(|dto| dto.to_split_event(symbol)).collect())
    }
}

#[async_trait]
impl PriceProvider for FmpApi {
    /// End-of-day closes, already back-adjusted for splits by FMP.
    async fn history(
        &self,
        symbol: &Symbol,
        currency: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory> {
        let listed = provider_symbol(symbol, currency);
        let dtos = self.get_quote_history(&listed, start, end).await?;
        let bars = dtos.iter().map(FmpQuoteHistoryDto::to_price_bar).collect();

        Ok(PriceHistory::new(bars, true))
    }
}
