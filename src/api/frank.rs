use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;

use super::{
    frank_dto::FrankTimeSeriesDto,
    utils::{make_request, parse_response_object},
};
use crate::{
    models::{Currency, RateHistory},
    services::RateProvider,
};

const BASE_URL: &str = "https://api.frankfurter.app";

/// Daily ECB reference rates. Weekends and holidays are simply absent.
#[derive(Clone, Debug)]
pub struct FrankApi {
    client: Client,
}

impl FrankApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get_forex_history(
        &self,
        from_currency: Currency,
        to_currency: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FrankTimeSeriesDto> {
        let endpoint = format!("{}..{}", start, end);
        let params = format!("from={}&to={}", from_currency, to_currency);
        let res = make_request(&self.client, BASE_URL, &endpoint, &params)
            .await
            .with_context(|| format!("Frankfurter rates {}/{}", from_currency, to_currency))?;

        parse_response_object::<FrankTimeSeriesDto>(
            res,
            &format!(
                "No exchange rates from {} to {} between {} and {}",
                from_currency, to_currency, start, end
            ),
        )
    }
}

#[async_trait]
impl RateProvider for FrankApi {
    async fn rates(
        &self,
        currency: Currency,
        base: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateHistory> {
        let series = self.get_forex_history(currency, base, start, end).await?;
        Ok(series.to_rate_history(base))
    }
}
