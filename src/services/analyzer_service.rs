use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use derive_getters::Getters;
use futures::{StreamExt, stream};

use super::reference_data::{PriceProvider, RateProvider, SplitProvider, fetch_with_retry};
use crate::{
    app::{
        fx::CurrencyConverter,
        ledger::Ledger,
        portfolio::{summarize, value_portfolio},
        positions::track_positions,
        prices::PriceResolver,
        returns::{compute_portfolio_returns, compute_returns},
        splits::adjust_holding,
    },
    config::AnalyzerConfig,
    error::DataGapError,
    models::{
        ConvertedTrade, Currency, DailyPosition, Holding, PortfolioSummary, PortfolioValueSeries,
        PortfolioXirr, PriceHistory, PriceSeries, QualityReport, RateHistory, SplitEvent, Symbol,
        XirrResult,
    },
};

/// Everything one run produced, plus the manifest of what degraded.
#[derive(Clone, Debug, Getters)]
pub struct Analysis {
    base_currency: Currency,
    as_of: NaiveDate,
    holdings: Vec<Holding>,
    trades: Vec<ConvertedTrade>,
    positions: BTreeMap<Symbol, DailyPosition>,
    prices: BTreeMap<Symbol, PriceSeries>,
    portfolio: PortfolioValueSeries,
    returns: BTreeMap<Symbol, XirrResult>,
    portfolio_returns: PortfolioXirr,
    summary: PortfolioSummary,
    quality: QualityReport,
}

impl Analysis {
    pub fn holding(&self, symbol: &Symbol) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol() == symbol)
    }
}

/// Per-symbol reference data as it came back from the providers.
struct SymbolData {
    splits: Result<Vec<SplitEvent>, String>,
    prices: Result<PriceHistory, String>,
}

pub struct Analyzer<S, R, P> {
    config: AnalyzerConfig,
    splits: S,
    rates: R,
    prices: P,
}

impl<S, R, P> Analyzer<S, R, P>
where
    S: SplitProvider,
    R: RateProvider,
    P: PriceProvider,
{
    pub fn new(config: AnalyzerConfig, splits: S, rates: R, prices: P) -> Self {
        Self {
            config,
            splits,
            rates,
            prices,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Fetches reference data for every holding of `ledger`, then values the
    /// portfolio daily from the first trade through `as_of`.
    ///
    /// Provider failures never abort the run; they degrade to fallbacks that
    /// are listed in the quality report.
    pub async fn run(&self, ledger: &Ledger, as_of: NaiveDate) -> Analysis {
        let base = *self.config.base_currency();
        let mut quality = QualityReport::default();

        for skipped in ledger.skipped_files() {
            quality.gap(skipped.clone());
        }
        for rejected in ledger.rejected() {
            quality.rejected(rejected.clone());
        }

        let holdings = Holding::index(ledger.trades());
        let start = ledger.earliest_date().unwrap_or(as_of).min(as_of);

        log::info!(
            "Analyzing {} trade(s) across {} holding(s) from {} to {} in {}",
            ledger.trades().len(),
            holdings.len(),
            start,
            as_of,
            base
        );

        let rates = self.fetch_rates(&holdings, start, as_of, &mut quality).await;
        let mut fetched = self.fetch_symbols(&holdings, start, as_of).await;

        log::info!("Reference data fetched, computing");

        let converter = CurrencyConverter::new(base, rates, self.config.fallback().clone());
        let resolver = PriceResolver::new(&converter, self.config.fallback(), start, as_of);

        let mut adjusted_holdings = Vec::with_capacity(holdings.len());
        let mut trades = Vec::new();
        let mut positions = Vec::with_capacity(holdings.len());
        let mut prices = BTreeMap::new();
        let mut returns = BTreeMap::new();

        for holding in holdings {
            let symbol = holding.symbol().clone();
            let data = fetched.remove(&symbol).unwrap_or_else(|| SymbolData {
                splits: Err("not fetched".to_string()),
                prices: Err("not fetched".to_string()),
            });

            let (holding, adjusted, gap) =
                adjust_holding(holding, ledger.trades(), data.splits).into_parts();
            if let Some(gap) = gap {
                quality.gap(gap);
            }

            let position =
                track_positions(&symbol, &adjusted, as_of, *self.config.short_positions());
            if let Some(first) = position.short_dates().first() {
                quality.gap(DataGapError::ShortPosition {
                    symbol: symbol.clone(),
                    first: *first,
                    count: position.short_dates().len(),
                });
            }

            let history = match data.prices {
                Ok(history) if !history.is_empty() => history,
                Ok(history) => {
                    quality.gap(DataGapError::PricesUnavailable {
                        symbol: symbol.clone(),
                        reason: "provider returned no closes".to_string(),
                    });
                    history
                }
                Err(reason) => {
                    quality.gap(DataGapError::PricesUnavailable {
                        symbol: symbol.clone(),
                        reason,
                    });
                    PriceHistory::default()
                }
            };
            let series = resolver.resolve(&holding, &history, &adjusted);

            if let Some(first) = series.approximate_dates().first() {
                quality.gap(DataGapError::FallbackRate {
                    symbol: symbol.clone(),
                    currency: *holding.currency(),
                    rate: self.config.fallback().rate_for(*holding.currency()),
                    first: *first,
                    days: series.approximate_dates().len(),
                });
            }

            let converted: Vec<ConvertedTrade> = adjusted
                .into_iter()
                .map(|trade| converter.convert_trade(trade))
                .collect();

            let result = compute_returns(&symbol, &converted, Some(&series), as_of);
            if let Err(error) = result.outcome() {
                quality.computation(symbol.clone(), error.clone());
            }

            trades.extend(converted);
            positions.push(position);
            prices.insert(symbol.clone(), series);
            returns.insert(symbol, result);
            adjusted_holdings.push(holding);
        }

        trades.sort_by_key(|t| *t.trade().timestamp());

        let portfolio = value_portfolio(&positions, &prices);
        let summary = summarize(&portfolio, &positions, &prices, &trades);
        let portfolio_returns = compute_portfolio_returns(&trades, &portfolio, as_of);
        if let Err(error) = portfolio_returns.outcome() {
            log::warn!("Portfolio XIRR: {}", error);
        }

        log::info!(
            "Valued {} day(s), {} quality note(s)",
            portfolio.totals().len(),
            quality.notes().len()
        );

        Analysis {
            base_currency: base,
            as_of,
            holdings: adjusted_holdings,
            trades,
            positions: positions
                .into_iter()
                .map(|p| (p.symbol().clone(), p))
                .collect(),
            prices,
            portfolio,
            returns,
            portfolio_returns,
            summary,
            quality,
        }
    }

    /// One rate history per non-base currency of the ledger.
    async fn fetch_rates(
        &self,
        holdings: &[Holding],
        start: NaiveDate,
        end: NaiveDate,
        quality: &mut QualityReport,
    ) -> HashMap<Currency, RateHistory> {
        let base = *self.config.base_currency();
        let currencies: BTreeSet<Currency> = holdings
            .iter()
            .map(|h| *h.currency())
            .filter(|c| *c != base)
            .collect();

        let results: Vec<(Currency, anyhow::Result<RateHistory>)> =
            stream::iter(currencies)
                .map(|currency| async move {
                    let what = format!("{} rates", currency);
                    let result = fetch_with_retry(
                        &what,
                        *self.config.fetch_retries(),
                        *self.config.retry_base_delay_ms(),
                        || self.rates.rates(currency, base, start, end),
                    )
                    .await;
                    (currency, result)
                })
                .buffer_unordered(*self.config.max_concurrency())
                .collect()
                .await;

        let mut rates = HashMap::new();
        for (currency, result) in results {
            match result {
                Ok(history) if !history.is_empty() => {
                    log::debug!("{} {} rate(s) for {}", history.len(), base, currency);
                    rates.insert(currency, history);
                }
                Ok(_) => quality.gap(DataGapError::RatesUnavailable {
                    currency,
                    reason: "provider returned no rates".to_string(),
                }),
                Err(err) => quality.gap(DataGapError::RatesUnavailable {
                    currency,
                    reason: format!("{:#}", err),
                }),
            }
        }

        rates
    }

    async fn fetch_symbols(
        &self,
        holdings: &[Holding],
        start: NaiveDate,
        end: NaiveDate,
    ) -> HashMap<Symbol, SymbolData> {
        let retries = *self.config.fetch_retries();
        let delay = *self.config.retry_base_delay_ms();

        stream::iter(holdings)
            .map(|holding| async move {
                let symbol = holding.symbol();
                let currency = *holding.currency();
                let split_what = format!("{} splits", symbol);
                let price_what = format!("{} prices", symbol);

                let (splits, prices) = futures::join!(
                    fetch_with_retry(&split_what, retries, delay, || {
                        self.splits.splits(symbol, currency)
                    }),
                    fetch_with_retry(&price_what, retries, delay, || {
                        self.prices.history(symbol, currency, start, end)
                    }),
                );

                let data = SymbolData {
                    splits: splits.map_err(|e| format!("{:#}", e)),
                    prices: prices.map_err(|e| format!("{:#}", e)),
                };
                (symbol.clone(), data)
            })
            .buffer_unordered(*self.config.max_concurrency())
            .collect()
            .await
    }
}
