use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    models::{bar::Bar, bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{
        DataProvider, ProviderError, ProviderInitError,
        hyperliquid::{
            params::{InfoRequest, construct_params, validate_window},
            response::{HyperliquidCandle, MetaResponse},
        },
    },
};

pub const BASE_URL: &str = "https://api.hyperliquid.xyz/info";

/// Per-call deadline for universe discovery.
pub const UNIVERSE_TIMEOUT: Duration = Duration::from_secs(5);
/// Per-call deadline for one candle window.
pub const CANDLE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HyperliquidProvider {
    client: Client,
    base_url: String,
}

impl HyperliquidProvider {
    /// Creates a provider talking to `base_url`.
    ///
    /// When `api_key` is given it is attached to every request as a bearer
    /// token, which keyed gateways in front of the public endpoint expect.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = api_key {
            let mut value =
                header::HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        body: &InfoRequest<'_>,
        timeout: Duration,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .post(&self.base_url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DataProvider for HyperliquidProvider {
    async fn fetch_universe(&self) -> Result<Vec<String>, ProviderError> {
        let meta: MetaResponse = self.post(&InfoRequest::Meta, UNIVERSE_TIMEOUT).await?;
        let symbols = meta.into_symbols();
        debug!(count = symbols.len(), "fetched universe");
        Ok(symbols)
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        validate_window(params)?;

        let candles: Vec<HyperliquidCandle> =
            self.post(&construct_params(params), CANDLE_TIMEOUT).await?;
        let bars: Vec<Bar> = candles.into_iter().map(Bar::from).collect();

        debug!(symbol = %params.symbol, bars = bars.len(), "fetched candles");
        Ok(BarSeries::new(params.symbol.clone(), params.timeframe, bars))
    }
}
