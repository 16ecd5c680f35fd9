use serde::Serialize;

use crate::{models::request_params::BarsRequestParams, providers::ProviderError};

/// Body of a POST to the `info` endpoint.
///
/// Serializes as `{"type":"meta"}` or
/// `{"type":"candleSnapshot","req":{...}}`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InfoRequest<'a> {
    Meta,
    CandleSnapshot { req: CandleSnapshotReq<'a> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleSnapshotReq<'a> {
    pub coin: &'a str,
    pub interval: String,
    pub start_time: i64,
    pub end_time: i64,
}

/// Rejects requests the upstream would refuse anyway, before any I/O.
pub fn validate_window(params: &BarsRequestParams) -> Result<(), ProviderError> {
    if params.symbol.trim().is_empty() {
        return Err(ProviderError::Validation("symbol must not be empty".into()));
    }
    if params.start > params.end {
        return Err(ProviderError::Validation(format!(
            "window start {} is after end {}",
            params.start, params.end
        )));
    }
    Ok(())
}

/// Builds the candle snapshot body for one symbol and window.
pub fn construct_params(params: &BarsRequestParams) -> InfoRequest<'_> {
    InfoRequest::CandleSnapshot {
        req: CandleSnapshotReq {
            coin: &params.symbol,
            interval: params.timeframe.to_string(),
            start_time: params.start_ms(),
            end_time: params.end_ms(),
        },
    }
}
