use serde::{Deserialize, Deserializer, de::Error as _};

use crate::models::bar::Bar;

#[derive(Deserialize, Debug)]
pub struct MetaResponse {
    pub universe: Vec<UniverseEntry>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UniverseEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_delisted: Option<bool>,
}

impl MetaResponse {
    /// Listed, named symbols in upstream order.
    pub fn into_symbols(self) -> Vec<String> {
        self.universe
            .into_iter()
            .filter(|entry| !entry.is_delisted.unwrap_or(false))
            .filter_map(|entry| entry.name.filter(|name| !name.is_empty()))
            .collect()
    }
}

/// One candle as returned by `candleSnapshot`.
///
/// Prices and volume arrive as decimal strings, but number-typed values are
/// accepted too.
#[derive(Deserialize, Debug)]
pub struct HyperliquidCandle {
    #[serde(rename = "t", deserialize_with = "lenient_i64")]
    pub open_time: i64,
    #[serde(rename = "o", deserialize_with = "lenient_f64")]
    pub open: f64,
    #[serde(rename = "h", deserialize_with = "lenient_f64")]
    pub high: f64,
    #[serde(rename = "l", deserialize_with = "lenient_f64")]
    pub low: f64,
    #[serde(rename = "c", deserialize_with = "lenient_f64")]
    pub close: f64,
    #[serde(rename = "v", deserialize_with = "lenient_f64")]
    pub volume: f64,
    #[serde(rename = "n", default)]
    pub trade_count: Option<u64>,
}

impl From<HyperliquidCandle> for Bar {
    fn from(c: HyperliquidCandle) -> Self {
        Bar {
            timestamp: c.open_time,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            trade_count: c.trade_count,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(i) => Ok(i as f64),
        NumberOrString::Float(f) => Ok(f),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| D::Error::custom(format!("invalid number {s:?}: {e}"))),
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(i) => Ok(i),
        NumberOrString::Float(f) if f.fract() == 0.0 => Ok(f as i64),
        NumberOrString::Float(f) => Err(D::Error::custom(format!("expected integer, got {f}"))),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| D::Error::custom(format!("invalid integer {s:?}: {e}"))),
    }
}
