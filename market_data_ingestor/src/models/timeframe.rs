//! Bar widths ("granularity") understood by the upstream candle endpoint.
//!
//! A [`TimeFrame`] is `amount × unit`, but only a fixed set of combinations is
//! accepted upstream. Construction goes through [`TimeFrame::new`], which
//! rejects anything outside [`TimeFrame::SUPPORTED`], so a value that exists is
//! always sendable. The wire label (`"1h"`, `"15m"`, `"1M"`) is both the
//! [`Display`](fmt::Display) output and the [`FromStr`] input.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Unsupported amount for {unit:?}: {amount}")]
    UnsupportedAmount { unit: TimeFrameUnit, amount: u32 },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl TimeFrameUnit {
    const fn suffix(self) -> &'static str {
        match self {
            TimeFrameUnit::Minute => "m",
            TimeFrameUnit::Hour => "h",
            TimeFrameUnit::Day => "d",
            TimeFrameUnit::Week => "w",
            TimeFrameUnit::Month => "M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeFrame {
    amount: u32,
    unit: TimeFrameUnit,
}

impl TimeFrame {
    /// Every bar width the candle endpoint accepts.
    pub const SUPPORTED: &'static [(u32, TimeFrameUnit)] = &[
        (1, TimeFrameUnit::Minute),
        (3, TimeFrameUnit::Minute),
        (5, TimeFrameUnit::Minute),
        (15, TimeFrameUnit::Minute),
        (30, TimeFrameUnit::Minute),
        (1, TimeFrameUnit::Hour),
        (2, TimeFrameUnit::Hour),
        (4, TimeFrameUnit::Hour),
        (8, TimeFrameUnit::Hour),
        (12, TimeFrameUnit::Hour),
        (1, TimeFrameUnit::Day),
        (3, TimeFrameUnit::Day),
        (1, TimeFrameUnit::Week),
        (1, TimeFrameUnit::Month),
    ];

    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        Self::validate(amount, unit)?;
        Ok(Self { amount, unit })
    }

    pub fn minutes(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Minute)
    }

    pub fn hours(amount: u32) -> Result<Self, TimeFrameError> {
        Self::new(amount, TimeFrameUnit::Hour)
    }

    pub fn day() -> Self {
        Self {
            amount: 1,
            unit: TimeFrameUnit::Day,
        }
    }

    pub const fn unit(&self) -> TimeFrameUnit {
        self.unit
    }

    fn validate(amount: u32, unit: TimeFrameUnit) -> Result<(), TimeFrameError> {
        if Self::SUPPORTED.contains(&(amount, unit)) {
            Ok(())
        } else {
            Err(TimeFrameError::UnsupportedAmount { unit, amount })
        }
    }
}

impl Default for TimeFrame {
    fn default() -> Self {
        Self {
            amount: 1,
            unit: TimeFrameUnit::Hour,
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .filter(|&i| i > 0)
            .ok_or_else(|| TimeFrameError::InvalidInput {
                message: format!("expected <amount><unit>, got {s:?}"),
            })?;
        let (digits, unit) = s.split_at(split);
        let amount: u32 = digits.parse().map_err(|_| TimeFrameError::InvalidInput {
            message: format!("invalid amount {digits:?}"),
        })?;
        // "M" is month; everything else is case-insensitive.
        let unit = match unit {
            "M" => TimeFrameUnit::Month,
            other => match other.to_lowercase().as_str() {
                "m" | "min" => TimeFrameUnit::Minute,
                "h" | "hr" => TimeFrameUnit::Hour,
                "d" => TimeFrameUnit::Day,
                "w" | "wk" => TimeFrameUnit::Week,
                "mo" => TimeFrameUnit::Month,
                _ => {
                    return Err(TimeFrameError::InvalidInput {
                        message: format!("Invalid timeframe unit: {other}"),
                    });
                }
            },
        };
        TimeFrame::new(amount, unit)
    }
}

impl TryFrom<String> for TimeFrame {
    type Error = TimeFrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeFrame> for String {
    fn from(tf: TimeFrame) -> Self {
        tf.to_string()
    }
}
