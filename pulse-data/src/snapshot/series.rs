use crate::de::{de_lenient_f64, de_lenient_i64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Behaviour shared by every series record: an optional unix-seconds `t` field.
pub trait Timestamped {
    /// Raw unix-seconds timestamp, if the record carried a usable one.
    fn t(&self) -> Option<i64>;

    /// Timestamp as a [`DateTime<Utc>`], if present and in range.
    fn time(&self) -> Option<DateTime<Utc>> {
        self.t().and_then(|t| DateTime::from_timestamp(t, 0))
    }
}

/// OHLCV candle record (`ohlcv` series).
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default, Deserialize, Serialize)]
pub struct Candle {
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub t: Option<i64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub o: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub h: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub l: Option<f64>,
    /// Close.
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub c: Option<f64>,
    /// Volume.
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub v: Option<f64>,
}

/// Single-value record used by the open interest (`oi`) and funding rate (`fr`) series, where
/// `c` is the closing value of the interval.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default, Deserialize, Serialize)]
pub struct ValuePoint {
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub t: Option<i64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub c: Option<f64>,
}

/// Liquidation record (`liq` series).
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default, Deserialize, Serialize)]
pub struct LiquidationPoint {
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub t: Option<i64>,
    /// Long liquidations.
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub l: Option<f64>,
    /// Short liquidations.
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub s: Option<f64>,
}

impl LiquidationPoint {
    /// Combined long + short liquidations, present only when both sides are.
    pub fn total(&self) -> Option<f64> {
        Some(self.l? + self.s?)
    }
}

/// Long/short ratio record (`lsr` series).
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default, Deserialize, Serialize)]
pub struct RatioPoint {
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub t: Option<i64>,
    /// Ratio of long to short accounts.
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub r: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub l: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub s: Option<f64>,
}

macro_rules! impl_timestamped {
    ($($record:ty),+ $(,)?) => {
        $(
            impl Timestamped for $record {
                fn t(&self) -> Option<i64> {
                    self.t
                }
            }
        )+
    };
}

impl_timestamped!(Candle, ValuePoint, LiquidationPoint, RatioPoint);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_de_candle_malformed_field_is_missing() {
        let candle: Candle = serde_json::from_value(json!({
            "t": 1_735_689_600,
            "o": "100.5",
            "h": 101,
            "l": "oops",
            "c": 100.75
        }))
        .unwrap();

        assert_eq!(
            candle,
            Candle {
                t: Some(1_735_689_600),
                o: Some(100.5),
                h: Some(101.0),
                l: None,
                c: Some(100.75),
                v: None,
            }
        );
    }

    #[test]
    fn test_liquidation_total() {
        struct TestCase {
            input: LiquidationPoint,
            expected: Option<f64>,
        }

        let tests = vec![
            TestCase {
                // TC0: both sides present
                input: LiquidationPoint { t: Some(0), l: Some(1.5), s: Some(2.0) },
                expected: Some(3.5),
            },
            TestCase {
                // TC1: short side missing
                input: LiquidationPoint { t: Some(0), l: Some(1.5), s: None },
                expected: None,
            },
            TestCase {
                // TC2: nothing present
                input: LiquidationPoint::default(),
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(test.input.total(), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_timestamped_time() {
        let point = ValuePoint { t: Some(1_735_689_600), c: Some(0.0001) };
        assert_eq!(point.time().unwrap().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(ValuePoint::default().time(), None);
    }
}
