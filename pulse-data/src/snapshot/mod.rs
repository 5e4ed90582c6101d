use crate::{de::de_lenient_series, error::DataError};
use indexmap::{IndexMap, map::Entry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;
use tracing::{debug, warn};

pub use id::{SNAPSHOT_ID_FORMAT, SnapshotId};
pub use series::{Candle, LiquidationPoint, RatioPoint, Timestamped, ValuePoint};

mod id;

/// Series record models.
pub mod series;

/// Per-symbol order flow series contained in a [`Snapshot`].
///
/// Every series is ordered by non-decreasing `t`. A series that was absent or unusable in the
/// source document is empty.
#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
pub struct AssetRecord {
    pub symbol: SmolStr,
    #[serde(default, deserialize_with = "de_lenient_series")]
    pub ohlcv: Vec<Candle>,
    /// Open interest.
    #[serde(default, deserialize_with = "de_lenient_series")]
    pub oi: Vec<ValuePoint>,
    /// Funding rate.
    #[serde(default, deserialize_with = "de_lenient_series")]
    pub fr: Vec<ValuePoint>,
    /// Liquidations.
    #[serde(default, deserialize_with = "de_lenient_series")]
    pub liq: Vec<LiquidationPoint>,
    /// Long/short ratio.
    #[serde(default, deserialize_with = "de_lenient_series")]
    pub lsr: Vec<RatioPoint>,
}

impl AssetRecord {
    pub fn new(symbol: impl Into<SmolStr>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Close of the final OHLCV record. Absent if the series is empty or that record's close
    /// was missing/malformed.
    pub fn last_close(&self) -> Option<f64> {
        self.ohlcv.last().and_then(|candle| candle.c)
    }

    /// Value of the final open interest record.
    pub fn last_open_interest(&self) -> Option<f64> {
        self.oi.last().and_then(|point| point.c)
    }

    /// Value of the final funding rate record.
    pub fn last_funding_rate(&self) -> Option<f64> {
        self.fr.last().and_then(|point| point.c)
    }

    /// Ratio of the final long/short record.
    pub fn last_long_short_ratio(&self) -> Option<f64> {
        self.lsr.last().and_then(|point| point.r)
    }

    /// Sum of long + short liquidations over every record carrying both sides, or absent when
    /// no record does.
    pub fn liquidation_sum(&self) -> Option<f64> {
        self.liq
            .iter()
            .filter_map(LiquidationPoint::total)
            .fold(None, |sum, total| Some(sum.unwrap_or(0.0) + total))
    }
}

/// One market pulse snapshot: every [`AssetRecord`] published at a given [`SnapshotId`], keyed by
/// symbol in source order.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub assets: IndexMap<SmolStr, AssetRecord>,
}

impl Snapshot {
    /// Construct a [`Snapshot`] from asset records. Symbols must be unique, so the first record
    /// seen for a symbol wins and later duplicates are dropped.
    pub fn new<Iter>(id: SnapshotId, records: Iter) -> Self
    where
        Iter: IntoIterator<Item = AssetRecord>,
    {
        let mut assets = IndexMap::new();
        for record in records {
            match assets.entry(record.symbol.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(record);
                }
                Entry::Occupied(entry) => {
                    warn!(snapshot = %id, symbol = %entry.key(), "dropping duplicate asset record");
                }
            }
        }

        Self { id, assets }
    }

    /// Decode a snapshot document: a JSON array of asset objects.
    ///
    /// Elements that are not usable asset objects (eg/ missing `symbol`) are skipped. Only a
    /// document that is not a JSON array at all is an error.
    pub fn from_json(id: SnapshotId, json: &str) -> Result<Self, DataError> {
        let document: Value = serde_json::from_str(json).map_err(|error| DataError::Decode {
            id,
            message: error.to_string(),
        })?;

        let Value::Array(elements) = document else {
            return Err(DataError::Decode {
                id,
                message: "expected a JSON array of asset objects".to_string(),
            });
        };

        let records = elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| match serde_json::from_value::<AssetRecord>(element) {
                Ok(record) => Some(record),
                Err(error) => {
                    warn!(snapshot = %id, index, %error, "skipping undecodable asset object");
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!(snapshot = %id, assets = records.len(), "decoded snapshot");
        Ok(Self::new(id, records))
    }

    pub fn get(&self, symbol: &str) -> Option<&AssetRecord> {
        self.assets.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SmolStr> {
        self.assets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetRecord> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
