//! Assembly of per-snapshot reports and per-symbol histories from a store.

use crate::{
    anomaly::{Alert, AnomalyDetector},
    config::{AlertConfig, DigestConfig},
    delta::{AssetDelta, DeltaCalculator, SignedDelta},
    digest::DigestAligner,
    error::ReportError,
    summary::{SummaryRow, summarize},
};
use pulse_data::{
    digest::DigestDocument,
    snapshot::{Snapshot, SnapshotId},
    store::{DigestStore, SnapshotStore},
};
use serde::Serialize;
use smol_str::SmolStr;
use std::fmt;
use tracing::{debug, info, warn};

/// Analysis of one asset of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReport {
    pub symbol: SmolStr,
    pub alerts: Vec<Alert>,
    pub delta: AssetDelta,
    /// Aligned digest text, empty when no digest covers the asset.
    pub digest: String,
}

/// Analysis of a whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PulseReport {
    pub snapshot: SnapshotId,
    pub previous: Option<SnapshotId>,
    pub assets: Vec<AssetReport>,
    pub summary: Vec<SummaryRow>,
}

/// Last close & close delta of one symbol in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub snapshot: SnapshotId,
    pub close: Option<f64>,
    pub close_delta: Option<SignedDelta>,
}

/// Combines the [`AnomalyDetector`], [`DeltaCalculator`] & [`DigestAligner`] over whole
/// snapshots.
#[derive(Debug, Clone, Default)]
pub struct PulseAnalyzer {
    detector: AnomalyDetector,
    calculator: DeltaCalculator,
    aligner: DigestAligner,
}

impl PulseAnalyzer {
    pub fn new(alert: AlertConfig, digest: DigestConfig) -> Self {
        Self {
            detector: AnomalyDetector::new(alert),
            calculator: DeltaCalculator::default(),
            aligner: DigestAligner::new(digest),
        }
    }

    pub fn with_calculator(mut self, calculator: DeltaCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Analyse `current` against the `previous` snapshot of the sequence (if any), aligning the
    /// chronologically ordered `digests` with it.
    pub fn analyze(
        &self,
        current: &Snapshot,
        previous: Option<&Snapshot>,
        digests: &[DigestDocument],
    ) -> PulseReport {
        let assets = current
            .iter()
            .map(|record| {
                let previous_record = previous.and_then(|previous| previous.get(&record.symbol));
                AssetReport {
                    symbol: record.symbol.clone(),
                    alerts: self.detector.detect(record),
                    delta: self.calculator.compute(record, previous_record),
                    digest: self.aligner.align(digests, current.id, &record.symbol),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            snapshot = %current.id,
            assets = assets.len(),
            alerts = assets.iter().map(|asset| asset.alerts.len()).sum::<usize>(),
            "analysed snapshot"
        );

        PulseReport {
            snapshot: current.id,
            previous: previous.map(|previous| previous.id),
            assets,
            summary: summarize(&self.calculator, current, previous),
        }
    }

    /// Load & analyse the `selected` snapshot (default: the latest) and its predecessor from
    /// `store`.
    pub fn report<Store>(
        &self,
        store: &Store,
        selected: Option<SnapshotId>,
    ) -> Result<PulseReport, ReportError>
    where
        Store: SnapshotStore + DigestStore,
    {
        let ids = store.snapshot_ids()?;
        let position = match selected {
            Some(id) => ids
                .iter()
                .position(|candidate| *candidate == id)
                .ok_or(ReportError::UnknownSnapshot(id))?,
            None => ids.len().checked_sub(1).ok_or(ReportError::NoSnapshots)?,
        };

        let current = store.load_snapshot(ids[position])?;
        let previous = match position.checked_sub(1) {
            Some(previous) => Some(store.load_snapshot(ids[previous])?),
            None => None,
        };
        let digests = load_digests_lenient(store)?;

        info!(
            snapshot = %current.id,
            previous = ?previous.as_ref().map(|previous| previous.id.to_string()),
            digests = digests.len(),
            "building pulse report"
        );

        Ok(self.analyze(&current, previous.as_ref(), &digests))
    }

    /// Last close & close delta of `symbol` across every snapshot in `store`, oldest first.
    ///
    /// Deltas compare against the immediately preceding snapshot only, so they are absent for
    /// the first snapshot and wherever either snapshot lacks the symbol.
    pub fn history<Store>(&self, store: &Store, symbol: &str) -> Result<Vec<HistoryRow>, ReportError>
    where
        Store: SnapshotStore,
    {
        let ids = store.snapshot_ids()?;
        if ids.is_empty() {
            return Err(ReportError::NoSnapshots);
        }

        let mut rows = Vec::with_capacity(ids.len());
        let mut previous: Option<Snapshot> = None;

        for id in ids {
            let current = store.load_snapshot(id)?;
            let record = current.get(symbol);
            let previous_record = previous.as_ref().and_then(|previous| previous.get(symbol));

            rows.push(HistoryRow {
                snapshot: id,
                close: record.and_then(|record| record.last_close()),
                close_delta: record.and_then(|record| {
                    self.calculator.compute(record, previous_record).close
                }),
            });

            previous = Some(current);
        }

        Ok(rows)
    }
}

/// Placeholder rendered for absent values.
const ABSENT: &str = "n/a";

fn display_opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |value| value.to_string())
}

fn display_opt_f64(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| ABSENT.to_string(), |value| format!("{:.*}", precision, value))
}

impl fmt::Display for PulseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Market pulse {} (previous: {})",
            self.snapshot,
            display_opt(self.previous)
        )?;

        for asset in &self.assets {
            writeln!(f)?;
            writeln!(f, "== {} ==", asset.symbol)?;
            writeln!(
                f,
                "close delta: {}  oi delta: {}  24h change: {}%  24h volume: {}",
                display_opt(asset.delta.close),
                display_opt(asset.delta.open_interest),
                display_opt_f64(asset.delta.window_change_pct, 2),
                display_opt_f64(asset.delta.window_volume, 2),
            )?;

            if asset.alerts.is_empty() {
                writeln!(f, "alerts: none")?;
            } else {
                for alert in &asset.alerts {
                    writeln!(f, "alert: {}", alert)?;
                }
            }

            if !asset.digest.is_empty() {
                writeln!(f, "digest:")?;
                for line in asset.digest.lines() {
                    writeln!(f, "  {}", line)?;
                }
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:<20} {:>14} {:>10} {:>16} {:>10} {:>8} {:>14}",
            "symbol", "close", "delta", "oi", "funding", "lsr", "liquidations"
        )?;
        for row in &self.summary {
            writeln!(
                f,
                "{:<20} {:>14} {:>10} {:>16} {:>10} {:>8} {:>14}",
                row.symbol.as_str(),
                display_opt_f64(row.close, 2),
                display_opt(row.close_delta),
                display_opt_f64(row.open_interest, 2),
                display_opt_f64(row.funding_rate, 4),
                display_opt_f64(row.long_short_ratio, 2),
                display_opt_f64(row.liquidation_sum, 2),
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for HistoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  close: {}  delta: {}",
            self.snapshot,
            display_opt_f64(self.close, 2),
            display_opt(self.close_delta)
        )
    }
}

/// Load every listed digest, skipping (with a warning) any that cannot be read or decoded.
fn load_digests_lenient<Store>(store: &Store) -> Result<Vec<DigestDocument>, ReportError>
where
    Store: DigestStore,
{
    let digests = store
        .digest_ids()?
        .into_iter()
        .filter_map(|id| match store.load_digest(id) {
            Ok(digest) => Some(digest),
            Err(error) => {
                warn!(digest = %id, %error, "skipping unreadable digest");
                None
            }
        })
        .collect();

    Ok(digests)
}
