//! Master table: one row of headline figures per asset of a snapshot.

use crate::delta::{DeltaCalculator, SignedDelta};
use pulse_data::snapshot::Snapshot;
use serde::Serialize;
use smol_str::SmolStr;

/// Headline figures of one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub symbol: SmolStr,
    pub close: Option<f64>,
    pub close_delta: Option<SignedDelta>,
    pub open_interest: Option<f64>,
    pub funding_rate: Option<f64>,
    pub long_short_ratio: Option<f64>,
    /// Long + short liquidations summed across the snapshot.
    pub liquidation_sum: Option<f64>,
}

/// One [`SummaryRow`] per asset of `snapshot`, in snapshot order.
pub fn summarize(
    calculator: &DeltaCalculator,
    snapshot: &Snapshot,
    previous: Option<&Snapshot>,
) -> Vec<SummaryRow> {
    snapshot
        .iter()
        .map(|record| {
            let previous = previous.and_then(|previous| previous.get(&record.symbol));
            SummaryRow {
                symbol: record.symbol.clone(),
                close: record.last_close(),
                close_delta: calculator.compute(record, previous).close,
                open_interest: record.last_open_interest(),
                funding_rate: record.last_funding_rate(),
                long_short_ratio: record.last_long_short_ratio(),
                liquidation_sum: record.liquidation_sum(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_data::snapshot::{AssetRecord, Candle, LiquidationPoint};

    fn record(symbol: &str, close: f64) -> AssetRecord {
        let mut record = AssetRecord::new(symbol);
        record.ohlcv = vec![Candle {
            t: Some(0),
            c: Some(close),
            ..Default::default()
        }];
        record
    }

    #[test]
    fn test_summarize() {
        let mut btc = record("BTC", 105.0);
        btc.liq = vec![
            LiquidationPoint { t: Some(0), l: Some(1.0), s: Some(2.0) },
            LiquidationPoint { t: Some(60), l: Some(3.0), s: None },
        ];

        let current = Snapshot::new(
            "20250101_0400".parse().unwrap(),
            vec![btc, record("SOL", 190.0)],
        );
        let previous = Snapshot::new(
            "20250101_0000".parse().unwrap(),
            vec![record("BTC", 100.0), record("ETH", 3_300.0)],
        );

        let rows = summarize(&DeltaCalculator::default(), &current, Some(&previous));
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].symbol, "BTC");
        assert_eq!(rows[0].close, Some(105.0));
        assert_eq!(rows[0].close_delta, Some(SignedDelta(5.0)));
        assert_eq!(rows[0].liquidation_sum, Some(3.0));
        assert_eq!(rows[0].open_interest, None);

        // Symbol absent from the previous snapshot has no delta, not a zero delta
        assert_eq!(rows[1].symbol, "SOL");
        assert_eq!(rows[1].close_delta, None);
        assert_eq!(rows[1].liquidation_sum, None);
    }
}
