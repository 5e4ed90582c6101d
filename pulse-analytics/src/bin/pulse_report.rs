//! Market pulse report
//!
//! Reads `pulse_<YYYYMMDD_HHMM>.json` snapshots and `gpt_digest_<YYYYMMDD_HHMM>.txt` digests from
//! the data directory and prints alerts, deltas, aligned digests and the master table.
//!
//! Usage:
//!   pulse-report                    report for the latest snapshot
//!   pulse-report <YYYYMMDD_HHMM>    report for a given snapshot
//!   pulse-report list               list available snapshots
//!   pulse-report history <SYMBOL>   close & close delta of a symbol across every snapshot
//!
//! Configured through `PULSE_*` environment variables, see `ReportConfig::from_env`.

use std::{error::Error, io, io::Write};

use pulse_analytics::{OutputFormat, PulseAnalyzer, ReportConfig};
use pulse_data::{
    snapshot::SnapshotId,
    store::{SnapshotStore, cache::CachedStore, fs::FsStore},
};
use tracing::info;

const USAGE: &str = "usage: pulse-report [<YYYYMMDD_HHMM> | list | history <SYMBOL>]";

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let config = ReportConfig::from_env();
    info!(data_dir = %config.data_dir.display(), "starting pulse-report");

    let store = CachedStore::new(FsStore::new(&config.data_dir), config.listing_ttl);
    let analyzer = PulseAnalyzer::new(config.alert.clone(), config.digest);

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["list"] => {
            let ids = store.snapshot_ids()?;
            match config.output {
                OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &ids)?,
                OutputFormat::Text => {
                    for id in ids {
                        writeln!(out, "{}", id)?;
                    }
                }
            }
        }
        ["history", symbol] => {
            let rows = analyzer.history(&store, symbol)?;
            match config.output {
                OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &rows)?,
                OutputFormat::Text => {
                    for row in rows {
                        writeln!(out, "{}", row)?;
                    }
                }
            }
        }
        [] | [_] => {
            let selected = args
                .first()
                .map(|raw| raw.parse::<SnapshotId>())
                .transpose()?;
            let report = analyzer.report(&store, selected)?;
            match config.output {
                OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &report)?,
                OutputFormat::Text => write!(out, "{}", report)?,
            }
        }
        _ => return Err(USAGE.into()),
    }

    writeln!(out)?;
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}
