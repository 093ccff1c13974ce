use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub searches: usize,
    pub expanded_nodes: usize,
    pub elapsed: Duration,
}

impl Stats {
    pub fn print(&self, solver: &str) {
        info!(
            "{solver}: searches {:?} expand nodes number {:?} Time(microseconds) {:?}",
            self.searches,
            self.expanded_nodes,
            self.elapsed.as_micros()
        );
    }
}

/// One benchmark run of one algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRecord {
    pub elapsed_ns: u128,
    pub won: bool,
}

impl RunRecord {
    /// `"<ns> W"` or `"<ns> L"`.
    pub fn to_line(&self) -> String {
        format!("{} {}", self.elapsed_ns, if self.won { "W" } else { "L" })
    }
}

/// Timing and outcome statistics over a batch of runs. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub algorithm: String,
    pub runs: usize,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub mode_ms: f64,
    pub std_dev_ms: f64,
    pub wins: usize,
    pub losses: usize,
    pub win_percent: f64,
    pub loss_percent: f64,
}

// Mode buckets are 10 microseconds wide.
const MODE_BUCKET_NS: u128 = 10_000;
const NS_PER_MS: f64 = 1_000_000.0;

impl Summary {
    pub fn from_records(algorithm: &str, records: &[RunRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let runs = records.len();
        let times: Vec<f64> = records
            .iter()
            .map(|record| record.elapsed_ns as f64 / NS_PER_MS)
            .collect();
        let mean_ms = times.iter().sum::<f64>() / runs as f64;

        let std_dev_ms = if runs > 1 {
            let squares: f64 = times.iter().map(|time| (time - mean_ms).powi(2)).sum();
            (squares / (runs - 1) as f64).sqrt()
        } else {
            0.0
        };

        let mut sorted = times.clone();
        sorted.sort_by(f64::total_cmp);
        let median_ms = if runs % 2 == 1 {
            sorted[runs / 2]
        } else {
            (sorted[runs / 2 - 1] + sorted[runs / 2]) / 2.0
        };

        let mut buckets: BTreeMap<u128, usize> = BTreeMap::new();
        for record in records {
            *buckets.entry(record.elapsed_ns / MODE_BUCKET_NS).or_default() += 1;
        }
        // Smallest bucket wins a tie.
        let mode_bucket = buckets
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map_or(0, |(&bucket, _)| bucket);
        let mode_ms = (mode_bucket * MODE_BUCKET_NS) as f64 / NS_PER_MS;

        let wins = records.iter().filter(|record| record.won).count();
        let losses = runs - wins;

        Some(Summary {
            algorithm: algorithm.to_string(),
            runs,
            mean_ms,
            median_ms,
            mode_ms,
            std_dev_ms,
            wins,
            losses,
            win_percent: wins as f64 * 100.0 / runs as f64,
            loss_percent: losses as f64 * 100.0 / runs as f64,
        })
    }

    pub fn print(&self) {
        info!(
            "{}: runs {} mean {:.4} ms median {:.4} ms mode {:.2} ms std dev {:.4} ms wins {} ({:.2}%) losses {} ({:.2}%)",
            self.algorithm,
            self.runs,
            self.mean_ms,
            self.median_ms,
            self.mode_ms,
            self.std_dev_ms,
            self.wins,
            self.win_percent,
            self.losses,
            self.loss_percent
        );
    }
}
