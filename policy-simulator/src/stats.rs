// Statistics reporting for policy simulation

use crate::models::{CsvResultRow, PolicyStats, SimulationResult};
use coconut_policy::config::PolicyKind;
use std::path::Path;

/// Per-policy statistics from a finished run, in a stable order
pub struct SimulationStats {
    rows: Vec<(PolicyKind, PolicyStats)>,
    total_requests: usize,
    total_bytes: u64,
}

impl SimulationStats {
    /// Collect the statistics of a result, sorted by policy
    pub fn from_result(result: &SimulationResult) -> Self {
        let mut rows: Vec<_> = result
            .stats
            .iter()
            .map(|(kind, stats)| (*kind, stats.clone()))
            .collect();
        rows.sort_by_key(|(kind, _)| *kind);

        Self {
            rows,
            total_requests: result.total_requests,
            total_bytes: result.total_bytes,
        }
    }

    /// Policy with the highest hit rate, if any policy ran
    pub fn best_hit_rate(&self) -> Option<PolicyKind> {
        self.rows
            .iter()
            .max_by(|(_, a), (_, b)| a.hit_rate().total_cmp(&b.hit_rate()))
            .map(|(kind, _)| *kind)
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        println!("\nPolicy Simulation Summary");
        println!("=========================");
        println!("Total requests: {}", self.total_requests);
        println!(
            "Total bytes: {} ({:.2} MB)",
            self.total_bytes,
            self.total_bytes as f64 / (1024.0 * 1024.0)
        );

        println!("\nResults by Policy:");
        println!(
            "{:<6} {:>8} {:>10} {:>12} {:>10} {:>10} {:>10} {:>10}",
            "Policy", "HitRate", "ByteHit%", "MissCost", "Rejected", "Evicted", "Peak", "ns/req"
        );
        println!("{}", "-".repeat(84));

        for (kind, stats) in &self.rows {
            println!(
                "{:<6} {:>7.2}% {:>9.2}% {:>12.1} {:>10} {:>10} {:>10} {:>10.1}",
                kind.as_str(),
                stats.hit_rate(),
                stats.byte_hit_rate(),
                stats.miss_cost,
                stats.rejections,
                stats.evictions,
                stats.peak_entries,
                stats.avg_policy_ns()
            );
        }

        if let Some(best) = self.best_hit_rate() {
            println!("\nBest hit rate: {best}");
        }
    }

    /// One CSV row per policy
    pub fn csv_rows(&self) -> Vec<CsvResultRow> {
        self.rows
            .iter()
            .map(|(kind, stats)| CsvResultRow {
                policy: kind.as_str().to_string(),
                hits: stats.hits,
                misses: stats.misses,
                hit_rate: stats.hit_rate(),
                byte_hit_rate: stats.byte_hit_rate(),
                bytes_hit: stats.bytes_hit,
                bytes_miss: stats.bytes_miss,
                miss_cost: stats.miss_cost,
                rejections: stats.rejections,
                evictions: stats.evictions,
                peak_entries: stats.peak_entries,
                policy_time_ns: stats.policy_time_ns,
                avg_policy_ns: stats.avg_policy_ns(),
            })
            .collect()
    }

    /// Export the results to a CSV file with a header row
    pub fn export_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in self.csv_rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
