//! Combining per-engine timing results into one printed report.

use std::time::Duration;

use crate::runner::EngineReport;

/// All engines' results for one run. Display only; nothing is persisted.
#[derive(Debug, Clone)]
pub struct BenchReport {
    engines: Vec<EngineReport>,
}

impl BenchReport {
    /// Group per-engine results; no statistical summarization, each query ran
    /// exactly once.
    pub fn combine(engines: Vec<EngineReport>) -> Self {
        Self { engines }
    }

    pub fn engines(&self) -> &[EngineReport] {
        &self.engines
    }

    /// Print one block per engine, in runner iteration order.
    pub fn render(&self) {
        for report in &self.engines {
            println!();
            println!("========================================");
            println!("Results: {}", report.engine);
            println!("========================================");
            println!("{:<8} {:>15}   {}", "Query", "Time (ms)", "Status");
            println!("{}", "-".repeat(50));

            for record in &report.records {
                let status = if record.ok {
                    "OK".to_string()
                } else {
                    format!("FAIL: {}", record.error.as_deref().unwrap_or("unknown"))
                };

                println!(
                    "{:<8} {:>15.2}   {}",
                    format!("Q{}", record.query_id),
                    record.duration.as_secs_f64() * 1000.0,
                    status
                );
            }

            println!("{}", "-".repeat(50));

            let total: Duration = report.records.iter().map(|r| r.duration).sum();
            let succeeded = report.records.iter().filter(|r| r.ok).count();
            println!(
                "Total Query Time: {:.3}s ({}/{} queries succeeded)",
                total.as_secs_f64(),
                succeeded,
                report.records.len()
            );
        }
        println!();
    }
}
