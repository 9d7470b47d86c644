//! Per-query timing with failure containment.
//!
//! The runner drives the whole suite through one engine session, recording a
//! wall-clock duration per query. A query failure never aborts the run: the
//! failure is logged and recorded with the zero-duration sentinel, and the
//! runner moves on to the next identifier. Engine-level failures (a dead
//! connection, for instance) collapse to the same per-query records; the
//! runner makes no attempt to tell them apart.

use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::engine::EngineSession;
use crate::suite::QuerySuite;

/// Timing for one query against one engine.
#[derive(Debug, Clone)]
pub struct TimingRecord {
    pub query_id: u32,
    /// Wall-clock duration of the execute call; the zero sentinel when the
    /// query failed.
    pub duration: Duration,
    /// Distinguishes a failed query from a genuinely instantaneous one.
    pub ok: bool,
    pub error: Option<String>,
}

/// All records for one engine, in suite iteration order.
#[derive(Debug, Clone)]
pub struct EngineReport {
    pub engine: String,
    pub records: Vec<TimingRecord>,
}

pub struct TimingRunner {
    collect_profile: bool,
    profile_in_timing: bool,
}

impl TimingRunner {
    pub fn new() -> Self {
        Self {
            collect_profile: false,
            profile_in_timing: false,
        }
    }

    /// `collect_profile` requests an execution profile per query;
    /// `profile_in_timing` moves profile retrieval inside the measured window.
    pub fn with_profiling(collect_profile: bool, profile_in_timing: bool) -> Self {
        Self {
            collect_profile,
            profile_in_timing,
        }
    }

    /// Run every suite query against the session, in ascending identifier
    /// order. Produces exactly one record per query and never fails itself.
    pub async fn run(&self, session: &mut dyn EngineSession, suite: &QuerySuite) -> EngineReport {
        let engine = session.label().to_string();
        let mut records = Vec::with_capacity(suite.len());

        for (query_id, sql) in suite.iter() {
            info!(engine = %engine, query_id, "running query");

            let start = Instant::now();
            let outcome = session.execute(sql, self.collect_profile).await;

            let record = match outcome {
                Ok(output) => {
                    let duration = if self.collect_profile && self.profile_in_timing {
                        self.emit_profile(session, query_id).await;
                        start.elapsed()
                    } else {
                        let duration = start.elapsed();
                        if self.collect_profile {
                            self.emit_profile(session, query_id).await;
                        }
                        duration
                    };

                    info!(
                        engine = %engine,
                        query_id,
                        rows = output.row_count,
                        duration_ms = duration.as_secs_f64() * 1000.0,
                        "query completed"
                    );

                    TimingRecord {
                        query_id,
                        duration,
                        ok: true,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(engine = %engine, query_id, error = %e, "query failed");
                    TimingRecord {
                        query_id,
                        duration: Duration::ZERO,
                        ok: false,
                        error: Some(e.to_string()),
                    }
                }
            };

            records.push(record);
        }

        EngineReport { engine, records }
    }

    async fn emit_profile(&self, session: &mut dyn EngineSession, query_id: u32) {
        match session.dump_profile().await {
            Ok(Some(profile)) => info!(query_id, "query profile:\n{}", profile),
            Ok(None) => {}
            Err(e) => warn!(query_id, error = %e, "failed to collect query profile"),
        }
    }
}

impl Default for TimingRunner {
    fn default() -> Self {
        Self::new()
    }
}
