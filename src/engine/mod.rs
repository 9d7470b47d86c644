//! Uniform adapter interface over the engines under test.
//!
//! Every engine is driven through the same four-operation contract (register,
//! execute, profile, close), so the timing runner measures only the engine and
//! the query while the harness plumbing stays constant across engines.

pub mod datafusion;
pub mod duckdb;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::dataset::DatasetLocation;

/// Errors raised by an engine adapter.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to open a session.
    #[error("session open failed: {0}")]
    Open(String),

    /// Failed to bind a table name to a dataset file.
    #[error("table registration failed: {0}")]
    Register(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Failed to release session resources.
    #[error("session close failed: {0}")]
    Close(String),
}

/// Materialized outcome of one executed statement.
///
/// Result rows are not carried back to the harness; only the row count is
/// surfaced for status output.
#[derive(Debug, Clone, Copy)]
pub struct QueryOutput {
    pub row_count: usize,
}

/// One engine's open session. Owns all table registrations; never shared
/// across engines or tasks.
#[async_trait]
pub trait EngineSession: Send {
    /// Label identifying the engine in logs and reports.
    fn label(&self) -> &str;

    /// Make the Parquet file's contents queryable under `table`.
    ///
    /// Must be issued once per table before any query referencing it.
    async fn register_table(&mut self, table: &str, path: &Path) -> Result<(), EngineError>;

    /// Execute one statement, blocking the caller until completion.
    ///
    /// When `collect_profile` is set, the session captures a profiling
    /// artifact retrievable through [`dump_profile`](Self::dump_profile).
    async fn execute(&mut self, sql: &str, collect_profile: bool)
        -> Result<QueryOutput, EngineError>;

    /// Retrieve the profiling artifact from the most recent profiled
    /// execution, if any. Consumes the artifact.
    async fn dump_profile(&mut self) -> Result<Option<String>, EngineError>;

    /// Release all engine resources. Called exactly once per opened session,
    /// on every exit path.
    async fn close(self: Box<Self>) -> Result<(), EngineError>;
}

/// Register every canonical table from the dataset.
///
/// The first failure is returned immediately; a registration failure is fatal
/// for this engine's run.
pub async fn register_dataset(
    session: &mut dyn EngineSession,
    dataset: &DatasetLocation,
) -> Result<(), EngineError> {
    for (table, path) in dataset.table_paths() {
        session.register_table(table, &path).await?;
    }
    Ok(())
}
