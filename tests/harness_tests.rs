//! End-to-end harness tests against the real engine adapters.
//!
//! A tiny Parquet file is written locally (via DuckDB) so these run without
//! the tpch extension or any network access.

use sqlbench::engine::datafusion::DataFusionSession;
use sqlbench::engine::duckdb::DuckDbSession;
use sqlbench::engine::EngineSession;
use sqlbench::runner::TimingRunner;
use sqlbench::suite::QuerySuite;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a three-row table to Parquet and return its path.
fn write_fixture_parquet(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("items.parquet");
    let conn = duckdb::Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE items AS \
         SELECT * FROM (VALUES (1, 'a'), (2, 'b'), (3, 'c')) AS t(id, name); \
         COPY items TO '{}' (FORMAT PARQUET);",
        path.display()
    ))
    .unwrap();
    path
}

fn mini_suite() -> QuerySuite {
    let mut suite = QuerySuite::new();
    suite.insert(1, "SELECT COUNT(*) AS n FROM items");
    suite.insert(2, "SELECT * FROM items WHERE id >= 2 ORDER BY id");
    suite.insert(3, "SELECT * FROM missing_table");
    suite
}

async fn run_against(mut session: Box<dyn EngineSession>, parquet: &PathBuf) -> Vec<(u32, bool)> {
    session.register_table("items", parquet).await.unwrap();

    let report = TimingRunner::new().run(session.as_mut(), &mini_suite()).await;
    session.close().await.unwrap();

    report.records.iter().map(|r| (r.query_id, r.ok)).collect()
}

#[tokio::test]
async fn datafusion_runs_the_suite_with_contained_failure() {
    let dir = TempDir::new().unwrap();
    let parquet = write_fixture_parquet(&dir);

    let outcomes = run_against(Box::new(DataFusionSession::open()), &parquet).await;
    assert_eq!(outcomes, vec![(1, true), (2, true), (3, false)]);
}

#[tokio::test]
async fn duckdb_runs_the_suite_with_contained_failure() {
    let dir = TempDir::new().unwrap();
    let parquet = write_fixture_parquet(&dir);

    let outcomes = run_against(Box::new(DuckDbSession::open().unwrap()), &parquet).await;
    assert_eq!(outcomes, vec![(1, true), (2, true), (3, false)]);
}

#[tokio::test]
async fn both_engines_report_identical_row_counts() {
    let dir = TempDir::new().unwrap();
    let parquet = write_fixture_parquet(&dir);

    let mut datafusion: Box<dyn EngineSession> = Box::new(DataFusionSession::open());
    let mut duckdb_session: Box<dyn EngineSession> = Box::new(DuckDbSession::open().unwrap());

    datafusion.register_table("items", &parquet).await.unwrap();
    duckdb_session.register_table("items", &parquet).await.unwrap();

    let sql = "SELECT * FROM items";
    let df_rows = datafusion.execute(sql, false).await.unwrap().row_count;
    let duck_rows = duckdb_session.execute(sql, false).await.unwrap().row_count;

    assert_eq!(df_rows, 3);
    assert_eq!(df_rows, duck_rows);

    datafusion.close().await.unwrap();
    duckdb_session.close().await.unwrap();
}
