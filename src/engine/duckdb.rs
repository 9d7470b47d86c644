//! DuckDB engine adapter.
//!
//! The DuckDB client is blocking, so every call is moved to the blocking pool
//! and awaited before the harness proceeds.

use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::{EngineError, EngineSession, QueryOutput};

/// Session backed by an in-memory DuckDB connection.
pub struct DuckDbSession {
    conn: Arc<Mutex<Connection>>,
    /// SQL of the most recent profiled execution; the profile itself is
    /// produced lazily at dump time via EXPLAIN ANALYZE.
    profiled_sql: Option<String>,
}

impl DuckDbSession {
    pub fn open() -> Result<Self, EngineError> {
        let conn =
            Connection::open_in_memory().map_err(|e| EngineError::Open(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            profiled_sql: None,
        })
    }

    /// Run one closure against the connection on the blocking pool.
    async fn run_blocking<T, F>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Connection) -> duckdb::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| "duckdb connection lock poisoned".to_string())?;
            f(&conn).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| e.to_string())?
    }
}

#[async_trait]
impl EngineSession for DuckDbSession {
    fn label(&self) -> &str {
        "duckdb"
    }

    async fn register_table(&mut self, table: &str, path: &Path) -> Result<(), EngineError> {
        let sql = format!(
            "CREATE OR REPLACE VIEW {table} AS SELECT * FROM read_parquet('{}')",
            path.display()
        );
        self.run_blocking(move |conn| conn.execute_batch(&sql))
            .await
            .map_err(EngineError::Register)
    }

    async fn execute(
        &mut self,
        sql: &str,
        collect_profile: bool,
    ) -> Result<QueryOutput, EngineError> {
        let owned = sql.to_string();
        let row_count = self
            .run_blocking(move |conn| {
                let mut stmt = conn.prepare(&owned)?;
                let mut rows = 0usize;
                for batch in stmt.query_arrow([])? {
                    rows += batch.num_rows();
                }
                Ok(rows)
            })
            .await
            .map_err(EngineError::Query)?;

        if collect_profile {
            self.profiled_sql = Some(sql.to_string());
        }

        Ok(QueryOutput { row_count })
    }

    async fn dump_profile(&mut self) -> Result<Option<String>, EngineError> {
        let Some(sql) = self.profiled_sql.take() else {
            return Ok(None);
        };

        let text = self
            .run_blocking(move |conn| {
                let mut stmt = conn.prepare(&format!("EXPLAIN ANALYZE {sql}"))?;
                let mut out = String::new();
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    let chunk: String = row.get(1)?;
                    out.push_str(&chunk);
                    out.push('\n');
                }
                Ok(out)
            })
            .await
            .map_err(EngineError::Query)?;

        Ok(Some(text))
    }

    async fn close(self: Box<Self>) -> Result<(), EngineError> {
        let conn = Arc::into_inner(self.conn)
            .ok_or_else(|| EngineError::Close("session still in use".to_string()))?;
        let conn = conn
            .into_inner()
            .map_err(|_| EngineError::Close("connection lock poisoned".to_string()))?;

        tokio::task::spawn_blocking(move || {
            conn.close()
                .map_err(|(_, e)| EngineError::Close(e.to_string()))
        })
        .await
        .map_err(|e| EngineError::Close(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn executes_a_constant_query() {
        let mut session = DuckDbSession::open().unwrap();
        let output = session.execute("SELECT 1", false).await.unwrap();
        assert_eq!(output.row_count, 1);
    }

    #[tokio::test]
    async fn query_against_unknown_table_is_an_error() {
        let mut session = DuckDbSession::open().unwrap();
        let err = session
            .execute("SELECT * FROM missing_table", false)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Query(_)));
    }

    #[tokio::test]
    async fn poisoned_connection_lock_is_an_error_not_a_panic() {
        let mut session = DuckDbSession::open().unwrap();

        // Poison the lock by panicking inside a blocking closure.
        let poisoned: Result<(), String> =
            session.run_blocking(|_| panic!("poison the lock")).await;
        assert!(poisoned.is_err());

        let err = session.execute("SELECT 1", false).await.unwrap_err();
        assert!(matches!(err, EngineError::Query(_)));
        assert!(err.to_string().contains("poisoned"));
    }

    #[tokio::test]
    async fn close_releases_the_connection() {
        let session = Box::new(DuckDbSession::open().unwrap());
        session.close().await.unwrap();
    }
}
