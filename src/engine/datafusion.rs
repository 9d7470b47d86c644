//! DataFusion engine adapter.

use async_trait::async_trait;
use datafusion::physical_plan::display::DisplayableExecutionPlan;
use datafusion::prelude::*;
use std::path::Path;

use super::{EngineError, EngineSession, QueryOutput};

/// Session backed by an in-process DataFusion `SessionContext`.
pub struct DataFusionSession {
    ctx: SessionContext,
    last_profile: Option<String>,
}

impl DataFusionSession {
    pub fn open() -> Self {
        Self {
            ctx: SessionContext::new(),
            last_profile: None,
        }
    }
}

#[async_trait]
impl EngineSession for DataFusionSession {
    fn label(&self) -> &str {
        "datafusion"
    }

    async fn register_table(&mut self, table: &str, path: &Path) -> Result<(), EngineError> {
        let path = path
            .to_str()
            .ok_or_else(|| EngineError::Register(format!("non-UTF8 path for table {table}")))?;

        self.ctx
            .register_parquet(table, path, ParquetReadOptions::default())
            .await
            .map_err(|e| EngineError::Register(e.to_string()))
    }

    async fn execute(
        &mut self,
        sql: &str,
        collect_profile: bool,
    ) -> Result<QueryOutput, EngineError> {
        let df = self
            .ctx
            .sql(sql)
            .await
            .map_err(|e| EngineError::Query(e.to_string()))?;

        let batches = if collect_profile {
            // Keep a handle on the physical plan so its runtime metrics can
            // be rendered after collection.
            let plan = df
                .create_physical_plan()
                .await
                .map_err(|e| EngineError::Query(e.to_string()))?;
            let batches =
                datafusion::physical_plan::collect(plan.clone(), self.ctx.task_ctx())
                    .await
                    .map_err(|e| EngineError::Query(e.to_string()))?;
            self.last_profile = Some(
                DisplayableExecutionPlan::with_metrics(plan.as_ref())
                    .indent(true)
                    .to_string(),
            );
            batches
        } else {
            df.collect()
                .await
                .map_err(|e| EngineError::Query(e.to_string()))?
        };

        Ok(QueryOutput {
            row_count: batches.iter().map(|b| b.num_rows()).sum(),
        })
    }

    async fn dump_profile(&mut self) -> Result<Option<String>, EngineError> {
        Ok(self.last_profile.take())
    }

    async fn close(self: Box<Self>) -> Result<(), EngineError> {
        // The session context holds no resources beyond the registered files.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn executes_a_constant_query() {
        let mut session = DataFusionSession::open();
        let output = session.execute("SELECT 1", false).await.unwrap();
        assert_eq!(output.row_count, 1);
    }

    #[tokio::test]
    async fn query_against_unknown_table_is_an_error() {
        let mut session = DataFusionSession::open();
        let err = session
            .execute("SELECT * FROM missing_table", false)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Query(_)));
    }

    #[tokio::test]
    async fn profile_is_captured_and_consumed() {
        let mut session = DataFusionSession::open();
        session.execute("SELECT 1", true).await.unwrap();

        let profile = session.dump_profile().await.unwrap();
        assert!(profile.is_some());
        // Consumed on retrieval.
        assert!(session.dump_profile().await.unwrap().is_none());
    }
}
