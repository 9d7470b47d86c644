//! Dataset provisioning.
//!
//! Materializes the canonical TPC-H tables as one Parquet file per table under
//! a scale-factor-specific directory. The directory doubles as the cache key:
//! if it already exists, generation is skipped entirely. Presence implies
//! completeness; a run aborted mid-generation leaves a directory that later
//! runs will treat as cached.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// The canonical TPC-H tables, one Parquet file each.
pub const TPCH_TABLES: [&str; 8] = [
    "nation", "region", "customer", "supplier", "lineitem", "orders", "partsupp", "part",
];

/// On-disk location of a materialized dataset for one scale factor.
#[derive(Debug, Clone)]
pub struct DatasetLocation {
    pub dir: PathBuf,
    pub scale_factor: f64,
}

impl DatasetLocation {
    /// Path of the Parquet file backing one canonical table.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.parquet"))
    }

    /// All canonical tables with their file paths.
    pub fn table_paths(&self) -> impl Iterator<Item = (&'static str, PathBuf)> + '_ {
        TPCH_TABLES.iter().map(|t| (*t, self.table_path(t)))
    }
}

/// Ensures a scale-factor-specific dataset exists on disk.
pub struct DatasetProvisioner {
    data_root: PathBuf,
}

impl DatasetProvisioner {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    fn dataset_dir(&self, scale_factor: f64) -> PathBuf {
        self.data_root.join(format!("tpch-{scale_factor}"))
    }

    /// Return the dataset location for `scale_factor`, generating it first if
    /// the cache directory is absent.
    ///
    /// Generation uses DuckDB's built-in dbgen and writes one Parquet file per
    /// canonical table. Generator or filesystem failure is fatal; no cleanup
    /// of a partially written directory is attempted.
    pub async fn ensure_dataset(&self, scale_factor: f64) -> Result<DatasetLocation> {
        anyhow::ensure!(
            scale_factor > 0.0,
            "scale factor must be positive, got {scale_factor}"
        );

        let dir = self.dataset_dir(scale_factor);
        if dir.exists() {
            info!("Dataset cache hit at {}", dir.display());
            return Ok(DatasetLocation { dir, scale_factor });
        }

        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating dataset directory {}", dir.display()))?;

        info!(
            "Generating TPC-H dataset at {} (sf={})",
            dir.display(),
            scale_factor
        );

        let gen_dir = dir.clone();
        tokio::task::spawn_blocking(move || generate_tables(&gen_dir, scale_factor))
            .await
            .context("dataset generation task panicked")??;

        info!("Dataset generation complete");
        Ok(DatasetLocation { dir, scale_factor })
    }
}

/// Generate the canonical tables with dbgen and copy each one to Parquet.
fn generate_tables(dir: &Path, scale_factor: f64) -> Result<()> {
    let conn = duckdb::Connection::open_in_memory()
        .context("opening DuckDB for dataset generation")?;

    conn.execute_batch("INSTALL tpch; LOAD tpch;")
        .context("loading DuckDB tpch extension")?;

    conn.execute(&format!("CALL dbgen(sf = {scale_factor})"), [])
        .context("running dbgen")?;

    for table in TPCH_TABLES {
        let out = dir.join(format!("{table}.parquet"));
        conn.execute(
            &format!(
                "COPY (SELECT * FROM {table}) TO '{}' (FORMAT PARQUET)",
                out.display()
            ),
            [],
        )
        .with_context(|| format!("writing {table} to {}", out.display()))?;
    }

    Ok(())
}
