pub mod config;
pub mod dataset;
pub mod engine;
pub mod report;
pub mod runner;
pub mod suite;

pub use crate::config::BenchConfig;
pub use crate::dataset::{DatasetLocation, DatasetProvisioner, TPCH_TABLES};
pub use crate::report::BenchReport;
pub use crate::runner::{EngineReport, TimingRecord, TimingRunner};
pub use crate::suite::QuerySuite;
