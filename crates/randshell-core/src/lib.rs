//! # randshell-core
//!
//! **The test-shell engine for standardized randomness statistical tests.**
//!
//! `randshell-core` drives a statistical test program's full lifecycle:
//! it resolves parameters, streams bitstream input in fixed-size chunks,
//! invokes the test plugin per chunk (optionally across a worker-thread
//! batch), aggregates pass/fail outcomes against a statistically derived
//! minimum test count, and assembles a nested JSON report.
//!
//! ## Quick Start
//!
//! ```no_run
//! use randshell_core::report::{Report, ReportLevel};
//!
//! let mut report = Report::new("frequency", randshell_core::VERSION, ReportLevel::Full)
//!     .unwrap()
//!     .with_configurations(1);
//! report.add_criterion_to_configuration(0, "proportion within bounds", true).unwrap();
//! let verdict = report.add_evaluation_to_configuration(0).unwrap();
//! println!("configuration 0: {verdict}");
//! ```
//!
//! ## Architecture
//!
//! Parameters → Shell driver → (Bitstream ingestion → plugin execute →
//! report mutation)* → plugin finalize (aggregate statistics) → JSON report
//!
//! Every statistical test implements the [`shell::TestPlugin`] trait. The
//! shell owns the [`report::Report`] and is the only writer: in
//! multi-threaded mode worker threads return their per-bitstream records and
//! the driver thread applies them in bitstream-id order.

pub mod bitstream;
pub mod error;
pub mod params;
pub mod process;
pub mod report;
pub mod schedule;
pub mod shell;
pub mod stats;

pub use bitstream::{BitstreamBuffer, BitstreamReader, ascii_to_bytes, convert_ascii_file};
pub use error::{Result, ShellError};
pub use params::{DataType, NativeValue, Parameter, ParameterInfo, ParameterSet};
pub use report::{Evaluation, Report, ReportLevel};
pub use shell::{PluginInfo, ShellArgs, TestPlugin, TestRecord, run_shell, run_test_program};
pub use stats::{
    ConfusionMatrix, ConfusionMatrixStatistics, MinimumTestCount, confusion_matrix,
    confusion_matrix_statistics, minimum_test_count,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
