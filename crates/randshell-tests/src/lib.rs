//! Reference statistical test plugins for the randshell test shell.
//!
//! Each plugin implements [`randshell_core::TestPlugin`]: it declares its
//! parameter schemas, computes a per-bitstream statistic and p-value in
//! `execute`, and aggregates pass counts against the derived minimum test
//! count in `finalize`. The shell owns ingestion, threading, and the report.

use randshell_core::report::Evaluation;
use randshell_core::stats::{confusion_matrix, confusion_matrix_statistics, minimum_test_count};
use randshell_core::{DataType, Report, Result};

pub mod block_frequency;
pub mod frequency;

pub use block_frequency::BlockFrequencyTest;
pub use frequency::FrequencyTest;

/// Unpack a byte slice into individual bits (MSB first per byte).
pub(crate) fn to_bits(data: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Shared finalize step: count pass/fail verdicts among a configuration's
/// tests, record the minimum-test-count and confusion-matrix metrics, and
/// evaluate the configuration against the minimum pass threshold.
pub(crate) fn finalize_configuration(
    report: &mut Report,
    config_id: u32,
    significance_level: f64,
    bitstream_count: u64,
) -> Result<()> {
    let derived = minimum_test_count(significance_level, bitstream_count)?;

    let (actual_test_count, actual_pass) = {
        let tests = &report.configuration(config_id)?.tests;
        let pass = tests
            .iter()
            .filter(|t| t.evaluation == Some(Evaluation::Pass))
            .count() as u64;
        (tests.len() as u64, pass)
    };
    let actual_fail = actual_test_count - actual_pass;

    // The predicted split always sums to the bitstream count, so the
    // predicted-total argument is the bitstream count itself.
    let matrix = confusion_matrix(
        derived.predicted_pass + derived.predicted_fail,
        actual_test_count,
        actual_pass,
        actual_fail,
        derived.predicted_pass,
        derived.predicted_fail,
    )?;

    report.add_metric_to_configuration(
        config_id,
        "minimum test count",
        DataType::UInt64,
        None,
        Some("tests"),
        &derived.minimum_test_count.to_string(),
    )?;
    report.add_confusion_matrix_metrics_to_configuration(config_id, &matrix)?;
    report
        .add_confusion_matrix_statistics_to_configuration(config_id, &confusion_matrix_statistics(&matrix))?;

    report.add_criterion_to_configuration(
        config_id,
        &format!(
            "actual pass count ({actual_pass}) >= minimum test count ({})",
            derived.minimum_test_count
        ),
        actual_pass >= derived.minimum_test_count,
    )?;
    report.add_evaluation_to_configuration(config_id)?;
    Ok(())
}
