//! Statistical substrate: minimum-test-count derivation and confusion-matrix
//! classification metrics.
//!
//! The minimum test count answers "how many independent test invocations are
//! needed before a pass/fail judgment is statistically meaningful at
//! significance level α?". Per NIST SP 800-22 §4.2.1 the acceptable pass
//! proportion for N bitstreams is `p̂ ± z·sqrt(p̂(1−p̂)/N)` with `p̂ = 1 − α`
//! and z the three-sigma normal quantile; the minimum pass count is the
//! floor of the lower bound scaled by N.

use statrs::function::erf::erfc_inv;

use crate::error::{Result, ShellError};

/// Two-sided three-sigma confidence used for the acceptance interval.
const THREE_SIGMA_CONFIDENCE: f64 = 0.997_300_203_936_740;

/// Normal quantile for the acceptance interval, via the inverse
/// complementary error function: `z = √2·erfc⁻¹(1 − confidence)` = 3.
fn acceptance_quantile() -> f64 {
    std::f64::consts::SQRT_2 * erfc_inv(1.0 - THREE_SIGMA_CONFIDENCE)
}

// ---------------------------------------------------------------------------
// Minimum test count
// ---------------------------------------------------------------------------

/// Minimum-test-count derivation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumTestCount {
    /// Smallest passing-test count consistent with a truly random generator.
    pub minimum_test_count: u64,
    /// Predicted pass count under the null hypothesis: `round(N(1−α))`.
    pub predicted_pass: u64,
    /// Predicted fail count: `N − predicted_pass`.
    pub predicted_fail: u64,
}

/// Derive the minimum test count and predicted pass/fail counts for
/// `bitstream_count` independent invocations at `significance_level`.
///
/// Fails with `OutOfRange` if `significance_level ∉ (0,1)` exclusive or
/// `bitstream_count == 0`.
pub fn minimum_test_count(significance_level: f64, bitstream_count: u64) -> Result<MinimumTestCount> {
    if !(significance_level > 0.0 && significance_level < 1.0) {
        return Err(ShellError::OutOfRange(format!(
            "significance level must be in (0,1) exclusive; got {significance_level}"
        )));
    }
    if bitstream_count == 0 {
        return Err(ShellError::OutOfRange(
            "bitstream count must be at least 1".into(),
        ));
    }

    let n = bitstream_count as f64;
    let pass_proportion = 1.0 - significance_level;
    let interval = acceptance_quantile() * (pass_proportion * significance_level / n).sqrt();
    let lower_bound = (pass_proportion - interval).max(0.0);
    let minimum = (n * lower_bound).floor() as u64;

    let predicted_pass = (n * pass_proportion).round() as u64;
    let predicted_fail = bitstream_count - predicted_pass;

    Ok(MinimumTestCount {
        minimum_test_count: minimum.min(bitstream_count),
        predicted_pass,
        predicted_fail,
    })
}

// ---------------------------------------------------------------------------
// Confusion matrix
// ---------------------------------------------------------------------------

/// TP/TN/FP/FN breakdown of predicted vs. actual pass/fail counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub minimum_test_count: u64,
    pub actual_test_count: u64,
    pub actual_pass: u64,
    pub actual_fail: u64,
    pub predicted_pass: u64,
    pub predicted_fail: u64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
}

/// Build a confusion matrix from predicted and actual pass/fail counts.
///
/// The count identities `actual_pass + actual_fail == actual_test_count` and
/// `predicted_pass + predicted_fail == minimum_test_count` must hold;
/// otherwise the construction fails with `ValidationFailure`.
pub fn confusion_matrix(
    minimum_test_count: u64,
    actual_test_count: u64,
    actual_pass: u64,
    actual_fail: u64,
    predicted_pass: u64,
    predicted_fail: u64,
) -> Result<ConfusionMatrix> {
    if actual_pass + actual_fail != actual_test_count {
        return Err(ShellError::ValidationFailure(format!(
            "actual pass ({actual_pass}) + actual fail ({actual_fail}) != actual test count ({actual_test_count})"
        )));
    }
    if predicted_pass + predicted_fail != minimum_test_count {
        return Err(ShellError::ValidationFailure(format!(
            "predicted pass ({predicted_pass}) + predicted fail ({predicted_fail}) != minimum test count ({minimum_test_count})"
        )));
    }

    let true_positives = actual_pass.min(predicted_pass);
    let false_negatives = actual_pass - true_positives;
    let true_negatives = actual_fail.min(predicted_fail);
    let false_positives = actual_fail - true_negatives;

    Ok(ConfusionMatrix {
        minimum_test_count,
        actual_test_count,
        actual_pass,
        actual_fail,
        predicted_pass,
        predicted_fail,
        true_positives,
        false_positives,
        true_negatives,
        false_negatives,
    })
}

// ---------------------------------------------------------------------------
// Derived classification metrics
// ---------------------------------------------------------------------------

/// Classification metrics derived from a [`ConfusionMatrix`].
///
/// Any metric whose denominator is zero is `NaN` — undefined ratios are
/// reported, never silently zeroed and never a crash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfusionMatrixStatistics {
    pub sensitivity: f64,
    pub specificity: f64,
    pub precision: f64,
    pub negative_predictive_value: f64,
    pub false_negative_rate: f64,
    pub false_positive_rate: f64,
    pub false_discovery_rate: f64,
    pub false_omission_rate: f64,
    pub accuracy: f64,
    pub balanced_accuracy: f64,
    pub f1_score: f64,
    pub matthews_correlation_coefficient: f64,
    pub fowlkes_mallows_index: f64,
    pub informedness: f64,
    pub markedness: f64,
    pub positive_likelihood_ratio: f64,
    pub negative_likelihood_ratio: f64,
    pub diagnostic_odds_ratio: f64,
    pub prevalence: f64,
    pub prevalence_threshold: f64,
    pub threat_score: f64,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Compute the standard classification metrics from a confusion matrix.
pub fn confusion_matrix_statistics(matrix: &ConfusionMatrix) -> ConfusionMatrixStatistics {
    let tp = matrix.true_positives as f64;
    let fp = matrix.false_positives as f64;
    let tn = matrix.true_negatives as f64;
    let fn_ = matrix.false_negatives as f64;
    let total = tp + fp + tn + fn_;

    let sensitivity = ratio(tp, tp + fn_);
    let specificity = ratio(tn, tn + fp);
    let precision = ratio(tp, tp + fp);
    let negative_predictive_value = ratio(tn, tn + fn_);
    let false_negative_rate = 1.0 - sensitivity;
    let false_positive_rate = 1.0 - specificity;
    let false_discovery_rate = 1.0 - precision;
    let false_omission_rate = 1.0 - negative_predictive_value;

    let accuracy = ratio(tp + tn, total);
    let balanced_accuracy = (sensitivity + specificity) / 2.0;
    let f1_score = ratio(2.0 * tp, 2.0 * tp + fp + fn_);
    let matthews_correlation_coefficient = ratio(
        tp * tn - fp * fn_,
        ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt(),
    );
    let fowlkes_mallows_index = (precision * sensitivity).sqrt();
    let informedness = sensitivity + specificity - 1.0;
    let markedness = precision + negative_predictive_value - 1.0;

    let positive_likelihood_ratio = ratio(sensitivity, false_positive_rate);
    let negative_likelihood_ratio = ratio(false_negative_rate, specificity);
    let diagnostic_odds_ratio = ratio(positive_likelihood_ratio, negative_likelihood_ratio);

    let prevalence = ratio(tp + fn_, total);
    let prevalence_threshold = ratio(
        (sensitivity * false_positive_rate).sqrt() - false_positive_rate,
        sensitivity - false_positive_rate,
    );
    let threat_score = ratio(tp, tp + fn_ + fp);

    ConfusionMatrixStatistics {
        sensitivity,
        specificity,
        precision,
        negative_predictive_value,
        false_negative_rate,
        false_positive_rate,
        false_discovery_rate,
        false_omission_rate,
        accuracy,
        balanced_accuracy,
        f1_score,
        matthews_correlation_coefficient,
        fowlkes_mallows_index,
        informedness,
        markedness,
        positive_likelihood_ratio,
        negative_likelihood_ratio,
        diagnostic_odds_ratio,
        prevalence,
        prevalence_threshold,
        threat_score,
    }
}

impl ConfusionMatrixStatistics {
    /// Metric names paired with values, in report emission order.
    pub fn named_values(&self) -> [(&'static str, f64); 21] {
        [
            ("sensitivity", self.sensitivity),
            ("specificity", self.specificity),
            ("precision", self.precision),
            ("negative predictive value", self.negative_predictive_value),
            ("false negative rate", self.false_negative_rate),
            ("false positive rate", self.false_positive_rate),
            ("false discovery rate", self.false_discovery_rate),
            ("false omission rate", self.false_omission_rate),
            ("accuracy", self.accuracy),
            ("balanced accuracy", self.balanced_accuracy),
            ("f1 score", self.f1_score),
            (
                "matthews correlation coefficient",
                self.matthews_correlation_coefficient,
            ),
            ("fowlkes-mallows index", self.fowlkes_mallows_index),
            ("informedness", self.informedness),
            ("markedness", self.markedness),
            ("positive likelihood ratio", self.positive_likelihood_ratio),
            ("negative likelihood ratio", self.negative_likelihood_ratio),
            ("diagnostic odds ratio", self.diagnostic_odds_ratio),
            ("prevalence", self.prevalence),
            ("prevalence threshold", self.prevalence_threshold),
            ("threat score", self.threat_score),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
