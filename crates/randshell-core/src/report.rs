//! In-memory report model with incremental mutation and JSON round-trip.
//!
//! A [`Report`] is the single output artifact of a test-shell run: an ordered
//! list of configurations (one per parameter variant of the test), each
//! holding attributes, metrics, criteria, one evaluation, and an ordered list
//! of per-bitstream test entries. Mutation is monotonic — fields are
//! append-only, evaluations and attributes are set once — and the report
//! round-trips exactly to/from JSON at [`ReportLevel::Full`].
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "program": { "name": "...", "version": "...", "report level": "full" },
//!   "configurations": [
//!     { "id": 0, "attributes": [], "metrics": [], "criteria": [],
//!       "evaluation": "Pass",
//!       "tests": [ { "id": 0, "calculations": [], "criteria": [],
//!                    "evaluation": "Pass" } ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};
use crate::params::DataType;
use crate::stats::{ConfusionMatrix, ConfusionMatrixStatistics};

/// Default number of fractional digits when stringifying float values.
pub const DEFAULT_FLOAT_PRECISION: u32 = 6;

// ---------------------------------------------------------------------------
// Leaf value types
// ---------------------------------------------------------------------------

/// Serialization verbosity for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    /// Program identity and configuration verdicts only.
    Summary,
    /// Adds attributes, criteria, and evaluations.
    Standard,
    /// Everything, including calculations and metrics.
    Full,
}

impl std::fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Standard => write!(f, "standard"),
            Self::Full => write!(f, "full"),
        }
    }
}

impl std::str::FromStr for ReportLevel {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "summary" => Ok(Self::Summary),
            "standard" => Ok(Self::Standard),
            "full" => Ok(Self::Full),
            other => Err(ShellError::InvalidArgument(format!(
                "unknown report level \"{other}\""
            ))),
        }
    }
}

/// Pass/fail verdict for a test or configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Evaluation {
    Pass,
    Fail,
    Inconclusive,
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "Pass"),
            Self::Fail => write!(f, "Fail"),
            Self::Inconclusive => write!(f, "Inconclusive"),
        }
    }
}

/// Named value set once per configuration (e.g. an echoed parameter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "data type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub value: String,
}

/// Named measurement appended to a configuration during finalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(rename = "data type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub value: String,
}

/// A single boolean check contributing to an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub description: String,
    pub result: bool,
}

/// Named value recorded for one test (one bitstream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub name: String,
    #[serde(rename = "data type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub value: String,
}

/// One labelled component of a [`CalculationSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSetEntry {
    pub label: String,
    pub value: String,
}

/// A named, typed, ordered set of label→value pairs (e.g. the components of
/// a generalized statistic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSet {
    pub name: String,
    #[serde(rename = "data type")]
    pub data_type: DataType,
    pub values: Vec<CalculationSetEntry>,
}

// ---------------------------------------------------------------------------
// Structural types
// ---------------------------------------------------------------------------

/// Per-bitstream test entry within a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEntry {
    pub id: u64,
    pub calculations: Vec<Calculation>,
    #[serde(rename = "calculation sets", default, skip_serializing_if = "Vec::is_empty")]
    pub calculation_sets: Vec<CalculationSet>,
    pub criteria: Vec<Criterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
}

impl TestEntry {
    fn new(id: u64) -> Self {
        Self {
            id,
            calculations: Vec::new(),
            calculation_sets: Vec::new(),
            criteria: Vec::new(),
            evaluation: None,
        }
    }
}

/// One parameter variant of the test under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: u32,
    pub attributes: Vec<Attribute>,
    pub metrics: Vec<Metric>,
    pub criteria: Vec<Criterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    pub tests: Vec<TestEntry>,
}

impl Configuration {
    fn new(id: u32) -> Self {
        Self {
            id,
            attributes: Vec::new(),
            metrics: Vec::new(),
            criteria: Vec::new(),
            evaluation: None,
            tests: Vec::new(),
        }
    }

    fn test_mut(&mut self, test_id: u64) -> Result<&mut TestEntry> {
        let config_id = self.id;
        self.tests
            .iter_mut()
            .find(|t| t.id == test_id)
            .ok_or_else(|| {
                ShellError::NotFound(format!(
                    "test {test_id} in configuration {config_id}"
                ))
            })
    }
}

/// Program identity plus CLI-echoed run context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramInfo {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conductor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "schedule id", skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "report level")]
    pub level: ReportLevel,
}

/// Root report object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub program: ProgramInfo,
    pub configurations: Vec<Configuration>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Report {
    /// Create an empty report for the named program.
    pub fn new(name: &str, version: &str, level: ReportLevel) -> Result<Self> {
        if name.is_empty() {
            return Err(ShellError::InvalidArgument("program name is empty".into()));
        }
        if version.is_empty() {
            return Err(ShellError::InvalidArgument(
                "program version is empty".into(),
            ));
        }
        Ok(Self {
            program: ProgramInfo {
                name: name.to_string(),
                version: version.to_string(),
                conductor: None,
                notes: None,
                schedule_id: None,
                timestamp: None,
                level,
            },
            configurations: Vec::new(),
        })
    }

    /// Populate `count` configurations with dense ids `0..count`.
    pub fn with_configurations(mut self, count: u32) -> Self {
        self.configurations = (0..count).map(Configuration::new).collect();
        self
    }

    pub fn set_conductor(&mut self, conductor: &str) {
        self.program.conductor = Some(conductor.to_string());
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.program.notes = Some(notes.to_string());
    }

    pub fn set_schedule_id(&mut self, schedule_id: &str) {
        self.program.schedule_id = Some(schedule_id.to_string());
    }

    pub fn set_timestamp(&mut self, timestamp: &str) {
        self.program.timestamp = Some(timestamp.to_string());
    }

    /// Number of configurations.
    pub fn configuration_count(&self) -> u32 {
        self.configurations.len() as u32
    }

    /// Look up a configuration by id.
    pub fn configuration(&self, config_id: u32) -> Result<&Configuration> {
        self.configurations
            .iter()
            .find(|c| c.id == config_id)
            .ok_or_else(|| ShellError::NotFound(format!("configuration {config_id}")))
    }

    fn configuration_mut(&mut self, config_id: u32) -> Result<&mut Configuration> {
        self.configurations
            .iter_mut()
            .find(|c| c.id == config_id)
            .ok_or_else(|| ShellError::NotFound(format!("configuration {config_id}")))
    }

    // -----------------------------------------------------------------------
    // Configuration-level mutation
    // -----------------------------------------------------------------------

    /// Whether the configuration already carries an attribute with `name`.
    pub fn configuration_has_attribute(&self, config_id: u32, name: &str) -> Result<bool> {
        Ok(self
            .configuration(config_id)?
            .attributes
            .iter()
            .any(|a| a.name == name))
    }

    /// Set a named attribute once. A duplicate name fails with
    /// `InvalidArgument` rather than inserting twice.
    pub fn add_attribute_to_configuration(
        &mut self,
        config_id: u32,
        name: &str,
        data_type: DataType,
        precision: Option<u32>,
        units: Option<&str>,
        value: &str,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(ShellError::InvalidArgument("attribute name is empty".into()));
        }
        if value.is_empty() {
            return Err(ShellError::InvalidArgument(format!(
                "attribute \"{name}\" value is empty"
            )));
        }
        if self.configuration_has_attribute(config_id, name)? {
            return Err(ShellError::InvalidArgument(format!(
                "attribute \"{name}\" already set on configuration {config_id}"
            )));
        }
        self.configuration_mut(config_id)?.attributes.push(Attribute {
            name: name.to_string(),
            data_type,
            precision,
            units: units.map(str::to_string),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Append a metric to a configuration.
    pub fn add_metric_to_configuration(
        &mut self,
        config_id: u32,
        name: &str,
        data_type: DataType,
        precision: Option<u32>,
        units: Option<&str>,
        value: &str,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(ShellError::InvalidArgument("metric name is empty".into()));
        }
        if value.is_empty() {
            return Err(ShellError::InvalidArgument(format!(
                "metric \"{name}\" value is empty"
            )));
        }
        self.configuration_mut(config_id)?.metrics.push(Metric {
            name: name.to_string(),
            data_type,
            precision,
            units: units.map(str::to_string),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Append a criterion to a configuration.
    pub fn add_criterion_to_configuration(
        &mut self,
        config_id: u32,
        description: &str,
        result: bool,
    ) -> Result<()> {
        if description.is_empty() {
            return Err(ShellError::InvalidArgument(
                "criterion description is empty".into(),
            ));
        }
        self.configuration_mut(config_id)?.criteria.push(Criterion {
            description: description.to_string(),
            result,
        });
        Ok(())
    }

    /// Record the configuration evaluation: AND over the configuration's own
    /// criteria (not its member tests'). First call wins; later calls return
    /// the recorded verdict unchanged.
    pub fn add_evaluation_to_configuration(&mut self, config_id: u32) -> Result<Evaluation> {
        let config = self.configuration_mut(config_id)?;
        if let Some(existing) = config.evaluation {
            return Ok(existing);
        }
        let passed = config.criteria.iter().all(|c| c.result);
        let evaluation = if passed {
            Evaluation::Pass
        } else {
            Evaluation::Fail
        };
        config.evaluation = Some(evaluation);
        Ok(evaluation)
    }

    /// Record the 8 confusion-matrix count fields as configuration metrics.
    pub fn add_confusion_matrix_metrics_to_configuration(
        &mut self,
        config_id: u32,
        matrix: &ConfusionMatrix,
    ) -> Result<()> {
        let counts: [(&str, u64); 8] = [
            ("predicted pass count", matrix.predicted_pass),
            ("predicted fail count", matrix.predicted_fail),
            ("actual pass count", matrix.actual_pass),
            ("actual fail count", matrix.actual_fail),
            ("true positives", matrix.true_positives),
            ("false positives", matrix.false_positives),
            ("true negatives", matrix.true_negatives),
            ("false negatives", matrix.false_negatives),
        ];
        for (name, value) in counts {
            self.add_metric_to_configuration(
                config_id,
                name,
                DataType::UInt64,
                None,
                Some("tests"),
                &value.to_string(),
            )?;
        }
        Ok(())
    }

    /// Record derived confusion-matrix statistics as configuration metrics.
    /// Undefined ratios arrive as NaN and serialize as the string `"NaN"`.
    pub fn add_confusion_matrix_statistics_to_configuration(
        &mut self,
        config_id: u32,
        statistics: &ConfusionMatrixStatistics,
    ) -> Result<()> {
        for (name, value) in statistics.named_values() {
            self.add_metric_to_configuration(
                config_id,
                name,
                DataType::Float64,
                Some(DEFAULT_FLOAT_PRECISION),
                None,
                &format_float(value, None),
            )?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Test-level mutation
    // -----------------------------------------------------------------------

    /// Add a test entry for the given 1-based external bitstream id. The
    /// entry's id is the 0-based index, and entries are kept in ascending id
    /// order no matter the insertion order. Returns the test id.
    pub fn add_test_to_configuration(&mut self, config_id: u32, bitstream_id: u64) -> Result<u64> {
        if bitstream_id == 0 {
            return Err(ShellError::InvalidArgument(
                "bitstream id is 1-based; got 0".into(),
            ));
        }
        let test_id = bitstream_id - 1;
        let config = self.configuration_mut(config_id)?;
        match config.tests.binary_search_by_key(&test_id, |t| t.id) {
            Ok(_) => Err(ShellError::InvalidArgument(format!(
                "test {test_id} already exists in configuration {config_id}"
            ))),
            Err(pos) => {
                config.tests.insert(pos, TestEntry::new(test_id));
                Ok(test_id)
            }
        }
    }

    /// Look up a test entry by id.
    pub fn test(&self, config_id: u32, test_id: u64) -> Result<&TestEntry> {
        self.configuration(config_id)?
            .tests
            .iter()
            .find(|t| t.id == test_id)
            .ok_or_else(|| {
                ShellError::NotFound(format!("test {test_id} in configuration {config_id}"))
            })
    }

    /// Append a calculation to a test.
    pub fn add_calculation_to_test(
        &mut self,
        config_id: u32,
        test_id: u64,
        name: &str,
        data_type: DataType,
        precision: Option<u32>,
        units: Option<&str>,
        value: &str,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(ShellError::InvalidArgument(
                "calculation name is empty".into(),
            ));
        }
        if value.is_empty() {
            return Err(ShellError::InvalidArgument(format!(
                "calculation \"{name}\" value is empty"
            )));
        }
        let test = self.configuration_mut(config_id)?.test_mut(test_id)?;
        test.calculations.push(Calculation {
            name: name.to_string(),
            data_type,
            precision,
            units: units.map(str::to_string),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Append a calculation set to a test.
    pub fn add_calculation_set_to_test(
        &mut self,
        config_id: u32,
        test_id: u64,
        set: CalculationSet,
    ) -> Result<()> {
        if set.name.is_empty() {
            return Err(ShellError::InvalidArgument(
                "calculation set name is empty".into(),
            ));
        }
        let test = self.configuration_mut(config_id)?.test_mut(test_id)?;
        test.calculation_sets.push(set);
        Ok(())
    }

    /// Append a criterion to a test.
    pub fn add_criterion_to_test(
        &mut self,
        config_id: u32,
        test_id: u64,
        description: &str,
        result: bool,
    ) -> Result<()> {
        if description.is_empty() {
            return Err(ShellError::InvalidArgument(
                "criterion description is empty".into(),
            ));
        }
        let test = self.configuration_mut(config_id)?.test_mut(test_id)?;
        test.criteria.push(Criterion {
            description: description.to_string(),
            result,
        });
        Ok(())
    }

    /// Record the test evaluation: AND over the test's criteria. Returns the
    /// boolean verdict. First call wins.
    pub fn add_evaluation_to_test(&mut self, config_id: u32, test_id: u64) -> Result<bool> {
        let test = self.configuration_mut(config_id)?.test_mut(test_id)?;
        if let Some(existing) = test.evaluation {
            return Ok(existing == Evaluation::Pass);
        }
        let passed = test.criteria.iter().all(|c| c.result);
        test.evaluation = Some(if passed {
            Evaluation::Pass
        } else {
            Evaluation::Fail
        });
        Ok(passed)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize honoring the report level. `Full` emits every field and
    /// round-trips exactly through [`Report::from_json`].
    pub fn to_json(&self) -> Result<String> {
        let pruned = self.pruned_for_level();
        serde_json::to_string_pretty(&pruned).map_err(ShellError::from)
    }

    /// Parse a report from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let report: Report = serde_json::from_str(text)?;
        if report.program.name.is_empty() {
            return Err(ShellError::JsonOperation(
                "report is missing a program name".into(),
            ));
        }
        Ok(report)
    }

    /// Copy of the report with sections cleared per the report level.
    fn pruned_for_level(&self) -> Report {
        let mut report = self.clone();
        match report.program.level {
            ReportLevel::Full => {}
            ReportLevel::Standard => {
                for config in &mut report.configurations {
                    config.metrics.clear();
                    for test in &mut config.tests {
                        test.calculations.clear();
                        test.calculation_sets.clear();
                    }
                }
            }
            ReportLevel::Summary => {
                for config in &mut report.configurations {
                    config.attributes.clear();
                    config.metrics.clear();
                    config.criteria.clear();
                    config.tests.clear();
                }
            }
        }
        report
    }
}

// ---------------------------------------------------------------------------
// Value formatting
// ---------------------------------------------------------------------------

/// Stringify a float with the given precision (default 6 digits).
/// NaN stringifies as `"NaN"`.
pub fn format_float(value: f64, precision: Option<u32>) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let digits = precision.unwrap_or(DEFAULT_FLOAT_PRECISION) as usize;
    format!("{value:.digits$}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
