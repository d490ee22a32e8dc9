//! Test schedule JSON schema.
//!
//! The schedule document drives the external scheduler: which test programs
//! to spawn, and one profile per invocation (input bitstream file, parameter
//! file, report destination). The engine does not execute schedules itself,
//! but the schema is load-bearing for interop — field names (spaces
//! included) must round-trip bit-exact.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};
use crate::report::ReportLevel;

/// Root document: `{"schedule": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub schedule: Schedule,
}

/// One scheduled run of the full suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(rename = "schedule id")]
    pub schedule_id: String,
    #[serde(rename = "test conductor", skip_serializing_if = "Option::is_none")]
    pub test_conductor: Option<String>,
    #[serde(rename = "test notes", skip_serializing_if = "Option::is_none")]
    pub test_notes: Option<String>,
    #[serde(rename = "report level")]
    pub report_level: ReportLevel,
    #[serde(rename = "report progress", default)]
    pub report_progress: bool,
    pub tests: Vec<ScheduledTest>,
}

/// One test program and the profiles to run it under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTest {
    #[serde(rename = "program name")]
    pub program_name: String,
    pub profiles: Vec<ScheduleProfile>,
}

/// One invocation: input bitstream path, parameter file path, report path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleProfile {
    #[serde(rename = "profile id")]
    pub profile_id: u32,
    pub input: String,
    pub parameters: String,
    pub report: String,
}

impl ScheduleDocument {
    /// Parse a schedule document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: ScheduleDocument = serde_json::from_str(text)?;
        if document.schedule.schedule_id.is_empty() {
            return Err(ShellError::JsonOperation(
                "schedule is missing a schedule id".into(),
            ));
        }
        Ok(document)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ShellError::from)
    }
}
