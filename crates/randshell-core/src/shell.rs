//! Test lifecycle driver — the shell every statistical test program runs in.
//!
//! The shell owns the full run: parameter resolution, plugin init, chunked
//! ingestion with per-chunk execute calls (optionally fanned out over a
//! worker-thread batch), plugin finalize, and report serialization.
//!
//! The report is mutated by the driver thread only. Workers return their
//! per-bitstream [`TestRecord`]s and the driver applies them after the whole
//! batch has joined, writing test entries keyed by bitstream id — so report
//! ordering is stable even when workers complete out of order.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use serde::Serialize;

use crate::bitstream::{BitstreamBuffer, BitstreamReader};
use crate::error::{Result, ShellError};
use crate::params::{PARAM_BITSTREAM_COUNT, PARAM_THREAD_COUNT, ParameterInfo, ParameterSet};
use crate::report::{Calculation, CalculationSet, Criterion, Report, ReportLevel};

// ---------------------------------------------------------------------------
// Plugin contract
// ---------------------------------------------------------------------------

/// Identity metadata for a test plugin, serialized for `--test-info`.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Everything one execute call wants recorded for one configuration.
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub configuration_id: u32,
    pub calculations: Vec<Calculation>,
    pub calculation_sets: Vec<CalculationSet>,
    pub criteria: Vec<Criterion>,
}

impl TestRecord {
    pub fn new(configuration_id: u32) -> Self {
        Self {
            configuration_id,
            calculations: Vec::new(),
            calculation_sets: Vec::new(),
            criteria: Vec::new(),
        }
    }
}

/// Trait every statistical test implements to run inside the shell.
///
/// `execute` takes `&self` because in multi-threaded mode it runs on worker
/// threads; accumulated plugin state lives behind interior mutability.
pub trait TestPlugin: Send + Sync {
    /// Plugin identity.
    fn info(&self) -> PluginInfo;

    /// Declared parameter schemas.
    fn parameters_info(&self) -> Vec<ParameterInfo>;

    /// Bind resolved parameters; returns the required buffer size in bytes.
    fn initialize(&mut self, params: &ParameterSet) -> Result<usize>;

    /// Number of parameter variants this run evaluates.
    fn configuration_count(&self) -> u32;

    /// Process one bitstream chunk; returns one record per configuration.
    /// Ownership of the buffer transfers to the plugin.
    fn execute(&self, bitstream_id: u64, buffer: BitstreamBuffer) -> Result<Vec<TestRecord>>;

    /// Record aggregate metrics, criteria, and evaluations per configuration.
    fn finalize(&self, report: &mut Report, bitstream_count: u64) -> Result<()>;
}

// ---------------------------------------------------------------------------
// CLI surface
// ---------------------------------------------------------------------------

/// Command-line surface shared by every test program.
#[derive(Debug, Parser)]
#[command(version)]
pub struct ShellArgs {
    /// Path to the entropy input: a raw bitstream file, character device, or
    /// a directory of per-bitstream files
    #[arg(short = 'e', long)]
    pub entropy_file_path: Option<PathBuf>,

    /// Parameter set as inline JSON text
    #[arg(short = 'P', long)]
    pub parameters: Option<String>,

    /// Path to a parameter set JSON file
    #[arg(short = 'p', long)]
    pub parameters_file_path: Option<PathBuf>,

    /// Where to write the report (stdout when omitted)
    #[arg(short = 'r', long)]
    pub report_file_path: Option<PathBuf>,

    /// Report verbosity
    #[arg(short = 'l', long, default_value = "full", value_parser = ["summary", "standard", "full"])]
    pub report_level: String,

    /// Emit a progress line per processed bitstream on stderr
    #[arg(short = 'R', long)]
    pub report_progress: bool,

    /// Schedule id echoed into the report
    #[arg(short = 's', long)]
    pub schedule_id: Option<String>,

    /// Test conductor echoed into the report
    #[arg(short = 'c', long)]
    pub conductor: Option<String>,

    /// Free-form notes echoed into the report
    #[arg(short = 'n', long)]
    pub notes: Option<String>,

    /// Print the test's parameter schemas as JSON and exit
    #[arg(short = 'i', long)]
    pub parameters_info: bool,

    /// Print the test's identity as JSON and exit
    #[arg(short = 't', long)]
    pub test_info: bool,

    /// Print failure detail with PID/source context to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// CLI-echoed context recorded in the report header.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub conductor: Option<String>,
    pub notes: Option<String>,
    pub schedule_id: Option<String>,
    pub timestamp: Option<String>,
    pub report_progress: bool,
}

// ---------------------------------------------------------------------------
// Entropy input
// ---------------------------------------------------------------------------

/// A run's entropy source: one chunked stream, or a directory with one file
/// per bitstream (sorted by name, each contributing its leading chunk).
enum EntropyInput {
    Stream(BitstreamReader<File>),
    Files {
        paths: Vec<PathBuf>,
        index: usize,
        buffer_size_bytes: usize,
    },
}

impl EntropyInput {
    fn open(path: &Path, buffer_size_bytes: usize) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|_| ShellError::EmptyOrMissingFile(path.display().to_string()))?;
        if metadata.is_dir() {
            let mut paths: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            paths.sort();
            if paths.is_empty() {
                return Err(ShellError::EmptyOrMissingFile(path.display().to_string()));
            }
            Ok(Self::Files {
                paths,
                index: 0,
                buffer_size_bytes,
            })
        } else {
            Ok(Self::Stream(BitstreamReader::open(path, buffer_size_bytes)?))
        }
    }

    fn next_buffer(&mut self) -> Result<Option<BitstreamBuffer>> {
        match self {
            Self::Stream(reader) => reader.next_buffer(),
            Self::Files {
                paths,
                index,
                buffer_size_bytes,
            } => {
                if *index >= paths.len() {
                    return Ok(None);
                }
                let mut reader = BitstreamReader::open(&paths[*index], *buffer_size_bytes)?;
                *index += 1;
                reader.next_buffer()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run a plugin's full lifecycle over the entropy input and return the
/// assembled report. Any plugin failure aborts the run; no partial report
/// survives.
pub fn run_shell(
    plugin: &mut dyn TestPlugin,
    supplied: &ParameterSet,
    entropy_path: &Path,
    level: ReportLevel,
    context: &RunContext,
) -> Result<Report> {
    let plugin_info = plugin.info();
    let declared = plugin.parameters_info();
    let params = ParameterSet::resolve(&plugin_info.name, &declared, supplied)?;

    let buffer_size_bytes = plugin.initialize(&params)?;
    let bitstream_count = params.u64_value(PARAM_BITSTREAM_COUNT)?;
    let threads = match params.get(PARAM_THREAD_COUNT) {
        Some(parameter) => (parameter.native()?.as_u64()? as usize).max(1),
        None => 1,
    };

    let mut report = Report::new(&plugin_info.name, &plugin_info.version, level)?
        .with_configurations(plugin.configuration_count());
    for config_id in 0..report.configuration_count() {
        for parameter in &params.parameters {
            report.add_attribute_to_configuration(
                config_id,
                &parameter.name,
                parameter.data_type,
                parameter.precision,
                parameter.units.as_deref(),
                &parameter.value,
            )?;
        }
    }
    if let Some(conductor) = &context.conductor {
        report.set_conductor(conductor);
    }
    if let Some(notes) = &context.notes {
        report.set_notes(notes);
    }
    if let Some(schedule_id) = &context.schedule_id {
        report.set_schedule_id(schedule_id);
    }
    let timestamp = context
        .timestamp
        .clone()
        .unwrap_or_else(|| format_iso8601(now_since_epoch()));
    report.set_timestamp(&timestamp);

    let mut input = EntropyInput::open(entropy_path, buffer_size_bytes)?;

    let mut next_id: u64 = 1;
    while next_id <= bitstream_count {
        let batch_size = threads.min((bitstream_count - next_id + 1) as usize);
        let mut batch = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            let buffer = input.next_buffer()?.ok_or_else(|| {
                ShellError::NotFound(format!(
                    "entropy input exhausted after {} of {bitstream_count} bitstreams",
                    next_id - 1
                ))
            })?;
            batch.push((next_id, buffer));
            next_id += 1;
        }

        let first = batch.first().map(|(id, _)| *id).unwrap_or(0);
        let last = batch.last().map(|(id, _)| *id).unwrap_or(0);
        let results = execute_batch(plugin, batch, threads)?;
        apply_records(&mut report, results)?;

        if context.report_progress {
            for id in first..=last {
                eprintln!("bitstream {id}/{bitstream_count}");
            }
        }
    }

    plugin.finalize(&mut report, bitstream_count)?;
    Ok(report)
}

/// Execute one batch of buffers, fanned out over worker threads when the
/// thread count allows. The driver blocks until every worker has joined.
fn execute_batch(
    plugin: &dyn TestPlugin,
    batch: Vec<(u64, BitstreamBuffer)>,
    threads: usize,
) -> Result<Vec<(u64, Vec<TestRecord>)>> {
    if threads <= 1 || batch.len() <= 1 {
        let mut results = Vec::with_capacity(batch.len());
        for (bitstream_id, buffer) in batch {
            results.push((bitstream_id, plugin.execute(bitstream_id, buffer)?));
        }
        return Ok(results);
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = batch
            .into_iter()
            .map(|(bitstream_id, buffer)| {
                scope.spawn(move || (bitstream_id, plugin.execute(bitstream_id, buffer)))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let (bitstream_id, result) = handle.join().map_err(|_| {
                ShellError::SystemCall(std::io::Error::other("worker thread panicked"))
            })?;
            results.push((bitstream_id, result?));
        }
        Ok(results)
    })
}

/// Write a batch's records into the report. Insertion is keyed by bitstream
/// id, so any arrival order yields the same id-ordered test lists.
fn apply_records(report: &mut Report, batch: Vec<(u64, Vec<TestRecord>)>) -> Result<()> {
    for (bitstream_id, records) in batch {
        for record in records {
            let config_id = record.configuration_id;
            let test_id = report.add_test_to_configuration(config_id, bitstream_id)?;
            for calculation in &record.calculations {
                report.add_calculation_to_test(
                    config_id,
                    test_id,
                    &calculation.name,
                    calculation.data_type,
                    calculation.precision,
                    calculation.units.as_deref(),
                    &calculation.value,
                )?;
            }
            for set in record.calculation_sets {
                report.add_calculation_set_to_test(config_id, test_id, set)?;
            }
            for criterion in &record.criteria {
                report.add_criterion_to_test(
                    config_id,
                    test_id,
                    &criterion.description,
                    criterion.result,
                )?;
            }
            report.add_evaluation_to_test(config_id, test_id)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Test-program entry point
// ---------------------------------------------------------------------------

/// Full CLI entry for a test program. Returns the process exit code: 0 on
/// success, 1 on any failure. Failure detail goes to stderr only under
/// `--verbose`; otherwise the status is the exit code alone, so orchestration
/// tooling can aggregate across many spawned programs.
pub fn run_test_program(plugin: &mut dyn TestPlugin, args: &ShellArgs) -> i32 {
    match run_test_program_inner(plugin, args) {
        Ok(()) => 0,
        Err(error) => {
            log::error!("{}: {error}", plugin.info().name);
            if args.verbose {
                eprintln!(
                    "[pid {}] {}: {error}",
                    std::process::id(),
                    plugin.info().name
                );
            }
            1
        }
    }
}

fn run_test_program_inner(plugin: &mut dyn TestPlugin, args: &ShellArgs) -> Result<()> {
    if args.test_info {
        println!("{}", serde_json::to_string_pretty(&plugin.info())?);
        return Ok(());
    }
    if args.parameters_info {
        println!(
            "{}",
            serde_json::to_string_pretty(&plugin.parameters_info())?
        );
        return Ok(());
    }

    let supplied = load_supplied_parameters(args)?;
    let level: ReportLevel = args.report_level.parse()?;
    let entropy_path = args.entropy_file_path.as_deref().ok_or_else(|| {
        ShellError::InvalidArgument("--entropy-file-path is required".into())
    })?;

    let context = RunContext {
        conductor: args.conductor.clone(),
        notes: args.notes.clone(),
        schedule_id: args.schedule_id.clone(),
        timestamp: None,
        report_progress: args.report_progress,
    };

    let report = run_shell(plugin, &supplied, entropy_path, level, &context)?;
    let json = report.to_json()?;
    match &args.report_file_path {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Load the supplied parameter set from `--parameters` or
/// `--parameters-file-path`; an empty set means every default applies.
fn load_supplied_parameters(args: &ShellArgs) -> Result<ParameterSet> {
    if let Some(text) = &args.parameters {
        return ParameterSet::from_json(text);
    }
    if let Some(path) = &args.parameters_file_path {
        let text = std::fs::read_to_string(path)
            .map_err(|_| ShellError::EmptyOrMissingFile(path.display().to_string()))?;
        return ParameterSet::from_json(&text);
    }
    Ok(ParameterSet {
        name: "defaults".into(),
        parameters: Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

fn now_since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Format a duration-since-epoch as an ISO-8601 timestamp.
/// Example: `2026-02-15T01:30:00Z`
fn format_iso8601(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs();
    let (year, month, day, hour, min, sec) = secs_to_utc(secs);
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}Z")
}

/// Convert seconds since Unix epoch to (year, month, day, hour, minute,
/// second) UTC. Simple implementation — no leap second handling.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;

    loop {
        let days_in_year = if is_leap(year) { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }

    let months_days: [u64; 12] = if is_leap(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 0u64;
    for (i, &md) in months_days.iter().enumerate() {
        if days < md {
            month = i as u64 + 1;
            break;
        }
        days -= md;
    }
    let day = days + 1;

    (year, month, day, hour, min, sec)
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{
        DataType, PARAM_BITSTREAM_LENGTH, PARAM_SIGNIFICANCE_LEVEL, Parameter,
    };
    use crate::report::format_float;
    use std::io::Write;
    use std::sync::Mutex;

    /// Minimal plugin: records the proportion of one-bits per chunk, with an
    /// optional per-execute delay keyed by bitstream id to force out-of-order
    /// worker completion.
    struct ProportionPlugin {
        buffer_size_bytes: usize,
        executed: Mutex<Vec<u64>>,
        stagger: bool,
        fail_on: Option<u64>,
    }

    impl ProportionPlugin {
        fn new() -> Self {
            Self {
                buffer_size_bytes: 0,
                executed: Mutex::new(Vec::new()),
                stagger: false,
                fail_on: None,
            }
        }
    }

    impl TestPlugin for ProportionPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                name: "proportion".into(),
                version: "0.0.1".into(),
                description: "one-bit proportion per chunk".into(),
            }
        }

        fn parameters_info(&self) -> Vec<ParameterInfo> {
            vec![
                ParameterInfo {
                    name: PARAM_BITSTREAM_COUNT.into(),
                    data_type: DataType::UInt64,
                    precision: None,
                    units: Some("bitstreams".into()),
                    default_value: "4".into(),
                    min: Some("1".into()),
                    max: None,
                },
                ParameterInfo {
                    name: PARAM_BITSTREAM_LENGTH.into(),
                    data_type: DataType::UInt64,
                    precision: None,
                    units: Some("bits".into()),
                    default_value: "256".into(),
                    min: Some("8".into()),
                    max: None,
                },
                ParameterInfo {
                    name: PARAM_SIGNIFICANCE_LEVEL.into(),
                    data_type: DataType::Float64,
                    precision: Some(6),
                    units: None,
                    default_value: "0.01".into(),
                    min: Some("0.000001".into()),
                    max: Some("0.999999".into()),
                },
                ParameterInfo {
                    name: PARAM_THREAD_COUNT.into(),
                    data_type: DataType::UInt32,
                    precision: None,
                    units: Some("threads".into()),
                    default_value: "1".into(),
                    min: Some("1".into()),
                    max: Some("64".into()),
                },
            ]
        }

        fn initialize(&mut self, params: &ParameterSet) -> Result<usize> {
            let bits = params.u64_value(PARAM_BITSTREAM_LENGTH)?;
            self.buffer_size_bytes = (bits / 8) as usize;
            Ok(self.buffer_size_bytes)
        }

        fn configuration_count(&self) -> u32 {
            1
        }

        fn execute(&self, bitstream_id: u64, buffer: BitstreamBuffer) -> Result<Vec<TestRecord>> {
            if self.fail_on == Some(bitstream_id) {
                return Err(ShellError::ValidationFailure("injected failure".into()));
            }
            if self.stagger {
                // Later ids finish first.
                std::thread::sleep(Duration::from_millis(5 * (5 - bitstream_id.min(5))));
            }
            self.executed.lock().unwrap().push(bitstream_id);

            let proportion = buffer.num_ones as f64 / (buffer.len() as f64 * 8.0);
            let mut record = TestRecord::new(0);
            record.calculations.push(Calculation {
                name: "one proportion".into(),
                data_type: DataType::Float64,
                precision: Some(6),
                units: None,
                value: format_float(proportion, Some(6)),
            });
            record.criteria.push(Criterion {
                description: "proportion within [0.25, 0.75]".into(),
                result: (0.25..=0.75).contains(&proportion),
            });
            Ok(vec![record])
        }

        fn finalize(&self, report: &mut Report, bitstream_count: u64) -> Result<()> {
            report.add_criterion_to_configuration(
                0,
                "all bitstreams processed",
                self.executed.lock().unwrap().len() as u64 == bitstream_count,
            )?;
            report.add_evaluation_to_configuration(0)?;
            Ok(())
        }
    }

    fn entropy_file(bytes: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // Alternating bytes: exactly half the bits set.
        file.write_all(&vec![0xAAu8; bytes]).unwrap();
        file.flush().unwrap();
        file
    }

    fn params(pairs: &[(&str, DataType, &str)]) -> ParameterSet {
        ParameterSet {
            name: "run".into(),
            parameters: pairs
                .iter()
                .map(|(name, dt, value)| Parameter {
                    name: name.to_string(),
                    data_type: *dt,
                    precision: None,
                    units: None,
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Sequential runs
    // -----------------------------------------------------------------------

    #[test]
    fn test_single_threaded_run() {
        let file = entropy_file(4 * 32);
        let mut plugin = ProportionPlugin::new();
        let report = run_shell(
            &mut plugin,
            &params(&[]),
            file.path(),
            ReportLevel::Full,
            &RunContext::default(),
        )
        .unwrap();

        let config = report.configuration(0).unwrap();
        assert_eq!(config.tests.len(), 4);
        let ids: Vec<u64> = config.tests.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        for test in &config.tests {
            assert_eq!(test.evaluation, Some(crate::report::Evaluation::Pass));
            assert_eq!(test.calculations[0].value, "0.500000");
        }
        assert_eq!(config.evaluation, Some(crate::report::Evaluation::Pass));
    }

    #[test]
    fn test_run_echoes_context() {
        let file = entropy_file(4 * 32);
        let mut plugin = ProportionPlugin::new();
        let context = RunContext {
            conductor: Some("lab".into()),
            notes: Some("overnight run".into()),
            schedule_id: Some("sched-3".into()),
            timestamp: Some("2026-08-08T00:00:00Z".into()),
            report_progress: false,
        };
        let report = run_shell(
            &mut plugin,
            &params(&[]),
            file.path(),
            ReportLevel::Full,
            &context,
        )
        .unwrap();
        assert_eq!(report.program.conductor.as_deref(), Some("lab"));
        assert_eq!(report.program.schedule_id.as_deref(), Some("sched-3"));
        assert_eq!(
            report.program.timestamp.as_deref(),
            Some("2026-08-08T00:00:00Z")
        );
    }

    #[test]
    fn test_exhausted_input_fails() {
        // 2 chunks of input, 4 bitstreams requested.
        let file = entropy_file(2 * 32);
        let mut plugin = ProportionPlugin::new();
        let err = run_shell(
            &mut plugin,
            &params(&[]),
            file.path(),
            ReportLevel::Full,
            &RunContext::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ShellError::NotFound(_)));
    }

    #[test]
    fn test_plugin_failure_aborts_run() {
        let file = entropy_file(4 * 32);
        let mut plugin = ProportionPlugin::new();
        plugin.fail_on = Some(3);
        let err = run_shell(
            &mut plugin,
            &params(&[]),
            file.path(),
            ReportLevel::Full,
            &RunContext::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ShellError::ValidationFailure(_)));
    }

    // -----------------------------------------------------------------------
    // Multi-threaded runs
    // -----------------------------------------------------------------------

    #[test]
    fn test_out_of_order_completion_yields_ordered_tests() {
        let file = entropy_file(4 * 32);
        let mut plugin = ProportionPlugin::new();
        plugin.stagger = true;
        let report = run_shell(
            &mut plugin,
            &params(&[(PARAM_THREAD_COUNT, DataType::UInt32, "4")]),
            file.path(),
            ReportLevel::Full,
            &RunContext::default(),
        )
        .unwrap();

        let ids: Vec<u64> = report
            .configuration(0)
            .unwrap()
            .tests
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_apply_records_sorts_shuffled_batch() {
        let mut report = Report::new("t", "1", ReportLevel::Full)
            .unwrap()
            .with_configurations(1);
        let batch: Vec<(u64, Vec<TestRecord>)> = [3u64, 1, 4, 2]
            .iter()
            .map(|&id| (id, vec![TestRecord::new(0)]))
            .collect();
        apply_records(&mut report, batch).unwrap();
        let ids: Vec<u64> = report
            .configuration(0)
            .unwrap()
            .tests
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_batching_respects_bitstream_count() {
        // 6 bitstreams with 4 threads: batches of 4 then 2.
        let file = entropy_file(6 * 32);
        let mut plugin = ProportionPlugin::new();
        let report = run_shell(
            &mut plugin,
            &params(&[
                (PARAM_BITSTREAM_COUNT, DataType::UInt64, "6"),
                (PARAM_THREAD_COUNT, DataType::UInt32, "4"),
            ]),
            file.path(),
            ReportLevel::Full,
            &RunContext::default(),
        )
        .unwrap();
        assert_eq!(report.configuration(0).unwrap().tests.len(), 6);
    }

    // -----------------------------------------------------------------------
    // Directory input
    // -----------------------------------------------------------------------

    #[test]
    fn test_directory_of_bitstream_files() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..4 {
            std::fs::write(dir.path().join(format!("bitstream-{i}.bin")), vec![0xAAu8; 32])
                .unwrap();
        }
        let mut plugin = ProportionPlugin::new();
        let report = run_shell(
            &mut plugin,
            &params(&[]),
            dir.path(),
            ReportLevel::Full,
            &RunContext::default(),
        )
        .unwrap();
        assert_eq!(report.configuration(0).unwrap().tests.len(), 4);
    }

    // -----------------------------------------------------------------------
    // CLI parsing
    // -----------------------------------------------------------------------

    #[test]
    fn test_shell_args_parse() {
        let args = ShellArgs::parse_from([
            "frequency",
            "-e",
            "data.bin",
            "-P",
            "{\"name\":\"x\",\"parameters\":[]}",
            "-r",
            "report.json",
            "-l",
            "standard",
            "-R",
            "-s",
            "sched-1",
            "-c",
            "lab",
            "-v",
        ]);
        assert_eq!(args.entropy_file_path.as_deref(), Some(Path::new("data.bin")));
        assert_eq!(args.report_level, "standard");
        assert!(args.report_progress);
        assert!(args.verbose);
        assert_eq!(args.schedule_id.as_deref(), Some("sched-1"));
    }

    #[test]
    fn test_load_supplied_parameters_precedence() {
        let args = ShellArgs::parse_from([
            "frequency",
            "-P",
            "{\"name\":\"inline\",\"parameters\":[]}",
        ]);
        let set = load_supplied_parameters(&args).unwrap();
        assert_eq!(set.name, "inline");

        let args = ShellArgs::parse_from(["frequency"]);
        let set = load_supplied_parameters(&args).unwrap();
        assert!(set.parameters.is_empty());
    }

    // -----------------------------------------------------------------------
    // Timestamps
    // -----------------------------------------------------------------------

    #[test]
    fn test_format_iso8601_epoch() {
        assert_eq!(format_iso8601(Duration::from_secs(0)), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_secs_to_utc_known_date() {
        // 2000-01-01 00:00:00 UTC = 946684800
        let (y, m, d, h, mi, s) = secs_to_utc(946684800);
        assert_eq!((y, m, d, h, mi, s), (2000, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_is_leap() {
        assert!(is_leap(2000));
        assert!(is_leap(2024));
        assert!(!is_leap(1900));
        assert!(!is_leap(2023));
    }
}
