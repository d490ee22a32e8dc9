//! Block frequency test — one-bit frequency within M-bit blocks.
//!
//! Runs one configuration per declared block length (1 to 8 configurations),
//! so a single invocation evaluates the same bitstreams at several block
//! granularities. Per-bitstream statistic for block length M:
//! `chi² = 4·M·Σ(πᵢ − 1/2)²` over the N complete blocks, with p-value from
//! the upper tail of the chi-squared distribution with N degrees of freedom.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use randshell_core::bitstream::BitstreamBuffer;
use randshell_core::params::{
    PARAM_BITSTREAM_COUNT, PARAM_BITSTREAM_LENGTH, PARAM_SIGNIFICANCE_LEVEL, PARAM_THREAD_COUNT,
    ParameterInfo, ParameterSet,
};
use randshell_core::report::{Calculation, Criterion, format_float};
use randshell_core::shell::{PluginInfo, TestPlugin, TestRecord};
use randshell_core::{DataType, Report, Result, ShellError};

use crate::{finalize_configuration, to_bits};

/// Name of the comma-separated block-lengths parameter.
pub const PARAM_BLOCK_LENGTHS: &str = "block lengths";

/// Most block-length configurations a single invocation may declare.
const MAX_CONFIGURATIONS: usize = 8;

/// Block frequency test plugin.
pub struct BlockFrequencyTest {
    significance_level: f64,
    block_lengths: Vec<u64>,
}

impl BlockFrequencyTest {
    pub fn new() -> Self {
        Self {
            significance_level: 0.01,
            block_lengths: Vec::new(),
        }
    }
}

impl Default for BlockFrequencyTest {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_block_lengths(text: &str) -> Result<Vec<u64>> {
    let lengths = text
        .split(',')
        .map(|part| {
            part.trim().parse::<u64>().map_err(|_| {
                ShellError::InvalidArgument(format!(
                    "block length \"{}\" is not an unsigned integer",
                    part.trim()
                ))
            })
        })
        .collect::<Result<Vec<u64>>>()?;
    if lengths.is_empty() || lengths.len() > MAX_CONFIGURATIONS {
        return Err(ShellError::OutOfRange(format!(
            "expected 1..={MAX_CONFIGURATIONS} block lengths, got {}",
            lengths.len()
        )));
    }
    if lengths.iter().any(|&m| m == 0) {
        return Err(ShellError::OutOfRange("block length 0 is not usable".into()));
    }
    Ok(lengths)
}

impl TestPlugin for BlockFrequencyTest {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "block frequency".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: "one-bit frequency within M-bit blocks, one configuration per block length"
                .into(),
        }
    }

    fn parameters_info(&self) -> Vec<ParameterInfo> {
        vec![
            ParameterInfo {
                name: PARAM_BITSTREAM_COUNT.into(),
                data_type: DataType::UInt64,
                precision: None,
                units: Some("bitstreams".into()),
                default_value: "100".into(),
                min: Some("1".into()),
                max: None,
            },
            ParameterInfo {
                name: PARAM_BITSTREAM_LENGTH.into(),
                data_type: DataType::UInt64,
                precision: None,
                units: Some("bits".into()),
                default_value: "1000000".into(),
                min: Some("1280".into()),
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
                name: PARAM_BLOCK_LENGTHS.into(),
                data_type: DataType::Utf8String,
                precision: None,
                units: Some("bits".into()),
                default_value: "128".into(),
                min: None,
                max: None,
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
        self.significance_level = params.f64_value(PARAM_SIGNIFICANCE_LEVEL)?;
        let bits = params.u64_value(PARAM_BITSTREAM_LENGTH)?;
        if bits % 8 != 0 {
            return Err(ShellError::InvalidArgument(format!(
                "bitstream length must be a multiple of 8 bits; got {bits}"
            )));
        }
        let text = params.require(PARAM_BLOCK_LENGTHS)?.native()?;
        self.block_lengths = parse_block_lengths(text.as_str()?)?;
        if let Some(&too_long) = self.block_lengths.iter().find(|&&m| m > bits) {
            return Err(ShellError::OutOfRange(format!(
                "block length {too_long} exceeds bitstream length {bits}"
            )));
        }
        Ok((bits / 8) as usize)
    }

    fn configuration_count(&self) -> u32 {
        self.block_lengths.len() as u32
    }

    fn execute(&self, _bitstream_id: u64, buffer: BitstreamBuffer) -> Result<Vec<TestRecord>> {
        let bits = to_bits(&buffer.bytes);
        let n = bits.len();

        let mut records = Vec::with_capacity(self.block_lengths.len());
        for (config_id, &block_length) in self.block_lengths.iter().enumerate() {
            let m = block_length as usize;
            let num_blocks = n / m;
            let mut chi2 = 0.0;
            for block in bits.chunks_exact(m).take(num_blocks) {
                let ones: usize = block.iter().map(|&b| b as usize).sum();
                let proportion = ones as f64 / m as f64;
                chi2 += (proportion - 0.5) * (proportion - 0.5);
            }
            chi2 *= 4.0 * m as f64;

            let dist = ChiSquared::new(num_blocks as f64).map_err(|e| {
                ShellError::OutOfRange(format!("chi-squared degrees of freedom: {e}"))
            })?;
            let p = dist.sf(chi2);

            let mut record = TestRecord::new(config_id as u32);
            record.calculations.push(Calculation {
                name: "block count".into(),
                data_type: DataType::UInt64,
                precision: None,
                units: Some("blocks".into()),
                value: num_blocks.to_string(),
            });
            record.calculations.push(Calculation {
                name: "chi squared".into(),
                data_type: DataType::Float64,
                precision: Some(6),
                units: None,
                value: format_float(chi2, Some(6)),
            });
            record.calculations.push(Calculation {
                name: "p-value".into(),
                data_type: DataType::Float64,
                precision: Some(6),
                units: None,
                value: format_float(p, Some(6)),
            });
            record.criteria.push(Criterion {
                description: format!(
                    "p-value ({}) >= significance level ({})",
                    format_float(p, Some(6)),
                    format_float(self.significance_level, Some(6))
                ),
                result: p >= self.significance_level,
            });
            records.push(record);
        }
        Ok(records)
    }

    fn finalize(&self, report: &mut Report, bitstream_count: u64) -> Result<()> {
        for (config_id, &block_length) in self.block_lengths.iter().enumerate() {
            report.add_attribute_to_configuration(
                config_id as u32,
                "block length",
                DataType::UInt64,
                None,
                Some("bits"),
                &block_length.to_string(),
            )?;
            finalize_configuration(
                report,
                config_id as u32,
                self.significance_level,
                bitstream_count,
            )?;
        }
        Ok(())
    }
}
