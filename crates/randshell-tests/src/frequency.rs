//! Monobit frequency test — proportion of ones vs zeros should be ~50%.
//!
//! Per-bitstream statistic: `s_obs = |#ones − #zeros| / sqrt(n)`, with
//! p-value `erfc(s_obs / √2)`. A bitstream passes when the p-value meets the
//! significance level; the configuration passes when enough bitstreams pass
//! to clear the derived minimum test count.

use statrs::function::erf::erfc;

use randshell_core::bitstream::BitstreamBuffer;
use randshell_core::params::{
    PARAM_BITSTREAM_COUNT, PARAM_BITSTREAM_LENGTH, PARAM_SIGNIFICANCE_LEVEL, PARAM_THREAD_COUNT,
    ParameterInfo, ParameterSet,
};
use randshell_core::report::{
    Calculation, CalculationSet, CalculationSetEntry, Criterion, format_float,
};
use randshell_core::shell::{PluginInfo, TestPlugin, TestRecord};
use randshell_core::{DataType, Report, Result, ShellError};

use crate::finalize_configuration;

/// Monobit frequency test plugin.
pub struct FrequencyTest {
    significance_level: f64,
    bitstream_length_bits: u64,
}

impl FrequencyTest {
    pub fn new() -> Self {
        Self {
            significance_level: 0.01,
            bitstream_length_bits: 0,
        }
    }
}

impl Default for FrequencyTest {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPlugin for FrequencyTest {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "frequency".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: "monobit frequency test: proportion of one-bits vs zero-bits".into(),
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
                min: Some("100".into()),
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
        self.significance_level = params.f64_value(PARAM_SIGNIFICANCE_LEVEL)?;
        self.bitstream_length_bits = params.u64_value(PARAM_BITSTREAM_LENGTH)?;
        if self.bitstream_length_bits % 8 != 0 {
            return Err(ShellError::InvalidArgument(format!(
                "bitstream length must be a multiple of 8 bits; got {}",
                self.bitstream_length_bits
            )));
        }
        Ok((self.bitstream_length_bits / 8) as usize)
    }

    fn configuration_count(&self) -> u32 {
        1
    }

    fn execute(&self, _bitstream_id: u64, buffer: BitstreamBuffer) -> Result<Vec<TestRecord>> {
        let n = (buffer.len() * 8) as f64;
        let partial_sum = buffer.num_ones as i64 - buffer.num_zeros as i64;
        let s_obs = (partial_sum as f64).abs() / n.sqrt();
        let p = erfc(s_obs / std::f64::consts::SQRT_2);

        let mut record = TestRecord::new(0);
        record.calculations.push(Calculation {
            name: "partial sum".into(),
            data_type: DataType::Int64,
            precision: None,
            units: None,
            value: partial_sum.to_string(),
        });
        record.calculations.push(Calculation {
            name: "test statistic".into(),
            data_type: DataType::Float64,
            precision: Some(6),
            units: None,
            value: format_float(s_obs, Some(6)),
        });
        record.calculations.push(Calculation {
            name: "p-value".into(),
            data_type: DataType::Float64,
            precision: Some(6),
            units: None,
            value: format_float(p, Some(6)),
        });
        record.calculation_sets.push(CalculationSet {
            name: "bit counts".into(),
            data_type: DataType::UInt64,
            values: vec![
                CalculationSetEntry {
                    label: "ones".into(),
                    value: buffer.num_ones.to_string(),
                },
                CalculationSetEntry {
                    label: "zeros".into(),
                    value: buffer.num_zeros.to_string(),
                },
            ],
        });
        record.criteria.push(Criterion {
            description: format!(
                "p-value ({}) >= significance level ({})",
                format_float(p, Some(6)),
                format_float(self.significance_level, Some(6))
            ),
            result: p >= self.significance_level,
        });
        Ok(vec![record])
    }

    fn finalize(&self, report: &mut Report, bitstream_count: u64) -> Result<()> {
        finalize_configuration(report, 0, self.significance_level, bitstream_count)
    }
}
