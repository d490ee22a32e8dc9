//! Typed parameter schemas and string→native value resolution.
//!
//! A test plugin declares its parameters as [`ParameterInfo`] entries (name,
//! type tag, default, optional bounds — all canonical strings). The shell
//! resolves a supplied parameter set against those declarations into an
//! immutable [`ParameterSet`] of `(name, type, value)` tuples, converting to
//! native values on demand. Unrecognized supplied names are ignored so old
//! shells keep working against newer schedules.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};

/// Name of the required bitstream-count parameter.
pub const PARAM_BITSTREAM_COUNT: &str = "bitstream count";
/// Name of the required bitstream-length parameter (bits).
pub const PARAM_BITSTREAM_LENGTH: &str = "bitstream length";
/// Name of the required significance-level parameter.
pub const PARAM_SIGNIFICANCE_LEVEL: &str = "significance level";
/// Name of the optional worker-thread-count parameter.
pub const PARAM_THREAD_COUNT: &str = "thread count";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Declared data type of a parameter, attribute, metric, or calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "int8")]
    Int8,
    #[serde(rename = "int16")]
    Int16,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "uint8")]
    UInt8,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    #[serde(rename = "float32")]
    Float32,
    #[serde(rename = "float64")]
    Float64,
    #[serde(rename = "utf8 string")]
    Utf8String,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Utf8String => "utf8 string",
        };
        write!(f, "{tag}")
    }
}

impl std::str::FromStr for DataType {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bool" => Ok(Self::Bool),
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            "utf8 string" => Ok(Self::Utf8String),
            other => Err(ShellError::InvalidArgument(format!(
                "unknown data type tag \"{other}\""
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Native values
// ---------------------------------------------------------------------------

/// A parameter value converted from its canonical string form. Narrow
/// integer types are width-checked during parsing, then widened.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Bool(bool),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Utf8(String),
}

impl NativeValue {
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(*v),
            other => Err(ShellError::InvalidArgument(format!(
                "expected bool, got {other:?}"
            ))),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Self::Int64(v) => Ok(*v),
            other => Err(ShellError::InvalidArgument(format!(
                "expected integer, got {other:?}"
            ))),
        }
    }

    pub fn as_u64(&self) -> Result<u64> {
        match self {
            Self::UInt64(v) => Ok(*v),
            other => Err(ShellError::InvalidArgument(format!(
                "expected unsigned integer, got {other:?}"
            ))),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Self::Float64(v) => Ok(*v),
            other => Err(ShellError::InvalidArgument(format!(
                "expected float, got {other:?}"
            ))),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::Utf8(v) => Ok(v),
            other => Err(ShellError::InvalidArgument(format!(
                "expected string, got {other:?}"
            ))),
        }
    }
}

fn parse_failure(data_type: DataType, value: &str) -> ShellError {
    ShellError::InvalidArgument(format!("cannot parse \"{value}\" as {data_type}"))
}

/// Parse a canonical string into the native value implied by the type tag.
pub fn parse_native(data_type: DataType, value: &str) -> Result<NativeValue> {
    match data_type {
        DataType::Bool => match value {
            "true" => Ok(NativeValue::Bool(true)),
            "false" => Ok(NativeValue::Bool(false)),
            _ => Err(parse_failure(data_type, value)),
        },
        DataType::Int8 => value
            .parse::<i8>()
            .map(|v| NativeValue::Int64(v as i64))
            .map_err(|_| parse_failure(data_type, value)),
        DataType::Int16 => value
            .parse::<i16>()
            .map(|v| NativeValue::Int64(v as i64))
            .map_err(|_| parse_failure(data_type, value)),
        DataType::Int32 => value
            .parse::<i32>()
            .map(|v| NativeValue::Int64(v as i64))
            .map_err(|_| parse_failure(data_type, value)),
        DataType::Int64 => value
            .parse::<i64>()
            .map(NativeValue::Int64)
            .map_err(|_| parse_failure(data_type, value)),
        DataType::UInt8 => value
            .parse::<u8>()
            .map(|v| NativeValue::UInt64(v as u64))
            .map_err(|_| parse_failure(data_type, value)),
        DataType::UInt16 => value
            .parse::<u16>()
            .map(|v| NativeValue::UInt64(v as u64))
            .map_err(|_| parse_failure(data_type, value)),
        DataType::UInt32 => value
            .parse::<u32>()
            .map(|v| NativeValue::UInt64(v as u64))
            .map_err(|_| parse_failure(data_type, value)),
        DataType::UInt64 => value
            .parse::<u64>()
            .map(NativeValue::UInt64)
            .map_err(|_| parse_failure(data_type, value)),
        DataType::Float32 => value
            .parse::<f32>()
            .map(|v| NativeValue::Float64(v as f64))
            .map_err(|_| parse_failure(data_type, value)),
        DataType::Float64 => value
            .parse::<f64>()
            .map(NativeValue::Float64)
            .map_err(|_| parse_failure(data_type, value)),
        DataType::Utf8String => Ok(NativeValue::Utf8(value.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Parameter schema
// ---------------------------------------------------------------------------

/// Declared schema for one parameter of a test plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "data type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(rename = "default value")]
    pub default_value: String,
    #[serde(rename = "minimum value", skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(rename = "maximum value", skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

impl ParameterInfo {
    /// Parse and bounds-check a candidate value against this declaration.
    /// Fails with `OutOfRange` when the value lies outside [min, max].
    pub fn validate(&self, value: &str) -> Result<NativeValue> {
        let native = parse_native(self.data_type, value)?;
        if let Some(min) = &self.min {
            if compare(&native, &parse_native(self.data_type, min)?) == std::cmp::Ordering::Less {
                return Err(ShellError::OutOfRange(format!(
                    "parameter \"{}\" value {value} is below minimum {min}",
                    self.name
                )));
            }
        }
        if let Some(max) = &self.max {
            if compare(&native, &parse_native(self.data_type, max)?) == std::cmp::Ordering::Greater
            {
                return Err(ShellError::OutOfRange(format!(
                    "parameter \"{}\" value {value} is above maximum {max}",
                    self.name
                )));
            }
        }
        Ok(native)
    }
}

/// Order two native values of the same shape. Bool and string compare
/// lexically; bounds on them are unusual but harmless.
fn compare(a: &NativeValue, b: &NativeValue) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (NativeValue::Int64(x), NativeValue::Int64(y)) => x.cmp(y),
        (NativeValue::UInt64(x), NativeValue::UInt64(y)) => x.cmp(y),
        (NativeValue::Float64(x), NativeValue::Float64(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (NativeValue::Bool(x), NativeValue::Bool(y)) => x.cmp(y),
        (NativeValue::Utf8(x), NativeValue::Utf8(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Resolved parameters
// ---------------------------------------------------------------------------

/// One resolved parameter bound to a test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "data type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub value: String,
}

impl Parameter {
    /// Convert the canonical string value to its native form.
    pub fn native(&self) -> Result<NativeValue> {
        parse_native(self.data_type, &self.value)
    }
}

/// Named, immutable collection of resolved parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl ParameterSet {
    /// Parse a parameter set from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let set: ParameterSet = serde_json::from_str(text)?;
        Ok(set)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ShellError::from)
    }

    /// Linear scan lookup by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Lookup that treats a missing parameter as fatal for plugin init.
    pub fn require(&self, name: &str) -> Result<&Parameter> {
        self.get(name).ok_or_else(|| {
            ShellError::InvalidArgument(format!("missing required parameter \"{name}\""))
        })
    }

    pub fn u64_value(&self, name: &str) -> Result<u64> {
        self.require(name)?.native()?.as_u64()
    }

    pub fn i64_value(&self, name: &str) -> Result<i64> {
        self.require(name)?.native()?.as_i64()
    }

    pub fn f64_value(&self, name: &str) -> Result<f64> {
        self.require(name)?.native()?.as_f64()
    }

    pub fn bool_value(&self, name: &str) -> Result<bool> {
        self.require(name)?.native()?.as_bool()
    }

    /// Resolve supplied parameters against a plugin's declarations.
    ///
    /// Declared parameters take the supplied value when present (validated
    /// against min/max) and the declared default otherwise. Supplied names
    /// that match no declaration are ignored.
    pub fn resolve(name: &str, infos: &[ParameterInfo], supplied: &ParameterSet) -> Result<Self> {
        let mut parameters = Vec::with_capacity(infos.len());
        for info in infos {
            let value = match supplied.get(&info.name) {
                Some(parameter) => {
                    info.validate(&parameter.value)?;
                    parameter.value.clone()
                }
                None => {
                    info.validate(&info.default_value)?;
                    info.default_value.clone()
                }
            };
            parameters.push(Parameter {
                name: info.name.clone(),
                data_type: info.data_type,
                precision: info.precision,
                units: info.units.clone(),
                value,
            });
        }
        Ok(Self {
            name: name.to_string(),
            parameters,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, data_type: DataType, default: &str) -> ParameterInfo {
        ParameterInfo {
            name: name.to_string(),
            data_type,
            precision: None,
            units: None,
            default_value: default.to_string(),
            min: None,
            max: None,
        }
    }

    // -----------------------------------------------------------------------
    // Native parsing
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_each_type() {
        assert_eq!(
            parse_native(DataType::Bool, "true").unwrap(),
            NativeValue::Bool(true)
        );
        assert_eq!(
            parse_native(DataType::Int8, "-12").unwrap(),
            NativeValue::Int64(-12)
        );
        assert_eq!(
            parse_native(DataType::UInt64, "18446744073709551615").unwrap(),
            NativeValue::UInt64(u64::MAX)
        );
        assert_eq!(
            parse_native(DataType::Float64, "0.01").unwrap(),
            NativeValue::Float64(0.01)
        );
        assert_eq!(
            parse_native(DataType::Utf8String, "hello").unwrap(),
            NativeValue::Utf8("hello".into())
        );
    }

    #[test]
    fn test_parse_width_checked() {
        assert!(parse_native(DataType::Int8, "200").is_err());
        assert!(parse_native(DataType::UInt8, "-1").is_err());
        assert!(parse_native(DataType::UInt16, "70000").is_err());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_native(DataType::UInt32, "ten").is_err());
        assert!(parse_native(DataType::Bool, "yes").is_err());
        assert!(parse_native(DataType::Float64, "").is_err());
    }

    #[test]
    fn test_data_type_tag_round_trip() {
        for tag in [
            "bool",
            "int8",
            "int16",
            "int32",
            "int64",
            "uint8",
            "uint16",
            "uint32",
            "uint64",
            "float32",
            "float64",
            "utf8 string",
        ] {
            let dt: DataType = tag.parse().unwrap();
            assert_eq!(dt.to_string(), tag);
        }
        assert!("uint128".parse::<DataType>().is_err());
    }

    // -----------------------------------------------------------------------
    // Bounds validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_validate_bounds() {
        let mut p = info("significance level", DataType::Float64, "0.01");
        p.min = Some("0.001".into());
        p.max = Some("0.1".into());

        assert!(p.validate("0.01").is_ok());
        assert!(p.validate("0.001").is_ok());
        assert!(p.validate("0.1").is_ok());
        assert!(matches!(
            p.validate("0.2").unwrap_err(),
            ShellError::OutOfRange(_)
        ));
        assert!(matches!(
            p.validate("0.0001").unwrap_err(),
            ShellError::OutOfRange(_)
        ));
    }

    #[test]
    fn test_validate_integer_bounds() {
        let mut p = info("thread count", DataType::UInt32, "1");
        p.min = Some("1".into());
        p.max = Some("64".into());
        assert!(p.validate("32").is_ok());
        assert!(p.validate("0").is_err());
        assert!(p.validate("100").is_err());
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    fn declared() -> Vec<ParameterInfo> {
        vec![
            info(PARAM_BITSTREAM_COUNT, DataType::UInt64, "100"),
            info(PARAM_BITSTREAM_LENGTH, DataType::UInt64, "1000000"),
            info(PARAM_SIGNIFICANCE_LEVEL, DataType::Float64, "0.01"),
        ]
    }

    fn supplied(pairs: &[(&str, DataType, &str)]) -> ParameterSet {
        ParameterSet {
            name: "supplied".into(),
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

    #[test]
    fn test_resolve_uses_supplied_and_defaults() {
        let set = ParameterSet::resolve(
            "frequency",
            &declared(),
            &supplied(&[(PARAM_BITSTREAM_COUNT, DataType::UInt64, "500")]),
        )
        .unwrap();
        assert_eq!(set.u64_value(PARAM_BITSTREAM_COUNT).unwrap(), 500);
        assert_eq!(set.u64_value(PARAM_BITSTREAM_LENGTH).unwrap(), 1_000_000);
        assert_eq!(set.f64_value(PARAM_SIGNIFICANCE_LEVEL).unwrap(), 0.01);
    }

    #[test]
    fn test_resolve_ignores_unknown_names() {
        let set = ParameterSet::resolve(
            "frequency",
            &declared(),
            &supplied(&[("future knob", DataType::UInt64, "9")]),
        )
        .unwrap();
        assert_eq!(set.parameters.len(), 3);
        assert!(set.get("future knob").is_none());
    }

    #[test]
    fn test_resolve_preserves_declared_order() {
        let set = ParameterSet::resolve("t", &declared(), &supplied(&[])).unwrap();
        let names: Vec<&str> = set.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                PARAM_BITSTREAM_COUNT,
                PARAM_BITSTREAM_LENGTH,
                PARAM_SIGNIFICANCE_LEVEL
            ]
        );
    }

    #[test]
    fn test_require_missing_is_invalid_argument() {
        let set = supplied(&[]);
        assert!(matches!(
            set.require(PARAM_SIGNIFICANCE_LEVEL).unwrap_err(),
            ShellError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_parameter_set_json_round_trip() {
        let set = supplied(&[
            (PARAM_BITSTREAM_COUNT, DataType::UInt64, "100"),
            (PARAM_SIGNIFICANCE_LEVEL, DataType::Float64, "0.01"),
        ]);
        let json = set.to_json().unwrap();
        assert!(json.contains("\"data type\""));
        let parsed = ParameterSet::from_json(&json).unwrap();
        assert_eq!(parsed, set);
    }
}
