//! # Row Cleaning
//!
//! The generic mapping engine applied to every row before it is emitted. A row is
//! cleaned against the ordered list of [`FieldSpec`]s of its stream: each field is
//! renamed (or kept) and its value goes through [`to_type_or_null`].
//!
//! Empty values are collapsed to `null` by default. Downstream schema validation
//! relies on "empty" being represented as `null` rather than `""`, `[]` or `{}`.

use crate::errors::TapError;
use crate::types::{Record, Row};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;

/// The type a field value is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
}

impl FieldKind {
    /// The JSON schema type name for this kind.
    pub fn json_type(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}

/// How a single source key is mapped into a cleaned record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Key in the intermediate row.
    pub source: &'static str,
    /// Optional new name for the key in the cleaned record.
    pub map: Option<&'static str>,
    /// Optional coercion applied to truthy values.
    pub kind: Option<FieldKind>,
    /// Whether falsy values collapse to `null`. Defaults to `true`.
    pub nullable: bool,
    /// Optional JSON schema `format`, used for discovery only.
    pub format: Option<&'static str>,
}

impl FieldSpec {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            map: None,
            kind: None,
            nullable: true,
            format: None,
        }
    }

    pub fn kind(self, kind: FieldKind) -> Self {
        Self {
            kind: Some(kind),
            ..self
        }
    }

    pub fn rename(self, target: &'static str) -> Self {
        Self {
            map: Some(target),
            ..self
        }
    }

    pub fn not_null(self) -> Self {
        Self {
            nullable: false,
            ..self
        }
    }

    pub fn format(self, format: &'static str) -> Self {
        Self {
            format: Some(format),
            ..self
        }
    }

    /// The key this field is written under in the cleaned record.
    pub fn target(&self) -> &'static str {
        self.map.unwrap_or(self.source)
    }
}

/// Truthiness of a JSON value: `null`, `false`, zero, and empty strings, arrays
/// and objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Converts `value` to `kind`, or normalizes it to `null`.
///
/// - A truthy value with a `kind` is converted; a failed conversion is a
///   [`TapError::Conversion`] carrying the value and the target kind.
/// - A falsy value is replaced by `null` when `nullable` is set.
/// - Anything else is returned unchanged.
pub fn to_type_or_null(
    value: Value,
    kind: Option<FieldKind>,
    nullable: bool,
) -> Result<Value, TapError> {
    let truthy = is_truthy(&value);
    match kind {
        Some(kind) if truthy => convert(value, kind),
        _ if !truthy && nullable => Ok(Value::Null),
        _ => Ok(value),
    }
}

fn convert(value: Value, kind: FieldKind) -> Result<Value, TapError> {
    let fail = |value: &Value, reason: String| TapError::Conversion {
        value: display_value(value),
        kind,
        reason,
    };

    match kind {
        FieldKind::String => Ok(match value {
            Value::String(_) => value,
            other => Value::String(display_value(&other)),
        }),
        FieldKind::Integer => match &value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(truncate_to_i64))
                .map(Value::from)
                .ok_or_else(|| fail(&value, "number out of range".to_string())),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| fail(&value, e.to_string())),
            Value::Bool(b) => Ok(Value::from(i64::from(*b))),
            _ => Err(fail(&value, "expected a scalar value".to_string())),
        },
        FieldKind::Number => {
            let parsed = match &value {
                Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| fail(&value, "number out of range".to_string())),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| fail(&value, e.to_string())),
                Value::Bool(b) => Ok(f64::from(u8::from(*b))),
                _ => Err(fail(&value, "expected a scalar value".to_string())),
            }?;
            if !parsed.is_finite() {
                return Err(fail(&value, "not a finite number".to_string()));
            }
            Ok(Value::from(parsed))
        }
    }
}

/// Truncates `value` toward zero, or `None` when the result does not fit an `i64`.
fn truncate_to_i64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    // i64::MAX is not representable; its nearest f64 is 2^63.
    (truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64)
        .then_some(truncated as i64)
}

/// Cleans `row` against `fields`.
///
/// The result holds exactly one key per field (its [`FieldSpec::target`]) and no
/// other keys. A source key missing from the row is read as `null`.
pub fn clean_row(row: &Row, fields: &[FieldSpec]) -> Result<Record, TapError> {
    fields
        .iter()
        .map(|field| {
            let value = row.get(field.source).cloned().unwrap_or(Value::Null);
            let cleaned = to_type_or_null(value, field.kind, field.nullable)?;
            Ok((field.target().to_string(), cleaned))
        })
        .collect()
}

/// The current UTC time with second precision, e.g. `2024-05-01T10:15:00+00:00`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Renders a value as plain text. Strings are kept as-is, `null` is `None`,
/// booleans are capitalized and integral floats keep a trailing `.0`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) if n.is_f64() => n.as_f64().map(format_float).unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Formats a float with its shortest round-trip representation, keeping a
/// trailing `.0` on integral values (`12.0`, not `12`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Rounds `value` to `places` decimal places.
///
/// Rounding goes through fixed-precision formatting, which is correctly rounded
/// on the exact binary value, so `2.00005` (stored just below the tie) rounds
/// down to `2.0`.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}
