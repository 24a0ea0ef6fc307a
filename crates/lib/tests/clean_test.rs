//! # Row Cleaning Tests
//!
//! Tests for the value coercion rules and the generic row mapping in
//! `wpstats::clean`.

use serde_json::{json, Value};
use wpstats::clean::{
    clean_row, format_float, is_truthy, round_to, timestamp_now, to_type_or_null, FieldKind,
    FieldSpec,
};
use wpstats::{Row, TapError};

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => panic!("test rows must be JSON objects"),
    }
}

#[test]
fn test_empty_string_becomes_null() {
    let result = to_type_or_null(json!(""), Some(FieldKind::String), true).unwrap();
    assert_eq!(result, Value::Null);
}

#[test]
fn test_numeric_string_converts_to_integer() {
    let result = to_type_or_null(json!("5"), Some(FieldKind::Integer), true).unwrap();
    assert_eq!(result, json!(5));
}

#[test]
fn test_non_numeric_string_is_a_conversion_error() {
    let result = to_type_or_null(json!("abc"), Some(FieldKind::Integer), true);
    match result {
        Err(TapError::Conversion { value, kind, .. }) => {
            assert_eq!(value, "abc");
            assert_eq!(kind, FieldKind::Integer);
        }
        other => panic!("expected a conversion error, got {other:?}"),
    }
}

/// Every falsy value collapses to null when the field is nullable.
#[test]
fn test_falsy_values_collapse_to_null() {
    for falsy in [
        json!(null),
        json!(false),
        json!(0),
        json!(0.0),
        json!(""),
        json!([]),
        json!({}),
    ] {
        let result = to_type_or_null(falsy.clone(), Some(FieldKind::Integer), true).unwrap();
        assert_eq!(result, Value::Null, "{falsy} should collapse to null");
    }
}

#[test]
fn test_falsy_values_are_kept_when_not_nullable() {
    assert_eq!(
        to_type_or_null(json!(""), Some(FieldKind::String), false).unwrap(),
        json!("")
    );
    assert_eq!(
        to_type_or_null(json!(0), Some(FieldKind::Integer), false).unwrap(),
        json!(0)
    );
}

#[test]
fn test_values_pass_through_without_a_kind() {
    let value = json!({ "nested": [1, 2] });
    assert_eq!(to_type_or_null(value.clone(), None, true).unwrap(), value);
}

#[test]
fn test_integer_conversions() {
    let convert = |v: Value| to_type_or_null(v, Some(FieldKind::Integer), true).unwrap();
    assert_eq!(convert(json!(" 42 ")), json!(42));
    assert_eq!(convert(json!(7.9)), json!(7));
    assert_eq!(convert(json!(true)), json!(1));
    assert!(to_type_or_null(json!("4.5"), Some(FieldKind::Integer), true).is_err());
    assert!(to_type_or_null(json!([1]), Some(FieldKind::Integer), true).is_err());
}

#[test]
fn test_number_conversions() {
    let convert = |v: Value| to_type_or_null(v, Some(FieldKind::Number), true).unwrap();
    assert_eq!(convert(json!("12.3457")), json!(12.3457));
    assert_eq!(convert(json!(3)), json!(3.0));
    assert!(to_type_or_null(json!("12%"), Some(FieldKind::Number), true).is_err());
    assert!(to_type_or_null(json!("nan"), Some(FieldKind::Number), true).is_err());
}

#[test]
fn test_string_conversions() {
    let convert = |v: Value| to_type_or_null(v, Some(FieldKind::String), true).unwrap();
    assert_eq!(convert(json!("22.1")), json!("22.1"));
    assert_eq!(convert(json!(96)), json!("96"));
    assert_eq!(convert(json!(true)), json!("true"));
}

#[test]
fn test_truthiness() {
    assert!(is_truthy(&json!("0")));
    assert!(is_truthy(&json!(-1)));
    assert!(is_truthy(&json!([null])));
    assert!(!is_truthy(&json!(0)));
    assert!(!is_truthy(&json!({})));
}

/// The cleaned row holds exactly one key per field spec, under its target name.
#[test]
fn test_clean_row_emits_one_key_per_field() {
    let fields = vec![
        FieldSpec::new("slug").rename("plugin").kind(FieldKind::String),
        FieldSpec::new("count").kind(FieldKind::Integer),
        FieldSpec::new("missing"),
    ];
    let input = row(json!({ "slug": "akismet", "count": "12", "extra": "dropped" }));

    let cleaned = clean_row(&input, &fields).unwrap();

    let mut keys: Vec<&str> = cleaned.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["count", "missing", "plugin"]);
    assert_eq!(cleaned["plugin"], json!("akismet"));
    assert_eq!(cleaned["count"], json!(12));
    assert_eq!(cleaned["missing"], Value::Null);
}

#[test]
fn test_clean_row_propagates_conversion_errors() {
    let fields = vec![FieldSpec::new("count").kind(FieldKind::Integer)];
    let input = row(json!({ "count": "many" }));
    assert!(matches!(
        clean_row(&input, &fields),
        Err(TapError::Conversion { .. })
    ));
}

#[test]
fn test_not_null_field_keeps_empty_string() {
    let fields = vec![FieldSpec::new("name").not_null()];
    let cleaned = clean_row(&row(json!({ "name": "" })), &fields).unwrap();
    assert_eq!(cleaned["name"], json!(""));
}

#[test]
fn test_float_formatting_and_rounding() {
    assert_eq!(format_float(round_to(12.345678, 4)), "12.3457");
    assert_eq!(format_float(12.0), "12.0");
    assert_eq!(format_float(0.5), "0.5");
}

/// Rounding works on the stored binary value, so decimal ties that sit just
/// below the midpoint round down.
#[test]
fn test_rounding_near_ties() {
    assert_eq!(format_float(round_to(54.14125, 4)), "54.1412");
    assert_eq!(format_float(round_to(23.08665, 4)), "23.0866");
    assert_eq!(format_float(round_to(2.00005, 4)), "2.0");
    assert_eq!(format_float(round_to(-1.23456, 4)), "-1.2346");
}

#[test]
fn test_booleans_convert_to_capitalized_strings() {
    let result = to_type_or_null(json!(true), Some(FieldKind::String), true).unwrap();
    assert_eq!(result, json!("True"));
    let result = to_type_or_null(json!(12.0), Some(FieldKind::String), true).unwrap();
    assert_eq!(result, json!("12.0"));
}

#[test]
fn test_integer_conversion_truncates_floats() {
    let result = to_type_or_null(json!(12.9), Some(FieldKind::Integer), true).unwrap();
    assert_eq!(result, json!(12));
    let result = to_type_or_null(json!(-3.5), Some(FieldKind::Integer), true).unwrap();
    assert_eq!(result, json!(-3));
}

#[test]
fn test_out_of_range_integers_are_conversion_errors() {
    for value in [json!(u64::MAX), json!(1e20), json!(-1e20)] {
        let result = to_type_or_null(value.clone(), Some(FieldKind::Integer), true);
        assert!(
            matches!(result, Err(TapError::Conversion { kind: FieldKind::Integer, .. })),
            "{value} should not convert to an integer, got {result:?}"
        );
    }
}

#[test]
fn test_timestamp_has_second_precision_and_utc_offset() {
    let timestamp = timestamp_now();
    assert!(timestamp.ends_with("+00:00"), "{timestamp}");
    assert_eq!(timestamp.len(), "2024-05-01T10:15:00+00:00".len());
}
