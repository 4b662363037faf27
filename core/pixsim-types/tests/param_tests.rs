use pixsim_types::{ParamConstraints, ParamSpec, ParamType};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::str::FromStr;

// ── Type tags ────────────────────────────────────────────────────

#[test]
fn string_matches_only_strings() {
    assert!(ParamType::String.matches(&json!("hello")));
    assert!(!ParamType::String.matches(&json!(1)));
    assert!(!ParamType::String.matches(&json!(null)));
}

#[test]
fn integer_rejects_fractions() {
    assert!(ParamType::Integer.matches(&json!(3)));
    assert!(ParamType::Integer.matches(&json!(-3)));
    assert!(!ParamType::Integer.matches(&json!(3.5)));
    assert!(ParamType::Number.matches(&json!(3.5)));
}

#[test]
fn string_array_requires_every_item_to_be_a_string() {
    assert!(ParamType::StringArray.matches(&json!(["a", "b"])));
    assert!(ParamType::StringArray.matches(&json!([])));
    assert!(!ParamType::StringArray.matches(&json!(["a", 1])));
    assert!(!ParamType::StringArray.matches(&json!("a")));
}

#[test]
fn number_array_requires_numbers() {
    assert!(ParamType::NumberArray.matches(&json!([1, 2.5])));
    assert!(!ParamType::NumberArray.matches(&json!([1, "2"])));
}

#[test]
fn any_matches_everything() {
    for v in [json!(null), json!(1), json!("x"), json!({}), json!([])] {
        assert!(ParamType::Any.matches(&v));
    }
}

#[test]
fn type_tags_round_trip_through_strings() {
    for ty in [
        ParamType::String,
        ParamType::Number,
        ParamType::Integer,
        ParamType::Boolean,
        ParamType::Object,
        ParamType::Array,
        ParamType::StringArray,
        ParamType::NumberArray,
        ParamType::Any,
    ] {
        assert_eq!(ParamType::from_str(ty.as_str()).unwrap(), ty);
        assert_eq!(serde_json::to_value(ty).unwrap(), json!(ty.as_str()));
    }
}

#[test]
fn unknown_type_tag_is_an_error() {
    let err = ParamType::from_str("float").unwrap_err();
    assert_eq!(err.to_string(), "unknown parameter type: float");
}

// ── Constraints ──────────────────────────────────────────────────

#[test]
fn range_rejects_out_of_bounds() {
    let c = ParamConstraints::range(0.0, 10.0);
    assert!(c.check(&json!(0)).is_ok());
    assert!(c.check(&json!(10)).is_ok());
    assert_eq!(c.check(&json!(-1)).unwrap_err(), "must be >= 0, got -1");
    assert_eq!(c.check(&json!(11)).unwrap_err(), "must be <= 10, got 11");
}

#[test]
fn length_limits_apply_to_strings_and_arrays() {
    let c = ParamConstraints {
        min_length: Some(1),
        max_length: Some(3),
        ..Default::default()
    };
    assert!(c.check(&json!("ab")).is_ok());
    assert!(c.check(&json!("")).is_err());
    assert!(c.check(&json!([1, 2, 3, 4])).is_err());
    // Numbers have no length
    assert!(c.check(&json!(12345)).is_ok());
}

#[test]
fn one_of_lists_allowed_values() {
    let c = ParamConstraints::one_of(vec![json!("low"), json!("high")]);
    assert!(c.check(&json!("low")).is_ok());
    let err = c.check(&json!("mid")).unwrap_err();
    assert_eq!(err, r#"must be one of ["low", "high"], got "mid""#);
}

// ── ParamSpec ────────────────────────────────────────────────────

#[test]
fn signature_marks_optional_parameters() {
    let req = ParamSpec::required("zoom", ParamType::Number, "camera zoom");
    let opt = ParamSpec::optional("tags", ParamType::StringArray, "labels");
    assert_eq!(req.signature(), "zoom: number");
    assert_eq!(opt.signature(), "tags?: string[]");
}

#[test]
fn spec_serializes_with_type_key() {
    let spec = ParamSpec::optional("mode", ParamType::String, "render mode")
        .with_default(json!("fast"));
    let v = serde_json::to_value(&spec).unwrap();
    assert_eq!(
        v,
        json!({
            "name": "mode",
            "type": "string",
            "required": false,
            "description": "render mode",
            "default": "fast"
        })
    );
}
