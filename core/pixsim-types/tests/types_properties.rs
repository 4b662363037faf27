//! Property-based tests for the shared types:
//! - Every parameter type tag parses back from its display name
//! - Numeric and length constraints accept exactly the values inside bounds
//! - Override records keep "absent" and "null" apart through serde

use pixsim_types::{OverrideRecord, ParamConstraints, ParamType};
use proptest::prelude::*;
use serde_json::{Value, json};

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn param_type_strategy() -> impl Strategy<Value = ParamType> {
    prop_oneof![
        Just(ParamType::String),
        Just(ParamType::Number),
        Just(ParamType::Integer),
        Just(ParamType::Boolean),
        Just(ParamType::Object),
        Just(ParamType::Array),
        Just(ParamType::StringArray),
        Just(ParamType::NumberArray),
        Just(ParamType::Any),
    ]
}

/// `(min, max)` with `min <= max`.
fn bounds_strategy() -> impl Strategy<Value = (f64, f64)> {
    (-100.0f64..100.0, 0.0f64..50.0).prop_map(|(min, width)| (min, min + width))
}

fn old_value_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        any::<i32>().prop_map(|n| Some(json!(n))),
        "[a-z]{0,6}".prop_map(|s| Some(json!(s))),
    ]
}

// =============================================================================
// PARAM TYPE PROPERTIES
// =============================================================================

mod param_type_properties {
    use super::*;

    proptest! {
        #[test]
        fn display_name_parses_back(ty in param_type_strategy()) {
            let parsed: ParamType = ty.to_string().parse().unwrap();
            prop_assert_eq!(parsed, ty);
        }

        #[test]
        fn serde_name_matches_display(ty in param_type_strategy()) {
            prop_assert_eq!(serde_json::to_value(ty).unwrap(), json!(ty.as_str()));
        }
    }
}

// =============================================================================
// CONSTRAINT PROPERTIES
// =============================================================================

mod constraint_properties {
    use super::*;

    proptest! {
        #[test]
        fn range_accepts_exactly_the_closed_interval((min, max) in bounds_strategy(), n in -200.0f64..200.0) {
            let inside = min <= n && n <= max;
            prop_assert_eq!(ParamConstraints::range(min, max).check(&json!(n)).is_ok(), inside);
        }

        #[test]
        fn length_counts_characters(s in "[a-zé]{0,12}", lo in 0usize..6, extra in 0usize..6) {
            let constraints = ParamConstraints {
                min_length: Some(lo),
                max_length: Some(lo + extra),
                ..Default::default()
            };
            let len = s.chars().count();
            let inside = lo <= len && len <= lo + extra;
            prop_assert_eq!(constraints.check(&json!(s)).is_ok(), inside);
        }
    }
}

// =============================================================================
// OVERRIDE RECORD PROPERTIES
// =============================================================================

mod override_record_properties {
    use super::*;

    proptest! {
        #[test]
        fn serde_keeps_absent_and_null_apart(old in old_value_strategy(), new in any::<i32>()) {
            let record = OverrideRecord::new("scene", vec!["camera".into(), "fov".into()], old.clone(), json!(new));
            let encoded = serde_json::to_value(&record).unwrap();
            prop_assert_eq!(encoded.get("old_value").is_some(), old.is_some());

            let decoded: OverrideRecord = serde_json::from_value(encoded).unwrap();
            prop_assert_eq!(decoded.old_value, old);
        }
    }
}
