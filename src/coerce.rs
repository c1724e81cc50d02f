const TRUTHY: &[&str] = &["true", "1", "yes"];

/// Interpret an override value.
///
/// Recognised truthy strings give `true`; anything else, including the empty
/// string, gives `default`. Callers decide separately what an *absent* value
/// means, so a present-but-unrecognised value is not the same as no value.
pub fn parse_env_boolean(value: &str, default: bool) -> bool {
    let value = value.trim().to_lowercase();

    if TRUTHY.contains(&value.as_str()) {
        return true;
    }

    default
}

/// Coerce one value from the `FEATURE_FLAGS` blob. `None` means "no override".
pub(crate) fn coerce_json_value(value: &serde_json::Value, default: bool) -> Option<bool> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::String(s) => Some(parse_env_boolean(s, default)),
        serde_json::Value::Number(n) => Some(parse_env_boolean(&n.to_string(), default)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Some(default),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn truthy_strings() {
        for input in ["true", "TRUE", " true ", "1", "yes", "YES", "Yes\n"] {
            assert!(parse_env_boolean(input, false), "{input:?} should be truthy");
        }
    }

    #[test]
    fn unrecognised_strings_fall_back_to_the_default() {
        for input in ["false", "0", "no", "", "banana"] {
            assert!(parse_env_boolean(input, true), "{input:?} with default true");
            assert!(!parse_env_boolean(input, false), "{input:?} with default false");
        }
    }

    #[test]
    fn json_values() {
        assert_eq!(coerce_json_value(&json!(false), true), Some(false));
        assert_eq!(coerce_json_value(&json!(true), false), Some(true));
        assert_eq!(coerce_json_value(&json!("yes"), false), Some(true));
        assert_eq!(coerce_json_value(&json!("off"), true), Some(true));
        assert_eq!(coerce_json_value(&json!(1), false), Some(true));
        assert_eq!(coerce_json_value(&json!(0), true), Some(true));
        assert_eq!(coerce_json_value(&json!(null), true), None);
    }
}
