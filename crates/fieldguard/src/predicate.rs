//! Primitive constraint predicates.
//!
//! Every predicate is total and side-effect free: it inspects a JSON value
//! and answers `true` when the value satisfies the constraint. Null handling
//! is left to the caller; these functions treat `null` like any other value.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Default minimum digit count accepted by [`is_phone`].
pub const PHONE_MIN_DIGITS: usize = 10;
/// Default maximum digit count accepted by [`is_phone`].
pub const PHONE_MAX_DIGITS: usize = 14;

// Pre-compiled regex patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Mutex<HashMap<(usize, usize), Regex>>> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        )
        .expect("email pattern is valid")
    })
}

fn phone_regex(minlen: usize, maxlen: usize) -> Option<Regex> {
    let cache = PHONE_REGEX.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(regex) = cache.get(&(minlen, maxlen)) {
        return Some(regex.clone());
    }

    let count = if minlen == maxlen {
        minlen.to_string()
    } else {
        format!("{minlen},{maxlen}")
    };
    let regex = Regex::new(&format!(
        r"^(\s*)?(\+)?([- _():=+]?[0-9][- _():=+]?){{{count}}}(\s*)?$"
    ))
    .ok()?;
    cache.insert((minlen, maxlen), regex.clone());
    Some(regex)
}

/// Whether `n` lies within the inclusive bounds, when given. NaN falls outside any bound.
pub fn within(n: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
}

/// JSON boolean.
pub fn is_boolean(value: &Value) -> bool {
    value.is_boolean()
}

/// JSON number within the inclusive bounds, when given.
pub fn is_number(value: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    value.as_f64().map_or(false, |n| within(n, min, max))
}

/// Strictly positive JSON number within the inclusive bounds, when given.
pub fn is_positive_number(value: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    value
        .as_f64()
        .map_or(false, |n| n > 0.0 && within(n, min, max))
}

/// Positive or zero JSON number within the inclusive bounds, when given.
pub fn is_positive_or_zero_number(value: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    value
        .as_f64()
        .map_or(false, |n| n >= 0.0 && within(n, min, max))
}

/// JSON string.
pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

/// JSON string with at least one non-whitespace character.
pub fn is_non_blank_string(value: &Value) -> bool {
    value.as_str().map_or(false, |s| !s.trim().is_empty())
}

/// JSON array.
pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

/// Neither null nor an empty array.
///
/// A NaN assignment never reaches this check as JSON; see
/// [`Constraint::check_float`](crate::Constraint::check_float).
pub fn is_not_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Non-blank string shaped like an email address.
pub fn is_email(value: &Value) -> bool {
    is_non_blank_string(value) && value.as_str().map_or(false, |s| email_regex().is_match(s))
}

/// Non-blank string shaped like a phone number with `minlen..=maxlen` digits.
///
/// Separators `- _():=+` may surround each digit and a leading `+` is allowed.
pub fn is_phone(value: &Value, minlen: usize, maxlen: usize) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    if s.trim().is_empty() || minlen > maxlen {
        return false;
    }
    phone_regex(minlen, maxlen).map_or(false, |regex| regex.is_match(s))
}

/// Equal to one of `candidates`. Numbers compare by numeric value, so `1`
/// matches `1.0`.
pub fn is_member_of(value: &Value, candidates: &[Value]) -> bool {
    candidates.iter().any(|candidate| match (candidate, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (a, b) => a == b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_predicate() {
        assert!(is_boolean(&json!(false)));
        assert!(!is_boolean(&json!(1)));
        assert!(!is_boolean(&json!("true")));
    }

    #[test]
    fn number_bounds_are_inclusive() {
        assert!(is_number(&json!(18), Some(18.0), Some(120.0)));
        assert!(is_number(&json!(120), Some(18.0), Some(120.0)));
        assert!(!is_number(&json!(17.9), Some(18.0), None));
        assert!(!is_number(&json!("18"), None, None));
    }

    #[test]
    fn zero_is_a_real_bound() {
        assert!(!is_number(&json!(1), None, Some(0.0)));
        assert!(is_number(&json!(0), None, Some(0.0)));
        assert!(!is_number(&json!(-1), Some(0.0), None));
    }

    #[test]
    fn positive_number_excludes_zero() {
        assert!(is_positive_number(&json!(1), None, None));
        assert!(!is_positive_number(&json!(0), None, None));
        assert!(!is_positive_number(&json!(-1), None, None));
        assert!(!is_positive_number(&json!(15), Some(18.0), None));
        assert!(is_positive_number(&json!(21), Some(18.0), None));
    }

    #[test]
    fn positive_or_zero_number_includes_zero() {
        assert!(is_positive_or_zero_number(&json!(0), None, None));
        assert!(!is_positive_or_zero_number(&json!(-0.5), None, None));
        assert!(!is_positive_or_zero_number(&json!(11), None, Some(10.0)));
    }

    #[test]
    fn string_predicates() {
        assert!(is_string(&json!("")));
        assert!(!is_string(&json!(1)));
        assert!(is_non_blank_string(&json!(" a ")));
        assert!(!is_non_blank_string(&json!("   ")));
        assert!(!is_non_blank_string(&json!(null)));
    }

    #[test]
    fn array_and_not_empty() {
        assert!(is_array(&json!([])));
        assert!(!is_array(&json!({})));
        assert!(is_not_empty(&json!([1])));
        assert!(!is_not_empty(&json!([])));
        assert!(!is_not_empty(&Value::Null));
        assert!(!is_not_empty(&Value::from(f64::NAN)));
        assert!(is_not_empty(&json!(0)));
        assert!(is_not_empty(&json!("")));
    }

    #[test]
    fn email_predicate() {
        assert!(is_email(&json!("user@example.com")));
        assert!(is_email(&json!("first.last@sub.domain.org")));
        assert!(is_email(&json!("user@[192.168.0.1]")));
        assert!(!is_email(&json!("not-an-email")));
        assert!(!is_email(&json!("user@localhost")));
        assert!(!is_email(&json!("@example.com")));
        assert!(!is_email(&json!(42)));
    }

    #[test]
    fn phone_predicate_default_range() {
        assert!(is_phone(
            &json!("+7921219212"),
            PHONE_MIN_DIGITS,
            PHONE_MAX_DIGITS
        ));
        assert!(is_phone(
            &json!("+7 (921) 219-92-12"),
            PHONE_MIN_DIGITS,
            PHONE_MAX_DIGITS
        ));
        assert!(!is_phone(
            &json!("+1291acb"),
            PHONE_MIN_DIGITS,
            PHONE_MAX_DIGITS
        ));
        assert!(!is_phone(&json!("   "), PHONE_MIN_DIGITS, PHONE_MAX_DIGITS));
    }

    #[test]
    fn phone_predicate_fixed_length() {
        assert!(!is_phone(&json!("+7921219212"), 11, 11));
        assert!(is_phone(&json!("+79212192121"), 11, 11));
        assert!(!is_phone(&json!("+79212192121"), 12, 11));
    }

    #[test]
    fn member_of_predicate() {
        let candidates = [json!("ab"), json!("ac"), json!("ad")];
        assert!(is_member_of(&json!("ac"), &candidates));
        assert!(!is_member_of(&json!("ba"), &candidates));
        assert!(is_member_of(&json!(1.0), &[json!(1)]));
        assert!(!is_member_of(&json!("x"), &[]));
    }
}
