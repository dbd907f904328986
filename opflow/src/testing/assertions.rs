//! Test assertions for finished states.

use super::CallLog;
use crate::state::State;
use serde_json::Value;

/// Asserts that the state was not marked failed.
pub fn assert_state_succeeded(state: &State) {
    assert!(state.is_successful(), "Expected success, got failed state: {state}");
}

/// Asserts that the state was marked failed.
pub fn assert_state_failed(state: &State) {
    assert!(state.is_failed(), "Expected failure, got successful state: {state}");
}

/// Asserts that the state holds `expected` under `key`.
pub fn assert_state_value(state: &State, key: &str, expected: &Value) {
    let actual = state.get(key);
    assert_eq!(
        actual,
        Some(expected),
        "Expected value {expected} for key '{key}', got {actual:?}"
    );
}

/// Asserts that the state holds nothing under `key`.
pub fn assert_state_missing(state: &State, key: &str) {
    assert!(
        !state.contains(key),
        "Expected no value for key '{key}', got {:?}",
        state.get(key)
    );
}

/// Asserts the exact sequence of recorded calls.
pub fn assert_calls(state: &State, expected: &[&str]) {
    let actual = CallLog::calls(state);
    assert_eq!(actual, expected, "Unexpected call sequence");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assertions_pass() {
        let mut state = State::new();
        state.set("user", "alice").unwrap();
        CallLog::record(&mut state, "step1").unwrap();

        assert_state_succeeded(&state);
        assert_state_value(&state, "user", &json!("alice"));
        assert_state_missing(&state, "model");
        assert_calls(&state, &["step1"]);

        state.fail();
        assert_state_failed(&state);
    }

    #[test]
    #[should_panic(expected = "Expected failure")]
    fn test_assert_failed_panics_on_success() {
        assert_state_failed(&State::new());
    }
}
