//! Test assertion helpers
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;
use std::time::Duration;

/// Asserts an API envelope reports success, returning its data
pub fn assert_succeeded(body: &Value) -> &Value {
    assert_eq!(body["code"], 0, "expected success, got {}", body);
    &body["data"]
}

/// Asserts an API envelope was refused with the given message
pub fn assert_refused(body: &Value, msg: &str) {
    assert_eq!(body["code"], 1, "expected refusal, got {}", body);
    assert_eq!(body["msg"], msg);
    assert_eq!(body["data"], serde_json::json!({}));
}

/// Polls until the condition holds, panicking after two seconds
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {}", what);
}
