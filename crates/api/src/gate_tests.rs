// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn matching_key_passes() {
    assert!(check_api_key(Some("sekrit"), Some("sekrit")).is_ok());
}

#[test]
fn unconfigured_server_fails_closed() {
    assert_eq!(check_api_key(Some("anything"), None), Err(GateError::NotConfigured));
    assert_eq!(check_api_key(Some("anything"), Some("")), Err(GateError::NotConfigured));
}

#[test]
fn missing_header_is_distinct_from_invalid() {
    assert_eq!(check_api_key(None, Some("sekrit")), Err(GateError::Missing));
    assert_eq!(check_api_key(Some(""), Some("sekrit")), Err(GateError::Missing));
    assert_eq!(check_api_key(Some("wrong"), Some("sekrit")), Err(GateError::Invalid));
}

#[test]
fn length_mismatch_is_invalid_not_panic() {
    assert_eq!(check_api_key(Some("s"), Some("sekrit")), Err(GateError::Invalid));
    assert_eq!(check_api_key(Some("sekrit-and-more"), Some("sekrit")), Err(GateError::Invalid));
}

#[test]
fn kinds_map_to_log_strings() {
    assert_eq!(GateError::NotConfigured.kind_str(), "not_configured");
    assert_eq!(GateError::Missing.kind_str(), "missing");
    assert_eq!(GateError::Invalid.kind_str(), "invalid");
}

#[test]
fn messages_match_the_wire_contract() {
    assert_eq!(GateError::NotConfigured.message(), "API Key is not configured on server");
    assert_eq!(GateError::Missing.message(), "API Key is missing");
    assert_eq!(GateError::Invalid.message(), "Invalid API Key");
}
