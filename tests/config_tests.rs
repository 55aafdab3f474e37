// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use chrono::Duration;
use payfolio::config::Config;

fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
    let mut vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.entry("PAYFOLIO_DB_PATH".into())
        .or_insert_with(|| ":memory:".into());
    Config::from_vars(|key| vars.get(key).cloned())
}

#[test]
fn defaults_apply_when_unset() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.access_token_ttl, Duration::minutes(30));
    assert_eq!(config.refresh_token_ttl, Duration::days(7));
    assert_eq!(config.busy_timeout, std::time::Duration::from_millis(5_000));
    assert!(config.gemini_api_key.is_none());
}

#[test]
fn overrides_are_read() {
    let config = config_from(&[
        ("PAYFOLIO_TOKEN_SECRET", "s3cret"),
        ("PAYFOLIO_ACCESS_TTL_MINUTES", "5"),
        ("PAYFOLIO_REFRESH_TTL_DAYS", "30"),
        ("GEMINI_API_KEY", "  key  "),
    ])
    .unwrap();
    assert_eq!(config.token_secret, "s3cret");
    assert_eq!(config.access_token_ttl, Duration::minutes(5));
    assert_eq!(config.refresh_token_ttl, Duration::days(30));
    assert_eq!(config.gemini_api_key.as_deref(), Some("key"));
}

#[test]
fn huge_ttls_are_rejected_not_panicking() {
    for (key, value) in [
        ("PAYFOLIO_REFRESH_TTL_DAYS", "1000000000000000"),
        ("PAYFOLIO_REFRESH_TTL_DAYS", "18446744073709551615"),
        ("PAYFOLIO_REFRESH_TTL_DAYS", "1000000000"),
        ("PAYFOLIO_ACCESS_TTL_MINUTES", "9223372036854775807"),
    ] {
        let err = config_from(&[(key, value)]).unwrap_err();
        assert!(err.to_string().contains(key), "{key}={value}: {err}");
    }
}

#[test]
fn non_numeric_ttl_is_an_error() {
    let err = config_from(&[("PAYFOLIO_ACCESS_TTL_MINUTES", "soon")]).unwrap_err();
    assert!(err.to_string().contains("non-negative integer"));
}
