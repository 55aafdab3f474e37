// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Payfolio", "payfolio"));

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEV_TOKEN_SECRET: &str = "payfolio-dev-secret-change-me";

/// Runtime settings, built once at startup and handed to whatever needs them.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub token_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub busy_timeout: std::time::Duration,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub http_timeout: std::time::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = match var("PAYFOLIO_DB_PATH") {
            Some(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
            _ => default_db_path()?,
        };
        let token_secret = match var("PAYFOLIO_TOKEN_SECRET") {
            Some(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("PAYFOLIO_TOKEN_SECRET not set; using development secret");
                DEV_TOKEN_SECRET.to_string()
            }
        };
        let access_minutes = number(&var, "PAYFOLIO_ACCESS_TTL_MINUTES", 30)?;
        let refresh_days = number(&var, "PAYFOLIO_REFRESH_TTL_DAYS", 7)?;
        let busy_ms = number(&var, "PAYFOLIO_BUSY_TIMEOUT_MS", 5_000)?;
        let gemini_api_key = var("GEMINI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let gemini_model =
            var("PAYFOLIO_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self {
            db_path,
            token_secret,
            access_token_ttl: ttl(
                "PAYFOLIO_ACCESS_TTL_MINUTES",
                access_minutes,
                Duration::try_minutes,
            )?,
            refresh_token_ttl: ttl("PAYFOLIO_REFRESH_TTL_DAYS", refresh_days, Duration::try_days)?,
            busy_timeout: std::time::Duration::from_millis(busy_ms),
            gemini_api_key,
            gemini_model,
            http_timeout: std::time::Duration::from_secs(30),
        })
    }

    /// Settings for an in-memory store; used by tests and tooling.
    pub fn in_memory(token_secret: &str) -> Self {
        Self {
            db_path: PathBuf::from(":memory:"),
            token_secret: token_secret.to_string(),
            access_token_ttl: Duration::minutes(30),
            refresh_token_ttl: Duration::days(7),
            busy_timeout: std::time::Duration::from_millis(5_000),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            http_timeout: std::time::Duration::from_secs(30),
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("payfolio.sqlite"))
}

fn number(var: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{} must be a non-negative integer, got '{}'", key, raw)),
        None => Ok(default),
    }
}

/// Token lifetimes must also leave an expiry that fits in a timestamp.
fn ttl(key: &str, value: u64, unit: fn(i64) -> Option<Duration>) -> Result<Duration> {
    i64::try_from(value)
        .ok()
        .and_then(unit)
        .filter(|d| Utc::now().checked_add_signed(*d).is_some())
        .with_context(|| format!("{} is out of range, got {}", key, value))
}
