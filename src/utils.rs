// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Once;
use uuid::Uuid;

use crate::error::{Error, Result};

pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FMT: &str = "%Y-%m-%d";

const UA: &str = concat!("payfolio/", env!("CARGO_PKG_VERSION"));

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static TRACING_INIT: Once = Once::new();

/// Installs the stderr subscriber once. `RUST_LOG` overrides the default level.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("payfolio=info"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

pub fn http_client(timeout: std::time::Duration) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(UA)
        .build()?;
    Ok(c)
}

// ---- CLI input parsing ----

pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FMT)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM:SS`.
pub fn parse_datetime(s: &str) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FMT) {
        return Ok(dt);
    }
    Ok(parse_date(s)?.and_time(chrono::NaiveTime::MIN))
}

/// Like [`parse_datetime`] but a bare date means the last second of that day.
pub fn parse_datetime_end(s: &str) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FMT) {
        return Ok(dt);
    }
    let end = chrono::NaiveTime::from_hms_opt(23, 59, 59).context("end of day")?;
    Ok(parse_date(s)?.and_time(end))
}

pub fn parse_decimal(s: &str) -> anyhow::Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_uuid(s: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(s.trim()).with_context(|| format!("Invalid id '{}'", s))
}

// ---- money and percentages ----

/// Normalises a monetary input to 2 decimal places, half-even.
pub fn money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// `part / whole * 100`, rounded half-even at 2 places, then converted for display.
/// A zero `whole` yields 0.
pub fn percent(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|p| p.to_f64())
        .unwrap_or(0.0)
}

/// `a + b`, failing instead of overflowing.
pub fn add_money(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| Error::validation("Amount total is out of range"))
}

/// `a - b`, failing instead of overflowing.
pub fn sub_money(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| Error::validation("Amount difference is out of range"))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

// ---- validation ----

pub fn validate_name(field: &str, value: &str, max: usize) -> Result<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(Error::validation(format!("{} must not be empty", field)));
    }
    if v.chars().count() > max {
        return Err(Error::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(v.to_string())
}

pub fn normalize_currency(value: &str) -> Result<String> {
    let c = value.trim().to_uppercase();
    if !CURRENCY_RE.is_match(&c) {
        return Err(Error::validation(format!(
            "Currency '{}' must be a 3-letter code",
            value
        )));
    }
    Ok(c)
}

pub fn validate_email(value: &str) -> Result<String> {
    let e = value.trim().to_lowercase();
    if !EMAIL_RE.is_match(&e) {
        return Err(Error::validation(format!("Invalid email '{}'", value)));
    }
    Ok(e)
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ---- column codecs ----

pub fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn fmt_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

pub(crate) fn conversion_err<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub fn col_decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    Decimal::from_str_exact(&s).map_err(|e| conversion_err(idx, e))
}

pub fn col_opt_decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| Decimal::from_str_exact(&s).map_err(|e| conversion_err(idx, e)))
        .transpose()
}

pub fn col_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_err(idx, e))
}

pub fn col_opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_err(idx, e)))
        .transpose()
}

pub fn col_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

pub fn col_opt_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| conversion_err(idx, e))
    })
    .transpose()
}

pub fn col_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let s: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&s, DATETIME_FMT).map_err(|e| conversion_err(idx, e))
}

pub fn col_opt_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| NaiveDate::parse_from_str(&s, DATE_FMT).map_err(|e| conversion_err(idx, e)))
        .transpose()
}

pub fn col_json(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<serde_json::Value>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| serde_json::from_str(&s).map_err(|e| conversion_err(idx, e)))
        .transpose()
}

// ---- lookups ----

/// Resolves an account by id or by exact name, only among the user's own accounts.
pub fn id_for_account(conn: &Connection, user_id: Uuid, key: &str) -> Result<Uuid> {
    let key = key.trim();
    if let Ok(id) = Uuid::parse_str(key) {
        return Ok(id);
    }
    let id: Option<String> = conn
        .query_row(
            "SELECT id FROM accounts WHERE user_id=?1 AND name=?2 ORDER BY created_at LIMIT 1",
            params![user_id.to_string(), key],
            |r| r.get(0),
        )
        .optional()?;
    let id = id.ok_or(Error::NotFound("Account"))?;
    Uuid::parse_str(&id).map_err(|e| Error::Corrupt(e.to_string()))
}

/// Resolves a category by numeric id or case-insensitive name.
pub fn id_for_category(conn: &Connection, key: &str) -> Result<i64> {
    let key = key.trim();
    let found: Option<i64> = if let Ok(id) = key.parse::<i64>() {
        conn.query_row("SELECT id FROM categories WHERE id=?1", params![id], |r| {
            r.get(0)
        })
        .optional()?
    } else {
        conn.query_row(
            "SELECT id FROM categories WHERE name=?1 COLLATE NOCASE",
            params![key],
            |r| r.get(0),
        )
        .optional()?
    };
    found.ok_or(Error::NotFound("Category"))
}

// ---- output ----

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> anyhow::Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

pub fn opt_str(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}
