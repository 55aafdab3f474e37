// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use uuid::Uuid;

use super::{now, or_not_found};
use crate::error::{Error, Result};
use crate::identity::{hash_password, verify_password};
use crate::models::{NewUser, ProfileUpdate, User};
use crate::utils::{
    col_opt_ts, col_ts, col_uuid, fmt_ts, non_empty, normalize_currency, validate_email,
    validate_name,
};

const MIN_PASSWORD_LEN: usize = 8;
const THEMES: &[&str] = &["dark", "light", "system"];

const SELECT: &str = "SELECT id, email, full_name, plan, currency, locale, theme, last_login_at, created_at, updated_at FROM users";

fn from_row(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: col_uuid(r, 0)?,
        email: r.get(1)?,
        full_name: r.get(2)?,
        plan: r.get(3)?,
        currency: r.get(4)?,
        locale: r.get(5)?,
        theme: r.get(6)?,
        last_login_at: col_opt_ts(r, 7)?,
        created_at: col_ts(r, 8)?,
        updated_at: col_ts(r, 9)?,
    })
}

pub fn register(conn: &Connection, new: &NewUser) -> Result<User> {
    let email = validate_email(&new.email)?;
    if new.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let full_name = non_empty(new.full_name.clone())
        .map(|n| validate_name("Full name", &n, 255))
        .transpose()?;

    let taken: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM users WHERE email=?1",
            params![&email],
            |r| r.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Err(Error::Conflict("Email already registered".into()));
    }

    let id = Uuid::new_v4();
    let ts = fmt_ts(&now());
    let password_hash = hash_password(&new.password)?;
    conn.execute(
        "INSERT INTO users(id, email, password_hash, full_name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![id.to_string(), &email, password_hash, full_name, ts],
    )
    .map_err(|e| match e {
        // Concurrent registration of the same email.
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::Conflict("Email already registered".into())
        }
        other => Error::from(other),
    })?;
    tracing::info!(user_id = %id, "registered user");
    get(conn, id)
}

/// Checks credentials. Unknown email and wrong password fail identically.
pub fn authenticate(conn: &Connection, email: &str, password: &str) -> Result<User> {
    let email = email.trim().to_lowercase();
    let found: Option<(String, String)> = conn
        .query_row(
            "SELECT id, password_hash FROM users WHERE email=?1",
            params![&email],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let invalid = || Error::Authentication("Invalid email or password".into());
    let (id, stored) = found.ok_or_else(invalid)?;
    if !verify_password(password, &stored)? {
        return Err(invalid());
    }
    let id = Uuid::parse_str(&id).map_err(|e| Error::Corrupt(e.to_string()))?;
    conn.execute(
        "UPDATE users SET last_login_at=?1 WHERE id=?2",
        params![fmt_ts(&now()), id.to_string()],
    )?;
    get(conn, id)
}

pub fn get(conn: &Connection, user_id: Uuid) -> Result<User> {
    or_not_found(
        conn.query_row(
            &format!("{} WHERE id=?1", SELECT),
            params![user_id.to_string()],
            from_row,
        ),
        "User",
    )
}

pub fn update_profile(conn: &Connection, user_id: Uuid, upd: &ProfileUpdate) -> Result<User> {
    let mut user = get(conn, user_id)?;
    if let Some(name) = &upd.full_name {
        user.full_name = Some(validate_name("Full name", name, 255)?);
    }
    if let Some(ccy) = &upd.currency {
        user.currency = normalize_currency(ccy)?;
    }
    if let Some(theme) = &upd.theme {
        let theme = theme.trim().to_lowercase();
        if !THEMES.contains(&theme.as_str()) {
            return Err(Error::validation(format!(
                "Unknown theme '{}' (use {})",
                theme,
                THEMES.join("|")
            )));
        }
        user.theme = theme;
    }
    conn.execute(
        "UPDATE users SET full_name=?1, currency=?2, theme=?3, updated_at=?4 WHERE id=?5",
        params![
            user.full_name,
            user.currency,
            user.theme,
            fmt_ts(&now()),
            user_id.to_string()
        ],
    )?;
    get(conn, user_id)
}

/// Removes the user and everything they own in one transaction.
pub fn delete(conn: &mut Connection, user_id: Uuid) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let uid = user_id.to_string();
    let exists: Option<i64> = tx
        .query_row("SELECT 1 FROM users WHERE id=?1", params![&uid], |r| {
            r.get(0)
        })
        .optional()?;
    if exists.is_none() {
        return Err(Error::NotFound("User"));
    }
    // children before parents: transactions and liabilities reference accounts
    for table in [
        "insights",
        "net_worth_history",
        "subscriptions",
        "transactions",
        "liabilities",
        "accounts",
        "assets",
    ] {
        let removed = tx.execute(&format!("DELETE FROM {} WHERE user_id=?1", table), params![&uid])?;
        tracing::debug!(table, removed, "cascade delete");
    }
    tx.execute("DELETE FROM users WHERE id=?1", params![&uid])?;
    tx.commit()?;
    tracing::info!(user_id = %user_id, "deleted user and owned data");
    Ok(())
}
