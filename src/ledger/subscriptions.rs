// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use super::now;
use crate::entitlement::DEFAULT_MAX_ACCOUNTS;
use crate::error::Result;
use crate::models::Subscription;
use crate::utils::{col_opt_ts, col_ts, col_uuid, fmt_ts};

const SELECT: &str = "SELECT id, user_id, plan, status, billing_cycle, current_period_start,
        current_period_end, max_accounts, created_at, updated_at
    FROM subscriptions";

fn from_row(r: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: col_uuid(r, 0)?,
        user_id: col_uuid(r, 1)?,
        plan: r.get(2)?,
        status: r.get(3)?,
        billing_cycle: r.get(4)?,
        current_period_start: col_opt_ts(r, 5)?,
        current_period_end: col_opt_ts(r, 6)?,
        max_accounts: r.get(7)?,
        created_at: col_ts(r, 8)?,
        updated_at: col_ts(r, 9)?,
    })
}

pub fn find(conn: &Connection, user_id: Uuid) -> Result<Option<Subscription>> {
    let sub = conn
        .query_row(
            &format!("{} WHERE user_id=?1", SELECT),
            params![user_id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(sub)
}

/// Returns the user's subscription, creating the free default on first use.
pub fn get_or_create_default(conn: &Connection, user_id: Uuid) -> Result<Subscription> {
    if let Some(sub) = find(conn, user_id)? {
        return Ok(sub);
    }
    let ts = fmt_ts(&now());
    // OR IGNORE: a concurrent caller may have inserted first; the UNIQUE user_id wins
    conn.execute(
        "INSERT OR IGNORE INTO subscriptions(id, user_id, plan, status, billing_cycle,
                                             max_accounts, created_at, updated_at)
         VALUES (?1, ?2, 'free', 'active', 'monthly', ?3, ?4, ?4)",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            DEFAULT_MAX_ACCOUNTS,
            ts
        ],
    )?;
    tracing::debug!(user_id = %user_id, "created default subscription");
    crate::ledger::or_not_found(
        conn.query_row(
            &format!("{} WHERE user_id=?1", SELECT),
            params![user_id.to_string()],
            from_row,
        ),
        "Subscription",
    )
}

/// Overrides the account allowance; used by plan changes and operators.
pub fn set_max_accounts(conn: &Connection, user_id: Uuid, max_accounts: i64) -> Result<Subscription> {
    get_or_create_default(conn, user_id)?;
    conn.execute(
        "UPDATE subscriptions SET max_accounts=?1, updated_at=?2 WHERE user_id=?3",
        params![max_accounts, fmt_ts(&now()), user_id.to_string()],
    )?;
    get_or_create_default(conn, user_id)
}
