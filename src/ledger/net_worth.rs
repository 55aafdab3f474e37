// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Append-only net worth snapshots. Figures are computed by
//! [`crate::portfolio`]; this module only stores and reads them.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::Result;
use crate::models::NetWorthSnapshot;
use crate::utils::{col_decimal, col_json, col_ts, col_uuid, fmt_ts, sub_money};

const SELECT: &str = "SELECT id, user_id, snapshot_date, total_assets, total_liabilities,
        net_worth, breakdown
    FROM net_worth_history";

fn from_row(r: &Row<'_>) -> rusqlite::Result<NetWorthSnapshot> {
    Ok(NetWorthSnapshot {
        id: col_uuid(r, 0)?,
        user_id: col_uuid(r, 1)?,
        snapshot_date: col_ts(r, 2)?,
        total_assets: col_decimal(r, 3)?,
        total_liabilities: col_decimal(r, 4)?,
        net_worth: col_decimal(r, 5)?,
        breakdown: col_json(r, 6)?,
    })
}

pub fn insert(
    conn: &Connection,
    user_id: Uuid,
    at: DateTime<Utc>,
    total_assets: Decimal,
    total_liabilities: Decimal,
    breakdown: &serde_json::Value,
) -> Result<NetWorthSnapshot> {
    let net_worth = sub_money(total_assets, total_liabilities)?;
    let id = Uuid::new_v4();
    let ts = fmt_ts(&at);
    conn.execute(
        "INSERT INTO net_worth_history(id, user_id, snapshot_date, total_assets,
                                       total_liabilities, net_worth, breakdown, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?3)",
        params![
            id.to_string(),
            user_id.to_string(),
            ts,
            total_assets.to_string(),
            total_liabilities.to_string(),
            net_worth.to_string(),
            serde_json::to_string(breakdown)?
        ],
    )?;
    Ok(NetWorthSnapshot {
        id,
        user_id,
        snapshot_date: at,
        total_assets,
        total_liabilities,
        net_worth,
        breakdown: Some(breakdown.clone()),
    })
}

pub fn latest(conn: &Connection, user_id: Uuid) -> Result<Option<NetWorthSnapshot>> {
    let snap = conn
        .query_row(
            &format!(
                "{} WHERE user_id=?1 ORDER BY snapshot_date DESC, rowid DESC LIMIT 1",
                SELECT
            ),
            params![user_id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(snap)
}

/// Oldest first, optionally bounded below.
pub fn list(
    conn: &Connection,
    user_id: Uuid,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<NetWorthSnapshot>> {
    let since = since.map(|s| fmt_ts(&s));
    let mut stmt = conn.prepare(&format!(
        "{} WHERE user_id=?1 AND (?2 IS NULL OR snapshot_date>=?2)
         ORDER BY snapshot_date, rowid",
        SELECT
    ))?;
    let rows = stmt.query_map(params![user_id.to_string(), since], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
