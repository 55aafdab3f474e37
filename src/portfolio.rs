// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Net worth and its composition, derived from the user's accounts, manual
//! assets and liabilities. All sums are done in `Decimal`.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::ledger::{self, now};
use crate::models::NetWorthSnapshot;
use crate::utils::{add_money, col_decimal, percent, sub_money};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub banks: Decimal,
    pub investments: Decimal,
    pub crypto: Decimal,
    pub wallets: Decimal,
    pub manual_assets: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub net_worth: Decimal,
    pub net_worth_change: Decimal,
    pub net_worth_change_percent: f64,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub breakdown: Breakdown,
    pub connected_accounts: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub date: DateTime<Utc>,
    pub net_worth: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Growth {
    pub absolute: Decimal,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetWorthHistory {
    pub history: Vec<HistoryPoint>,
    pub growth: Growth,
}

struct AccountRow {
    type_name: Option<String>,
    is_asset: bool,
    balance: Decimal,
}

fn active_accounts(conn: &Connection, user_id: Uuid) -> Result<Vec<AccountRow>> {
    let mut stmt = conn.prepare(
        "SELECT t.name, COALESCE(t.is_asset, 0), a.current_balance
         FROM accounts a LEFT JOIN account_types t ON a.account_type_id=t.id
         WHERE a.user_id=?1 AND a.is_archived=0",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], |r| {
        Ok(AccountRow {
            type_name: r.get(0)?,
            is_asset: r.get(1)?,
            balance: col_decimal(r, 2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn column_total(conn: &Connection, sql: &str, user_id: Uuid) -> Result<Decimal> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![user_id.to_string()], |r| col_decimal(r, 0))?;
    let mut total = Decimal::ZERO;
    for v in rows {
        total = add_money(total, v?)?;
    }
    Ok(total)
}

/// Current totals, breakdown and change against the latest stored snapshot.
pub fn summary(conn: &Connection, user_id: Uuid) -> Result<PortfolioSummary> {
    let accounts = active_accounts(conn, user_id)?;

    let mut breakdown = Breakdown::default();
    let mut total_account_assets = Decimal::ZERO;
    for a in &accounts {
        if a.is_asset {
            total_account_assets = add_money(total_account_assets, a.balance)?;
        }
        let bucket = match a.type_name.as_deref() {
            Some("bank") => &mut breakdown.banks,
            Some("investment") => &mut breakdown.investments,
            Some("crypto") => &mut breakdown.crypto,
            Some("wallet") => &mut breakdown.wallets,
            _ => continue,
        };
        *bucket = add_money(*bucket, a.balance)?;
    }

    breakdown.manual_assets =
        column_total(conn, "SELECT current_value FROM assets WHERE user_id=?1", user_id)?;
    let total_liabilities = column_total(
        conn,
        "SELECT current_balance FROM liabilities WHERE user_id=?1",
        user_id,
    )?;

    let total_assets = add_money(total_account_assets, breakdown.manual_assets)?;
    let net_worth = sub_money(total_assets, total_liabilities)?;

    // no snapshot yet: the current value is its own baseline
    let baseline = ledger::net_worth::latest(conn, user_id)?
        .map(|s| s.net_worth)
        .unwrap_or(net_worth);
    let net_worth_change = sub_money(net_worth, baseline)?;

    Ok(PortfolioSummary {
        net_worth,
        net_worth_change,
        net_worth_change_percent: percent(net_worth_change, baseline),
        total_assets,
        total_liabilities,
        breakdown,
        connected_accounts: accounts.len(),
        last_updated: now(),
    })
}

/// Computes the current summary and appends it to the history.
pub fn record_snapshot(conn: &Connection, user_id: Uuid) -> Result<NetWorthSnapshot> {
    let s = summary(conn, user_id)?;
    let snap = ledger::net_worth::insert(
        conn,
        user_id,
        s.last_updated,
        s.total_assets,
        s.total_liabilities,
        &serde_json::to_value(&s.breakdown)?,
    )?;
    tracing::info!(user_id = %user_id, net_worth = %snap.net_worth, "recorded net worth snapshot");
    Ok(snap)
}

/// Snapshots oldest first, with growth from the first to the last.
pub fn history(
    conn: &Connection,
    user_id: Uuid,
    since: Option<DateTime<Utc>>,
) -> Result<NetWorthHistory> {
    let snaps = ledger::net_worth::list(conn, user_id, since)?;
    let growth = match (snaps.first(), snaps.last()) {
        (Some(first), Some(last)) => {
            let absolute = sub_money(last.net_worth, first.net_worth)?;
            Growth {
                absolute,
                percent: percent(absolute, first.net_worth),
            }
        }
        _ => Growth::default(),
    };
    Ok(NetWorthHistory {
        history: snaps
            .into_iter()
            .map(|s| HistoryPoint {
                date: s.snapshot_date,
                net_worth: s.net_worth,
            })
            .collect(),
        growth,
    })
}
