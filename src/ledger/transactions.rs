// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction rows. Creating and deleting a transaction moves money, so those
//! entry points live in [`crate::balance`]; this module only reads and edits
//! descriptive fields.

use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};
use uuid::Uuid;

use super::{now, or_not_found};
use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionFilter, TransactionPage, TransactionUpdate};
use crate::utils::{
    col_datetime, col_decimal, col_ts, col_uuid, conversion_err, fmt_datetime, fmt_ts,
    id_for_category, non_empty,
};

pub const MAX_PAGE: u32 = 100;

const SELECT: &str = "SELECT t.id, t.user_id, t.account_id, a.name, t.category_id, c.name,
        t.amount, t.currency, t.transaction_type, t.description, t.merchant_name, t.tags,
        t.is_recurring, t.transaction_date, t.created_at, t.updated_at
    FROM transactions t
    LEFT JOIN accounts a ON t.account_id=a.id
    LEFT JOIN categories c ON t.category_id=c.id";

pub(crate) fn from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = r.get(8)?;
    let tags: String = r.get(11)?;
    Ok(Transaction {
        id: col_uuid(r, 0)?,
        user_id: col_uuid(r, 1)?,
        account_id: col_uuid(r, 2)?,
        account_name: r.get(3)?,
        category_id: r.get(4)?,
        category_name: r.get(5)?,
        amount: col_decimal(r, 6)?,
        currency: r.get(7)?,
        transaction_type: kind
            .parse()
            .map_err(|e: Error| conversion_err(8, std::io::Error::other(e.to_string())))?,
        description: r.get(9)?,
        merchant_name: r.get(10)?,
        tags: serde_json::from_str(&tags).map_err(|e| conversion_err(11, e))?,
        is_recurring: r.get(12)?,
        transaction_date: col_datetime(r, 13)?,
        created_at: col_ts(r, 14)?,
        updated_at: col_ts(r, 15)?,
    })
}

pub fn get(conn: &Connection, user_id: Uuid, txn_id: Uuid) -> Result<Transaction> {
    or_not_found(
        conn.query_row(
            &format!("{} WHERE t.id=?1 AND t.user_id=?2", SELECT),
            params![txn_id.to_string(), user_id.to_string()],
            from_row,
        ),
        "Transaction",
    )
}

fn filter_clause(user_id: Uuid, f: &TransactionFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE t.user_id=?");
    let mut vals = vec![Value::Text(user_id.to_string())];
    if let Some(acct) = f.account_id {
        sql.push_str(" AND t.account_id=?");
        vals.push(Value::Text(acct.to_string()));
    }
    if let Some(cat) = f.category_id {
        sql.push_str(" AND t.category_id=?");
        vals.push(Value::Integer(cat));
    }
    if let Some(kind) = f.transaction_type {
        sql.push_str(" AND t.transaction_type=?");
        vals.push(Value::Text(kind.as_str().to_string()));
    }
    if let Some(from) = f.date_from {
        sql.push_str(" AND t.transaction_date>=?");
        vals.push(Value::Text(fmt_datetime(&from)));
    }
    if let Some(to) = f.date_to {
        sql.push_str(" AND t.transaction_date<=?");
        vals.push(Value::Text(fmt_datetime(&to)));
    }
    (sql, vals)
}

/// Filtered page, newest first. `total` counts every match, not just the page.
pub fn list(conn: &Connection, user_id: Uuid, filter: &TransactionFilter) -> Result<TransactionPage> {
    if filter.limit == 0 || filter.limit > MAX_PAGE {
        return Err(Error::validation(format!(
            "limit must be between 1 and {}",
            MAX_PAGE
        )));
    }
    let (clause, mut vals) = filter_clause(user_id, filter);

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM transactions t{}", clause),
        params_from_iter(vals.iter()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "{}{} ORDER BY t.transaction_date DESC, t.created_at DESC, t.rowid DESC LIMIT ? OFFSET ?",
        SELECT, clause
    );
    vals.push(Value::Integer(i64::from(filter.limit)));
    vals.push(Value::Integer(i64::from(filter.offset)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(vals.iter()), from_row)?;
    let mut transactions = Vec::new();
    for row in rows {
        transactions.push(row?);
    }
    Ok(TransactionPage {
        transactions,
        total: total as u64,
        limit: filter.limit,
        offset: filter.offset,
    })
}

/// The `limit` most recent transactions by transaction date.
pub fn recent(conn: &Connection, user_id: Uuid, limit: u32) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE t.user_id=?1 ORDER BY t.transaction_date DESC, t.created_at DESC LIMIT ?2",
        SELECT
    ))?;
    let rows = stmt.query_map(params![user_id.to_string(), i64::from(limit)], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Every transaction of the user, oldest first.
pub fn all(conn: &Connection, user_id: Uuid) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE t.user_id=?1 ORDER BY t.transaction_date, t.created_at, t.rowid",
        SELECT
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn update(
    conn: &Connection,
    user_id: Uuid,
    txn_id: Uuid,
    upd: &TransactionUpdate,
) -> Result<Transaction> {
    let mut txn = get(conn, user_id, txn_id)?;
    if let Some(desc) = &upd.description {
        txn.description = non_empty(Some(desc.clone()));
    }
    if let Some(merchant) = &upd.merchant_name {
        txn.merchant_name = non_empty(Some(merchant.clone()));
    }
    if let Some(cat) = upd.category_id {
        txn.category_id = Some(id_for_category(conn, &cat.to_string())?);
    }
    if let Some(tags) = &upd.tags {
        txn.tags = normalize_tags(tags);
    }
    conn.execute(
        "UPDATE transactions SET description=?1, merchant_name=?2, category_id=?3, tags=?4, updated_at=?5
         WHERE id=?6 AND user_id=?7",
        params![
            txn.description,
            txn.merchant_name,
            txn.category_id,
            serde_json::to_string(&txn.tags)?,
            fmt_ts(&now()),
            txn_id.to_string(),
            user_id.to_string()
        ],
    )?;
    get(conn, user_id, txn_id)
}

pub(crate) fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in tags {
        let t = t.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}
