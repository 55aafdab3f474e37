// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{now, or_not_found};
use crate::entitlement::ensure_can_add_account;
use crate::error::{Error, Result};
use crate::models::{Account, AccountList, AccountUpdate, ConnectionType, NewAccount, SyncResult};
use crate::utils::{
    col_decimal, col_opt_ts, col_ts, col_uuid, fmt_ts, money, non_empty, normalize_currency,
    validate_name,
};

const SELECT: &str = "SELECT a.id, a.user_id, a.account_type_id, t.name, a.name, a.institution,
        a.current_balance, a.currency, a.connection_type, a.last_synced_at, a.sync_status,
        a.is_hidden, a.is_archived, a.created_at, a.updated_at
    FROM accounts a LEFT JOIN account_types t ON a.account_type_id=t.id";

pub(crate) fn from_row(r: &Row<'_>) -> rusqlite::Result<Account> {
    let conn_type: String = r.get(8)?;
    Ok(Account {
        id: col_uuid(r, 0)?,
        user_id: col_uuid(r, 1)?,
        account_type_id: r.get(2)?,
        account_type: r.get(3)?,
        name: r.get(4)?,
        institution: r.get(5)?,
        current_balance: col_decimal(r, 6)?,
        currency: r.get(7)?,
        connection_type: if conn_type == "linked" {
            ConnectionType::Linked
        } else {
            ConnectionType::Manual
        },
        last_synced_at: col_opt_ts(r, 9)?,
        sync_status: r.get(10)?,
        is_hidden: r.get(11)?,
        is_archived: r.get(12)?,
        created_at: col_ts(r, 13)?,
        updated_at: col_ts(r, 14)?,
    })
}

fn account_type_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM account_types WHERE name=?1 COLLATE NOCASE",
            params![name.trim()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Creates an account after the plan limit check; both happen under one write lock.
pub fn create(conn: &mut Connection, user_id: Uuid, new: &NewAccount) -> Result<Account> {
    let name = validate_name("Account name", &new.name, 100)?;
    let currency = normalize_currency(&new.currency)?;
    let institution = non_empty(new.institution.clone());

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_can_add_account(&tx, user_id)?;

    let type_id = match &new.account_type {
        Some(t) => {
            let id = account_type_id(&tx, t)?;
            if id.is_none() {
                tracing::warn!(account_type = %t, "unknown account type; account left untyped");
            }
            id
        }
        None => None,
    };

    let id = Uuid::new_v4();
    let ts = fmt_ts(&now());
    tx.execute(
        "INSERT INTO accounts(id, user_id, account_type_id, name, institution, current_balance,
                              currency, connection_type, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            id.to_string(),
            user_id.to_string(),
            type_id,
            name,
            institution,
            money(new.current_balance).to_string(),
            currency,
            new.connection_type.as_str(),
            ts
        ],
    )?;
    tx.commit()?;
    tracing::info!(user_id = %user_id, account_id = %id, "created account");
    get(conn, user_id, id)
}

pub fn get(conn: &Connection, user_id: Uuid, account_id: Uuid) -> Result<Account> {
    or_not_found(
        conn.query_row(
            &format!("{} WHERE a.id=?1 AND a.user_id=?2", SELECT),
            params![account_id.to_string(), user_id.to_string()],
            from_row,
        ),
        "Account",
    )
}

/// Newest first; archived accounts only when asked. `by_type` counts untyped accounts as "other".
pub fn list(conn: &Connection, user_id: Uuid, include_archived: bool) -> Result<AccountList> {
    let mut sql = format!("{} WHERE a.user_id=?1", SELECT);
    if !include_archived {
        sql.push_str(" AND a.is_archived=0");
    }
    sql.push_str(" ORDER BY a.created_at DESC, a.rowid DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id.to_string()], from_row)?;
    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(row?);
    }
    let by_type = count_by_type(&accounts);
    Ok(AccountList {
        total: accounts.len(),
        accounts,
        by_type,
    })
}

pub fn count_by_type(accounts: &[Account]) -> BTreeMap<String, usize> {
    let mut by_type = BTreeMap::new();
    for a in accounts {
        let key = a.account_type.clone().unwrap_or_else(|| "other".to_string());
        *by_type.entry(key).or_insert(0) += 1;
    }
    by_type
}

pub fn update(
    conn: &mut Connection,
    user_id: Uuid,
    account_id: Uuid,
    upd: &AccountUpdate,
) -> Result<Account> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut acct = get(&tx, user_id, account_id)?;

    if let Some(name) = &upd.name {
        acct.name = validate_name("Account name", name, 100)?;
    }
    if let Some(inst) = &upd.institution {
        acct.institution = non_empty(Some(inst.clone()));
    }
    if let Some(bal) = upd.current_balance {
        acct.current_balance = money(bal);
    }
    if let Some(hidden) = upd.is_hidden {
        acct.is_hidden = hidden;
    }
    if let Some(archived) = upd.is_archived {
        // bringing an account back counts against the plan again
        if acct.is_archived && !archived {
            ensure_can_add_account(&tx, user_id)?;
        }
        acct.is_archived = archived;
    }

    tx.execute(
        "UPDATE accounts SET name=?1, institution=?2, current_balance=?3, is_hidden=?4,
                is_archived=?5, updated_at=?6
         WHERE id=?7 AND user_id=?8",
        params![
            acct.name,
            acct.institution,
            acct.current_balance.to_string(),
            acct.is_hidden,
            acct.is_archived,
            fmt_ts(&now()),
            account_id.to_string(),
            user_id.to_string()
        ],
    )?;
    tx.commit()?;
    get(conn, user_id, account_id)
}

pub fn set_archived(
    conn: &mut Connection,
    user_id: Uuid,
    account_id: Uuid,
    archived: bool,
) -> Result<Account> {
    update(
        conn,
        user_id,
        account_id,
        &AccountUpdate {
            is_archived: Some(archived),
            ..Default::default()
        },
    )
}

/// Deletes the account; its transactions go with it.
pub fn delete(conn: &Connection, user_id: Uuid, account_id: Uuid) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM accounts WHERE id=?1 AND user_id=?2",
        params![account_id.to_string(), user_id.to_string()],
    )?;
    if n == 0 {
        return Err(Error::NotFound("Account"));
    }
    tracing::info!(user_id = %user_id, account_id = %account_id, "deleted account");
    Ok(())
}

/// Marks a linked account as freshly synced. Provider-side sync is not wired up.
pub fn sync(conn: &Connection, user_id: Uuid, account_id: Uuid) -> Result<SyncResult> {
    let acct = get(conn, user_id, account_id)?;
    if acct.connection_type == ConnectionType::Manual {
        return Err(Error::validation("Manual accounts cannot be synced"));
    }
    let ts = now();
    conn.execute(
        "UPDATE accounts SET last_synced_at=?1, sync_status='ok', updated_at=?1 WHERE id=?2 AND user_id=?3",
        params![fmt_ts(&ts), account_id.to_string(), user_id.to_string()],
    )?;
    Ok(SyncResult {
        message: "Account synced successfully".into(),
        last_synced_at: ts,
    })
}
