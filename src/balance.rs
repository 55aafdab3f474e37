// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Keeps `accounts.current_balance` in step with the transactions that
//! reference the account.
//!
//! A transaction row and its balance effect are written in the same
//! `IMMEDIATE` SQLite transaction. The write lock is taken before the balance
//! is read, so two writers touching the same account are serialised and the
//! read-modify-write below cannot lose an update. Balances are summed as
//! `Decimal` in Rust; SQLite never does arithmetic on them.

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ledger::{self, now, transactions::normalize_tags};
use crate::models::{NewTransaction, Transaction, TransactionType};
use crate::utils::{fmt_datetime, fmt_ts, id_for_category, money, non_empty};

/// Signed change a transaction applies to its account when it is recorded.
///
/// Debits always subtract the magnitude, whatever sign the caller used.
/// Transfers have no effect.
pub fn balance_effect(kind: TransactionType, amount: Decimal) -> Decimal {
    match kind {
        TransactionType::Credit => amount,
        TransactionType::Debit => -amount.abs(),
        TransactionType::Transfer => Decimal::ZERO,
    }
}

/// Change applied when the transaction is deleted; exactly undoes [`balance_effect`].
pub fn reversal_effect(kind: TransactionType, amount: Decimal) -> Decimal {
    -balance_effect(kind, amount)
}

fn account_balance(conn: &Connection, user_id: Uuid, account_id: Uuid) -> Result<Option<(Decimal, String)>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT current_balance, currency FROM accounts WHERE id=?1 AND user_id=?2",
            params![account_id.to_string(), user_id.to_string()],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    row.map(|(bal, ccy)| {
        Decimal::from_str_exact(&bal)
            .map(|b| (b, ccy))
            .map_err(|e| Error::Corrupt(format!("balance '{}' of account {}: {}", bal, account_id, e)))
    })
    .transpose()
}

fn apply_delta(
    conn: &Connection,
    account_id: Uuid,
    current: Decimal,
    delta: Decimal,
) -> Result<Decimal> {
    if delta.is_zero() {
        return Ok(current);
    }
    let updated = current
        .checked_add(delta)
        .ok_or_else(|| Error::validation("Balance would overflow"))?;
    conn.execute(
        "UPDATE accounts SET current_balance=?1, updated_at=?2 WHERE id=?3",
        params![updated.to_string(), fmt_ts(&now()), account_id.to_string()],
    )?;
    Ok(updated)
}

/// Records a transaction against one of the user's accounts and moves the balance.
///
/// Fails with `NotFound("Account")` and changes nothing when the account is
/// missing or belongs to someone else.
pub fn record_transaction(
    conn: &mut Connection,
    user_id: Uuid,
    new: &NewTransaction,
) -> Result<Transaction> {
    let amount = money(new.amount);
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let (balance, currency) =
        account_balance(&tx, user_id, new.account_id)?.ok_or(Error::NotFound("Account"))?;
    let category_id = new
        .category_id
        .map(|c| id_for_category(&tx, &c.to_string()))
        .transpose()?;

    let id = Uuid::new_v4();
    let ts = fmt_ts(&now());
    tx.execute(
        "INSERT INTO transactions(id, user_id, account_id, category_id, amount, currency,
                                  transaction_type, description, merchant_name, tags,
                                  is_recurring, transaction_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
        params![
            id.to_string(),
            user_id.to_string(),
            new.account_id.to_string(),
            category_id,
            amount.to_string(),
            currency,
            new.transaction_type.as_str(),
            non_empty(new.description.clone()),
            non_empty(new.merchant_name.clone()),
            serde_json::to_string(&normalize_tags(&new.tags))?,
            new.is_recurring,
            fmt_datetime(&new.transaction_date),
            ts
        ],
    )?;
    let delta = balance_effect(new.transaction_type, amount);
    let updated = apply_delta(&tx, new.account_id, balance, delta)?;
    tx.commit()?;

    if new.transaction_type == TransactionType::Transfer {
        tracing::debug!(txn_id = %id, "transfer recorded without balance effect");
    }
    tracing::info!(
        user_id = %user_id,
        account_id = %new.account_id,
        txn_id = %id,
        kind = new.transaction_type.as_str(),
        %amount,
        balance = %updated,
        "recorded transaction"
    );
    ledger::transactions::get(conn, user_id, id)
}

/// Deletes a transaction, first reversing its effect from the stored row.
pub fn delete_transaction(conn: &mut Connection, user_id: Uuid, txn_id: Uuid) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let txn = ledger::transactions::get(&tx, user_id, txn_id)?;

    let updated = match account_balance(&tx, user_id, txn.account_id)? {
        Some((balance, _)) => Some(apply_delta(
            &tx,
            txn.account_id,
            balance,
            reversal_effect(txn.transaction_type, txn.amount),
        )?),
        None => None,
    };
    tx.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![txn_id.to_string(), user_id.to_string()],
    )?;
    tx.commit()?;
    tracing::info!(
        user_id = %user_id,
        txn_id = %txn_id,
        balance = ?updated,
        "deleted transaction"
    );
    Ok(())
}
