// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Plan limits checked ahead of resource creation.

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Account allowance when the user has no subscription row yet.
pub const DEFAULT_MAX_ACCOUNTS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountAllowance {
    pub active_accounts: i64,
    pub max_accounts: i64,
}

impl AccountAllowance {
    pub fn can_create(&self) -> bool {
        self.active_accounts < self.max_accounts
    }
}

/// Reads the allowance without materialising a subscription row.
pub fn account_allowance(conn: &Connection, user_id: Uuid) -> Result<AccountAllowance> {
    let uid = user_id.to_string();
    let max_accounts: Option<i64> = conn
        .query_row(
            "SELECT max_accounts FROM subscriptions WHERE user_id=?1",
            params![&uid],
            |r| r.get(0),
        )
        .optional()?;
    let active_accounts: i64 = conn.query_row(
        "SELECT COUNT(*) FROM accounts WHERE user_id=?1 AND is_archived=0",
        params![&uid],
        |r| r.get(0),
    )?;
    Ok(AccountAllowance {
        active_accounts,
        max_accounts: max_accounts.unwrap_or(DEFAULT_MAX_ACCOUNTS),
    })
}

/// Fails with the account-limit entitlement error when one more active account
/// would exceed the plan. Call inside the write transaction that inserts.
pub fn ensure_can_add_account(conn: &Connection, user_id: Uuid) -> Result<()> {
    let allowance = account_allowance(conn, user_id)?;
    if !allowance.can_create() {
        tracing::info!(
            user_id = %user_id,
            active = allowance.active_accounts,
            max = allowance.max_accounts,
            "account limit reached"
        );
        return Err(Error::account_limit());
    }
    Ok(())
}
