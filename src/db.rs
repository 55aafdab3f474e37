// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config::Config;

pub fn open_or_init(config: &Config) -> Result<Connection> {
    let path = &config.db_path;
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    conn.busy_timeout(config.busy_timeout)?;
    init_schema(&mut conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users(
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        full_name TEXT,
        plan TEXT NOT NULL DEFAULT 'free',
        currency TEXT NOT NULL DEFAULT 'INR',
        locale TEXT NOT NULL DEFAULT 'en-IN',
        theme TEXT NOT NULL DEFAULT 'dark',
        last_login_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS account_types(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        is_asset INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        account_type_id INTEGER,
        name TEXT NOT NULL,
        institution TEXT,
        current_balance TEXT NOT NULL DEFAULT '0',
        currency TEXT NOT NULL,
        connection_type TEXT NOT NULL DEFAULT 'manual' CHECK(connection_type IN ('manual','linked')),
        last_synced_at TEXT,
        sync_status TEXT NOT NULL DEFAULT 'ok',
        is_hidden INTEGER NOT NULL DEFAULT 0,
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY(account_type_id) REFERENCES account_types(id)
    );
    CREATE INDEX IF NOT EXISTS idx_accounts_user ON accounts(user_id);

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        parent_id INTEGER,
        is_income INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(parent_id) REFERENCES categories(id)
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        account_id TEXT NOT NULL,
        category_id INTEGER,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        transaction_type TEXT NOT NULL CHECK(transaction_type IN ('credit','debit','transfer')),
        description TEXT,
        merchant_name TEXT,
        tags TEXT NOT NULL DEFAULT '[]',
        is_recurring INTEGER NOT NULL DEFAULT 0,
        transaction_date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, transaction_date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);

    CREATE TABLE IF NOT EXISTS assets(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        asset_type TEXT,
        current_value TEXT NOT NULL,
        purchase_value TEXT,
        purchase_date TEXT,
        currency TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS liabilities(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        linked_account_id TEXT,
        name TEXT NOT NULL,
        liability_type TEXT,
        principal_amount TEXT,
        current_balance TEXT NOT NULL,
        interest_rate TEXT,
        currency TEXT NOT NULL,
        emi_amount TEXT,
        emi_day INTEGER CHECK(emi_day IS NULL OR emi_day BETWEEN 1 AND 31),
        start_date TEXT,
        end_date TEXT,
        lender TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY(linked_account_id) REFERENCES accounts(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS insights(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        insight_type TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        severity TEXT NOT NULL DEFAULT 'info',
        priority INTEGER NOT NULL DEFAULT 5,
        data TEXT,
        cta_text TEXT,
        cta_link TEXT,
        is_read INTEGER NOT NULL DEFAULT 0,
        is_dismissed INTEGER NOT NULL DEFAULT 0,
        valid_from TEXT NOT NULL,
        valid_until TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS subscriptions(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL UNIQUE,
        plan TEXT NOT NULL DEFAULT 'free',
        status TEXT NOT NULL DEFAULT 'active',
        billing_cycle TEXT NOT NULL DEFAULT 'monthly',
        current_period_start TEXT,
        current_period_end TEXT,
        max_accounts INTEGER NOT NULL DEFAULT 2,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    -- append-only; the newest row is the baseline for net worth change
    CREATE TABLE IF NOT EXISTS net_worth_history(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        snapshot_date TEXT NOT NULL,
        total_assets TEXT NOT NULL,
        total_liabilities TEXT NOT NULL,
        net_worth TEXT NOT NULL,
        breakdown TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_net_worth_user_date ON net_worth_history(user_id, snapshot_date);

    INSERT OR IGNORE INTO account_types(id, name, is_asset) VALUES
        (1, 'bank', 1),
        (2, 'investment', 1),
        (3, 'crypto', 1),
        (4, 'wallet', 1),
        (5, 'credit_card', 0),
        (6, 'loan', 0);

    INSERT OR IGNORE INTO categories(id, name, parent_id, is_income) VALUES
        (1, 'Income', NULL, 1),
        (2, 'Salary', 1, 1),
        (3, 'Interest', 1, 1),
        (10, 'Food', NULL, 0),
        (11, 'Groceries', 10, 0),
        (12, 'Dining', 10, 0),
        (20, 'Housing', NULL, 0),
        (21, 'Rent', 20, 0),
        (22, 'Utilities', 20, 0),
        (30, 'Transport', NULL, 0),
        (40, 'Shopping', NULL, 0),
        (50, 'Entertainment', NULL, 0),
        (60, 'Health', NULL, 0),
        (70, 'Subscriptions', NULL, 0),
        (90, 'Other', NULL, 0);
    "#,
    )?;
    Ok(())
}
