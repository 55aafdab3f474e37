// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde_json::json;

use super::arg;
use crate::ledger::transactions;
use crate::models::User;
use crate::utils::{fmt_datetime, opt_str};

pub fn handle(conn: &Connection, user: &User, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let n = export_transactions(conn, user, sub)?;
            println!("Exported {} transactions to {}", n, arg(sub, "out")?);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes the user's transactions, oldest first. Returns how many were written.
pub fn export_transactions(conn: &Connection, user: &User, sub: &clap::ArgMatches) -> Result<usize> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;
    let txns = transactions::all(conn, user.id)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record([
                "date",
                "account",
                "type",
                "amount",
                "currency",
                "category",
                "merchant",
                "description",
            ])?;
            for t in &txns {
                wtr.write_record([
                    fmt_datetime(&t.transaction_date),
                    opt_str(&t.account_name),
                    t.transaction_type.to_string(),
                    t.amount.to_string(),
                    t.currency.clone(),
                    opt_str(&t.category_name),
                    opt_str(&t.merchant_name),
                    opt_str(&t.description),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = txns
                .iter()
                .map(|t| {
                    json!({
                        "date": fmt_datetime(&t.transaction_date),
                        "account": t.account_name,
                        "type": t.transaction_type,
                        "amount": t.amount.to_string(),
                        "currency": t.currency,
                        "category": t.category_name,
                        "merchant": t.merchant_name,
                        "description": t.description,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(user_id = %user.id, count = txns.len(), format = %fmt, "exported transactions");
    Ok(txns.len())
}
