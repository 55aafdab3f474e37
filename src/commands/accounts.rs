// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::{arg, json_flag, opt, opt_decimal};
use crate::entitlement::account_allowance;
use crate::ledger::accounts;
use crate::models::{Account, AccountUpdate, NewAccount, User};
use crate::utils::{fmt_money, id_for_account, maybe_print_json, opt_str, parse_decimal, pretty_table};

/// Builds the create request; the currency falls back to the user's own.
pub fn new_account_from(user: &User, m: &clap::ArgMatches) -> Result<NewAccount> {
    Ok(NewAccount {
        name: arg(m, "name")?.to_string(),
        institution: opt(m, "institution"),
        account_type: opt(m, "type"),
        current_balance: parse_decimal(arg(m, "balance")?)?,
        currency: opt(m, "currency").unwrap_or_else(|| user.currency.clone()),
        connection_type: arg(m, "connection")?.parse()?,
    })
}

fn rows(accts: &[Account]) -> Vec<Vec<String>> {
    accts
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name.clone(),
                a.account_type.clone().unwrap_or_else(|| "-".into()),
                opt_str(&a.institution),
                fmt_money(&a.current_balance, &a.currency),
                a.connection_type.as_str().to_string(),
                if a.is_archived { "yes".into() } else { String::new() },
            ]
        })
        .collect()
}

const HEADERS: [&str; 7] = ["Id", "Name", "Type", "Institution", "Balance", "Connection", "Archived"];

pub fn handle(conn: &mut Connection, user: &User, m: &clap::ArgMatches) -> Result<()> {
    let json = json_flag(m);
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = new_account_from(user, sub)?;
            let acct = accounts::create(conn, user.id, &new)?;
            if !maybe_print_json(json, &acct)? {
                println!("Added account '{}' ({})", acct.name, acct.id);
            }
        }
        Some(("list", sub)) => {
            let list = accounts::list(conn, user.id, sub.get_flag("all"))?;
            if !maybe_print_json(json, &list)? {
                println!("{}", pretty_table(&HEADERS, rows(&list.accounts)));
                let counts: Vec<String> =
                    list.by_type.iter().map(|(t, n)| format!("{}={}", t, n)).collect();
                println!("{} accounts ({})", list.total, counts.join(", "));
            }
        }
        Some(("show", sub)) => {
            let id = id_for_account(conn, user.id, arg(sub, "id")?)?;
            let acct = accounts::get(conn, user.id, id)?;
            if !maybe_print_json(json, &acct)? {
                println!("{}", pretty_table(&HEADERS, rows(std::slice::from_ref(&acct))));
            }
        }
        Some(("update", sub)) => {
            let id = id_for_account(conn, user.id, arg(sub, "id")?)?;
            let upd = AccountUpdate {
                name: opt(sub, "name"),
                institution: opt(sub, "institution"),
                current_balance: opt_decimal(sub, "balance")?,
                is_hidden: sub.get_one::<bool>("hidden").copied(),
                is_archived: None,
            };
            let acct = accounts::update(conn, user.id, id, &upd)?;
            if !maybe_print_json(json, &acct)? {
                println!("Updated account '{}'", acct.name);
            }
        }
        Some((verb @ ("archive" | "unarchive"), sub)) => {
            let id = id_for_account(conn, user.id, arg(sub, "id")?)?;
            let acct = accounts::set_archived(conn, user.id, id, verb == "archive")?;
            println!("Account '{}' {}d", acct.name, verb);
        }
        Some(("rm", sub)) => {
            let id = id_for_account(conn, user.id, arg(sub, "id")?)?;
            accounts::delete(conn, user.id, id).context("Delete account")?;
            println!("Removed account {}", id);
        }
        Some(("sync", sub)) => {
            let id = id_for_account(conn, user.id, arg(sub, "id")?)?;
            let res = accounts::sync(conn, user.id, id)?;
            if !maybe_print_json(json, &res)? {
                println!("{} at {}", res.message, res.last_synced_at);
            }
        }
        Some(("limits", _)) => {
            let allowance = account_allowance(conn, user.id)?;
            if !maybe_print_json(json, &allowance)? {
                println!(
                    "{} of {} active accounts used",
                    allowance.active_accounts, allowance.max_accounts
                );
            }
        }
        _ => {}
    }
    Ok(())
}
