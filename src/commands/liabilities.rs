// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::{arg, json_flag, opt, opt_decimal};
use crate::ledger::liabilities;
use crate::models::{Liability, LiabilityUpdate, NewLiability, User};
use crate::utils::{
    fmt_money, id_for_account, maybe_print_json, opt_str, parse_date, parse_decimal, parse_uuid,
    pretty_table,
};

fn rows(items: &[Liability]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.name.clone(),
                opt_str(&l.liability_type),
                fmt_money(&l.current_balance, &l.currency),
                l.emi_amount
                    .map(|e| fmt_money(&e, &l.currency))
                    .unwrap_or_default(),
                l.emi_day.map(|d| d.to_string()).unwrap_or_default(),
                format!("{:.2}%", l.paid_percent),
            ]
        })
        .collect()
}

const HEADERS: [&str; 7] = ["Id", "Name", "Type", "Outstanding", "EMI", "EMI day", "Paid"];

pub fn handle(conn: &mut Connection, user: &User, m: &clap::ArgMatches) -> Result<()> {
    let json = json_flag(m);
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = NewLiability {
                name: arg(sub, "name")?.to_string(),
                liability_type: opt(sub, "type"),
                linked_account_id: opt(sub, "account")
                    .map(|a| id_for_account(conn, user.id, &a))
                    .transpose()?,
                current_balance: parse_decimal(arg(sub, "balance")?)?,
                principal_amount: opt_decimal(sub, "principal")?,
                interest_rate: opt_decimal(sub, "rate")?,
                currency: opt(sub, "currency").unwrap_or_else(|| user.currency.clone()),
                emi_amount: opt_decimal(sub, "emi")?,
                emi_day: sub.get_one::<u32>("emi_day").copied(),
                start_date: opt(sub, "start").map(|d| parse_date(&d)).transpose()?,
                end_date: opt(sub, "end").map(|d| parse_date(&d)).transpose()?,
                lender: opt(sub, "lender"),
                notes: opt(sub, "notes"),
            };
            let l = liabilities::create(conn, user.id, &new)?;
            if !maybe_print_json(json, &l)? {
                println!("Added liability '{}' ({})", l.name, l.id);
            }
        }
        Some(("list", _)) => {
            let list = liabilities::list(conn, user.id)?;
            if !maybe_print_json(json, &list)? {
                println!("{}", pretty_table(&HEADERS, rows(&list.liabilities)));
                println!(
                    "Total outstanding {}, monthly EMIs {}",
                    fmt_money(&list.total_liability, &user.currency),
                    fmt_money(&list.monthly_emi_total, &user.currency)
                );
            }
        }
        Some(("show", sub)) => {
            let l = liabilities::get(conn, user.id, parse_uuid(arg(sub, "id")?)?)?;
            if !maybe_print_json(json, &l)? {
                println!("{}", pretty_table(&HEADERS, rows(std::slice::from_ref(&l))));
            }
        }
        Some(("update", sub)) => {
            let upd = LiabilityUpdate {
                current_balance: opt_decimal(sub, "balance")?,
                emi_amount: opt_decimal(sub, "emi")?,
                notes: opt(sub, "notes"),
            };
            let l = liabilities::update(conn, user.id, parse_uuid(arg(sub, "id")?)?, &upd)?;
            if !maybe_print_json(json, &l)? {
                println!("Updated liability '{}'", l.name);
            }
        }
        Some(("rm", sub)) => {
            let id = parse_uuid(arg(sub, "id")?)?;
            liabilities::delete(conn, user.id, id)?;
            println!("Removed liability {}", id);
        }
        _ => {}
    }
    Ok(())
}
