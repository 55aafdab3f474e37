// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use rusqlite::Connection;

use super::{json_flag, opt};
use crate::ledger::users;
use crate::models::{ProfileUpdate, User};
use crate::portfolio;
use crate::utils::{fmt_money, maybe_print_json, opt_str, parse_date, pretty_table};

fn print_user(u: &User) {
    println!(
        "{}",
        pretty_table(
            &["Id", "Email", "Name", "Plan", "Currency", "Theme"],
            vec![vec![
                u.id.to_string(),
                u.email.clone(),
                opt_str(&u.full_name),
                u.plan.clone(),
                u.currency.clone(),
                u.theme.clone(),
            ]],
        )
    );
}

pub fn handle(conn: &mut Connection, user: &User, m: &clap::ArgMatches) -> Result<()> {
    let json = json_flag(m);
    let ccy = user.currency.as_str();
    match m.subcommand() {
        Some(("show", _)) => {
            if !maybe_print_json(json, user)? {
                print_user(user);
            }
        }
        Some(("update", sub)) => {
            let upd = ProfileUpdate {
                full_name: opt(sub, "name"),
                currency: opt(sub, "currency"),
                theme: opt(sub, "theme"),
            };
            let updated = users::update_profile(conn, user.id, &upd)?;
            if !maybe_print_json(json, &updated)? {
                print_user(&updated);
            }
        }
        Some(("portfolio", _)) => {
            let s = portfolio::summary(conn, user.id)?;
            if !maybe_print_json(json, &s)? {
                println!(
                    "Net worth {} (change {}, {:.2}%)",
                    fmt_money(&s.net_worth, ccy),
                    s.net_worth_change,
                    s.net_worth_change_percent
                );
                let b = &s.breakdown;
                let rows = vec![
                    vec!["Banks".to_string(), fmt_money(&b.banks, ccy)],
                    vec!["Investments".to_string(), fmt_money(&b.investments, ccy)],
                    vec!["Crypto".to_string(), fmt_money(&b.crypto, ccy)],
                    vec!["Wallets".to_string(), fmt_money(&b.wallets, ccy)],
                    vec!["Manual assets".to_string(), fmt_money(&b.manual_assets, ccy)],
                    vec!["Total assets".to_string(), fmt_money(&s.total_assets, ccy)],
                    vec!["Liabilities".to_string(), fmt_money(&s.total_liabilities, ccy)],
                ];
                println!("{}", pretty_table(&["Bucket", "Amount"], rows));
                println!("{} active accounts", s.connected_accounts);
            }
        }
        Some(("snapshot", _)) => {
            let snap = portfolio::record_snapshot(conn, user.id)?;
            if !maybe_print_json(json, &snap)? {
                println!("Recorded net worth {}", fmt_money(&snap.net_worth, ccy));
            }
        }
        Some(("history", sub)) => {
            let since = opt(sub, "since")
                .map(|d| parse_date(&d))
                .transpose()?
                .map(|d| Utc.from_utc_datetime(&d.and_time(chrono::NaiveTime::MIN)));
            let h = portfolio::history(conn, user.id, since)?;
            if !maybe_print_json(json, &h)? {
                let rows = h
                    .history
                    .iter()
                    .map(|p| vec![p.date.date_naive().to_string(), fmt_money(&p.net_worth, ccy)])
                    .collect();
                println!("{}", pretty_table(&["Date", "Net worth"], rows));
                println!(
                    "Growth {} ({:.2}%)",
                    fmt_money(&h.growth.absolute, ccy),
                    h.growth.percent
                );
            }
        }
        Some(("delete", _)) => {
            users::delete(conn, user.id)?;
            println!("Deleted user {} and all owned data", user.email);
        }
        _ => {}
    }
    Ok(())
}
