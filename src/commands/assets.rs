// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::{arg, json_flag, opt, opt_decimal};
use crate::ledger::assets;
use crate::models::{Asset, AssetUpdate, NewAsset, User};
use crate::utils::{
    fmt_money, maybe_print_json, opt_str, parse_date, parse_decimal, parse_uuid, pretty_table,
};

fn rows(items: &[Asset]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name.clone(),
                opt_str(&a.asset_type),
                fmt_money(&a.current_value, &a.currency),
                a.gain
                    .map(|g| fmt_money(&g, &a.currency))
                    .unwrap_or_default(),
                a.gain_percent
                    .map(|p| format!("{:.2}%", p))
                    .unwrap_or_default(),
            ]
        })
        .collect()
}

const HEADERS: [&str; 6] = ["Id", "Name", "Type", "Value", "Gain", "Gain %"];

pub fn handle(conn: &mut Connection, user: &User, m: &clap::ArgMatches) -> Result<()> {
    let json = json_flag(m);
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = NewAsset {
                name: arg(sub, "name")?.to_string(),
                asset_type: opt(sub, "type"),
                current_value: parse_decimal(arg(sub, "value")?)?,
                purchase_value: opt_decimal(sub, "purchase_value")?,
                purchase_date: opt(sub, "purchase_date")
                    .map(|d| parse_date(&d))
                    .transpose()?,
                currency: opt(sub, "currency").unwrap_or_else(|| user.currency.clone()),
                notes: opt(sub, "notes"),
            };
            let asset = assets::create(conn, user.id, &new)?;
            if !maybe_print_json(json, &asset)? {
                println!("Added asset '{}' ({})", asset.name, asset.id);
            }
        }
        Some(("list", _)) => {
            let items = assets::list(conn, user.id)?;
            if !maybe_print_json(json, &items)? {
                println!("{}", pretty_table(&HEADERS, rows(&items)));
            }
        }
        Some(("show", sub)) => {
            let asset = assets::get(conn, user.id, parse_uuid(arg(sub, "id")?)?)?;
            if !maybe_print_json(json, &asset)? {
                println!("{}", pretty_table(&HEADERS, rows(std::slice::from_ref(&asset))));
            }
        }
        Some(("update", sub)) => {
            let upd = AssetUpdate {
                name: opt(sub, "name"),
                current_value: opt_decimal(sub, "value")?,
                notes: opt(sub, "notes"),
            };
            let asset = assets::update(conn, user.id, parse_uuid(arg(sub, "id")?)?, &upd)?;
            if !maybe_print_json(json, &asset)? {
                println!("Updated asset '{}'", asset.name);
            }
        }
        Some(("rm", sub)) => {
            let id = parse_uuid(arg(sub, "id")?)?;
            assets::delete(conn, user.id, id)?;
            println!("Removed asset {}", id);
        }
        _ => {}
    }
    Ok(())
}
