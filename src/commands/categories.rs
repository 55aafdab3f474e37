// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::json_flag;
use crate::ledger::categories;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json = json_flag(m);
    match m.subcommand() {
        Some(("list", _)) => {
            let cats = categories::list(conn)?;
            if !maybe_print_json(json, &cats)? {
                let rows = cats
                    .iter()
                    .map(|c| {
                        // children are indented under their parent
                        let name = if c.parent_id.is_some() {
                            format!("  {}", c.name)
                        } else {
                            c.name.clone()
                        };
                        vec![
                            c.id.to_string(),
                            name,
                            if c.is_income { "income".into() } else { String::new() },
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Id", "Name", ""], rows));
            }
        }
        Some(("types", _)) => {
            let types = categories::account_types(conn)?;
            if !maybe_print_json(json, &types)? {
                let rows = types
                    .iter()
                    .map(|t| {
                        vec![
                            t.id.to_string(),
                            t.name.clone(),
                            if t.is_asset { "asset" } else { "liability" }.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Id", "Name", "Kind"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
