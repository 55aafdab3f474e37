// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::{arg, json_flag};
use crate::insights::InsightPipeline;
use crate::ledger::insights;
use crate::models::User;
use crate::utils::{maybe_print_json, parse_uuid, pretty_table};

pub fn handle(
    conn: &mut Connection,
    user: &User,
    pipeline: &InsightPipeline,
    m: &clap::ArgMatches,
) -> Result<()> {
    let json = json_flag(m);
    match m.subcommand() {
        Some(("list", sub)) => {
            let list = insights::list(conn, user.id, sub.get_flag("all"))?;
            if !maybe_print_json(json, &list)? {
                let rows = list
                    .insights
                    .iter()
                    .map(|i| {
                        vec![
                            i.id.to_string(),
                            i.priority.to_string(),
                            i.severity.clone(),
                            i.title.clone(),
                            i.description.clone(),
                            if i.is_read { String::new() } else { "new".into() },
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Priority", "Severity", "Title", "Description", ""],
                        rows
                    )
                );
                println!("{} unread", list.unread_count);
            }
        }
        Some(("read", sub)) => {
            insights::mark_read(conn, user.id, parse_uuid(arg(sub, "id")?)?)?;
            println!("Marked as read");
        }
        Some(("dismiss", sub)) => {
            insights::dismiss(conn, user.id, parse_uuid(arg(sub, "id")?)?)?;
            println!("Dismissed");
        }
        Some(("generate", _)) => {
            let outcome = pipeline.generate(conn, user.id)?;
            if !maybe_print_json(json, &outcome)? {
                match &outcome.error {
                    Some(err) => println!("{}: {}", outcome.message, err),
                    None => println!("{}", outcome.message),
                }
            }
        }
        _ => {}
    }
    Ok(())
}
