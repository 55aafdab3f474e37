// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::{arg, json_flag};
use crate::billing::{BillingProvider, CheckoutRequest, acknowledge_webhook, subscription};
use crate::models::User;
use crate::utils::{maybe_print_json, pretty_table};

/// Webhooks arrive from the provider, not from a signed-in user.
pub fn webhook(m: &clap::ArgMatches) -> Result<()> {
    let ack = acknowledge_webhook(arg(m, "payload")?);
    println!("{}", serde_json::to_string(&ack)?);
    Ok(())
}

pub fn handle(
    conn: &mut Connection,
    user: &User,
    provider: &dyn BillingProvider,
    m: &clap::ArgMatches,
) -> Result<()> {
    let json = json_flag(m);
    match m.subcommand() {
        Some(("status", _)) => {
            let sub = subscription(conn, user.id)?;
            if !maybe_print_json(json, &sub)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Plan", "Status", "Cycle", "Period end", "Max accounts"],
                        vec![vec![
                            sub.plan.clone(),
                            sub.status.clone(),
                            sub.billing_cycle.clone(),
                            sub.current_period_end
                                .map(|d| d.date_naive().to_string())
                                .unwrap_or_default(),
                            sub.max_accounts.to_string(),
                        ]],
                    )
                );
            }
        }
        Some(("checkout", sub)) => {
            let req = CheckoutRequest::parse(
                arg(sub, "plan")?,
                arg(sub, "cycle")?,
                arg(sub, "provider")?,
            )?;
            let session = provider.checkout(user.id, &req)?;
            if !maybe_print_json(json, &session)? {
                println!("Continue at {}", session.checkout_url);
            }
        }
        _ => {}
    }
    Ok(())
}
