// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use payfolio::billing::MockCheckout;
use payfolio::config::Config;
use payfolio::identity::{self, JwtIssuer};
use payfolio::insights::InsightPipeline;
use payfolio::models::User;
use payfolio::{cli, commands, db, utils};

fn acting_user(conn: &Connection, idp: &JwtIssuer, m: &clap::ArgMatches) -> Result<User> {
    let token = m
        .get_one::<String>("token")
        .context("Not signed in: pass --token or set PAYFOLIO_TOKEN (see `payfolio auth login`)")?;
    Ok(identity::current_user(conn, idp, token)?)
}

fn main() -> Result<()> {
    utils::init_tracing();
    let matches = cli::build_cli().get_matches();

    let config = Config::from_env()?;
    let mut conn = db::open_or_init(&config)?;
    let idp = JwtIssuer::new(&config);

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", config.db_path.display());
        }
        Some(("auth", sub)) => commands::auth::handle(&conn, &idp, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("billing", sub)) if sub.subcommand_name() == Some("webhook") => {
            if let Some(w) = sub.subcommand_matches("webhook") {
                commands::billing::webhook(w)?;
            }
        }
        Some((name, sub)) => {
            let user = acting_user(&conn, &idp, sub)?;
            match name {
                "user" => commands::users::handle(&mut conn, &user, sub)?,
                "account" => commands::accounts::handle(&mut conn, &user, sub)?,
                "tx" => commands::transactions::handle(&mut conn, &user, sub)?,
                "asset" => commands::assets::handle(&mut conn, &user, sub)?,
                "liability" => commands::liabilities::handle(&mut conn, &user, sub)?,
                "insight" => {
                    let pipeline = InsightPipeline::from_config(&config)?;
                    commands::insights::handle(&mut conn, &user, &pipeline, sub)?
                }
                "billing" => commands::billing::handle(&mut conn, &user, &MockCheckout, sub)?,
                "export" => commands::exporter::handle(&conn, &user, sub)?,
                _ => {}
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
