// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::{arg, json_flag, opt};
use crate::identity::{self, AuthSession, IdentityProvider};
use crate::models::NewUser;
use crate::utils::maybe_print_json;

fn print_session(json: bool, session: &AuthSession) -> Result<()> {
    if !maybe_print_json(json, session)? {
        println!("Signed in as {} ({})", session.user.email, session.user.id);
        println!("export PAYFOLIO_TOKEN={}", session.tokens.access_token);
        println!("refresh token: {}", session.tokens.refresh_token);
    }
    Ok(())
}

pub fn handle(conn: &Connection, idp: &dyn IdentityProvider, m: &clap::ArgMatches) -> Result<()> {
    let json = json_flag(m);
    match m.subcommand() {
        Some(("register", sub)) => {
            let new = NewUser {
                email: arg(sub, "email")?.to_string(),
                password: arg(sub, "password")?.to_string(),
                full_name: opt(sub, "name"),
            };
            let session = identity::register(conn, idp, &new)?;
            print_session(json, &session)?;
        }
        Some(("login", sub)) => {
            let session = identity::login(conn, idp, arg(sub, "email")?, arg(sub, "password")?)?;
            print_session(json, &session)?;
        }
        Some(("refresh", sub)) => {
            let pair = identity::refresh(conn, idp, arg(sub, "refresh_token")?)?;
            if !maybe_print_json(json, &pair)? {
                println!("export PAYFOLIO_TOKEN={}", pair.access_token);
                println!("refresh token: {}", pair.refresh_token);
            }
        }
        Some(("whoami", _)) => {
            let token = opt(m, "token").context("No --token given and PAYFOLIO_TOKEN is unset")?;
            let user = identity::current_user(conn, idp, &token)?;
            if !maybe_print_json(json, &user)? {
                println!("{} ({})", user.email, user.id);
            }
        }
        _ => {}
    }
    Ok(())
}
