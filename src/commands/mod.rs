// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod assets;
pub mod auth;
pub mod billing;
pub mod categories;
pub mod exporter;
pub mod insights;
pub mod liabilities;
pub mod transactions;
pub mod users;

use anyhow::{Context, Result};
use clap::ArgMatches;
use rust_decimal::Decimal;

use crate::utils::parse_decimal;

/// A required argument; clap has already enforced presence.
pub(crate) fn arg<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing --{}", name))
}

pub(crate) fn opt(m: &ArgMatches, name: &str) -> Option<String> {
    m.get_one::<String>(name).cloned()
}

pub(crate) fn opt_decimal(m: &ArgMatches, name: &str) -> Result<Option<Decimal>> {
    opt(m, name).map(|s| parse_decimal(&s)).transpose()
}

pub(crate) fn json_flag(m: &ArgMatches) -> bool {
    m.try_get_one::<bool>("json")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}
