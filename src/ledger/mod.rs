// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user persistence for every entity.
//!
//! Every read and write takes the acting user's id and filters on it. A row
//! that exists but belongs to another user is reported exactly like a row
//! that does not exist.

pub mod accounts;
pub mod assets;
pub mod categories;
pub mod insights;
pub mod liabilities;
pub mod net_worth;
pub mod subscriptions;
pub mod transactions;
pub mod users;

use chrono::{DateTime, Utc};

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Maps "no rows" to the entity's not-found error and passes everything else through.
pub(crate) fn or_not_found<T>(
    res: rusqlite::Result<T>,
    entity: &'static str,
) -> crate::Result<T> {
    match res {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(crate::Error::NotFound(entity)),
        Err(e) => Err(e.into()),
    }
}
