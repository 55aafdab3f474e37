// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error taxonomy shared by the store, the engines and the collaborators.
//!
//! A missing row and a row owned by somebody else produce the same
//! [`Error::NotFound`], so callers cannot tell foreign ids from missing ones.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub const ACCOUNT_LIMIT_EXCEEDED: &str = "ACCOUNT_LIMIT_EXCEEDED";

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Plan limit reached. `code` is stable for machine consumers.
    #[error("{message} ({code})")]
    Entitlement {
        code: &'static str,
        message: String,
        upgrade_url: String,
    },

    #[error("Service unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Upstream service failed: {0}")]
    Upstream(String),

    #[error("Corrupt stored value: {0}")]
    Corrupt(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn account_limit() -> Self {
        Self::Entitlement {
            code: ACCOUNT_LIMIT_EXCEEDED,
            message: "You've reached your account limit. Upgrade to add more accounts.".into(),
            upgrade_url: "/billing/checkout?plan=pro".into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}
