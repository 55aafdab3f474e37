// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod balance;
pub mod billing;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod entitlement;
pub mod error;
pub mod identity;
pub mod insights;
pub mod ledger;
pub mod models;
pub mod portfolio;
pub mod stats;
pub mod utils;

pub use error::{Error, Result};
