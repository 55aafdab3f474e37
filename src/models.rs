// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
    /// Accepted and stored, but carries no balance effect.
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Transfer => "transfer",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "transfer" => Ok(Self::Transfer),
            other => Err(Error::validation(format!(
                "Unknown transaction type '{}' (use credit|debit|transfer)",
                other
            ))),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Manual,
    Linked,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Linked => "linked",
        }
    }
}

impl FromStr for ConnectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "linked" => Ok(Self::Linked),
            other => Err(Error::validation(format!(
                "Unknown connection type '{}' (use manual|linked)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub plan: String,
    pub currency: String,
    pub locale: String,
    pub theme: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub currency: Option<String>,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountType {
    pub id: i64,
    pub name: String,
    pub is_asset: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub is_income: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_type_id: Option<i64>,
    pub account_type: Option<String>,
    pub name: String,
    pub institution: Option<String>,
    pub current_balance: Decimal,
    pub currency: String,
    pub connection_type: ConnectionType,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_status: String,
    pub is_hidden: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub name: String,
    pub institution: Option<String>,
    /// Account type name; unknown names leave the account untyped.
    pub account_type: Option<String>,
    pub current_balance: Decimal,
    pub currency: String,
    pub connection_type: ConnectionType,
}

#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub institution: Option<String>,
    pub current_balance: Option<Decimal>,
    pub is_hidden: Option<bool>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountList {
    pub accounts: Vec<Account>,
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub message: String,
    pub last_synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub account_name: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub merchant_name: Option<String>,
    pub tags: Vec<String>,
    pub is_recurring: bool,
    pub transaction_date: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub merchant_name: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub is_recurring: bool,
    pub transaction_date: NaiveDateTime,
}

impl NewTransaction {
    pub fn new(
        account_id: Uuid,
        amount: Decimal,
        transaction_type: TransactionType,
        transaction_date: NaiveDateTime,
    ) -> Self {
        Self {
            account_id,
            amount,
            transaction_type,
            description: None,
            merchant_name: None,
            category_id: None,
            tags: Vec::new(),
            is_recurring: false,
            transaction_date,
        }
    }
}

/// Only descriptive fields are editable; amount and type are fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub merchant_name: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub account_id: Option<Uuid>,
    pub category_id: Option<i64>,
    pub transaction_type: Option<TransactionType>,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            account_id: None,
            category_id: None,
            transaction_type: None,
            date_from: None,
            date_to: None,
            limit: 50,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub asset_type: Option<String>,
    pub current_value: Decimal,
    pub purchase_value: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub currency: String,
    pub notes: Option<String>,
    pub gain: Option<Decimal>,
    pub gain_percent: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    pub name: String,
    pub asset_type: Option<String>,
    pub current_value: Decimal,
    pub purchase_value: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub currency: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub current_value: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liability {
    pub id: Uuid,
    pub user_id: Uuid,
    pub linked_account_id: Option<Uuid>,
    pub name: String,
    pub liability_type: Option<String>,
    pub principal_amount: Option<Decimal>,
    pub current_balance: Decimal,
    pub interest_rate: Option<Decimal>,
    pub currency: String,
    pub emi_amount: Option<Decimal>,
    pub emi_day: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub lender: Option<String>,
    pub notes: Option<String>,
    pub paid_percent: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewLiability {
    pub name: String,
    pub liability_type: Option<String>,
    pub linked_account_id: Option<Uuid>,
    pub current_balance: Decimal,
    pub principal_amount: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub currency: String,
    pub emi_amount: Option<Decimal>,
    pub emi_day: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub lender: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LiabilityUpdate {
    pub current_balance: Option<Decimal>,
    pub emi_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiabilityList {
    pub liabilities: Vec<Liability>,
    pub total_liability: Decimal,
    pub monthly_emi_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub user_id: Uuid,
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub priority: i64,
    pub data: Option<serde_json::Value>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub is_read: bool,
    pub is_dismissed: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightList {
    pub insights: Vec<Insight>,
    pub unread_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub status: String,
    pub billing_cycle: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub max_accounts: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetWorthSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub snapshot_date: DateTime<Utc>,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub net_worth: Decimal,
    pub breakdown: Option<serde_json::Value>,
}
