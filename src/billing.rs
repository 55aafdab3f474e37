// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Plan checkout and subscription status. Payment providers are not called;
//! [`MockCheckout`] hands back a deterministic session.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Pro,
    Business,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Stripe,
    Razorpay,
}

impl FromStr for Plan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pro" => Ok(Self::Pro),
            "business" => Ok(Self::Business),
            other => Err(Error::validation(format!("Invalid plan '{}' (use pro|business)", other))),
        }
    }
}

impl FromStr for BillingCycle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::validation(format!(
                "Invalid billing cycle '{}' (use monthly|yearly)",
                other
            ))),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stripe" => Ok(Self::Stripe),
            "razorpay" => Ok(Self::Razorpay),
            other => Err(Error::validation(format!("Invalid provider '{}'", other))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stripe => "stripe",
            Self::Razorpay => "razorpay",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub plan: Plan,
    pub billing_cycle: BillingCycle,
    pub provider: Provider,
}

impl CheckoutRequest {
    /// Parses the three user-supplied fields; any unknown value is a validation error.
    pub fn parse(plan: &str, billing_cycle: &str, provider: &str) -> Result<Self> {
        Ok(Self {
            plan: plan.parse()?,
            billing_cycle: billing_cycle.parse()?,
            provider: provider.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
    pub session_id: String,
}

pub trait BillingProvider {
    fn checkout(&self, user_id: Uuid, req: &CheckoutRequest) -> Result<CheckoutSession>;
}

/// Returns a fixed session on the chosen provider's checkout host.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCheckout;

impl BillingProvider for MockCheckout {
    fn checkout(&self, user_id: Uuid, req: &CheckoutRequest) -> Result<CheckoutSession> {
        tracing::info!(
            user_id = %user_id,
            plan = ?req.plan,
            cycle = ?req.billing_cycle,
            provider = %req.provider,
            "mock checkout session"
        );
        Ok(CheckoutSession {
            checkout_url: format!("https://checkout.{}.com/pay/mock_session_id", req.provider),
            session_id: "sess_mock_123456789".into(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub plan: String,
    pub status: String,
    pub billing_cycle: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub max_accounts: i64,
}

pub fn subscription(conn: &Connection, user_id: Uuid) -> Result<SubscriptionView> {
    let sub = ledger::subscriptions::get_or_create_default(conn, user_id)?;
    Ok(SubscriptionView {
        plan: sub.plan,
        status: sub.status,
        billing_cycle: sub.billing_cycle,
        current_period_end: sub.current_period_end,
        max_accounts: sub.max_accounts,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// Payment events are acknowledged and not processed.
pub fn acknowledge_webhook(payload: &str) -> WebhookAck {
    tracing::debug!(bytes = payload.len(), "billing webhook received");
    WebhookAck { status: "received" }
}
