// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Generated insights: snapshot the user's recent activity, ask a text
//! completion service for advice, parse the reply and store it.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write as _;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ledger::{self, insights::InsightDraft};
use crate::models::{Account, Transaction};
use crate::utils::{fmt_datetime, http_client};

pub const RECENT_TRANSACTIONS: u32 = 20;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json|JSON)?").unwrap());

/// Anything that turns a prompt into text.
pub trait TextCompletion {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Google Gemini over its REST `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        match &config.gemini_api_key {
            Some(key) => Ok(Some(Self::new(key, &config.gemini_model, config.http_timeout)?)),
            None => Ok(None),
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl TextCompletion for GeminiClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let resp = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?
            .error_for_status()?;
        let parsed: GenerateResponse = resp.json()?;
        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect();
        if text.trim().is_empty() {
            return Err(Error::upstream("empty completion"));
        }
        Ok(text)
    }
}

fn default_type() -> String {
    "general".into()
}

fn default_title() -> String {
    "Financial Insight".into()
}

fn default_severity() -> String {
    "info".into()
}

fn default_priority() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
struct RawInsight {
    #[serde(rename = "type", default = "default_type")]
    insight_type: String,
    #[serde(default = "default_title")]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_severity")]
    severity: String,
    #[serde(default = "default_priority")]
    priority: i64,
}

/// Parses a completion into drafts. Markdown code fences are ignored and
/// missing fields take their defaults.
pub fn parse_insights(text: &str) -> Result<Vec<InsightDraft>> {
    let cleaned = FENCE_RE.replace_all(text, "");
    let raw: Vec<RawInsight> = serde_json::from_str(cleaned.trim())?;
    Ok(raw
        .into_iter()
        .map(|r| InsightDraft {
            insight_type: r.insight_type,
            title: r.title,
            description: r.description,
            severity: r.severity,
            priority: r.priority,
        })
        .collect())
}

pub fn build_prompt(accounts: &[Account], recent: &[Transaction]) -> String {
    let mut data = format!("User has {} accounts. Recent transactions:\n", accounts.len());
    for t in recent {
        let _ = writeln!(
            data,
            "- {}: {} ({} {})",
            fmt_datetime(&t.transaction_date),
            t.merchant_name.as_deref().unwrap_or("Unknown"),
            t.amount,
            t.currency
        );
    }
    format!(
        r#"Analyze the following financial data for a user and generate 1 or 2 distinct, actionable insights. Reply with JSON only.

Data:
{data}
Output format, a list of objects:
[
  {{
    "type": "spending_alert",
    "title": "High spending at Merchant",
    "description": "You spent X amount at Merchant this week, which is Y% higher than usual.",
    "severity": "warning",
    "priority": 7
  }}
]
"#
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    pub message: String,
    pub generated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationOutcome {
    fn failed(err: &Error) -> Self {
        Self {
            message: "Failed to generate insights".into(),
            generated: 0,
            error: Some(err.to_string()),
        }
    }
}

pub struct InsightPipeline {
    completion: Option<Box<dyn TextCompletion>>,
}

impl InsightPipeline {
    pub fn new(completion: Option<Box<dyn TextCompletion>>) -> Self {
        Self { completion }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GeminiClient::from_config(config)?;
        Ok(Self::new(
            client.map(|c| Box::new(c) as Box<dyn TextCompletion>),
        ))
    }

    /// Runs one generation round for the user.
    ///
    /// Only a missing completion service or a store failure is an `Err`;
    /// completion and parse failures come back as a failed outcome.
    pub fn generate(&self, conn: &mut Connection, user_id: Uuid) -> Result<GenerationOutcome> {
        let completion = self
            .completion
            .as_ref()
            .ok_or_else(|| Error::DependencyUnavailable("AI service not configured".into()))?;

        let recent = ledger::transactions::recent(conn, user_id, RECENT_TRANSACTIONS)?;
        let accounts = ledger::accounts::list(conn, user_id, true)?.accounts;
        if recent.is_empty() && accounts.is_empty() {
            return Ok(GenerationOutcome {
                message: "Not enough data to generate insights".into(),
                generated: 0,
                error: None,
            });
        }

        let prompt = build_prompt(&accounts, &recent);
        let drafts = match completion.complete(&prompt).and_then(|t| parse_insights(&t)) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "insight generation failed");
                return Ok(GenerationOutcome::failed(&e));
            }
        };

        let ids = ledger::insights::insert_drafts(conn, user_id, &drafts)?;
        tracing::info!(user_id = %user_id, generated = ids.len(), "generated insights");
        Ok(GenerationOutcome {
            message: format!("Generated {} insights", ids.len()),
            generated: ids.len(),
            error: None,
        })
    }
}
