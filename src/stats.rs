// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::TransactionType;
use crate::utils::{add_money, col_decimal, fmt_datetime, sub_money};

pub const TOP_MERCHANTS: usize = 5;
const UNKNOWN_MERCHANT: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    /// Signed sum of the amounts as stored.
    pub amount: Decimal,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantTotal {
    pub name: String,
    pub amount: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionStats {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_cash_flow: Decimal,
    pub by_category: Vec<CategoryTotal>,
    pub top_merchants: Vec<MerchantTotal>,
}

struct StatRow {
    kind: String,
    amount: Decimal,
    category: Option<String>,
    merchant: Option<String>,
}

/// Income, expenses, category totals and top merchants for `[from, to]`, both ends inclusive.
pub fn transaction_stats(
    conn: &Connection,
    user_id: Uuid,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<TransactionStats> {
    if from > to {
        return Err(Error::validation("date_from must not be after date_to"));
    }
    let mut stmt = conn.prepare(
        "SELECT t.transaction_type, t.amount, c.name, t.merchant_name
         FROM transactions t LEFT JOIN categories c ON t.category_id=c.id
         WHERE t.user_id=?1 AND t.transaction_date>=?2 AND t.transaction_date<=?3",
    )?;
    let rows = stmt.query_map(
        params![user_id.to_string(), fmt_datetime(&from), fmt_datetime(&to)],
        |r| {
            Ok(StatRow {
                kind: r.get(0)?,
                amount: col_decimal(r, 1)?,
                category: r.get(2)?,
                merchant: r.get(3)?,
            })
        },
    )?;

    let mut income = Decimal::ZERO;
    let mut debits = Decimal::ZERO;
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut merchants: BTreeMap<Option<String>, (Decimal, u64)> = BTreeMap::new();

    for row in rows {
        let row = row?;
        if let Some(cat) = row.category {
            let total = by_category.entry(cat).or_default();
            *total = add_money(*total, row.amount)?;
        }
        if row.kind == TransactionType::Credit.as_str() {
            income = add_money(income, row.amount)?;
        } else if row.kind == TransactionType::Debit.as_str() {
            debits = add_money(debits, row.amount)?;
            let slot = merchants.entry(row.merchant).or_default();
            slot.0 = add_money(slot.0, row.amount)?;
            slot.1 += 1;
        }
    }

    let total_expenses = debits.abs();

    // most negative total first; ties keep merchant order
    let mut ranked: Vec<_> = merchants.into_iter().collect();
    ranked.sort_by(|a, b| a.1.0.cmp(&b.1.0));
    let top_merchants = ranked
        .into_iter()
        .take(TOP_MERCHANTS)
        .map(|(name, (total, count))| MerchantTotal {
            name: name.unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()),
            amount: total.abs(),
            count,
        })
        .collect();

    Ok(TransactionStats {
        total_income: income,
        total_expenses,
        net_cash_flow: sub_money(income, total_expenses)?,
        by_category: by_category
            .into_iter()
            .map(|(category, amount)| CategoryTotal {
                category,
                amount,
                percent: 0.0,
            })
            .collect(),
        top_merchants,
    })
}
