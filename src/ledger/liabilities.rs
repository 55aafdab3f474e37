// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{now, or_not_found};
use crate::error::{Error, Result};
use crate::models::{Liability, LiabilityList, LiabilityUpdate, NewLiability};
use crate::utils::{
    DATE_FMT, add_money, col_decimal, col_opt_date, col_opt_decimal, col_opt_uuid, col_ts,
    col_uuid, fmt_ts, money, non_empty, normalize_currency, percent, validate_name,
};

const SELECT: &str = "SELECT id, user_id, linked_account_id, name, liability_type, principal_amount,
        current_balance, interest_rate, currency, emi_amount, emi_day, start_date, end_date,
        lender, notes, created_at, updated_at
    FROM liabilities";

fn from_row(r: &Row<'_>) -> rusqlite::Result<Liability> {
    let principal_amount = col_opt_decimal(r, 5)?;
    let current_balance = col_decimal(r, 6)?;
    let paid_percent = match principal_amount {
        Some(p) if p > Decimal::ZERO => p
            .checked_sub(current_balance)
            .map_or(0.0, |paid| percent(paid, p)),
        _ => 0.0,
    };
    Ok(Liability {
        id: col_uuid(r, 0)?,
        user_id: col_uuid(r, 1)?,
        linked_account_id: col_opt_uuid(r, 2)?,
        name: r.get(3)?,
        liability_type: r.get(4)?,
        principal_amount,
        current_balance,
        interest_rate: col_opt_decimal(r, 7)?,
        currency: r.get(8)?,
        emi_amount: col_opt_decimal(r, 9)?,
        emi_day: r.get(10)?,
        start_date: col_opt_date(r, 11)?,
        end_date: col_opt_date(r, 12)?,
        lender: r.get(13)?,
        notes: r.get(14)?,
        paid_percent,
        created_at: col_ts(r, 15)?,
        updated_at: col_ts(r, 16)?,
    })
}

fn check_owed(value: Decimal) -> Result<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::validation("Liability balance must not be negative"));
    }
    Ok(money(value))
}

pub fn create(conn: &Connection, user_id: Uuid, new: &NewLiability) -> Result<Liability> {
    let name = validate_name("Liability name", &new.name, 100)?;
    let currency = normalize_currency(&new.currency)?;
    let balance = check_owed(new.current_balance)?;
    if let Some(day) = new.emi_day {
        if !(1..=31).contains(&day) {
            return Err(Error::validation("EMI day must be between 1 and 31"));
        }
    }
    if let Some(rate) = new.interest_rate {
        if rate.is_sign_negative() || rate > Decimal::ONE_HUNDRED {
            return Err(Error::validation("Interest rate must be between 0 and 100"));
        }
    }
    if let Some(acct) = new.linked_account_id {
        // the link must point at one of the caller's own accounts
        crate::ledger::accounts::get(conn, user_id, acct)?;
    }

    let id = Uuid::new_v4();
    let ts = fmt_ts(&now());
    conn.execute(
        "INSERT INTO liabilities(id, user_id, linked_account_id, name, liability_type,
                                 principal_amount, current_balance, interest_rate, currency,
                                 emi_amount, emi_day, start_date, end_date, lender, notes,
                                 created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
        params![
            id.to_string(),
            user_id.to_string(),
            new.linked_account_id.map(|a| a.to_string()),
            name,
            non_empty(new.liability_type.clone()),
            new.principal_amount.map(|v| money(v).to_string()),
            balance.to_string(),
            new.interest_rate.map(|v| v.round_dp(2).to_string()),
            currency,
            new.emi_amount.map(|v| money(v).to_string()),
            new.emi_day,
            new.start_date.map(|d| d.format(DATE_FMT).to_string()),
            new.end_date.map(|d| d.format(DATE_FMT).to_string()),
            non_empty(new.lender.clone()),
            non_empty(new.notes.clone()),
            ts
        ],
    )?;
    tracing::info!(user_id = %user_id, liability_id = %id, "created liability");
    get(conn, user_id, id)
}

pub fn get(conn: &Connection, user_id: Uuid, liability_id: Uuid) -> Result<Liability> {
    or_not_found(
        conn.query_row(
            &format!("{} WHERE id=?1 AND user_id=?2", SELECT),
            params![liability_id.to_string(), user_id.to_string()],
            from_row,
        ),
        "Liability",
    )
}

/// Newest first, with the total owed and the sum of monthly EMIs.
pub fn list(conn: &Connection, user_id: Uuid) -> Result<LiabilityList> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE user_id=?1 ORDER BY created_at DESC, rowid DESC",
        SELECT
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], from_row)?;
    let mut liabilities = Vec::new();
    let mut total_liability = Decimal::ZERO;
    let mut monthly_emi_total = Decimal::ZERO;
    for row in rows {
        let l = row?;
        total_liability = add_money(total_liability, l.current_balance)?;
        if let Some(emi) = l.emi_amount {
            monthly_emi_total = add_money(monthly_emi_total, emi)?;
        }
        liabilities.push(l);
    }
    Ok(LiabilityList {
        liabilities,
        total_liability,
        monthly_emi_total,
    })
}

pub fn update(
    conn: &Connection,
    user_id: Uuid,
    liability_id: Uuid,
    upd: &LiabilityUpdate,
) -> Result<Liability> {
    let mut l = get(conn, user_id, liability_id)?;
    if let Some(bal) = upd.current_balance {
        l.current_balance = check_owed(bal)?;
    }
    if let Some(emi) = upd.emi_amount {
        l.emi_amount = Some(money(emi));
    }
    if let Some(notes) = &upd.notes {
        l.notes = non_empty(Some(notes.clone()));
    }
    conn.execute(
        "UPDATE liabilities SET current_balance=?1, emi_amount=?2, notes=?3, updated_at=?4
         WHERE id=?5 AND user_id=?6",
        params![
            l.current_balance.to_string(),
            l.emi_amount.map(|v| v.to_string()),
            l.notes,
            fmt_ts(&now()),
            liability_id.to_string(),
            user_id.to_string()
        ],
    )?;
    get(conn, user_id, liability_id)
}

pub fn delete(conn: &Connection, user_id: Uuid, liability_id: Uuid) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM liabilities WHERE id=?1 AND user_id=?2",
        params![liability_id.to_string(), user_id.to_string()],
    )?;
    if n == 0 {
        return Err(Error::NotFound("Liability"));
    }
    Ok(())
}
