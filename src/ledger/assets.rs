// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use super::{now, or_not_found};
use crate::error::{Error, Result};
use crate::models::{Asset, AssetUpdate, NewAsset};
use crate::utils::{
    DATE_FMT, col_decimal, col_opt_date, col_opt_decimal, col_ts, col_uuid, fmt_ts, money,
    non_empty, normalize_currency, percent, validate_name,
};

const SELECT: &str = "SELECT id, user_id, name, asset_type, current_value, purchase_value,
        purchase_date, currency, notes, created_at, updated_at
    FROM assets";

fn from_row(r: &Row<'_>) -> rusqlite::Result<Asset> {
    let current_value = col_decimal(r, 4)?;
    let purchase_value = col_opt_decimal(r, 5)?;
    // unrepresentable gains are left unset
    let gain = purchase_value.and_then(|pv| current_value.checked_sub(pv));
    let gain_percent = gain.zip(purchase_value).map(|(g, pv)| percent(g, pv));
    Ok(Asset {
        id: col_uuid(r, 0)?,
        user_id: col_uuid(r, 1)?,
        name: r.get(2)?,
        asset_type: r.get(3)?,
        current_value,
        purchase_value,
        purchase_date: col_opt_date(r, 6)?,
        currency: r.get(7)?,
        notes: r.get(8)?,
        gain,
        gain_percent,
        created_at: col_ts(r, 9)?,
        updated_at: col_ts(r, 10)?,
    })
}

pub fn create(conn: &Connection, user_id: Uuid, new: &NewAsset) -> Result<Asset> {
    let name = validate_name("Asset name", &new.name, 100)?;
    let currency = normalize_currency(&new.currency)?;
    if new.current_value.is_sign_negative() {
        return Err(Error::validation("Asset value must not be negative"));
    }
    let id = Uuid::new_v4();
    let ts = fmt_ts(&now());
    conn.execute(
        "INSERT INTO assets(id, user_id, name, asset_type, current_value, purchase_value,
                            purchase_date, currency, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            id.to_string(),
            user_id.to_string(),
            name,
            non_empty(new.asset_type.clone()),
            money(new.current_value).to_string(),
            new.purchase_value.map(|v| money(v).to_string()),
            new.purchase_date.map(|d| d.format(DATE_FMT).to_string()),
            currency,
            non_empty(new.notes.clone()),
            ts
        ],
    )?;
    tracing::info!(user_id = %user_id, asset_id = %id, "created asset");
    get(conn, user_id, id)
}

pub fn get(conn: &Connection, user_id: Uuid, asset_id: Uuid) -> Result<Asset> {
    or_not_found(
        conn.query_row(
            &format!("{} WHERE id=?1 AND user_id=?2", SELECT),
            params![asset_id.to_string(), user_id.to_string()],
            from_row,
        ),
        "Asset",
    )
}

pub fn list(conn: &Connection, user_id: Uuid) -> Result<Vec<Asset>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE user_id=?1 ORDER BY created_at DESC, rowid DESC",
        SELECT
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn update(conn: &Connection, user_id: Uuid, asset_id: Uuid, upd: &AssetUpdate) -> Result<Asset> {
    let mut asset = get(conn, user_id, asset_id)?;
    if let Some(name) = &upd.name {
        asset.name = validate_name("Asset name", name, 100)?;
    }
    if let Some(v) = upd.current_value {
        if v.is_sign_negative() {
            return Err(Error::validation("Asset value must not be negative"));
        }
        asset.current_value = money(v);
    }
    if let Some(notes) = &upd.notes {
        asset.notes = non_empty(Some(notes.clone()));
    }
    conn.execute(
        "UPDATE assets SET name=?1, current_value=?2, notes=?3, updated_at=?4 WHERE id=?5 AND user_id=?6",
        params![
            asset.name,
            asset.current_value.to_string(),
            asset.notes,
            fmt_ts(&now()),
            asset_id.to_string(),
            user_id.to_string()
        ],
    )?;
    get(conn, user_id, asset_id)
}

pub fn delete(conn: &Connection, user_id: Uuid, asset_id: Uuid) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM assets WHERE id=?1 AND user_id=?2",
        params![asset_id.to_string(), user_id.to_string()],
    )?;
    if n == 0 {
        return Err(Error::NotFound("Asset"));
    }
    Ok(())
}
