// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};

use super::or_not_found;
use crate::error::Result;
use crate::models::{AccountType, Category};

pub fn list(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, parent_id, is_income FROM categories ORDER BY COALESCE(parent_id, id), parent_id IS NOT NULL, name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            parent_id: r.get(2)?,
            is_income: r.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get(conn: &Connection, id: i64) -> Result<Category> {
    or_not_found(
        conn.query_row(
            "SELECT id, name, parent_id, is_income FROM categories WHERE id=?1",
            params![id],
            |r| {
                Ok(Category {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    parent_id: r.get(2)?,
                    is_income: r.get(3)?,
                })
            },
        ),
        "Category",
    )
}

pub fn account_types(conn: &Connection) -> Result<Vec<AccountType>> {
    let mut stmt = conn.prepare("SELECT id, name, is_asset FROM account_types ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok(AccountType {
            id: r.get(0)?,
            name: r.get(1)?,
            is_asset: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
