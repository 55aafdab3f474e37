// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, TransactionBehavior, params};
use uuid::Uuid;

use super::{now, or_not_found};
use crate::error::{Error, Result};
use crate::models::{Insight, InsightList};
use crate::utils::{col_json, col_opt_ts, col_ts, col_uuid, fmt_ts};

const SELECT: &str = "SELECT id, user_id, insight_type, title, description, severity, priority,
        data, cta_text, cta_link, is_read, is_dismissed, valid_from, valid_until, created_at
    FROM insights";

/// An insight as produced by the pipeline, before it has an id or state.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightDraft {
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub priority: i64,
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Insight> {
    Ok(Insight {
        id: col_uuid(r, 0)?,
        user_id: col_uuid(r, 1)?,
        insight_type: r.get(2)?,
        title: r.get(3)?,
        description: r.get(4)?,
        severity: r.get(5)?,
        priority: r.get(6)?,
        data: col_json(r, 7)?,
        cta_text: r.get(8)?,
        cta_link: r.get(9)?,
        is_read: r.get(10)?,
        is_dismissed: r.get(11)?,
        valid_from: col_ts(r, 12)?,
        valid_until: col_opt_ts(r, 13)?,
        created_at: col_ts(r, 14)?,
    })
}

pub fn get(conn: &Connection, user_id: Uuid, insight_id: Uuid) -> Result<Insight> {
    or_not_found(
        conn.query_row(
            &format!("{} WHERE id=?1 AND user_id=?2", SELECT),
            params![insight_id.to_string(), user_id.to_string()],
            from_row,
        ),
        "Insight",
    )
}

/// Highest priority first, newest first within a priority.
pub fn list(conn: &Connection, user_id: Uuid, include_dismissed: bool) -> Result<InsightList> {
    let mut sql = format!("{} WHERE user_id=?1", SELECT);
    if !include_dismissed {
        sql.push_str(" AND is_dismissed=0");
    }
    sql.push_str(" ORDER BY priority DESC, created_at DESC, rowid DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id.to_string()], from_row)?;
    let mut insights = Vec::new();
    for row in rows {
        insights.push(row?);
    }
    let unread_count = insights.iter().filter(|i| !i.is_read).count();
    Ok(InsightList {
        insights,
        unread_count,
    })
}

fn set_flag(conn: &Connection, user_id: Uuid, insight_id: Uuid, column: &str) -> Result<()> {
    let n = conn.execute(
        &format!("UPDATE insights SET {}=1 WHERE id=?1 AND user_id=?2", column),
        params![insight_id.to_string(), user_id.to_string()],
    )?;
    if n == 0 {
        return Err(Error::NotFound("Insight"));
    }
    Ok(())
}

pub fn mark_read(conn: &Connection, user_id: Uuid, insight_id: Uuid) -> Result<()> {
    set_flag(conn, user_id, insight_id, "is_read")
}

pub fn dismiss(conn: &Connection, user_id: Uuid, insight_id: Uuid) -> Result<()> {
    set_flag(conn, user_id, insight_id, "is_dismissed")?;
    tracing::debug!(user_id = %user_id, insight_id = %insight_id, "dismissed insight");
    Ok(())
}

/// Stores a batch of drafts as unread insights; all or nothing.
pub fn insert_drafts(
    conn: &mut Connection,
    user_id: Uuid,
    drafts: &[InsightDraft],
) -> Result<Vec<Uuid>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let ts = fmt_ts(&now());
    let mut ids = Vec::with_capacity(drafts.len());
    {
        let mut stmt = tx.prepare(
            "INSERT INTO insights(id, user_id, insight_type, title, description, severity,
                                  priority, valid_from, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        )?;
        for d in drafts {
            let id = Uuid::new_v4();
            stmt.execute(params![
                id.to_string(),
                user_id.to_string(),
                d.insight_type,
                d.title,
                d.description,
                d.severity,
                d.priority,
                ts
            ])?;
            ids.push(id);
        }
    }
    tx.commit()?;
    Ok(ids)
}
