use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::models::Player;

pub fn upsert_player(conn: &Connection, id: &str, display_name: &str) -> Result<Player> {
    let sql = "INSERT INTO players (id, display_name) VALUES (?1, ?2) ON CONFLICT(id) DO UPDATE SET display_name = excluded.display_name RETURNING id, display_name, created_at";

    conn.query_row(sql, params![id, display_name], parse_player_row)
        .context("Failed to upsert player")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        display_name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Player>> {
    let sql = "SELECT id, display_name, created_at FROM players WHERE id = ?1";

    conn.query_row(sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

/// Batch lookup; ids without a row are simply absent from the map.
pub fn find_by_ids(conn: &Connection, ids: &[String]) -> Result<HashMap<String, Player>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT id, display_name, created_at FROM players WHERE id IN ({})",
        placeholders
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to batch query players")?;

    Ok(rows.into_iter().map(|p| (p.id.clone(), p)).collect())
}

pub fn delete_player(conn: &Connection, id: &str) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM players WHERE id = ?1", params![id])
        .context("Failed to delete player")?;
    Ok(removed > 0)
}
