use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{NewSeries, Series};

const SERIES_COLUMNS: &str =
    "id, name, format, ladder_variant, sets_to_play, starts_at, ends_at, created_at";

pub fn insert_series(conn: &Connection, series: &NewSeries) -> Result<Series> {
    let sql = format!(
        "INSERT INTO series (id, name, format, ladder_variant, sets_to_play, starts_at, ends_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {}",
        SERIES_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            series.id,
            series.name,
            series.format,
            series.ladder_variant,
            series.sets_to_play,
            series.starts_at,
            series.ends_at
        ],
        parse_series_row,
    )
    .with_context(|| format!("Failed to insert series {}", series.id))
}

fn parse_series_row(row: &rusqlite::Row) -> rusqlite::Result<Series> {
    Ok(Series {
        id: row.get(0)?,
        name: row.get(1)?,
        format: row.get(2)?,
        ladder_variant: row.get(3)?,
        sets_to_play: row.get(4)?,
        starts_at: row.get(5)?,
        ends_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Series>> {
    let sql = format!("SELECT {} FROM series WHERE id = ?1", SERIES_COLUMNS);

    conn.query_row(&sql, params![id], parse_series_row)
        .optional()
        .context("Failed to query series by id")
}
