//! Cached standings rows.
//!
//! Reads are public. Writes are `pub(crate)` and only called by the standings
//! engine, which always replaces a series' full row set inside one transaction.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::models::LeaderboardEntry;
use crate::errors::series_context;
use crate::rating::RankedStanding;

const ENTRY_COLUMNS: &str = "series_id, player_id, rank, rating, matches_played, matches_won, matches_lost, games_won, games_lost, updated_at";

fn parse_entry_row(row: &rusqlite::Row) -> rusqlite::Result<LeaderboardEntry> {
    Ok(LeaderboardEntry {
        series_id: row.get(0)?,
        player_id: row.get(1)?,
        rank: row.get(2)?,
        rating: row.get(3)?,
        matches_played: row.get(4)?,
        matches_won: row.get(5)?,
        matches_lost: row.get(6)?,
        games_won: row.get(7)?,
        games_lost: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// All rows for a series, best rank first.
#[cfg(test)]
pub(crate) fn find_by_series_ordered(conn: &Connection, series_id: &str) -> Result<Vec<LeaderboardEntry>> {
    let sql = format!(
        "SELECT {} FROM leaderboard WHERE series_id = ?1 ORDER BY rank ASC",
        ENTRY_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![series_id], parse_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| series_context("read leaderboard", series_id))?;

    Ok(rows)
}

/// Up to `limit` rows ranked strictly after `after_rank`.
pub fn find_page(
    conn: &Connection,
    series_id: &str,
    after_rank: i32,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>> {
    let sql = format!(
        "SELECT {} FROM leaderboard WHERE series_id = ?1 AND rank > ?2 ORDER BY rank ASC LIMIT ?3",
        ENTRY_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![series_id, after_rank, limit as i64], parse_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| series_context("read leaderboard page", series_id))?;

    Ok(rows)
}

/// Up to `limit` rows ranked strictly before `before_rank`, closest first
/// in the query and returned best rank first.
pub fn find_page_before(
    conn: &Connection,
    series_id: &str,
    before_rank: i32,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>> {
    let sql = format!(
        "SELECT {} FROM leaderboard WHERE series_id = ?1 AND rank < ?2 ORDER BY rank DESC LIMIT ?3",
        ENTRY_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query_map(params![series_id, before_rank, limit as i64], parse_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| series_context("read leaderboard page", series_id))?;
    rows.reverse();

    Ok(rows)
}

pub fn count_for_series(conn: &Connection, series_id: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM leaderboard WHERE series_id = ?1",
            params![series_id],
            |row| row.get(0),
        )
        .with_context(|| series_context("count leaderboard rows", series_id))?;
    Ok(count as usize)
}

pub fn last_updated(conn: &Connection, series_id: &str) -> Result<Option<NaiveDateTime>> {
    conn.query_row(
        "SELECT MAX(updated_at) FROM leaderboard WHERE series_id = ?1",
        params![series_id],
        |row| row.get(0),
    )
    .with_context(|| series_context("read leaderboard timestamp", series_id))
}

pub(crate) fn delete_all_for_series(conn: &Connection, series_id: &str) -> Result<usize> {
    conn.execute(
        "DELETE FROM leaderboard WHERE series_id = ?1",
        params![series_id],
    )
    .with_context(|| series_context("clear leaderboard", series_id))
}

pub(crate) fn insert_entries(
    conn: &Connection,
    series_id: &str,
    ranked: &[RankedStanding],
    updated_at: NaiveDateTime,
) -> Result<()> {
    let sql = format!(
        "INSERT INTO leaderboard ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        ENTRY_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    for entry in ranked {
        let standing = &entry.standing;
        let tally = &standing.tally;
        stmt.execute(params![
            series_id,
            standing.player_id,
            entry.rank,
            standing.rating,
            tally.matches_played,
            tally.matches_won,
            tally.matches_lost,
            tally.games_won,
            tally.games_lost,
            updated_at
        ])
        .with_context(|| {
            format!(
                "Failed to insert leaderboard entry for player {} in series {}",
                standing.player_id, series_id
            )
        })?;
    }

    Ok(())
}
