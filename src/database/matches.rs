use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Match, MatchUpdate, NewMatch};
use crate::errors::match_context;

const MATCH_COLUMNS: &str =
    "id, series_id, player_a_id, player_b_id, score_a, score_b, played_at";

pub fn insert_match(conn: &Connection, new_match: &NewMatch) -> Result<Match> {
    let sql = format!(
        "INSERT INTO matches (series_id, player_a_id, player_b_id, score_a, score_b, played_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {}",
        MATCH_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            new_match.series_id,
            new_match.player_a_id,
            new_match.player_b_id,
            new_match.score_a,
            new_match.score_b,
            new_match.played_at
        ],
        parse_match_row,
    )
    .context("Failed to insert match")
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        series_id: row.get(1)?,
        player_a_id: row.get(2)?,
        player_b_id: row.get(3)?,
        score_a: row.get(4)?,
        score_b: row.get(5)?,
        played_at: row.get(6)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Match>> {
    let sql = format!("SELECT {} FROM matches WHERE id = ?1", MATCH_COLUMNS);

    conn.query_row(&sql, params![id], parse_match_row)
        .optional()
        .with_context(|| match_context("query", id))
}

/// Every match of a series in replay order (`played_at`, then id).
pub fn list_chronological(conn: &Connection, series_id: &str) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {} FROM matches WHERE series_id = ?1 ORDER BY played_at ASC, id ASC",
        MATCH_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![series_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list matches chronologically")?;

    Ok(rows)
}

/// Up to `limit` matches of a series in replay order, starting after the
/// match `after_id` when given.
pub fn list_by_series(
    conn: &Connection,
    series_id: &str,
    after_id: Option<i64>,
    limit: usize,
) -> Result<Vec<Match>> {
    let rows = match after_id {
        Some(after_id) => {
            let sql = format!(
                "SELECT {} FROM matches WHERE series_id = ?1 AND (played_at, id) > (SELECT played_at, id FROM matches WHERE id = ?2) ORDER BY played_at ASC, id ASC LIMIT ?3",
                MATCH_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let found = stmt
                .query_map(params![series_id, after_id, limit as i64], parse_match_row)?
                .collect::<rusqlite::Result<Vec<_>>>();
            found
        }
        None => {
            let sql = format!(
                "SELECT {} FROM matches WHERE series_id = ?1 ORDER BY played_at ASC, id ASC LIMIT ?2",
                MATCH_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let found = stmt
                .query_map(params![series_id, limit as i64], parse_match_row)?
                .collect::<rusqlite::Result<Vec<_>>>();
            found
        }
    };

    rows.context("Failed to list matches for series")
}

/// Applies the non-empty fields of `update`; returns the stored row afterwards,
/// or `None` when the match does not exist.
pub fn update_match(conn: &Connection, id: i64, update: &MatchUpdate) -> Result<Option<Match>> {
    let sql = format!(
        "UPDATE matches SET score_a = COALESCE(?2, score_a), score_b = COALESCE(?3, score_b), played_at = COALESCE(?4, played_at) WHERE id = ?1 RETURNING {}",
        MATCH_COLUMNS
    );

    conn.query_row(
        &sql,
        params![id, update.score_a, update.score_b, update.played_at],
        parse_match_row,
    )
    .optional()
    .with_context(|| match_context("update", id))
}

pub fn set_played_at(conn: &Connection, id: i64, played_at: NaiveDateTime) -> Result<()> {
    conn.execute(
        "UPDATE matches SET played_at = ?2 WHERE id = ?1",
        params![id, played_at],
    )
    .with_context(|| match_context("re-time", id))
    .map(|_| ())
}

/// Returns whether a row was removed.
pub fn delete_match(conn: &Connection, id: i64) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM matches WHERE id = ?1", params![id])
        .with_context(|| match_context("delete", id))?;
    Ok(removed > 0)
}

pub fn count_by_series(conn: &Connection, series_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM matches WHERE series_id = ?1",
        params![series_id],
        |row| row.get(0),
    )
    .context("Failed to count matches for series")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::test_matches::at;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::database::setup::ensure_schema(&conn).unwrap();
        conn
    }

    fn new_match(series_id: &str, a: &str, b: &str, minutes: i64) -> NewMatch {
        NewMatch {
            series_id: series_id.to_string(),
            player_a_id: a.to_string(),
            player_b_id: b.to_string(),
            score_a: 3,
            score_b: 1,
            played_at: at(minutes),
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let conn = conn();
        let first = insert_match(&conn, &new_match("s1", "a", "b", 0)).unwrap();
        let second = insert_match(&conn, &new_match("s1", "a", "b", 0)).unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.played_at, at(0));
        assert_eq!(find_by_id(&conn, first.id).unwrap(), Some(first));
    }

    #[test]
    fn chronological_listing_breaks_timestamp_ties_by_id() {
        let conn = conn();
        let late = insert_match(&conn, &new_match("s1", "a", "b", 30)).unwrap();
        let tie_1 = insert_match(&conn, &new_match("s1", "b", "c", 10)).unwrap();
        let tie_2 = insert_match(&conn, &new_match("s1", "c", "a", 10)).unwrap();
        let early = insert_match(&conn, &new_match("s1", "a", "c", 5)).unwrap();
        insert_match(&conn, &new_match("other", "a", "b", 1)).unwrap();

        let ids: Vec<i64> = list_chronological(&conn, "s1")
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();

        assert_eq!(ids, vec![early.id, tie_1.id, tie_2.id, late.id]);
    }

    #[test]
    fn series_listing_pages_in_replay_order() {
        let conn = conn();
        let late = insert_match(&conn, &new_match("s1", "a", "b", 30)).unwrap();
        let tie_1 = insert_match(&conn, &new_match("s1", "b", "c", 10)).unwrap();
        let tie_2 = insert_match(&conn, &new_match("s1", "c", "a", 10)).unwrap();
        let early = insert_match(&conn, &new_match("s1", "a", "c", 5)).unwrap();
        insert_match(&conn, &new_match("other", "a", "b", 1)).unwrap();

        let ids = |after: Option<i64>, limit: usize| -> Vec<i64> {
            list_by_series(&conn, "s1", after, limit)
                .unwrap()
                .iter()
                .map(|m| m.id)
                .collect()
        };

        assert_eq!(ids(None, 2), vec![early.id, tie_1.id]);
        assert_eq!(ids(Some(tie_1.id), 2), vec![tie_2.id, late.id]);
        assert_eq!(ids(Some(late.id), 2), Vec::<i64>::new());
        assert_eq!(ids(None, 10).len(), 4);
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let conn = conn();
        let stored = insert_match(&conn, &new_match("s1", "a", "b", 0)).unwrap();

        let updated = update_match(
            &conn,
            stored.id,
            &MatchUpdate {
                score_b: Some(3),
                score_a: Some(0),
                played_at: None,
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.score_a, 0);
        assert_eq!(updated.score_b, 3);
        assert_eq!(updated.played_at, stored.played_at);
        assert_eq!(update_match(&conn, 999, &MatchUpdate::default()).unwrap(), None);
    }

    #[test]
    fn ties_are_rejected_by_the_store() {
        let conn = conn();
        let mut tied = new_match("s1", "a", "b", 0);
        tied.score_b = tied.score_a;

        assert!(insert_match(&conn, &tied).is_err());
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let conn = conn();
        let stored = insert_match(&conn, &new_match("s1", "a", "b", 0)).unwrap();

        assert!(delete_match(&conn, stored.id).unwrap());
        assert!(!delete_match(&conn, stored.id).unwrap());
        assert_eq!(count_by_series(&conn, "s1").unwrap(), 0);
    }
}
