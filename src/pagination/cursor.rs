//! Opaque leaderboard cursors. A forward cursor names the last rank already
//! served, a backward cursor the first one.

use crate::errors::StandingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    After(i32),
    Before(i32),
}

const AFTER: &str = "after:";
const BEFORE: &str = "before:";

pub fn encode_cursor(cursor: PageCursor) -> String {
    match cursor {
        PageCursor::After(rank) => format!("{}{}", AFTER, rank),
        PageCursor::Before(rank) => format!("{}{}", BEFORE, rank),
    }
}

pub fn decode_cursor(cursor: &str) -> Result<PageCursor, StandingsError> {
    let parse = |rank: &str| rank.parse::<i32>().ok().filter(|rank| *rank >= 1);

    let decoded = if let Some(rank) = cursor.strip_prefix(AFTER) {
        parse(rank).map(PageCursor::After)
    } else if let Some(rank) = cursor.strip_prefix(BEFORE) {
        parse(rank).map(PageCursor::Before)
    } else {
        None
    };
    decoded.ok_or_else(|| StandingsError::InvalidCursor(cursor.to_string()))
}
