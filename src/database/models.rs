use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::rating::{LadderVariant, MatchResult, MatchTally, ScoringFormat};

#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub display_name: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct Series {
    pub id: String,
    pub name: String,
    pub format: ScoringFormat,
    pub ladder_variant: LadderVariant,
    /// Matches are best-of-this-many sets.
    pub sets_to_play: i32,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

pub const DEFAULT_SETS_TO_PLAY: i32 = 5;

// DTO for registering a series
#[derive(Debug, Clone)]
pub struct NewSeries {
    pub id: String,
    pub name: String,
    pub format: ScoringFormat,
    pub ladder_variant: LadderVariant,
    pub sets_to_play: i32,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
}

impl NewSeries {
    /// Best of five, classic ladder rules, no play window.
    pub fn new(id: impl Into<String>, name: impl Into<String>, format: ScoringFormat) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            format,
            ladder_variant: LadderVariant::default(),
            sets_to_play: DEFAULT_SETS_TO_PLAY,
            starts_at: None,
            ends_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: i64,
    pub series_id: String,
    pub player_a_id: String,
    pub player_b_id: String,
    pub score_a: i32,
    pub score_b: i32,
    pub played_at: NaiveDateTime,
}

impl From<&Match> for MatchResult {
    fn from(m: &Match) -> Self {
        MatchResult {
            id: m.id,
            player_a_id: m.player_a_id.clone(),
            player_b_id: m.player_b_id.clone(),
            score_a: m.score_a,
            score_b: m.score_b,
            played_at: m.played_at,
        }
    }
}

// DTO for inserting a match
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub series_id: String,
    pub player_a_id: String,
    pub player_b_id: String,
    pub score_a: i32,
    pub score_b: i32,
    pub played_at: NaiveDateTime,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct MatchUpdate {
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    pub played_at: Option<NaiveDateTime>,
}

impl MatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.score_a.is_none() && self.score_b.is_none() && self.played_at.is_none()
    }

    pub fn merged_onto(&self, current: &Match) -> Match {
        Match {
            score_a: self.score_a.unwrap_or(current.score_a),
            score_b: self.score_b.unwrap_or(current.score_b),
            played_at: self.played_at.unwrap_or(current.played_at),
            ..current.clone()
        }
    }
}

/// One cached leaderboard row. `rating` is the ELO number for open play and
/// the ladder position for ladders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub series_id: String,
    pub player_id: String,
    pub rank: i32,
    pub rating: i32,
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_lost: i32,
    pub games_won: i32,
    pub games_lost: i32,
    pub updated_at: NaiveDateTime,
}

impl LeaderboardEntry {
    pub fn tally(&self) -> MatchTally {
        MatchTally {
            matches_played: self.matches_played,
            matches_won: self.matches_won,
            matches_lost: self.matches_lost,
            games_won: self.games_won,
            games_lost: self.games_lost,
        }
    }
}

impl ToSql for ScoringFormat {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ScoringFormat {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for LadderVariant {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for LadderVariant {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
