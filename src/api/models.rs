use chrono::NaiveDateTime;
use serde::Serialize;

use crate::database::{LeaderboardEntry, Match};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardItem {
    pub rank: i32,
    pub player_id: String,
    pub player_name: String,
    /// ELO rating for open play, ladder position for ladders.
    pub rating: i32,
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_lost: i32,
    pub games_won: i32,
    pub games_lost: i32,
    pub win_rate: f64,
    pub game_win_rate: f64,
}

impl LeaderboardItem {
    pub fn from_entry(entry: LeaderboardEntry, player_name: String) -> Self {
        let tally = entry.tally();
        Self {
            win_rate: tally.win_rate(),
            game_win_rate: tally.game_win_rate(),
            rank: entry.rank,
            player_id: entry.player_id,
            player_name,
            rating: entry.rating,
            matches_played: entry.matches_played,
            matches_won: entry.matches_won,
            matches_lost: entry.matches_lost,
            games_won: entry.games_won,
            games_lost: entry.games_lost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    pub series_id: String,
    pub entries: Vec<LeaderboardItem>,
    pub next_cursor: Option<String>,
    pub previous_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_players: usize,
    pub last_updated: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: i64,
    pub series_id: String,
    pub player_a_id: String,
    pub player_a_name: String,
    pub player_b_id: String,
    pub player_b_name: String,
    pub score_a: i32,
    pub score_b: i32,
    pub played_at: NaiveDateTime,
}

impl MatchView {
    pub fn from_match(m: Match, player_a_name: String, player_b_name: String) -> Self {
        Self {
            id: m.id,
            series_id: m.series_id,
            player_a_id: m.player_a_id,
            player_a_name,
            player_b_id: m.player_b_id,
            player_b_name,
            score_a: m.score_a,
            score_b: m.score_b,
            played_at: m.played_at,
        }
    }
}

/// One page of a series' matches in replay order. `next_after` is the id to
/// pass as `after` for the following page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListPage {
    pub series_id: String,
    pub items: Vec<MatchView>,
    pub next_after: Option<i64>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_matches: usize,
}
