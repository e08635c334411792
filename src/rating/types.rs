use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::StandingsError;

pub type PlayerId = String;
pub type MatchId = i64;
pub type RatingValue = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFormat {
    OpenPlay,
    Ladder,
}

impl ScoringFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringFormat::OpenPlay => "open_play",
            ScoringFormat::Ladder => "ladder",
        }
    }
}

impl fmt::Display for ScoringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringFormat {
    type Err = StandingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open_play" => Ok(ScoringFormat::OpenPlay),
            "ladder" => Ok(ScoringFormat::Ladder),
            other => Err(StandingsError::UnknownFormat(other.to_string())),
        }
    }
}

/// Penalty rule applied when a ladder defender beats the challenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderVariant {
    #[default]
    Classic,
    Aggressive,
}

impl LadderVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LadderVariant::Classic => "classic",
            LadderVariant::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for LadderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LadderVariant {
    type Err = StandingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(LadderVariant::Classic),
            "aggressive" => Ok(LadderVariant::Aggressive),
            other => Err(StandingsError::UnknownLadderVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesScoringContext {
    pub series_id: String,
    pub format: ScoringFormat,
    /// Only consulted when `format` is `Ladder`.
    pub ladder_variant: LadderVariant,
}

/// One match as seen by the replay: who played, the score, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub id: MatchId,
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    pub score_a: i32,
    pub score_b: i32,
    pub played_at: NaiveDateTime,
}

impl MatchResult {
    pub fn a_won(&self) -> bool {
        self.score_a > self.score_b
    }

    pub fn winner_id(&self) -> &PlayerId {
        if self.a_won() { &self.player_a_id } else { &self.player_b_id }
    }

    pub fn loser_id(&self) -> &PlayerId {
        if self.a_won() { &self.player_b_id } else { &self.player_a_id }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTally {
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_lost: i32,
    pub games_won: i32,
    pub games_lost: i32,
}

impl MatchTally {
    pub fn record(&mut self, games_for: i32, games_against: i32) {
        self.matches_played += 1;
        self.games_won += games_for;
        self.games_lost += games_against;
        if games_for > games_against {
            self.matches_won += 1;
        } else {
            self.matches_lost += 1;
        }
    }

    /// Match win percentage, 0 when nothing has been played.
    pub fn win_rate(&self) -> f64 {
        percentage(self.matches_won, self.matches_played)
    }

    pub fn game_win_rate(&self) -> f64 {
        percentage(self.games_won, self.games_won + self.games_lost)
    }
}

fn percentage(part: i32, total: i32) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// A player's final state after a replay. `rating` is an ELO number for open
/// play and the ladder position for ladders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub rating: RatingValue,
    pub tally: MatchTally,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedStanding {
    pub rank: i32,
    pub standing: PlayerStanding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingOrder {
    /// Larger rating ranks better (ELO).
    HighestFirst,
    /// Smaller rating ranks better (ladder position).
    LowestFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_round_trip_through_their_names() {
        for format in [ScoringFormat::OpenPlay, ScoringFormat::Ladder] {
            assert_eq!(format.as_str().parse::<ScoringFormat>().unwrap(), format);
        }
        assert_eq!(
            "swiss".parse::<ScoringFormat>(),
            Err(StandingsError::UnknownFormat("swiss".into()))
        );
        assert_eq!(
            "brutal".parse::<LadderVariant>(),
            Err(StandingsError::UnknownLadderVariant("brutal".into()))
        );
    }

    #[test]
    fn tally_tracks_matches_and_games() {
        let mut tally = MatchTally::default();
        tally.record(3, 1);
        tally.record(0, 3);

        assert_eq!(tally.matches_played, 2);
        assert_eq!(tally.matches_won, 1);
        assert_eq!(tally.matches_lost, 1);
        assert_eq!(tally.games_won, 3);
        assert_eq!(tally.games_lost, 4);
        assert_eq!(tally.win_rate(), 50.0);
        assert!((tally.game_win_rate() - 300.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn empty_tally_has_zero_rates() {
        let tally = MatchTally::default();
        assert_eq!(tally.win_rate(), 0.0);
        assert_eq!(tally.game_win_rate(), 0.0);
    }
}
