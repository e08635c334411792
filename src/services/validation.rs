//! Checks run by the match write triggers before anything is stored.

use chrono::NaiveDateTime;

use crate::database::{Match, NewMatch, Series};
use crate::errors::ValidationError;

pub fn validate_new_match(new_match: &NewMatch) -> Result<(), ValidationError> {
    if new_match.series_id.trim().is_empty() {
        return Err(ValidationError::RequiredField("series_id"));
    }
    if new_match.player_a_id.trim().is_empty() {
        return Err(ValidationError::RequiredField("player_a_id"));
    }
    if new_match.player_b_id.trim().is_empty() {
        return Err(ValidationError::RequiredField("player_b_id"));
    }
    if new_match.player_a_id == new_match.player_b_id {
        return Err(ValidationError::SamePlayer);
    }
    Ok(())
}

/// Set counts of a best-of-`sets_to_play` match: the winner has exactly
/// `(sets_to_play + 1) / 2` sets and the loser fewer.
pub fn validate_scores(score_a: i32, score_b: i32, sets_to_play: i32) -> Result<(), ValidationError> {
    if score_a < 0 || score_b < 0 {
        return Err(ValidationError::NegativeScore);
    }
    if score_a == score_b {
        return Err(ValidationError::TiedScore);
    }

    let required = (sets_to_play + 1) / 2;
    if score_a < required && score_b < required {
        return Err(ValidationError::NoWinner { sets_to_play });
    }
    if score_a > required || score_b > required {
        return Err(ValidationError::ScoreInvalid);
    }
    Ok(())
}

/// A series window is inclusive on whole days; a missing bound is open.
pub fn validate_within_series_window(
    series: &Series,
    played_at: NaiveDateTime,
) -> Result<(), ValidationError> {
    let day = played_at.date();
    let too_early = series.starts_at.is_some_and(|start| day < start.date());
    let too_late = series.ends_at.is_some_and(|end| day > end.date());

    if too_early || too_late {
        let bound = |value: Option<NaiveDateTime>| {
            value.map_or_else(|| "open".to_string(), |v| v.date().to_string())
        };
        return Err(ValidationError::OutsideSeriesWindow {
            played_at: played_at.to_string(),
            starts_at: bound(series.starts_at),
            ends_at: bound(series.ends_at),
        });
    }
    Ok(())
}

/// Matches being reordered must share one series and one calendar day.
pub fn validate_reorder(matches: &[Match]) -> Result<(), ValidationError> {
    let Some(first) = matches.first() else {
        return Ok(());
    };
    if matches.iter().any(|m| m.series_id != first.series_id) {
        return Err(ValidationError::ReorderSpansSeries);
    }
    let day = first.played_at.date();
    if matches.iter().any(|m| m.played_at.date() != day) {
        return Err(ValidationError::ReorderSpansDays);
    }
    Ok(())
}
