use thiserror::Error;

/// Domain failures surfaced by the standings engine and its readers.
///
/// These travel inside `anyhow::Error`; callers that need to branch on them
/// use `err.downcast_ref::<StandingsError>()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StandingsError {
    #[error("SERIES_NOT_FOUND: {0}")]
    SeriesNotFound(String),

    #[error("MATCH_NOT_FOUND: {0}")]
    MatchNotFound(i64),

    #[error("PLAYER_NOT_FOUND: {0}")]
    PlayerNotFound(String),

    #[error("INVALID_CURSOR: {0}")]
    InvalidCursor(String),

    #[error("UNKNOWN_SERIES_FORMAT: {0}")]
    UnknownFormat(String),

    #[error("UNKNOWN_LADDER_VARIANT: {0}")]
    UnknownLadderVariant(String),

    #[error("INCONSISTENT_RANKS: ranks for series {series_id} are not 1..={expected}")]
    InconsistentRanks { series_id: String, expected: usize },
}

/// Rejections raised by the match write triggers before anything is stored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("VALIDATION_REQUIRED: {0}")]
    RequiredField(&'static str),

    #[error("VALIDATION_SAME_PLAYER")]
    SamePlayer,

    #[error("VALIDATION_SCORE_TIE")]
    TiedScore,

    #[error("VALIDATION_SCORE_NEGATIVE")]
    NegativeScore,

    /// Neither side reached the sets needed to win a best-of-N match.
    #[error("{}", best_of_code(*sets_to_play))]
    NoWinner { sets_to_play: i32 },

    /// A side won more sets than the format allows.
    #[error("VALIDATION_SCORE_INVALID")]
    ScoreInvalid,

    #[error("VALIDATION_OUTSIDE_SERIES_WINDOW: {played_at} is not within {starts_at}..{ends_at}")]
    OutsideSeriesWindow {
        played_at: String,
        starts_at: String,
        ends_at: String,
    },

    #[error("VALIDATION_REORDER_SPANS_DAYS")]
    ReorderSpansDays,

    #[error("VALIDATION_REORDER_SPANS_SERIES")]
    ReorderSpansSeries,
}

fn best_of_code(sets_to_play: i32) -> String {
    match sets_to_play {
        3 => "VALIDATION_BEST_OF_THREE".to_string(),
        5 => "VALIDATION_BEST_OF_FIVE".to_string(),
        7 => "VALIDATION_BEST_OF_SEVEN".to_string(),
        n => format!("VALIDATION_BEST_OF_{}", n),
    }
}

/// Context for failures while talking to a series' rows
pub fn series_context(operation: &str, series_id: &str) -> String {
    format!("Failed to {} for series {}", operation, series_id)
}

/// Context for failures while talking to a single match row
pub fn match_context(operation: &str, match_id: i64) -> String {
    format!("Failed to {} match {}", operation, match_id)
}

/// True when `err` carries the given domain error anywhere in its chain.
pub fn is_standings_error(err: &anyhow::Error, expected: &StandingsError) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<StandingsError>())
        .any(|found| found == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            StandingsError::SeriesNotFound("s1".into()).to_string(),
            "SERIES_NOT_FOUND: s1"
        );
        assert_eq!(
            StandingsError::PlayerNotFound("p1".into()).to_string(),
            "PLAYER_NOT_FOUND: p1"
        );
        assert_eq!(ValidationError::SamePlayer.to_string(), "VALIDATION_SAME_PLAYER");
        assert_eq!(
            ValidationError::NoWinner { sets_to_play: 5 }.to_string(),
            "VALIDATION_BEST_OF_FIVE"
        );
        assert_eq!(
            ValidationError::NoWinner { sets_to_play: 3 }.to_string(),
            "VALIDATION_BEST_OF_THREE"
        );
        assert_eq!(ValidationError::ScoreInvalid.to_string(), "VALIDATION_SCORE_INVALID");
    }

    #[test]
    fn domain_error_survives_added_context() {
        let err: anyhow::Error = Err::<(), _>(StandingsError::SeriesNotFound("s1".into()))
            .context(series_context("recalculate standings", "s1"))
            .unwrap_err();

        assert!(is_standings_error(
            &err,
            &StandingsError::SeriesNotFound("s1".into())
        ));
        assert!(!is_standings_error(&err, &StandingsError::MatchNotFound(1)));
    }
}
