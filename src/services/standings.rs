use std::sync::{Arc, PoisonError};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use log::{debug, info};
use rusqlite::TransactionBehavior;
use serde::Serialize;

use super::locks::SeriesLocks;
use super::providers::SeriesMetadataProvider;
use crate::config::settings::StandingsSettings;
use crate::database::{self, DbPool};
use crate::errors::{series_context, StandingsError};
use crate::rating::{
    assign_ranks, ranks_are_consistent, sort_chronologically, MatchResult, RankedStanding,
    RankingOrder, ScoringFormat, ScoringModel, StandingsModel,
};

pub type Clock = fn() -> NaiveDateTime;

fn system_clock() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationSummary {
    pub series_id: String,
    pub format: ScoringFormat,
    pub matches_replayed: usize,
    pub players_ranked: usize,
}

/// Rebuilds a series' leaderboard cache from its full match history.
///
/// This is the only writer of leaderboard rows. Every call is a full replay;
/// calls for the same series are serialised.
pub struct StandingsEngine {
    pool: DbPool,
    series: Arc<dyn SeriesMetadataProvider>,
    settings: StandingsSettings,
    locks: SeriesLocks,
    clock: Clock,
}

impl StandingsEngine {
    pub fn new(
        pool: DbPool,
        series: Arc<dyn SeriesMetadataProvider>,
        settings: StandingsSettings,
    ) -> Self {
        Self {
            pool,
            series,
            settings,
            locks: SeriesLocks::new(),
            clock: system_clock,
        }
    }

    /// Replaces the timestamp source used for `updated_at`.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn recalculate_standings(&self, series_id: &str) -> Result<RecalculationSummary> {
        let lock = self.locks.for_series(series_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let context = self
            .series
            .get_scoring_context(series_id)
            .with_context(|| series_context("load scoring context", series_id))?;
        let model = ScoringModel::for_context(&context, &self.settings);

        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .with_context(|| series_context("begin recalculation", series_id))?;

        let mut matches: Vec<MatchResult> = database::matches::list_chronological(&tx, series_id)?
            .iter()
            .map(MatchResult::from)
            .collect();
        sort_chronologically(&mut matches);

        let cleared = database::leaderboard::delete_all_for_series(&tx, series_id)?;
        debug!("Cleared {} cached rows for series {}", cleared, series_id);

        let ranked = assign_ranks(model.ranking_order(), model.replay(&matches));
        check_ranks(series_id, model.ranking_order(), &ranked)?;

        database::leaderboard::insert_entries(&tx, series_id, &ranked, (self.clock)())?;
        tx.commit()
            .with_context(|| series_context("commit recalculation", series_id))?;

        let summary = RecalculationSummary {
            series_id: series_id.to_string(),
            format: model.format(),
            matches_replayed: matches.len(),
            players_ranked: ranked.len(),
        };
        info!(
            "Recalculated {} standings for series {}: {} matches, {} players",
            summary.format, series_id, summary.matches_replayed, summary.players_ranked
        );
        Ok(summary)
    }

    /// Drops a series' cached rows so the next read recomputes them.
    pub fn invalidate(&self, series_id: &str) -> Result<()> {
        let lock = self.locks.for_series(series_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let conn = database::get_connection(&self.pool)?;
        let cleared = database::leaderboard::delete_all_for_series(&conn, series_id)?;
        info!("Invalidated {} cached rows for series {}", cleared, series_id);
        Ok(())
    }
}

/// Refuses to write a leaderboard whose ranks (or ladder positions) are not
/// exactly 1..=N.
fn check_ranks(
    series_id: &str,
    order: RankingOrder,
    ranked: &[RankedStanding],
) -> Result<(), StandingsError> {
    if ranks_are_consistent(order, ranked) {
        Ok(())
    } else {
        Err(StandingsError::InconsistentRanks {
            series_id: series_id.to_string(),
            expected: ranked.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::LeaderboardEntry;
    use crate::errors::is_standings_error;
    use crate::rating::test_matches::at;
    use crate::rating::LadderVariant;
    use crate::services::providers::SqliteSeriesProvider;
    use crate::test_support::{fixed_clock, TestDb};

    fn engine(db: &TestDb) -> StandingsEngine {
        let provider = Arc::new(SqliteSeriesProvider::new(db.pool()));
        StandingsEngine::new(db.pool(), provider, StandingsSettings::default())
            .with_clock(fixed_clock)
    }

    fn cached(db: &TestDb, series_id: &str) -> Vec<LeaderboardEntry> {
        database::leaderboard::find_by_series_ordered(&db.conn(), series_id).unwrap()
    }

    fn rating_of(rows: &[LeaderboardEntry], player_id: &str) -> i32 {
        rows.iter().find(|r| r.player_id == player_id).unwrap().rating
    }

    #[test]
    fn series_without_matches_has_empty_leaderboard() {
        let db = TestDb::new();
        db.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);

        let summary = engine(&db).recalculate_standings("open").unwrap();

        assert_eq!(summary.players_ranked, 0);
        assert!(cached(&db, "open").is_empty());
    }

    #[test]
    fn single_even_match_is_cached_as_1016_and_984() {
        let db = TestDb::new();
        db.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);
        db.insert_raw_match(1, "open", "a", "b", 3, 1, at(0));

        engine(&db).recalculate_standings("open").unwrap();
        let rows = cached(&db, "open");

        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].player_id.as_str(), rows[0].rank, rows[0].rating), ("a", 1, 1016));
        assert_eq!((rows[1].player_id.as_str(), rows[1].rank, rows[1].rating), ("b", 2, 984));
        assert_eq!(rows[0].games_won, 3);
        assert_eq!(rows[1].games_won, 1);
        assert_eq!(rows[0].updated_at, fixed_clock());
    }

    #[test]
    fn recalculating_twice_is_idempotent() {
        let db = TestDb::new();
        db.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);
        db.insert_raw_match(1, "open", "a", "b", 3, 1, at(0));
        db.insert_raw_match(2, "open", "c", "a", 3, 2, at(5));
        db.insert_raw_match(3, "open", "b", "c", 3, 0, at(9));
        let engine = engine(&db);

        engine.recalculate_standings("open").unwrap();
        let first = cached(&db, "open");
        engine.recalculate_standings("open").unwrap();
        let second = cached(&db, "open");

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn ladder_cache_is_a_dense_permutation() {
        let db = TestDb::new();
        db.add_series("ladder", ScoringFormat::Ladder, LadderVariant::Aggressive);
        let players = ["a", "b", "c", "d", "e"];
        for n in 0..30i64 {
            let a = players[(n as usize * 3) % players.len()];
            let b = players[(n as usize * 3 + 1 + n as usize % 3) % players.len()];
            if a == b {
                continue;
            }
            let (score_a, score_b) = if n % 2 == 0 { (3, 1) } else { (2, 3) };
            db.insert_raw_match(n + 1, "ladder", a, b, score_a, score_b, at(n));
        }

        engine(&db).recalculate_standings("ladder").unwrap();
        let rows = cached(&db, "ladder");

        let mut positions: Vec<i32> = rows.iter().map(|r| r.rating).collect();
        positions.sort_unstable();
        assert_eq!(positions, (1..=rows.len() as i32).collect::<Vec<_>>());
        assert!(rows.iter().all(|r| r.rank == r.rating));
    }

    #[test]
    fn storage_order_does_not_change_the_result() {
        let shuffled = TestDb::new();
        let ordered = TestDb::new();
        let history = [
            (1, "a", "b", 3, 0, at(10)),
            (2, "b", "c", 3, 1, at(10)),
            (3, "c", "a", 3, 2, at(10)),
            (4, "a", "d", 1, 3, at(20)),
        ];
        for db in [&shuffled, &ordered] {
            db.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);
        }
        for &(id, a, b, sa, sb, t) in history.iter().rev() {
            shuffled.insert_raw_match(id, "open", a, b, sa, sb, t);
        }
        for &(id, a, b, sa, sb, t) in history.iter() {
            ordered.insert_raw_match(id, "open", a, b, sa, sb, t);
        }

        engine(&shuffled).recalculate_standings("open").unwrap();
        engine(&ordered).recalculate_standings("open").unwrap();

        assert_eq!(cached(&shuffled, "open"), cached(&ordered, "open"));
    }

    #[test]
    fn deleting_a_middle_match_matches_a_fresh_replay() {
        let db = TestDb::new();
        let fresh = TestDb::new();
        db.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);
        fresh.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);
        let history = [
            (1, "a", "b", 3, 1, at(0)),
            (2, "b", "c", 3, 0, at(1)),
            (3, "c", "a", 3, 2, at(2)),
            (4, "a", "b", 0, 3, at(3)),
        ];
        for &(id, a, b, sa, sb, t) in &history {
            db.insert_raw_match(id, "open", a, b, sa, sb, t);
            if id != 2 {
                fresh.insert_raw_match(id, "open", a, b, sa, sb, t);
            }
        }
        let engine_db = engine(&db);
        engine_db.recalculate_standings("open").unwrap();
        let before = cached(&db, "open");

        database::matches::delete_match(&db.conn(), 2).unwrap();
        engine_db.recalculate_standings("open").unwrap();
        engine(&fresh).recalculate_standings("open").unwrap();

        let after = cached(&db, "open");
        assert_eq!(after, cached(&fresh, "open"));
        assert_ne!(rating_of(&before, "c"), rating_of(&after, "c"));
    }

    #[test]
    fn unknown_series_keeps_previous_cache() {
        let db = TestDb::new();
        db.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);
        db.insert_raw_match(1, "open", "a", "b", 3, 1, at(0));
        let engine = engine(&db);
        engine.recalculate_standings("open").unwrap();

        db.conn().execute("DELETE FROM series WHERE id = 'open'", []).unwrap();
        let err = engine.recalculate_standings("open").unwrap_err();

        assert!(is_standings_error(&err, &StandingsError::SeriesNotFound("open".into())));
        assert_eq!(cached(&db, "open").len(), 2);
    }

    #[test]
    fn failed_rewrite_rolls_back_to_previous_cache() {
        let db = TestDb::new();
        db.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);
        db.insert_raw_match(1, "open", "a", "b", 3, 1, at(0));
        let engine = engine(&db);
        engine.recalculate_standings("open").unwrap();
        let before = cached(&db, "open");

        db.conn()
            .execute_batch(
                "CREATE TRIGGER reject_boom BEFORE INSERT ON leaderboard WHEN NEW.player_id = 'boom'
                 BEGIN SELECT RAISE(ABORT, 'store failure'); END;",
            )
            .unwrap();
        db.insert_raw_match(2, "open", "a", "boom", 3, 0, at(1));

        assert!(engine.recalculate_standings("open").is_err());
        assert_eq!(cached(&db, "open"), before);
    }

    #[test]
    fn duplicated_ladder_positions_are_refused() {
        let standings = ["a", "b", "c"]
            .into_iter()
            .zip([1, 1, 4])
            .map(|(id, position)| crate::rating::PlayerStanding {
                player_id: id.to_string(),
                rating: position,
                tally: Default::default(),
            })
            .collect();
        let ranked = assign_ranks(RankingOrder::LowestFirst, standings);

        assert_eq!(
            check_ranks("ladder", RankingOrder::LowestFirst, &ranked),
            Err(StandingsError::InconsistentRanks {
                series_id: "ladder".to_string(),
                expected: 3,
            })
        );
        assert_eq!(check_ranks("open", RankingOrder::HighestFirst, &ranked), Ok(()));
    }

    #[test]
    fn invalidate_empties_only_that_series() {
        let db = TestDb::new();
        db.add_series("one", ScoringFormat::OpenPlay, LadderVariant::Classic);
        db.add_series("two", ScoringFormat::Ladder, LadderVariant::Classic);
        db.insert_raw_match(1, "one", "a", "b", 3, 1, at(0));
        db.insert_raw_match(2, "two", "a", "b", 3, 1, at(0));
        let engine = engine(&db);
        engine.recalculate_standings("one").unwrap();
        engine.recalculate_standings("two").unwrap();

        engine.invalidate("one").unwrap();

        assert!(cached(&db, "one").is_empty());
        assert_eq!(cached(&db, "two").len(), 2);
    }

    #[test]
    fn concurrent_recalculations_of_one_series_agree() {
        let db = TestDb::new();
        db.add_series("open", ScoringFormat::OpenPlay, LadderVariant::Classic);
        for n in 0..20i64 {
            let (a, b) = if n % 3 == 0 { ("a", "b") } else { ("b", "c") };
            db.insert_raw_match(n + 1, "open", a, b, 3, (n % 3) as i32, at(n));
        }
        let engine = Arc::new(engine(&db));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.recalculate_standings("open").unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let rows = cached(&db, "open");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
