use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use log::{debug, error, info, warn};

use super::providers::PlayerDirectory;
use super::standings::StandingsEngine;
use super::validation::{
    validate_new_match, validate_reorder, validate_scores, validate_within_series_window,
};
use crate::api::models::{MatchListPage, MatchView};
use crate::config::settings::LeaderboardSettings;
use crate::database::{self, DbPool, Match, MatchUpdate, NewMatch, Series};
use crate::errors::{series_context, StandingsError};
use crate::pagination::PaginationConfig;
use crate::rating::{MatchId, PlayerId};

/// Match write triggers: each commits its own change, then recomputes the
/// affected series before returning.
pub struct MatchService {
    pool: DbPool,
    engine: Arc<StandingsEngine>,
    players: Arc<dyn PlayerDirectory>,
    pagination: PaginationConfig,
    unknown_player_name: String,
}

impl MatchService {
    pub fn new(
        pool: DbPool,
        engine: Arc<StandingsEngine>,
        players: Arc<dyn PlayerDirectory>,
        settings: &LeaderboardSettings,
    ) -> Self {
        Self {
            pool,
            engine,
            players,
            pagination: PaginationConfig::from_settings(settings),
            unknown_player_name: settings.unknown_player_name.clone(),
        }
    }

    /// A page of the series' matches in replay order, starting after match
    /// `after`. `page_size` 0 selects the default page size.
    pub fn list_matches(
        &self,
        series_id: &str,
        page_size: usize,
        after: Option<MatchId>,
    ) -> Result<MatchListPage> {
        let limit = self.pagination.resolve(page_size);
        let conn = database::get_connection(&self.pool)?;
        self.load_series(&conn, series_id)?;
        if let Some(after_id) = after {
            let anchor = database::matches::find_by_id(&conn, after_id)?
                .ok_or(StandingsError::MatchNotFound(after_id))?;
            if anchor.series_id != series_id {
                return Err(StandingsError::MatchNotFound(after_id).into());
            }
        }

        let mut found = database::matches::list_by_series(&conn, series_id, after, limit + 1)?;
        let total = database::matches::count_by_series(&conn, series_id)?;
        drop(conn);

        let has_next_page = found.len() > limit;
        found.truncate(limit);

        let ids: Vec<PlayerId> = found
            .iter()
            .flat_map(|m| [m.player_a_id.clone(), m.player_b_id.clone()])
            .collect();
        let names = self.players.resolve_names(&ids);
        let name_of = |id: &PlayerId| {
            names
                .get(id)
                .cloned()
                .unwrap_or_else(|| self.unknown_player_name.clone())
        };

        let items: Vec<MatchView> = found
            .into_iter()
            .map(|m| {
                let (a, b) = (name_of(&m.player_a_id), name_of(&m.player_b_id));
                MatchView::from_match(m, a, b)
            })
            .collect();
        debug!("Listing {} matches of series {} after {:?}", items.len(), series_id, after);

        Ok(MatchListPage {
            series_id: series_id.to_string(),
            next_after: items.last().map(|m| m.id).filter(|_| has_next_page),
            items,
            has_next_page,
            has_previous_page: after.is_some(),
            total_matches: total as usize,
        })
    }

    pub fn report_match(&self, new_match: NewMatch) -> Result<Match> {
        validate_new_match(&new_match)?;

        let stored = {
            let conn = database::get_connection(&self.pool)?;
            let series = self.load_series(&conn, &new_match.series_id)?;
            validate_scores(new_match.score_a, new_match.score_b, series.sets_to_play)?;
            validate_within_series_window(&series, new_match.played_at)?;
            database::matches::insert_match(&conn, &new_match)?
        };
        info!(
            "Reported match {} in series {}: {} {}-{} {}",
            stored.id,
            stored.series_id,
            stored.player_a_id,
            stored.score_a,
            stored.score_b,
            stored.player_b_id
        );

        self.refresh_standings(&stored.series_id);
        Ok(stored)
    }

    /// Rewrites score and/or time of an existing match. The merged result is
    /// validated as a whole before it is stored.
    pub fn update_match(&self, match_id: MatchId, update: MatchUpdate) -> Result<Match> {
        let stored = {
            let conn = database::get_connection(&self.pool)?;
            let current = database::matches::find_by_id(&conn, match_id)?
                .ok_or(StandingsError::MatchNotFound(match_id))?;
            if update.is_empty() {
                debug!("Nothing to update for match {}", match_id);
                return Ok(current);
            }

            let merged = update.merged_onto(&current);
            let series = self.load_series(&conn, &merged.series_id)?;
            validate_scores(merged.score_a, merged.score_b, series.sets_to_play)?;
            validate_within_series_window(&series, merged.played_at)?;

            database::matches::update_match(&conn, match_id, &update)?
                .ok_or(StandingsError::MatchNotFound(match_id))?
        };
        info!("Updated match {} in series {}", stored.id, stored.series_id);

        self.refresh_standings(&stored.series_id);
        Ok(stored)
    }

    pub fn delete_match(&self, match_id: MatchId) -> Result<Match> {
        let removed = {
            let conn = database::get_connection(&self.pool)?;
            let current = database::matches::find_by_id(&conn, match_id)?
                .ok_or(StandingsError::MatchNotFound(match_id))?;
            if !database::matches::delete_match(&conn, match_id)? {
                return Err(StandingsError::MatchNotFound(match_id).into());
            }
            current
        };
        info!("Deleted match {} from series {}", removed.id, removed.series_id);

        self.refresh_standings(&removed.series_id);
        Ok(removed)
    }

    /// Puts same-day matches into the given order by re-timing them to
    /// consecutive minutes from the start of their day.
    pub fn reorder_matches(&self, match_ids: &[MatchId]) -> Result<Vec<Match>> {
        if match_ids.len() < 2 {
            debug!("Reorder of {} matches is a no-op", match_ids.len());
            return Ok(Vec::new());
        }

        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn.transaction().context("Failed to begin reorder")?;

        let mut matches = Vec::with_capacity(match_ids.len());
        for &id in match_ids {
            let found = database::matches::find_by_id(&tx, id)?
                .ok_or(StandingsError::MatchNotFound(id))?;
            matches.push(found);
        }
        validate_reorder(&matches)?;

        let day_start = matches[0].played_at.date().and_time(NaiveTime::MIN);
        for (slot, m) in (0..).zip(matches.iter_mut()) {
            m.played_at = day_start + chrono::TimeDelta::minutes(slot);
            database::matches::set_played_at(&tx, m.id, m.played_at)?;
        }
        tx.commit().context("Failed to commit reorder")?;
        drop(conn);

        let series_id = matches[0].series_id.clone();
        info!("Reordered {} matches in series {}", matches.len(), series_id);

        self.refresh_standings(&series_id);
        Ok(matches)
    }

    fn load_series(&self, conn: &rusqlite::Connection, series_id: &str) -> Result<Series> {
        let series = database::series::find_by_id(conn, series_id)
            .with_context(|| series_context("load", series_id))?
            .ok_or_else(|| StandingsError::SeriesNotFound(series_id.to_string()))?;
        Ok(series)
    }

    /// The write has already committed, so a failed recomputation must not
    /// fail the caller. The cache is dropped instead so the next read rebuilds it.
    fn refresh_standings(&self, series_id: &str) {
        match self.engine.recalculate_standings(series_id) {
            Ok(summary) => debug!(
                "Standings refreshed for {}: {} players",
                series_id, summary.players_ranked
            ),
            Err(e) => {
                error!("Recalculation after write failed for series {}: {:#}", series_id, e);
                if let Err(e) = self.engine.invalidate(series_id) {
                    warn!("{}: {:#}", series_context("invalidate cache", series_id), e);
                }
            }
        }
    }
}
