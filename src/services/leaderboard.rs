use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, info};

use super::providers::PlayerDirectory;
use super::standings::StandingsEngine;
use crate::api::models::{LeaderboardItem, LeaderboardPage};
use crate::config::settings::LeaderboardSettings;
use crate::database::{self, DbPool, LeaderboardEntry};
use crate::errors::series_context;
use crate::pagination::{decode_cursor, encode_cursor, PageCursor, PaginationConfig};
use crate::rating::PlayerId;

/// One consistent view of a series' cache rows.
struct CacheSnapshot {
    total: usize,
    rows: Vec<LeaderboardEntry>,
    last_updated: Option<NaiveDateTime>,
}

/// Serves rank-ordered pages from the leaderboard cache, rebuilding it on a
/// miss.
pub struct LeaderboardReader {
    pool: DbPool,
    engine: Arc<StandingsEngine>,
    players: Arc<dyn PlayerDirectory>,
    pagination: PaginationConfig,
    unknown_player_name: String,
}

impl LeaderboardReader {
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

    /// `page_size` 0 selects the default page size. `cursor` is a
    /// `next_cursor` or `previous_cursor` from an earlier page.
    pub fn get_leaderboard(
        &self,
        series_id: &str,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<LeaderboardPage> {
        let cursor = cursor
            .map(decode_cursor)
            .transpose()?
            .unwrap_or(PageCursor::After(0));
        let limit = self.pagination.resolve(page_size);

        let mut snapshot = self.read_snapshot(series_id, cursor, limit)?;
        if snapshot.total == 0 {
            info!("Leaderboard cache for series {} is empty, recalculating", series_id);
            self.engine.recalculate_standings(series_id)?;
            snapshot = self.read_snapshot(series_id, cursor, limit)?;
        }

        let ids: Vec<PlayerId> = snapshot.rows.iter().map(|row| row.player_id.clone()).collect();
        let names = self.players.resolve_names(&ids);

        let first_served = snapshot.rows.first().map(|row| row.rank);
        let last_served = snapshot.rows.last().map(|row| row.rank);
        let has_next_page = last_served.is_some_and(|rank| (rank as usize) < snapshot.total);
        let has_previous_page = first_served.is_some_and(|rank| rank > 1);
        let entries: Vec<LeaderboardItem> = snapshot
            .rows
            .into_iter()
            .map(|row| {
                let name = names
                    .get(&row.player_id)
                    .cloned()
                    .unwrap_or_else(|| self.unknown_player_name.clone());
                LeaderboardItem::from_entry(row, name)
            })
            .collect();
        debug!(
            "Serving {} leaderboard rows for series {} at {:?}",
            entries.len(),
            series_id,
            cursor
        );

        Ok(LeaderboardPage {
            series_id: series_id.to_string(),
            entries,
            next_cursor: last_served
                .filter(|_| has_next_page)
                .map(|rank| encode_cursor(PageCursor::After(rank))),
            previous_cursor: first_served
                .filter(|_| has_previous_page)
                .map(|rank| encode_cursor(PageCursor::Before(rank))),
            has_next_page,
            has_previous_page,
            total_players: snapshot.total,
            last_updated: snapshot.last_updated,
        })
    }

    fn read_snapshot(
        &self,
        series_id: &str,
        cursor: PageCursor,
        limit: usize,
    ) -> Result<CacheSnapshot> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction()
            .with_context(|| series_context("open leaderboard snapshot", series_id))?;

        let total = database::leaderboard::count_for_series(&tx, series_id)?;
        let rows = match cursor {
            PageCursor::After(rank) => database::leaderboard::find_page(&tx, series_id, rank, limit)?,
            PageCursor::Before(rank) => {
                database::leaderboard::find_page_before(&tx, series_id, rank, limit)?
            }
        };
        let last_updated = database::leaderboard::last_updated(&tx, series_id)?;
        tx.commit()?;

        Ok(CacheSnapshot {
            total,
            rows,
            last_updated,
        })
    }
}
