use std::collections::HashMap;

use anyhow::Result;
use log::warn;

use crate::database::{self, DbPool};
use crate::errors::StandingsError;
use crate::rating::{PlayerId, SeriesScoringContext};

/// Supplies the scoring rules of a series.
pub trait SeriesMetadataProvider: Send + Sync {
    /// Fails with `StandingsError::SeriesNotFound` for unknown ids.
    fn get_scoring_context(&self, series_id: &str) -> Result<SeriesScoringContext>;
}

/// Resolves player ids to display names in one batch.
pub trait PlayerDirectory: Send + Sync {
    /// Never fails; unknown ids are just missing from the result.
    fn resolve_names(&self, ids: &[PlayerId]) -> HashMap<PlayerId, String>;
}

pub struct SqliteSeriesProvider {
    pool: DbPool,
}

impl SqliteSeriesProvider {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SeriesMetadataProvider for SqliteSeriesProvider {
    fn get_scoring_context(&self, series_id: &str) -> Result<SeriesScoringContext> {
        let conn = database::get_connection(&self.pool)?;
        let series = database::series::find_by_id(&conn, series_id)?
            .ok_or_else(|| StandingsError::SeriesNotFound(series_id.to_string()))?;

        Ok(SeriesScoringContext {
            series_id: series.id,
            format: series.format,
            ladder_variant: series.ladder_variant,
        })
    }
}

pub struct SqlitePlayerDirectory {
    pool: DbPool,
}

impl SqlitePlayerDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn lookup(&self, ids: &[PlayerId]) -> Result<HashMap<PlayerId, String>> {
        let conn = database::get_connection(&self.pool)?;
        let players = database::players::find_by_ids(&conn, ids)?;
        Ok(players
            .into_iter()
            .map(|(id, player)| (id, player.display_name))
            .collect())
    }
}

impl PlayerDirectory for SqlitePlayerDirectory {
    fn resolve_names(&self, ids: &[PlayerId]) -> HashMap<PlayerId, String> {
        let names = self.lookup(ids).unwrap_or_else(|e| {
            warn!("Player name lookup failed, using placeholders: {:#}", e);
            HashMap::new()
        });

        if names.len() < ids.len() {
            let missing = ids.iter().filter(|id| !names.contains_key(*id)).count();
            warn!("{} of {} players not found in directory", missing, ids.len());
        }
        names
    }
}
