pub mod leaderboard;
pub mod locks;
pub mod matches;
pub mod providers;
pub mod standings;
pub mod validation;

use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::config::settings::AppConfig;
use crate::database::{self, DbPool};
use leaderboard::LeaderboardReader;
use matches::MatchService;
use providers::{SqlitePlayerDirectory, SqliteSeriesProvider};
use standings::StandingsEngine;

/// The engine, its write triggers and the reader, wired to one pool.
pub struct StandingsServices {
    pub pool: DbPool,
    pub engine: Arc<StandingsEngine>,
    pub matches: MatchService,
    pub leaderboard: LeaderboardReader,
}

impl StandingsServices {
    /// Opens the configured database, creating the schema if needed.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let pool = database::create_pool(&config.database)?;
        {
            let conn = database::get_connection(&pool)?;
            database::setup::ensure_schema(&conn)?;
        }
        info!("Opened standings database at {}", config.database.path);
        Ok(Self::from_pool(pool, config))
    }

    pub fn from_pool(pool: DbPool, config: &AppConfig) -> Self {
        let series = Arc::new(SqliteSeriesProvider::new(pool.clone()));
        let players = Arc::new(SqlitePlayerDirectory::new(pool.clone()));
        let engine = Arc::new(StandingsEngine::new(
            pool.clone(),
            series,
            config.standings.clone(),
        ));

        Self {
            matches: MatchService::new(
                pool.clone(),
                Arc::clone(&engine),
                players.clone(),
                &config.leaderboard,
            ),
            leaderboard: LeaderboardReader::new(
                pool.clone(),
                Arc::clone(&engine),
                players,
                &config.leaderboard,
            ),
            engine,
            pool,
        }
    }
}
