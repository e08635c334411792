//! Throwaway SQLite databases for tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDateTime;
use rusqlite::params;

use crate::config::settings::{AppConfig, DatabaseSettings};
use crate::database::{self, DbPool, NewSeries};
use crate::rating::{LadderVariant, ScoringFormat};

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

pub struct TestDb {
    path: PathBuf,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!(
            "series_standings_test_{}_{}.db",
            std::process::id(),
            NEXT_DB.fetch_add(1, Ordering::SeqCst)
        ));
        let settings = DatabaseSettings {
            path: path.to_string_lossy().into_owned(),
            ..DatabaseSettings::default()
        };
        let pool = database::create_pool(&settings).unwrap();
        let conn = database::get_connection(&pool).unwrap();
        database::setup::reset_database(&conn).unwrap();

        Self { path, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::new().with_database_path(self.path.to_string_lossy())
    }

    pub fn conn(&self) -> database::DbConn {
        database::get_connection(&self.pool).unwrap()
    }

    pub fn add_series(&self, id: &str, format: ScoringFormat, variant: LadderVariant) {
        let series = NewSeries {
            ladder_variant: variant,
            ..NewSeries::new(id, id, format)
        };
        database::series::insert_series(&self.conn(), &series).unwrap();
    }

    pub fn add_player(&self, id: &str, name: &str) {
        database::players::upsert_player(&self.conn(), id, name).unwrap();
    }

    /// Inserts with an explicit id, bypassing autoincrement.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_raw_match(
        &self,
        id: i64,
        series_id: &str,
        player_a: &str,
        player_b: &str,
        score_a: i32,
        score_b: i32,
        played_at: NaiveDateTime,
    ) {
        self.conn()
            .execute(
                "INSERT INTO matches (id, series_id, player_a_id, player_b_id, score_a, score_b, played_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, series_id, player_a, player_b, score_a, score_b, played_at],
            )
            .unwrap();
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn fixed_clock() -> NaiveDateTime {
    crate::rating::test_matches::at(24 * 60)
}
