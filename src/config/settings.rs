use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: String,
    pub pool_size: u32,
    pub busy_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "series_standings.db".to_string(),
            pool_size: 8,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StandingsSettings {
    pub initial_rating: i32,
    pub k_factor: f64,
}

impl Default for StandingsSettings {
    fn default() -> Self {
        Self {
            initial_rating: 1000,
            k_factor: 32.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeaderboardSettings {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub unknown_player_name: String,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            unknown_player_name: "Unknown Player".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub standings: StandingsSettings,
    pub leaderboard: LeaderboardSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            database: DatabaseSettings::default(),
            standings: StandingsSettings::default(),
            leaderboard: LeaderboardSettings::default(),
        }
    }

    /// Defaults, with the database path taken from `DATABASE_PATH` when set.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database.path = path;
        }
        config
    }

    pub fn with_database_path(mut self, path: impl Into<String>) -> Self {
        self.database.path = path.into();
        self
    }
}
