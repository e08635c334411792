pub mod models;

pub use models::{LeaderboardItem, LeaderboardPage, MatchListPage, MatchView};
