use crate::config::settings::LeaderboardSettings;

/// Page size bounds for leaderboard reads
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl PaginationConfig {
    pub fn new() -> Self {
        Self::from_settings(&LeaderboardSettings::default())
    }

    pub fn from_settings(settings: &LeaderboardSettings) -> Self {
        Self {
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
        }
    }

    /// 0 means "use the default"; anything above the maximum is clamped.
    pub fn resolve(&self, requested: usize) -> usize {
        let size = if requested == 0 {
            self.default_page_size
        } else {
            requested
        };
        size.min(self.max_page_size)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self::new()
    }
}
