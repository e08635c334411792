use super::elo::EloModel;
use super::ladder::LadderModel;
use super::types::{
    MatchResult, PlayerStanding, RankingOrder, ScoringFormat, SeriesScoringContext,
};
use crate::config::settings::StandingsSettings;

/// A rating model that turns a chronological match history into standings.
pub trait StandingsModel {
    /// Replays `matches` (already in chronological order) from an empty state.
    fn replay(&self, matches: &[MatchResult]) -> Vec<PlayerStanding>;

    fn ranking_order(&self) -> RankingOrder;
}

/// The model chosen for one recomputation.
#[derive(Debug, Clone)]
pub enum ScoringModel {
    Elo(EloModel),
    Ladder(LadderModel),
}

impl ScoringModel {
    pub fn for_context(context: &SeriesScoringContext, settings: &StandingsSettings) -> Self {
        match context.format {
            ScoringFormat::OpenPlay => ScoringModel::Elo(EloModel::new(settings)),
            ScoringFormat::Ladder => ScoringModel::Ladder(LadderModel::new(context.ladder_variant)),
        }
    }

    pub fn format(&self) -> ScoringFormat {
        match self {
            ScoringModel::Elo(_) => ScoringFormat::OpenPlay,
            ScoringModel::Ladder(_) => ScoringFormat::Ladder,
        }
    }
}

impl StandingsModel for ScoringModel {
    fn replay(&self, matches: &[MatchResult]) -> Vec<PlayerStanding> {
        match self {
            ScoringModel::Elo(model) => model.replay(matches),
            ScoringModel::Ladder(model) => model.replay(matches),
        }
    }

    fn ranking_order(&self) -> RankingOrder {
        match self {
            ScoringModel::Elo(model) => model.ranking_order(),
            ScoringModel::Ladder(model) => model.ranking_order(),
        }
    }
}
