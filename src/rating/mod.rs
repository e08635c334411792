pub mod elo;
pub mod ladder;
pub mod model;
pub mod ranking;
pub mod types;

pub use elo::EloModel;
pub use ladder::{LadderModel, LadderState};
pub use model::{ScoringModel, StandingsModel};
pub use ranking::{assign_ranks, ranks_are_consistent, sort_chronologically};
pub use types::{
    LadderVariant, MatchId, MatchResult, MatchTally, PlayerId, PlayerStanding, RankedStanding,
    RankingOrder, ScoringFormat, SeriesScoringContext,
};
