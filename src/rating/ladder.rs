use std::collections::BTreeMap;

use log::debug;

use super::model::StandingsModel;
use super::types::{
    LadderVariant, MatchResult, MatchTally, PlayerId, PlayerStanding, RankingOrder,
};

/// Positional ladder replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct LadderModel {
    variant: LadderVariant,
}

impl LadderModel {
    pub fn new(variant: LadderVariant) -> Self {
        Self { variant }
    }

    #[cfg(test)]
    pub fn variant(&self) -> LadderVariant {
        self.variant
    }
}

impl StandingsModel for LadderModel {
    fn replay(&self, matches: &[MatchResult]) -> Vec<PlayerStanding> {
        matches
            .iter()
            .fold(LadderState::default(), |state, m| state.apply(m, self.variant))
            .into_standings()
    }

    fn ranking_order(&self) -> RankingOrder {
        RankingOrder::LowestFirst
    }
}

/// Ladder state between two replay steps.
///
/// `order[i]` holds position `i + 1`, so the positions are always the dense
/// permutation `1..=len` and no two players can share one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LadderState {
    order: Vec<PlayerId>,
    tallies: BTreeMap<PlayerId, MatchTally>,
}

impl LadderState {
    /// 1-based position, `None` for a player who has not appeared yet.
    #[cfg(test)]
    pub fn position_of(&self, player_id: &str) -> Option<usize> {
        self.order
            .iter()
            .position(|id| id == player_id)
            .map(|idx| idx + 1)
    }

    /// Players from best to worst.
    #[cfg(test)]
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    /// The state after one more match.
    pub fn apply(self, m: &MatchResult, variant: LadderVariant) -> Self {
        let mut next = self
            .with_player(m.winner_id())
            .with_player(m.loser_id());
        next.record_tallies(m);

        let winner_idx = next.index_of(m.winner_id());
        let loser_idx = next.index_of(m.loser_id());

        match (winner_idx, loser_idx) {
            (Some(winner), Some(loser)) if winner > loser => {
                debug!(
                    "match {}: {} climbs from {} to {}",
                    m.id,
                    m.winner_id(),
                    winner + 1,
                    loser + 1
                );
                next.climb(winner, loser)
            }
            (Some(_), Some(loser)) if variant == LadderVariant::Aggressive => {
                debug!("match {}: {} drops from {}", m.id, m.loser_id(), loser + 1);
                next.drop_one(loser)
            }
            _ => next,
        }
    }

    fn with_player(mut self, player_id: &PlayerId) -> Self {
        if !self.order.contains(player_id) {
            self.order.push(player_id.clone());
        }
        self
    }

    fn record_tallies(&mut self, m: &MatchResult) {
        self.tallies
            .entry(m.player_a_id.clone())
            .or_default()
            .record(m.score_a, m.score_b);
        self.tallies
            .entry(m.player_b_id.clone())
            .or_default()
            .record(m.score_b, m.score_a);
    }

    fn index_of(&self, player_id: &PlayerId) -> Option<usize> {
        self.order.iter().position(|id| id == player_id)
    }

    /// Challenger at `from` takes `to`; everyone in `to..from` slides one down.
    fn climb(mut self, from: usize, to: usize) -> Self {
        let challenger = self.order.remove(from);
        self.order.insert(to, challenger);
        self
    }

    fn drop_one(mut self, idx: usize) -> Self {
        if idx + 1 < self.order.len() {
            self.order.swap(idx, idx + 1);
        }
        self
    }

    pub fn into_standings(self) -> Vec<PlayerStanding> {
        let LadderState { order, mut tallies } = self;
        order
            .into_iter()
            .enumerate()
            .map(|(idx, player_id)| {
                let tally = tallies.remove(&player_id).unwrap_or_default();
                PlayerStanding {
                    player_id,
                    rating: (idx + 1) as i32,
                    tally,
                }
            })
            .collect()
    }
}
