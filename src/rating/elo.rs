use std::collections::BTreeMap;

use log::debug;

use super::model::StandingsModel;
use super::types::{MatchResult, MatchTally, PlayerId, PlayerStanding, RankingOrder, RatingValue};
use crate::config::settings::StandingsSettings;

/// ELO replay for open-play series.
#[derive(Debug, Clone)]
pub struct EloModel {
    initial_rating: RatingValue,
    k_factor: f64,
}

impl EloModel {
    pub fn new(settings: &StandingsSettings) -> Self {
        Self {
            initial_rating: settings.initial_rating,
            k_factor: settings.k_factor,
        }
    }
}

impl Default for EloModel {
    fn default() -> Self {
        Self::new(&StandingsSettings::default())
    }
}

impl StandingsModel for EloModel {
    fn replay(&self, matches: &[MatchResult]) -> Vec<PlayerStanding> {
        let mut players: BTreeMap<PlayerId, PlayerStanding> = BTreeMap::new();

        for m in matches {
            let rating_a = self.ensure_player(&mut players, &m.player_a_id);
            let rating_b = self.ensure_player(&mut players, &m.player_b_id);

            let (delta_a, delta_b) = rating_deltas(rating_a, rating_b, m.a_won(), self.k_factor);
            debug!(
                "match {}: {} {:+} / {} {:+}",
                m.id, m.player_a_id, delta_a, m.player_b_id, delta_b
            );

            apply(&mut players, &m.player_a_id, delta_a, m.score_a, m.score_b);
            apply(&mut players, &m.player_b_id, delta_b, m.score_b, m.score_a);
        }

        players.into_values().collect()
    }

    fn ranking_order(&self) -> RankingOrder {
        RankingOrder::HighestFirst
    }
}

impl EloModel {
    fn ensure_player(
        &self,
        players: &mut BTreeMap<PlayerId, PlayerStanding>,
        id: &PlayerId,
    ) -> RatingValue {
        players
            .entry(id.clone())
            .or_insert_with(|| PlayerStanding {
                player_id: id.clone(),
                rating: self.initial_rating,
                tally: MatchTally::default(),
            })
            .rating
    }
}

fn apply(
    players: &mut BTreeMap<PlayerId, PlayerStanding>,
    id: &PlayerId,
    delta: RatingValue,
    games_for: i32,
    games_against: i32,
) {
    if let Some(standing) = players.get_mut(id) {
        standing.rating += delta;
        standing.tally.record(games_for, games_against);
    }
}

/// Probability that a player rated `rating` beats one rated `opponent`.
pub fn expected_score(rating: RatingValue, opponent: RatingValue) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) as f64 / 400.0))
}

/// Rounded rating changes for both sides of one decided match.
pub fn rating_deltas(
    rating_a: RatingValue,
    rating_b: RatingValue,
    a_won: bool,
    k_factor: f64,
) -> (RatingValue, RatingValue) {
    let expected_a = expected_score(rating_a, rating_b);
    let expected_b = 1.0 - expected_a;
    let actual_a = if a_won { 1.0 } else { 0.0 };
    let actual_b = 1.0 - actual_a;

    let delta_a = (k_factor * (actual_a - expected_a)).round() as RatingValue;
    let delta_b = (k_factor * (actual_b - expected_b)).round() as RatingValue;
    (delta_a, delta_b)
}
