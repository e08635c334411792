use std::cmp::Ordering;

use super::types::{MatchResult, PlayerStanding, RankedStanding, RankingOrder};

/// Puts matches into replay order: `played_at`, then insertion id.
pub fn sort_chronologically(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| {
        a.played_at
            .cmp(&b.played_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Orders standings by the model's key and numbers them 1..=N.
/// Equal ratings fall back to player id ascending.
pub fn assign_ranks(order: RankingOrder, mut standings: Vec<PlayerStanding>) -> Vec<RankedStanding> {
    standings.sort_by(|a, b| compare(order, a, b));

    standings
        .into_iter()
        .enumerate()
        .map(|(idx, standing)| RankedStanding {
            rank: (idx + 1) as i32,
            standing,
        })
        .collect()
}

fn compare(order: RankingOrder, a: &PlayerStanding, b: &PlayerStanding) -> Ordering {
    let by_rating = match order {
        RankingOrder::HighestFirst => b.rating.cmp(&a.rating),
        RankingOrder::LowestFirst => a.rating.cmp(&b.rating),
    };
    by_rating.then_with(|| a.player_id.cmp(&b.player_id))
}

/// True when the ranks are exactly 1..=N and, for positional ladders, each
/// rank is the player's own position. The latter makes the positions a
/// dense permutation as well.
pub fn ranks_are_consistent(order: RankingOrder, ranked: &[RankedStanding]) -> bool {
    if !is_dense_permutation(ranked) {
        return false;
    }
    match order {
        RankingOrder::HighestFirst => true,
        RankingOrder::LowestFirst => ranked.iter().all(|r| r.rank == r.standing.rating),
    }
}

/// True when the ranks are exactly 1..=N with no gaps or repeats.
fn is_dense_permutation(ranked: &[RankedStanding]) -> bool {
    let mut ranks: Vec<i32> = ranked.iter().map(|r| r.rank).collect();
    ranks.sort_unstable();
    ranks
        .iter()
        .enumerate()
        .all(|(idx, &rank)| rank == (idx + 1) as i32)
}
