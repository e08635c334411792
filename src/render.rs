//! Terminal rendering of leaderboard and match pages.

use colored::Colorize;

use crate::api::models::{LeaderboardPage, MatchListPage};
use crate::rating::ScoringFormat;

pub fn render_leaderboard(page: &LeaderboardPage, format: ScoringFormat) -> String {
    let rating_header = match format {
        ScoringFormat::OpenPlay => "Rating",
        ScoringFormat::Ladder => "Pos",
    };
    let mut out = String::new();

    out.push_str(&format!(
        "{} {} ({} players)\n",
        "Series".bold(),
        page.series_id.bold(),
        page.total_players
    ));
    out.push_str(&format!(
        "{:>4}  {:<24} {:>6} {:>4} {:>4} {:>4} {:>7} {:>7}\n",
        "#", "Player", rating_header, "MP", "W", "L", "Win%", "Game%"
    ));

    for item in &page.entries {
        let rank = format!("{:>4}", item.rank);
        let rank = if item.rank <= 3 {
            rank.green().bold()
        } else {
            rank.normal()
        };
        out.push_str(&format!(
            "{}  {:<24} {:>6} {:>4} {:>4} {:>4} {:>6.1}% {:>6.1}%\n",
            rank,
            item.player_name,
            item.rating,
            item.matches_played,
            item.matches_won,
            item.matches_lost,
            item.win_rate,
            item.game_win_rate
        ));
    }

    if page.entries.is_empty() {
        out.push_str(&format!("{}\n", "No standings yet".dimmed()));
    }
    if let Some(cursor) = &page.previous_cursor {
        out.push_str(&format!("{} --cursor {}\n", "Back:".yellow(), cursor));
    }
    if let Some(cursor) = &page.next_cursor {
        out.push_str(&format!("{} --cursor {}\n", "More:".yellow(), cursor));
    }
    if let Some(updated) = page.last_updated {
        out.push_str(&format!("Updated {}\n", updated.format("%Y-%m-%d %H:%M:%S")));
    }
    out
}

pub fn render_matches(page: &MatchListPage) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} ({} matches)\n",
        "Series".bold(),
        page.series_id.bold(),
        page.total_matches
    ));

    for m in &page.items {
        let (a, b) = if m.score_a > m.score_b {
            (m.player_a_name.bold(), m.player_b_name.normal())
        } else {
            (m.player_a_name.normal(), m.player_b_name.bold())
        };
        out.push_str(&format!(
            "{:>6}  {}  {} {}-{} {}\n",
            m.id,
            m.played_at.format("%Y-%m-%d %H:%M"),
            a,
            m.score_a,
            m.score_b,
            b
        ));
    }

    if page.items.is_empty() {
        out.push_str(&format!("{}\n", "No matches".dimmed()));
    }
    if let Some(after) = page.next_after {
        out.push_str(&format!("{} --after {}\n", "More:".yellow(), after));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{LeaderboardItem, MatchView};
    use crate::rating::test_matches::at;

    fn page(entries: Vec<LeaderboardItem>, next_cursor: Option<String>) -> LeaderboardPage {
        LeaderboardPage {
            series_id: "spring".to_string(),
            total_players: entries.len(),
            entries,
            has_next_page: next_cursor.is_some(),
            next_cursor,
            previous_cursor: None,
            has_previous_page: false,
            last_updated: Some(at(0)),
        }
    }

    fn item(rank: i32, name: &str, rating: i32) -> LeaderboardItem {
        LeaderboardItem {
            rank,
            player_id: name.to_lowercase(),
            player_name: name.to_string(),
            rating,
            matches_played: 4,
            matches_won: 3,
            matches_lost: 1,
            games_won: 9,
            games_lost: 6,
            win_rate: 75.0,
            game_win_rate: 60.0,
        }
    }

    #[test]
    fn renders_rows_and_cursor_hint() {
        colored::control::set_override(false);
        let out = render_leaderboard(
            &page(vec![item(1, "Ada", 1016), item(2, "Bob", 984)], Some("after:2".into())),
            ScoringFormat::OpenPlay,
        );

        assert!(out.contains("Rating"));
        assert!(out.contains("Ada"));
        assert!(out.contains("1016"));
        assert!(out.contains("75.0%"));
        assert!(out.contains("--cursor after:2"));
        assert!(out.contains("Updated 2024-03-01 18:00:00"));
    }

    #[test]
    fn empty_ladder_says_so() {
        colored::control::set_override(false);
        let out = render_leaderboard(&page(Vec::new(), None), ScoringFormat::Ladder);

        assert!(out.contains("Pos"));
        assert!(out.contains("No standings yet"));
        assert!(!out.contains("--cursor"));
    }

    #[test]
    fn match_pages_show_names_and_the_next_anchor() {
        colored::control::set_override(false);
        let page = MatchListPage {
            series_id: "spring".to_string(),
            items: vec![MatchView {
                id: 7,
                series_id: "spring".to_string(),
                player_a_id: "a".to_string(),
                player_a_name: "Ada".to_string(),
                player_b_id: "b".to_string(),
                player_b_name: "Bob".to_string(),
                score_a: 3,
                score_b: 1,
                played_at: at(0),
            }],
            next_after: Some(7),
            has_next_page: true,
            has_previous_page: false,
            total_matches: 4,
        };

        let out = render_matches(&page);

        assert!(out.contains("(4 matches)"));
        assert!(out.contains("2024-03-01 18:00  Ada 3-1 Bob"));
        assert!(out.contains("--after 7"));
    }
}
