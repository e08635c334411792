use anyhow::Result;

use series_standings::cli::Command;
use series_standings::config::settings::AppConfig;
use series_standings::database::{MatchUpdate, NewMatch};
use series_standings::{
    handle_add_player, handle_add_series, handle_delete_match, handle_edit_match, handle_init,
    handle_leaderboard, handle_matches, handle_recalculate, handle_remove_player, handle_reorder,
    handle_report, interpret, new_series_from_args, played_at_or_now,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    let config = AppConfig::from_env();
    execute_command(&config, &command)
}

fn execute_command(config: &AppConfig, command: &Command) -> Result<()> {
    match command {
        Command::Init { reset } => handle_init(config, *reset),
        Command::AddSeries {
            id,
            name,
            format,
            variant,
            sets_to_play,
            starts,
            ends,
        } => handle_add_series(
            config,
            &new_series_from_args(id, name, *format, *variant, *sets_to_play, *starts, *ends),
        ),
        Command::AddPlayer { id, name } => handle_add_player(config, id, name),
        Command::RemovePlayer { id } => handle_remove_player(config, id),
        Command::Report {
            series,
            player_a,
            player_b,
            score_a,
            score_b,
            at,
        } => handle_report(
            config,
            NewMatch {
                series_id: series.clone(),
                player_a_id: player_a.clone(),
                player_b_id: player_b.clone(),
                score_a: *score_a,
                score_b: *score_b,
                played_at: played_at_or_now(*at),
            },
        ),
        Command::EditMatch {
            id,
            score_a,
            score_b,
            at,
        } => handle_edit_match(
            config,
            *id,
            MatchUpdate {
                score_a: *score_a,
                score_b: *score_b,
                played_at: *at,
            },
        ),
        Command::DeleteMatch { id } => handle_delete_match(config, *id),
        Command::Reorder { ids } => handle_reorder(config, ids),
        Command::Matches {
            series,
            page_size,
            after,
            json,
        } => handle_matches(config, series, *page_size, *after, *json),
        Command::Recalculate { series } => handle_recalculate(config, series),
        Command::Leaderboard {
            series,
            page_size,
            cursor,
            json,
        } => handle_leaderboard(config, series, *page_size, cursor.as_deref(), *json),
    }
}
