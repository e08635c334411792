pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod pagination;
pub mod rating;
pub mod render;
pub mod services;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::Parser;
use cli::Cli;
use log::info;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::database::{MatchUpdate, NewMatch, NewSeries};
use crate::errors::StandingsError;
use crate::rating::{LadderVariant, MatchId, ScoringFormat};
use crate::services::StandingsServices;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_init(config: &AppConfig, reset: bool) -> Result<()> {
    let pool = database::create_pool(&config.database)?;
    let conn = database::get_connection(&pool)?;
    if reset {
        database::setup::reset_database(&conn)?;
        info!("Database {} reset", config.database.path);
    } else {
        database::setup::ensure_schema(&conn)?;
        info!("Database {} ready", config.database.path);
    }
    Ok(())
}

pub fn handle_add_series(config: &AppConfig, series: &NewSeries) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let conn = database::get_connection(&services.pool)?;
    let series = database::series::insert_series(&conn, series)?;
    println!(
        "Added {} series {} ({}), best of {}",
        series.format, series.id, series.name, series.sets_to_play
    );
    Ok(())
}

/// Series registration from the command line; window days start at midnight.
pub fn new_series_from_args(
    id: &str,
    name: &str,
    format: ScoringFormat,
    variant: LadderVariant,
    sets_to_play: i32,
    starts: Option<NaiveDate>,
    ends: Option<NaiveDate>,
) -> NewSeries {
    let midnight = |day: NaiveDate| day.and_time(NaiveTime::MIN);
    NewSeries {
        ladder_variant: variant,
        sets_to_play,
        starts_at: starts.map(midnight),
        ends_at: ends.map(midnight),
        ..NewSeries::new(id, name, format)
    }
}

pub fn handle_add_player(config: &AppConfig, id: &str, name: &str) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let conn = database::get_connection(&services.pool)?;
    let player = database::players::upsert_player(&conn, id, name)?;
    println!("Player {} is {}", player.id, player.display_name);
    Ok(())
}

/// Drops a player's directory entry. Their matches and cached standings stay
/// and show the placeholder name from then on.
pub fn handle_remove_player(config: &AppConfig, id: &str) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let conn = database::get_connection(&services.pool)?;
    let player = database::players::find_by_id(&conn, id)?
        .ok_or_else(|| StandingsError::PlayerNotFound(id.to_string()))?;
    database::players::delete_player(&conn, id)?;
    info!("Removed player {}", player.id);
    println!("Removed player {} ({})", player.id, player.display_name);
    Ok(())
}

pub fn handle_report(config: &AppConfig, new_match: NewMatch) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let stored = services.matches.report_match(new_match)?;
    println!(
        "Match {}: {} {}-{} {}",
        stored.id, stored.player_a_id, stored.score_a, stored.score_b, stored.player_b_id
    );
    Ok(())
}

pub fn handle_edit_match(config: &AppConfig, id: MatchId, update: MatchUpdate) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let stored = services.matches.update_match(id, update)?;
    println!(
        "Match {} is now {} {}-{} {} at {}",
        stored.id,
        stored.player_a_id,
        stored.score_a,
        stored.score_b,
        stored.player_b_id,
        stored.played_at
    );
    Ok(())
}

pub fn handle_delete_match(config: &AppConfig, id: MatchId) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let removed = services.matches.delete_match(id)?;
    println!("Deleted match {} from series {}", removed.id, removed.series_id);
    Ok(())
}

pub fn handle_reorder(config: &AppConfig, ids: &[MatchId]) -> Result<()> {
    let services = StandingsServices::new(config)?;
    for m in services.matches.reorder_matches(ids)? {
        println!("Match {} at {}", m.id, m.played_at);
    }
    Ok(())
}

pub fn handle_recalculate(config: &AppConfig, series_id: &str) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let summary = services.engine.recalculate_standings(series_id)?;
    println!(
        "Recalculated {} ({}): {} matches replayed, {} players ranked",
        summary.series_id, summary.format, summary.matches_replayed, summary.players_ranked
    );
    Ok(())
}

pub fn handle_leaderboard(
    config: &AppConfig,
    series_id: &str,
    page_size: usize,
    cursor: Option<&str>,
    json: bool,
) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let page = services.leaderboard.get_leaderboard(series_id, page_size, cursor)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }
    let conn = database::get_connection(&services.pool)?;
    let series = database::series::find_by_id(&conn, series_id)?
        .ok_or_else(|| StandingsError::SeriesNotFound(series_id.to_string()))?;
    print!("{}", render::render_leaderboard(&page, series.format));
    Ok(())
}

pub fn handle_matches(
    config: &AppConfig,
    series_id: &str,
    page_size: usize,
    after: Option<MatchId>,
    json: bool,
) -> Result<()> {
    let services = StandingsServices::new(config)?;
    let page = services.matches.list_matches(series_id, page_size, after)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print!("{}", render::render_matches(&page));
    }
    Ok(())
}

/// Match time given on the command line, or now.
pub fn played_at_or_now(at: Option<NaiveDateTime>) -> NaiveDateTime {
    at.unwrap_or_else(|| Utc::now().naive_utc())
}
