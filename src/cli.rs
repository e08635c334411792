use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

use crate::rating::{LadderVariant, MatchId, ScoringFormat};

#[derive(Parser, Debug)]
#[command(author, version, about = "series standings engine")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Create the database schema
    Init {
        /// Drop all existing data first
        #[arg(long)]
        reset: bool,
    },
    /// Register a series
    AddSeries {
        id: String,
        name: String,
        /// open_play or ladder
        #[arg(long, default_value = "open_play")]
        format: ScoringFormat,
        /// classic or aggressive (ladders only)
        #[arg(long, default_value = "classic")]
        variant: LadderVariant,
        /// Odd number of sets in a match; the winner takes a majority
        #[arg(long, default_value_t = 5)]
        sets_to_play: i32,
        /// First day matches may be played on
        #[arg(long)]
        starts: Option<NaiveDate>,
        /// Last day matches may be played on
        #[arg(long)]
        ends: Option<NaiveDate>,
    },
    /// Register or rename a player
    AddPlayer { id: String, name: String },
    /// Remove a player's name; their matches and standings stay
    RemovePlayer { id: String },
    /// Report a match result and refresh the series standings
    Report {
        series: String,
        player_a: String,
        player_b: String,
        score_a: i32,
        score_b: i32,
        /// When the match was played (defaults to now), e.g. 2024-03-01T18:00:00
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },
    /// Change the score or time of a match
    EditMatch {
        id: MatchId,
        #[arg(long)]
        score_a: Option<i32>,
        #[arg(long)]
        score_b: Option<i32>,
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },
    /// Delete a match
    DeleteMatch { id: MatchId },
    /// Put same-day matches into the given order
    Reorder {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<MatchId>,
    },
    /// List the matches of a series in replay order
    Matches {
        series: String,
        /// Rows per page (0 for the default)
        #[arg(long, default_value_t = 0)]
        page_size: usize,
        /// Match id printed at the end of the previous page
        #[arg(long)]
        after: Option<MatchId>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Rebuild the standings of a series from its match history
    Recalculate { series: String },
    /// Show a page of the standings
    Leaderboard {
        series: String,
        /// Rows per page (0 for the default)
        #[arg(long, default_value_t = 0)]
        page_size: usize,
        /// Cursor printed by the previous page
        #[arg(long)]
        cursor: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
