use clap::ArgMatches;
use colored::*;

use super::issues::query_from_matches;
use crate::cli_context::CliContext;
use crate::controllers::IssueBoard;
use crate::error::{CivicError, CivicResult};
use crate::formatting::print_markers;
use crate::interactive::run_map_view;

pub async fn handle_map(matches: &ArgMatches) -> CivicResult<()> {
    let mut context = CliContext::load()?;
    let mut board = IssueBoard::new(context.api()?, query_from_matches(matches)?);

    if !board.refresh().await {
        let message = board
            .error_message
            .take()
            .unwrap_or_else(|| "Failed to load issues".to_string());
        return Err(CivicError::Network(message));
    }

    if matches.get_flag("list") {
        let viewport = board.viewport();
        let markers = board.markers();
        println!(
            "{} {} at zoom {} ({} of {} issues located)",
            "Map centre".bold(),
            viewport.center.to_string().cyan(),
            viewport.zoom,
            markers.len(),
            board.issues.len()
        );
        print_markers(&markers);
        return Ok(());
    }

    run_map_view(&mut board).await
}
