use std::path::PathBuf;
use std::sync::Arc;

use clap::ArgMatches;
use colored::*;

use crate::cli_context::CliContext;
use crate::controllers::{FixedLocation, IssueSubmissionController, Photo, SubmissionDraft};
use crate::error::{CivicError, CivicResult, ErrorContext};
use crate::models::Coordinate;

fn parse_coordinate(matches: &ArgMatches) -> CivicResult<Option<Coordinate>> {
    let lat = matches.get_one::<f64>("lat").copied();
    let lng = matches.get_one::<f64>("lng").copied();
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Some(Coordinate::new(lat, lng))),
        (None, None) => Ok(None),
        _ => Err(CivicError::Validation("--lat and --lng must be given together".to_string())),
    }
}

pub async fn handle_submit(matches: &ArgMatches) -> CivicResult<()> {
    let description = matches
        .get_one::<String>("description")
        .context("Description is required")?;

    let mut draft = SubmissionDraft::new(description.clone());
    draft.title = matches.get_one::<String>("title").cloned();

    if let Some(paths) = matches.get_many::<PathBuf>("photo") {
        for path in paths {
            draft.photos.push(Photo::from_path(path).await?);
        }
    }

    let location = Arc::new(FixedLocation(parse_coordinate(matches)?));
    let mut context = CliContext::load()?;
    let mut controller = IssueSubmissionController::new(context.api()?, location);

    controller.init().await;
    if !controller.can_submit() {
        return Err(CivicError::Permission(
            "Location is required to report an issue; pass --lat and --lng".to_string(),
        ));
    }

    let receipt = controller.submit(&draft).await?;

    println!("{} {}", "✅".green(), "Issue reported successfully!".green().bold());
    println!("{}: {}", "ID".bold(), receipt.issue.id.bright_blue().bold());
    println!("{}: {}", "Title".bold(), receipt.issue.title);
    println!("{}: {}", "Link".bold(), receipt.issue.detail_link().bright_black());
    if !draft.photos.is_empty() {
        println!("{}: {}", "Photos".bold(), draft.photos.len());
    }

    match receipt.refreshed {
        Ok(issues) => println!("{}", format!("{} issues now on the board.", issues.len()).dimmed()),
        Err(e) => println!(
            "{} {}",
            "⚠".yellow(),
            format!("Could not refresh the issue list: {}", e.user_message()).yellow()
        ),
    }

    Ok(())
}
