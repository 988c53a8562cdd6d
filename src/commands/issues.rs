use clap::ArgMatches;
use colored::*;
use tracing::debug;

use crate::cli_context::CliContext;
use crate::client::IssueQuery;
use crate::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::controllers::{DetailState, IssueBoard, IssueDetailController};
use crate::error::{CivicError, CivicResult, ErrorContext};
use crate::formatting::{print_departments, print_issue_detail, print_issues};
use crate::models::IssueStatus;

fn parse_number(matches: &ArgMatches, name: &str) -> CivicResult<Option<u32>> {
    match matches.get_one::<String>(name) {
        Some(raw) => raw
            .parse::<u32>()
            .map(Some)
            .map_err(|_| CivicError::Validation(format!("--{} must be a non-negative number, got '{}'", name, raw))),
        None => Ok(None),
    }
}

/// Builds the list query from `issues` flags. Status must be one of the known values.
pub fn query_from_matches(matches: &ArgMatches) -> CivicResult<IssueQuery> {
    let status = match matches.get_one::<String>("status") {
        Some(raw) => Some(
            IssueStatus::parse_known(raw)
                .ok_or_else(|| CivicError::Validation(format!("Unknown status '{}'", raw)))?
                .as_str()
                .to_string(),
        ),
        None => None,
    };

    let limit = parse_number(matches, "limit")?
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    Ok(IssueQuery {
        status,
        category: matches.get_one::<String>("category").cloned(),
        limit: Some(limit),
        offset: parse_number(matches, "offset")?,
    })
}

pub async fn handle_issues(matches: &ArgMatches) -> CivicResult<()> {
    let mut context = CliContext::load()?;
    let format = matches.get_one::<String>("format").map(|s| s.as_str()).unwrap_or("simple");

    if matches.get_flag("mine") {
        if !context.has_access_token() {
            return Err(CivicError::Permission(
                "--mine needs a signed-in staff account; run `civic auth --token <TOKEN>`".to_string(),
            ));
        }
        let client = context.client()?;
        let issues = client.staff_issues().await?;
        println!("Found {} issues assigned to your department:", issues.len());
        print_issues(&issues, format)?;
        return Ok(());
    }

    let query = query_from_matches(matches)?;
    debug!("Listing issues with {:?}", query);

    let mut board = IssueBoard::new(context.api()?, query);
    if !board.refresh().await {
        let message = board
            .error_message
            .take()
            .unwrap_or_else(|| "Failed to load issues".to_string());
        return Err(CivicError::Network(message));
    }

    if let Some(search) = matches.get_one::<String>("search") {
        board.set_search(search);
    }

    if format != "json" && !board.filtered_issues.is_empty() {
        println!("Found {} issues:", board.filtered_issues.len());
    }
    print_issues(&board.filtered_issues, format)?;
    Ok(())
}

pub async fn handle_issue(matches: &ArgMatches) -> CivicResult<()> {
    let issue_id = matches
        .get_one::<String>("id")
        .context("Issue ID is required")?;

    let mut context = CliContext::load()?;
    let mut controller = IssueDetailController::new(context.api()?, issue_id.clone());
    controller.load().await;

    if matches.get_one::<String>("format").map(|s| s.as_str()) == Some("json") {
        if let Some(issue) = controller.issue() {
            println!("{}", serde_json::to_string_pretty(issue)?);
        }
    } else {
        print_issue_detail(&controller);
    }

    match controller.state() {
        DetailState::Failed(message) => Err(CivicError::Network(message.clone())),
        _ => Ok(()),
    }
}

pub async fn handle_departments(_matches: &ArgMatches) -> CivicResult<()> {
    let mut context = CliContext::load()?;
    let departments = context.api()?.list_departments().await?;

    if !departments.is_empty() {
        println!("Found {} departments:", departments.len().to_string().bold());
    }
    print_departments(&departments);
    Ok(())
}
