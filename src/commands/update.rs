use clap::ArgMatches;
use colored::*;

use crate::cli_context::CliContext;
use crate::controllers::{DetailState, IssueDetailController};
use crate::error::{CivicError, CivicResult, ErrorContext};
use crate::formatting::format_status_color;
use crate::models::{department_name, Issue, IssueStatus};

fn print_updated(issue: &Issue, department: &str) {
    println!("{}: {}", "ID".bold(), issue.id.bright_blue().bold());
    println!("{}: {}", "Title".bold(), issue.title);
    println!("{}: {}", "Status".bold(), format_status_color(&issue.status));
    println!("{}: {}", "Department".bold(), department);
}

/// Loads the issue, applies the requested edits through the detail
/// controller and saves them in one request.
pub async fn handle_update(matches: &ArgMatches) -> CivicResult<()> {
    let issue_id = matches
        .get_one::<String>("id")
        .context("Issue ID is required")?;

    let status = match matches.get_one::<String>("status") {
        Some(raw) => Some(
            IssueStatus::parse_known(raw)
                .ok_or_else(|| CivicError::Validation(format!("Unknown status '{}'", raw)))?,
        ),
        None => None,
    };
    let department = if matches.get_flag("unassign") {
        Some(None)
    } else {
        matches.get_one::<String>("department").map(|d| Some(d.clone()))
    };

    if status.is_none() && department.is_none() {
        return Err(CivicError::Validation(
            "No fields to update. Provide --status, --department or --unassign.".to_string(),
        ));
    }

    let mut context = CliContext::load()?;
    let mut controller = IssueDetailController::new(context.api()?, issue_id.clone());
    if let DetailState::Failed(message) = controller.load().await {
        return Err(CivicError::Network(message.clone()));
    }

    if let Some(status) = status {
        controller.set_status(status)?;
    }
    if let Some(department_id) = department {
        controller.set_department(department_id)?;
    }

    if !controller.is_dirty() {
        println!("{}", "Nothing to change; the issue already has these values.".dimmed());
        return Ok(());
    }

    controller.save().await?;
    match controller.state() {
        DetailState::SaveSucceeded(issue) => {
            println!("{} {}", "✅".green(), "Changes saved successfully!".green().bold());
            print_updated(
                issue,
                department_name(controller.departments(), issue.department_id.as_deref()),
            );
            Ok(())
        }
        DetailState::SaveFailed(message) => Err(CivicError::Network(message.clone())),
        other => Err(CivicError::State(format!("Unexpected state after save: {:?}", other))),
    }
}

pub async fn handle_assign(matches: &ArgMatches) -> CivicResult<()> {
    let issue_id = matches
        .get_one::<String>("id")
        .context("Issue ID is required")?;
    let department_id = matches
        .get_one::<String>("department")
        .context("Department ID is required")?;

    let mut context = CliContext::load()?;
    let issue = context.client()?.assign_issue(issue_id, department_id).await?;

    println!("{} {}", "✅".green(), "Issue assigned.".green().bold());
    print_updated(&issue, issue.department_id.as_deref().unwrap_or("Unassigned"));
    Ok(())
}

pub async fn handle_resolve(matches: &ArgMatches) -> CivicResult<()> {
    let issue_id = matches
        .get_one::<String>("id")
        .context("Issue ID is required")?;

    let mut context = CliContext::load()?;
    let issue = context.client()?.resolve_issue(issue_id).await?;

    println!("{} {}", "✅".green(), "Issue resolved.".green().bold());
    print_updated(&issue, issue.department_id.as_deref().unwrap_or("Unassigned"));
    Ok(())
}
