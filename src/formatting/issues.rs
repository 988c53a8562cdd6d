use colored::*;

use super::utils::*;
use crate::controllers::{DetailState, IssueDetailController};
use crate::models::{department_name, Department, Issue, IssueStatus};
use crate::viz::Marker;

pub fn format_status_color(status: &IssueStatus) -> ColoredString {
    let label = status.label();
    match status {
        IssueStatus::Pending => label.normal(),
        IssueStatus::Assigned => label.cyan(),
        IssueStatus::InProgress => label.yellow(),
        IssueStatus::Resolved => label.green(),
        IssueStatus::Closed => label.dimmed(),
        IssueStatus::Unknown(_) => label.magenta(),
    }
}

pub fn get_status_icon(status: &IssueStatus) -> &'static str {
    match status {
        IssueStatus::Pending => "○",
        IssueStatus::Assigned => "◔",
        IssueStatus::InProgress => "◐",
        IssueStatus::Resolved => "✓",
        IssueStatus::Closed => "✗",
        IssueStatus::Unknown(_) => "•",
    }
}

fn location_text(issue: &Issue) -> ColoredString {
    match issue.coordinate() {
        Some(c) => c.to_string().normal(),
        None => "unlocated".dimmed(),
    }
}

pub fn print_issues(issues: &[Issue], format: &str) -> Result<(), serde_json::Error> {
    if issues.is_empty() {
        println!("{}", "No issues found.".dimmed());
        return Ok(());
    }

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&issues)?);
        }
        "table" => {
            println!("{}", "─".repeat(110).dimmed());
            println!(
                "{:<38} {:<32} {:<12} {:<24}",
                "ID".bold(),
                "Title".bold(),
                "Status".bold(),
                "Location".bold()
            );
            println!("{}", "─".repeat(110).dimmed());

            for issue in issues {
                println!(
                    "{:<38} {:<32} {:<12} {:<24}",
                    issue.id.blue(),
                    truncate(&issue.title, 32),
                    format_status_color(&issue.status),
                    location_text(issue)
                );
            }
            println!("{}", "─".repeat(110).dimmed());
        }
        _ => {
            // Group by status in workflow order, unknown statuses last
            let mut order: Vec<IssueStatus> = IssueStatus::KNOWN.to_vec();
            for issue in issues {
                if !order.contains(&issue.status) {
                    order.push(issue.status.clone());
                }
            }

            for status in &order {
                let group: Vec<&Issue> = issues.iter().filter(|i| &i.status == status).collect();
                if group.is_empty() {
                    continue;
                }

                println!(
                    "\n{} {} ({})",
                    get_status_icon(status),
                    format_status_color(status).bold(),
                    group.len()
                );
                println!("{}", "─".repeat(50).dimmed());

                for issue in group {
                    let preview = first_line(&issue.description);
                    let preview = if preview.is_empty() || preview == issue.title {
                        String::new()
                    } else {
                        format!("\n    {}", truncate(preview, 70).dimmed())
                    };
                    let category = issue
                        .category
                        .as_deref()
                        .map(|c| format!(" [{}]", c.cyan()))
                        .unwrap_or_default();

                    println!(
                        "  {} - {}{} ({}){}",
                        issue.id.blue(),
                        issue.title,
                        category,
                        issue
                            .created_at
                            .as_deref()
                            .map(format_relative_time)
                            .unwrap_or_else(|| "unknown".to_string())
                            .dimmed(),
                        preview
                    );
                }
            }
        }
    }
    Ok(())
}

pub fn print_issue_detail(controller: &IssueDetailController) {
    let issue = match (controller.state(), controller.issue()) {
        (DetailState::Failed(message), _) => {
            println!("{} {}", "Error:".red().bold(), message.red());
            return;
        }
        (_, Some(issue)) => issue,
        (_, None) => {
            println!("{}", "Loading...".dimmed());
            return;
        }
    };

    println!("\n{}", "═".repeat(80).blue());
    println!("{} {}", issue.id.blue().bold(), issue.title.bold());
    println!("{}", "─".repeat(80).dimmed());

    println!(
        "{}: {} | {}: {} | {}: {}",
        "Status".dimmed(),
        format_status_color(&issue.status),
        "Category".dimmed(),
        issue.category.as_deref().unwrap_or("N/A"),
        "Reported".dimmed(),
        issue
            .created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!(
        "{}: {}",
        "Department".dimmed(),
        department_name(controller.departments(), issue.department_id.as_deref())
    );
    println!("{}: {}", "Location".dimmed(), location_text(issue));

    if !issue.description.trim().is_empty() {
        println!("\n{}", "Description".bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}", issue.description);
    }

    if !issue.images.is_empty() {
        println!("\n{}", "Photos".bold());
        println!("{}", "─".repeat(40).dimmed());
        for image in &issue.images {
            println!("  {} {}", "▸".cyan(), image.url.blue().underline());
        }
    }

    println!("\n{}", "Comments".bold());
    println!("{}", "─".repeat(40).dimmed());
    if controller.comments().is_empty() {
        println!("{}", "No comments yet.".dimmed());
    } else {
        for comment in controller.comments() {
            println!("  {}", comment.text);
            println!(
                "  {} {} on {}",
                "By:".dimmed(),
                comment.author().green(),
                comment
                    .created_at
                    .as_deref()
                    .map(format_date)
                    .unwrap_or_else(|| "unknown".to_string())
                    .dimmed()
            );
        }
    }

    if let Some(message) = controller.message() {
        let styled = match controller.state() {
            DetailState::SaveFailed(_) => message.red(),
            DetailState::SaveSucceeded(_) => message.green(),
            _ => message.normal(),
        };
        println!("\n{}", styled);
    }

    println!("\n{}", "═".repeat(80).blue());
}

pub fn print_departments(departments: &[Department]) {
    if departments.is_empty() {
        println!("{}", "No departments found.".dimmed());
        return;
    }
    println!("{}", "Departments:".bold());
    for department in departments {
        println!("  {} - {}", department.id.cyan(), department.name);
    }
}

pub fn print_markers(markers: &[Marker]) {
    for marker in markers {
        println!(
            "  {} {} {} ({}) {}",
            "◉".red(),
            marker.coordinate.to_string().cyan(),
            marker.title.bold(),
            format_status_color(&marker.status),
            marker.detail_link.dimmed()
        );
    }
}
