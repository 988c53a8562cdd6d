use std::path::PathBuf;

use clap::ArgMatches;
use colored::*;
use tracing::info;

use crate::cli_context::CliContext;
use crate::client::IssueQuery;
use crate::constants::DEFAULT_HOTSPOT_DAYS;
use crate::controllers::IssueBoard;
use crate::error::{CivicError, CivicResult};
use crate::formatting::{print_bar_chart, print_response_times};
use crate::viz::{render_svg, ChartLayout, ChartPoint};

/// Charts issue counts. `--by time` (the default) uses the server's
/// per-day counts; `--by status` and `--by category` count the issue list.
pub async fn handle_analytics(matches: &ArgMatches) -> CivicResult<()> {
    let mut context = CliContext::load()?;
    let explicit_days = matches.get_one::<u32>("days").copied();
    let days = explicit_days.unwrap_or(context.config().analytics_days);
    let by = matches.get_one::<String>("by").map(|s| s.as_str()).unwrap_or("time");
    let api = context.api()?;

    let (title, points): (String, Vec<ChartPoint>) = match by {
        "time" => {
            let series = api.issues_by_time(days).await?;
            (
                format!("Issues reported, last {} days", days),
                series.iter().map(ChartPoint::from).collect(),
            )
        }
        "status" | "category" => {
            let mut board = IssueBoard::new(api, IssueQuery::default());
            if !board.refresh().await {
                let message = board
                    .error_message
                    .take()
                    .unwrap_or_else(|| "Failed to load issues".to_string());
                return Err(CivicError::Network(message));
            }
            if by == "status" {
                ("Issues by status".to_string(), board.status_counts())
            } else {
                ("Issues by category".to_string(), board.category_counts())
            }
        }
        other => return Err(CivicError::Validation(format!("Unknown grouping '{}'", other))),
    };

    let layout = ChartLayout::default();
    let bars = layout.scale(&points);

    if let Some(path) = matches.get_one::<PathBuf>("svg") {
        std::fs::write(path, render_svg(&bars, &layout))?;
        info!("Wrote chart to {}", path.display());
        println!("{} {}", "Chart written to".green(), path.display());
    } else {
        print_bar_chart(&title, &bars, layout.max_bar_height());
    }

    if matches.get_flag("response-times") {
        let times = context.client()?.response_times(days).await?;
        println!();
        print_response_times(&times);
    }

    if matches.get_flag("hotspots") {
        let window = hotspot_days(explicit_days);
        let hotspots = context.client()?.hotspots(window).await?;
        println!("\n{}", format!("Hotspots, last {} days", window).bold());
        if hotspots.is_empty() {
            println!("{}", "No hotspots.".dimmed());
        }
        for hotspot in hotspots {
            println!(
                "  {} {:.4},{:.4} ({} issues)",
                "◉".red(),
                hotspot.lat,
                hotspot.lon,
                hotspot.count
            );
        }
    }

    Ok(())
}

/// Hotspots look back over a longer window unless `--days` was given.
fn hotspot_days(explicit: Option<u32>) -> u32 {
    explicit.unwrap_or(DEFAULT_HOTSPOT_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotspot_window_follows_explicit_days() {
        assert_eq!(hotspot_days(Some(14)), 14);
        assert_eq!(hotspot_days(None), DEFAULT_HOTSPOT_DAYS);
    }
}
