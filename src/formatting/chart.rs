use colored::*;

use crate::models::ResponseTimes;
use crate::viz::Bar;

const TERMINAL_BAR_WIDTH: usize = 40;

/// Horizontal terminal rendering of chart geometry: bar length follows the
/// scaled height, so it matches what the SVG shows.
pub fn print_bar_chart(title: &str, bars: &[Bar], max_bar_height: f64) {
    println!("\n{}", title.bold());
    println!("{}", "─".repeat(60).dimmed());

    if bars.is_empty() {
        println!("{}", "No data.".dimmed());
        return;
    }

    let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    for bar in bars {
        let cells = if max_bar_height > 0.0 {
            ((bar.height / max_bar_height) * TERMINAL_BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        println!(
            "{:<width$} {} {}",
            bar.label,
            "█".repeat(cells).blue(),
            bar.value,
            width = label_width
        );
    }
}

pub fn print_response_times(times: &ResponseTimes) {
    match times.average_hours {
        Some(hours) => println!(
            "{}: {:.1}h across {} resolved issue(s)",
            "Average response time".bold(),
            hours,
            times.count
        ),
        None => println!("{}: {}", "Average response time".bold(), "no resolved issues".dimmed()),
    }
}
