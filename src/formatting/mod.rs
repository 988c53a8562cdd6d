pub mod chart;
pub mod issues;
pub mod utils;

pub use chart::{print_bar_chart, print_response_times};
pub use issues::{format_status_color, get_status_icon, print_departments, print_issue_detail, print_issues, print_markers};
pub use utils::{format_date, format_relative_time, format_timestamp, truncate};
