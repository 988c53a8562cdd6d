use std::path::PathBuf;
use std::process;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use colored::*;
use tracing::{error, info};

use civic_issues::commands::analytics::handle_analytics;
use civic_issues::commands::auth::handle_auth;
use civic_issues::commands::issues::{handle_departments, handle_issue, handle_issues};
use civic_issues::commands::map::handle_map;
use civic_issues::commands::submit::handle_submit;
use civic_issues::commands::update::{handle_assign, handle_resolve, handle_update};
use civic_issues::error::CivicResult;
use civic_issues::logging::{get_log_file_path, init_logging, log_panic_info};

const STATUSES: [&str; 5] = ["pending", "assigned", "in_progress", "resolved", "closed"];

fn issue_id_arg() -> Arg {
    Arg::new("id")
        .value_name("ISSUE_ID")
        .help("Issue id")
        .required(true)
        .index(1)
}

/// Filters shared by `issues` and `map`.
fn list_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("status")
                .long("status")
                .value_name("STATUS")
                .help("Only issues with this status")
                .value_parser(STATUSES),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .value_name("CATEGORY")
                .help("Only issues in this category"),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("N")
                .help("Maximum number of issues to fetch (default 50, max 200)"),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .value_name("N")
                .help("Number of issues to skip"),
        )
}

fn build_cli() -> Command {
    Command::new("civic")
        .about("Civic issues CLI - report, triage and map neighbourhood issues")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Write debug output to the log file")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("auth")
                .about("Configure the backend and sign in")
                .arg(
                    Arg::new("token")
                        .long("token")
                        .value_name("TOKEN")
                        .help("Save an access token for staff requests"),
                )
                .arg(
                    Arg::new("api-url")
                        .long("api-url")
                        .value_name("URL")
                        .help("Save the backend base URL"),
                )
                .arg(
                    Arg::new("email")
                        .long("email")
                        .value_name("EMAIL")
                        .help("Request a one-time sign-in link"),
                )
                .arg(
                    Arg::new("logout")
                        .long("logout")
                        .help("Forget the saved access token")
                        .conflicts_with("token")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            list_args(Command::new("issues").about("List and filter issues"))
                .arg(
                    Arg::new("search")
                        .long("search")
                        .short('s')
                        .value_name("TEXT")
                        .help("Match title, description or id"),
                )
                .arg(
                    Arg::new("mine")
                        .long("mine")
                        .help("Issues assigned to your department (staff only)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_name("FORMAT")
                        .help("Output format")
                        .value_parser(["simple", "table", "json"])
                        .default_value("simple"),
                ),
        )
        .subcommand(
            Command::new("issue")
                .about("View a single issue with comments")
                .arg(issue_id_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_name("FORMAT")
                        .value_parser(["detail", "json"])
                        .default_value("detail"),
                ),
        )
        .subcommand(
            Command::new("update")
                .about("Change an issue's status or department")
                .arg(issue_id_arg())
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_name("STATUS")
                        .help("New status")
                        .value_parser(STATUSES),
                )
                .arg(
                    Arg::new("department")
                        .long("department")
                        .short('d')
                        .value_name("DEPARTMENT_ID")
                        .help("Route to this department"),
                )
                .arg(
                    Arg::new("unassign")
                        .long("unassign")
                        .help("Remove the department")
                        .conflicts_with("department")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("assign")
                .about("Assign an issue to a department (staff only)")
                .arg(issue_id_arg())
                .arg(
                    Arg::new("department")
                        .value_name("DEPARTMENT_ID")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Mark an issue resolved (staff only)")
                .arg(issue_id_arg()),
        )
        .subcommand(
            Command::new("submit")
                .about("Report a new issue at a location")
                .arg(
                    Arg::new("description")
                        .long("description")
                        .short('m')
                        .value_name("TEXT")
                        .help("What is wrong")
                        .required(true),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .short('t')
                        .value_name("TITLE")
                        .help("Title (defaults to the start of the description)"),
                )
                .arg(
                    Arg::new("lat")
                        .long("lat")
                        .value_name("LAT")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("lng")
                        .long("lng")
                        .value_name("LNG")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("photo")
                        .long("photo")
                        .short('p')
                        .value_name("FILE")
                        .help("Attach a photo (repeatable)")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            list_args(Command::new("map").about("Show located issues on a map")).arg(
                Arg::new("list")
                    .long("list")
                    .help("Print markers instead of opening the map view")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("analytics")
                .about("Chart issue counts")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .value_name("DAYS")
                        .value_parser(value_parser!(u32).range(1..)),
                )
                .arg(
                    Arg::new("by")
                        .long("by")
                        .value_parser(["time", "status", "category"])
                        .default_value("time"),
                )
                .arg(
                    Arg::new("svg")
                        .long("svg")
                        .value_name("FILE")
                        .help("Write the chart as SVG instead of printing it")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("response-times")
                        .long("response-times")
                        .help("Also show average response time (admin only)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("hotspots")
                        .long("hotspots")
                        .help("Also list hotspots (admin only)")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("departments").about("List departments"))
}

async fn dispatch(matches: &ArgMatches) -> CivicResult<()> {
    match matches.subcommand() {
        Some(("auth", sub_matches)) => handle_auth(sub_matches).await,
        Some(("issues", sub_matches)) => handle_issues(sub_matches).await,
        Some(("issue", sub_matches)) => handle_issue(sub_matches).await,
        Some(("update", sub_matches)) => handle_update(sub_matches).await,
        Some(("assign", sub_matches)) => handle_assign(sub_matches).await,
        Some(("resolve", sub_matches)) => handle_resolve(sub_matches).await,
        Some(("submit", sub_matches)) => handle_submit(sub_matches).await,
        Some(("map", sub_matches)) => handle_map(sub_matches).await,
        Some(("analytics", sub_matches)) => handle_analytics(sub_matches).await,
        Some(("departments", sub_matches)) => handle_departments(sub_matches).await,
        _ => {
            eprintln!("Unknown command. Use 'civic --help' for available commands.");
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    if let Err(e) = init_logging(matches.get_flag("verbose")) {
        eprintln!("{} could not start logging: {}", "Warning:".yellow(), e);
    }

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        log_panic_info(panic_info);
        default_hook(panic_info);
    }));

    info!("civic {} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = dispatch(&matches).await {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e.user_message());
        if let Some(path) = get_log_file_path() {
            eprintln!("{}", format!("Details in {}", path.display()).dimmed());
        }
        process::exit(1);
    }
}
