//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; the route table dispatches to generation and optimize services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, GenerateArgs};
pub use presentation::{
    format_optimize_report_text, format_plan_text, format_run_summary_text, format_status_text,
    section_heading,
};
pub use route::RunContext;
