//! CLI presentation: text rendering for run summaries, plans, status, and conversion reports.

use crate::generation::{Completion, PlannedAction, PlannedItem, RunSummary};
use crate::optimize::OptimizeReport;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_run_summary_text(summary: &RunSummary) -> String {
    let elapsed = summary.finished_at - summary.started_at;
    format!(
        "{}\nGenerated: {}\nSkipped (already on disk): {}\nElapsed: {}s\nAll assets saved to {}",
        section_heading("Generation complete"),
        summary.processed,
        summary.skipped,
        elapsed.num_seconds(),
        summary.output_dir.display()
    )
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn completion_label(completion: &Completion) -> String {
    match completion {
        Completion::Complete => format!("{}", "complete".green()),
        Completion::Partial { present, expected } => {
            format!("{}", format!("partial {}/{}", present, expected).yellow())
        }
        Completion::Missing => format!("{}", "pending".dimmed()),
    }
}

/// Dry-run view: what each item would do and which reference it would be conditioned on.
pub fn format_plan_text(plan: &[PlannedItem], output_dir: &Path) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Item", "Action", "Reference"]);

    let mut to_generate = 0;
    for (idx, item) in plan.iter().enumerate() {
        let (action, reference) = match &item.action {
            PlannedAction::Skip => ("skip".to_string(), "-".to_string()),
            PlannedAction::Generate { reference } => {
                to_generate += 1;
                match reference {
                    None => ("generate (fresh)".to_string(), "-".to_string()),
                    Some(r) => (
                        "generate (conditioned)".to_string(),
                        display_relative(r, output_dir),
                    ),
                }
            }
        };
        table.add_row(vec![
            (idx + 1).to_string(),
            item.identifier.clone(),
            action,
            reference,
        ]);
    }

    format!(
        "{}\n{}\n{} to generate, {} already complete",
        section_heading("Dry run"),
        table,
        to_generate,
        plan.len() - to_generate
    )
}

/// Per-item completion table.
pub fn format_status_text(plan: &[PlannedItem], output_dir: &Path) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Item", "State", "Outputs"]);

    let complete = plan
        .iter()
        .filter(|p| p.completion == Completion::Complete)
        .count();
    for item in plan {
        let outputs: Vec<String> = item
            .outputs
            .iter()
            .map(|p| display_relative(p, output_dir))
            .collect();
        table.add_row(vec![
            item.identifier.clone(),
            completion_label(&item.completion),
            outputs.join(", "),
        ]);
    }

    format!(
        "{}\nOutput directory: {}\n{}\n{}/{} complete",
        section_heading("Asset status"),
        output_dir.display(),
        table,
        complete,
        plan.len()
    )
}

pub fn format_optimize_report_text(report: &OptimizeReport, root: &Path) -> String {
    let mut out = format!(
        "{}\nConverted: {}\nSkipped (up to date): {}\nFailed: {}",
        section_heading("Image optimization complete"),
        report.converted.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for failure in &report.failed {
        out.push_str(&format!(
            "\n  {} {}: {}",
            "✗".red(),
            display_relative(&failure.path, root),
            failure.error
        ));
    }
    out
}
