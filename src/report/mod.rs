pub mod types;

pub use types::{Report, Urgency};

use crate::comment::ParsedComment;
use crate::parser::BatchOutcome;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Build a Report from a parsed batch and the actionable comments picked from it.
pub fn build(
    title: impl Into<String>,
    outcome: &BatchOutcome,
    actionable: Vec<ParsedComment>,
) -> Report {
    let top_urgency = actionable
        .iter()
        .map(|c| Urgency::from_issue_type(c.issue_type.as_deref()))
        .max()
        .unwrap_or(Urgency::Info);

    Report {
        title: title.into(),
        total_comments: outcome.comments.len(),
        bot_comments: outcome.parsed_count() + outcome.failures.len(),
        failures: outcome.failures.len(),
        actionable,
        top_urgency,
    }
}

/// Output the report to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(title = %report.title, actionable = report.actionable.len()))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

/// Location of a comment as `path:line`, `path`, or its URL.
fn location(comment: &ParsedComment) -> String {
    match (&comment.raw.path, comment.raw.line) {
        (Some(path), Some(line)) => format!("{}:{}", path, line),
        (Some(path), None) => path.clone(),
        _ => comment.raw.url.clone(),
    }
}

fn print_terminal_report(report: &Report) {
    println!();
    println!("Review comments for {}", report.title.bold());
    println!(
        "Comments: {} | From bot: {} | Actionable: {} | Parse failures: {}",
        report.total_comments,
        report.bot_comments,
        report.actionable.len(),
        report.failures
    );
    println!();

    if report.actionable.is_empty() {
        println!("  No actionable comments.");
        println!();
        return;
    }

    for comment in &report.actionable {
        let urgency = Urgency::from_issue_type(comment.issue_type.as_deref());
        println!(
            "═══ {} {} ═══",
            colorize_urgency(urgency),
            comment.issue_type.as_deref().unwrap_or("Comment")
        );
        println!("  {}", location(comment).dimmed());
        if let Some(summary) = &comment.summary {
            println!("  {}", summary);
        }
        if !comment.tools.is_empty() {
            println!("  Tools: {}", comment.tools.join(", "));
        }
        let mut offers = Vec::new();
        if comment.ai_prompt.is_some() {
            offers.push("AI prompt");
        }
        if comment.suggested_code.is_some() {
            offers.push("suggestion");
        }
        if comment.committable_suggestion.is_some() {
            offers.push("committable suggestion");
        }
        println!("  Provides: {}", offers.join(", "));
        println!();
    }

    println!("═══ Highest urgency: {} ═══", colorize_urgency(report.top_urgency));
    println!();
}

/// Markdown carries the full prompt and suggestion text so the file can be
/// handed to an agent as-is.
fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str(&format!("# Review comments for {}\n\n", report.title));
    md.push_str(&format!(
        "**Comments:** {} | **From bot:** {} | **Actionable:** {} | **Parse failures:** {}\n\n",
        report.total_comments,
        report.bot_comments,
        report.actionable.len(),
        report.failures
    ));

    if report.actionable.is_empty() {
        md.push_str("No actionable comments.\n");
    }

    for comment in &report.actionable {
        let urgency = Urgency::from_issue_type(comment.issue_type.as_deref());
        md.push_str(&format!(
            "## [{}] {}\n\n",
            urgency,
            comment.summary.as_deref().unwrap_or("Review comment")
        ));
        md.push_str(&format!("- **Location:** `{}`\n", location(comment)));
        md.push_str(&format!("- **Link:** {}\n", comment.raw.url));
        if let Some(issue_type) = &comment.issue_type {
            md.push_str(&format!("- **Type:** {}\n", issue_type));
        }
        if !comment.tools.is_empty() {
            md.push_str(&format!("- **Tools:** {}\n", comment.tools.join(", ")));
        }
        md.push('\n');

        if let Some(prompt) = &comment.ai_prompt {
            md.push_str("### Prompt\n\n");
            md.push_str(&format!("```\n{}\n```\n\n", prompt));
        }
        if let Some(code) = comment
            .committable_suggestion
            .as_ref()
            .or(comment.suggested_code.as_ref())
        {
            md.push_str("### Suggested code\n\n");
            md.push_str(&format!("```\n{}\n```\n\n", code));
        }
    }

    md.push_str(&format!("## Highest urgency: {}\n", report.top_urgency));

    std::fs::write(path, md)?;
    Ok(())
}

fn colorize_urgency(urgency: Urgency) -> colored::ColoredString {
    match urgency {
        Urgency::Issue => "ISSUE".red().bold(),
        Urgency::Refactor => "REFACTOR".yellow().bold(),
        Urgency::Info => "INFO".green().bold(),
    }
}
