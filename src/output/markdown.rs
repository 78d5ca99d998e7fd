//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a finished crawl.

use crate::output::traits::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a crawl to `output_path`
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Website Checker Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", summary.normalized_start_url));
    md.push_str(&format!("- **Domain**: {}\n", summary.base_domain));
    md.push_str(&format!("- **Mode**: {}\n", summary.mode));
    md.push_str(&format!("- **Workers**: {}\n", summary.worker_count));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    let seconds = summary.duration.as_secs_f64();
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds ({:.2} minutes)\n",
        seconds,
        seconds / 60.0
    ));
    md.push_str(&format!("- **Termination**: {}\n", summary.termination));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Resources Recorded**: {}\n", summary.records_emitted));
    md.push_str(&format!("- **URLs Visited**: {}\n", summary.visited));
    md.push_str(&format!(
        "- **Downloaded**: {:.1} KiB\n",
        summary.bytes_downloaded as f64 / 1024.0
    ));
    md.push_str(&format!("- **Deepest Level**: {}\n", summary.max_depth_seen));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", summary.success_rate()));
    md.push_str(&format!("- **Error Rate**: {:.2}%\n\n", summary.error_rate()));

    // Outcome breakdown
    md.push_str("## Outcome Breakdown\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Succeeded | {} |\n", summary.succeeded));
    md.push_str(&format!("| Failed | {} |\n", summary.failed));
    md.push_str(&format!("| Duplicate Content | {} |\n", summary.duplicates));
    md.push_str(&format!("| Blocked by robots.txt | {} |\n", summary.robots_blocked));
    md.push_str(&format!("| Invalid Links | {} |\n", summary.invalid_urls));
    md.push_str(&format!(
        "| Dropped (URL budget) | {} |\n",
        summary.budget_rejections
    ));
    md.push_str(&format!(
        "| Left in Queue | {} |\n\n",
        summary.queued_remaining
    ));

    md
}
