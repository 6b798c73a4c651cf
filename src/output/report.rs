//! Plain-text sitemap report
//!
//! The report lists every collected page with its assets and child links,
//! each list cut down to the configured print limit.

use crate::config::OutputTarget;
use crate::crawler::CrawlOutcome;
use crate::state::Page;
use chrono::Local;
use std::fs::File;
use std::io::{self, Write};

/// Writes the sitemap report for a finished crawl
///
/// # Arguments
///
/// * `writer` - Destination of the report
/// * `outcome` - The finished crawl
/// * `start_url` - The URL the crawl was seeded with
/// * `print_limit` - Maximum assets and children listed per page
pub fn write_report<W: Write>(
    writer: &mut W,
    outcome: &CrawlOutcome,
    start_url: &str,
    print_limit: usize,
) -> io::Result<()> {
    writeln!(
        writer,
        "SiteMap from starting URL {}, total pages found {}.",
        start_url,
        outcome.sitemap.len()
    )?;
    writeln!(
        writer,
        "Generated {} after {:.1}s ({}), {} URLs visited.\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        outcome.elapsed.as_secs_f64(),
        outcome.reason,
        outcome.visited
    )?;

    for page in &outcome.sitemap {
        write_page(writer, page, print_limit)?;
    }

    writer.flush()
}

/// Writes one page entry
pub fn write_page<W: Write>(writer: &mut W, page: &Page, print_limit: usize) -> io::Result<()> {
    writeln!(writer, "Page URL: {}\n", page.url)?;
    writeln!(
        writer,
        "Assets ({}):\n\t{}\n",
        page.assets.len(),
        format_list(&page.assets, print_limit)
    )?;
    writeln!(
        writer,
        "Children URLs ({}):\n\t{}\n\n\n",
        page.children.len(),
        format_list(&page.children, print_limit)
    )
}

/// Formats at most `limit` items as `[a b c]`
fn format_list(items: &[String], limit: usize) -> String {
    let shown: Vec<&str> = items.iter().take(limit).map(String::as_str).collect();
    format!("[{}]", shown.join(" "))
}

/// Writes the report to its configured target
///
/// If the file cannot be created the report goes to stdout instead.
pub fn write_report_to_target(
    target: &OutputTarget,
    outcome: &CrawlOutcome,
    start_url: &str,
    print_limit: usize,
) -> io::Result<()> {
    match target {
        OutputTarget::File(path) => match File::create(path) {
            Ok(file) => {
                let mut writer = io::BufWriter::new(file);
                write_report(&mut writer, outcome, start_url, print_limit)?;
                tracing::info!("Sitemap written to {}", path.display());
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    "Unable to open {} for writing ({}); writing sitemap to stdout",
                    path.display(),
                    e
                );
                write_report(&mut io::stdout().lock(), outcome, start_url, print_limit)
            }
        },
        OutputTarget::Stdout => {
            write_report(&mut io::stdout().lock(), outcome, start_url, print_limit)
        }
    }
}
