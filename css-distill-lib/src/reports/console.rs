use super::RunSummary;
use crate::Result;
use crate::extractors::DomainReport;
use core::fmt::Write;
use owo_colors::OwoColorize;

/// Most-used tokens listed under each domain.
const TOP_TOKENS: usize = 3;

/// Write a short digest of a run.
///
/// `reports` may be empty, as it is when a previous run's output was reused; the domain counts
/// then come from the summary alone.
pub fn generate<W: Write>(summary: &RunSummary, reports: &[DomainReport], use_colors: bool, writer: &mut W) -> Result<()> {
    let headline = format!(
        "Extracted {} token(s) from {} page(s) of {}",
        summary.total_tokens(),
        summary.pages_processed,
        summary.url
    );
    if use_colors {
        writeln!(writer, "{}", headline.bold())?;
    } else {
        writeln!(writer, "{headline}")?;
    }

    let name_width = summary.domains.keys().map(String::len).max().unwrap_or(0);
    for (domain, count) in &summary.domains {
        let padded = format!("{domain:<name_width$}");
        if use_colors {
            writeln!(writer, "  {} : {count}", padded.cyan())?;
        } else {
            writeln!(writer, "  {padded} : {count}")?;
        }

        let Some(report) = reports.iter().find(|report| report.domain.to_string() == *domain) else {
            continue;
        };

        let mut top: Vec<_> = report.tokens.iter().collect();
        top.sort_by(|a, b| b.usage_count.cmp(&a.usage_count).then_with(|| a.name.cmp(&b.name)));
        for token in top.into_iter().take(TOP_TOKENS) {
            writeln!(writer, "  {:<name_width$}     {} ({}x)", "", token.name, token.usage_count)?;
        }
    }

    if !summary.problem_pages.is_empty() {
        writeln!(writer)?;
        let heading = format!("{} problem page(s)", summary.problem_pages.len());
        if use_colors {
            writeln!(writer, "{}", heading.red().bold())?;
        } else {
            writeln!(writer, "{heading}")?;
        }

        for page in &summary.problem_pages {
            writeln!(writer, "  {} [{}] after {} attempt(s): {}", page.url, page.error_kind, page.attempts, page.message)?;
        }
    }

    if summary.skipped_value_count > 0 {
        writeln!(writer)?;
        let line = format!("Skipped {} value(s) that could not be parsed", summary.skipped_value_count);
        if use_colors {
            writeln!(writer, "{}", line.yellow())?;
        } else {
            writeln!(writer, "{line}")?;
        }
    }

    Ok(())
}
