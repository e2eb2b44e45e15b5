//! Human-readable end-of-run report.

use std::io::{self, Write};

use engine::RunSummary;

/// Writes the totals and every failed file with its final error.
pub(crate) fn render_summary<W: Write + ?Sized>(summary: &RunSummary, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{} summary: {} file(s), {} succeeded, {} failed, {} skipped",
        summary.direction, summary.total, summary.succeeded, summary.failed, summary.skipped
    )?;
    writeln!(
        out,
        "  attempts: {} ({} file(s) retried)",
        summary.attempts, summary.retried
    )?;
    writeln!(out, "  bytes transferred: {}", summary.bytes_transferred)?;
    writeln!(out, "  peak concurrency: {}", summary.peak_in_flight)?;
    match summary.average_per_file() {
        Some(average) => writeln!(
            out,
            "  elapsed: {:.2}s ({:.3}s per file)",
            summary.elapsed.as_secs_f64(),
            average.as_secs_f64()
        )?,
        None => writeln!(out, "  elapsed: {:.2}s", summary.elapsed.as_secs_f64())?,
    }
    if summary.rejected > 0 {
        writeln!(
            out,
            "  rejected: {} file(s) with keys that cannot be written safely",
            summary.rejected
        )?;
    }
    if summary.cancelled {
        writeln!(out, "  cancelled: files not yet started were skipped")?;
    }

    if summary.failures.is_empty() {
        return Ok(());
    }
    writeln!(out, "failed files:")?;
    for failure in &summary.failures {
        writeln!(
            out,
            "  {} {} -> {} after {} attempt(s): {}",
            failure.id, failure.relative, failure.destination, failure.attempts, failure.error
        )?;
    }
    Ok(())
}
