//! Report Module
//!
//! Summary reporting for batch operations.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

/// Figures shown in the final summary box.
#[derive(Debug, Clone, Default)]
pub struct SummaryReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub output_bytes: u64,
    pub duration: Duration,
    pub log_file: Option<PathBuf>,
    pub errors: Vec<(PathBuf, String)>,
}

impl SummaryReport {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }

    /// One-line form, also used as the final log record.
    pub fn summary_line(&self) -> String {
        format!(
            "Complete: {} total, {} successful, {} failed",
            self.total, self.succeeded, self.failed
        )
    }

    pub fn render(&self, operation_name: &str) -> String {
        let mut out = String::new();
        let rule = "═".repeat(62);

        let _ = writeln!(out);
        let _ = writeln!(out, "╔{}╗", rule);
        let _ = writeln!(out, "║  📊 {:<56}║", format!("{} Summary", operation_name));
        let _ = writeln!(out, "╠{}╣", rule);
        let _ = writeln!(out, "║  📁 Files Found:       {:>12}{:>25}║", self.total, "");
        let _ = writeln!(out, "║  ✅ Successful:        {:>12}{:>25}║", self.succeeded, "");
        let _ = writeln!(out, "║  ❌ Failed:            {:>12}{:>25}║", self.failed, "");
        if self.total > 0 {
            let _ = writeln!(
                out,
                "║  📈 Success Rate:      {:>11.1}%{:>25}║",
                self.success_rate(),
                ""
            );
        }
        let _ = writeln!(
            out,
            "║  💾 Output Size:       {:>12}{:>25}║",
            format_bytes(self.output_bytes),
            ""
        );
        let _ = writeln!(
            out,
            "║  ⏱️  Total Time:        {:>12}{:>25}║",
            format_duration(self.duration),
            ""
        );
        let _ = writeln!(out, "╚{}╝", rule);

        if !self.errors.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "❌ Errors encountered:");
            for (path, error) in &self.errors {
                let _ = writeln!(out, "   {} → {}", path.display(), error);
            }
        }

        if let Some(log_file) = &self.log_file {
            let _ = writeln!(out);
            let _ = writeln!(out, "📝 Log file: {}", log_file.display());
        }

        out
    }
}

pub fn print_summary_report(report: &SummaryReport, operation_name: &str) {
    print!("{}", report.render(operation_name));
    println!("{}", report.summary_line());
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
