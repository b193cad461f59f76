//! Step reporting on stderr

use console::{style, Style, Term};
use std::time::Duration;

/// Outcome marker printed in front of a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Step passed
    Pass,
    /// Step failed
    Fail,
    /// Step skipped or degraded
    Warn,
    /// Informational
    Info,
}

impl Mark {
    fn prefix(self, use_color: bool) -> String {
        if !use_color {
            return match self {
                Self::Pass => "PASS",
                Self::Fail => "FAIL",
                Self::Warn => "WARN",
                Self::Info => "INFO",
            }
            .to_string();
        }
        match self {
            Self::Pass => style("✓").green().bold().to_string(),
            Self::Fail => style("✗").red().bold().to_string(),
            Self::Warn => style("⚠").yellow().bold().to_string(),
            Self::Info => style("ℹ").blue().bold().to_string(),
        }
    }
}

/// Prints step outcomes for a scenario run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Render one report line
    #[must_use]
    pub fn line(&self, mark: Mark, message: &str) -> String {
        format!("{} {message}", mark.prefix(self.use_color))
    }

    fn emit(&self, mark: Mark, message: &str) {
        // Failures are printed even in quiet mode
        if self.quiet && mark != Mark::Fail {
            return;
        }
        let _ = self.term.write_line(&self.line(mark, message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.emit(Mark::Pass, message);
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        self.emit(Mark::Fail, message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        self.emit(Mark::Warn, message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        self.emit(Mark::Info, message);
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Render the closing summary line
    #[must_use]
    pub fn summary_line(&self, passed: usize, failed: usize, duration: Duration) -> String {
        let total = passed + failed;
        let secs = duration.as_secs_f64();
        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            format!(
                "{status} {total} steps in {secs:.2}s ({} passed, {} failed)",
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            )
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            format!("{status} {total} steps in {secs:.2}s ({passed} passed, {failed} failed)")
        }
    }

    /// Print the closing summary
    pub fn summary(&self, passed: usize, failed: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }
        let _ = self.term.write_line("");
        let _ = self
            .term
            .write_line(&self.summary_line(passed, failed, duration));
    }
}
