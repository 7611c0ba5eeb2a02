//! User-facing output.
//!
//! Rename lines go to the `out` writer (stdout) in a fixed, uncolored format
//! that scripts can parse. Warnings, per-file errors and summaries go to the
//! `err` writer (stderr), colored when it is a terminal. Tracing output is
//! separate and controlled by the verbosity flag.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::history::BatchSummary;
use crate::rename::RenameResult;
use crate::revert::{RevertDirection, RevertResult};

/// Sink for everything a run reports to the user
pub struct Reporter {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    colors_enabled: bool,
}

/// Check if we should use colors in output
fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    io::stderr().is_terminal()
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// Reporter writing to stdout and stderr
    pub fn new() -> Self {
        let colors_enabled = should_use_colors();
        if !colors_enabled {
            colored::control::set_override(false);
        }

        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            colors_enabled,
        }
    }

    /// Reporter with custom writers and no colors
    pub fn with_writers(out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self {
            out,
            err,
            colors_enabled: false,
        }
    }

    /// Reporter that discards everything
    pub fn silent() -> Self {
        Self::with_writers(Box::new(io::sink()), Box::new(io::sink()))
    }

    /// A rename that was performed
    pub fn renamed(&mut self, from: &Path, to: &Path) {
        let _ = writeln!(self.out, "Renamed: {} → {}", from.display(), to.display());
    }

    /// A rename that a dry run would perform
    pub fn planned(&mut self, from: &Path, to: &Path) {
        let _ = writeln!(self.out, "[DRY-RUN] {} → {}", from.display(), to.display());
    }

    /// Report a non-fatal problem
    pub fn warn(&mut self, message: &str) {
        if self.colors_enabled {
            let _ = writeln!(self.err, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.err, "Warning: {}", message);
        }
    }

    /// Report a file that could not be processed
    pub fn file_error(&mut self, path: &Path, reason: &str) {
        if self.colors_enabled {
            let _ = writeln!(
                self.err,
                "{} {} {}",
                "✗".red().bold(),
                path.display().to_string().dimmed(),
                reason.red()
            );
        } else {
            let _ = writeln!(self.err, "Error: {}: {}", path.display(), reason);
        }
    }

    /// Closing lines after a clean/number run
    pub fn rename_summary(&mut self, result: &RenameResult) {
        let count = result.operations.len();

        if result.dry_run {
            self.status(&format!("Dry run complete. {} files would be renamed.", count));
        } else if count == 0 && !result.has_failures() {
            self.status("No files needed renaming.");
        } else {
            self.success(&format!("{} files renamed ({})", count, result.operation));
        }

        if result.has_failures() {
            self.warn(&format!("{} files could not be renamed", result.failures.len()));
        }
    }

    /// Closing lines after undo/redo
    pub fn revert_summary(&mut self, result: &RevertResult) {
        let verb = match result.direction {
            RevertDirection::Undo => "restored",
            RevertDirection::Redo => "renamed again",
        };
        let count = result.operations.len();

        if result.dry_run {
            self.status(&format!(
                "Dry run complete. {} files would be {} from batch {}.",
                count, verb, result.batch_id
            ));
        } else {
            self.success(&format!("{} files {} from batch {}", count, verb, result.batch_id));
        }

        if !result.skipped.is_empty() {
            self.warn(&format!("{} files were missing and skipped", result.skipped.len()));
        }
        if result.has_failures() {
            self.warn(&format!("{} files could not be renamed", result.failures.len()));
        }
    }

    pub fn history_cleared(&mut self, removed: usize) {
        let _ = writeln!(self.out, "Deleted {} total history entries.", removed);
    }

    /// One line per batch, newest first
    pub fn batch_list(&mut self, batches: &[BatchSummary]) {
        if batches.is_empty() {
            let _ = writeln!(self.out, "No history recorded.");
            return;
        }

        for batch in batches {
            let _ = writeln!(
                self.out,
                "{}\t{}\t{}\t{} files\t{}",
                batch.batch_id,
                batch.operation,
                batch.state,
                batch.record_count,
                batch.created_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    fn status(&mut self, message: &str) {
        if self.colors_enabled {
            let _ = writeln!(self.err, "{}", message.dimmed());
        } else {
            let _ = writeln!(self.err, "{}", message);
        }
    }

    fn success(&mut self, message: &str) {
        if self.colors_enabled {
            let _ = writeln!(self.err, "{} {}", "✓".green().bold(), message.green());
        } else {
            let _ = writeln!(self.err, "{}", message);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::history::{BatchId, BatchState, Operation};
    use crate::rename::RenameOperation;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Reporter plus handles on what it wrote to stdout and stderr
    pub(crate) fn capture() -> (Reporter, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let reporter = Reporter::with_writers(Box::new(out.clone()), Box::new(err.clone()));
        (reporter, out, err)
    }

    #[test]
    fn test_rename_lines_use_unicode_arrow() {
        let (mut reporter, out, _) = capture();

        reporter.renamed(Path::new("/t/a b.txt"), Path::new("/t/a_b.txt"));
        reporter.planned(Path::new("/t/c d.txt"), Path::new("/t/c_d.txt"));

        let output = out.contents();
        assert!(output.contains("Renamed: /t/a b.txt \u{2192} /t/a_b.txt\n"));
        assert!(output.contains("[DRY-RUN] /t/c d.txt \u{2192} /t/c_d.txt\n"));
    }

    #[test]
    fn test_warnings_go_to_stderr() {
        let (mut reporter, out, err) = capture();

        reporter.warn("file vanished");
        reporter.file_error(Path::new("/t/x"), "permission denied");

        assert!(out.contents().is_empty());
        let errors = err.contents();
        assert!(errors.contains("Warning: file vanished"));
        assert!(errors.contains("Error: /t/x: permission denied"));
    }

    #[test]
    fn test_rename_summary() {
        let (mut reporter, _, err) = capture();

        let mut result = RenameResult::new(BatchId::new("1"), Operation::Clean, false);
        result.add_operation(RenameOperation::new(PathBuf::from("/t/a b"), "a_b".to_string()));
        result.add_failure(PathBuf::from("/t/$"), "empty".to_string());
        reporter.rename_summary(&result);

        let errors = err.contents();
        assert!(errors.contains("1 files renamed (clean)"));
        assert!(errors.contains("1 files could not be renamed"));
    }

    #[test]
    fn test_dry_run_summary() {
        let (mut reporter, _, err) = capture();

        let result = RenameResult::new(BatchId::new("1"), Operation::Number, true);
        reporter.rename_summary(&result);

        assert!(err.contents().contains("Dry run complete. 0 files would be renamed."));
    }

    #[test]
    fn test_batch_list() {
        let (mut reporter, out, _) = capture();

        reporter.batch_list(&[]);
        reporter.batch_list(&[BatchSummary {
            batch_id: BatchId::new("42"),
            operation: Operation::Number,
            state: BatchState::Undone,
            record_count: 3,
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 45).unwrap(),
        }]);

        let output = out.contents();
        assert!(output.contains("No history recorded."));
        assert!(output.contains("42\tnumber\tundone\t3 files\t2026-01-15 10:30:45"));
    }
}
