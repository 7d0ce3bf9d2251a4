//! Bug-report reporter.
//!
//! On every failing test, writes `reports/last_failure_bug_report.txt` in a
//! fixed format ready to be pasted into a Jira issue. The file always
//! reflects the most recent failure only; it is overwritten, never
//! appended. Passing and skipped tests leave it untouched.
//!
//! Report I/O is a hygiene activity: write failures are logged to the
//! diagnostic stream and never escalate into the test outcome.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{error, info};

use crate::runner::{CaseResult, TestStatus};

/// Maximum length of the error message embedded in a report, in characters.
const MAX_ERROR_CHARS: usize = 1500;

/// Length of the error excerpt in the Summary line, in characters.
const SUMMARY_ERROR_CHARS: usize = 80;

pub struct BugReportReporter {
    reports_dir: PathBuf,
    /// Subdirectory of `reports_dir` holding the HTML run report, when one
    /// is generated for the current run.
    html_report_folder: String,
    /// Free-text environment tag embedded in the report.
    environment: String,
}

impl BugReportReporter {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            html_report_folder: "html".to_string(),
            environment: "Rust, Playwright (hubtest-e2e)".to_string(),
        }
    }

    pub fn with_html_report_folder(mut self, folder: impl Into<String>) -> Self {
        self.html_report_folder = folder.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Path the report is written to.
    pub fn report_path(&self) -> PathBuf {
        self.reports_dir.join(hubtest_common::BUG_REPORT_FILE)
    }

    /// Observe a finished test. Writes the report file only on failure.
    pub fn on_test_end(&self, result: &CaseResult) {
        if result.status != TestStatus::Failed {
            return;
        }

        let content = self.render(result);

        if let Err(e) = self.write_report(&content) {
            error!("failed to save bug report: {e}");
            return;
        }
        info!("bug report saved: {}", self.report_path().display());
    }

    fn render(&self, result: &CaseResult) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let error_msg = result.error.as_deref().unwrap_or("Невідома помилка");
        let summary_excerpt = truncate_chars(error_msg, SUMMARY_ERROR_CHARS);
        let error_snippet = truncate_chars(error_msg, MAX_ERROR_CHARS);

        let mut attachments: Vec<String> = result
            .attachments
            .iter()
            .map(|a| format!("{}: {}", a.name, a.path.display()))
            .collect();
        let html_dir = self.reports_dir.join(&self.html_report_folder);
        if html_dir.is_dir() {
            attachments.push(format!("HTML звіт: {}", html_dir.join("index.html").display()));
        }
        let attachments = if attachments.is_empty() {
            "(немає)".to_string()
        } else {
            attachments.join("\n")
        };

        format!(
            "=== БАГ-РЕПОРТ ДЛЯ JIRA (копіювати вручну) ===\n\
             Згенеровано: {timestamp}\n\
             \n\
             --- Summary ---\n\
             [Автотест] {title}: {summary_excerpt}...\n\
             \n\
             --- Description ---\n\
             **Тест:** {title}\n\
             **Файл:** {location}\n\
             \n\
             **Помилка:**\n\
             {error_snippet}\n\
             \n\
             **Кроки для відтворення:** (див. тест-кейс)\n\
             \n\
             **Очікуваний результат:** (з тест-кейсу)\n\
             **Фактичний результат:** (див. помилку вище)\n\
             \n\
             **Середовище:** {environment}\n\
             \n\
             --- Attachments ---\n\
             {attachments}\n",
            title = result.title,
            location = result.location,
            environment = self.environment,
        )
    }

    fn write_report(&self, content: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.reports_dir)?;
        std::fs::write(self.report_path(), content)
    }
}

/// Truncate to at most `max` characters without splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Attachment, CaseResult, TestStatus};
    use test_case::test_case;

    fn failed_result(error: &str) -> CaseResult {
        CaseResult {
            title: "збереження валідного URL без пробілів".to_string(),
            location: "tests/hub.rs:42".to_string(),
            status: TestStatus::Failed,
            error: Some(error.to_string()),
            duration_ms: 1200,
            attachments: vec![],
        }
    }

    #[test]
    fn failure_writes_report_with_fixed_header() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = BugReportReporter::new(dir.path());

        reporter.on_test_end(&failed_result("expected toast, got nothing"));

        let content = std::fs::read_to_string(reporter.report_path()).unwrap();
        assert!(content.starts_with("=== БАГ-РЕПОРТ ДЛЯ JIRA (копіювати вручну) ==="));
        assert!(content.contains("[Автотест] збереження валідного URL без пробілів:"));
        assert!(content.contains("**Файл:** tests/hub.rs:42"));
        assert!(content.contains("expected toast, got nothing"));
        assert!(content.contains("(немає)"));
    }

    #[test]
    fn passing_test_leaves_previous_report_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = BugReportReporter::new(dir.path());
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(reporter.report_path(), "previous failure").unwrap();

        let mut result = failed_result("ignored");
        result.status = TestStatus::Passed;
        result.error = None;
        reporter.on_test_end(&result);
        result.status = TestStatus::Skipped;
        reporter.on_test_end(&result);

        let content = std::fs::read_to_string(reporter.report_path()).unwrap();
        assert_eq!(content, "previous failure");
    }

    #[test]
    fn new_failure_overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = BugReportReporter::new(dir.path());

        reporter.on_test_end(&failed_result("first failure"));
        reporter.on_test_end(&failed_result("second failure"));

        let content = std::fs::read_to_string(reporter.report_path()).unwrap();
        assert!(content.contains("second failure"));
        assert!(!content.contains("first failure"));
    }

    #[test]
    fn long_error_is_truncated_to_1500_chars() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = BugReportReporter::new(dir.path());
        let long = "й".repeat(4000);

        let content = reporter.render(&failed_result(&long));

        let embedded = content
            .split("**Помилка:**\n")
            .nth(1)
            .unwrap()
            .split('\n')
            .next()
            .unwrap();
        assert_eq!(embedded.chars().count(), MAX_ERROR_CHARS);
    }

    #[test]
    fn attachments_are_listed_by_name_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = BugReportReporter::new(dir.path());
        let mut result = failed_result("boom");
        result.attachments.push(Attachment {
            name: "screenshot".to_string(),
            path: PathBuf::from("test-results/shot.png"),
        });

        let content = reporter.render(&result);
        assert!(content.contains("screenshot: test-results/shot.png"));
        assert!(!content.contains("(немає)"));
    }

    #[test]
    fn existing_html_report_is_appended_as_attachment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("html")).unwrap();
        let reporter = BugReportReporter::new(dir.path());

        let content = reporter.render(&failed_result("boom"));
        assert!(content.contains("HTML звіт:"));
        assert!(content.contains("index.html"));
    }

    #[test_case("short", 80, 5 ; "shorter than limit")]
    #[test_case("abcdef", 3, 3 ; "ascii cut")]
    #[test_case("ййй", 2, 2 ; "multibyte cut")]
    fn truncate_counts_characters(input: &str, max: usize, expected: usize) {
        assert_eq!(truncate_chars(input, max).chars().count(), expected);
    }
}
