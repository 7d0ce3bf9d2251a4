//! Suite runner: executes scenario cases sequentially, guarantees cleanup,
//! and feeds outcomes to the reporter.
//!
//! Cases run one at a time. The suite shares a single supplier account and
//! the backend caps it at 3 active feeds, so parallel cases would race the
//! limit check; serialized execution is the concurrency discipline here.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use hubtest_common::{FeedStore, TestConfig};

use crate::cleanup::CleanupRegistry;
use crate::error::{E2eError, E2eResult};
use crate::reporter::BugReportReporter;

/// Identity of a scenario case. `file`/`line` point at the case definition
/// and end up in the bug report.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub title: String,
    pub file: &'static str,
    pub line: u32,
    pub timeout: Duration,
}

impl TestCase {
    pub fn new(title: impl Into<String>, file: &'static str, line: u32) -> Self {
        Self {
            title: title.into(),
            file,
            line,
            timeout: Duration::from_secs(90),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// A file attached to a case result (screenshot, downloaded artifact).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub path: PathBuf,
}

/// Result of running a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub title: String,
    pub location: String,
    pub status: TestStatus,
    pub error: Option<String>,
    pub duration_ms: u64,
    pub attachments: Vec<Attachment>,
}

/// Result of running the whole suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub run_id: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
}

/// Handles a test body receives: cleanup registration and attachments.
#[derive(Clone)]
pub struct CaseContext {
    pub cleanup: Arc<CleanupRegistry>,
    attachments: Arc<Mutex<Vec<Attachment>>>,
}

impl CaseContext {
    /// Attach a file to the case result (listed in the bug report on
    /// failure).
    pub fn attach(&self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.attachments.lock().push(Attachment {
            name: name.into(),
            path: path.into(),
        });
    }
}

/// Sequential suite runner with guaranteed per-case teardown.
pub struct SuiteRunner {
    config: TestConfig,
    store: Arc<dyn FeedStore>,
    reporter: BugReportReporter,
    output_dir: PathBuf,
}

impl SuiteRunner {
    pub fn new(
        config: TestConfig,
        store: Arc<dyn FeedStore>,
        reporter: BugReportReporter,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            store,
            reporter,
            output_dir: output_dir.into(),
        }
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Run one case: body, then cleanup (always, exactly once), then the
    /// reporter hook.
    ///
    /// Panics, timeouts and `Err` returns all settle into a `CaseResult`;
    /// nothing escapes past the teardown boundary.
    pub async fn run_case<F, Fut>(&self, case: TestCase, body: F) -> CaseResult
    where
        F: FnOnce(CaseContext) -> Fut,
        Fut: Future<Output = E2eResult<()>>,
    {
        let start = Instant::now();
        info!("Running: {}", case.title);

        let cleanup = Arc::new(CleanupRegistry::new());
        let attachments = Arc::new(Mutex::new(Vec::new()));
        let ctx = CaseContext {
            cleanup: cleanup.clone(),
            attachments: attachments.clone(),
        };

        let outcome = AssertUnwindSafe(tokio::time::timeout(case.timeout, body(ctx)))
            .catch_unwind()
            .await;

        // Teardown boundary: the body future has settled one way or another.
        cleanup.run(&self.config, self.store.as_ref()).await;

        let (status, err) = match outcome {
            Ok(Ok(Ok(()))) => (TestStatus::Passed, None),
            Ok(Ok(Err(E2eError::Skipped(reason)))) => (TestStatus::Skipped, Some(reason)),
            Ok(Ok(Err(e))) => (TestStatus::Failed, Some(e.to_string())),
            Ok(Err(_elapsed)) => (
                TestStatus::Failed,
                Some(format!("Test timed out after {}s", case.timeout.as_secs())),
            ),
            Err(panic) => (TestStatus::Failed, Some(panic_message(panic))),
        };

        let result = CaseResult {
            title: case.title.clone(),
            location: case.location(),
            status,
            error: err,
            duration_ms: start.elapsed().as_millis() as u64,
            attachments: std::mem::take(&mut *attachments.lock()),
        };

        match result.status {
            TestStatus::Passed => info!("✓ {} ({} ms)", result.title, result.duration_ms),
            TestStatus::Skipped => info!(
                "- {} (skipped: {})",
                result.title,
                result.error.as_deref().unwrap_or("")
            ),
            TestStatus::Failed => error!(
                "✗ {} - {}",
                result.title,
                result.error.as_deref().unwrap_or("unknown error")
            ),
        }

        self.reporter.on_test_end(&result);
        result
    }

    /// Aggregate case results into a suite result.
    pub fn summarize(&self, results: Vec<CaseResult>, started: Instant) -> SuiteResult {
        let passed = results.iter().filter(|r| r.status == TestStatus::Passed).count();
        let failed = results.iter().filter(|r| r.status == TestStatus::Failed).count();
        let skipped = results.iter().filter(|r| r.status == TestStatus::Skipped).count();

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed,
            failed,
            skipped,
            started.elapsed().as_millis()
        );

        SuiteResult {
            run_id: uuid::Uuid::new_v4().to_string(),
            total: results.len(),
            passed,
            failed,
            skipped,
            duration_ms: started.elapsed().as_millis() as u64,
            results,
        }
    }

    /// Write suite results to a JSON file
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: <non-string payload>".to_string()
    }
}
