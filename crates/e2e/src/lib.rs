//! HUB E2E Suite Core
//!
//! This crate provides the test harness for the HUB supplier console:
//! - Registers DB reversions for feed records created by a test and runs
//!   them after the body settles, pass or fail (`CleanupRegistry`)
//! - Writes a Jira-ready bug report on every failing test
//!   (`BugReportReporter`)
//! - Runs scenario cases sequentially with guaranteed teardown
//!   (`SuiteRunner`)
//! - Drives Playwright through generated Node.js scripts (`PageDriver`)
//! - Spawns and health-checks the mock feed servers (`FeedMockHandle`)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     SuiteRunner (Rust)                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  run_case(case, body)                                        │
//! │    ├── CaseContext { cleanup, attachments } -> body          │
//! │    ├── timeout + catch_unwind around the body future         │
//! │    ├── CleanupRegistry::run()      <- always, exactly once   │
//! │    └── BugReportReporter::on_test_end()                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  body: PageDriver::run(LoginPage + XmlFeedPage steps)        │
//! │    └── node scenario.js -> { success, error?, values }       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  collaborators                                               │
//! │    ├── FeedMockHandle  -> hubtest-feedmock subprocess        │
//! │    └── FeedStore       -> staging Postgres (cleanup)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod cleanup;
pub mod error;
pub mod locators;
pub mod pages;
pub mod reporter;
pub mod runner;
pub mod server;

pub use cleanup::CleanupRegistry;
pub use error::{E2eError, E2eResult};
pub use reporter::BugReportReporter;
pub use runner::{CaseContext, CaseResult, SuiteRunner, TestCase, TestStatus};
