//! HUB suite entry point
//!
//! This file is the test binary that runs the UI scenarios against the
//! staging console. Run with: cargo test --package hubtest-e2e --test hub
//!
//! Scenarios self-skip when `TEST_USER_EMAIL` / `TEST_USER_PASSWORD` are
//! absent, so the binary is runnable on any machine; the mock feed servers
//! are spawned unless `--no-feedmock` is given.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hubtest_common::{PgFeedStore, TestConfig};
use hubtest_e2e::browser::{BrowserKind, DriverConfig, PageDriver, PageStep};
use hubtest_e2e::pages::{LoginPage, XmlFeedPage, FEED_ID_KEY};
use hubtest_e2e::server::{FeedMockConfig, FeedMockHandle};
use hubtest_e2e::{BugReportReporter, CaseResult, E2eError, E2eResult, SuiteRunner, TestCase};

#[derive(Parser, Debug)]
#[command(name = "hubtest-e2e")]
#[command(about = "E2E scenario runner for the HUB supplier console")]
struct Args {
    /// Run only scenarios whose title contains this substring
    #[arg(short, long)]
    name: Option<String>,

    /// Directory for durable artifacts (bug report, HTML report)
    #[arg(long, default_value = "reports")]
    reports: PathBuf,

    /// Output directory for results and screenshots
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Path to the feed mock binary
    #[arg(long, default_value = "target/debug/hubtest-feedmock")]
    feedmock_binary: PathBuf,

    /// Do not spawn the feed mocks (e.g. they are already running)
    #[arg(long)]
    no_feedmock: bool,

    /// Port of the static feed mock
    #[arg(long, default_value = "9876")]
    static_port: u16,

    /// Port of the two-version feed mock
    #[arg(long, default_value = "9877")]
    two_version_port: u16,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run in headless mode
    #[arg(long, default_value = "true")]
    headless: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = TestConfig::from_env();

    // Equivalent of the Playwright webServer hook: feeds must be reachable
    // by the HUB backend before any scenario saves a local feed URL.
    let _feedmock = if args.no_feedmock {
        None
    } else {
        Some(
            FeedMockHandle::spawn(FeedMockConfig {
                binary_path: args.feedmock_binary.clone(),
                static_port: args.static_port,
                two_version_port: args.two_version_port,
                ..Default::default()
            })
            .await?,
        )
    };

    let browser = match args.browser.as_str() {
        "firefox" => BrowserKind::Firefox,
        "webkit" => BrowserKind::Webkit,
        _ => BrowserKind::Chromium,
    };
    let driver_cfg = DriverConfig {
        screenshot_dir: args.output.join("screenshots"),
        browser,
        headless: args.headless,
        ..Default::default()
    };

    let store = Arc::new(PgFeedStore::from_config(&config));
    let reporter = BugReportReporter::new(&args.reports);
    let runner = SuiteRunner::new(config, store, reporter, &args.output);

    let started = Instant::now();
    let mut results: Vec<CaseResult> = Vec::new();
    let wanted =
        |title: &str| args.name.as_deref().map_or(true, |n| title.contains(n));

    if wanted("збереження валідного URL без пробілів") {
        results.push(case_save_valid_feed(&runner, &driver_cfg).await);
    }
    if wanted("збереження фіду з посиланням http") {
        results.push(case_save_http_feed(&runner, &driver_cfg).await);
    }
    if wanted("додавання одного URL двічі") {
        results.push(case_duplicate_feed(&runner, &driver_cfg).await);
    }
    if wanted("порожнє поле URL") {
        results.push(case_empty_url_validation(&runner, &driver_cfg).await);
    }
    if wanted("вимкнення фіда блокує нові завантаження") {
        results.push(case_disabled_feed_blocks_loads(&runner, &driver_cfg).await);
    }
    if wanted("обмеження 3 активні фіди") {
        results.push(case_active_feed_limit(&runner, &driver_cfg).await);
    }

    let suite = runner.summarize(results, started);
    runner.write_results(&suite)?;

    Ok(suite.failed == 0)
}

/// Login steps shared by every scenario; lands on the XML feeds page.
fn login_steps(config: &TestConfig) -> Vec<PageStep> {
    LoginPage::new()
        .navigate_to_login(&format!("{}?next=/supplier-content/xml", config.login_url))
        .login(&config.user_email, &config.user_password)
        .verify_successful_login()
        .into_steps()
}

fn require_credentials(config: &TestConfig) -> E2eResult<()> {
    if !config.has_credentials() {
        return Err(E2eError::Skipped(
            "TEST_USER_EMAIL / TEST_USER_PASSWORD not set".to_string(),
        ));
    }
    Ok(())
}

fn extracted_feed_id(values: &hubtest_e2e::browser::ExtractedValues) -> E2eResult<String> {
    values
        .get(FEED_ID_KEY)
        .cloned()
        .flatten()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| E2eError::MissingValue(FEED_ID_KEY.to_string()))
}

/// Create a feed, find its id in the table, register it for deletion.
/// `register_deactivate` instead when `deactivate_only` (duplicate-URL
/// case: the feed pre-exists, deleting it would destroy shared state).
async fn run_save_feed_scenario(
    runner: &SuiteRunner,
    driver_cfg: &DriverConfig,
    case: TestCase,
    feed_url: String,
    deactivate_only: bool,
) -> CaseResult {
    let config = runner.config().clone();
    let driver_cfg = driver_cfg.clone();

    runner
        .run_case(case, move |ctx| async move {
            require_credentials(&config)?;
            let driver = PageDriver::new(driver_cfg)?;

            let mut steps = login_steps(&config);
            steps.extend(
                XmlFeedPage::new()
                    .select_supplier(&config.supplier_name)
                    .navigate_to_xml_feeds_via_menu()
                    .click_add_new_feed()
                    .fill_feed_url(&feed_url)
                    .enable_upload_items_checkbox()
                    .click_save()
                    .verify_success_message()
                    .navigate_to_feeds_table(&config.xml_feeds_url)
                    .filter_feeds_by_link(&feed_url)
                    .extract_feed_id_from_filtered_table()
                    .into_steps(),
            );

            let values = driver.run(&steps).await?;
            let feed_id = extracted_feed_id(&values)?;
            if deactivate_only {
                ctx.cleanup.register_deactivate(&feed_id);
            } else {
                ctx.cleanup.register_delete(&feed_id);
            }
            Ok(())
        })
        .await
}

async fn case_save_valid_feed(runner: &SuiteRunner, driver_cfg: &DriverConfig) -> CaseResult {
    let feed_url = runner.config().xml_feed_url.clone();
    run_save_feed_scenario(
        runner,
        driver_cfg,
        TestCase::new("збереження валідного URL без пробілів", file!(), line!()),
        feed_url,
        false,
    )
    .await
}

async fn case_save_http_feed(runner: &SuiteRunner, driver_cfg: &DriverConfig) -> CaseResult {
    let feed_url = runner.config().http_xml_feed_url.clone();
    run_save_feed_scenario(
        runner,
        driver_cfg,
        TestCase::new("збереження фіду з посиланням http", file!(), line!()),
        feed_url,
        false,
    )
    .await
}

async fn case_duplicate_feed(runner: &SuiteRunner, driver_cfg: &DriverConfig) -> CaseResult {
    let feed_url = runner.config().duplicate_feed_url.clone();
    run_save_feed_scenario(
        runner,
        driver_cfg,
        TestCase::new("додавання одного URL двічі — без дубля", file!(), line!()),
        feed_url,
        true,
    )
    .await
}

async fn case_empty_url_validation(
    runner: &SuiteRunner,
    driver_cfg: &DriverConfig,
) -> CaseResult {
    let config = runner.config().clone();
    let driver_cfg = driver_cfg.clone();

    runner
        .run_case(
            TestCase::new("порожнє поле URL — валідація", file!(), line!()),
            move |_ctx| async move {
                require_credentials(&config)?;
                let driver = PageDriver::new(driver_cfg)?;

                let mut steps = login_steps(&config);
                steps.extend(
                    XmlFeedPage::new()
                        .select_supplier(&config.supplier_name)
                        .navigate_to_xml_feeds_via_menu()
                        .click_add_new_feed()
                        .clear_feed_url()
                        .enable_upload_items_checkbox()
                        .click_save()
                        .verify_validation_error_visible()
                        .into_steps(),
                );

                driver.run(&steps).await?;
                Ok(())
            },
        )
        .await
}

async fn case_disabled_feed_blocks_loads(
    runner: &SuiteRunner,
    driver_cfg: &DriverConfig,
) -> CaseResult {
    let config = runner.config().clone();
    let driver_cfg = driver_cfg.clone();

    runner
        .run_case(
            TestCase::new("вимкнення фіда блокує нові завантаження", file!(), line!())
                .with_timeout(Duration::from_secs(120)),
            move |ctx| async move {
                require_credentials(&config)?;
                if config.trigger_feedload_auth.is_empty() {
                    return Err(E2eError::Skipped(
                        "TEST_TRIGGER_FEEDLOAD_AUTH required for trigger-feedload".to_string(),
                    ));
                }
                let driver = PageDriver::new(driver_cfg)?;

                // Create a feed on the two-version mock; the first backend
                // fetch sees one item, every later fetch two.
                let mut steps = login_steps(&config);
                steps.extend(
                    XmlFeedPage::new()
                        .select_supplier(&config.supplier_name)
                        .navigate_to_xml_feeds_via_menu()
                        .click_add_new_feed()
                        .fill_feed_url(&config.two_version_feed_url)
                        .enable_upload_items_checkbox()
                        .click_save()
                        .verify_success_message()
                        .navigate_to_feeds_table(&config.xml_feeds_url)
                        .filter_feeds_by_link(&config.two_version_feed_url)
                        .extract_feed_id_from_filtered_table()
                        // First trigger: the backend ingests the one-item
                        // document.
                        .trigger_feed_load(
                            &config.trigger_feedload_url,
                            &config.trigger_feedload_auth,
                            &config.two_version_feed_url,
                        )
                        // Disable the upload checkbox and save.
                        .open_feed_for_editing(&config.xml_feeds_url)
                        .disable_upload_items_checkbox()
                        .click_save()
                        .verify_success_message()
                        // Second trigger: the mock now serves two items; the
                        // new one must not be ingested.
                        .trigger_feed_load(
                            &config.trigger_feedload_url,
                            &config.trigger_feedload_auth,
                            &config.two_version_feed_url,
                        )
                        .open_feed_for_editing(&config.xml_feeds_url)
                        .verify_text_absent("blocked-test-2")
                        .into_steps(),
                );

                let values = driver.run(&steps).await?;
                let feed_id = extracted_feed_id(&values)?;
                ctx.cleanup.register_delete(&feed_id);
                Ok(())
            },
        )
        .await
}

async fn case_active_feed_limit(runner: &SuiteRunner, driver_cfg: &DriverConfig) -> CaseResult {
    let config = runner.config().clone();
    let driver_cfg = driver_cfg.clone();

    runner
        .run_case(
            TestCase::new("обмеження 3 активні фіди", file!(), line!())
                .with_timeout(Duration::from_secs(120)),
            move |ctx| async move {
                require_credentials(&config)?;
                if config.feed_ids_for_limit.len() < 4 {
                    return Err(E2eError::Skipped(
                        "TEST_FEED_IDS_FOR_LIMIT must name at least 4 feeds".to_string(),
                    ));
                }
                let driver = PageDriver::new(driver_cfg)?;

                // Everything this case touches gets deactivated in teardown;
                // per-entry NotFound for feeds that never activated is
                // swallowed there.
                for feed_id in &config.feed_ids_for_limit {
                    ctx.cleanup.register_deactivate(feed_id);
                }

                let mut steps = login_steps(&config);
                let mut page = XmlFeedPage::new()
                    .select_supplier(&config.supplier_name)
                    .navigate_to_xml_feeds_via_menu();
                for feed_id in &config.feed_ids_for_limit {
                    page = page
                        .open_feed_by_id(&config.xml_feeds_url, feed_id)
                        .enable_upload_items_checkbox()
                        .click_save();
                }
                steps.extend(page.verify_limit_error_visible().into_steps());

                driver.run(&steps).await?;
                Ok(())
            },
        )
        .await
}
