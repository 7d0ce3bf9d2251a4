//! Playwright browser automation.
//!
//! A scenario is compiled into a single Node.js script and executed in one
//! browser session, so the login state persists across all of its steps.
//! The script's last stdout line is a JSON object carrying success,
//! an optional error, and any values the steps extracted from the page
//! (e.g. a freshly created feed id).

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy, Default)]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

/// One verb in a scenario script.
#[derive(Debug, Clone)]
pub enum PageStep {
    /// Navigate to an absolute URL.
    Goto { url: String },
    Fill { selector: String, value: String },
    Click { selector: String },
    /// Check a checkbox (no-op if already checked).
    Check { selector: String },
    /// Uncheck a checkbox (no-op if already unchecked).
    Uncheck { selector: String },
    /// Open the feed edit form for the feed id extracted earlier in the
    /// same scenario.
    GotoFeedEdit { feeds_url: String },
    WaitSelector { selector: String, timeout_ms: u64 },
    /// `load` / `domcontentloaded` / `networkidle`
    WaitLoadState { state: String, timeout_ms: u64 },
    /// Fixed delay; the feed fetch on the backend side is only loosely
    /// ordered, so some flows have nothing better to await.
    WaitTimeout { ms: u64 },
    ExpectVisible { selector: String, timeout_ms: u64 },
    ExpectUrlContains { fragment: String },
    ExpectUrlNotContains { fragment: String },
    /// Fail the scenario if the page body contains `text`.
    ExpectTextAbsent { text: String },
    /// Evaluate a JS expression in the page and record the result under
    /// `key` in the script output. The expression must yield a string or
    /// null.
    Extract { key: String, script: String },
    /// POST the staging feed-load trigger; the origin url is derived from
    /// the feed id extracted earlier in the same scenario.
    TriggerFeedLoad {
        trigger_url: String,
        auth: String,
        feed_url: String,
    },
    Screenshot { name: String },
}

/// Values extracted by `Extract` steps, keyed by their `key`.
pub type ExtractedValues = HashMap<String, Option<String>>;

#[derive(Debug, Deserialize)]
struct ScriptOutput {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    values: ExtractedValues,
}

/// Compiles scenarios to Playwright scripts and runs them via `node`.
pub struct PageDriver {
    screenshot_dir: PathBuf,
    viewport_width: u32,
    viewport_height: u32,
    browser: BrowserKind,
    headless: bool,
}

impl PageDriver {
    pub fn new(config: DriverConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        std::fs::create_dir_all(&config.screenshot_dir)?;

        Ok(Self {
            screenshot_dir: config.screenshot_dir,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            browser: config.browser,
            headless: config.headless,
        })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Run a whole scenario in one browser session and return the values
    /// its `Extract` steps collected.
    pub async fn run(&self, steps: &[PageStep]) -> E2eResult<ExtractedValues> {
        let script = self.build_script(steps);
        self.run_script(&script).await
    }

    /// Build the Playwright script for a scenario
    pub fn build_script(&self, steps: &[PageStep]) -> String {
        let mut script = String::new();

        script.push_str(&format!(
            r#"
const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const values = {{}};

  try {{
"#,
            browser = self.browser.as_str(),
            headless = self.headless,
            width = self.viewport_width,
            height = self.viewport_height,
        ));

        for (i, step) in steps.iter().enumerate() {
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, step_name(step)));
            script.push_str(&self.step_to_js(step));
            script.push('\n');
        }

        script.push_str(
            r#"
    console.log(JSON.stringify({ success: true, values }));
  } catch (error) {
    console.log(JSON.stringify({ success: false, error: error.message, values }));
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        script
    }

    fn step_to_js(&self, step: &PageStep) -> String {
        match step {
            PageStep::Goto { url } => {
                format!("    await page.goto('{}');", js_escape(url))
            }
            PageStep::Fill { selector, value } => format!(
                "    await page.locator('{}').first().fill('{}');",
                js_escape(selector),
                js_escape(value)
            ),
            PageStep::Click { selector } => {
                format!("    await page.locator('{}').first().click();", js_escape(selector))
            }
            PageStep::Check { selector } => {
                format!("    await page.locator('{}').first().check();", js_escape(selector))
            }
            PageStep::Uncheck { selector } => {
                format!("    await page.locator('{}').first().uncheck();", js_escape(selector))
            }
            PageStep::GotoFeedEdit { feeds_url } => format!(
                "    await page.goto('{url}'.split('?')[0] + '?feed_id=' + (values['feed_id'] || '') + '&tab=feed');\n    await page.waitForLoadState('networkidle');",
                url = js_escape(feeds_url)
            ),
            PageStep::WaitSelector { selector, timeout_ms } => format!(
                "    await page.waitForSelector('{}', {{ timeout: {} }});",
                js_escape(selector),
                timeout_ms
            ),
            PageStep::WaitLoadState { state, timeout_ms } => format!(
                "    await page.waitForLoadState('{}', {{ timeout: {} }});",
                js_escape(state),
                timeout_ms
            ),
            PageStep::WaitTimeout { ms } => {
                format!("    await page.waitForTimeout({ms});")
            }
            PageStep::ExpectVisible { selector, timeout_ms } => format!(
                "    await page.locator('{sel}').first().waitFor({{ state: 'visible', timeout: {t} }});",
                sel = js_escape(selector),
                t = timeout_ms
            ),
            PageStep::ExpectUrlContains { fragment } => format!(
                "    if (!page.url().includes('{frag}')) throw new Error('URL ' + page.url() + ' does not contain {frag}');",
                frag = js_escape(fragment)
            ),
            PageStep::ExpectUrlNotContains { fragment } => format!(
                "    if (page.url().includes('{frag}')) throw new Error('URL ' + page.url() + ' still contains {frag}');",
                frag = js_escape(fragment)
            ),
            PageStep::ExpectTextAbsent { text } => format!(
                "    {{\n      const body = (await page.textContent('body')) || '';\n      if (body.includes('{t}')) throw new Error('\"{t}\" must not be present on the page');\n    }}",
                t = js_escape(text)
            ),
            PageStep::Extract { key, script } => format!(
                "    values['{}'] = await page.evaluate(() => {{ {} }});",
                js_escape(key),
                script
            ),
            PageStep::TriggerFeedLoad {
                trigger_url,
                auth,
                feed_url,
            } => {
                let base = feed_url.split('#').next().unwrap_or(feed_url);
                format!(
                    "    {{\n      const originUrl = '{feed}' + '#ufeed' + (values['feed_id'] || '');\n      const resp = await fetch('{trigger}', {{\n        method: 'POST',\n        headers: {{ 'Content-Type': 'application/json', Authorization: '{auth}' }},\n        body: JSON.stringify({{ origin_url: originUrl }}),\n      }});\n      if (!resp.ok) throw new Error('trigger-feedload: ' + resp.status);\n    }}",
                    feed = js_escape(base),
                    trigger = js_escape(trigger_url),
                    auth = js_escape(auth),
                )
            }
            PageStep::Screenshot { name } => {
                let path = self.screenshot_dir.join(format!("{name}.png"));
                format!(
                    "    await page.screenshot({{ path: '{}' }});",
                    js_escape(&path.to_string_lossy())
                )
            }
        }
    }

    /// Execute the script via node and parse its JSON result line.
    async fn run_script(&self, script: &str) -> E2eResult<ExtractedValues> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright scenario: {}", script_path.display());

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result_line = stdout
            .lines()
            .rev()
            .find(|l| l.trim_start().starts_with('{'));

        let parsed: ScriptOutput = match result_line {
            Some(line) => serde_json::from_str(line.trim())?,
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(E2eError::Playwright(format!(
                    "no result line on stdout\nstdout: {stdout}\nstderr: {stderr}"
                )));
            }
        };

        if !parsed.success {
            return Err(E2eError::Playwright(
                parsed.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(parsed.values)
    }

    /// Fetch the screenshot path a `Screenshot { name }` step wrote to.
    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.screenshot_dir.join(format!("{name}.png"))
    }
}

fn step_name(step: &PageStep) -> String {
    match step {
        PageStep::Goto { url } => format!("goto:{url}"),
        PageStep::Fill { selector, .. } => format!("fill:{selector}"),
        PageStep::Click { selector } => format!("click:{selector}"),
        PageStep::Check { selector } => format!("check:{selector}"),
        PageStep::Uncheck { selector } => format!("uncheck:{selector}"),
        PageStep::GotoFeedEdit { .. } => "goto:feed-edit".to_string(),
        PageStep::ExpectTextAbsent { text } => format!("expect-absent:{text}"),
        PageStep::TriggerFeedLoad { .. } => "trigger-feedload".to_string(),
        PageStep::WaitSelector { selector, .. } => format!("wait:{selector}"),
        PageStep::WaitLoadState { state, .. } => format!("wait-load:{state}"),
        PageStep::WaitTimeout { ms } => format!("sleep:{ms}ms"),
        PageStep::ExpectVisible { selector, .. } => format!("expect-visible:{selector}"),
        PageStep::ExpectUrlContains { fragment } => format!("expect-url:{fragment}"),
        PageStep::ExpectUrlNotContains { fragment } => format!("expect-not-url:{fragment}"),
        PageStep::Extract { key, .. } => format!("extract:{key}"),
        PageStep::Screenshot { name } => format!("screenshot:{name}"),
    }
}

fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Configuration for the page driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: BrowserKind,
    pub headless: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1920,
            viewport_height: 1080,
            browser: BrowserKind::Chromium,
            headless: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> PageDriver {
        PageDriver {
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1920,
            viewport_height: 1080,
            browser: BrowserKind::Chromium,
            headless: true,
        }
    }

    #[test]
    fn script_carries_all_steps_and_result_line() {
        let steps = vec![
            PageStep::Goto {
                url: "https://hub.example/user/login".to_string(),
            },
            PageStep::Fill {
                selector: "#email".to_string(),
                value: "user@example.com".to_string(),
            },
            PageStep::Extract {
                key: "feed_id".to_string(),
                script: "return null;".to_string(),
            },
        ];
        let script = driver().build_script(&steps);

        assert!(script.contains("chromium.launch({ headless: true })"));
        assert!(script.contains("width: 1920, height: 1080"));
        assert!(script.contains("page.goto('https://hub.example/user/login')"));
        assert!(script.contains("page.locator('#email').first().fill('user@example.com')"));
        assert!(script.contains("values['feed_id']"));
        assert!(script.contains("JSON.stringify({ success: true, values })"));
    }

    #[test]
    fn single_quotes_are_escaped() {
        let steps = vec![PageStep::Click {
            selector: "role=button[name='Увійти']".to_string(),
        }];
        let script = driver().build_script(&steps);
        assert!(script.contains("page.locator('role=button[name=\\'Увійти\\']')"));
    }

    #[test]
    fn result_line_parses_values() {
        let parsed: ScriptOutput = serde_json::from_str(
            r#"{"success":true,"values":{"feed_id":"R3DV","missing":null}}"#,
        )
        .unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.values["feed_id"].as_deref(), Some("R3DV"));
        assert_eq!(parsed.values["missing"], None);
    }
}
