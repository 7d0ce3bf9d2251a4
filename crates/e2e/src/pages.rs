//! Page drivers: chainable step builders over the browser layer.
//!
//! These mirror the console's page objects. A scenario composes a
//! `LoginPage` chain and an `XmlFeedPage` chain, then hands the collected
//! steps to [`PageDriver::run`](crate::browser::PageDriver::run) as one
//! browser session.

use crate::browser::PageStep;
use crate::locators::{login, xml_feed};

/// Key under which [`XmlFeedPage::extract_feed_id_from_filtered_table`] and
/// [`XmlFeedPage::extract_feed_id_for_url`] record their result.
pub const FEED_ID_KEY: &str = "feed_id";

/// Login page flow
#[derive(Debug, Default)]
pub struct LoginPage {
    steps: Vec<PageStep>,
}

impl LoginPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate_to_login(mut self, url: &str) -> Self {
        self.steps.push(PageStep::Goto { url: url.to_string() });
        self
    }

    /// Full login with navigation wait.
    pub fn login(mut self, email: &str, password: &str) -> Self {
        self.steps.push(PageStep::Fill {
            selector: login::EMAIL_INPUT.to_string(),
            value: email.to_string(),
        });
        self.steps.push(PageStep::Fill {
            selector: login::PASSWORD_INPUT.to_string(),
            value: password.to_string(),
        });
        self.steps.push(PageStep::Click {
            selector: login::LOGIN_BUTTON.to_string(),
        });
        self.steps.push(PageStep::WaitLoadState {
            state: "networkidle".to_string(),
            timeout_ms: 15_000,
        });
        self
    }

    pub fn verify_successful_login(mut self) -> Self {
        self.steps.push(PageStep::ExpectUrlNotContains {
            fragment: "/user/login".to_string(),
        });
        self
    }

    pub fn verify_stayed_on_login_page(mut self) -> Self {
        self.steps.push(PageStep::ExpectUrlContains {
            fragment: "/user/login".to_string(),
        });
        self
    }

    pub fn verify_error_alert_visible(mut self) -> Self {
        self.steps.push(PageStep::ExpectVisible {
            selector: login::ERROR_ALERT.to_string(),
            timeout_ms: 3000,
        });
        self
    }

    pub fn into_steps(self) -> Vec<PageStep> {
        self.steps
    }
}

/// XML feeds page flow
#[derive(Debug, Default)]
pub struct XmlFeedPage {
    steps: Vec<PageStep>,
}

impl XmlFeedPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the supplier in the account switcher.
    pub fn select_supplier(mut self, supplier_name: &str) -> Self {
        self.steps.push(PageStep::Click {
            selector: xml_feed::SUPPLIERS_SEARCH_INPUT.to_string(),
        });
        self.steps.push(PageStep::Fill {
            selector: xml_feed::SUPPLIERS_SEARCH_INPUT.to_string(),
            value: supplier_name.to_string(),
        });
        self.steps.push(PageStep::WaitTimeout { ms: 1000 });
        self.steps.push(PageStep::Click {
            selector: format!("text=/{supplier_name}/i"),
        });
        self.steps.push(PageStep::WaitLoadState {
            state: "networkidle".to_string(),
            timeout_ms: 15_000,
        });
        self
    }

    /// Товари → Імпорт новинок → XML
    pub fn navigate_to_xml_feeds_via_menu(mut self) -> Self {
        self.steps.push(PageStep::Click {
            selector: xml_feed::PRODUCTS_MENU.to_string(),
        });
        self.steps.push(PageStep::WaitTimeout { ms: 500 });
        self.steps.push(PageStep::Click {
            selector: xml_feed::IMPORT_NEW_ITEMS_LINK.to_string(),
        });
        self.steps.push(PageStep::WaitTimeout { ms: 500 });
        self.steps.push(PageStep::Click {
            selector: xml_feed::XML_TAB_LINK.to_string(),
        });
        self.steps.push(PageStep::WaitLoadState {
            state: "networkidle".to_string(),
            timeout_ms: 15_000,
        });
        self
    }

    pub fn click_add_new_feed(mut self) -> Self {
        self.steps.push(PageStep::Click {
            selector: xml_feed::ADD_NEW_FEED_BUTTON.to_string(),
        });
        self.steps.push(PageStep::WaitTimeout { ms: 1000 });
        self
    }

    pub fn fill_feed_url(mut self, url: &str) -> Self {
        self.steps.push(PageStep::Fill {
            selector: xml_feed::FEED_URL_INPUT.to_string(),
            value: url.to_string(),
        });
        self
    }

    pub fn clear_feed_url(self) -> Self {
        self.fill_feed_url("")
    }

    pub fn enable_upload_items_checkbox(mut self) -> Self {
        self.steps.push(PageStep::Check {
            selector: xml_feed::UPLOAD_ITEMS_CHECKBOX.to_string(),
        });
        self
    }

    pub fn disable_upload_items_checkbox(mut self) -> Self {
        self.steps.push(PageStep::Uncheck {
            selector: xml_feed::UPLOAD_ITEMS_CHECKBOX.to_string(),
        });
        self
    }

    /// Open the edit form of a feed known by id.
    pub fn open_feed_by_id(mut self, feeds_url: &str, feed_id: &str) -> Self {
        let base = feeds_url.split('?').next().unwrap_or(feeds_url);
        self.steps.push(PageStep::Goto {
            url: format!("{base}?feed_id={feed_id}&tab=feed"),
        });
        self.steps.push(PageStep::WaitLoadState {
            state: "networkidle".to_string(),
            timeout_ms: 15_000,
        });
        self.steps.push(PageStep::WaitTimeout { ms: 2000 });
        self
    }

    /// The backend refuses a 4th active feed with a fixed message.
    pub fn verify_limit_error_visible(mut self) -> Self {
        self.steps.push(PageStep::ExpectVisible {
            selector: xml_feed::LIMIT_ERROR_TEXT.to_string(),
            timeout_ms: 5000,
        });
        self
    }

    /// Re-open the edit form of the feed whose id was extracted earlier in
    /// this scenario.
    pub fn open_feed_for_editing(mut self, feeds_url: &str) -> Self {
        self.steps.push(PageStep::GotoFeedEdit {
            feeds_url: feeds_url.to_string(),
        });
        self.steps.push(PageStep::WaitTimeout { ms: 2000 });
        self
    }

    /// Ask the staging backend to fetch the feed now, as the scheduler
    /// would. The origin url carries the extracted feed id.
    pub fn trigger_feed_load(mut self, trigger_url: &str, auth: &str, feed_url: &str) -> Self {
        self.steps.push(PageStep::TriggerFeedLoad {
            trigger_url: trigger_url.to_string(),
            auth: auth.to_string(),
            feed_url: feed_url.to_string(),
        });
        // The fetch on the backend side is only loosely ordered; give it
        // time to land before the next UI assertion.
        self.steps.push(PageStep::WaitTimeout { ms: 15_000 });
        self
    }

    pub fn verify_text_absent(mut self, text: &str) -> Self {
        self.steps.push(PageStep::ExpectTextAbsent {
            text: text.to_string(),
        });
        self
    }

    pub fn click_save(mut self) -> Self {
        self.steps.push(PageStep::Click {
            selector: xml_feed::SAVE_BUTTON.to_string(),
        });
        self.steps.push(PageStep::WaitTimeout { ms: 1000 });
        self
    }

    pub fn verify_success_message(mut self) -> Self {
        self.steps.push(PageStep::ExpectVisible {
            selector: xml_feed::SUCCESS_MESSAGE.to_string(),
            timeout_ms: 5000,
        });
        self
    }

    pub fn verify_validation_error_visible(mut self) -> Self {
        self.steps.push(PageStep::ExpectVisible {
            selector: xml_feed::VALIDATION_ERROR_ANY.to_string(),
            timeout_ms: 5000,
        });
        self
    }

    pub fn navigate_to_feeds_table(mut self, feeds_url: &str) -> Self {
        self.steps.push(PageStep::Goto {
            url: feeds_url.to_string(),
        });
        self.steps.push(PageStep::WaitLoadState {
            state: "networkidle".to_string(),
            timeout_ms: 15_000,
        });
        self.steps.push(PageStep::ExpectVisible {
            selector: xml_feed::FEEDS_TABLE.to_string(),
            timeout_ms: 5000,
        });
        self
    }

    /// Filter the ag-grid by the feed link column.
    pub fn filter_feeds_by_link(mut self, feed_url: &str) -> Self {
        let filter_value = feed_url.replace("/raw", "");
        self.steps.push(PageStep::Click {
            selector: xml_feed::FEED_LINK_COLUMN_HEADER.to_string(),
        });
        self.steps.push(PageStep::WaitTimeout { ms: 500 });
        self.steps.push(PageStep::Click {
            selector: xml_feed::FEED_LINK_FILTER_ICON.to_string(),
        });
        self.steps.push(PageStep::Fill {
            selector: xml_feed::FILTER_INPUT.to_string(),
            value: filter_value.trim().to_string(),
        });
        self.steps.push(PageStep::ExpectVisible {
            selector: xml_feed::FEED_ROW.to_string(),
            timeout_ms: 5000,
        });
        self
    }

    /// Read the feed id out of the first (filtered) row: the first short
    /// alphanumeric span in the leading cells.
    pub fn extract_feed_id_from_filtered_table(mut self) -> Self {
        let script = r#"
const row = document.querySelector('.ag-row');
if (!row) return null;
const cells = row.querySelectorAll('.ag-cell');
for (let i = 0; i < Math.min(3, cells.length); i++) {
  for (const span of cells[i].querySelectorAll('span')) {
    const text = (span.textContent || '').trim();
    if (text && /^[A-Za-z0-9]{1,10}$/.test(text)) return text;
  }
}
const first = cells.length ? (cells[0].textContent || '').trim() : '';
return first && first.length <= 10 ? first : null;
"#;
        self.steps.push(PageStep::Extract {
            key: FEED_ID_KEY.to_string(),
            script: script.to_string(),
        });
        self
    }

    /// Scan the unfiltered table for the row whose link matches `feed_url`
    /// and read that row's feed id.
    pub fn extract_feed_id_for_url(mut self, feed_url: &str) -> Self {
        let url_key = feed_url.rsplit('/').next().unwrap_or(feed_url);
        let script = format!(
            r#"
const needle = {url};
const key = {key};
for (const row of document.querySelectorAll('.ag-row')) {{
  const text = row.textContent || '';
  if (!text.includes(needle) && !text.includes(key)) continue;
  const cell = row.querySelector('.ag-cell');
  const first = cell ? (cell.textContent || '').trim() : '';
  if (first) return first;
}}
return null;
"#,
            url = serde_json::to_string(feed_url).unwrap_or_default(),
            key = serde_json::to_string(url_key).unwrap_or_default(),
        );
        self.steps.push(PageStep::Extract {
            key: FEED_ID_KEY.to_string(),
            script,
        });
        self
    }

    /// Number of rows currently in the feeds table, recorded under `key`.
    pub fn extract_row_count(mut self, key: &str) -> Self {
        self.steps.push(PageStep::Extract {
            key: key.to_string(),
            script: "return String(document.querySelectorAll('.ag-row').length);".to_string(),
        });
        self
    }

    pub fn screenshot(mut self, name: &str) -> Self {
        self.steps.push(PageStep::Screenshot {
            name: name.to_string(),
        });
        self
    }

    pub fn into_steps(self) -> Vec<PageStep> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::PageStep;

    #[test]
    fn login_flow_fills_both_fields_before_submitting() {
        let steps = LoginPage::new()
            .navigate_to_login("https://hub.example/user/login")
            .login("user@example.com", "secret")
            .verify_successful_login()
            .into_steps();

        assert!(matches!(&steps[0], PageStep::Goto { url } if url.ends_with("/user/login")));
        let fills = steps
            .iter()
            .filter(|s| matches!(s, PageStep::Fill { .. }))
            .count();
        assert_eq!(fills, 2);
        assert!(matches!(
            steps.last().unwrap(),
            PageStep::ExpectUrlNotContains { fragment } if fragment == "/user/login"
        ));
    }

    #[test]
    fn add_feed_flow_saves_after_checkbox() {
        let steps = XmlFeedPage::new()
            .click_add_new_feed()
            .fill_feed_url("http://localhost:9876/feed.xml")
            .enable_upload_items_checkbox()
            .click_save()
            .verify_success_message()
            .into_steps();

        let check_pos = steps
            .iter()
            .position(|s| matches!(s, PageStep::Check { .. }))
            .unwrap();
        let save_pos = steps
            .iter()
            .position(|s| matches!(s, PageStep::Click { selector } if selector.contains("Зберегти")))
            .unwrap();
        assert!(check_pos < save_pos);
    }

    #[test]
    fn filter_drops_raw_suffix_from_gist_urls() {
        let steps = XmlFeedPage::new()
            .filter_feeds_by_link("https://gist.github.com/u/abc/raw")
            .into_steps();
        let filled = steps.iter().find_map(|s| match s {
            PageStep::Fill { value, .. } => Some(value.clone()),
            _ => None,
        });
        assert_eq!(filled.as_deref(), Some("https://gist.github.com/u/abc"));
    }

    #[test]
    fn feed_id_extraction_embeds_the_url_as_a_json_literal() {
        let steps = XmlFeedPage::new()
            .extract_feed_id_for_url("https://supplier.example/o'brien.xml")
            .into_steps();
        match &steps[0] {
            PageStep::Extract { key, script } => {
                assert_eq!(key, FEED_ID_KEY);
                assert!(script.contains(r#""https://supplier.example/o'brien.xml""#));
            }
            other => panic!("expected extract step, got {other:?}"),
        }
    }
}
