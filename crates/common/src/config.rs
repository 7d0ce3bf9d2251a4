//! Suite configuration resolved from environment variables.
//!
//! Every parameter has a default matching the staging deployment, so the
//! suite starts without a `.env`; credentials and database parameters stay
//! empty unless provided, and dependent code degrades accordingly
//! (tests self-skip, cleanup is skipped).

use serde::{Deserialize, Serialize};

/// All test parameters consumed by the suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    pub base_url: String,
    pub login_url: String,
    pub user_email: String,
    pub user_password: String,
    pub dashboard_url: String,
    pub non_existent_user_email: String,

    // XML feeds
    pub xml_feeds_url: String,
    pub xml_feed_url: String,
    pub http_xml_feed_url: String,
    pub two_version_feed_url: String,
    pub invalid_xml_feed_url: String,
    pub feed_404_url: String,
    pub invalid_url_feed: String,
    pub invalid_xml_structure_url: String,
    pub timeout_feed_url: String,
    pub supplier_name: String,
    pub duplicate_feed_url: String,
    pub existing_feed_id: String,
    pub feed_ids_for_limit: Vec<String>,

    // Feed-load trigger backdoor (staging only)
    pub trigger_feedload_url: String,
    pub trigger_feedload_auth: String,

    // Database (for cleanup)
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    /// Enable TLS (`require`) when the server enforces encryption.
    /// Accepted values: `1`, `true`, `yes`, `require`.
    pub db_ssl: String,
}

impl TestConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary lookup function.
    /// The seam unit tests use instead of mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str, default: &str| -> String {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let base_url = get("TEST_BASE_URL", "https://hubtest.kasta.ua");
        let login_url = get("TEST_LOGIN_URL", &format!("{base_url}/user/login"));
        let xml_feeds_url = get(
            "TEST_XML_FEEDS_URL",
            &format!("{base_url}/supplier-content/xml"),
        );

        Self {
            user_email: get("TEST_USER_EMAIL", ""),
            user_password: get("TEST_USER_PASSWORD", ""),
            dashboard_url: get("TEST_DASHBOARD_URL", ""),
            non_existent_user_email: get("TEST_NON_EXISTENT_USER_EMAIL", ""),

            xml_feed_url: get(
                "TEST_XML_FEED_URL",
                "https://gist.githubusercontent.com/lonni777/dc7d69b7226ce29d807d762bbb054598/raw",
            ),
            http_xml_feed_url: get("TEST_HTTP_XML_FEED_URL", "http://localhost:9876/feed.xml"),
            two_version_feed_url: get(
                "TEST_TWO_VERSION_FEED_URL",
                "http://localhost:9877/feed.xml",
            ),
            invalid_xml_feed_url: get(
                "TEST_INVALID_XML_FEED_URL",
                "https://www.dropbox.com/scl/fi/o84mvoxjl0ro6iejsh60p/Untitled-1.xml?rlkey=p09wc82oxv8rfl5c4pho4bfin&st=8k4hz546&dl=1",
            ),
            feed_404_url: get(
                "TEST_404_FEED_URL",
                "https://gist.github.com/lonni777/1eb5d08a1dfd4ad0fdf8666ab78ab5be111/raw",
            ),
            invalid_url_feed: get("TEST_INVALID_URL_FEED", "ftp://test.com"),
            invalid_xml_structure_url: get(
                "TEST_INVALID_XML_STRUCTURE_URL",
                "https://gist.githubusercontent.com/lonni777/231bc3625b32b6d8ae95374f154a4e30/raw",
            ),
            timeout_feed_url: get("TEST_TIMEOUT_FEED_URL", "http://192.0.2.1/xml"),
            supplier_name: get("TEST_SUPPLIER_NAME", "Парфюмс"),
            duplicate_feed_url: get(
                "TEST_DUPLICATE_FEED_URL",
                "https://www.foxtrot.com.ua/pricelist/kasta_uk.xml",
            ),
            existing_feed_id: get("TEST_EXISTING_FEED_ID", "R3DV"),
            feed_ids_for_limit: split_ids(&get(
                "TEST_FEED_IDS_FOR_LIMIT",
                "R3DV,R2K3,R3DX,R3DY",
            )),

            trigger_feedload_url: get("TEST_TRIGGER_FEEDLOAD_URL", ""),
            trigger_feedload_auth: get("TEST_TRIGGER_FEEDLOAD_AUTH", ""),

            db_host: get("TEST_DB_HOST", ""),
            db_port: get("TEST_DB_PORT", "5432").parse().unwrap_or(5432),
            db_name: get("TEST_DB_NAME", ""),
            db_user: get("TEST_DB_USER", ""),
            db_password: get("TEST_DB_PASSWORD", ""),
            db_ssl: get("TEST_DB_SSL", ""),

            base_url,
            login_url,
            xml_feeds_url,
        }
    }

    /// Login credentials are present; scenario cases skip otherwise.
    pub fn has_credentials(&self) -> bool {
        !self.user_email.is_empty() && !self.user_password.is_empty()
    }

    /// Database connection parameters are present. Cleanup performs no
    /// reversion at all when this is false.
    pub fn db_configured(&self) -> bool {
        !self.db_host.is_empty() && !self.db_name.is_empty()
    }

    /// TLS requested for the database connection.
    pub fn db_ssl_enabled(&self) -> bool {
        matches!(
            self.db_ssl.to_lowercase().as_str(),
            "1" | "true" | "yes" | "require"
        )
    }
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
