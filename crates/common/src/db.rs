//! Database access for test-data cleanup.
//!
//! The suite creates real feed records through the UI; these helpers revert
//! them directly in the staging Postgres. One short-lived connection per
//! operation: cleanup runs a handful of statements per test, and a pooled
//! client would outlive the registry that owns the work.

use async_trait::async_trait;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info};

use crate::config::TestConfig;
use crate::{Error, Result};

/// Reversion operations the cleanup registry consumes.
///
/// The production implementation talks to Postgres; tests substitute a
/// recording double.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Set `is_active = false` on the feed row. `NotFound` when the row is
    /// missing or already inactive.
    async fn deactivate_by_id(&self, feed_id: &str) -> Result<()>;

    /// Remove the feed row and its dependent image rows. `NotFound` when no
    /// feed row matched.
    async fn delete_by_id(&self, feed_id: &str) -> Result<()>;
}

/// `FeedStore` over the staging Postgres.
#[derive(Debug, Clone)]
pub struct PgFeedStore {
    host: String,
    port: u16,
    dbname: String,
    user: String,
    password: String,
    ssl: bool,
}

impl PgFeedStore {
    pub fn from_config(config: &TestConfig) -> Self {
        Self {
            host: config.db_host.clone(),
            port: config.db_port,
            dbname: config.db_name.clone(),
            user: config.db_user.clone(),
            password: config.db_password.clone(),
            ssl: config.db_ssl_enabled(),
        }
    }

    async fn connect(&self) -> Result<Client> {
        if self.host.is_empty() || self.dbname.is_empty() {
            return Err(Error::DatabaseNotConfigured);
        }

        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host).port(self.port).dbname(&self.dbname);
        if !self.user.is_empty() {
            pg.user(&self.user);
        }
        if !self.password.is_empty() {
            pg.password(&self.password);
        }

        if self.ssl {
            // Staging certs are self-signed; verification is off, as in the
            // original suite's `rejectUnauthorized: false`.
            let tls = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .build()?;
            let (client, connection) = pg.connect(MakeTlsConnector::new(tls)).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    debug!("db connection terminated: {e}");
                }
            });
            Ok(client)
        } else {
            let (client, connection) = pg.connect(NoTls).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    debug!("db connection terminated: {e}");
                }
            });
            Ok(client)
        }
    }
}

#[async_trait]
impl FeedStore for PgFeedStore {
    async fn deactivate_by_id(&self, feed_id: &str) -> Result<()> {
        let client = self.connect().await?;
        let rows = client
            .execute(
                "UPDATE feed SET is_active = false WHERE feed_id = $1",
                &[&feed_id],
            )
            .await?;
        if rows == 0 {
            return Err(Error::NotFound {
                kind: "feed".to_string(),
                id: feed_id.to_string(),
            });
        }
        info!(feed_id, "feed deactivated");
        Ok(())
    }

    async fn delete_by_id(&self, feed_id: &str) -> Result<()> {
        let client = self.connect().await?;

        // Dependent rows first; the feed row carries the verdict.
        client
            .execute("DELETE FROM feed_image_feed WHERE feed_id = $1", &[&feed_id])
            .await?;
        let rows = client
            .execute("DELETE FROM feed WHERE feed_id = $1", &[&feed_id])
            .await?;
        if rows == 0 {
            return Err(Error::NotFound {
                kind: "feed".to_string(),
                id: feed_id.to_string(),
            });
        }
        info!(feed_id, "feed deleted");
        Ok(())
    }
}
