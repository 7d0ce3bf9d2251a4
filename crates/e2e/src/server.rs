//! Feed mock management - spawning and health checking the mock feed servers

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to the running feed mock process (both feed ports)
pub struct FeedMockHandle {
    child: Child,
    pub static_url: String,
    pub two_version_url: String,
}

impl FeedMockHandle {
    /// Spawn the hubtest-feedmock binary
    pub async fn spawn(config: FeedMockConfig) -> E2eResult<Self> {
        let static_url = format!("http://127.0.0.1:{}/feed.xml", config.static_port);
        let two_version_url = format!("http://127.0.0.1:{}/feed.xml", config.two_version_port);

        info!(
            "Spawning feed mocks on ports {} and {}",
            config.static_port, config.two_version_port
        );

        let mut cmd = Command::new(&config.binary_path);
        cmd.arg("--static-port")
            .arg(config.static_port.to_string())
            .arg("--two-version-port")
            .arg(config.two_version_port.to_string());

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!(
                "Failed to spawn {}: {}",
                config.binary_path.display(),
                e
            ))
        })?;

        let handle = FeedMockHandle {
            child,
            static_url,
            two_version_url,
        };

        handle.wait_for_healthy(config.startup_timeout).await?;

        info!("Feed mocks are healthy at {}", handle.static_url);
        Ok(handle)
    }

    /// Wait for the static feed endpoint to respond. The health probe hits
    /// the static flavour only; probing the two-version endpoint would
    /// consume its first-request state.
    async fn wait_for_healthy(&self, timeout_duration: Duration) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&self.static_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Feed mock health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for feed mocks to start...");
                    }
                    // Connection refused is expected while the process starts
                    if !e.is_connect() {
                        warn!("Feed mock health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    /// Stop the feed mock process
    pub fn stop(&mut self) -> E2eResult<()> {
        info!("Stopping feed mocks (pid: {})", self.child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(200));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for FeedMockHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Configuration for spawning the feed mocks
#[derive(Debug, Clone)]
pub struct FeedMockConfig {
    /// Path to the hubtest-feedmock binary
    pub binary_path: PathBuf,

    /// Port of the static one-item feed
    pub static_port: u16,

    /// Port of the two-version feed
    pub two_version_port: u16,

    /// Timeout for process startup
    pub startup_timeout: Duration,
}

impl Default for FeedMockConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("target/debug/hubtest-feedmock"),
            static_port: 9876,
            two_version_port: 9877,
            startup_timeout: Duration::from_secs(30),
        }
    }
}
