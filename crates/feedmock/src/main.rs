use std::net::SocketAddr;

use clap::Parser;
use tracing::info;

use hubtest_feedmock::FeedMode;

/// Runs both mock feed servers in one process, as the suite's web-server
/// hook expects:
/// - static feed for the "save a feed with an http link" scenario
/// - two-version feed for the "disabling a feed blocks new loads" scenario
///
/// The HUB backend must be able to reach these ports.
#[derive(Parser, Debug)]
#[command(name = "hubtest-feedmock")]
#[command(about = "Mock XML feed servers for the HUB E2E suite")]
struct Args {
    /// Address to bind on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port of the static one-item feed
    #[arg(long, default_value = "9876")]
    static_port: u16,

    /// Port of the two-version feed
    #[arg(long, default_value = "9877")]
    two_version_port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let static_addr: SocketAddr = format!("{}:{}", args.host, args.static_port).parse()?;
    let two_version_addr: SocketAddr =
        format!("{}:{}", args.host, args.two_version_port).parse()?;

    info!(
        "Starting feed mocks: static on {}, two-version on {}",
        static_addr, two_version_addr
    );

    tokio::try_join!(
        hubtest_feedmock::serve(static_addr, FeedMode::Static),
        hubtest_feedmock::serve(two_version_addr, FeedMode::TwoVersion),
    )?;

    Ok(())
}
