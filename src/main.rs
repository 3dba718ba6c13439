//! Model release tracker — binary entrypoint.
//! Runs one fetch-and-merge cycle for today's date and exits.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use model_release_tracker::{Tracker, TrackerConfig};

/// Compact console logs. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("model_release_tracker=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = TrackerConfig::load_default().context("loading tracker config")?;
    let tracker = Tracker::from_config(cfg)?;

    let today = chrono::Local::now().date_naive();
    match tracker.run(today).await {
        Ok(report) => {
            print!("{report}");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "saving the store failed");
            Err(e)
        }
    }
}
