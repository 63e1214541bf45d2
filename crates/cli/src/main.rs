//! `bpm-overlay` -- overlays live case status on a BPMN diagram.
//!
//! Fetches a process diagram from the BPM REST API, then the status of
//! each configured case, and marks the diagram elements that are active
//! or completed. The resulting session report is printed to stdout as
//! JSON, once or on every poll.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default | Description                          |
//! |--------------------------|----------|---------|--------------------------------------|
//! | `BPM_API_URL`            | no       | `http://localhost:8080/bonita/API/bpm` | Base API URL |
//! | `PROCESS_ID`             | yes      | --      | Process definition to render         |
//! | `CASE_IDS`               | no       | empty   | Comma-separated case ids             |
//! | `POLL_INTERVAL_SECS`     | no       | --      | Re-run every N seconds               |
//! | `REQUEST_TIMEOUT_SECS`   | no       | `30`    | HTTP request timeout                 |
//! | `ACTIVE_MARKER_CLASS`    | no       | `bpmn-activity-success`   | Class for active nodes    |
//! | `COMPLETED_MARKER_CLASS` | no       | `bpmn-activity-completed` | Class for completed nodes |

use anyhow::Context;
use overlay_cli::config::OverlayConfig;
use overlay_cli::session;
use overlay_client::BpmApi;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "overlay_cli=info,overlay_engine=info,overlay_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = OverlayConfig::from_env().context("invalid configuration")?;

    tracing::info!(
        api_url = %config.api_url,
        process_id = %config.process_id,
        cases = config.case_ids.len(),
        poll_interval_secs = config.poll_interval.map(|d| d.as_secs()),
        "Starting bpm-overlay",
    );

    let api = BpmApi::with_timeout(config.api_url.clone(), config.request_timeout)
        .context("failed to build HTTP client")?;

    session::run(&config, &api).await?;
    Ok(())
}
