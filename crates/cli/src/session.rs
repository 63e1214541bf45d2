//! Overlay session runner.
//!
//! Wires the HTTP clients, a headless renderer and the controller
//! together, and re-runs a fresh session on a fixed interval when polling
//! is configured.

use std::future::Future;
use std::sync::Arc;

use overlay_client::{BpmApi, CaseStatusClient, DiagramSourceClient};
use overlay_core::{CaseStatusSource, DiagramSource};
use overlay_engine::{
    DiagramRenderer, HeadlessRenderer, OverlayController, OverlayError, OverlayEvent,
    SessionReport,
};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::config::OverlayConfig;

/// Run a single overlay session against a freshly built renderer.
pub async fn run_once(
    config: &OverlayConfig,
    api: &BpmApi,
) -> Result<SessionReport, OverlayError> {
    let diagrams: Arc<dyn DiagramSource> = Arc::new(DiagramSourceClient::new(api.clone()));
    let cases: Arc<dyn CaseStatusSource> = Arc::new(CaseStatusClient::new(api.clone()));
    let renderer: Arc<dyn DiagramRenderer> = Arc::new(HeadlessRenderer::new());

    let controller = OverlayController::new(diagrams, cases, renderer)
        .with_marker_classes(config.marker_classes.clone());
    tokio::spawn(log_events(controller.subscribe()));

    controller
        .start(&config.process_id, &config.case_ids)
        .await
}

/// Run sessions until Ctrl-C, one every `config.poll_interval`.
///
/// Without an interval a single session runs and its error, if any, is
/// returned.
pub async fn run(config: &OverlayConfig, api: &BpmApi) -> Result<(), OverlayError> {
    run_until(config, api, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Run sessions until `shutdown` resolves, one every
/// `config.poll_interval`.
///
/// Each tick builds a fresh controller and renderer. A failed session is
/// logged and the next one starts on schedule. `shutdown` is raced
/// against the running session as well as the ticker, so it stops the
/// loop even while a fetch is in flight.
pub async fn run_until<F>(
    config: &OverlayConfig,
    api: &BpmApi,
    shutdown: F,
) -> Result<(), OverlayError>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let Some(interval) = config.poll_interval else {
        tokio::select! {
            result = run_once(config, api) => {
                print_report(&result?);
            }
            _ = &mut shutdown => {
                tracing::info!("Interrupted, session abandoned");
            }
        }
        return Ok(());
    };

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }

        tokio::select! {
            result = run_once(config, api) => match result {
                Ok(report) => print_report(&report),
                Err(e) => {
                    tracing::error!(
                        process_id = %config.process_id,
                        error = %e,
                        "Overlay session failed, retrying at next poll",
                    );
                }
            },
            _ = &mut shutdown => break,
        }
    }

    tracing::info!("Interrupted, stopping polling");
    Ok(())
}

/// Write the session report to stdout as one JSON line.
fn print_report(report: &SessionReport) {
    match serde_json::to_string(report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialise session report"),
    }
}

/// Log every event of a session until its controller is dropped.
async fn log_events(mut rx: broadcast::Receiver<OverlayEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) if event.kind.is_failure() => {
                tracing::warn!(
                    session_id = %event.session_id,
                    event = ?event.kind,
                    "Overlay failure",
                );
            }
            Ok(event) => {
                tracing::debug!(
                    session_id = %event.session_id,
                    event = ?event.kind,
                    "Overlay event",
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Overlay event log lagging");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
