//! Overlay session orchestration.
//!
//! [`OverlayController`] runs one overlay session:
//!
//! 1. fetch the diagram and hand it to the renderer;
//! 2. fetch every case's status concurrently, classify each reported node
//!    and mark the elements resolved from its display name.
//!
//! The diagram must be rendered before any status is fetched, otherwise
//! there is nothing to mark. A diagram failure ends the session; a status
//! failure only affects its own instance. Nothing is retried: polling
//! again means starting a new session.

use std::sync::Arc;

use futures::future::join_all;
use overlay_core::{
    CaseStatusSource, DiagramSource, ElementId, FetchError, InstanceId, MarkerClasses,
    MarkerState, ProcessId,
};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::events::{OverlayEvent, OverlayEventKind};
use crate::renderer::{DiagramRenderer, RenderError, RenderOptions};
use crate::resolver::ElementResolver;

/// Broadcast channel capacity for session events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle of one overlay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    LoadingDiagram,
    DiagramReady,
    ApplyingOverlays,
    /// Every instance overlay has been attempted.
    Completed,
    /// The diagram could not be loaded; no overlay was attempted.
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Errors that end a session before any overlay is applied.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Diagram load failed: {0}")]
    DiagramLoad(#[from] FetchError),

    #[error("Diagram render failed: {0}")]
    Render(#[from] RenderError),

    /// A controller runs a single session.
    #[error("Overlay session already started")]
    AlreadyStarted,
}

/// A display name that received a marker and the elements it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedNode {
    pub name: String,
    /// Empty when the name is not rendered in this diagram.
    pub element_ids: Vec<ElementId>,
}

/// What happened to one instance's overlay.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceOutcome {
    pub instance_id: InstanceId,
    pub active: Vec<MarkedNode>,
    pub completed: Vec<MarkedNode>,
    /// Set when the status fetch failed; no marker was applied then.
    pub error: Option<FetchError>,
}

impl InstanceOutcome {
    fn failed(instance_id: &str, error: FetchError) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            active: Vec::new(),
            completed: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a session that got past the diagram load.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub process_id: ProcessId,
    pub state: SessionState,
    pub instances: Vec<InstanceOutcome>,
}

impl SessionReport {
    /// Number of instances whose status fetch failed.
    pub fn failed_count(&self) -> usize {
        self.instances.iter().filter(|o| !o.is_success()).count()
    }

    pub fn instance(&self, instance_id: &str) -> Option<&InstanceOutcome> {
        self.instances.iter().find(|o| o.instance_id == instance_id)
    }
}

/// Drives one overlay session against a diagram source, a case status
/// source and a renderer.
///
/// The renderer owns the element model; the controller only keeps a
/// handle to it and never caches elements.
pub struct OverlayController {
    session_id: Uuid,
    diagrams: Arc<dyn DiagramSource>,
    cases: Arc<dyn CaseStatusSource>,
    renderer: Arc<dyn DiagramRenderer>,
    resolver: ElementResolver,
    options: RenderOptions,
    classes: MarkerClasses,
    state: watch::Sender<SessionState>,
    event_tx: broadcast::Sender<OverlayEvent>,
}

impl OverlayController {
    pub fn new(
        diagrams: Arc<dyn DiagramSource>,
        cases: Arc<dyn CaseStatusSource>,
        renderer: Arc<dyn DiagramRenderer>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            session_id: Uuid::new_v4(),
            diagrams,
            cases,
            resolver: ElementResolver::new(Arc::clone(&renderer)),
            renderer,
            options: RenderOptions::default(),
            classes: MarkerClasses::default(),
            state,
            event_tx,
        }
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_marker_classes(mut self, classes: MarkerClasses) -> Self {
        self.classes = classes;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Observe state transitions.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.event_tx.subscribe()
    }

    /// Run the session: load `process_id`'s diagram, then overlay the
    /// status of every non-null entry of `instance_ids`.
    ///
    /// Returns `Err` only when the diagram could not be loaded (the
    /// session is then [`SessionState::Failed`] and no status was
    /// fetched). Instance failures are reported in the
    /// [`SessionReport`] and as [`OverlayEventKind::InstanceStatusFailed`].
    pub async fn start(
        &self,
        process_id: &str,
        instance_ids: &[Option<InstanceId>],
    ) -> Result<SessionReport, OverlayError> {
        let started = self.state.send_if_modified(|state| {
            if *state == SessionState::Idle {
                *state = SessionState::LoadingDiagram;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(OverlayError::AlreadyStarted);
        }

        let instance_ids: Vec<&str> = instance_ids.iter().flatten().map(String::as_str).collect();
        tracing::info!(
            session_id = %self.session_id,
            process_id,
            instances = instance_ids.len(),
            "Starting overlay session",
        );

        let diagram = match self.diagrams.load(process_id).await {
            Ok(diagram) => diagram,
            Err(e) => {
                tracing::error!(
                    session_id = %self.session_id,
                    process_id,
                    url = %e.url(),
                    error = %e,
                    "Diagram fetch failed",
                );
                self.fail(OverlayEventKind::DiagramLoadFailed {
                    process_id: process_id.to_string(),
                    url: Some(e.url().to_string()),
                    status: e.status(),
                    error: e.to_string(),
                });
                return Err(e.into());
            }
        };
        self.state.send_replace(SessionState::DiagramReady);

        if let Err(e) = self.renderer.render_document(&diagram, &self.options) {
            tracing::error!(
                session_id = %self.session_id,
                process_id,
                url = %diagram.source_url,
                error = %e,
                "Diagram could not be rendered",
            );
            self.fail(OverlayEventKind::DiagramLoadFailed {
                process_id: process_id.to_string(),
                url: Some(diagram.source_url.clone()),
                status: None,
                error: e.to_string(),
            });
            return Err(e.into());
        }

        let elements = self.renderer.elements().len();
        tracing::info!(
            session_id = %self.session_id,
            process_id,
            url = %diagram.source_url,
            elements,
            "Diagram loaded",
        );
        self.publish(OverlayEventKind::DiagramLoaded {
            process_id: process_id.to_string(),
            url: diagram.source_url.clone(),
            elements,
        });

        self.state.send_replace(SessionState::ApplyingOverlays);
        let instances = join_all(instance_ids.iter().map(|id| self.apply_instance(id))).await;

        let report = SessionReport {
            session_id: self.session_id,
            process_id: process_id.to_string(),
            state: SessionState::Completed,
            instances,
        };
        self.state.send_replace(SessionState::Completed);

        tracing::info!(
            session_id = %self.session_id,
            process_id,
            instances = report.instances.len(),
            failed = report.failed_count(),
            "Overlay session completed",
        );
        self.publish(OverlayEventKind::SessionCompleted {
            process_id: process_id.to_string(),
            instances: report.instances.len(),
            failed: report.failed_count(),
        });

        Ok(report)
    }

    // ---- private helpers ----

    /// Fetch one instance's snapshot and mark every classified node.
    async fn apply_instance(&self, instance_id: &str) -> InstanceOutcome {
        let snapshot = match self.cases.load(instance_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(
                    session_id = %self.session_id,
                    instance_id,
                    url = %e.url(),
                    error = %e,
                    "Case status fetch failed",
                );
                self.publish(OverlayEventKind::instance_failed(instance_id, &e));
                return InstanceOutcome::failed(instance_id, e);
            }
        };

        let mut active = Vec::new();
        let mut completed = Vec::new();

        for (name, counters) in snapshot.iter() {
            let state = MarkerState::classify(counters);
            let Some(class) = self.classes.class_for(state) else {
                continue;
            };

            let element_ids = self.resolver.resolve(name);
            if element_ids.is_empty() {
                tracing::debug!(instance_id, name, "No rendered element with this name");
            }
            self.renderer.add_marker_class(&element_ids, class);
            tracing::debug!(
                instance_id,
                name,
                marker = state.as_str(),
                elements = element_ids.len(),
                "Marker applied",
            );

            let node = MarkedNode {
                name: name.to_string(),
                element_ids,
            };
            match state {
                MarkerState::Active => active.push(node),
                MarkerState::Completed => completed.push(node),
                MarkerState::None => {}
            }
        }

        tracing::info!(
            session_id = %self.session_id,
            instance_id,
            active = active.len(),
            completed = completed.len(),
            "Case status overlaid",
        );
        self.publish(OverlayEventKind::MarkersApplied {
            instance_id: instance_id.to_string(),
            active: active.iter().map(|n| n.name.clone()).collect(),
            completed: completed.iter().map(|n| n.name.clone()).collect(),
        });

        InstanceOutcome {
            instance_id: instance_id.to_string(),
            active,
            completed,
            error: None,
        }
    }

    fn fail(&self, kind: OverlayEventKind) {
        self.state.send_replace(SessionState::Failed);
        self.publish(kind);
    }

    fn publish(&self, kind: OverlayEventKind) {
        // Ignore the SendError: it only means nobody is subscribed.
        let _ = self.event_tx.send(OverlayEvent::new(self.session_id, kind));
    }
}
