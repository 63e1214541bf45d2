//! Overlay engine: puts live case status on top of a rendered BPMN diagram.
//!
//! [`OverlayController`] loads the diagram through a
//! [`DiagramSource`](overlay_core::DiagramSource), hands it to a
//! [`DiagramRenderer`], then fetches every case's counters concurrently
//! and marks the matching elements found by the [`ElementResolver`].
//! Progress is published as [`OverlayEvent`]s.

pub mod controller;
pub mod events;
pub mod headless;
pub mod renderer;
pub mod resolver;

pub use controller::{
    InstanceOutcome, MarkedNode, OverlayController, OverlayError, SessionReport, SessionState,
};
pub use events::{OverlayEvent, OverlayEventKind};
pub use headless::HeadlessRenderer;
pub use renderer::{DiagramElement, DiagramRenderer, FitType, RenderError, RenderOptions};
pub use resolver::ElementResolver;
