//! Contract of the diagram renderer the overlay drives.
//!
//! The renderer owns the rendered model. The overlay only ever reads its
//! element collection and appends marker classes to it.

use overlay_core::{DiagramDefinition, ElementId};
use serde::Serialize;

/// How the diagram is fitted into its container after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitType {
    None,
    Horizontal,
    Vertical,
    Center,
}

/// Options passed along with every document load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub fit: FitType,
    /// Margin around the fitted diagram, in pixels.
    pub margin: u32,
    /// Whether the user may pan and zoom the diagram.
    pub navigation: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fit: FitType::Horizontal,
            margin: 10,
            navigation: true,
        }
    }
}

/// A rendered node or edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramElement {
    /// Unique within one loaded diagram.
    pub id: ElementId,
    /// Human-readable label; several elements may share it.
    pub name: String,
}

impl DiagramElement {
    pub fn new(id: impl Into<ElementId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Errors raised when the renderer cannot load a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid diagram document: {0}")]
    InvalidDocument(String),
}

/// A diagram renderer holding one live model.
pub trait DiagramRenderer: Send + Sync {
    /// Load `doc`, replacing any previous model, and fit it per `options`.
    /// Loading the same document twice yields the same model.
    fn render_document(
        &self,
        doc: &DiagramDefinition,
        options: &RenderOptions,
    ) -> Result<(), RenderError>;

    /// Add `class` to every element in `ids`. Unknown ids are ignored and
    /// repeating the call changes nothing.
    fn add_marker_class(&self, ids: &[ElementId], class: &str);

    /// Live element collection in model insertion order.
    fn elements(&self) -> Vec<DiagramElement>;
}
