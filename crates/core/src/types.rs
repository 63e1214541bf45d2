/// Process definition identifier as the backend exposes it.
pub type ProcessId = String;

/// Process instance (case) identifier.
pub type InstanceId = String;

/// Renderer-assigned element identifier, unique within one diagram.
pub type ElementId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A diagram definition document as served by the backend.
///
/// The body is kept verbatim; parsing it is the renderer's job. Once
/// loaded it is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramDefinition {
    /// Process the document belongs to.
    pub process_id: ProcessId,
    /// URL the document was fetched from.
    pub source_url: String,
    /// Raw document body (BPMN 2.0 XML).
    pub body: String,
}

impl DiagramDefinition {
    pub fn new(
        process_id: impl Into<ProcessId>,
        source_url: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            process_id: process_id.into(),
            source_url: source_url.into(),
            body: body.into(),
        }
    }
}
