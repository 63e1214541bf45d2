//! Display-name to element-id resolution over the renderer's live model.

use std::sync::Arc;

use overlay_core::ElementId;

use crate::renderer::DiagramRenderer;

/// Resolves display names to the ids of every element rendered with them.
///
/// Holds no element state of its own: each lookup scans the renderer's
/// current model, so a reload is picked up without invalidation.
#[derive(Clone)]
pub struct ElementResolver {
    renderer: Arc<dyn DiagramRenderer>,
}

impl ElementResolver {
    pub fn new(renderer: Arc<dyn DiagramRenderer>) -> Self {
        Self { renderer }
    }

    /// Ids of all elements whose name equals `display_name` exactly
    /// (case-sensitive). Empty when the name is not in this diagram.
    ///
    /// Order follows the model and carries no meaning.
    pub fn resolve(&self, display_name: &str) -> Vec<ElementId> {
        self.renderer
            .elements()
            .into_iter()
            .filter(|e| e.name == display_name)
            .map(|e| e.id)
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::tests::loaded_renderer;
    use crate::headless::HeadlessRenderer;

    fn resolver() -> ElementResolver {
        ElementResolver::new(Arc::new(loaded_renderer()))
    }

    #[test]
    fn shared_name_resolves_to_every_element() {
        assert_eq!(resolver().resolve("Review"), ["e1", "e2"]);
    }

    #[test]
    fn unique_name_resolves_to_one_element() {
        assert_eq!(resolver().resolve("Approve"), ["e3"]);
    }

    #[test]
    fn missing_name_resolves_to_nothing() {
        assert!(resolver().resolve("Missing").is_empty());
    }

    #[test]
    fn match_is_exact_and_case_sensitive() {
        let resolver = resolver();
        assert!(resolver.resolve("review").is_empty());
        assert!(resolver.resolve("Rev").is_empty());
        assert!(resolver.resolve("Review ").is_empty());
    }

    #[test]
    fn empty_model_resolves_to_nothing() {
        let resolver = ElementResolver::new(Arc::new(HeadlessRenderer::new()));
        assert!(resolver.resolve("Review").is_empty());
    }
}
