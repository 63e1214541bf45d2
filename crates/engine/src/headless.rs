//! In-memory renderer that builds its model straight from BPMN XML.
//!
//! No layout or drawing happens: the model is the list of named semantic
//! elements (flow nodes, flows, lanes, participants) plus the marker
//! classes applied to each. It backs the CLI and the tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use overlay_core::{DiagramDefinition, ElementId};

use crate::renderer::{DiagramElement, DiagramRenderer, RenderError, RenderOptions};

/// Containers whose named descendants end up in the rendered model.
const MODEL_CONTAINERS: &[&str] = &["process", "collaboration"];

/// Semantic element kinds that are drawn as a shape or an edge. Data
/// objects, properties, IO specifications and lane sets are not.
const RENDERED_KINDS: &[&str] = &[
    // activities
    "task",
    "userTask",
    "serviceTask",
    "sendTask",
    "receiveTask",
    "manualTask",
    "scriptTask",
    "businessRuleTask",
    "callActivity",
    "subProcess",
    "adHocSubProcess",
    "transaction",
    // events
    "startEvent",
    "endEvent",
    "intermediateCatchEvent",
    "intermediateThrowEvent",
    "boundaryEvent",
    // gateways
    "exclusiveGateway",
    "inclusiveGateway",
    "parallelGateway",
    "eventBasedGateway",
    "complexGateway",
    // flows
    "sequenceFlow",
    "messageFlow",
    "association",
    // containers and artifacts
    "participant",
    "lane",
    "textAnnotation",
    "group",
];

#[derive(Debug, Default)]
struct Model {
    elements: Vec<DiagramElement>,
    markers: HashMap<ElementId, BTreeSet<String>>,
    options: Option<RenderOptions>,
}

/// Headless [`DiagramRenderer`].
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    model: RwLock<Model>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker classes applied to `id`, sorted.
    pub fn marker_classes(&self, id: &str) -> Vec<String> {
        let model = self.model.read().unwrap_or_else(PoisonError::into_inner);
        model
            .markers
            .get(id)
            .map(|classes| classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Ids carrying `class`, in model order.
    pub fn marked_ids(&self, class: &str) -> Vec<ElementId> {
        let model = self.model.read().unwrap_or_else(PoisonError::into_inner);
        model
            .elements
            .iter()
            .filter(|e| model.markers.get(&e.id).is_some_and(|c| c.contains(class)))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Options of the last successful load, if any.
    pub fn render_options(&self) -> Option<RenderOptions> {
        let model = self.model.read().unwrap_or_else(PoisonError::into_inner);
        model.options.clone()
    }

    /// Whether a document has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.render_options().is_some()
    }
}

impl DiagramRenderer for HeadlessRenderer {
    fn render_document(
        &self,
        doc: &DiagramDefinition,
        options: &RenderOptions,
    ) -> Result<(), RenderError> {
        let elements = parse_elements(&doc.body)?;
        tracing::debug!(
            process_id = %doc.process_id,
            elements = elements.len(),
            fit = ?options.fit,
            margin = options.margin,
            "Diagram model built",
        );

        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        *model = Model {
            elements,
            markers: HashMap::new(),
            options: Some(options.clone()),
        };
        Ok(())
    }

    fn add_marker_class(&self, ids: &[ElementId], class: &str) {
        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        let known: HashSet<&str> = model.elements.iter().map(|e| e.id.as_str()).collect();
        let targets: Vec<ElementId> = ids
            .iter()
            .filter(|id| known.contains(id.as_str()))
            .cloned()
            .collect();

        for id in targets {
            model.markers.entry(id).or_default().insert(class.to_string());
        }
    }

    fn elements(&self) -> Vec<DiagramElement> {
        let model = self.model.read().unwrap_or_else(PoisonError::into_inner);
        model.elements.clone()
    }
}

/// Collect every drawn element carrying both an `id` and a `name` inside
/// the process and collaboration sections, in document order.
fn parse_elements(body: &str) -> Result<Vec<DiagramElement>, RenderError> {
    let document =
        roxmltree::Document::parse(body).map_err(|e| RenderError::InvalidDocument(e.to_string()))?;

    let root = document.root_element();
    if root.tag_name().name() != "definitions" {
        return Err(RenderError::InvalidDocument(format!(
            "expected <definitions> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut seen = HashSet::new();
    let mut elements = Vec::new();
    for container in root
        .children()
        .filter(|n| n.is_element() && MODEL_CONTAINERS.contains(&n.tag_name().name()))
    {
        for node in container
            .descendants()
            .skip(1)
            .filter(|n| n.is_element() && RENDERED_KINDS.contains(&n.tag_name().name()))
        {
            let (Some(id), Some(name)) = (node.attribute("id"), node.attribute("name")) else {
                continue;
            };
            if seen.insert(id) {
                elements.push(DiagramElement::new(id, name));
            }
        }
    }
    Ok(elements)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Two `Review` tasks (one inside a looped sub-process), one `Approve`.
    pub(crate) const REVIEW_BPMN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
                  xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
                  id="defs" name="Definitions">
  <bpmn:collaboration id="collab">
    <bpmn:participant id="pool" name="Claims" processRef="P1"/>
  </bpmn:collaboration>
  <bpmn:process id="P1" name="Claims process">
    <bpmn:startEvent id="start"/>
    <bpmn:userTask id="e1" name="Review"/>
    <bpmn:subProcess id="sub" name="Rework">
      <bpmn:userTask id="e2" name="Review"/>
    </bpmn:subProcess>
    <bpmn:userTask id="e3" name="Approve"/>
    <bpmn:sequenceFlow id="f1" sourceRef="start" targetRef="e1"/>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="diagram" name="Diagram">
    <bpmndi:BPMNPlane id="plane" bpmnElement="collab"/>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#;

    pub(crate) fn loaded_renderer() -> HeadlessRenderer {
        let renderer = HeadlessRenderer::new();
        renderer
            .render_document(
                &DiagramDefinition::new("P1", "mem://P1", REVIEW_BPMN),
                &RenderOptions::default(),
            )
            .expect("fixture should load");
        renderer
    }

    #[test]
    fn named_semantic_elements_are_indexed() {
        let renderer = loaded_renderer();
        let elements = renderer.elements();

        let ids: Vec<&str> = elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["pool", "e1", "sub", "e2", "e3"]);
        assert!(renderer.is_loaded());
        assert_eq!(renderer.render_options(), Some(RenderOptions::default()));
    }

    #[test]
    fn undrawn_semantic_elements_are_not_indexed() {
        let bpmn = r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <bpmn:process id="P1">
    <bpmn:property id="prop" name="Review"/>
    <bpmn:dataObject id="data" name="Review"/>
    <bpmn:laneSet id="lanes" name="Review">
      <bpmn:lane id="lane" name="Clerks"/>
    </bpmn:laneSet>
    <bpmn:userTask id="e1" name="Review">
      <bpmn:ioSpecification id="io">
        <bpmn:dataInput id="input" name="Review"/>
      </bpmn:ioSpecification>
    </bpmn:userTask>
    <bpmn:exclusiveGateway id="gw" name="Approved?"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let renderer = HeadlessRenderer::new();
        renderer
            .render_document(
                &DiagramDefinition::new("P1", "mem://P1", bpmn),
                &RenderOptions::default(),
            )
            .expect("document should load");

        let ids: Vec<String> = renderer.elements().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["lane", "e1", "gw"]);
    }

    #[test]
    fn invalid_xml_is_rejected() {
        let renderer = HeadlessRenderer::new();
        let result = renderer.render_document(
            &DiagramDefinition::new("P1", "mem://P1", "<definitions>"),
            &RenderOptions::default(),
        );
        assert_matches!(result, Err(RenderError::InvalidDocument(_)));
        assert!(!renderer.is_loaded());
    }

    #[test]
    fn non_bpmn_root_is_rejected() {
        let renderer = HeadlessRenderer::new();
        let result = renderer.render_document(
            &DiagramDefinition::new("P1", "mem://P1", "<html/>"),
            &RenderOptions::default(),
        );
        assert_matches!(result, Err(RenderError::InvalidDocument(msg)) if msg.contains("<html>"));
    }

    #[test]
    fn marker_application_is_idempotent() {
        let renderer = loaded_renderer();
        let ids = vec!["e1".to_string(), "e2".to_string()];

        renderer.add_marker_class(&ids, "bpmn-activity-success");
        let first = renderer.marked_ids("bpmn-activity-success");
        renderer.add_marker_class(&ids, "bpmn-activity-success");

        assert_eq!(renderer.marked_ids("bpmn-activity-success"), first);
        assert_eq!(first, ["e1", "e2"]);
        assert_eq!(renderer.marker_classes("e1"), ["bpmn-activity-success"]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let renderer = loaded_renderer();
        renderer.add_marker_class(&["ghost".to_string()], "bpmn-activity-success");
        renderer.add_marker_class(&[], "bpmn-activity-success");

        assert!(renderer.marked_ids("bpmn-activity-success").is_empty());
        assert!(renderer.marker_classes("ghost").is_empty());
    }

    #[test]
    fn reload_replaces_model_and_markers() {
        let renderer = loaded_renderer();
        renderer.add_marker_class(&["e3".to_string()], "bpmn-activity-completed");

        renderer
            .render_document(
                &DiagramDefinition::new("P1", "mem://P1", REVIEW_BPMN),
                &RenderOptions::default(),
            )
            .expect("reload should succeed");

        assert_eq!(renderer.elements().len(), 5);
        assert!(renderer.marked_ids("bpmn-activity-completed").is_empty());
    }
}
