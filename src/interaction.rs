//! Hover state machine driving tooltip and relationship-summary content.
//!
//! Exactly one element is hovered at a time. Entering a new element first
//! performs the exit actions of the previous one, so a node tooltip never
//! survives into an edge hover and an edge summary never outlives its edge.
//! The machine only reads the graph; every event costs O(1) plus the size of
//! the text it derives.

use eframe::egui::Pos2;
use tracing::trace;

use crate::geometry::tooltip_anchor;
use crate::model::{Graph, LinkId, NodeId};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HoverTarget {
    Node(NodeId),
    Edge(LinkId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Hover {
    #[default]
    Idle,
    Node(NodeId),
    Edge(LinkId),
}

impl Hover {
    pub fn target(&self) -> Option<HoverTarget> {
        match self {
            Self::Idle => None,
            Self::Node(id) => Some(HoverTarget::Node(id.clone())),
            Self::Edge(id) => Some(HoverTarget::Edge(*id)),
        }
    }

    fn is(&self, target: &HoverTarget) -> bool {
        match (self, target) {
            (Self::Node(current), HoverTarget::Node(other)) => current == other,
            (Self::Edge(current), HoverTarget::Edge(other)) => current == other,
            _ => false,
        }
    }
}

impl From<HoverTarget> for Hover {
    fn from(target: HoverTarget) -> Self {
        match target {
            HoverTarget::Node(id) => Self::Node(id),
            HoverTarget::Edge(id) => Self::Edge(id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Enter { target: HoverTarget, at: Pos2 },
    Move { at: Pos2 },
    Leave { target: HoverTarget },
    /// The pointer left the canvas altogether.
    LeaveAll,
    ClearSummary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDetails {
    pub title: String,
    pub description: String,
    pub traits: Vec<String>,
    pub aliases: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationDetails {
    pub source_label: String,
    pub role_forward: String,
    pub target_label: String,
    pub role_backward: String,
    pub key_dialogs: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TooltipContent {
    Node(NodeDetails),
    Relation(RelationDetails),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Body,
    Labeled(&'static str),
    Quote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TooltipLine {
    pub kind: LineKind,
    pub text: String,
}

impl TooltipLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl NodeDetails {
    pub fn traits_text(&self) -> String {
        self.traits.join(", ")
    }

    pub fn aliases_text(&self) -> String {
        self.aliases.join(", ")
    }

    pub fn lines(&self) -> Vec<TooltipLine> {
        let mut lines = vec![TooltipLine::new(LineKind::Title, self.title.as_str())];
        if !self.description.is_empty() {
            lines.push(TooltipLine::new(LineKind::Body, self.description.as_str()));
        }
        if !self.traits.is_empty() {
            lines.push(TooltipLine::new(LineKind::Labeled("Traits"), self.traits_text()));
        }
        if !self.aliases.is_empty() {
            lines.push(TooltipLine::new(LineKind::Labeled("Also known as"), self.aliases_text()));
        }
        lines
    }
}

impl RelationDetails {
    pub fn title(&self) -> String {
        format!("{} \u{2194} {}", self.source_label, self.target_label)
    }

    pub fn lines(&self) -> Vec<TooltipLine> {
        let mut lines = vec![TooltipLine::new(LineKind::Title, self.title())];
        if !self.role_forward.is_empty() {
            lines.push(TooltipLine::new(
                LineKind::Body,
                format!(
                    "{} \u{2192} {}: {}",
                    self.source_label, self.target_label, self.role_forward
                ),
            ));
        }
        if !self.role_backward.is_empty() {
            lines.push(TooltipLine::new(
                LineKind::Body,
                format!(
                    "{} \u{2192} {}: {}",
                    self.target_label, self.source_label, self.role_backward
                ),
            ));
        }
        lines.extend(
            self.key_dialogs
                .iter()
                .map(|dialog| TooltipLine::new(LineKind::Quote, dialog.as_str())),
        );
        lines
    }
}

impl TooltipContent {
    pub fn lines(&self) -> Vec<TooltipLine> {
        match self {
            Self::Node(details) => details.lines(),
            Self::Relation(details) => details.lines(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tooltip {
    pub anchor: Pos2,
    pub content: TooltipContent,
}

pub fn node_details(graph: &Graph, id: &NodeId) -> Option<NodeDetails> {
    let node = graph.node_by_id(id)?;
    Some(NodeDetails {
        title: node.label.clone(),
        description: node.description.clone(),
        traits: node.traits.clone(),
        aliases: node.aliases.clone(),
    })
}

pub fn relation_details(graph: &Graph, id: LinkId) -> Option<RelationDetails> {
    let link = graph.link(id)?;
    let source = graph.node(link.source_index())?;
    let target = graph.node(link.target_index())?;
    Some(RelationDetails {
        source_label: source.label.clone(),
        role_forward: link.role_forward.clone(),
        target_label: target.label.clone(),
        role_backward: link.role_backward.clone(),
        key_dialogs: link.key_dialogs.clone(),
    })
}

/// Current hover, last pointer position and the content derived from them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
    hover: Hover,
    pointer: Option<Pos2>,
    tooltip: Option<Tooltip>,
    summary: Option<RelationDetails>,
}

impl InteractionState {
    pub fn hover(&self) -> &Hover {
        &self.hover
    }

    pub fn is_idle(&self) -> bool {
        self.hover == Hover::Idle
    }

    pub fn pointer(&self) -> Option<Pos2> {
        self.pointer
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Persistent relationship summary; set by edge hovers only.
    pub fn summary(&self) -> Option<&RelationDetails> {
        self.summary.as_ref()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies one pointer event. Returns `true` when the hovered element changed.
    pub fn apply(&mut self, graph: &Graph, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Enter { target, at } => {
                self.move_pointer(at);
                if self.hover.is(&target) {
                    return false;
                }

                let content = match &target {
                    HoverTarget::Node(id) => node_details(graph, id).map(TooltipContent::Node),
                    HoverTarget::Edge(id) => {
                        relation_details(graph, *id).map(TooltipContent::Relation)
                    }
                };
                let Some(content) = content else {
                    trace!(?target, "ignoring hover on an element outside the graph");
                    return false;
                };

                self.exit();
                if let TooltipContent::Relation(details) = &content {
                    self.summary = Some(details.clone());
                }
                self.tooltip = Some(Tooltip {
                    anchor: tooltip_anchor(at),
                    content,
                });
                trace!(?target, "hover entered");
                self.hover = target.into();
                true
            }
            PointerEvent::Move { at } => {
                self.move_pointer(at);
                false
            }
            PointerEvent::Leave { target } => {
                // A late leave for an element we already moved off of.
                if !self.hover.is(&target) {
                    return false;
                }
                self.exit();
                true
            }
            PointerEvent::LeaveAll => {
                let changed = !self.is_idle();
                self.exit();
                changed
            }
            PointerEvent::ClearSummary => {
                self.summary = None;
                false
            }
        }
    }

    fn move_pointer(&mut self, at: Pos2) {
        self.pointer = Some(at);
        if let Some(tooltip) = &mut self.tooltip {
            tooltip.anchor = tooltip_anchor(at);
        }
    }

    fn exit(&mut self) {
        if matches!(self.hover, Hover::Edge(_)) {
            self.summary = None;
        }
        if !self.is_idle() {
            trace!(hover = ?self.hover, "hover left");
        }
        self.tooltip = None;
        self.hover = Hover::Idle;
    }
}

/// Pure form of [`InteractionState::apply`].
pub fn transition(
    state: &InteractionState,
    graph: &Graph,
    event: PointerEvent,
) -> InteractionState {
    let mut next = state.clone();
    next.apply(graph, event);
    next
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;
    use serde_json::json;

    use super::*;
    use crate::model::build_graph;

    fn graph() -> Graph {
        build_graph(&json!({
            "characters": [
                {
                    "id": 1, "common_name": "Hamlet", "main_character": true,
                    "traits": ["brooding", "witty"], "names": ["The Dane", "Prince"],
                    "description": "Prince of Denmark."
                },
                { "id": 2, "common_name": "Horatio", "description": "Loyal friend." }
            ],
            "relations": [{
                "id1": 1, "id2": 2, "weight": 9,
                "id1_to_id2_role": "friend", "id2_to_id1_role": "confidant",
                "key_dialogs": ["Horatio, I am dead.", "Now cracks a noble heart."]
            }]
        }))
        .unwrap()
        .graph
    }

    fn node(id: &str) -> HoverTarget {
        HoverTarget::Node(NodeId::new(id))
    }

    fn edge(index: usize) -> HoverTarget {
        HoverTarget::Edge(LinkId(index))
    }

    fn enter(target: HoverTarget, at: Pos2) -> PointerEvent {
        PointerEvent::Enter { target, at }
    }

    #[test]
    fn node_hover_derives_tooltip() {
        let graph = graph();
        let mut state = InteractionState::default();

        assert!(state.apply(&graph, enter(node("1"), pos2(10.0, 20.0))));

        assert_eq!(state.hover(), &Hover::Node(NodeId::new("1")));
        let tooltip = state.tooltip().unwrap();
        assert_eq!(tooltip.anchor, pos2(25.0, 35.0));
        let TooltipContent::Node(details) = &tooltip.content else {
            panic!("expected node tooltip");
        };
        assert_eq!(details.title, "Hamlet");
        assert_eq!(details.traits_text(), "brooding, witty");
        assert_eq!(details.aliases_text(), "The Dane, Prince");
        assert!(state.summary().is_none());
    }

    #[test]
    fn edge_hover_fills_tooltip_and_summary() {
        let graph = graph();
        let mut state = InteractionState::default();
        state.apply(&graph, enter(edge(0), pos2(0.0, 0.0)));

        let summary = state.summary().unwrap();
        assert_eq!(summary.source_label, "Hamlet");
        assert_eq!(summary.role_forward, "friend");
        assert_eq!(summary.target_label, "Horatio");
        assert_eq!(summary.role_backward, "confidant");
        assert_eq!(summary.key_dialogs.len(), 2);
        assert_eq!(
            state.tooltip().map(|tooltip| &tooltip.content),
            Some(&TooltipContent::Relation(summary.clone()))
        );
    }

    #[test]
    fn hover_states_are_mutually_exclusive() {
        let graph = graph();
        let mut state = InteractionState::default();
        let link = edge(0);

        state.apply(&graph, enter(node("1"), pos2(1.0, 1.0)));
        state.apply(&graph, enter(link.clone(), pos2(2.0, 2.0)));
        assert_eq!(state.hover(), &Hover::Edge(LinkId(0)));
        assert!(matches!(
            state.tooltip().map(|tooltip| &tooltip.content),
            Some(TooltipContent::Relation(_))
        ));

        assert!(state.apply(&graph, PointerEvent::Leave { target: link }));
        assert!(state.is_idle());
        assert!(state.tooltip().is_none());
        assert!(state.summary().is_none());
    }

    #[test]
    fn entering_a_node_from_an_edge_clears_the_summary() {
        let graph = graph();
        let mut state = InteractionState::default();
        state.apply(&graph, enter(edge(0), pos2(0.0, 0.0)));
        state.apply(&graph, enter(node("2"), pos2(0.0, 0.0)));
        assert_eq!(state.hover(), &Hover::Node(NodeId::new("2")));
        assert!(state.summary().is_none());
    }

    #[test]
    fn move_updates_pointer_only() {
        let graph = graph();
        let mut state = InteractionState::default();
        state.apply(&graph, enter(node("2"), pos2(0.0, 0.0)));

        let at = pos2(100.0, 50.0);
        assert!(!state.apply(&graph, PointerEvent::Move { at }));
        assert_eq!(state.hover(), &Hover::Node(NodeId::new("2")));
        assert_eq!(state.pointer(), Some(pos2(100.0, 50.0)));
        assert_eq!(state.tooltip().unwrap().anchor, pos2(115.0, 65.0));
    }

    #[test]
    fn stale_leave_is_ignored() {
        let graph = graph();
        let mut state = InteractionState::default();
        state.apply(&graph, enter(node("1"), pos2(0.0, 0.0)));
        state.apply(&graph, enter(node("2"), pos2(0.0, 0.0)));

        assert!(!state.apply(&graph, PointerEvent::Leave { target: node("1") }));
        assert_eq!(state.hover(), &Hover::Node(NodeId::new("2")));
    }

    #[test]
    fn unknown_targets_do_not_change_state() {
        let graph = graph();
        let mut state = InteractionState::default();
        state.apply(&graph, enter(node("1"), pos2(0.0, 0.0)));

        assert!(!state.apply(&graph, enter(node("404"), pos2(5.0, 5.0))));
        assert!(!state.apply(&graph, enter(edge(7), pos2(5.0, 5.0))));
        assert_eq!(state.hover(), &Hover::Node(NodeId::new("1")));
    }

    #[test]
    fn leave_all_and_clear_summary() {
        let graph = graph();
        let mut state = InteractionState::default();
        state.apply(&graph, enter(edge(0), pos2(0.0, 0.0)));
        state.apply(&graph, PointerEvent::ClearSummary);
        assert!(state.summary().is_none());
        assert!(state.tooltip().is_some());

        assert!(state.apply(&graph, PointerEvent::LeaveAll));
        assert!(state.is_idle());
        assert!(!state.apply(&graph, PointerEvent::LeaveAll));
    }

    #[test]
    fn transition_leaves_input_untouched() {
        let graph = graph();
        let idle = InteractionState::default();
        let next = transition(&idle, &graph, enter(node("1"), pos2(0.0, 0.0)));
        assert!(idle.is_idle());
        assert_eq!(next.hover(), &Hover::Node(NodeId::new("1")));
    }

    #[test]
    fn tooltip_lines_skip_empty_sections() {
        let graph = graph();
        let details = node_details(&graph, &NodeId::new("2")).unwrap();
        let lines = details.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], TooltipLine::new(LineKind::Title, "Horatio"));
        assert_eq!(lines[1], TooltipLine::new(LineKind::Body, "Loyal friend."));

        let relation = relation_details(&graph, LinkId(0)).unwrap();
        let lines = relation.lines();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1].text, "Hamlet \u{2192} Horatio: friend");
        assert_eq!(lines[4].kind, LineKind::Quote);
    }
}
