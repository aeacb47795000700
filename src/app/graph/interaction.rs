use eframe::egui::Pos2;

use plot_graph::geometry::{NodeShape, ViewTransform, edge_contains};
use plot_graph::interaction::{Hover, HoverTarget, PointerEvent};
use plot_graph::model::LinkId;

use super::super::ViewModel;
use super::view::DOT_RADIUS;

impl ViewModel {
    pub(in crate::app) fn hovered_node_index(&self) -> Option<usize> {
        match self.scene.interaction().hover() {
            Hover::Node(id) => self.scene.graph().index_of(id),
            _ => None,
        }
    }

    pub(in crate::app) fn hovered_link(&self) -> Option<LinkId> {
        match self.scene.interaction().hover() {
            Hover::Edge(id) => Some(*id),
            _ => None,
        }
    }

    /// Topmost element under `pointer`. Nodes are painted over edges, so they
    /// win; among nodes the last painted wins.
    pub(in crate::app) fn hit_test(
        &self,
        transform: &ViewTransform,
        positions: &[Pos2],
        pointer: Pos2,
    ) -> Option<HoverTarget> {
        let graph = self.scene.graph();
        let point = transform.to_canvas(pointer);

        let node_hit = positions.iter().enumerate().rev().find(|(index, position)| {
            match self.shape {
                NodeShape::Label => self
                    .footprints
                    .get(*index)
                    .is_some_and(|footprint| footprint.contains(**position, point)),
                NodeShape::Dot => position.distance(point) <= DOT_RADIUS,
            }
        });
        if let Some((index, _)) = node_hit {
            return graph
                .node(index)
                .map(|node| HoverTarget::Node(node.id.clone()));
        }

        graph
            .links()
            .iter()
            .enumerate()
            .rev()
            .find(|(_, link)| {
                let (Some(start), Some(end)) = (
                    positions.get(link.source_index()),
                    positions.get(link.target_index()),
                ) else {
                    return false;
                };
                !link.is_self_loop() && edge_contains(*start, *end, link.weight, point)
            })
            .map(|(index, _)| HoverTarget::Edge(LinkId(index)))
    }

    /// Turns this frame's pointer position into state machine events.
    pub(in crate::app) fn sync_hover(
        &mut self,
        pointer: Option<Pos2>,
        transform: &ViewTransform,
        positions: &[Pos2],
    ) {
        let Some(at) = pointer else {
            self.scene.handle_pointer(PointerEvent::LeaveAll);
            return;
        };

        match self.hit_test(transform, positions, at) {
            Some(target) => {
                self.scene.handle_pointer(PointerEvent::Enter { target, at });
            }
            None => {
                if let Some(current) = self.scene.interaction().hover().target() {
                    self.scene
                        .handle_pointer(PointerEvent::Leave { target: current });
                }
                self.scene.handle_pointer(PointerEvent::Move { at });
            }
        }
    }
}
