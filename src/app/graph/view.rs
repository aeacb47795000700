use eframe::egui::{
    self, Align2, Color32, Context, FontId, Pos2, Rect, RichText, Sense, Stroke, StrokeKind, Ui,
    vec2,
};
use tracing::warn;

use plot_graph::geometry::{NODE_HEIGHT, NodeShape, ViewBox, ViewTransform, edge_stroke_width};
use plot_graph::interaction::LineKind;

use super::super::ViewModel;
use super::super::render_utils::{EDGE_COLOR, EDGE_HOVER_COLOR, draw_background, node_fill};

pub(super) const DOT_RADIUS: f32 = 9.0;
const SELF_LOOP_RADIUS: f32 = 8.0;

fn screen_rect(transform: &ViewTransform, canvas_rect: Rect) -> Rect {
    Rect::from_min_max(
        transform.to_screen(canvas_rect.min),
        transform.to_screen(canvas_rect.max),
    )
}

impl ViewModel {
    fn advance_layout(&mut self, ctx: &Context) {
        if !self.live_layout {
            return;
        }

        let delta_seconds = ctx
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        self.clock.advance(delta_seconds);

        match self.scene.drive(self.token, &mut self.clock) {
            Ok(status) if !status.is_finished() => ctx.request_repaint(),
            Ok(_) => {}
            Err(error) => {
                warn!(%error, "dropping ticks for a replaced layout");
                self.token = self.scene.token();
            }
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter = ui.painter_at(rect);

        let config = *self.scene.config();
        let transform = ViewBox::from(config.canvas).fit(rect);
        let canvas_rect = screen_rect(
            &transform,
            Rect::from_min_size(Pos2::ZERO, vec2(config.canvas.width, config.canvas.height)),
        );
        draw_background(&painter, rect, canvas_rect);

        self.advance_layout(ui.ctx());

        let positions = self.scene.snapshot().positions;
        self.sync_hover(response.hover_pos(), &transform, &positions);

        let hovered_node = self.hovered_node_index();
        let hovered_link = self.hovered_link();
        if hovered_node.is_some() || hovered_link.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let matches = self.search_matches();
        let search_active = matches.is_some();
        let graph = self.scene.graph();
        let scale = transform.scale;

        for (index, link) in graph.links().iter().enumerate() {
            let (Some(&start), Some(&end)) = (
                positions.get(link.source_index()),
                positions.get(link.target_index()),
            ) else {
                continue;
            };

            let color = if hovered_link.is_some_and(|id| id.0 == index) {
                EDGE_HOVER_COLOR
            } else {
                EDGE_COLOR
            };
            let stroke = Stroke::new(edge_stroke_width(link.weight) * scale, color);

            if link.is_self_loop() {
                let center = start - vec2(0.0, NODE_HEIGHT * 0.5 + SELF_LOOP_RADIUS);
                painter.circle_stroke(
                    transform.to_screen(center),
                    SELF_LOOP_RADIUS * scale,
                    stroke,
                );
            } else {
                painter.line_segment(
                    [transform.to_screen(start), transform.to_screen(end)],
                    stroke,
                );
            }
        }

        let font = FontId::proportional(13.0 * scale);
        for (index, node) in graph.nodes().iter().enumerate() {
            let Some(&position) = positions.get(index) else {
                continue;
            };

            let hovered = hovered_node == Some(index);
            let matched = matches.as_ref().is_some_and(|matches| matches.contains(&index));
            let fill = node_fill(node.is_main, hovered, matched, search_active);
            let outline = Stroke::new(
                if node.is_main { 2.2 } else { 1.0 },
                Color32::from_rgba_unmultiplied(15, 15, 15, 190),
            );
            let center = transform.to_screen(position);

            match self.shape {
                NodeShape::Label => {
                    let Some(footprint) = self.footprints.get(index) else {
                        continue;
                    };
                    let node_rect = screen_rect(&transform, footprint.rect_at(position));
                    let rounding = 6.0 * scale;
                    painter.rect_filled(node_rect, rounding, fill);
                    painter.rect_stroke(node_rect, rounding, outline, StrokeKind::Inside);
                    painter.text(
                        center,
                        Align2::CENTER_CENTER,
                        &node.label,
                        font.clone(),
                        Color32::from_gray(238),
                    );
                }
                NodeShape::Dot => {
                    let radius = DOT_RADIUS * scale;
                    painter.circle_filled(center, radius, fill);
                    painter.circle_stroke(center, radius, outline);
                    if hovered || node.is_main || matched {
                        painter.text(
                            center + vec2(radius + 5.0, 0.0),
                            Align2::LEFT_CENTER,
                            &node.label,
                            font.clone(),
                            Color32::from_gray(238),
                        );
                    }
                }
            }
        }
    }

    pub(in crate::app) fn draw_tooltip(&self, ctx: &Context) {
        let Some(tooltip) = self.scene.interaction().tooltip() else {
            return;
        };

        egui::Area::new(egui::Id::new("plot_graph_tooltip"))
            .order(egui::Order::Tooltip)
            .fixed_pos(tooltip.anchor)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(320.0);
                    for line in tooltip.content.lines() {
                        match line.kind {
                            LineKind::Title => ui.label(RichText::new(line.text).strong()),
                            LineKind::Body => ui.label(line.text),
                            LineKind::Labeled(label) => {
                                ui.label(format!("{label}: {}", line.text))
                            }
                            LineKind::Quote => ui.label(
                                RichText::new(format!("\u{201c}{}\u{201d}", line.text)).italics(),
                            ),
                        };
                    }
                });
            });
    }
}
