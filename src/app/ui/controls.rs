use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use plot_graph::geometry::NodeShape;
use plot_graph::model::Node;

use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Best score over the label and every alias.
fn node_match_score(matcher: &SkimMatcherV2, node: &Node, query: &str) -> Option<i64> {
    std::iter::once(node.label.as_str())
        .chain(node.aliases.iter().map(String::as_str))
        .filter_map(|text| fuzzy_match_score(matcher, text, query))
        .max()
}

impl ViewModel {
    /// Indices of nodes matching the search box, cached per query and graph
    /// generation.
    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let generation = self.token.generation();
        if let Some(cached) = &self.search_match_cache
            && cached.generation == generation
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .scene
            .graph()
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node_match_score(&matcher, node, query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            generation,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search characters")
            .on_hover_text("Fuzzy-highlight characters by name or alias.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();

        let mut shape = self.shape;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut shape, NodeShape::Label, "Labels")
                .on_hover_text("Draw each character as a name tag.");
            ui.selectable_value(&mut shape, NodeShape::Dot, "Dots")
                .on_hover_text("Draw compact dots; names appear on hover.");
        });
        self.set_shape(shape);

        ui.checkbox(&mut self.live_layout, "Live layout")
            .on_hover_text("Advance the force simulation every frame.");

        ui.separator();
        ui.label(RichText::new("Characters").strong());

        let matches = self.search_matches();
        let graph = Arc::clone(self.scene.graph());
        let hovered = self.hovered_node_index();

        egui::ScrollArea::vertical()
            .id_salt("character_list_scroll")
            .auto_shrink([false, false])
            .show_rows(ui, 20.0, graph.node_count(), |ui, row_range| {
                for index in row_range {
                    let Some(node) = graph.node(index) else {
                        continue;
                    };
                    let mut text = RichText::new(node.label.as_str());
                    if node.is_main {
                        text = text.strong();
                    }
                    if matches.as_ref().is_some_and(|matches| matches.contains(&index)) {
                        text = text.color(egui::Color32::from_rgb(103, 196, 255));
                    }

                    let response = ui.selectable_label(hovered == Some(index), text);
                    if !node.aliases.is_empty() {
                        response.on_hover_text(node.aliases.join(", "));
                    }
                }
            });
    }
}
