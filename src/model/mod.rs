mod build;
mod document;
mod graph;

pub use build::{BuildReport, build_graph, parse_graph};
pub use graph::{Graph, Link, LinkId, Node, NodeId, StoryValidation};
