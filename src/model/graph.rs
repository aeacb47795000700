use std::collections::HashMap;
use std::fmt;

/// Stable character identifier. Numeric ids from the analysis service are
/// normalised to their decimal text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Position of a link in [`Graph::links`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub is_main: bool,
    pub traits: Vec<String>,
    pub aliases: Vec<String>,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub source_id: NodeId,
    pub target_id: NodeId,
    /// Operator supplied; may be any number. Only rendering reads it.
    pub weight: f64,
    pub role_forward: String,
    pub role_backward: String,
    pub key_dialogs: Vec<String>,
    pub(super) source: usize,
    pub(super) target: usize,
}

impl Link {
    pub fn source_index(&self) -> usize {
        self.source
    }

    pub fn target_index(&self) -> usize {
        self.target
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Reviewer verdict attached by the analysis service when validation was requested.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoryValidation {
    pub known_story: bool,
    pub issues: Vec<String>,
    pub notes: String,
    pub score: Option<i64>,
}

/// Validated character graph. Topology is fixed once built; positions live in
/// the simulation, never here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    pub(super) nodes: Vec<Node>,
    pub(super) links: Vec<Link>,
    pub(super) index_by_id: HashMap<NodeId, usize>,
    pub(super) summary: String,
    pub(super) validation: Option<StoryValidation>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node_by_id(&self, id: &NodeId) -> Option<&Node> {
        self.index_of(id).and_then(|index| self.nodes.get(index))
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn validation(&self) -> Option<&StoryValidation> {
        self.validation.as_ref()
    }

    /// Links touching `index`, self-loops excluded.
    pub fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.links.iter().filter_map(move |link| {
            if link.is_self_loop() {
                None
            } else if link.source == index {
                Some(link.target)
            } else if link.target == index {
                Some(link.source)
            } else {
                None
            }
        })
    }
}
