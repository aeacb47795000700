use std::path::PathBuf;

use thiserror::Error;

use crate::model::NodeId;

/// Fatal problems with an analysis document. No graph is produced.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid analysis document: {reason}")]
    InvalidInput { reason: String },
    #[error("analysis document is not valid JSON")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Non-fatal diagnostics collected while building a graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphWarning {
    #[error(
        "relation #{relation} ({source_id} -> {target_id}) dropped: unknown character {missing}"
    )]
    DanglingReference {
        relation: usize,
        source_id: String,
        target_id: String,
        missing: String,
    },
    #[error("character {id} appears more than once; the later record wins")]
    DuplicateCharacter { id: NodeId },
    #[error("relation #{relation} dropped: record is not an object")]
    MalformedRelation { relation: usize },
    #[error("{record}: `{field}` has the wrong type; using the default")]
    MistypedField { record: String, field: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read layout config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse layout config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid layout config: {0}")]
    Invalid(String),
}

/// Driving a simulation that belongs to a graph which has since been replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("simulation generation {token} is stale (current generation {current})")]
pub struct StaleSimulation {
    pub token: u64,
    pub current: u64,
}
