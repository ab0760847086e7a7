use crate::hierarchy::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown node: {node}")]
    UnknownNode { node: NodeId },
    #[error("node {node} cannot be its own parent")]
    SelfParent { node: NodeId },
    #[error("making {parent} the parent of {node} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },
    #[error("duplicate node key: {key}")]
    DuplicateKey { key: String },
    #[error("node {key} references an unknown parent {parent}")]
    UnknownParentKey { key: String, parent: String },
    #[error("level array does not match the hierarchy: {message}")]
    LevelMismatch { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
