use thiserror::Error;

use crate::core::NodeId;

/// Opaque failure reported by the external generator collaborator.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct GenerateError(#[from] pub anyhow::Error);

impl GenerateError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }
}

/// Opaque failure reported by the external compiler collaborator.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct CompileError(#[from] pub anyhow::Error);

impl CompileError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }
}

/// A node is misconfigured. Surfaced immediately, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("attribute '{0}' conflicts with the reserved '{1}' prefix")]
    ReservedAttribute(Box<str>, &'static str),

    #[error("required attribute '{0}' is absent")]
    MissingAttribute(Box<str>),
}

/// Everything that can go wrong while processing a single node. Each variant
/// carries the identity of the originating node; collaborator failures are
/// propagated verbatim underneath it.
#[derive(Debug, Error)]
pub enum AspectError {
    #[error("node '{node}': {source}")]
    Policy { node: NodeId, source: PolicyError },

    #[error("node '{node}': generation failed: {source}")]
    Generate { node: NodeId, source: GenerateError },

    #[error("node '{node}': compilation failed: {source}")]
    Compile { node: NodeId, source: CompileError },

    #[error("node '{node}': no published view for dependency '{dep}'")]
    MissingView { node: NodeId, dep: NodeId },
}

/// Errors raised while assembling or evaluating a [`crate::Schedule`].
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("node '{0}' was added twice")]
    Duplicate(NodeId),

    #[error("node '{node}' depends on unknown node '{dep}'")]
    UnknownDependency { node: NodeId, dep: NodeId },

    #[error(transparent)]
    Aspect(#[from] AspectError),
}
