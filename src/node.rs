use std::collections::BTreeMap;

use camino::Utf8PathBuf;

use crate::core::NodeId;

/// One source-definition unit in the dependency graph, e.g. a single schema
/// module. Nodes are created up front by the graph engine and are immutable
/// during evaluation.
///
/// A node with no own sources is a pure alias: it re-exports its dependencies
/// and never contributes an artifact of its own.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    deps: Vec<NodeId>,
    sources: Vec<Utf8PathBuf>,
    attrs: BTreeMap<Box<str>, Box<str>>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            deps: Vec::new(),
            sources: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    /// Declares a direct dependency on another node.
    pub fn dep(mut self, id: impl Into<NodeId>) -> Self {
        self.deps.push(id.into());
        self
    }

    /// Declares one of the node's own source files.
    pub fn source(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    /// Attaches a resolved attribute value, such as a protocol flavor tag
    /// consumed by an extension variant.
    pub fn attr(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Direct dependencies, in declared order. The declared order is what
    /// fixes the artifact order of the aggregated view, regardless of the
    /// order in which the graph engine happens to finish them.
    pub fn deps(&self) -> &[NodeId] {
        &self.deps
    }

    pub fn sources(&self) -> &[Utf8PathBuf] {
        &self.sources
    }

    /// False for alias/re-export nodes.
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(AsRef::as_ref)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }
}
