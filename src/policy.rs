use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};

use crate::node::Node;

/// Source files for which generation must never occur, because a pre-built
/// runtime support library already ships their derived code.
///
/// Supplied once per build and shared read-only across every node evaluation.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    paths: HashSet<Utf8PathBuf>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<Utf8PathBuf>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl<P: Into<Utf8PathBuf>> FromIterator<P> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Decides whether derived code must be generated for a node.
///
/// Alias nodes (no own sources) never generate. A node whose own sources are
/// *all* excluded generates nothing. Partial overlap errs toward generation:
/// one non-excluded source is enough to regenerate the whole node, even if
/// that re-derives some excluded sources redundantly.
pub fn should_generate(node: &Node, exclusions: &ExclusionSet) -> bool {
    if !node.has_sources() {
        return false;
    }

    let generate = node
        .sources()
        .iter()
        .any(|source| !exclusions.contains(source));

    if !generate {
        tracing::debug!(
            node = %node.id(),
            "all sources covered by the runtime support library, skipping generation"
        );
    }

    generate
}
