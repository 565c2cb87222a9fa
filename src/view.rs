//! The aggregated results a node publishes to its dependents.
//!
//! Data flows bottom-up through the graph: each node merges its own generated
//! unit (if any) with the already-merged views of its direct dependencies and
//! publishes the result as a single immutable [`CompilationView`]. Dependents
//! share the view by reference; it is never copied or recomputed.

use std::sync::Arc;

use crate::artifact::{Artifact, ArtifactSet};
use crate::core::Hash32;

/// The compile-time arguments needed to compile code against a set of units:
/// interfaces visible to consumers and interfaces used internally only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileArgs {
    /// Interfaces exported to consumers of the unit.
    pub exported: ArtifactSet,
    /// Interfaces needed to compile the unit itself, invisible to consumers.
    pub internal: ArtifactSet,
}

impl CompileArgs {
    pub fn merge(&mut self, other: &CompileArgs) {
        self.exported.union(&other.exported);
        self.internal.union(&other.internal);
    }

    pub fn is_empty(&self) -> bool {
        self.exported.is_empty() && self.internal.is_empty()
    }
}

/// One node's own generated-and-compiled result. Absent when generation was
/// skipped (alias node or fully excluded sources).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    /// The derived source unit produced by the generator.
    pub source: Artifact,
    /// The compiled unit produced from it.
    pub output: Artifact,
    /// Arguments a consumer needs to compile against this unit.
    pub exported: CompileArgs,
    /// Fingerprint of the generator invocation that produced the unit.
    pub fingerprint: Hash32,
}

/// The transitively merged result a node exposes to its dependents.
///
/// Immutable once published. The artifact sets are duplicate-free even when
/// the graph reaches a node through multiple dependency paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationView {
    /// Every compiled unit a consumer must physically include, dependencies
    /// first, this node's own unit last.
    pub artifacts: ArtifactSet,
    /// Every derived source unit produced anywhere in the subgraph, for the
    /// external "collect build outputs" step.
    pub sources: ArtifactSet,
    /// Merged compile-time arguments for the whole artifact set.
    pub args: CompileArgs,
}

impl CompilationView {
    /// The view of a vetoed node: contributes nothing, forwards nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.sources.is_empty() && self.args.is_empty()
    }
}

/// Merges a node's own unit with the published views of its direct
/// dependencies.
///
/// Dependency views are merged in the node's declared dependency order, never
/// in scheduler completion order, so the result is identical across
/// evaluations and traversal strategies. A node without an own unit degrades
/// to a transparent merge of its dependencies.
pub fn aggregate(own: Option<&CompiledUnit>, deps: &[Arc<CompilationView>]) -> CompilationView {
    let mut view = CompilationView::empty();

    for dep in deps {
        view.artifacts.union(&dep.artifacts);
        view.sources.union(&dep.sources);
        view.args.merge(&dep.args);
    }

    if let Some(unit) = own {
        view.artifacts.insert(unit.output.clone());
        view.sources.insert(unit.source.clone());
        view.args.merge(&unit.exported);
    }

    tracing::trace!(
        deps = deps.len(),
        own = own.is_some(),
        artifacts = view.artifacts.len(),
        "merged dependency views"
    );

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Artifact;

    fn unit(owner: &str) -> CompiledUnit {
        let output = Artifact::new(owner, format!("lib{owner}.gen"));
        CompiledUnit {
            source: Artifact::new(owner, format!("{owner}.gen.src")),
            exported: CompileArgs {
                exported: [output.clone()].into_iter().collect(),
                internal: ArtifactSet::new(),
            },
            output,
            fingerprint: Hash32::default(),
        }
    }

    #[test]
    fn test_alias_is_transparent() {
        let a = Arc::new(aggregate(Some(&unit("a")), &[]));
        let b = Arc::new(aggregate(Some(&unit("b")), &[]));

        let alias = aggregate(None, &[a.clone(), b.clone()]);

        let mut expected = ArtifactSet::new();
        expected.union(&a.artifacts);
        expected.union(&b.artifacts);
        assert_eq!(alias.artifacts, expected);

        let mut args = CompileArgs::default();
        args.merge(&a.args);
        args.merge(&b.args);
        assert_eq!(alias.args, args);
    }

    #[test]
    fn test_diamond_includes_shared_dep_once() {
        // a <- b, a <- c, {b, c} <- d
        let a = Arc::new(aggregate(Some(&unit("a")), &[]));
        let b = Arc::new(aggregate(Some(&unit("b")), &[a.clone()]));
        let c = Arc::new(aggregate(Some(&unit("c")), &[a.clone()]));
        let d = aggregate(Some(&unit("d")), &[b, c]);

        let a_out = Artifact::new("a", "liba.gen");
        let count = d.artifacts.iter().filter(|x| **x == a_out).count();
        assert_eq!(count, 1);
        assert_eq!(d.artifacts.len(), 4);
    }

    #[test]
    fn test_dependencies_come_first() {
        let a = Arc::new(aggregate(Some(&unit("a")), &[]));
        let b = aggregate(Some(&unit("b")), &[a]);

        let order: Vec<_> = b.artifacts.iter().map(|x| x.owner.as_ref()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_view_contributes_nothing() {
        let vetoed = Arc::new(CompilationView::empty());
        let a = Arc::new(aggregate(Some(&unit("a")), &[]));
        let b = aggregate(Some(&unit("b")), &[vetoed, a.clone()]);

        assert_eq!(b.artifacts.len(), 2);
        assert!(b.artifacts.contains(&Artifact::new("a", "liba.gen")));
    }
}
