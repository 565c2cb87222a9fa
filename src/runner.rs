//! A thin dependency-ordered evaluation harness.
//!
//! Real builds embed the [`crate::AspectDriver`] into a full graph engine
//! that owns incremental caching and fan-out isolation. This module provides
//! the minimal stand-in needed to evaluate whole graphs: it validates the
//! schedule, walks nodes leaves-first and publishes each node's view before
//! any dependent runs. Two walks are available: a sequential one, and a
//! parallel one that spawns a node as soon as its dependency count drops to
//! zero.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::channel;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::artifact::ArtifactSet;
use crate::core::NodeId;
use crate::driver::AspectDriver;
use crate::error::{AspectError, ScheduleError};
use crate::node::Node;
use crate::view::CompilationView;

/// A dependency-ordered collection of nodes, ready for evaluation.
///
/// Nodes must be added dependencies-first, which keeps the graph acyclic by
/// construction.
#[derive(Debug, Default)]
pub struct Schedule {
    graph: DiGraph<Node, ()>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node whose dependencies have all been added before it.
    pub fn add(&mut self, node: Node) -> Result<(), ScheduleError> {
        if self.index.contains_key(node.id().as_ref()) {
            return Err(ScheduleError::Duplicate(node.id().clone()));
        }

        let mut edges = Vec::with_capacity(node.deps().len());
        for dep in node.deps() {
            match self.index.get(dep.as_ref()) {
                Some(&dep_index) => edges.push(dep_index),
                None => {
                    return Err(ScheduleError::UnknownDependency {
                        node: node.id().clone(),
                        dep: dep.clone(),
                    });
                }
            }
        }

        let id = node.id().clone();
        let index = self.graph.add_node(node);
        for dep_index in edges {
            self.graph.add_edge(dep_index, index, ());
        }
        self.index.insert(id, index);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Evaluates every node in dependency order on the current thread.
    pub fn evaluate(&self, driver: &AspectDriver) -> Result<Evaluation, ScheduleError> {
        // Insertion order already is a valid order; toposort guards against
        // future construction paths that might break the invariant.
        let order = petgraph::algo::toposort(&self.graph, None).expect("cycle in schedule graph");

        let mut views: HashMap<NodeIndex, Arc<CompilationView>> = HashMap::new();

        for index in order {
            let node = &self.graph[index];
            let deps = self.dep_views(&views, node);
            let view = driver.process(node, &deps)?;
            views.insert(index, Arc::new(view));
        }

        Ok(self.publish(views))
    }

    /// Evaluates the graph on the rayon thread pool. A node is spawned as
    /// soon as the last of its dependencies has published its view; results
    /// come back over a channel and unlock dependents.
    ///
    /// The scheduler loop stays on the calling thread; only node processing
    /// runs on pool workers. This keeps every worker available for spawned
    /// jobs even when the pool has a single thread.
    pub fn evaluate_parallel(&self, driver: &AspectDriver) -> Result<Evaluation, ScheduleError> {
        petgraph::algo::toposort(&self.graph, None).expect("cycle in schedule graph");

        // Map from a dependency to the nodes waiting on it.
        let mut dependents: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
        for edge in self.graph.raw_edges() {
            dependents
                .entry(edge.source())
                .or_default()
                .push(edge.target());
        }

        let mut dependency_counts: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|i| {
                (
                    i,
                    self.graph
                        .neighbors_directed(i, petgraph::Direction::Incoming)
                        .count(),
                )
            })
            .collect();

        let total = self.graph.node_count();
        let mut completed = 0;
        let mut views: HashMap<NodeIndex, Arc<CompilationView>> = HashMap::new();

        if total == 0 {
            return Ok(Evaluation::default());
        }

        // in_place_scope, not scope: the receive loop below blocks, and it
        // must not occupy a pool worker while the spawned jobs wait for one.
        rayon::in_place_scope(|s| -> Result<(), ScheduleError> {
            let (sender, receiver) = channel::<(NodeIndex, Result<CompilationView, AspectError>)>();

            let spawn_node = |views: &HashMap<NodeIndex, Arc<CompilationView>>,
                              index: NodeIndex| {
                let node = &self.graph[index];
                let deps = self.dep_views(views, node);
                let sender = sender.clone();

                s.spawn(move |_| {
                    let result = driver.process(node, &deps);
                    // The receiver is gone if evaluation already failed.
                    let _ = sender.send((index, result));
                });
            };

            // Seed the leaves.
            for index in self.graph.node_indices() {
                if dependency_counts[&index] == 0 {
                    spawn_node(&views, index);
                }
            }

            while completed < total {
                let (index, result) = receiver.recv().expect("all result senders dropped");

                views.insert(index, Arc::new(result?));
                completed += 1;

                if let Some(waiting) = dependents.get(&index) {
                    for &next in waiting {
                        let count = dependency_counts
                            .get_mut(&next)
                            .expect("dependent missing from count table");
                        *count -= 1;
                        if *count == 0 {
                            spawn_node(&views, next);
                        }
                    }
                }
            }

            Ok(())
        })?;

        Ok(self.publish(views))
    }

    /// Looks up the published views of a node's direct dependencies, in the
    /// node's declared order.
    fn dep_views(
        &self,
        views: &HashMap<NodeIndex, Arc<CompilationView>>,
        node: &Node,
    ) -> Vec<Arc<CompilationView>> {
        node.deps()
            .iter()
            .map(|id| views[&self.index[id.as_ref()]].clone())
            .collect()
    }

    fn publish(&self, views: HashMap<NodeIndex, Arc<CompilationView>>) -> Evaluation {
        Evaluation {
            views: views
                .into_iter()
                .map(|(index, view)| (self.graph[index].id().clone(), view))
                .collect(),
        }
    }
}

/// The published views of a completed evaluation, keyed by node identity.
#[derive(Debug, Default)]
pub struct Evaluation {
    views: HashMap<NodeId, Arc<CompilationView>>,
}

impl Evaluation {
    pub fn view(&self, id: &str) -> Option<&Arc<CompilationView>> {
        self.views.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Arc<CompilationView>)> {
        self.views.iter()
    }

    /// Every compiled unit produced anywhere in the graph, for the external
    /// "collect build outputs" step.
    pub fn outputs(&self) -> ArtifactSet {
        let mut ids: Vec<_> = self.views.keys().collect();
        ids.sort();

        let mut outputs = ArtifactSet::new();
        for id in ids {
            outputs.union(&self.views[id].artifacts);
        }
        outputs
    }
}
