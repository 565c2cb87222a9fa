use std::collections::HashSet;

use camino::Utf8PathBuf;

use crate::core::NodeId;

/// Identity of one build artifact: a derived source unit or a compiled unit.
///
/// Two artifacts are the same artifact when their owning node and relative
/// path match; this identity is what the deduplication in
/// [`crate::ArtifactSet`] keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    /// The node that produced this artifact.
    pub owner: NodeId,
    /// Path relative to the owner's output root.
    pub path: Utf8PathBuf,
}

impl Artifact {
    pub fn new(owner: impl Into<NodeId>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            owner: owner.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.owner, self.path)
    }
}

/// An order-preserving, duplicate-free set of artifacts.
///
/// Insertion keeps the first occurrence and its position; later inserts of
/// the same artifact are no-ops. This is what guarantees that a node reached
/// through several dependency paths of a DAG contributes its artifact exactly
/// once to any consumer's view.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    order: Vec<Artifact>,
    seen: HashSet<Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the artifact was not present yet.
    pub fn insert(&mut self, artifact: Artifact) -> bool {
        if self.seen.insert(artifact.clone()) {
            self.order.push(artifact);
            true
        } else {
            false
        }
    }

    /// Appends every artifact of `other` not already present, in order.
    pub fn union(&mut self, other: &ArtifactSet) {
        for artifact in &other.order {
            self.insert(artifact.clone());
        }
    }

    pub fn contains(&self, artifact: &Artifact) -> bool {
        self.seen.contains(artifact)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PartialEq for ArtifactSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for ArtifactSet {}

impl FromIterator<Artifact> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        let mut set = ArtifactSet::new();
        for artifact in iter {
            set.insert(artifact);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(owner: &str, path: &str) -> Artifact {
        Artifact::new(owner, path)
    }

    #[test]
    fn test_insert_keeps_first_position() {
        let mut set = ArtifactSet::new();
        assert!(set.insert(art("a", "lib.a")));
        assert!(set.insert(art("b", "lib.b")));
        assert!(!set.insert(art("a", "lib.a")));

        let order: Vec<_> = set.iter().cloned().collect();
        assert_eq!(order, vec![art("a", "lib.a"), art("b", "lib.b")]);
    }

    #[test]
    fn test_union_is_idempotent() {
        let left: ArtifactSet = [art("a", "lib.a"), art("b", "lib.b")].into_iter().collect();
        let right: ArtifactSet = [art("b", "lib.b"), art("c", "lib.c")].into_iter().collect();

        let mut once = left.clone();
        once.union(&right);

        let mut twice = once.clone();
        twice.union(&right);

        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_identity_includes_owner() {
        let mut set = ArtifactSet::new();
        set.insert(art("a", "lib.gen"));
        set.insert(art("b", "lib.gen"));
        assert_eq!(set.len(), 2);
    }
}
