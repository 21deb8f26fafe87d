//! Per-run record of compiled artifacts visible to the test runner.

use std::path::PathBuf;

/// One compiled artifact registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredArtifact {
    pub name: String,
    pub path: PathBuf,
    /// Position in registration order, starting at 1.
    pub sequence: u64,
}

/// Append-only registry of compiled artifacts.
///
/// Every run starts from an empty registry. Registration never removes
/// earlier entries; a later entry with the same name supersedes them for
/// lookup, so the test runner always sees the freshest compile of a given
/// artifact while visibility stays monotonic within the run.
#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    entries: Vec<RegisteredArtifact>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact; returns its sequence number.
    pub fn register(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> u64 {
        let sequence = self.entries.len() as u64 + 1;
        self.entries.push(RegisteredArtifact {
            name: name.into(),
            path: path.into(),
            sequence,
        });
        sequence
    }

    /// The most recently registered artifact with the given name.
    pub fn latest(&self, name: &str) -> Option<&RegisteredArtifact> {
        self.entries.iter().rev().find(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let registry = ArtifactRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.latest("adder_test"), None);
    }

    #[test]
    fn register_assigns_increasing_sequence_numbers() {
        let mut registry = ArtifactRegistry::new();
        assert_eq!(registry.register("a", "out/a"), 1);
        assert_eq!(registry.register("b", "out/b"), 2);
        assert_eq!(registry.len(), 2);
    }

    /// Re-registering a name keeps the earlier entry but supersedes it for
    /// lookup, mirroring a fresh compile shadowing a stale one.
    #[test]
    fn later_registration_supersedes_earlier_for_lookup() {
        let mut registry = ArtifactRegistry::new();
        registry.register("adder_test", "out/adder/adder_test.v1");
        registry.register("adder_test", "out/adder/adder_test.v2");

        let latest = registry.latest("adder_test").expect("latest");
        assert_eq!(latest.path, PathBuf::from("out/adder/adder_test.v2"));
        assert_eq!(latest.sequence, 2);
        assert_eq!(registry.len(), 2);
    }
}
