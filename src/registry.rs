//! Artifact registry
//!
//! An explicitly owned, insertion-ordered map from id to artifact. The first
//! definition of an id wins; later inserts of the same id are rejected and the
//! caller treats them as references.

use std::collections::HashMap;

use crate::models::{Artifact, ArtifactType};

/// First-definition-wins artifact registry
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    artifacts: Vec<Artifact>,
    index: HashMap<String, usize>,
}

impl ArtifactRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact unless its id is already defined
    ///
    /// Returns `true` if the artifact was registered.
    pub fn insert(&mut self, artifact: Artifact) -> bool {
        if self.index.contains_key(&artifact.id) {
            return false;
        }
        self.index.insert(artifact.id.clone(), self.artifacts.len());
        self.artifacts.push(artifact);
        true
    }

    /// Whether an id is defined
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up an artifact by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Artifact> {
        self.index.get(id).map(|&i| &self.artifacts[i])
    }

    /// Number of defined artifacts
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether nothing is defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Artifacts in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    /// Mutable artifacts in registration order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Artifact> {
        self.artifacts.iter_mut()
    }

    /// Artifacts of one type, in registration order
    pub fn of_type(&self, kind: ArtifactType) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.kind == kind)
    }

    /// Consume the registry, keeping registration order
    #[must_use]
    pub fn into_vec(self) -> Vec<Artifact> {
        self.artifacts
    }
}
