// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Knowledge graph of entity relationships extracted from conversations
//!
//! Directed, labeled multigraph held entirely in memory. Repeating a
//! `(src, relation, dst)` triple adds another edge so that frequently
//! stated facts carry more weight in downstream consumers.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Outbound edge of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub relation: String,
    pub target: String,
}

impl Relation {
    pub fn new(relation: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    nodes: HashSet<String>,
    edges: HashMap<String, Vec<Relation>>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directed edge. Both endpoints become nodes.
    pub fn add_relationship(
        &mut self,
        src: impl Into<String>,
        relation: impl Into<String>,
        dst: impl Into<String>,
    ) {
        let src = src.into();
        let dst = dst.into();

        self.nodes.insert(src.clone());
        self.nodes.insert(dst.clone());
        self.edges
            .entry(src)
            .or_default()
            .push(Relation::new(relation, dst));
    }

    /// Outbound edges of `entity` in insertion order; empty when unknown
    pub fn query(&self, entity: &str) -> &[Relation] {
        self.edges.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.nodes.contains(entity)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
