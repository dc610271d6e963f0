//! Route tree owned by the host router. Nodes live in an arena and point at
//! their parent through a [`RouteId`] index, so the back-reference never owns
//! the ancestor. A parent must be inserted before its children, which keeps the
//! tree acyclic: upward walks always terminate at a root.

pub mod config;

pub use config::{RouteConfig, RouteTable};

use crate::meta::{Meta, MetaValue};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route name must not be empty")]
    EmptyName,
    #[error("duplicate route name: {0}")]
    DuplicateName(String),
    #[error("unknown parent route id: {0}")]
    UnknownParent(usize),
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("invalid route table")]
    Json(#[from] serde_json::Error),
    #[error("failed to read route table {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Index of a node inside a [`RouteTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(usize);

#[derive(Debug, Clone)]
pub struct RouteNode {
    pub name: String,
    pub path: String,
    pub meta: Meta,
    parent: Option<RouteId>,
}

impl RouteNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>, meta: Meta) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            meta,
            parent: None,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<RouteId> {
        self.parent
    }

    /// Reads `key` from this node's own meta, without inheritance.
    #[must_use]
    pub fn meta_value(&self, key: &str) -> Option<&MetaValue> {
        self.meta.get(key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTree {
    nodes: Vec<RouteNode>,
    by_name: HashMap<String, RouteId>,
}

impl RouteTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` under `parent` (or as a root) and returns its id.
    ///
    /// # Errors
    ///
    /// Fails when the name is empty or already used, or when `parent` does not
    /// belong to this tree.
    pub fn insert(&mut self, mut node: RouteNode, parent: Option<RouteId>) -> Result<RouteId, RouteError> {
        if node.name.trim().is_empty() {
            return Err(RouteError::EmptyName);
        }
        if self.by_name.contains_key(&node.name) {
            return Err(RouteError::DuplicateName(node.name));
        }
        if let Some(parent) = parent {
            if parent.0 >= self.nodes.len() {
                return Err(RouteError::UnknownParent(parent.0));
            }
        }

        let id = RouteId(self.nodes.len());
        node.parent = parent;
        self.by_name.insert(node.name.clone(), id);
        self.nodes.push(node);

        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: RouteId) -> Option<&RouteNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<RouteId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids from `id` up to its root, leaf first.
    pub fn ancestors(&self, id: RouteId) -> impl Iterator<Item = RouteId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |current| {
            self.get(*current).and_then(RouteNode::parent)
        })
    }

    /// Matched chain for `id`, ordered root to leaf.
    #[must_use]
    pub fn matched(&self, id: RouteId) -> Vec<RouteId> {
        let mut chain: Vec<RouteId> = self.ancestors(id).collect();
        chain.reverse();
        chain
    }

    /// Builds the navigation target for `id`.
    #[must_use]
    pub fn location(&self, id: RouteId) -> Option<RouteLocation> {
        let node = self.get(id)?;
        Some(RouteLocation {
            name: node.name.clone(),
            path: self.full_path(id),
            matched: self.matched(id),
            meta: node.meta.clone(),
        })
    }

    /// Builds the navigation target for the route called `name`.
    ///
    /// # Errors
    ///
    /// Fails when no route has that name.
    pub fn location_by_name(&self, name: &str) -> Result<RouteLocation, RouteError> {
        self.find(name)
            .and_then(|id| self.location(id))
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))
    }

    /// Joins the path segments of the matched chain. Absolute child paths
    /// restart from the root.
    #[must_use]
    pub fn full_path(&self, id: RouteId) -> String {
        let mut full = String::new();
        for node in self.matched(id).into_iter().filter_map(|id| self.get(id)) {
            let segment = node.path.trim_end_matches('/');
            if segment.starts_with('/') {
                full = segment.to_string();
            } else if !segment.is_empty() {
                full.push('/');
                full.push_str(segment);
            }
        }
        if full.is_empty() {
            full.push('/');
        }
        full
    }
}

/// A resolved navigation endpoint: the route being entered or left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLocation {
    pub name: String,
    pub path: String,
    #[serde(skip)]
    pub matched: Vec<RouteId>,
    pub meta: Meta,
}

impl RouteLocation {
    /// Last entry of the matched chain.
    #[must_use]
    pub fn leaf(&self) -> Option<RouteId> {
        self.matched.last().copied()
    }
}
