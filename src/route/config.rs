//! Route table loading. The document mirrors what a client-side router is
//! configured with: nested routes carrying `name`, `path`, `meta` and
//! `children`.

use super::{RouteError, RouteId, RouteNode, RouteTree};
use crate::meta::Meta;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub children: Vec<RouteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteTable {
    pub routes: Vec<RouteConfig>,
}

impl RouteTable {
    /// # Errors
    ///
    /// Returns [`RouteError::Json`] for malformed documents.
    pub fn from_json(input: &str) -> Result<Self, RouteError> {
        Ok(serde_json::from_str(input)?)
    }

    /// # Errors
    ///
    /// Returns [`RouteError::Io`] when the file can't be read, or
    /// [`RouteError::Json`] when it isn't a route table.
    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self, RouteError> {
        let input = std::fs::read_to_string(path).map_err(|source| RouteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&input)
    }

    /// Flattens the nested table into a [`RouteTree`], parents first.
    ///
    /// # Errors
    ///
    /// Fails on empty or duplicate route names.
    pub fn into_tree(self) -> Result<RouteTree, RouteError> {
        let mut tree = RouteTree::new();
        let mut pending: Vec<(RouteConfig, Option<RouteId>)> =
            self.routes.into_iter().rev().map(|route| (route, None)).collect();

        while let Some((route, parent)) = pending.pop() {
            let RouteConfig {
                name,
                path,
                meta,
                children,
            } = route;
            let id = tree.insert(RouteNode::new(name, path, meta), parent)?;
            pending.extend(children.into_iter().rev().map(|child| (child, Some(id))));
        }

        debug!("loaded {} routes", tree.len());

        Ok(tree)
    }
}
