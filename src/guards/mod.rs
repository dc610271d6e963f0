//! Navigation guards. Both guards read inherited route meta through
//! [`resolve_inherited_meta`] and answer with a [`Decision`]; the
//! authentication guard may first have to wait on a [`SessionVerifier`].
//!
//! Flow Overview: the router hands the guard the target location (whose
//! `matched` chain runs root to leaf), the location being left, and a
//! [`NavigationContext`]. Public routes always pass. Protected routes need a
//! session (auth guard) and either a pre-authorized flag or an access
//! descriptor granted by the rights table (rights guard).

mod auth;
mod context;
mod rights;

pub use auth::{auth_check, AuthCheck, Verification};
pub use context::{
    Access, NavigationContext, NoVerifier, Rights, SessionVerifier, VerifyError,
};
pub use rights::rights_check;

use crate::meta::{deep_merge, Meta, MetaValue};
use crate::route::{RouteId, RouteLocation, RouteTree};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const META_PUBLIC: &str = "public";
pub const META_AUTHORIZED: &str = "authorized";
pub const META_ACCESS: &str = "access";

/// Three-valued flag: callers may not know yet whether a session exists or
/// was verified, and the guards treat that differently from `False`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    True,
    False,
    #[default]
    Unknown,
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::True,
            Some(false) => Self::False,
            None => Self::Unknown,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid tri-state value: {0}")]
pub struct ParseTriStateError(String);

impl FromStr for TriState {
    type Err = ParseTriStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Self::True),
            "false" | "no" | "0" => Ok(Self::False),
            "unknown" | "" => Ok(Self::Unknown),
            _ => Err(ParseTriStateError(s.to_string())),
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Opaque navigation target used when a guard denies, e.g. a login route name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Redirect(String);

impl Redirect {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Redirect {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Redirect {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a guard. A guard yields exactly one of these per navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect(Redirect),
}

/// Nearest truthy value of `key` in the `meta` of `id` or its ancestors, or
/// `None`.
///
/// Falsy values (`false`, `null`, `0`, `""`) don't stop the walk, so a truthy
/// ancestor value wins over a closer falsy one.
#[must_use]
pub fn find_inherited_meta<'t>(tree: &'t RouteTree, id: RouteId, key: &str) -> Option<&'t MetaValue> {
    tree.ancestors(id)
        .filter_map(|id| tree.get(id))
        .find_map(|node| node.meta.get(key).filter(|value| value.is_truthy()))
}

/// [`find_inherited_meta`] with a fallback for chains where no node sets a
/// truthy `key`. Only each node's `meta` object is read.
#[must_use]
pub fn resolve_inherited_meta(tree: &RouteTree, id: RouteId, key: &str, fallback: MetaValue) -> MetaValue {
    find_inherited_meta(tree, id, key)
        .cloned()
        .unwrap_or(fallback)
}

/// Folds the meta of every route in `matched` (root to leaf) into one object;
/// later routes override earlier ones.
#[must_use]
pub fn merge_parent_route_meta(tree: &RouteTree, matched: &[RouteId]) -> Meta {
    matched
        .iter()
        .filter_map(|id| tree.get(*id))
        .fold(Meta::new(), |mut merged, node| {
            deep_merge(&mut merged, &node.meta);
            merged
        })
}

/// Resolves `key` from the leaf of `to.matched`. An empty chain yields the
/// fallback.
fn leaf_meta(tree: &RouteTree, to: &RouteLocation, key: &str, fallback: MetaValue) -> MetaValue {
    match to.leaf() {
        Some(leaf) => resolve_inherited_meta(tree, leaf, key, fallback),
        None => fallback,
    }
}

/// Runs the authentication guard and, when it lets the navigation through,
/// the rights guard.
pub async fn check_navigation<V: SessionVerifier>(
    tree: &RouteTree,
    to: &mut RouteLocation,
    from: Option<&RouteLocation>,
    ctx: &NavigationContext<V>,
) -> Decision {
    match auth_check(tree, to, from, ctx).resolve().await {
        Decision::Proceed => rights_check(tree, to, from, ctx),
        redirect @ Decision::Redirect(_) => redirect,
    }
}
