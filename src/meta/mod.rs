//! Route meta values. Route tables and rights tables are loosely shaped JSON,
//! so meta is kept as a small tagged union instead of typed structs. Lookups
//! follow loose truthiness: `null`, `false`, `0`, `NaN` and `""` count as
//! "not set", which is what the guards rely on when walking ancestors.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;

/// Meta object attached to a route node.
pub type Meta = BTreeMap<String, MetaValue>;

/// A dynamically shaped meta value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<MetaValue>),
    Object(Meta),
}

impl MetaValue {
    /// Loose truthiness: empty arrays and objects are truthy, zero and empty
    /// strings are not.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) => true,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Meta> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Safe nested lookup through object keys. A missing key or a hop through
    /// a non-object value returns `None` instead of failing.
    #[must_use]
    pub fn pointer<S: AsRef<str>>(&self, path: &[S]) -> Option<&MetaValue> {
        path.iter()
            .try_fold(self, |value, key| value.as_object()?.get(key.as_ref()))
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Meta> for MetaValue {
    fn from(value: Meta) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<MetaValue>> for MetaValue {
    fn from(value: Vec<MetaValue>) -> Self {
        Self::Array(value)
    }
}

/// Deep-merge `source` into `target`.
///
/// Objects present on both sides merge key by key, recursively. Anything else
/// (scalars, arrays, or a type mismatch) is replaced wholesale by the source.
pub fn deep_merge(target: &mut Meta, source: &Meta) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(MetaValue::Object(existing)), MetaValue::Object(nested)) => {
                deep_merge(existing, nested);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Build a [`Meta`] from `(key, value)` pairs.
#[must_use]
pub fn meta_from<K, V, I>(entries: I) -> Meta
where
    K: Into<String>,
    V: Into<MetaValue>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
