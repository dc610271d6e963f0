use super::{Redirect, TriState};
use crate::meta::MetaValue;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("session rejected with status {0}")]
    Rejected(u16),
    #[error("session verification request failed")]
    Transport(#[from] reqwest::Error),
    #[error("no session verifier configured")]
    Unavailable,
}

/// Confirms that the current session belongs to a signed-in user, typically by
/// fetching the current user from the API.
pub trait SessionVerifier {
    fn verify(&self) -> impl Future<Output = Result<(), VerifyError>> + Send;
}

impl<F, Fut> SessionVerifier for F
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), VerifyError>> + Send,
{
    fn verify(&self) -> impl Future<Output = Result<(), VerifyError>> + Send {
        (self)()
    }
}

/// Verifier for contexts without a session backend; every verification fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVerifier;

impl SessionVerifier for NoVerifier {
    async fn verify(&self) -> Result<(), VerifyError> {
        Err(VerifyError::Unavailable)
    }
}

/// Permission required to enter a route, read from the `access` meta key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    pub component: String,
    pub module: String,
    pub action: String,
}

impl Access {
    /// Reads an access descriptor from a meta value. Anything that isn't an
    /// object with three non-empty string fields is treated as no descriptor.
    #[must_use]
    pub fn from_meta(value: &MetaValue) -> Option<Self> {
        let object = value.as_object()?;
        let field = |key: &str| {
            object
                .get(key)
                .and_then(MetaValue::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            component: field("component")?,
            module: field("module")?,
            action: field("action")?,
        })
    }
}

/// Rights table of the current principal: component -> module -> action -> flag.
///
/// The table is kept loosely typed; malformed or missing entries read as
/// "not granted".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rights(MetaValue);

impl Rights {
    #[must_use]
    pub fn new(table: MetaValue) -> Self {
        Self(table)
    }

    #[must_use]
    pub fn allows(&self, access: &Access) -> bool {
        self.0
            .pointer(&[&access.component, &access.module, &access.action])
            .is_some_and(MetaValue::is_truthy)
    }
}

/// Per-navigation inputs supplied by the host application.
#[derive(Debug, Clone)]
pub struct NavigationContext<V = NoVerifier> {
    pub has_session: TriState,
    pub is_authorized: TriState,
    pub verifier: V,
    pub rights: Rights,
    pub redirect: Redirect,
}

impl NavigationContext<NoVerifier> {
    pub fn new(redirect: impl Into<Redirect>) -> Self {
        Self {
            has_session: TriState::Unknown,
            is_authorized: TriState::Unknown,
            verifier: NoVerifier,
            rights: Rights::default(),
            redirect: redirect.into(),
        }
    }
}

impl<V> NavigationContext<V> {
    #[must_use]
    pub fn with_session(mut self, has_session: TriState) -> Self {
        self.has_session = has_session;
        self
    }

    #[must_use]
    pub fn with_authorized(mut self, is_authorized: TriState) -> Self {
        self.is_authorized = is_authorized;
        self
    }

    #[must_use]
    pub fn with_rights(mut self, rights: Rights) -> Self {
        self.rights = rights;
        self
    }

    #[must_use]
    pub fn with_verifier<W: SessionVerifier>(self, verifier: W) -> NavigationContext<W> {
        NavigationContext {
            has_session: self.has_session,
            is_authorized: self.is_authorized,
            verifier,
            rights: self.rights,
            redirect: self.redirect,
        }
    }
}
