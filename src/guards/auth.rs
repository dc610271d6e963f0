use super::{leaf_meta, Decision, NavigationContext, Redirect, SessionVerifier, TriState, VerifyError, META_PUBLIC};
use crate::meta::MetaValue;
use crate::route::{RouteLocation, RouteTree};
use std::{fmt, future::Future, pin::Pin};
use tracing::{debug, instrument, warn};

type PendingVerification<'a> = Pin<Box<dyn Future<Output = Result<(), VerifyError>> + Send + 'a>>;

/// Result of the authentication guard: either decided on the spot, or waiting
/// on a session verification.
pub enum AuthCheck<'a> {
    Decided(Decision),
    Verifying(Verification<'a>),
}

impl AuthCheck<'_> {
    /// Waits for a pending verification, if any.
    pub async fn resolve(self) -> Decision {
        match self {
            Self::Decided(decision) => decision,
            Self::Verifying(verification) => verification.settle().await,
        }
    }

    /// The decision when no verification was needed.
    #[must_use]
    pub fn decided(&self) -> Option<&Decision> {
        match self {
            Self::Decided(decision) => Some(decision),
            Self::Verifying(_) => None,
        }
    }
}

impl fmt::Debug for AuthCheck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decided(decision) => f.debug_tuple("Decided").field(decision).finish(),
            Self::Verifying(verification) => f.debug_tuple("Verifying").field(verification).finish(),
        }
    }
}

/// An in-flight session verification. Settling it yields `Proceed` when the
/// verifier succeeds and the context's redirect when it fails.
pub struct Verification<'a> {
    pending: PendingVerification<'a>,
    redirect: Redirect,
}

impl<'a> Verification<'a> {
    fn new(pending: PendingVerification<'a>, redirect: Redirect) -> Self {
        Self { pending, redirect }
    }

    pub async fn settle(self) -> Decision {
        match self.pending.await {
            Ok(()) => {
                debug!("session verified");
                Decision::Proceed
            }
            Err(e) => {
                debug!("session verification failed: {e}");
                Decision::Redirect(self.redirect)
            }
        }
    }
}

impl fmt::Debug for Verification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verification")
            .field("redirect", &self.redirect)
            .finish_non_exhaustive()
    }
}

/// Authentication guard.
///
/// Public routes pass. Protected routes redirect without a session, pass when
/// the session is already authorized, and otherwise ask the context's
/// verifier, which is called at most once.
#[instrument(skip_all, fields(to = %to.name, from = ?from.map(|f| f.name.as_str())))]
pub fn auth_check<'a, V: SessionVerifier>(
    tree: &RouteTree,
    to: &RouteLocation,
    from: Option<&RouteLocation>,
    ctx: &'a NavigationContext<V>,
) -> AuthCheck<'a> {
    let deny = || AuthCheck::Decided(Decision::Redirect(ctx.redirect.clone()));

    match leaf_meta(tree, to, META_PUBLIC, MetaValue::Bool(false)) {
        MetaValue::Bool(true) => {
            debug!("public route");
            AuthCheck::Decided(Decision::Proceed)
        }
        MetaValue::Bool(false) => match ctx.has_session {
            TriState::False => {
                debug!("no session, redirecting to {}", ctx.redirect);
                deny()
            }
            TriState::True if ctx.is_authorized == TriState::True => {
                debug!("session already authorized");
                AuthCheck::Decided(Decision::Proceed)
            }
            TriState::True => {
                debug!("verifying session");
                AuthCheck::Verifying(Verification::new(
                    Box::pin(ctx.verifier.verify()),
                    ctx.redirect.clone(),
                ))
            }
            TriState::Unknown => {
                warn!("session state unknown on a protected route, redirecting to {}", ctx.redirect);
                deny()
            }
        },
        other => {
            warn!(?other, "public meta is not a boolean, redirecting to {}", ctx.redirect);
            deny()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::tests::fixture;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn counting_verifier(
        calls: &Arc<AtomicUsize>,
        outcome: fn() -> Result<(), VerifyError>,
    ) -> impl Fn() -> std::future::Ready<Result<(), VerifyError>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(outcome())
        }
    }

    fn login() -> Decision {
        Decision::Redirect(Redirect::from("login"))
    }

    #[test]
    fn test_public_route_proceeds_regardless_of_context() {
        let tree = fixture();
        let to = tree.location_by_name("login").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let states = [TriState::True, TriState::False, TriState::Unknown];
        for (session, authorized) in states.iter().flat_map(|s| states.iter().map(move |a| (*s, *a))) {
            let ctx = NavigationContext::new("login")
                .with_session(session)
                .with_authorized(authorized)
                .with_verifier(counting_verifier(&calls, || Err(VerifyError::Rejected(401))));
            let check = auth_check(&tree, &to, None, &ctx);
            assert_eq!(
                check.decided(),
                Some(&Decision::Proceed),
                "session {session}, authorized {authorized}"
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_session_redirects_synchronously() {
        let tree = fixture();
        let to = tree.location_by_name("settings.profile").unwrap();
        let from = tree.location_by_name("login").unwrap();
        let ctx = NavigationContext::new("login").with_session(TriState::False);

        let check = auth_check(&tree, &to, Some(&from), &ctx);
        assert_eq!(check.decided(), Some(&login()));
    }

    #[test]
    fn test_authorized_session_skips_verification() {
        let tree = fixture();
        let to = tree.location_by_name("settings").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let ctx = NavigationContext::new("login")
            .with_session(TriState::True)
            .with_authorized(TriState::True)
            .with_verifier(counting_verifier(&calls, || Ok(())));

        let check = auth_check(&tree, &to, None, &ctx);
        assert_eq!(check.decided(), Some(&Decision::Proceed));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unverified_session_proceeds_when_verifier_succeeds() {
        let tree = fixture();
        let to = tree.location_by_name("settings").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        for authorized in [TriState::False, TriState::Unknown] {
            let ctx = NavigationContext::new("login")
                .with_session(TriState::True)
                .with_authorized(authorized)
                .with_verifier(counting_verifier(&calls, || Ok(())));

            let check = auth_check(&tree, &to, None, &ctx);
            assert!(check.decided().is_none());
            assert_eq!(check.resolve().await, Decision::Proceed);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unverified_session_redirects_when_verifier_fails() {
        let tree = fixture();
        let to = tree.location_by_name("settings").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let ctx = NavigationContext::new("login")
            .with_session(TriState::True)
            .with_authorized(TriState::False)
            .with_verifier(counting_verifier(&calls, || Err(VerifyError::Rejected(401))));

        let check = auth_check(&tree, &to, None, &ctx);
        assert!(matches!(check, AuthCheck::Verifying(_)));
        assert_eq!(check.resolve().await, login());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_verifier() {
        let tree = fixture();
        let to = tree.location_by_name("settings").unwrap();
        let ctx = NavigationContext::new("login")
            .with_session(TriState::True)
            .with_verifier(|| async {
                tokio::task::yield_now().await;
                Ok::<(), VerifyError>(())
            });

        assert_eq!(auth_check(&tree, &to, None, &ctx).resolve().await, Decision::Proceed);
    }

    #[test]
    fn test_unknown_session_redirects() {
        let tree = fixture();
        let to = tree.location_by_name("settings").unwrap();
        let ctx = NavigationContext::new("login");

        assert_eq!(auth_check(&tree, &to, None, &ctx).decided(), Some(&login()));
    }

    #[test]
    fn test_non_boolean_public_redirects() {
        let tree = fixture();
        let to = tree.location_by_name("odd").unwrap();
        let ctx = NavigationContext::new("login").with_session(TriState::True);

        assert_eq!(auth_check(&tree, &to, None, &ctx).decided(), Some(&login()));
    }

    #[test]
    fn test_empty_matched_chain_is_protected() {
        let tree = fixture();
        let mut to = tree.location_by_name("login").unwrap();
        to.matched.clear();
        let ctx = NavigationContext::new("login").with_session(TriState::False);

        assert_eq!(auth_check(&tree, &to, None, &ctx).decided(), Some(&login()));
    }
}
