use super::{
    find_inherited_meta, leaf_meta, merge_parent_route_meta, Access, Decision, NavigationContext, TriState,
    META_ACCESS, META_AUTHORIZED, META_PUBLIC,
};
use crate::meta::{deep_merge, MetaValue};
use crate::route::{RouteLocation, RouteTree};
use tracing::{debug, instrument, warn};

/// Rights guard.
///
/// Public routes and routes flagged `authorized` (for an authorized session)
/// pass. Any other route needs an `access` descriptor granted by the context's
/// rights table; on success the target's meta is enriched with the meta of
/// every matched route, its own values taking precedence.
#[instrument(skip_all, fields(to = %to.name, from = ?from.map(|f| f.name.as_str())))]
pub fn rights_check<V>(
    tree: &RouteTree,
    to: &mut RouteLocation,
    from: Option<&RouteLocation>,
    ctx: &NavigationContext<V>,
) -> Decision {
    let deny = || Decision::Redirect(ctx.redirect.clone());

    let guest = leaf_meta(tree, to, META_PUBLIC, MetaValue::Bool(false));
    let authorized = to
        .leaf()
        .and_then(|leaf| find_inherited_meta(tree, leaf, META_AUTHORIZED))
        .is_some()
        && ctx.is_authorized == TriState::True;
    let access = to
        .leaf()
        .and_then(|leaf| find_inherited_meta(tree, leaf, META_ACCESS))
        .and_then(Access::from_meta);

    if guest == MetaValue::Bool(true) || authorized {
        debug!(authorized, "rights check bypassed");
        return Decision::Proceed;
    }

    if guest != MetaValue::Bool(false) {
        warn!(?guest, "public meta is not a boolean, redirecting to {}", ctx.redirect);
        return deny();
    }

    match access {
        Some(access) if ctx.rights.allows(&access) => {
            let mut merged = merge_parent_route_meta(tree, &to.matched);
            deep_merge(&mut merged, &to.meta);
            to.meta = merged;

            debug!(?access, "access granted");
            Decision::Proceed
        }
        Some(access) => {
            debug!(?access, "access denied, redirecting to {}", ctx.redirect);
            deny()
        }
        None => {
            debug!("no access descriptor, redirecting to {}", ctx.redirect);
            deny()
        }
    }
}
