use crate::cli::{
    actions::{Action, GuardSelection},
    globals::GlobalArgs,
};
use crate::guards::{
    auth_check, check_navigation, rights_check, Decision, NavigationContext, Rights, SessionVerifier,
};
use crate::route::{RouteLocation, RouteTable, RouteTree};
use crate::session::HttpSessionVerifier;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Handle the check action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let report = evaluate(action, globals).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Runs the selected guards for one navigation and describes the outcome.
#[instrument(skip_all)]
pub async fn evaluate(action: Action, globals: &GlobalArgs) -> Result<Value> {
    let Action::Check {
        routes,
        to,
        from,
        guard,
        session,
        authorized,
        rights,
        redirect,
    } = action;

    let tree = RouteTable::from_path(&routes)
        .and_then(RouteTable::into_tree)
        .with_context(|| format!("Error loading routes from {}", routes.display()))?;

    let mut target = tree.location_by_name(&to)?;
    let from = from.map(|name| tree.location_by_name(&name)).transpose()?;

    let rights = match rights {
        Some(path) => load_rights(&path)?,
        None => Rights::default(),
    };

    let ctx = NavigationContext::new(redirect)
        .with_session(session)
        .with_authorized(authorized)
        .with_rights(rights);

    let decision = match &globals.verify_url {
        Some(url) => {
            debug!("verifying sessions against {url}");
            let verifier =
                HttpSessionVerifier::new(url.clone(), globals.session_cookie.clone(), globals.timeout)?;
            let ctx = ctx.with_verifier(verifier);
            run(&tree, &mut target, from.as_ref(), &ctx, guard).await
        }
        None => run(&tree, &mut target, from.as_ref(), &ctx, guard).await,
    };

    info!("{} -> {:?}", target.name, decision);

    Ok(report(&target, &decision))
}

async fn run<V: SessionVerifier>(
    tree: &RouteTree,
    to: &mut RouteLocation,
    from: Option<&RouteLocation>,
    ctx: &NavigationContext<V>,
    guard: GuardSelection,
) -> Decision {
    match guard {
        GuardSelection::Auth => auth_check(tree, to, from, ctx).resolve().await,
        GuardSelection::Rights => rights_check(tree, to, from, ctx),
        GuardSelection::All => check_navigation(tree, to, from, ctx).await,
    }
}

fn load_rights(path: &Path) -> Result<Rights> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("Error reading rights from {}", path.display()))?;

    serde_json::from_str(&input).with_context(|| format!("Error parsing rights from {}", path.display()))
}

fn report(target: &RouteLocation, decision: &Decision) -> Value {
    match decision {
        Decision::Proceed => json!({
            "decision": "proceed",
            "route": target.name,
            "path": target.path,
            "meta": target.meta,
        }),
        Decision::Redirect(redirect) => json!({
            "decision": "redirect",
            "route": target.name,
            "path": target.path,
            "target": redirect,
        }),
    }
}
