//! End-to-end navigation checks through the public API: a route table loaded
//! from JSON, both guards, and a verifier standing in for the session API.

use anyhow::Result;
use navguard::{
    auth_check, check_navigation, guards::VerifyError, resolve_inherited_meta,
    route::RouteTable, rights_check, Decision, MetaValue, NavigationContext, Redirect, Rights,
    RouteTree, TriState,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

const ROUTES: &str = r#"{
    "routes": [
        {
            "name": "admin",
            "path": "/admin",
            "meta": {"public": false, "breadcrumb": "Admin", "layout": {"sidebar": true}},
            "children": [
                {
                    "name": "admin.users",
                    "path": "users",
                    "meta": {"access": {"component": "iam", "module": "users", "action": "list"}},
                    "children": [
                        {
                            "name": "admin.users.detail",
                            "path": ":id",
                            "meta": {"breadcrumb": "User", "layout": {"width": 640}}
                        }
                    ]
                },
                {"name": "admin.status", "path": "status", "meta": {"authorized": true}}
            ]
        },
        {
            "name": "docs",
            "path": "/docs",
            "meta": {"public": true},
            "children": [{"name": "docs.page", "path": ":slug", "meta": {"public": false}}]
        },
        {"name": "login", "path": "/login", "meta": {"public": true}}
    ]
}"#;

fn tree() -> Result<RouteTree> {
    Ok(RouteTable::from_json(ROUTES)?.into_tree()?)
}

fn rights() -> Result<Rights> {
    Ok(serde_json::from_str(
        r#"{"iam": {"users": {"list": true, "delete": false}}}"#,
    )?)
}

fn to_login() -> Decision {
    Decision::Redirect(Redirect::from("login"))
}

#[test]
fn public_ancestor_beats_private_child() -> Result<()> {
    let tree = tree()?;
    let page = tree.find("docs.page").ok_or_else(|| anyhow::anyhow!("docs.page"))?;

    assert_eq!(
        resolve_inherited_meta(&tree, page, "public", MetaValue::Bool(false)),
        MetaValue::Bool(true)
    );

    let to = tree.location_by_name("docs.page")?;
    let ctx = NavigationContext::new("login").with_session(TriState::False);
    assert_eq!(
        auth_check(&tree, &to, None, &ctx).decided(),
        Some(&Decision::Proceed)
    );
    Ok(())
}

#[tokio::test]
async fn signed_in_user_with_rights_reaches_detail_page() -> Result<()> {
    let tree = tree()?;
    let calls = Arc::new(AtomicUsize::new(0));
    let verifier = {
        let calls = Arc::clone(&calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), VerifyError>(()) }
        }
    };
    let ctx = NavigationContext::new("login")
        .with_session(TriState::True)
        .with_authorized(TriState::False)
        .with_rights(rights()?)
        .with_verifier(verifier);

    let from = tree.location_by_name("login")?;
    let mut to = tree.location_by_name("admin.users.detail")?;
    assert_eq!(to.path, "/admin/users/:id");

    let decision = check_navigation(&tree, &mut to, Some(&from), &ctx).await;
    assert_eq!(decision, Decision::Proceed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(to.meta.get("breadcrumb"), Some(&MetaValue::from("User")));
    assert_eq!(to.meta.get("public"), Some(&MetaValue::Bool(false)));
    let layout = to
        .meta
        .get("layout")
        .and_then(MetaValue::as_object)
        .ok_or_else(|| anyhow::anyhow!("layout"))?;
    assert_eq!(layout.get("sidebar"), Some(&MetaValue::Bool(true)));
    assert_eq!(layout.get("width"), Some(&MetaValue::from(640_i64)));
    Ok(())
}

#[tokio::test]
async fn rejected_session_never_reaches_rights_check() -> Result<()> {
    let tree = tree()?;
    let ctx = NavigationContext::new("login")
        .with_session(TriState::True)
        .with_rights(rights()?)
        .with_verifier(|| async { Err::<(), _>(VerifyError::Rejected(401)) });

    let mut to = tree.location_by_name("admin.users")?;
    let before = to.meta.clone();

    assert_eq!(check_navigation(&tree, &mut to, None, &ctx).await, to_login());
    assert_eq!(to.meta, before);
    Ok(())
}

#[test]
fn rights_guard_alone() -> Result<()> {
    let tree = tree()?;

    let ctx = NavigationContext::new("login").with_rights(rights()?);
    let mut to = tree.location_by_name("admin.users")?;
    assert_eq!(rights_check(&tree, &mut to, None, &ctx), Decision::Proceed);

    // no access descriptor and no authorized session
    let mut to = tree.location_by_name("admin.status")?;
    assert_eq!(rights_check(&tree, &mut to, None, &ctx), to_login());

    let ctx = ctx.with_authorized(TriState::True);
    assert_eq!(rights_check(&tree, &mut to, None, &ctx), Decision::Proceed);
    Ok(())
}

#[test]
fn denied_action_keeps_meta() -> Result<()> {
    let tree = tree()?;
    let ctx = NavigationContext::new("login")
        .with_rights(serde_json::from_str(r#"{"iam": {"users": {"list": false}}}"#)?);

    let mut to = tree.location_by_name("admin.users.detail")?;
    let before = to.meta.clone();
    assert_eq!(rights_check(&tree, &mut to, None, &ctx), to_login());
    assert_eq!(to.meta, before);
    Ok(())
}

#[tokio::test]
async fn demo_tables_load() -> Result<()> {
    let tree = RouteTable::from_json(include_str!("../demos/routes.json"))?.into_tree()?;
    let rights: Rights = serde_json::from_str(include_str!("../demos/rights.json"))?;
    let ctx = NavigationContext::new("login")
        .with_session(TriState::True)
        .with_authorized(TriState::True)
        .with_rights(rights);

    let mut to = tree.location_by_name("orgs.detail")?;
    assert_eq!(check_navigation(&tree, &mut to, None, &ctx).await, Decision::Proceed);
    assert_eq!(to.meta.get("title"), Some(&MetaValue::from("Organization")));

    let mut to = tree.location_by_name("dashboard")?;
    assert_eq!(check_navigation(&tree, &mut to, None, &ctx).await, Decision::Proceed);
    Ok(())
}
