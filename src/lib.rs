pub mod cli;
pub mod guards;
pub mod meta;
pub mod route;
pub mod session;

pub use guards::{
    auth_check, check_navigation, merge_parent_route_meta, resolve_inherited_meta, rights_check,
    AuthCheck, Decision, NavigationContext, Redirect, Rights, SessionVerifier, TriState,
};
pub use meta::{Meta, MetaValue};
pub use route::{RouteLocation, RouteTree};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
