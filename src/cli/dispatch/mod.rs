use crate::cli::{
    actions::{Action, GuardSelection},
    globals::GlobalArgs,
};
use crate::guards::TriState;
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};
use url::Url;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let mut globals = GlobalArgs::new(matches.get_one::<Url>("verify-url").cloned());

    if let Some(cookie) = matches.get_one::<String>("session-cookie") {
        globals.set_session_cookie(SecretString::from(cookie.clone()));
    }

    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        globals.set_timeout(Duration::from_secs(*timeout));
    }

    let guard = match matches.get_one::<String>("guard").map(String::as_str) {
        Some("auth") => GuardSelection::Auth,
        Some("rights") => GuardSelection::Rights,
        Some("all") | None => GuardSelection::All,
        Some(other) => return Err(anyhow!("unsupported guard: {other}")),
    };

    let action = Action::Check {
        routes: matches
            .get_one::<PathBuf>("routes")
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: --routes"))?,
        to: matches
            .get_one::<String>("to")
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: --to"))?,
        from: matches.get_one::<String>("from").cloned(),
        guard,
        session: matches
            .get_one::<TriState>("session")
            .copied()
            .unwrap_or_default(),
        authorized: matches
            .get_one::<TriState>("authorized")
            .copied()
            .unwrap_or_default(),
        rights: matches.get_one::<PathBuf>("rights").cloned(),
        redirect: matches
            .get_one::<String>("redirect")
            .cloned()
            .unwrap_or_else(|| "login".to_string()),
    };

    Ok((action, globals))
}
