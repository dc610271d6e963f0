pub mod check;

use crate::guards::TriState;
use std::path::PathBuf;

/// Which guards `check` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardSelection {
    Auth,
    Rights,
    All,
}

#[derive(Debug)]
pub enum Action {
    Check {
        routes: PathBuf,
        to: String,
        from: Option<String>,
        guard: GuardSelection,
        session: TriState,
        authorized: TriState,
        rights: Option<PathBuf>,
        redirect: String,
    },
}
