use crate::session::DEFAULT_TIMEOUT;
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

/// Settings for reaching the session endpoint, shared by every action.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub verify_url: Option<Url>,
    pub session_cookie: Option<SecretString>,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(verify_url: Option<Url>) -> Self {
        Self {
            verify_url,
            session_cookie: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn set_session_cookie(&mut self, cookie: SecretString) {
        self.session_cookie = Some(cookie);
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}
