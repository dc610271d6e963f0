//! HTTP session verification. The verifier asks the API for the current user
//! with the browser's session cookie; any 2xx answer means the session is
//! valid. Cookie values are secrets and are never logged.

use crate::guards::{SessionVerifier, VerifyError};
use crate::APP_USER_AGENT;
use reqwest::{header::COOKIE, Client};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpSessionVerifier {
    client: Client,
    url: Url,
    cookie: Option<SecretString>,
}

impl HttpSessionVerifier {
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be built.
    pub fn new(url: Url, cookie: Option<SecretString>, timeout: Duration) -> Result<Self, VerifyError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, url, cookie })
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_user(&self) -> Result<(), VerifyError> {
        let mut request = self.client.get(self.url.clone());
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("session endpoint answered {status}");

        if status.is_success() {
            Ok(())
        } else {
            Err(VerifyError::Rejected(status.as_u16()))
        }
    }
}

impl SessionVerifier for HttpSessionVerifier {
    fn verify(&self) -> impl std::future::Future<Output = Result<(), VerifyError>> + Send {
        self.fetch_user()
    }
}
