//! BnW API client
//!
//! Every command is an HTTP POST of form-encoded parameters to
//! `<base_url><command>`. Only the two commands the announcer needs are
//! exposed: `userlist` and `post`.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Deserializer};
use tracing::debug;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::UserRecord;
use crate::ports::ForumApi;

/// Default production API URL
pub const BNW_PRODUCTION_URL: &str = "https://bnw.im/api/";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response body of the `userlist` command
#[derive(Debug, Deserialize)]
struct UserListResponse {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default)]
    desc: Option<String>,
    /// Outer `None`: field missing. `Some(None)`: explicit `null`, the end of the list.
    #[serde(default, deserialize_with = "deserialize_present")]
    users: Option<Option<Vec<UserRecord>>>,
}

fn default_ok() -> bool {
    true
}

fn deserialize_present<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<Vec<UserRecord>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}

/// BnW API client
#[derive(Debug)]
pub struct BnwClient {
    client: Client,
    base_url: Url,
}

impl BnwClient {
    /// Create a client for the production API
    pub fn new() -> Result<Self> {
        Self::new_with_base_url(BNW_PRODUCTION_URL)
    }

    /// Create a client for a custom API location.
    ///
    /// A trailing slash is appended when missing so that command names
    /// resolve below the base path.
    pub fn new_with_base_url(base_url: &str) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }

        let parsed = Url::parse(&normalized)
            .map_err(|e| Error::config(format!("Invalid API URL '{}': {}", base_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "API URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// POST a command with form parameters and return the checked response
    fn call(&self, command: &str, params: &[(&str, &str)]) -> Result<Response> {
        let url = self
            .base_url
            .join(command)
            .map_err(|e| Error::config(format!("Invalid command '{}': {}", command, e)))?;

        debug!(%url, "calling forum API");

        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        self.check_response_status(&response)?;
        Ok(response)
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::api(format!(
                "Connection timed out after {} seconds",
                REQUEST_TIMEOUT_SECS
            ))
        } else if error.is_connect() {
            Error::api(format!("Unable to connect to {}", self.base_url))
        } else {
            Error::api(format!("Request failed: {}", error))
        }
    }

    /// Check response status and return appropriate errors
    fn check_response_status(&self, response: &Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status.as_u16() {
            401 | 403 => Err(Error::api(
                "Authentication failed. The posting token may be invalid or revoked.",
            )),
            404 => Err(Error::api(format!(
                "Endpoint not found: {}",
                response.url()
            ))),
            429 => Err(Error::api("Rate limit exceeded. Increase the delay between posts.")),
            code => Err(Error::api(format!("HTTP {}", code))),
        }
    }
}

impl ForumApi for BnwClient {
    fn fetch_user_page(&self, page: u32) -> Result<Vec<UserRecord>> {
        let page = page.to_string();
        let response = self.call("userlist", &[("page", page.as_str())])?;

        let body: UserListResponse = response
            .json()
            .map_err(|e| Error::api(format!("Failed to parse userlist response: {}", e)))?;

        if !body.ok {
            return Err(Error::api(format!(
                "userlist rejected: {}",
                body.desc.unwrap_or_else(|| "no description".to_string())
            )));
        }

        body.users
            .map(Option::unwrap_or_default)
            .ok_or_else(|| Error::api("userlist response has no 'users' field"))
    }

    fn publish_message(&self, text: &str, login: &str) -> Result<String> {
        let response = self.call("post", &[("text", text), ("login", login)])?;

        response
            .text()
            .map_err(|e| Error::api(format!("Failed to read post response: {}", e)))
    }
}
