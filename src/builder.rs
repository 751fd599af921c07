//!
//! ```rust,ignore
//! // 1. Explicit configuration
//! let jira = JiraClient::builder()
//!     .host("https://your-jira.atlassian.net")
//!     .basic_auth("username@example.com", "your_api_token")
//!     .timeout(30)
//!     .build()
//!     .expect("Failed to create Jira client");
//!
//! // 2. From environment variables
//! let jira = JiraClientBuilder::create_from_env()
//!     .expect("Failed to create Jira client");
//! ```
use crate::{Credentials, JiraClient};
use log::debug;
use reqwest::Client;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Error type for [`JiraClientBuilder`] operations.
#[derive(Error, Debug)]
pub enum JiraBuilderError {
    #[error("Environment variable {0} not set")]
    EnvVarNotSet(String),

    #[error("URL parsing error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Jira client initialization error: {0}")]
    ClientInitError(String),
}

/// Names of the environment variables used for Jira configuration.
pub struct JiraEnvVars;

impl JiraEnvVars {
    pub const HOST: &'static str = "JIRA_HOST";
    pub const USER: &'static str = "JIRA_USER";
    pub const TOKEN: &'static str = "JIRA_TOKEN";
    pub const API_VERSION: &'static str = "JIRA_API_VERSION";
}

pub const DEFAULT_API_VERSION: &str = "2";

/// Builder for creating [`JiraClient`] instances with flexible
/// configuration options.
pub struct JiraClientBuilder {
    host: Option<String>,
    api_version: Option<String>,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    verify_tls: bool,
}

impl Default for JiraClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JiraClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: None,
            api_version: None,
            credentials: None,
            timeout: None,
            verify_tls: true,
        }
    }

    /// Sets the Jira host URL.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the REST API version (default is "2").
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets basic authentication credentials.
    #[must_use]
    pub fn basic_auth(mut self, username: impl Into<String>, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Basic(username.into(), token.into()));
        self
    }

    /// Sets OAuth/bearer token authentication.
    #[must_use]
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Bearer(token.into()));
        self
    }

    /// Sets a request timeout in seconds.
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(Duration::from_secs(seconds));
        self
    }

    /// Controls TLS certificate verification. Defaults to on; turn off only
    /// for instances behind self-signed certificates.
    #[must_use]
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Loads any configuration present in the environment variables named
    /// by [`JiraEnvVars`].
    #[must_use]
    pub fn from_env(self) -> Self {
        let host = env::var(JiraEnvVars::HOST).ok();
        let user = env::var(JiraEnvVars::USER).ok();
        let token = env::var(JiraEnvVars::TOKEN).ok();
        let api_version = env::var(JiraEnvVars::API_VERSION).ok();

        let mut builder = self;

        if let Some(host) = host {
            builder = builder.host(host);
        }

        if let Some(api_version) = api_version {
            builder = builder.api_version(api_version);
        }

        if let (Some(user), Some(token)) = (user, token) {
            builder = builder.basic_auth(user, token);
        }

        builder
    }

    /// Builds a [`JiraClient`] with the configured parameters.
    ///
    /// # Errors
    /// Fails when the host or credentials are missing, the host does not
    /// parse as a URL, or the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<JiraClient, JiraBuilderError> {
        let host = self
            .host
            .ok_or_else(|| JiraBuilderError::EnvVarNotSet(JiraEnvVars::HOST.to_string()))?;

        let credentials = self.credentials.ok_or_else(|| {
            JiraBuilderError::EnvVarNotSet(format!(
                "{} and {}",
                JiraEnvVars::USER,
                JiraEnvVars::TOKEN
            ))
        })?;

        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let host_url = Url::parse(&host)?;

        let mut client_builder = Client::builder();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if !self.verify_tls {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| JiraBuilderError::ClientInitError(e.to_string()))?;

        let jira = JiraClient {
            host: host_url,
            api: format!("rest/api/{api_version}"),
            credentials,
            client,
        };
        debug!("Created Jira client for {}", jira.host);

        Ok(jira)
    }

    /// Convenience method to create a client from environment variables.
    ///
    /// # Errors
    /// See [`JiraClientBuilder::build`].
    pub fn create_from_env() -> Result<JiraClient, JiraBuilderError> {
        Self::new().from_env().build()
    }
}

impl JiraClient {
    /// Create a client builder.
    #[must_use]
    pub fn builder() -> JiraClientBuilder {
        JiraClientBuilder::new()
    }
}
