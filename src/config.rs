use serde::{Deserialize, Serialize};

/// Connection settings for a Jira instance, typically loaded from a
/// configuration file by the embedding application.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct JiraClientConfiguration {
    pub jira_url: String,
    pub user: String,
    pub token: String,
    /// Set to `false` to skip TLS certificate verification, for instances
    /// behind self-signed certificates.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_verify_tls() -> bool {
    true
}

impl Default for JiraClientConfiguration {
    fn default() -> Self {
        JiraClientConfiguration {
            jira_url: "https://example.atlassian.net".into(),
            user: "user.name@example.com".into(),
            token: "<your secret jira token goes here>".into(),
            verify_tls: true,
        }
    }
}

impl JiraClientConfiguration {
    /// Does the token look like a real token rather than the placeholder?
    #[must_use]
    pub fn has_valid_jira_token(&self) -> bool {
        !(self.token == JiraClientConfiguration::default().token || self.token.contains("secret"))
    }
}
