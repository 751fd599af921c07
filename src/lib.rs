//!
//! `jira_client` is a typed client for the Jira REST interface.
//!
//! Jira's responses are only loosely schematized, so instead of a struct per
//! response shape the client parses each body into a generic
//! `serde_json::Value` tree, walks it with the [`navigator`] and builds the
//! domain records in [`models`] with an explicit required/optional policy
//! per field. Search queries are assembled with [`query::SearchFilter`].

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info, warn};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    multipart, Client, Method, RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use url::Url;

use config::JiraClientConfiguration;
use models::{
    project::{project_map_from_document, task_type_map_from_document, JiraProject},
    task::NewTaskOptions,
};
use navigator::PathError;

pub mod builder;
pub mod config;
pub mod models;
pub mod navigator;
pub mod query;

pub use builder::JiraClientBuilder;
pub use models::issue::{Attachment, Comment, Issue};
pub use query::SearchFilter;

type Result<T> = std::result::Result<T, JiraError>;

/// Error payload Jira attaches to 4xx responses.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Errors {
    #[serde(rename = "errorMessages", default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum JiraError {
    #[error("Not authorized to perform this request")]
    Unauthorized,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Not found: '{0}'")]
    NotFound(String),
    #[error("Jira client error ({code}):\n{errors:#?}")]
    Fault { code: StatusCode, errors: Errors },
    #[error("Failed to delete: {0}")]
    DeleteFailed(StatusCode),
    /// A required issue field was absent or had the wrong type. Optional
    /// fields never produce this; they fall back to their defaults.
    #[error("Required issue field '{field}' is missing or malformed")]
    MalformedIssue { field: &'static str },
    #[error(transparent)]
    Resolution(#[from] PathError),
    #[error("'{0}' does not contain a numeric id")]
    BadId(String),
    #[error("No attachment named '{0}' on this issue")]
    AttachmentNotFound(String),
    #[error("No task type found for friendly name '{0}'")]
    TaskTypeNotFound(String),
    #[error("Internal error in reqwest library: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Could not serialize/deserialize: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Could not parse Jira URL: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Could not read attachment file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Builder(#[from] builder::JiraBuilderError),
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Anonymous,
    Basic(String, String),
    Bearer(String),
}

impl Credentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Anonymous => request,
            Credentials::Basic(ref user, ref pass) => {
                request.basic_auth(user.to_owned(), Some(pass.to_owned()))
            }
            Credentials::Bearer(ref token) => request.bearer_auth(token.to_owned()),
        }
    }
}

#[derive(Clone)]
pub struct JiraClient {
    host: Url,
    api: String,
    credentials: Credentials,
    pub client: Client,
}

impl JiraClient {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<H>(host: H, credentials: Credentials) -> Result<JiraClient>
    where
        H: Into<String>,
    {
        let host = Url::parse(&host.into())?;

        Ok(JiraClient {
            host,
            api: "rest/api/2".to_string(),
            client: Client::new(),
            credentials,
        })
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn from(cfg: &JiraClientConfiguration) -> Result<JiraClient> {
        let client = JiraClientBuilder::new()
            .host(cfg.jira_url.clone())
            .basic_auth(cfg.user.clone(), cfg.token.clone())
            .verify_tls(cfg.verify_tls)
            .build()?;
        Ok(client)
    }

    async fn request<D>(&self, method: Method, endpoint: &str, body: Option<Vec<u8>>) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let url = self.host.join(&format!("{}{endpoint}", self.api))?;

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if method == Method::POST {
            // Jira rejects mutating requests without this XSRF header.
            request = request.header("X-Atlassian-Token", "nocheck");
        }
        request = self.credentials.apply(request);

        if let Some(body) = body {
            request = request.body(body);
        }
        debug!("request '{:?}'", request);

        let response = request.send().await?;

        let status = response.status();
        let body = &response.text().await?;
        debug!("status {:?} body '{:?}'", status, body);
        match status {
            StatusCode::UNAUTHORIZED => Err(JiraError::Unauthorized),
            StatusCode::METHOD_NOT_ALLOWED => Err(JiraError::MethodNotAllowed),
            StatusCode::NOT_FOUND => Err(JiraError::NotFound(url.to_string())),
            client_err if client_err.is_client_error() => Err(JiraError::Fault {
                code: status,
                errors: serde_json::from_str::<Errors>(body).unwrap_or_default(),
            }),
            server_err if server_err.is_server_error() => Err(JiraError::Fault {
                code: status,
                errors: serde_json::from_str::<Errors>(body).unwrap_or_default(),
            }),
            _ => {
                let data = if body.is_empty() { "null" } else { body };
                Ok(serde_json::from_str::<D>(data)?)
            }
        }
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn get<D>(&self, endpoint: &str) -> Result<D>
    where
        D: DeserializeOwned,
    {
        self.request::<D>(Method::GET, endpoint, None).await
    }

    async fn delete<D>(&self, endpoint: &str) -> Result<D>
    where
        D: DeserializeOwned,
    {
        self.request::<D>(Method::DELETE, endpoint, None).await
    }

    async fn post<D, S>(&self, endpoint: &str, body: S) -> Result<D>
    where
        D: DeserializeOwned,
        S: Serialize,
    {
        let data = serde_json::to_string::<S>(&body)?;
        self.request::<D>(Method::POST, endpoint, Some(data.into_bytes()))
            .await
    }

    async fn put<D, S>(&self, endpoint: &str, body: S) -> Result<D>
    where
        D: DeserializeOwned,
        S: Serialize,
    {
        let data = serde_json::to_string::<S>(&body)?;
        self.request::<D>(Method::PUT, endpoint, Some(data.into_bytes()))
            .await
    }

    /// Searches for issues matching `filter`.
    ///
    /// Result elements that fail issue construction are logged and dropped,
    /// so one malformed issue does not abort the whole search.
    ///
    /// # Errors
    /// Fails on transport errors and non-success responses.
    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<Issue>> {
        let query = filter.to_query();
        debug!("searching with jql '{query}'");
        let document = self
            .get::<Value>(&format!("/search?jql={query}&fields=*all"))
            .await?;

        let Ok(issues) = navigator::resolve("issues", &document) else {
            return Ok(Vec::new());
        };
        let Some(elements) = issues.as_array() else {
            return Ok(Vec::new());
        };
        let mut result = Vec::with_capacity(elements.len());
        for element in elements {
            match Issue::from_document(element) {
                Ok(issue) => result.push(issue),
                Err(err) => warn!("skipping malformed issue in search result: {err}"),
            }
        }
        Ok(result)
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn get_issue(&self, issue_key: &str) -> Result<Issue> {
        let document = self.get::<Value>(&format!("/issue/{issue_key}")).await?;
        Issue::from_document(&document)
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> Result<()> {
        let _ = self
            .post::<Value, _>(&format!("/issue/{issue_key}/comment"), json!({ "body": comment }))
            .await?;
        Ok(())
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn delete_comment(&self, issue_key: &str, comment_id: &str) -> Result<()> {
        self.delete_by_id("comment", issue_key, comment_id).await
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn delete_worklog(&self, issue_key: &str, worklog_id: &str) -> Result<()> {
        self.delete_by_id("worklog", issue_key, worklog_id).await
    }

    async fn delete_by_id(&self, kind: &str, issue_key: &str, id: &str) -> Result<()> {
        let id = numeric_id(id).ok_or_else(|| JiraError::BadId(id.to_string()))?;
        let _ = self
            .delete::<Value>(&format!("/issue/{issue_key}/{kind}/{id}"))
            .await?;
        Ok(())
    }

    /// Deletes the attachment with display name `attachment_name` from the
    /// given issue.
    ///
    /// # Errors
    /// Fails with [`JiraError::AttachmentNotFound`] when the issue carries
    /// no attachment of that name.
    pub async fn delete_attachment(&self, issue_key: &str, attachment_name: &str) -> Result<()> {
        let issue = self.get_issue(issue_key).await?;
        let Some(attachment) = issue
            .attachments
            .iter()
            .find(|a| a.name == attachment_name)
        else {
            return Err(JiraError::AttachmentNotFound(attachment_name.to_string()));
        };
        self.delete_absolute(&attachment.self_url).await?;
        info!("attachment '{attachment_name}' removed from {issue_key}");
        Ok(())
    }

    // Attachment resources live under their own absolute `self` URL rather
    // than under the issue.
    async fn delete_absolute(&self, url: &str) -> Result<()> {
        let request = self.credentials.apply(self.client.request(Method::DELETE, url));
        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(JiraError::NotFound(url.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(JiraError::Unauthorized),
            status if status.is_success() => Ok(()),
            status => Err(JiraError::DeleteFailed(status)),
        }
    }

    /// Uploads the file at `path` as an attachment on the given issue.
    ///
    /// # Errors
    /// Fails when the file cannot be read or Jira rejects the upload.
    pub async fn upload_attachment(&self, issue_key: &str, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let bytes = std::fs::read(path)?;
        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        let url = self
            .host
            .join(&format!("{}/issue/{issue_key}/attachments", self.api))?;
        let request = self.credentials.apply(
            self.client
                .post(url)
                .header("X-Atlassian-Token", "nocheck")
                .multipart(form),
        );
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            info!("file uploaded to {issue_key}");
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(JiraError::Unauthorized);
        }
        let body = response.text().await?;
        Err(JiraError::Fault {
            code: status,
            errors: serde_json::from_str(&body).unwrap_or_default(),
        })
    }

    /// Applies an `update` body to the issue, e.g. `{"labels": [{"add": "x"}]}`.
    #[allow(clippy::missing_errors_doc)]
    pub async fn update_issue(&self, issue_key: &str, update: Value) -> Result<()> {
        let _ = self
            .put::<Value, _>(&format!("/issue/{issue_key}"), json!({ "update": update }))
            .await?;
        info!("issue {issue_key} updated");
        Ok(())
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn add_labels(&self, issue_key: &str, labels: &[String]) -> Result<()> {
        let additions: Vec<Value> = labels.iter().map(|label| json!({ "add": label })).collect();
        self.update_issue(issue_key, json!({ "labels": additions }))
            .await
    }

    /// Retrieves all projects the user may create issues in, keyed by
    /// display name.
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_projects(&self) -> Result<BTreeMap<String, JiraProject>> {
        let document = self.get::<Value>("/issue/createmeta").await?;
        Ok(project_map_from_document(&document))
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn get_project_keys(&self) -> Result<Vec<String>> {
        let document = self.get::<Value>("/project").await?;
        let Some(elements) = document.as_array() else {
            return Ok(Vec::new());
        };
        Ok(elements
            .iter()
            .filter_map(|project| project.get("key").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Retrieves the issue types available per project, keyed by project
    /// display name and then by CLI-friendly type name.
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_task_types(&self) -> Result<BTreeMap<String, BTreeMap<String, String>>> {
        let document = self.get::<Value>("/issue/createmeta").await?;
        Ok(task_type_map_from_document(&document))
    }

    /// Resolves a CLI-friendly type name like `new-feature` to the display
    /// name Jira expects in creation requests.
    ///
    /// # Errors
    /// Fails with [`JiraError::TaskTypeNotFound`] when the project has no
    /// such type.
    pub async fn get_task_type(&self, project: &str, friendly_name: &str) -> Result<String> {
        let task_types = self.get_task_types().await?;
        task_types
            .get(project)
            .and_then(|types| types.get(friendly_name))
            .cloned()
            .ok_or_else(|| JiraError::TaskTypeNotFound(friendly_name.to_string()))
    }

    /// Creates a new issue in `project` and returns the key Jira assigned.
    ///
    /// # Errors
    /// Fails when the task type cannot be resolved or Jira rejects the
    /// creation request.
    pub async fn create_task(&self, project: &str, options: &NewTaskOptions) -> Result<String> {
        let issue_type = self.get_task_type(project, &options.task_type).await?;
        let projects = self.get_projects().await?;
        let project_key = projects
            .get(project)
            .map(|p| p.key.clone())
            .unwrap_or_default();

        let mut fields = Map::new();
        fields.insert("summary".to_string(), json!(options.summary));
        fields.insert("project".to_string(), json!({ "key": project_key }));
        fields.insert("issuetype".to_string(), json!({ "name": issue_type }));
        if let Some(parent) = &options.parent {
            fields.insert("parent".to_string(), json!({ "key": parent }));
        }
        if !options.description.is_empty() {
            fields.insert("description".to_string(), json!(options.description));
        }
        if !options.labels.is_empty() {
            fields.insert("labels".to_string(), json!(options.labels));
        }
        for assignment in &options.fields {
            if let Some((name, value)) = assignment.split_once('=') {
                fields.insert(name.to_string(), json!(value));
            }
        }
        for assignment in &options.select_fields {
            if let Some((name, value)) = assignment.split_once('=') {
                fields.insert(name.to_string(), json!({ "value": value }));
            }
        }

        let document = self
            .post::<Value, _>("/issue", json!({ "fields": fields }))
            .await?;
        let key = navigator::resolve("key", &document)
            .ok()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        info!("{key} successfully created");
        Ok(key)
    }
}

// Jira only accepts numeric ids in deletion URLs; user input like
// "comment-10042" is reduced to its first digit run.
fn numeric_id(id: &str) -> Option<&str> {
    let start = id.find(|c: char| c.is_ascii_digit())?;
    let len = id[start..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(id.len() - start);
    Some(&id[start..start + len])
}
