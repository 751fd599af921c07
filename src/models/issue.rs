//!
//! The issue domain model and its construction from generic JSON documents.
//!
//! Jira's issue representation is too irregular to deserialize directly into
//! structs: half the fields may be absent or `null` depending on project
//! configuration. Construction therefore walks the generic tree with the
//! [`navigator`](crate::navigator) and applies an explicit required/optional
//! policy per field.

use serde_json::Value;

use super::collect_valid;
use crate::navigator::resolve;
use crate::JiraError;

/// Represents a Jira issue as used by this client.
///
/// An `Issue` is only ever handed out fully constructed; when a required
/// field is missing or mistyped, construction fails as a whole.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Issue {
    /// The issue key, e.g. `PROJ-42`.
    pub key: String,
    /// Display suffix referencing the parent issue (`" of PROJ-7"`),
    /// empty when the issue has no parent.
    pub parent: String,
    pub summary: String,
    /// Human readable issue type name, e.g. `Story`.
    pub issue_type: String,
    pub status: String,
    pub description: String,
    pub assignee: String,
    /// Time estimates in seconds, zero when Jira reports none.
    pub original_estimate: f64,
    pub remaining_estimate: f64,
    pub time_spent: f64,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub body: String,
    /// Display name of the comment author.
    pub author: String,
}

/// A file attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    /// Download URL of the attachment content.
    pub url: String,
    /// The attachment's own REST resource, used for deletion.
    pub self_url: String,
}

fn required_string(document: &Value, path: &'static str) -> Result<String, JiraError> {
    match resolve(path, document) {
        Ok(Value::String(text)) => Ok(text.clone()),
        _ => Err(JiraError::MalformedIssue { field: path }),
    }
}

fn optional_string(document: &Value, path: &str) -> String {
    match resolve(path, document) {
        Ok(Value::String(text)) => text.clone(),
        _ => String::new(),
    }
}

// Absence of the whole ancestor object is fatal, a present but mistyped or
// null leaf quietly becomes zero.
fn required_number(document: &Value, path: &'static str) -> Result<f64, JiraError> {
    let value = resolve(path, document).map_err(|_| JiraError::MalformedIssue { field: path })?;
    Ok(value.as_f64().unwrap_or(0.0))
}

impl Issue {
    /// Builds an `Issue` from a generic issue document, as returned by the
    /// issue resource or as one element of a search response.
    ///
    /// # Errors
    /// Fails with [`JiraError::MalformedIssue`] when a required field is
    /// absent or mistyped, and with [`JiraError::Resolution`] when the
    /// comment container is missing entirely. Individually malformed
    /// comment and attachment elements are dropped, never reported.
    pub fn from_document(document: &Value) -> Result<Issue, JiraError> {
        let key = required_string(document, "key")?;
        let issue_type = required_string(document, "fields/issuetype/name")?;
        let summary = required_string(document, "fields/summary")?;

        let parent = match optional_string(document, "fields/parent/key") {
            key if key.is_empty() => String::new(),
            key => format!(" of {key}"),
        };

        let description = optional_string(document, "fields/description");
        let status = optional_string(document, "fields/status/name");
        let assignee = optional_string(document, "fields/assignee/name");

        let original_estimate = required_number(document, "fields/timeoriginalestimate")?;
        let remaining_estimate = required_number(document, "fields/timeremainingestimate")?;
        let time_spent = required_number(document, "fields/timespent")?;

        // The comment container must resolve even if it holds no comments;
        // attachments on the other hand are fully optional.
        let comments = collect_valid(
            resolve("fields/comment/comments", document)?,
            Comment::from_element,
        );
        let attachments = match resolve("fields/attachment", document) {
            Ok(value) => collect_valid(value, Attachment::from_element),
            Err(_) => Vec::new(),
        };

        Ok(Issue {
            key,
            parent,
            summary,
            issue_type,
            status,
            description,
            assignee,
            original_estimate,
            remaining_estimate,
            time_spent,
            comments,
            attachments,
        })
    }
}

impl Comment {
    fn from_element(element: &Value) -> Option<Comment> {
        let id = element.get("id")?.as_str()?;
        let body = element.get("body")?.as_str()?;
        let author = element.get("author")?.get("displayName")?.as_str()?;
        Some(Comment {
            id: id.to_string(),
            body: body.to_string(),
            author: author.to_string(),
        })
    }
}

impl Attachment {
    fn from_element(element: &Value) -> Option<Attachment> {
        let name = element.get("filename")?.as_str()?;
        let url = element.get("content")?.as_str()?;
        let self_url = element.get("self")?.as_str()?;
        Some(Attachment {
            name: name.to_string(),
            url: url.to_string(),
            self_url: self_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_issue() -> Value {
        json!({
            "key": "PROJ-1",
            "fields": {
                "summary": "Fix the flux capacitor",
                "issuetype": {"name": "Bug"},
                "timeoriginalestimate": 3600,
                "timeremainingestimate": 1800,
                "timespent": 900,
                "comment": {"comments": []}
            }
        })
    }

    #[test]
    fn builds_fully_populated_issue() {
        let mut doc = minimal_issue();
        let fields = doc["fields"].as_object_mut().unwrap();
        fields.insert("description".into(), json!("Long story"));
        fields.insert("status".into(), json!({"name": "Open"}));
        fields.insert("assignee".into(), json!({"name": "marty"}));
        fields.insert("parent".into(), json!({"key": "PROJ-7"}));

        let issue = Issue::from_document(&doc).unwrap();
        assert_eq!(issue.key, "PROJ-1");
        assert_eq!(issue.summary, "Fix the flux capacitor");
        assert_eq!(issue.issue_type, "Bug");
        assert_eq!(issue.status, "Open");
        assert_eq!(issue.assignee, "marty");
        assert_eq!(issue.parent, " of PROJ-7");
        assert_eq!(issue.original_estimate, 3600.0);
    }

    #[test]
    fn missing_key_is_fatal() {
        let mut doc = minimal_issue();
        doc.as_object_mut().unwrap().remove("key");
        let err = Issue::from_document(&doc).unwrap_err();
        assert!(matches!(err, JiraError::MalformedIssue { field: "key" }));
    }

    #[test]
    fn mistyped_summary_is_fatal() {
        let mut doc = minimal_issue();
        doc["fields"]["summary"] = json!(42);
        let err = Issue::from_document(&doc).unwrap_err();
        assert!(matches!(
            err,
            JiraError::MalformedIssue {
                field: "fields/summary"
            }
        ));
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let issue = Issue::from_document(&minimal_issue()).unwrap();
        assert_eq!(issue.description, "");
        assert_eq!(issue.status, "");
        assert_eq!(issue.assignee, "");
        assert_eq!(issue.parent, "");
    }

    #[test]
    fn timespent_as_string_becomes_zero() {
        let mut doc = minimal_issue();
        doc["fields"]["timespent"] = json!("900");
        let issue = Issue::from_document(&doc).unwrap();
        assert_eq!(issue.time_spent, 0.0);
    }

    #[test]
    fn missing_fields_object_fails_numeric_requirement() {
        let doc = json!({"key": "PROJ-1"});
        // The earlier required string lookups already trip on the same
        // missing object.
        assert!(Issue::from_document(&doc).is_err());
    }

    #[test]
    fn missing_comment_container_is_fatal() {
        let mut doc = minimal_issue();
        doc["fields"].as_object_mut().unwrap().remove("comment");
        let err = Issue::from_document(&doc).unwrap_err();
        assert!(matches!(err, JiraError::Resolution(_)));
    }

    #[test]
    fn malformed_comments_are_dropped_not_fatal() {
        let mut doc = minimal_issue();
        doc["fields"]["comment"]["comments"] = json!([
            {"id": "1", "body": "first", "author": {"displayName": "Doc"}},
            {"id": "2", "body": "no author"},
            {"id": "3", "body": "third", "author": {"displayName": "Einstein"}}
        ]);
        let issue = Issue::from_document(&doc).unwrap();
        assert_eq!(issue.comments.len(), 2);
        assert_eq!(issue.comments[0].author, "Doc");
        assert_eq!(issue.comments[1].id, "3");
    }

    #[test]
    fn attachments_are_fully_optional() {
        let issue = Issue::from_document(&minimal_issue()).unwrap();
        assert!(issue.attachments.is_empty());
    }

    #[test]
    fn malformed_attachments_are_dropped() {
        let mut doc = minimal_issue();
        doc["fields"].as_object_mut().unwrap().insert(
            "attachment".into(),
            json!([
                {"filename": "a.png", "content": "https://x/a.png", "self": "https://x/att/1"},
                {"filename": "broken.png", "content": 17, "self": "https://x/att/2"}
            ]),
        );
        let issue = Issue::from_document(&doc).unwrap();
        assert_eq!(issue.attachments.len(), 1);
        assert_eq!(issue.attachments[0].name, "a.png");
    }
}
