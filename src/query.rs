//!
//! Construction of JQL query strings for the issue search endpoint.

/// Search criteria for issue searches. Every field is optional and
/// contributes at most one JQL clause; a non-empty `jql` overrides all of
/// the other fields.
#[derive(Debug, Default, Clone)]
pub struct SearchFilter {
    /// Limit the search to a single project.
    pub project: String,
    /// Limit the search to issues in the currently open sprints.
    pub current_sprint: bool,
    /// Limit the search to open issues.
    pub open: bool,
    /// Limit the search to one issue and its children.
    pub issue: String,
    /// Raw JQL, used verbatim when non-empty.
    pub jql: String,
    /// Issue type names to include.
    pub types: Vec<String>,
    /// Issue type names to exclude.
    pub not_types: Vec<String>,
    /// Status names to include.
    pub statuses: Vec<String>,
    /// Status names to exclude.
    pub not_statuses: Vec<String>,
}

fn escape(text: &str) -> String {
    text.replace(' ', "+")
}

impl SearchFilter {
    /// Renders the filter as a `+`-escaped JQL string ready to be embedded
    /// as the `jql` query parameter of a search URL.
    ///
    /// Clauses are emitted in a fixed order and joined with `+AND+`; the
    /// query always ends with `order by rank`. With no criteria at all the
    /// result degenerates to `+order+by+rank`, which the remote parser
    /// accepts. This method cannot fail.
    #[must_use]
    pub fn to_query(&self) -> String {
        if !self.jql.is_empty() {
            return escape(&self.jql);
        }
        let mut clauses: Vec<String> = Vec::new();
        if self.current_sprint {
            clauses.push("sprint+in+openSprints()".to_string());
        }
        if self.open {
            clauses.push("status+=+'open'".to_string());
        }
        if !self.issue.is_empty() {
            let issue = escape(&self.issue);
            clauses.push(format!("issue+=+'{issue}'+or+parent+=+'{issue}'"));
        }
        if !self.project.is_empty() {
            clauses.push(format!("project+=+'{}'", escape(&self.project)));
        }
        if !self.types.is_empty() {
            clauses.push(escape(&format!("type in ('{}')", self.types.join("','"))));
        }
        if !self.not_types.is_empty() {
            // Unquoted on purpose, the deployed JQL parser accepts bare
            // identifiers here and existing saved searches rely on it.
            clauses.push(escape(&format!("type not in ({})", self.not_types.join(","))));
        }
        if !self.statuses.is_empty() {
            clauses.push(escape(&format!("status in ('{}')", self.statuses.join("','"))));
        }
        if !self.not_statuses.is_empty() {
            clauses.push(escape(&format!(
                "status not in ('{}')",
                self.not_statuses.join("','")
            )));
        }
        format!("{}+order+by+rank", clauses.join("+AND+"))
    }
}
