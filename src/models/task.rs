/// Options for creating a new issue through
/// [`JiraClient::create_task`](crate::JiraClient::create_task).
#[derive(Debug, Default, Clone)]
pub struct NewTaskOptions {
    /// CLI-friendly issue type name, e.g. `new-feature`.
    pub task_type: String,
    pub summary: String,
    pub description: String,
    /// Key of the parent issue, when creating a sub-task.
    pub parent: Option<String>,
    pub labels: Vec<String>,
    /// Free-form `name=value` field assignments.
    pub fields: Vec<String>,
    /// `name=value` assignments for select-list custom fields.
    pub select_fields: Vec<String>,
}
