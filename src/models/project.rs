//!
//! Project lookup records built from the `createmeta` resource.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::navigator::resolve;

/// Immutable lookup record for one remote project.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JiraProject {
    /// Unique numeric identity of the project, as a string.
    pub id: String,
    /// The project name as displayed to users.
    pub name: String,
    /// The project key, typically a short upper-case abbreviation.
    pub key: String,
}

/// Builds a map from project display name to [`JiraProject`] out of a
/// `createmeta` document.
///
/// Every field of every element is optional; missing values become empty
/// strings rather than failing the map. Projects without a name all end up
/// under the empty-string key, so later entries shadow earlier ones there.
#[must_use]
pub fn project_map_from_document(document: &Value) -> BTreeMap<String, JiraProject> {
    let mut projects = BTreeMap::new();
    let Ok(elements) = resolve("projects", document) else {
        return projects;
    };
    let Some(elements) = elements.as_array() else {
        return projects;
    };
    for element in elements {
        let name = string_at(element, "name");
        projects.insert(
            name.clone(),
            JiraProject {
                id: string_at(element, "id"),
                name,
                key: string_at(element, "key"),
            },
        );
    }
    projects
}

/// Builds a map from project display name to the project's issue types,
/// keyed by a CLI-friendly name (lower-cased, spaces turned into dashes)
/// and valued by the display name Jira expects in requests.
#[must_use]
pub fn task_type_map_from_document(document: &Value) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    let Ok(elements) = resolve("projects", document) else {
        return map;
    };
    let Some(elements) = elements.as_array() else {
        return map;
    };
    for element in elements {
        let Some(Value::String(project_name)) = resolve("name", element).ok() else {
            continue;
        };
        let mut types = BTreeMap::new();
        if let Some(issue_types) = resolve("issuetypes", element)
            .ok()
            .and_then(Value::as_array)
        {
            for issue_type in issue_types {
                if let Ok(Value::String(type_name)) = resolve("name", issue_type) {
                    let friendly = type_name.to_lowercase().replace(' ', "-");
                    types.insert(friendly, type_name.clone());
                }
            }
        }
        map.insert(project_name.clone(), types);
    }
    map
}

fn string_at(element: &Value, path: &str) -> String {
    match resolve(path, element) {
        Ok(Value::String(text)) => text.clone(),
        _ => String::new(),
    }
}
