use serde_json::Value;

pub mod issue;
pub mod project;
pub mod task;

/// Folds a JSON sequence into the elements `build` accepts, silently
/// dropping everything else. Non-sequence input yields an empty vector.
pub(crate) fn collect_valid<T>(value: &Value, build: impl FnMut(&Value) -> Option<T>) -> Vec<T> {
    match value.as_array() {
        Some(elements) => elements.iter().filter_map(build).collect(),
        None => Vec::new(),
    }
}
