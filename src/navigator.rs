//!
//! Navigation of schema-less JSON documents by path.
//!
//! Jira responses are deeply nested and mostly undocumented, so instead of
//! declaring a struct per response shape we walk the generic
//! `serde_json::Value` tree with a `/`-delimited path.

use serde_json::Value;
use thiserror::Error;

static NULL: Value = Value::Null;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// An intermediate path segment resolved to something other than an
    /// object. `segment` names the path element whose value had the wrong
    /// type (empty for the document root).
    #[error("bad path, '{segment}' is not an object")]
    NotAnObject { segment: String },

    #[error("path has no segments")]
    EmptyPath,
}

/// Resolves `path` against `document` and returns the addressed value.
///
/// Every segment except the last must land on an object. A key that is
/// absent behaves exactly like an explicit `null`: at an intermediate
/// position the walk fails with [`PathError::NotAnObject`], at the final
/// position `Null` is returned. Callers that need present-and-typed
/// semantics must check the returned value themselves.
///
/// Path segments are never interpreted as array indices; to descend into a
/// sequence, resolve the sequence itself and iterate its elements.
pub fn resolve<'a>(path: &str, document: &'a Value) -> Result<&'a Value, PathError> {
    let mut segments = path.split('/').peekable();
    let mut current = document;
    let mut parent = "";
    loop {
        let Some(segment) = segments.next() else {
            return Err(PathError::EmptyPath);
        };
        let Value::Object(map) = current else {
            return Err(PathError::NotAnObject {
                segment: parent.to_string(),
            });
        };
        let next = map.get(segment).unwrap_or(&NULL);
        if segments.peek().is_none() {
            return Ok(next);
        }
        current = next;
        parent = segment;
    }
}
