//! Declarative call scripts.
//!
//! A call script is a JSON array of builder invocations. Replaying it against
//! a [`Migration`] issues the same builder calls, in order, that a Rust
//! callback would:
//!
//! ```text
//! [ { "op": "createContentType", "id": "person", "as": "p",
//!     "props": { "description": "A person" } },
//!   { "op": "createField", "on": "p", "id": "fullName", "as": "f",
//!     "props": { "name": "Full Name", "type": "Symbol" } },
//!   { "op": "set", "on": "f", "key": "omitted", "value": true },
//!   { "op": "deleteField", "on": "p", "id": "age" } ]
//! ```
//!
//! `as` binds the returned builder to a handle name; `on` refers to a handle
//! bound by an earlier call.

use crate::migration::{ContentTypeBuilder, FieldBuilder, Migration, Props};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Call script errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script is not valid JSON or has an unknown call shape.
    #[error("invalid call script: {0}")]
    Parse(#[from] serde_json::Error),

    /// The script file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The script path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A call refers to a handle that was never bound.
    #[error("call {index}: unknown handle '{handle}'")]
    UnknownHandle {
        /// Zero-based call index.
        index: usize,
        /// The handle name.
        handle: String,
    },

    /// A call refers to a handle of the wrong kind.
    #[error("call {index}: handle '{handle}' is not a {expected} builder")]
    HandleKind {
        /// Zero-based call index.
        index: usize,
        /// The handle name.
        handle: String,
        /// The builder kind the call needs.
        expected: &'static str,
    },
}

/// One builder invocation of a call script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ScriptCall {
    CreateContentType {
        id: String,
        #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
        bind: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        props: Option<Props>,
    },
    EditContentType {
        id: String,
        #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
        bind: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        props: Option<Props>,
    },
    CreateField {
        on: String,
        id: String,
        #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
        bind: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        props: Option<Props>,
    },
    EditField {
        on: String,
        id: String,
        #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
        bind: Option<String>,
    },
    DeleteField {
        on: String,
        id: String,
        #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
        bind: Option<String>,
    },
    /// Generic setter on a content type or field handle.
    Set { on: String, key: String, value: Value },
}

impl ScriptCall {
    fn op(&self) -> &'static str {
        match self {
            ScriptCall::CreateContentType { .. } => "createContentType",
            ScriptCall::EditContentType { .. } => "editContentType",
            ScriptCall::CreateField { .. } => "createField",
            ScriptCall::EditField { .. } => "editField",
            ScriptCall::DeleteField { .. } => "deleteField",
            ScriptCall::Set { .. } => "set",
        }
    }
}

#[derive(Debug, Clone)]
enum Handle {
    ContentType(ContentTypeBuilder),
    Field(FieldBuilder),
}

/// An ordered list of builder invocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationScript {
    calls: Vec<ScriptCall>,
}

impl MigrationScript {
    /// Create a script from calls.
    pub fn new(calls: Vec<ScriptCall>) -> Self {
        Self { calls }
    }

    /// Parse a script from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a script file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Get the calls in order.
    pub fn calls(&self) -> &[ScriptCall] {
        &self.calls
    }

    /// Get the number of calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Check if the script has no calls.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Issue every call against `migration`, in order.
    pub fn replay(&self, migration: &Migration) -> Result<(), ScriptError> {
        let mut handles: HashMap<String, Handle> = HashMap::new();

        for (index, call) in self.calls.iter().enumerate() {
            debug!(index, op = call.op(), "replaying call");

            match call {
                ScriptCall::CreateContentType { id, bind, props } => {
                    let builder = migration
                        .create_content_type_with(id, props.clone().unwrap_or_default());
                    bind_handle(&mut handles, bind, Handle::ContentType(builder));
                }
                ScriptCall::EditContentType { id, bind, props } => {
                    let builder =
                        migration.edit_content_type_with(id, props.clone().unwrap_or_default());
                    bind_handle(&mut handles, bind, Handle::ContentType(builder));
                }
                ScriptCall::CreateField { on, id, bind, props } => {
                    let content_type = content_type_handle(&handles, index, on)?;
                    let field =
                        content_type.create_field_with(id, props.clone().unwrap_or_default());
                    bind_handle(&mut handles, bind, Handle::Field(field));
                }
                ScriptCall::EditField { on, id, bind } => {
                    let field = content_type_handle(&handles, index, on)?.edit_field(id);
                    bind_handle(&mut handles, bind, Handle::Field(field));
                }
                ScriptCall::DeleteField { on, id, bind } => {
                    let field = content_type_handle(&handles, index, on)?.delete_field(id);
                    bind_handle(&mut handles, bind, Handle::Field(field));
                }
                ScriptCall::Set { on, key, value } => match lookup(&handles, index, on)? {
                    Handle::ContentType(builder) => {
                        builder.set(key.as_str(), value.clone());
                    }
                    Handle::Field(builder) => {
                        builder.set(key.as_str(), value.clone());
                    }
                },
            }
        }

        Ok(())
    }
}

fn bind_handle(handles: &mut HashMap<String, Handle>, bind: &Option<String>, handle: Handle) {
    if let Some(name) = bind {
        handles.insert(name.clone(), handle);
    }
}

fn lookup<'a>(
    handles: &'a HashMap<String, Handle>,
    index: usize,
    name: &str,
) -> Result<&'a Handle, ScriptError> {
    handles.get(name).ok_or_else(|| ScriptError::UnknownHandle {
        index,
        handle: name.to_string(),
    })
}

fn content_type_handle<'a>(
    handles: &'a HashMap<String, Handle>,
    index: usize,
    name: &str,
) -> Result<&'a ContentTypeBuilder, ScriptError> {
    match lookup(handles, index, name)? {
        Handle::ContentType(builder) => Ok(builder),
        Handle::Field(_) => Err(ScriptError::HandleKind {
            index,
            handle: name.to_string(),
            expected: "content type",
        }),
    }
}
