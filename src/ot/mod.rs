pub mod transform;

pub use transform::{apply, transform};

use serde::{Deserialize, Serialize};

/// A single text edit, positioned in character offsets into the document
/// content at the moment the operation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    Insert { position: usize, text: String },
    Delete { position: usize, length: usize },
}

/// An operation that has been accepted into a session's history, tagged with
/// the identity of its author for tie-breaking against later concurrent edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedOperation {
    pub operation: Operation,
    pub author_id: String,
}
