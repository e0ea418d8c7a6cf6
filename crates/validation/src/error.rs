use serde::Serialize;
use serde_json::Value;

use crate::Location;

/// One violated rule, as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(skip)]
    pub location: Location,
    pub message: String,
    /// The rejected value; omitted when the field was absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
