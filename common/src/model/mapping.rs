use serde::{Deserialize, Serialize};

/// Binds one template placeholder to one data field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMapping {
    pub placeholder: String,
    pub data_field: String,
}

impl FieldMapping {
    pub fn new(placeholder: impl Into<String>, data_field: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            data_field: data_field.into(),
        }
    }
}
