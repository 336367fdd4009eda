use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row from the `jobs` table. Only the id is typed; the scoring code reads
/// the skill columns through the loosely-typed payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRow {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl JobRow {
    /// Returns the row as a JSON object suitable for the feature normalizer.
    pub fn to_payload(&self) -> Value {
        let mut payload = self.fields.clone();
        payload.insert("id".to_string(), Value::String(self.id.clone()));
        if let Some(title) = &self.title {
            payload.insert("title".to_string(), Value::String(title.clone()));
        }
        Value::Object(payload)
    }
}
