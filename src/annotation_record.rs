use crate::rationale::Rationale;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Value};

/// One reviewable molecule transformation.
///
/// Keys the tool does not edit are carried through `extra` and written back
/// unchanged when the record is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "src")]
    pub source_structure: String,
    #[serde(rename = "tgt")]
    pub target_structure: String,
    #[serde(default, deserialize_with = "deserialize_counter")]
    pub total_entity: i64,
    #[serde(default, deserialize_with = "deserialize_counter")]
    pub error_entity: i64,
    #[serde(rename = "cot_result", default)]
    pub rationale: Rationale,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnnotationRecord {
    pub fn new(source_structure: &str, target_structure: &str) -> Self {
        Self {
            source_structure: source_structure.to_string(),
            target_structure: target_structure.to_string(),
            total_entity: 0,
            error_entity: 0,
            rationale: Rationale::default(),
            extra: Map::new(),
        }
    }

    /// The record as a JSON object, fixed fields first.
    pub fn to_document(&self) -> serde_json::Result<Map<String, Value>> {
        serde_json::from_value(serde_json::to_value(self)?)
    }

    /// Writes this record's fields over `document`. Keys already present keep
    /// their position; keys the document lacks are appended.
    pub fn merge_into(&self, document: &mut Map<String, Value>) -> serde_json::Result<()> {
        for (key, value) in self.to_document()? {
            document.insert(key, value);
        }
        Ok(())
    }
}

// Older exports stored the counters as floats (`42.0`); accept both.
fn deserialize_counter<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| D::Error::custom(format!("counter {n} is not representable"))),
        Some(other) => Err(D::Error::custom(format!(
            "expected a numeric counter, found {other}"
        ))),
    }
}
