//! Chain-of-thought rationale attached to each record.
//!
//! Datasets store the rationale either as JSON-encoded text or as an inline
//! object. Both shapes resolve into one ordered section map; saving always
//! writes the text shape back.

use crate::{annotation_record::AnnotationRecord, json_format};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PARSE_ERROR_KEY: &str = "error";
pub const PARSE_ERROR_MESSAGE: &str = "Invalid JSON format";

pub type SectionMap = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rationale {
    Text(String),
    Sections(SectionMap),
    Other(Value),
}

impl Default for Rationale {
    fn default() -> Self {
        Self::Sections(SectionMap::new())
    }
}

impl Rationale {
    pub fn parse_failure() -> SectionMap {
        let mut map = SectionMap::new();
        map.insert(
            PARSE_ERROR_KEY.to_string(),
            Value::String(PARSE_ERROR_MESSAGE.to_string()),
        );
        map
    }

    /// Canonical section map. Text that does not decode into a JSON object
    /// resolves to the single parse-failure entry.
    pub fn resolve(&self) -> SectionMap {
        match self {
            Self::Text(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                _ => Self::parse_failure(),
            },
            Self::Sections(map) => map.clone(),
            Self::Other(Value::Null) => SectionMap::new(),
            Self::Other(_) => Self::parse_failure(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// Text shown in an editor box for one section value.
pub fn section_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// The fixed, ordered set of section names shared by every record of a
/// session. Derived once from the first record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationaleSchema {
    sections: Vec<String>,
}

impl RationaleSchema {
    pub fn new(sections: Vec<String>) -> Self {
        Self { sections }
    }

    pub fn derive(first: &AnnotationRecord) -> Self {
        Self::new(first.rationale.resolve().keys().cloned().collect())
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn values_for(&self, rationale: &Rationale) -> Vec<String> {
        let map = rationale.resolve();
        self.sections
            .iter()
            .map(|name| section_text(map.get(name)))
            .collect()
    }

    /// Pairs section names with `values`, stopping at the shorter of the two.
    pub fn assemble(&self, values: &[String]) -> SectionMap {
        self.sections
            .iter()
            .zip(values)
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect()
    }

    pub fn to_rationale(&self, values: &[String]) -> serde_json::Result<Rationale> {
        let text = json_format::to_indented_string(&self.assemble(values))?;
        Ok(Rationale::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sections(value: Value) -> SectionMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_text_and_object_resolve_to_same_map() {
        let object = json!({"step1": "oxidise", "step2": "reduce"});
        let as_text = Rationale::Text(object.to_string());
        let as_map = Rationale::Sections(sections(object));
        assert_eq!(as_text.resolve(), as_map.resolve());
    }

    #[test]
    fn test_malformed_text_flags_parse_failure() {
        let rationale = Rationale::Text("{not json".to_string());
        assert_eq!(
            Value::Object(rationale.resolve()),
            json!({"error": "Invalid JSON format"})
        );
    }

    #[test]
    fn test_non_object_text_flags_parse_failure() {
        let rationale = Rationale::Text("[1, 2]".to_string());
        assert_eq!(rationale.resolve(), Rationale::parse_failure());
    }

    #[test]
    fn test_deserialize_both_shapes() {
        let text: Rationale = serde_json::from_value(json!("{\"a\": \"x\"}")).unwrap();
        assert!(text.is_text());
        let map: Rationale = serde_json::from_value(json!({"a": "x"})).unwrap();
        assert_eq!(map, Rationale::Sections(sections(json!({"a": "x"}))));
        let null: Rationale = serde_json::from_value(Value::Null).unwrap();
        assert!(null.resolve().is_empty());
    }

    #[test]
    fn test_section_order_is_preserved() {
        let rationale = Rationale::Text(r#"{"zeta": "1", "alpha": "2", "mid": "3"}"#.to_string());
        let names: Vec<_> = rationale.resolve().keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_values_for_defaults_missing_sections() {
        let schema = RationaleSchema::new(vec!["a".into(), "b".into(), "c".into()]);
        let rationale = Rationale::Sections(sections(json!({"a": "text", "c": 7, "b": null})));
        assert_eq!(schema.values_for(&rationale), vec!["text", "", "7"]);

        let sparse = Rationale::Sections(sections(json!({"a": "only"})));
        assert_eq!(schema.values_for(&sparse), vec!["only", "", ""]);
    }

    #[test]
    fn test_assemble_zips_to_shorter() {
        let schema = RationaleSchema::new(vec!["a".into(), "b".into()]);
        let map = schema.assemble(&["1".to_string()]);
        assert_eq!(Value::Object(map), json!({"a": "1"}));
    }

    #[test]
    fn test_to_rationale_writes_indented_text() {
        let schema = RationaleSchema::new(vec!["a".into(), "b".into()]);
        let rationale = schema
            .to_rationale(&["x".to_string(), "y".to_string()])
            .unwrap();
        let Rationale::Text(text) = &rationale else {
            panic!("expected text rationale");
        };
        assert_eq!(text, "{\n    \"a\": \"x\",\n    \"b\": \"y\"\n}");
        assert_eq!(
            Value::Object(rationale.resolve()),
            json!({"a": "x", "b": "y"})
        );
    }
}
