use crate::{
    annotation_record::AnnotationRecord,
    molecule_render::{MoleculeImage, MoleculeRenderer, TextCardRenderer},
    rationale::RationaleSchema,
};
use serde::Serialize;
use tracing::warn;

#[derive(Clone, Debug, Serialize)]
pub struct MoleculePanel {
    pub structure: String,
    #[serde(skip)]
    pub image: Option<MoleculeImage>,
    /// Why the depiction is a placeholder, if it is one.
    pub warning: Option<String>,
}

impl MoleculePanel {
    fn text_only(structure: &str) -> Self {
        Self {
            structure: structure.to_string(),
            image: None,
            warning: None,
        }
    }

    fn build(structure: &str, renderer: &dyn MoleculeRenderer) -> Self {
        match renderer.render(structure) {
            Ok(image) => Self {
                structure: structure.to_string(),
                image: Some(image),
                warning: None,
            },
            Err(e) => {
                let reason = e.to_string();
                warn!(structure, error = %reason, "could not depict structure");
                Self {
                    structure: structure.to_string(),
                    image: TextCardRenderer::placeholder(structure, "Depiction unavailable"),
                    warning: Some(reason),
                }
            }
        }
    }
}

/// Everything the UI shows for one record.
#[derive(Clone, Debug, Serialize)]
pub struct RecordView {
    pub index: usize,
    pub source: MoleculePanel,
    pub target: MoleculePanel,
    pub total_entity: i64,
    pub error_entity: i64,
    pub sections: Vec<String>,
    pub section_values: Vec<String>,
}

pub fn build_record_view(
    record: &AnnotationRecord,
    index: usize,
    schema: &RationaleSchema,
    renderer: &dyn MoleculeRenderer,
) -> RecordView {
    RecordView {
        index,
        source: MoleculePanel::build(&record.source_structure, renderer),
        target: MoleculePanel::build(&record.target_structure, renderer),
        total_entity: record.total_entity,
        error_entity: record.error_entity,
        sections: schema.sections().to_vec(),
        section_values: schema.values_for(&record.rationale),
    }
}

/// Same fields as [`build_record_view`] but without depictions.
pub fn build_record_fields(
    record: &AnnotationRecord,
    index: usize,
    schema: &RationaleSchema,
) -> RecordView {
    RecordView {
        index,
        source: MoleculePanel::text_only(&record.source_structure),
        target: MoleculePanel::text_only(&record.target_structure),
        total_entity: record.total_entity,
        error_entity: record.error_entity,
        sections: schema.sections().to_vec(),
        section_values: schema.values_for(&record.rationale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{molecule_render::RenderError, rationale::Rationale};

    /// Renders nothing; every structure is rejected.
    struct RejectingRenderer;

    impl MoleculeRenderer for RejectingRenderer {
        fn render(&self, structure: &str) -> Result<MoleculeImage, RenderError> {
            Err(RenderError::InvalidStructure {
                structure: structure.to_string(),
                message: "unbalanced ring closure".to_string(),
            })
        }
    }

    fn record() -> AnnotationRecord {
        let mut record = AnnotationRecord::new("CCO", "CC=O");
        record.total_entity = 4;
        record.error_entity = 1;
        record.rationale = Rationale::Text(r#"{"reasoning": "oxidation", "check": 2}"#.into());
        record
    }

    #[test]
    fn test_build_record_view() {
        let schema = RationaleSchema::new(vec!["reasoning".into(), "check".into(), "extra".into()]);
        let view = build_record_view(&record(), 7, &schema, &TextCardRenderer);
        assert_eq!(view.index, 7);
        assert_eq!(view.source.structure, "CCO");
        assert_eq!(view.target.structure, "CC=O");
        assert!(view.source.image.is_some());
        assert!(view.source.warning.is_none());
        assert_eq!(view.total_entity, 4);
        assert_eq!(view.error_entity, 1);
        assert_eq!(view.section_values, vec!["oxidation", "2", ""]);
    }

    #[test]
    fn test_render_failure_becomes_placeholder() {
        let schema = RationaleSchema::default();
        let view = build_record_view(&record(), 0, &schema, &RejectingRenderer);
        let image = view.source.image.expect("placeholder image");
        assert!(image.svg().contains("CCO"));
        assert!(
            view.target
                .warning
                .as_deref()
                .is_some_and(|w| w.contains("unbalanced ring closure"))
        );
    }

    #[test]
    fn test_build_record_fields_skips_depiction() {
        let schema = RationaleSchema::new(vec!["reasoning".into()]);
        let view = build_record_fields(&record(), 1, &schema);
        assert!(view.source.image.is_none());
        assert!(view.target.warning.is_none());
        assert_eq!(view.section_values, vec!["oxidation"]);
    }

    #[test]
    fn test_empty_structure_warns() {
        let schema = RationaleSchema::default();
        let view = build_record_view(&AnnotationRecord::new("", "C"), 0, &schema, &TextCardRenderer);
        assert_eq!(view.source.warning.as_deref(), Some("Structure string is empty"));
        assert!(view.target.warning.is_none());
    }
}
