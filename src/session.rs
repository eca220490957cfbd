//! One review session over a dataset.
//!
//! The session owns everything the UI callbacks act on: the record store, the
//! rationale schema fixed at load time, the current position and the persister.
//! Callbacks receive it explicitly and hand back what changed.

use crate::{
    config::AnnotatorConfig,
    error::Result,
    molecule_render::MoleculeRenderer,
    navigator::Navigator,
    persister::{Persister, RecordEdit, SaveReport},
    rationale::RationaleSchema,
    record_store::RecordStore,
    record_view::{RecordView, build_record_fields, build_record_view},
};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Session {
    store: RecordStore,
    schema: RationaleSchema,
    navigator: Navigator,
    persister: Persister,
}

impl Session {
    pub fn new(store: RecordStore, persister: Persister) -> Self {
        let schema = RationaleSchema::derive(store.first());
        info!(
            records = store.len(),
            sections = ?schema.sections(),
            benchmark = persister.benchmark_name(),
            "started review session"
        );
        Self {
            navigator: Navigator::new(store.len()),
            store,
            schema,
            persister,
        }
    }

    pub fn open(config: &AnnotatorConfig) -> Result<Self> {
        config.prepare_output_dir()?;
        let store = RecordStore::load_from_path(&config.data_path)?;
        Ok(Self::new(store, Persister::from_config(config)))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn schema(&self) -> &RationaleSchema {
        &self.schema
    }

    pub fn persister(&self) -> &Persister {
        &self.persister
    }

    pub fn current_index(&self) -> usize {
        self.navigator.current()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.navigator.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.navigator.has_previous()
    }

    pub fn current_view(&self, renderer: &dyn MoleculeRenderer) -> RecordView {
        self.view_at(self.navigator.current(), renderer)
    }

    fn view_at(&self, index: usize, renderer: &dyn MoleculeRenderer) -> RecordView {
        // The navigator keeps `index` inside the store.
        let record = &self.store.records()[index];
        build_record_view(record, index, &self.schema, renderer)
    }

    /// Fields of record `index` without depictions; does not move.
    pub fn peek(&self, index: usize) -> Result<RecordView> {
        let record = self.store.record(index)?;
        Ok(build_record_fields(record, index, &self.schema))
    }

    /// Moves by `delta` records (a no-op at the ends) and returns the view of
    /// the record now current.
    pub fn navigate(&mut self, delta: isize, renderer: &dyn MoleculeRenderer) -> RecordView {
        let index = self.navigator.move_by(delta);
        self.view_at(index, renderer)
    }

    pub fn save_current(&mut self, edit: &RecordEdit) -> Result<SaveReport> {
        self.save(self.navigator.current(), edit)
    }

    pub fn save(&mut self, index: usize, edit: &RecordEdit) -> Result<SaveReport> {
        self.persister
            .save(&mut self.store, &self.schema, index, edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule_render::TextCardRenderer;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    fn write_dataset(path: &std::path::Path) {
        let data = json!([
            {"src": "CCO", "tgt": "CC=O", "total_entity": 3, "error_entity": 0,
             "cot_result": "{\"reasoning\": \"oxidation\", \"issues\": \"none\"}"},
            {"src": "c1ccccc1", "tgt": "c1ccncc1", "total_entity": 5, "error_entity": 1,
             "cot_result": {"reasoning": "ring nitrogen"}},
            {"src": "N", "tgt": "NC", "cot_result": "not json at all"}
        ]);
        std::fs::write(path, data.to_string()).unwrap();
    }

    fn open(dir: &std::path::Path) -> Session {
        let data_path = dir.join("bench.json");
        write_dataset(&data_path);
        Session::open(&AnnotatorConfig::new(data_path, dir.join("annotated"))).unwrap()
    }

    #[test]
    fn test_schema_comes_from_first_record() {
        let dir = tempdir().unwrap();
        let session = open(dir.path());
        assert_eq!(session.schema().sections(), ["reasoning", "issues"]);
        assert!(dir.path().join("annotated").is_dir());
    }

    #[test]
    fn test_views_use_the_fixed_schema() {
        let dir = tempdir().unwrap();
        let mut session = open(dir.path());
        let view = session.navigate(1, &TextCardRenderer);
        assert_eq!(view.index, 1);
        assert_eq!(view.section_values, vec!["ring nitrogen", ""]);

        let view = session.navigate(1, &TextCardRenderer);
        assert_eq!(view.section_values, vec!["", ""]);
        assert_eq!(view.total_entity, 0);
    }

    #[test]
    fn test_review_scenario() {
        let dir = tempdir().unwrap();
        let mut session = open(dir.path());
        assert_eq!(session.current_index(), 0);

        session.navigate(1, &TextCardRenderer);
        let view = session.navigate(1, &TextCardRenderer);
        assert_eq!(view.index, 2);
        let view = session.navigate(1, &TextCardRenderer);
        assert_eq!(view.index, 2);
        let view = session.navigate(-1, &TextCardRenderer);
        assert_eq!(view.index, 1);

        let edit = RecordEdit {
            total_entity: 42,
            error_entity: view.error_entity,
            section_values: view.section_values.clone(),
        };
        let report = session.save_current(&edit).unwrap();
        assert_eq!(report.output_path, dir.path().join("annotated").join("bench_1.json"));

        let text = std::fs::read_to_string(&report.output_path).unwrap();
        assert!(text.contains("\"total_entity\": 42"));
        assert_eq!(session.store().record(1).unwrap().total_entity, 42);

        let view = session.current_view(&TextCardRenderer);
        assert_eq!(view.total_entity, 42);
        assert_eq!(view.section_values, vec!["ring nitrogen", ""]);
    }

    #[test]
    fn test_peek_does_not_move() {
        let dir = tempdir().unwrap();
        let session = open(dir.path());
        let view = session.peek(2).unwrap();
        assert_eq!(view.source.structure, "N");
        assert_eq!(session.current_index(), 0);
        assert!(session.peek(3).is_err());
    }

    #[test]
    fn test_save_then_reload_view() {
        let dir = tempdir().unwrap();
        let mut session = open(dir.path());
        let edit = RecordEdit {
            total_entity: 7,
            error_entity: 2,
            section_values: vec!["reviewed".into(), "stereo lost".into()],
        };
        session.save(0, &edit).unwrap();

        let saved: Value = serde_json::from_str(
            &std::fs::read_to_string(session.persister().output_path(0)).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["total_entity"], json!(7));
        assert_eq!(saved["error_entity"], json!(2));
        let cot: Value = serde_json::from_str(saved["cot_result"].as_str().unwrap()).unwrap();
        assert_eq!(cot, json!({"reasoning": "reviewed", "issues": "stereo lost"}));

        let view = session.current_view(&TextCardRenderer);
        assert_eq!(view.section_values, vec!["reviewed", "stereo lost"]);
    }
}
