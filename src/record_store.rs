use crate::{
    annotation_record::AnnotationRecord,
    error::{AnnotatorError, Result},
    json_format,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// The records of one dataset file, addressed by position.
///
/// Each record keeps the JSON object it was read from. Writing the dataset
/// back reproduces untouched records exactly; replaced records are merged
/// over their original object.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<AnnotationRecord>,
    documents: Vec<Map<String, Value>>,
}

impl RecordStore {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AnnotatorError::io(path, e))?;
        let documents: Vec<Map<String, Value>> =
            serde_json::from_str(&text).map_err(|e| AnnotatorError::json(path, e))?;
        let records = documents
            .iter()
            .map(|document| serde_json::from_value(Value::Object(document.clone())))
            .collect::<serde_json::Result<Vec<AnnotationRecord>>>()
            .map_err(|e| AnnotatorError::json(path, e))?;
        let store = Self::with_documents(path.to_path_buf(), records, documents)?;
        info!(
            path = %path.display(),
            records = store.len(),
            "loaded annotation dataset"
        );
        Ok(store)
    }

    pub fn from_records(path: impl Into<PathBuf>, records: Vec<AnnotationRecord>) -> Result<Self> {
        let documents = records
            .iter()
            .map(AnnotationRecord::to_document)
            .collect::<serde_json::Result<Vec<_>>>()?;
        Self::with_documents(path.into(), records, documents)
    }

    fn with_documents(
        path: PathBuf,
        records: Vec<AnnotationRecord>,
        documents: Vec<Map<String, Value>>,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(AnnotatorError::EmptyDataset { path });
        }
        Ok(Self {
            path,
            records,
            documents,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&AnnotationRecord> {
        self.records.get(index)
    }

    pub fn record(&self, index: usize) -> Result<&AnnotationRecord> {
        self.records.get(index).ok_or_else(|| self.out_of_range(index))
    }

    /// The JSON object stored for record `index`.
    pub fn document(&self, index: usize) -> Result<&Map<String, Value>> {
        self.documents.get(index).ok_or_else(|| self.out_of_range(index))
    }

    pub fn first(&self) -> &AnnotationRecord {
        // from_records rejects empty datasets
        &self.records[0]
    }

    /// The object `record` would be stored as at `index`, without storing it.
    pub fn merged_document(
        &self,
        index: usize,
        record: &AnnotationRecord,
    ) -> Result<Map<String, Value>> {
        let mut document = self.document(index)?.clone();
        record.merge_into(&mut document)?;
        Ok(document)
    }

    pub fn replace(&mut self, index: usize, record: AnnotationRecord) -> Result<()> {
        let document = self.merged_document(index, &record)?;
        self.records[index] = record;
        self.documents[index] = document;
        Ok(())
    }

    /// Rewrites the whole dataset, overwriting `path`.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = json_format::to_indented_string(&self.documents)?;
        std::fs::write(path, text).map_err(|e| AnnotatorError::io(path, e))
    }

    fn out_of_range(&self, index: usize) -> AnnotatorError {
        AnnotatorError::OutOfRange {
            index,
            len: self.records.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bench.json");
        let data = json!([
            {"src": "C", "tgt": "CC", "cot_result": "{\"a\": \"1\"}"},
            {"src": "CC", "tgt": "CCC", "total_entity": 5, "error_entity": 2}
        ]);
        std::fs::write(&path, data.to_string()).unwrap();

        let store = RecordStore::load_from_path(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.record(1).unwrap().total_entity, 5);
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            RecordStore::load_from_path(&path),
            Err(AnnotatorError::EmptyDataset { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            RecordStore::load_from_path(dir.path().join("missing.json")),
            Err(AnnotatorError::Io { .. })
        ));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{\"src\": ").unwrap();
        assert!(matches!(
            RecordStore::load_from_path(&path),
            Err(AnnotatorError::Json { .. })
        ));
    }

    #[test]
    fn test_replace_out_of_range() {
        let mut store =
            RecordStore::from_records("x.json", vec![AnnotationRecord::new("C", "CC")]).unwrap();
        let err = store
            .replace(3, AnnotationRecord::new("N", "NN"))
            .unwrap_err();
        assert!(matches!(err, AnnotatorError::OutOfRange { index: 3, len: 1 }));
        store.replace(0, AnnotationRecord::new("N", "NN")).unwrap();
        assert_eq!(store.first().source_structure, "N");
    }

    #[test]
    fn test_save_to_path_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let store = RecordStore::from_records(
            &path,
            vec![AnnotationRecord::new("C", "CC"), AnnotationRecord::new("O", "OO")],
        )
        .unwrap();
        store.save_to_path(&path).unwrap();
        let reloaded = RecordStore::load_from_path(&path).unwrap();
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn test_untouched_records_are_written_back_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bench.json");
        let data = json!([
            {"id": "r0", "src": "C", "tgt": "CC", "cot_result": "{\"a\": \"1\"}"},
            {"id": "r1", "src": "N", "tgt": "NN", "total_entity": null, "error_entity": 42.5}
        ]);
        std::fs::write(&path, data.to_string()).unwrap();

        let mut store = RecordStore::load_from_path(&path).unwrap();
        let mut edited = store.record(0).unwrap().clone();
        edited.total_entity = 4;
        store.replace(0, edited).unwrap();
        store.save_to_path(&path).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[1], data[1]);
        assert_eq!(written[0]["total_entity"], json!(4));
        assert_eq!(written[0]["id"], json!("r0"));
        assert_eq!(store.document(0).unwrap().keys().next().map(String::as_str), Some("id"));
    }

    #[test]
    fn test_non_object_entry_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bench.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            RecordStore::load_from_path(&path),
            Err(AnnotatorError::Json { .. })
        ));
    }
}
