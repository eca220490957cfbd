//! Write-through saving of reviewed records.

use crate::{
    config::AnnotatorConfig,
    error::{AnnotatorError, Result},
    json_format,
    rationale::RationaleSchema,
    record_store::RecordStore,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SAVE_STATUS: &str = "Changes saved successfully!";

/// Values collected from the editor widgets for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEdit {
    pub total_entity: i64,
    pub error_entity: i64,
    pub section_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub index: usize,
    pub output_path: PathBuf,
    pub rewrote_input: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Persister {
    output_dir: PathBuf,
    benchmark_name: String,
    rewrite_input: bool,
}

impl Persister {
    pub fn new(output_dir: impl Into<PathBuf>, benchmark_name: &str) -> Self {
        Self {
            output_dir: output_dir.into(),
            benchmark_name: benchmark_name.to_string(),
            rewrite_input: false,
        }
    }

    pub fn from_config(config: &AnnotatorConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            benchmark_name: config.benchmark_name(),
            rewrite_input: config.rewrite_input,
        }
    }

    pub fn with_rewrite_input(mut self, rewrite_input: bool) -> Self {
        self.rewrite_input = rewrite_input;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn benchmark_name(&self) -> &str {
        &self.benchmark_name
    }

    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_{index}.json", self.benchmark_name))
    }

    /// Merges `edit` into record `index`, writes the record to its own file
    /// and updates the store. The input file is only rewritten when
    /// `rewrite_input` is set.
    pub fn save(
        &self,
        store: &mut RecordStore,
        schema: &RationaleSchema,
        index: usize,
        edit: &RecordEdit,
    ) -> Result<SaveReport> {
        let mut record = store.record(index)?.clone();
        record.total_entity = edit.total_entity;
        record.error_entity = edit.error_entity;
        record.rationale = schema.to_rationale(&edit.section_values)?;

        let output_path = self.output_path(index);
        let text = json_format::to_indented_string(&store.merged_document(index, &record)?)?;
        std::fs::write(&output_path, text).map_err(|e| AnnotatorError::io(&output_path, e))?;

        store.replace(index, record)?;
        info!(index, path = %output_path.display(), "saved record");

        if self.rewrite_input {
            let input_path = store.path().to_path_buf();
            store.save_to_path(&input_path)?;
            info!(path = %input_path.display(), "rewrote input dataset");
        }

        Ok(SaveReport {
            index,
            output_path,
            rewrote_input: self.rewrite_input,
            message: SAVE_STATUS.to_string(),
        })
    }
}
