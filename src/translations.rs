//! UI label catalogs and language selection.

use csv::ReaderBuilder;
use std::collections::HashMap;

pub struct Translations {
    values: HashMap<String, String>,
    language: String,
}

impl Translations {
    fn from_text(csv_text: &str) -> Self {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_text.as_bytes());

        let mut languages = rdr
            .headers()
            .map(Self::to_vec)
            .unwrap_or_default();
        if !languages.is_empty() {
            let _ = languages.remove(0); // key column
        }

        let mut values = HashMap::new();
        for record in rdr.records().flatten() {
            let mut record = Self::to_vec(&record);
            if record.is_empty() {
                continue;
            }
            let key = record.remove(0);
            for (lnum, t) in record.iter().enumerate() {
                if let Some(language) = languages.get(lnum) {
                    values.insert(format!("{language}:{key}"), t.to_owned());
                }
            }
        }

        Self {
            values,
            language: "en".to_owned(),
        }
    }

    pub fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Label for `key` in the current language; the key itself if missing.
    pub fn get(&self, key: &str) -> String {
        self.values
            .get(&format!("{}:{key}", self.language))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn to_vec(record: &csv::StringRecord) -> Vec<String> {
        record.iter().map(|s| s.to_string()).collect()
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::from_text(include_str!("../assets/translations.csv"))
    }
}
