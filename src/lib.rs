use lazy_static::lazy_static;
use translations::Translations;

pub mod about;
pub mod annotation_record;
pub mod app;
pub mod config;
pub mod error;
pub mod json_format;
pub mod logging;
pub mod molecule_render;
pub mod navigator;
pub mod persister;
pub mod rationale;
pub mod record_store;
pub mod record_view;
pub mod session;
pub mod translations;

lazy_static! {
    // Interface translations
    pub static ref TRANSLATIONS: Translations = Translations::default();
}
