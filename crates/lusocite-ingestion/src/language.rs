//! Title language identification.
//!
//! Labels follow the fastText `lid.176` convention (`__label__pt`,
//! `__label__en`, …) whichever backend produced them, so snapshots written
//! by either backend are interchangeable.

use std::path::Path;

use lusocite_common::{LusociteError, Result};

use crate::models::Publication;

pub const LABEL_PREFIX: &str = "__label__";
pub const UNDETERMINED: &str = "__label__und";

/// A top-1 language identifier.
pub trait LanguageModel {
    fn predict(&self, text: &str) -> String;
}

/// Title with any bracketed annotation (`[in Portuguese]`, …) removed.
pub fn strip_annotation(title: &str) -> &str {
    match title.find('[') {
        Some(i) => &title[..i],
        None    => title,
    }
}

pub fn classify_title(model: &dyn LanguageModel, title: &str) -> String {
    model.predict(strip_annotation(title).trim())
}

/// Tag `publication` with the language of its title.
pub fn classify_publication(model: &dyn LanguageModel, publication: &mut Publication) {
    publication.language = Some(classify_title(model, &publication.info.title));
}

pub fn is_portuguese(label: &str) -> bool {
    let code = label.strip_prefix(LABEL_PREFIX).unwrap_or(label).to_ascii_lowercase();
    code == "pt" || code == "pt-br" || code == "por"
}

pub fn is_english(label: &str) -> bool {
    let code = label.strip_prefix(LABEL_PREFIX).unwrap_or(label).to_ascii_lowercase();
    code == "en" || code == "eng"
}

// ── whatlang ────────────────────────────────────────────────────────────────

/// Pure-Rust trigram detector; no model file needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangModel;

impl LanguageModel for WhatlangModel {
    fn predict(&self, text: &str) -> String {
        match whatlang::detect(text) {
            Some(info) => format!("{LABEL_PREFIX}{}", short_code(info.lang())),
            None       => UNDETERMINED.to_string(),
        }
    }
}

/// ISO 639-1 where fastText uses it, else whatlang's 639-3 code.
fn short_code(lang: whatlang::Lang) -> &'static str {
    use whatlang::Lang;
    match lang {
        Lang::Por => "pt",
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        other     => other.code(),
    }
}

// ── fastText ────────────────────────────────────────────────────────────────

#[cfg(feature = "fasttext")]
pub struct FastTextModel {
    model: fasttext::FastText,
}

#[cfg(feature = "fasttext")]
impl FastTextModel {
    pub fn load(path: &Path) -> Result<Self> {
        let mut model = fasttext::FastText::new();
        let path_str = path
            .to_str()
            .ok_or_else(|| LusociteError::Config(format!("non UTF-8 model path {}", path.display())))?;
        model
            .load_model(path_str)
            .map_err(|e| LusociteError::Config(format!("cannot load {}: {e}", path.display())))?;
        Ok(Self { model })
    }
}

#[cfg(feature = "fasttext")]
impl LanguageModel for FastTextModel {
    fn predict(&self, text: &str) -> String {
        match self.model.predict(text, 1, 0.0) {
            Ok(predictions) => predictions
                .into_iter()
                .next()
                .map(|p| p.label)
                .unwrap_or_else(|| UNDETERMINED.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "fastText prediction failed");
                UNDETERMINED.to_string()
            }
        }
    }
}

/// Backend named in configuration.
pub fn load_model(backend: &str, fasttext_model: &Path) -> Result<Box<dyn LanguageModel>> {
    match backend {
        "whatlang" => Ok(Box::new(WhatlangModel)),
        #[cfg(feature = "fasttext")]
        "fasttext" => Ok(Box::new(FastTextModel::load(fasttext_model)?)),
        #[cfg(not(feature = "fasttext"))]
        "fasttext" => Err(LusociteError::Config(format!(
            "language backend fasttext ({}) needs the `fasttext` feature",
            fasttext_model.display()
        ))),
        other => Err(LusociteError::Config(format!("unknown language backend {other}"))),
    }
}
