//! Translation of recognized region texts.
//!
//! The translation backend is an external collaborator behind the
//! [`Translator`] trait; it receives the page's texts as one ordered batch so
//! the backend can use surrounding lines as context. A failed call leaves
//! every `translated_text` empty rather than failing the page.

use std::sync::Mutex;

use crate::core::config::TranslationConfig;
use crate::core::errors::PipelineError;
use crate::domain::region::Region;

/// The translation collaborator.
pub trait Translator: Send {
    /// Translates an ordered batch of texts.
    ///
    /// The returned vector must align one-to-one with `texts`.
    fn translate(
        &mut self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
        model: &str,
    ) -> Result<Vec<String>, PipelineError>;
}

/// Translates all regions in place, filling `translated_text`.
pub(crate) fn translate_regions<T: Translator>(
    translator: &Mutex<T>,
    regions: &mut [Region],
    source_language: &str,
    config: &TranslationConfig,
) {
    if regions.is_empty() {
        return;
    }

    let texts: Vec<String> = regions.iter().map(|r| r.original_text.clone()).collect();

    let outcome = {
        let mut session = translator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        session.translate(
            &texts,
            source_language,
            &config.target_language,
            &config.model,
        )
    };

    match outcome {
        Ok(translations) => {
            if translations.len() != regions.len() {
                tracing::warn!(
                    expected = regions.len(),
                    got = translations.len(),
                    "translator returned a misaligned batch"
                );
            }
            for (region, translation) in regions.iter_mut().zip(translations) {
                region.translated_text = translation;
            }
            tracing::info!(texts = regions.len(), "page translated");
        }
        Err(error) => {
            tracing::warn!(error = %error, "translation failed, leaving texts untranslated");
        }
    }
}
