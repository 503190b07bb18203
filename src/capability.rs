//! One-time availability check of the optional backends.
//!
//! Probing happens when a [`crate::Pipeline`] is built, never per document:
//!
//! * the transliteration backend must answer its probe, or construction fails.
//!   [`Capabilities::probe_for_detection`] skips this step for runs that never
//!   transliterate;
//! * the OCR engine may be missing. That is recorded and only reported when a
//!   document actually needs OCR, so plain-text runs work on machines without
//!   tesseract or an API key.

use crate::config::PipelineConfig;
use crate::error::{OcrError, TranslitError};
use crate::pipeline::ocr::{build_ocr_engine, OcrEngine};
use crate::translit::{build_backend, TransliterationBackend};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Backends resolved and probed for one pipeline.
#[derive(Clone)]
pub struct Capabilities {
    backend: Arc<dyn TransliterationBackend>,
    ocr: Result<Arc<dyn OcrEngine>, OcrError>,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("backend", &self.backend.name())
            .field("ocr", &self.ocr.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

/// Printable summary of [`Capabilities`].
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport {
    pub transliteration_backend: String,
    pub ocr_engine: Option<String>,
    pub ocr_unavailable_reason: Option<String>,
}

impl Capabilities {
    /// Build and probe both backends.
    pub async fn probe(config: &PipelineConfig) -> Result<Self, TranslitError> {
        let backend = build_backend(config)?;
        backend.probe().await?;
        info!("Transliteration backend '{}' is available", backend.name());

        let ocr = probe_ocr(config).await;
        Ok(Self { backend, ocr })
    }

    /// Probe only the OCR engine. The backend is built but never contacted.
    ///
    /// For callers that acquire and classify text without transliterating it.
    pub async fn probe_for_detection(config: &PipelineConfig) -> Result<Self, TranslitError> {
        let backend = build_backend(config)?;
        debug!("Skipping probe of backend '{}'", backend.name());
        let ocr = probe_ocr(config).await;
        Ok(Self { backend, ocr })
    }

    /// Assemble capabilities from already-built parts without probing.
    pub fn from_parts(
        backend: Arc<dyn TransliterationBackend>,
        ocr: Result<Arc<dyn OcrEngine>, OcrError>,
    ) -> Self {
        Self { backend, ocr }
    }

    pub fn backend(&self) -> &dyn TransliterationBackend {
        self.backend.as_ref()
    }

    /// The OCR engine, or the reason it cannot be used.
    pub fn ocr(&self) -> Result<&dyn OcrEngine, &OcrError> {
        self.ocr.as_ref().map(|e| e.as_ref())
    }

    pub fn report(&self) -> CapabilityReport {
        CapabilityReport {
            transliteration_backend: self.backend.name().to_string(),
            ocr_engine: self.ocr.as_ref().ok().map(|e| e.name().to_string()),
            ocr_unavailable_reason: self.ocr.as_ref().err().map(|e| e.to_string()),
        }
    }
}

async fn probe_ocr(config: &PipelineConfig) -> Result<Arc<dyn OcrEngine>, OcrError> {
    let ocr = match build_ocr_engine(config) {
        Ok(engine) => {
            if engine.is_available().await {
                info!("OCR engine '{}' is available", engine.name());
                Ok(engine)
            } else {
                Err(OcrError::EngineUnavailable {
                    engine: engine.name().to_string(),
                    hint: format!(
                        "'{}' did not respond. Install tesseract-ocr with the language \
                         data you need, or pass --tesseract <PATH>.",
                        config.tesseract_path.display()
                    ),
                })
            }
        }
        Err(e) => Err(e),
    };
    if let Err(ref e) = ocr {
        warn!("OCR disabled for this run: {}", e);
    }
    ocr
}
