//! Run entry points: one document in, one [`RunOutcome`] out.
//!
//! A [`Pipeline`] probes its backends once at construction and can then run
//! any number of documents. Each run is independent:
//!
//! ```text
//! Document ─▶ acquire ─▶ detect ─▶ source scheme ─▶ transliterate_all ─▶ RunOutput
//! ```

use crate::capability::Capabilities;
use crate::catalog::{self, engine_name};
use crate::config::{PipelineConfig, Profile};
use crate::detect::{detect_script, DetectionResult, ScriptTable};
use crate::document::{Document, DocumentKind};
use crate::error::TranslitError;
use crate::output::{RunOutcome, RunOutput, RunStats, SchemeOrigin};
use crate::pipeline::acquire::{acquire_text, ExtractedText};
use crate::pipeline::input;
use crate::pipeline::ocr::OcrEngine;
use crate::translit::transliterate_all;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Script guess plus the source scheme it led to.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub detection: DetectionResult,
    pub source_scheme: String,
    pub scheme_origin: SchemeOrigin,
}

/// What `--detect-only` reports.
#[derive(Debug, Clone, Serialize)]
pub struct DetectReport {
    pub document: String,
    pub extracted: ExtractedText,
    /// `None` when the document held no text.
    pub classification: Option<Classification>,
}

/// A configured, probed pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    caps: Capabilities,
    table: ScriptTable,
}

impl Pipeline {
    /// Probe the configured backends and build the classification table.
    ///
    /// # Errors
    /// Fails when the transliteration backend does not answer its probe or
    /// the profile's range table is malformed. A missing OCR engine is not
    /// an error here.
    pub async fn new(config: PipelineConfig) -> Result<Self, TranslitError> {
        let caps = Capabilities::probe(&config).await?;
        Self::with_capabilities(config, caps)
    }

    /// Build a pipeline for [`Pipeline::detect_only`].
    ///
    /// Only the OCR engine is probed, so detection works while the
    /// transliteration backend is unreachable. [`Pipeline::run`] on the
    /// result dispatches to an unchecked backend.
    pub async fn for_detection(config: PipelineConfig) -> Result<Self, TranslitError> {
        let caps = Capabilities::probe_for_detection(&config).await?;
        Self::with_capabilities(config, caps)
    }

    /// Build a pipeline around capabilities that were resolved elsewhere.
    pub fn with_capabilities(
        config: PipelineConfig,
        caps: Capabilities,
    ) -> Result<Self, TranslitError> {
        let table = ScriptTable::new(config.profile.script_ranges())?;
        debug!(
            "Pipeline ready: profile={}, backend={}, {} script ranges",
            config.profile.as_str(),
            caps.backend().name(),
            table.ranges().len()
        );
        Ok(Self {
            config,
            caps,
            table,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn table(&self) -> &ScriptTable {
        &self.table
    }

    /// Resolve a path or URL and run it.
    pub async fn run_input(&self, input_str: &str) -> Result<RunOutcome, TranslitError> {
        if self.config.targets.is_empty() {
            return Err(TranslitError::NoTargetsSelected);
        }
        let document = input::resolve_input(input_str, self.config.download_timeout_secs).await?;
        self.run(&document).await
    }

    /// Acquire, classify and transliterate one document.
    ///
    /// Per-target failures are recorded in the returned [`RunOutput`]; only
    /// input, acquisition and OCR failures are returned as `Err`.
    pub async fn run(&self, document: &Document) -> Result<RunOutcome, TranslitError> {
        let total_start = Instant::now();
        if self.config.targets.is_empty() {
            return Err(TranslitError::NoTargetsSelected);
        }

        let extracted = self.acquire(document).await?;
        if extracted.is_blank() {
            warn!("No text found in {}", document.name());
            return Ok(RunOutcome::NoText {
                document: document.name().to_string(),
                extracted,
            });
        }

        let classification = self.classify(&extracted.text);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_detected(
                classification.detection.name(),
                &classification.source_scheme,
            );
        }

        let dispatch_start = Instant::now();
        let outputs = transliterate_all(
            self.caps.backend(),
            &classification.source_scheme,
            &self.config.targets,
            &extracted.text,
            self.config.progress_callback.as_ref(),
        )
        .await?;
        let dispatch_duration_ms = dispatch_start.elapsed().as_millis() as u64;

        let succeeded = outputs.iter().filter(|o| o.is_ok()).count();
        let stats = RunStats {
            total_targets: outputs.len(),
            succeeded,
            failed: outputs.len() - succeeded,
            acquire_duration_ms: extracted.duration_ms,
            dispatch_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_run_complete(stats.total_targets, stats.succeeded);
        }
        info!(
            "Run complete for {}: {}/{} targets succeeded in {}ms",
            document.name(),
            stats.succeeded,
            stats.total_targets,
            stats.total_duration_ms
        );

        Ok(RunOutcome::Transliterated(RunOutput {
            document: document.name().to_string(),
            extracted,
            detection: classification.detection,
            source_scheme: classification.source_scheme,
            scheme_origin: classification.scheme_origin,
            outputs,
            stats,
        }))
    }

    /// Extract text only. OCR is required for images and PDFs; if the probe
    /// found no usable engine its recorded error is returned.
    pub async fn acquire(&self, document: &Document) -> Result<ExtractedText, TranslitError> {
        let ocr: Option<&dyn OcrEngine> = match document.kind() {
            DocumentKind::Text => None,
            _ => Some(self.caps.ocr().map_err(|e| TranslitError::Ocr(e.clone()))?),
        };
        acquire_text(document, ocr, &self.config).await
    }

    /// Detect the script of `text` and settle the source scheme.
    ///
    /// A configured `source_scheme` wins over inference.
    pub fn classify(&self, text: &str) -> Classification {
        let detection = detect_script(text, &self.table);
        let (source_scheme, scheme_origin) = match self.chosen_scheme() {
            Some(scheme) => (scheme, SchemeOrigin::Chosen),
            None => (
                self.config.profile.scheme_map().infer(&detection).to_string(),
                SchemeOrigin::Inferred,
            ),
        };
        debug!(
            "Detected {} ({}/{} chars matched), source scheme {} ({:?})",
            detection.name(),
            detection.matched_chars,
            detection.total_chars,
            source_scheme,
            scheme_origin
        );
        Classification {
            detection,
            source_scheme,
            scheme_origin,
        }
    }

    /// Acquire and classify without dispatching any target.
    pub async fn detect_only(&self, document: &Document) -> Result<DetectReport, TranslitError> {
        let extracted = self.acquire(document).await?;
        let classification = if extracted.is_blank() {
            None
        } else {
            Some(self.classify(&extracted.text))
        };
        Ok(DetectReport {
            document: document.name().to_string(),
            extracted,
            classification,
        })
    }

    fn chosen_scheme(&self) -> Option<String> {
        let wanted = self.config.source_scheme.as_deref()?;
        let canonical = catalog::lookup(self.config.profile.source_schemes(), wanted)
            .map(str::to_string)
            .unwrap_or_else(|| engine_name(wanted));
        Some(canonical)
    }
}

/// Targets offered by `profile`, in catalog order.
pub fn list_targets(profile: Profile) -> &'static [&'static str] {
    profile.target_catalog()
}

/// Build a pipeline for `config` and run `input_str` through it.
///
/// Convenience for one-shot callers; reuse a [`Pipeline`] to avoid probing
/// the backends for every document.
pub async fn transliterate_input(
    input_str: impl AsRef<str>,
    config: &PipelineConfig,
) -> Result<RunOutcome, TranslitError> {
    let pipeline = Pipeline::new(config.clone()).await?;
    pipeline.run_input(input_str.as_ref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, TransliterationError};
    use crate::progress::{ProgressCallback, RunProgressCallback};
    use crate::translit::{SanscriptEngine, TransliterationBackend, TransliterationRequest};
    use async_trait::async_trait;
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TransliterationBackend for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        async fn probe(&self) -> Result<(), TransliterationError> {
            Ok(())
        }
        async fn transliterate(
            &self,
            request: &TransliterationRequest,
        ) -> Result<String, TransliterationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{}→{}", request.source, request.target))
        }
    }

    struct FixedOcr(&'static str);

    #[async_trait]
    impl OcrEngine for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn is_available(&self) -> bool {
            true
        }
        async fn recognize(
            &self,
            _image: &DynamicImage,
            _hint: Option<&str>,
        ) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct Events {
        detected: Mutex<Option<(String, String)>>,
        completed: AtomicUsize,
    }

    impl RunProgressCallback for Events {
        fn on_detected(&self, script: &str, source_scheme: &str) {
            *self.detected.lock().unwrap() = Some((script.into(), source_scheme.into()));
        }
        fn on_run_complete(&self, _total: usize, success_count: usize) {
            self.completed.store(success_count, Ordering::SeqCst);
        }
    }

    fn missing_ocr() -> Result<Arc<dyn OcrEngine>, OcrError> {
        Err(OcrError::EngineUnavailable {
            engine: "tesseract".into(),
            hint: "not installed".into(),
        })
    }

    fn builtin_pipeline(config: PipelineConfig) -> Pipeline {
        let caps = Capabilities::from_parts(Arc::new(SanscriptEngine::new()), missing_ocr());
        Pipeline::with_capabilities(config, caps).unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        DynamicImage::new_rgb8(4, 4)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn itrans_text_runs_end_to_end() {
        let events = Arc::new(Events::default());
        let config = PipelineConfig::builder()
            .progress_callback(events.clone() as ProgressCallback)
            .build()
            .unwrap();
        let pipeline = builtin_pipeline(config);
        let doc = Document::new("greeting.txt", None, b"namaste".to_vec()).unwrap();

        let out = pipeline.run(&doc).await.unwrap().into_output().unwrap();
        assert_eq!(out.detection.name(), "Latin");
        assert_eq!(out.source_scheme, "ITRANS");
        assert_eq!(out.scheme_origin, SchemeOrigin::Inferred);
        assert_eq!(out.get("DEVANAGARI").and_then(|o| o.text()), Some("नमस्ते"));
        assert_eq!(out.stats.succeeded, 2);
        assert_eq!(events.completed.load(Ordering::SeqCst), 2);
        assert_eq!(
            *events.detected.lock().unwrap(),
            Some(("Latin".to_string(), "ITRANS".to_string()))
        );
    }

    #[tokio::test]
    async fn devanagari_input_infers_its_own_scheme() {
        let pipeline = builtin_pipeline(
            PipelineConfig::builder().targets(["IAST"]).build().unwrap(),
        );
        let doc = Document::new("d.txt", None, "नमस्ते".as_bytes().to_vec()).unwrap();
        let out = pipeline.run(&doc).await.unwrap().into_output().unwrap();
        assert_eq!(out.source_scheme, "DEVANAGARI");
        assert_eq!(out.outputs[0].text(), Some("namaste"));
    }

    #[tokio::test]
    async fn chosen_scheme_overrides_detection() {
        let pipeline = builtin_pipeline(
            PipelineConfig::builder()
                .source_scheme("hk")
                .targets(["DEVANAGARI"])
                .build()
                .unwrap(),
        );
        let doc = Document::new("hk.txt", None, b"saMskRtam".to_vec()).unwrap();
        let out = pipeline.run(&doc).await.unwrap().into_output().unwrap();
        assert_eq!(out.source_scheme, "HK");
        assert_eq!(out.scheme_origin, SchemeOrigin::Chosen);
        assert_eq!(out.outputs[0].text(), Some("संस्कृतम्"));
    }

    #[tokio::test]
    async fn blank_text_is_no_text_and_dispatches_nothing() {
        let backend = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let caps = Capabilities::from_parts(backend.clone(), missing_ocr());
        let pipeline = Pipeline::with_capabilities(PipelineConfig::default(), caps).unwrap();
        let doc = Document::new("blank.txt", None, b" \n\t ".to_vec()).unwrap();

        let outcome = pipeline.run(&doc).await.unwrap();
        assert!(outcome.is_no_text());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_targets_fail_before_acquisition() {
        let backend = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let caps = Capabilities::from_parts(backend.clone(), missing_ocr());
        let config = PipelineConfig::builder()
            .targets(Vec::<String>::new())
            .build()
            .unwrap();
        let pipeline = Pipeline::with_capabilities(config, caps).unwrap();
        // An image would need OCR; the target check must come first.
        let doc = Document::new("scan.png", None, png_bytes()).unwrap();

        let err = pipeline.run(&doc).await.unwrap_err();
        assert!(matches!(err, TranslitError::NoTargetsSelected));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn image_without_ocr_reports_recorded_error() {
        let pipeline = builtin_pipeline(PipelineConfig::default());
        let doc = Document::new("scan.png", None, png_bytes()).unwrap();
        let err = pipeline.run(&doc).await.unwrap_err();
        assert!(matches!(
            err,
            TranslitError::Ocr(OcrError::EngineUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn image_is_ocrd_then_transliterated() {
        let caps = Capabilities::from_parts(
            Arc::new(SanscriptEngine::new()),
            Ok(Arc::new(FixedOcr("namaste"))),
        );
        let pipeline = Pipeline::with_capabilities(
            PipelineConfig::builder().targets(["DEVANAGARI"]).build().unwrap(),
            caps,
        )
        .unwrap();
        let doc = Document::new("scan.png", None, png_bytes()).unwrap();
        let out = pipeline.run(&doc).await.unwrap().into_output().unwrap();
        assert_eq!(out.outputs[0].text(), Some("नमस्ते"));
    }

    #[tokio::test]
    async fn detect_only_makes_no_backend_calls() {
        let backend = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let caps = Capabilities::from_parts(backend.clone(), missing_ocr());
        let pipeline = Pipeline::with_capabilities(PipelineConfig::default(), caps).unwrap();
        let doc = Document::new("t.txt", None, "তুমি".as_bytes().to_vec()).unwrap();

        let report = pipeline.detect_only(&doc).await.unwrap();
        let class = report.classification.unwrap();
        assert_eq!(class.detection.name(), "Bengali");
        assert_eq!(class.source_scheme, "BENGALI");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    struct Unreachable;

    #[async_trait]
    impl TransliterationBackend for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }
        async fn probe(&self) -> Result<(), TransliterationError> {
            Err(TransliterationError::BackendUnavailable {
                backend: "unreachable".into(),
                detail: "connection refused".into(),
            })
        }
        async fn transliterate(
            &self,
            _request: &TransliterationRequest,
        ) -> Result<String, TransliterationError> {
            Err(TransliterationError::EngineFailed {
                engine: "unreachable".into(),
                message: "connection refused".into(),
            })
        }
    }

    #[tokio::test]
    async fn detection_works_while_backend_is_down() {
        let config = PipelineConfig::builder()
            .transliterator(Arc::new(Unreachable))
            .tesseract_path("/nonexistent/tesseract")
            .build()
            .unwrap();
        assert!(Pipeline::new(config.clone()).await.is_err());

        let pipeline = Pipeline::for_detection(config).await.unwrap();
        let doc = Document::new("t.txt", None, "தமிழ்".as_bytes().to_vec()).unwrap();
        let report = pipeline.detect_only(&doc).await.unwrap();
        assert_eq!(report.classification.unwrap().detection.name(), "Tamil");
    }

    #[test]
    fn list_targets_follows_profile() {
        assert!(list_targets(Profile::Indic).contains(&"TAMIL"));
        assert!(list_targets(Profile::Aksharamukha).contains(&"Devanagari"));
    }
}
