//! Integration tests for the full run, driven through the public API with
//! mock OCR engines and transliteration backends. No network, no tesseract,
//! no pdfium.

use async_trait::async_trait;
use edgequake_translit::{
    Capabilities, Detected, Document, DocumentKind, OcrEngine, OcrError, Pipeline,
    PipelineConfig, Profile, RunOutcome, RunProgressCallback, SchemeOrigin, TranslitError,
    TransliterationBackend, TransliterationError, TransliterationRequest,
};
use image::DynamicImage;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Mocks ────────────────────────────────────────────────────────────────────

/// Records every request and rejects targets listed in `reject`.
#[derive(Default)]
struct ScriptedBackend {
    reject: Vec<&'static str>,
    requests: Mutex<Vec<TransliterationRequest>>,
}

#[async_trait]
impl TransliterationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn probe(&self) -> Result<(), TransliterationError> {
        Ok(())
    }

    async fn transliterate(
        &self,
        request: &TransliterationRequest,
    ) -> Result<String, TransliterationError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.reject.contains(&request.target.as_str()) {
            return Err(TransliterationError::EngineFailed {
                engine: "scripted".into(),
                message: format!("no mapping for {}", request.target),
            });
        }
        Ok(format!("<{}>{}", request.target, request.text))
    }
}

/// Returns one canned string per call, in order, and records the hint.
struct CannedOcr {
    pages: Vec<&'static str>,
    next: AtomicUsize,
    hints: Mutex<Vec<Option<String>>>,
}

impl CannedOcr {
    fn new(pages: Vec<&'static str>) -> Self {
        Self {
            pages,
            next: AtomicUsize::new(0),
            hints: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OcrEngine for CannedOcr {
    fn name(&self) -> &str {
        "canned"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(
        &self,
        _image: &DynamicImage,
        language_hint: Option<&str>,
    ) -> Result<String, OcrError> {
        self.hints
            .lock()
            .unwrap()
            .push(language_hint.map(str::to_string));
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.get(i).copied().unwrap_or_default().to_string())
    }
}

#[derive(Default)]
struct TargetLog {
    events: Mutex<Vec<String>>,
}

impl RunProgressCallback for TargetLog {
    fn on_target_complete(&self, target: &str, _len: usize) {
        self.events.lock().unwrap().push(format!("ok:{target}"));
    }

    fn on_target_error(&self, target: &str, _error: &str) {
        self.events.lock().unwrap().push(format!("err:{target}"));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn no_ocr() -> Result<Arc<dyn OcrEngine>, OcrError> {
    Err(OcrError::EngineUnavailable {
        engine: "tesseract".into(),
        hint: "not installed in the test environment".into(),
    })
}

fn pipeline_with(
    config: PipelineConfig,
    backend: Arc<dyn TransliterationBackend>,
    ocr: Result<Arc<dyn OcrEngine>, OcrError>,
) -> Pipeline {
    Pipeline::with_capabilities(config, Capabilities::from_parts(backend, ocr)).unwrap()
}

fn tiny_png() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(8, 8)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn text_doc(name: &str, text: &str) -> Document {
    Document::new(name, None, text.as_bytes().to_vec()).unwrap()
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_target_does_not_block_the_others() {
    let backend = Arc::new(ScriptedBackend {
        reject: vec!["Thai"],
        ..Default::default()
    });
    let log = Arc::new(TargetLog::default());
    let config = PipelineConfig::builder()
        .profile(Profile::Aksharamukha)
        .targets(["Devanagari", "Thai", "Tamil"])
        .progress_callback(log.clone())
        .build()
        .unwrap();
    let pipeline = pipeline_with(config, backend.clone(), no_ocr());

    let out = pipeline
        .run(&text_doc("note.txt", "hello"))
        .await
        .unwrap()
        .into_output()
        .unwrap();

    assert_eq!(out.source_scheme, "Roman");
    let targets: Vec<&str> = out.outputs.iter().map(|o| o.target.as_str()).collect();
    assert_eq!(targets, ["Devanagari", "Thai", "Tamil"]);
    assert_eq!(out.outputs[0].text(), Some("<Devanagari>hello"));
    assert_eq!(
        out.outputs[1].rendered_text(),
        "[ERROR transliteration to Thai: scripted: no mapping for Thai]"
    );
    assert_eq!(out.outputs[2].text(), Some("<Tamil>hello"));
    assert_eq!(out.stats.failed, 1);
    assert_eq!(out.failed_targets().count(), 1);
    assert_eq!(
        *log.events.lock().unwrap(),
        ["ok:Devanagari", "err:Thai", "ok:Tamil"]
    );
}

#[tokio::test]
async fn zero_targets_make_no_backend_calls() {
    let backend = Arc::new(ScriptedBackend::default());
    let config = PipelineConfig::builder()
        .targets(Vec::<String>::new())
        .build()
        .unwrap();
    let pipeline = pipeline_with(config, backend.clone(), no_ocr());

    let err = pipeline
        .run(&text_doc("x.txt", "namaste"))
        .await
        .unwrap_err();
    assert!(matches!(err, TranslitError::NoTargetsSelected));
    assert!(backend.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn display_names_reach_the_backend_normalised() {
    let backend = Arc::new(ScriptedBackend::default());
    let config = PipelineConfig::builder()
        .profile(Profile::Aksharamukha)
        .targets(["Tamil Extended"])
        .build()
        .unwrap();
    let pipeline = pipeline_with(config, backend.clone(), no_ocr());
    pipeline.run(&text_doc("x.txt", "a")).await.unwrap();

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, "Tamil_Extended");
}

// ── Acquisition ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn latin1_text_is_decoded_not_rejected() {
    let backend = Arc::new(ScriptedBackend::default());
    let config = PipelineConfig::builder()
        .profile(Profile::Aksharamukha)
        .targets(["Devanagari"])
        .build()
        .unwrap();
    let pipeline = pipeline_with(config, backend, no_ocr());
    // "café" in Latin-1: 0xE9 alone is invalid UTF-8.
    let doc = Document::new("latin.txt", None, vec![b'c', b'a', b'f', 0xE9]).unwrap();

    let out = pipeline.run(&doc).await.unwrap().into_output().unwrap();
    assert_eq!(out.extracted.text, "café");
    assert_eq!(out.detection.detected, Detected::Script("Latin".into()));
}

#[tokio::test]
async fn image_text_goes_through_ocr_with_the_hint() {
    let ocr = Arc::new(CannedOcr::new(vec!["नमस्ते\r\n"]));
    let config = PipelineConfig::builder()
        .targets(["IAST"])
        .ocr_language("hin")
        .build()
        .unwrap();
    let pipeline = pipeline_with(
        config,
        Arc::new(edgequake_translit::SanscriptEngine::new()),
        Ok(ocr.clone()),
    );
    let doc = Document::with_kind("scan.png", DocumentKind::Image, tiny_png());

    let out = pipeline.run(&doc).await.unwrap().into_output().unwrap();
    assert_eq!(out.extracted.text, "नमस्ते");
    assert_eq!(out.detection.name(), "Devanagari");
    assert_eq!(out.detection.count_of("Devanagari"), 6);
    assert_eq!(out.outputs[0].text(), Some("namaste"));
    assert_eq!(*ocr.hints.lock().unwrap(), [Some("hin".to_string())]);
}

#[tokio::test]
async fn empty_hint_means_engine_default() {
    let ocr = Arc::new(CannedOcr::new(vec!["abc"]));
    let config = PipelineConfig::builder().ocr_language("  ").build().unwrap();
    let pipeline = pipeline_with(config, Arc::new(ScriptedBackend::default()), Ok(ocr.clone()));
    let doc = Document::with_kind("scan.jpg", DocumentKind::Image, tiny_png());

    pipeline.run(&doc).await.unwrap();
    assert_eq!(*ocr.hints.lock().unwrap(), [None]);
}

#[tokio::test]
async fn blank_ocr_result_is_no_text() {
    let backend = Arc::new(ScriptedBackend::default());
    let pipeline = pipeline_with(
        PipelineConfig::default(),
        backend.clone(),
        Ok(Arc::new(CannedOcr::new(vec!["  \n \u{200B}"]))),
    );
    let doc = Document::with_kind("blank.png", DocumentKind::Image, tiny_png());

    let outcome = pipeline.run(&doc).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoText { .. }));
    assert!(backend.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn undecodable_image_is_an_acquisition_error() {
    let pipeline = pipeline_with(
        PipelineConfig::default(),
        Arc::new(ScriptedBackend::default()),
        Ok(Arc::new(CannedOcr::new(vec!["x"]))),
    );
    let doc = Document::with_kind("broken.png", DocumentKind::Image, b"not a png".to_vec());
    let err = pipeline.run(&doc).await.unwrap_err();
    assert!(matches!(err, TranslitError::Acquisition(_)));
}

// ── Classification & output ──────────────────────────────────────────────────

#[tokio::test]
async fn runs_are_deterministic() {
    let config = PipelineConfig::builder()
        .targets(["TAMIL", "KANNADA", "IAST"])
        .build()
        .unwrap();
    let pipeline = Pipeline::new(config).await.unwrap();
    let doc = text_doc("v.txt", "dharmakShetre kurukShetre");

    let a = pipeline.run(&doc).await.unwrap().into_output().unwrap();
    let b = pipeline.run(&doc).await.unwrap().into_output().unwrap();
    assert_eq!(a.outputs, b.outputs);
    assert_eq!(a.detection, b.detection);
}

#[tokio::test]
async fn chosen_scheme_is_reported_as_chosen() {
    let config = PipelineConfig::builder()
        .source_scheme("IAST")
        .targets(["DEVANAGARI"])
        .build()
        .unwrap();
    let pipeline = Pipeline::new(config).await.unwrap();
    let out = pipeline
        .run(&text_doc("i.txt", "kṛṣṇa"))
        .await
        .unwrap()
        .into_output()
        .unwrap();
    assert_eq!(out.scheme_origin, SchemeOrigin::Chosen);
    assert_eq!(out.outputs[0].text(), Some("कृष्ण"));
}

#[tokio::test]
async fn unknown_source_scheme_is_rejected_at_build() {
    let err = PipelineConfig::builder()
        .source_scheme("Klingon")
        .build()
        .unwrap_err();
    assert!(matches!(err, TranslitError::UnknownSourceScheme { .. }));
}

#[tokio::test]
async fn outputs_are_written_per_successful_target() {
    let backend = Arc::new(ScriptedBackend {
        reject: vec!["BENGALI"],
        ..Default::default()
    });
    let pipeline = pipeline_with(PipelineConfig::default(), backend, no_ocr());
    let out = pipeline
        .run(&text_doc("poem.txt", "namaste"))
        .await
        .unwrap()
        .into_output()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let written = out.write_to_dir(dir.path()).await.unwrap();
    assert_eq!(written, [dir.path().join("poem.txt_DEVANAGARI.txt")]);
    assert_eq!(
        std::fs::read_to_string(&written[0]).unwrap(),
        "<DEVANAGARI>namaste"
    );
}

#[tokio::test]
async fn outputs_for_a_path_named_document_stay_in_the_output_dir() {
    let pipeline = pipeline_with(
        PipelineConfig::builder().targets(["TAMIL"]).build().unwrap(),
        Arc::new(ScriptedBackend::default()),
        no_ocr(),
    );
    let out = pipeline
        .run(&text_doc("../../escape/poem.txt", "namaste"))
        .await
        .unwrap()
        .into_output()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let written = out.write_to_dir(&out_dir).await.unwrap();
    assert_eq!(written, [out_dir.join("poem.txt_TAMIL.txt")]);
    assert!(!dir.path().join("escape").exists());
}

#[tokio::test]
async fn local_files_are_resolved_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("greeting.txt");
    std::fs::write(&path, "namaste").unwrap();

    let config = PipelineConfig::builder()
        .targets(["DEVANAGARI"])
        .build()
        .unwrap();
    let outcome = edgequake_translit::transliterate_input(path.to_str().unwrap(), &config)
        .await
        .unwrap();
    let out = outcome.output().unwrap();
    assert_eq!(out.document, "greeting.txt");
    assert_eq!(out.outputs[0].text(), Some("नमस्ते"));
}

#[tokio::test]
async fn missing_file_is_fatal() {
    let config = PipelineConfig::default();
    let err = edgequake_translit::transliterate_input("/no/such/file.txt", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, TranslitError::FileNotFound { .. }));
}
