//! OCR engines behind one narrow interface.
//!
//! The pipeline only ever asks an engine to `recognize(image, hint)`. The
//! language hint is forwarded verbatim; validating it is the engine's job and
//! an invalid hint comes back as [`OcrError::EngineFailed`] carrying the
//! engine's own message.
//!
//! Calls are single-attempt. A failed page is reported, never retried.

use crate::config::{OcrKind, PipelineConfig};
use crate::error::OcrError;
use crate::pipeline::encode::{encode_image_data, png_bytes};
use crate::prompts::{language_hint_context, DEFAULT_OCR_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use image::DynamicImage;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default vision model when none is configured.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4.1-nano";

/// A text-recognition engine.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name used in errors and logs.
    fn name(&self) -> &str;

    /// Whether the engine can be used right now.
    async fn is_available(&self) -> bool;

    /// Recognise the text in `image`.
    async fn recognize(
        &self,
        image: &DynamicImage,
        language_hint: Option<&str>,
    ) -> Result<String, OcrError>;
}

// ── Tesseract ────────────────────────────────────────────────────────────

/// Runs the `tesseract` binary, streaming the image through stdin/stdout.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments for one recognition call.
    pub fn args(language_hint: Option<&str>) -> Vec<String> {
        let mut args = vec!["stdin".to_string(), "stdout".to_string()];
        if let Some(lang) = language_hint.filter(|l| !l.is_empty()) {
            args.push("-l".to_string());
            args.push(lang.to_string());
        }
        args
    }

    fn unavailable(&self, detail: impl std::fmt::Display) -> OcrError {
        OcrError::EngineUnavailable {
            engine: self.name().to_string(),
            hint: format!(
                "Could not run '{}': {}\nInstall tesseract-ocr or pass --tesseract <PATH>.",
                self.binary.display(),
                detail
            ),
        }
    }

    fn failed(&self, message: impl Into<String>) -> OcrError {
        OcrError::EngineFailed {
            engine: self.name().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn recognize(
        &self,
        image: &DynamicImage,
        language_hint: Option<&str>,
    ) -> Result<String, OcrError> {
        let png = png_bytes(image)?;

        let mut child = Command::new(&self.binary)
            .args(Self::args(language_hint))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // tesseract exits early on a bad language code; its stderr says why,
            // so a broken pipe here is not the error worth reporting.
            if let Err(e) = stdin.write_all(&png).await {
                debug!("tesseract stdin closed early: {}", e);
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(self.failed(if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            }));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract recognised {} chars", text.chars().count());
        Ok(text)
    }
}

// ── Vision LLM ───────────────────────────────────────────────────────────

/// Transcribes images with a vision-capable LLM.
pub struct VisionOcrEngine {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    timeout: Duration,
}

impl VisionOcrEngine {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.api_timeout_secs.max(1)),
        }
    }

    fn build_messages(
        &self,
        image: &DynamicImage,
        language_hint: Option<&str>,
    ) -> Result<Vec<ChatMessage>, OcrError> {
        let mut messages = vec![ChatMessage::system(DEFAULT_OCR_PROMPT)];
        if let Some(lang) = language_hint.filter(|l| !l.is_empty()) {
            messages.push(ChatMessage::system(language_hint_context(lang)));
        }
        messages.push(ChatMessage::user_with_images(
            "",
            vec![encode_image_data(image)?],
        ));
        Ok(messages)
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl OcrEngine for VisionOcrEngine {
    fn name(&self) -> &str {
        "vision"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(
        &self,
        image: &DynamicImage,
        language_hint: Option<&str>,
    ) -> Result<String, OcrError> {
        let messages = self.build_messages(image, language_hint)?;
        let options = self.options();

        let response = tokio::time::timeout(
            self.timeout,
            self.provider.chat(&messages, Some(&options)),
        )
        .await
        .map_err(|_| OcrError::EngineFailed {
            engine: self.name().to_string(),
            message: format!("timed out after {}s", self.timeout.as_secs()),
        })?
        .map_err(|e| OcrError::EngineFailed {
            engine: self.name().to_string(),
            message: e.to_string(),
        })?;

        debug!(
            "vision OCR: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

// ── Construction ─────────────────────────────────────────────────────────

/// Build the OCR engine the config asks for.
///
/// A pre-built `config.ocr_engine` wins. For the vision engine the provider
/// is resolved here, so a missing API key shows up as
/// [`OcrError::EngineUnavailable`].
pub fn build_ocr_engine(config: &PipelineConfig) -> Result<Arc<dyn OcrEngine>, OcrError> {
    if let Some(ref engine) = config.ocr_engine {
        return Ok(Arc::clone(engine));
    }
    match config.ocr {
        OcrKind::Tesseract => Ok(Arc::new(TesseractEngine::new(&config.tesseract_path))),
        OcrKind::Vision => {
            let provider = resolve_provider(config)?;
            Ok(Arc::new(VisionOcrEngine::new(provider, config)))
        }
    }
}

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, OcrError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        OcrError::EngineUnavailable {
            engine: format!("vision ({provider_name})"),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the vision provider, from most-specific to least-specific:
///
/// 1. pre-built `config.provider`
/// 2. `config.provider_name` + `config.model`
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`
/// 4. `OPENAI_API_KEY` present → OpenAI
/// 5. `ProviderFactory::from_env` auto-detection
pub fn resolve_provider(config: &PipelineConfig) -> Result<Arc<dyn LLMProvider>, OcrError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL);
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL);
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) = ProviderFactory::from_env().map_err(|e| {
        warn!("No vision provider in environment: {}", e);
        OcrError::EngineUnavailable {
            engine: "vision".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        }
    })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn tesseract_args_without_hint() {
        assert_eq!(TesseractEngine::args(None), vec!["stdin", "stdout"]);
        assert_eq!(TesseractEngine::args(Some("")), vec!["stdin", "stdout"]);
    }

    #[test]
    fn tesseract_args_pass_hint_verbatim() {
        assert_eq!(
            TesseractEngine::args(Some("hin+eng")),
            vec!["stdin", "stdout", "-l", "hin+eng"]
        );
    }

    #[tokio::test]
    async fn missing_tesseract_binary_is_unavailable() {
        let engine = TesseractEngine::new("/nonexistent/tesseract-binary");
        assert!(!engine.is_available().await);

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
        let err = engine.recognize(&img, Some("eng")).await.unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable { .. }), "got {err:?}");
    }

    #[test]
    fn prebuilt_engine_wins() {
        let engine: Arc<dyn OcrEngine> = Arc::new(TesseractEngine::new("custom-tess"));
        let config = PipelineConfig::builder()
            .ocr(OcrKind::Vision)
            .ocr_engine(Arc::clone(&engine))
            .build()
            .unwrap();
        let built = build_ocr_engine(&config).unwrap();
        assert_eq!(built.name(), "tesseract");
    }
}
