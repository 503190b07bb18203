//! Transliteration backends and per-target dispatch.
//!
//! A backend turns `(source, target, text)` into text. [`transliterate_all`]
//! calls it once per selected target, in selection order, and records each
//! outcome separately: an unsupported pair costs the user that one target,
//! never the others.

pub mod aksharamukha;
pub mod sanscript;

use crate::catalog::engine_name;
use crate::config::{BackendKind, PipelineConfig};
use crate::error::{TranslitError, TransliterationError};
use crate::output::TargetOutput;
use crate::progress::ProgressCallback;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use aksharamukha::AksharamukhaClient;
pub use sanscript::SanscriptEngine;

/// One `(source, target, text)` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransliterationRequest {
    pub source: String,
    pub target: String,
    pub text: String,
}

impl TransliterationRequest {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            text: text.into(),
        }
    }
}

/// A transliteration engine.
#[async_trait]
pub trait TransliterationBackend: Send + Sync {
    /// Short backend name used in errors and logs.
    fn name(&self) -> &str;

    /// Check once, at startup, that the backend can serve requests.
    async fn probe(&self) -> Result<(), TransliterationError>;

    async fn transliterate(
        &self,
        request: &TransliterationRequest,
    ) -> Result<String, TransliterationError>;
}

/// Build the backend the config asks for.
///
/// A pre-built `config.transliterator` wins over `config.backend`.
pub fn build_backend(
    config: &PipelineConfig,
) -> Result<Arc<dyn TransliterationBackend>, TransliterationError> {
    if let Some(ref backend) = config.transliterator {
        return Ok(Arc::clone(backend));
    }
    match config.backend_kind() {
        BackendKind::Builtin => Ok(Arc::new(SanscriptEngine::new())),
        BackendKind::Aksharamukha => Ok(Arc::new(AksharamukhaClient::new(
            &config.aksharamukha_url,
            config.api_timeout_secs,
        )?)),
    }
}

/// Transliterate `text` from `source` into every target, in order.
///
/// Returns [`TranslitError::NoTargetsSelected`] without calling the backend
/// when `targets` is empty. Otherwise every target gets exactly one
/// [`TargetOutput`], successful or not.
pub async fn transliterate_all(
    backend: &dyn TransliterationBackend,
    source: &str,
    targets: &[String],
    text: &str,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<TargetOutput>, TranslitError> {
    if targets.is_empty() {
        return Err(TranslitError::NoTargetsSelected);
    }

    info!(
        "Transliterating {} chars from {} into {} target(s) via {}",
        text.chars().count(),
        source,
        targets.len(),
        backend.name()
    );
    if let Some(cb) = progress {
        cb.on_dispatch_start(targets.len());
    }

    let mut outputs = Vec::with_capacity(targets.len());
    for target in targets {
        let engine_target = engine_name(target);
        if let Some(cb) = progress {
            cb.on_target_start(target);
        }

        let request = TransliterationRequest::new(source, engine_target.clone(), text);
        let result = backend.transliterate(&request).await;

        match &result {
            Ok(out) => {
                debug!("{} → {}: {} chars", source, engine_target, out.chars().count());
                if let Some(cb) = progress {
                    cb.on_target_complete(target, out.len());
                }
            }
            Err(e) => {
                warn!("Transliteration to {} failed: {}", target, e);
                if let Some(cb) = progress {
                    cb.on_target_error(target, &e.to_string());
                }
            }
        }

        outputs.push(TargetOutput {
            target: target.clone(),
            engine_target,
            result,
        });
    }

    Ok(outputs)
}
