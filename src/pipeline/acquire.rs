//! Turn a [`Document`] into plain text.
//!
//! | Kind | Path |
//! |------|------|
//! | text | UTF-8, else Latin-1 |
//! | image | decode → RGB8 → OCR |
//! | pdf | render selected pages → OCR each page → join with `\n` |
//!
//! Page text always comes back in page order. With `ocr_concurrency > 1`
//! pages are recognised in parallel, but a failure is still reported for the
//! lowest failing page and aborts the document.

use crate::config::PipelineConfig;
use crate::document::{Document, DocumentKind};
use crate::error::{AcquisitionError, OcrError, TranslitError};
use crate::pipeline::decode::{decode_text, TextEncoding};
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::postprocess::clean_ocr_text;
use crate::pipeline::render::{render_pages, RenderOptions};
use futures::stream::{self, StreamExt};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// How the text was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "kebab-case")]
pub enum AcquisitionPath {
    Text { encoding: TextEncoding },
    Image { engine: String },
    Pdf {
        engine: String,
        /// Pages OCR'd (1-indexed).
        pages: Vec<usize>,
        total_pages: usize,
    },
}

/// Text pulled out of a document, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub source: AcquisitionPath,
    pub duration_ms: u64,
}

impl ExtractedText {
    /// True when there is nothing but whitespace to transliterate.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Extract the text of `document`.
///
/// `ocr` is only consulted for images and PDFs; pass `None` when no engine
/// could be built and the document is expected to be plain text.
pub async fn acquire_text(
    document: &Document,
    ocr: Option<&dyn OcrEngine>,
    config: &PipelineConfig,
) -> Result<ExtractedText, TranslitError> {
    let start = Instant::now();
    let kind = document.kind();
    info!("Acquiring text from {} ({})", document.name(), kind.as_str());
    if let Some(ref cb) = config.progress_callback {
        cb.on_acquire_start(document.name(), kind.as_str());
    }

    let (text, source) = match kind {
        DocumentKind::Text => {
            let (text, encoding) = decode_text(document.bytes());
            if encoding == TextEncoding::Latin1 {
                warn!("{} is not valid UTF-8; decoded as Latin-1", document.name());
            }
            (text, AcquisitionPath::Text { encoding })
        }
        DocumentKind::Image => {
            let engine = require_engine(ocr)?;
            let image = decode_image(document.bytes())?;
            let text = ocr_pages(engine, vec![(0, image)], config).await?;
            (
                text,
                AcquisitionPath::Image {
                    engine: engine.name().to_string(),
                },
            )
        }
        DocumentKind::Pdf => {
            let engine = require_engine(ocr)?;
            let rendered = render_pages(
                document.bytes().to_vec(),
                RenderOptions::from_config(config),
            )
            .await?;
            let pages: Vec<usize> = rendered.pages.iter().map(|(idx, _)| idx + 1).collect();
            let text = ocr_pages(engine, rendered.pages, config).await?;
            (
                text,
                AcquisitionPath::Pdf {
                    engine: engine.name().to_string(),
                    pages,
                    total_pages: rendered.total_pages,
                },
            )
        }
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        "Acquired {} chars from {} in {}ms",
        text.chars().count(),
        document.name(),
        duration_ms
    );
    Ok(ExtractedText {
        text,
        source,
        duration_ms,
    })
}

fn require_engine(ocr: Option<&dyn OcrEngine>) -> Result<&dyn OcrEngine, TranslitError> {
    ocr.ok_or_else(|| {
        TranslitError::Ocr(OcrError::EngineUnavailable {
            engine: "ocr".to_string(),
            hint: "no OCR engine is configured".to_string(),
        })
    })
}

/// Decode image bytes and normalise to 8-bit RGB.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, AcquisitionError> {
    let img = image::load_from_memory(bytes).map_err(|e| AcquisitionError::ImageDecodeFailed {
        detail: e.to_string(),
    })?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// OCR `(page_index, image)` pairs and join the cleaned page texts with `\n`.
async fn ocr_pages(
    engine: &dyn OcrEngine,
    pages: Vec<(usize, DynamicImage)>,
    config: &PipelineConfig,
) -> Result<String, TranslitError> {
    let total = pages.len();
    let hint = config.language_hint();
    if let Some(ref cb) = config.progress_callback {
        cb.on_ocr_start(total);
    }

    let mut results = stream::iter(pages.into_iter().map(|(idx, image)| async move {
        let page_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total);
        }
        let result = engine.recognize(&image, hint).await.map(|raw| clean_ocr_text(&raw));
        if let Some(ref cb) = config.progress_callback {
            match &result {
                Ok(text) => cb.on_page_complete(page_num, total, text.len()),
                Err(e) => cb.on_page_error(page_num, total, &e.to_string()),
            }
        }
        (page_num, result)
    }))
    .buffered(config.ocr_concurrency.max(1));

    let mut texts = Vec::with_capacity(total);
    while let Some((page_num, result)) = results.next().await {
        match result {
            Ok(text) => texts.push(text),
            Err(e) => {
                warn!("OCR failed on page {}: {}", page_num, e);
                return Err(e.into());
            }
        }
    }
    Ok(texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoEngine {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OcrEngine for EchoEngine {
        fn name(&self) -> &str {
            "echo"
        }
        async fn is_available(&self) -> bool {
            true
        }
        async fn recognize(
            &self,
            image: &DynamicImage,
            language_hint: Option<&str>,
        ) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "{}x{} {}  \r\n",
                image.width(),
                image.height(),
                language_hint.unwrap_or("-")
            ))
        }
    }

    struct FailOnWide;

    #[async_trait]
    impl OcrEngine for FailOnWide {
        fn name(&self) -> &str {
            "picky"
        }
        async fn is_available(&self) -> bool {
            true
        }
        async fn recognize(
            &self,
            image: &DynamicImage,
            _hint: Option<&str>,
        ) -> Result<String, OcrError> {
            if image.width() > 4 {
                Err(OcrError::EngineFailed {
                    engine: "picky".into(),
                    message: format!("too wide: {}", image.width()),
                })
            } else {
                Ok("ok".into())
            }
        }
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([255, 255, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn blank(w: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, 2, Rgb([0, 0, 0])))
    }

    #[tokio::test]
    async fn text_document_skips_ocr() {
        let doc = Document::with_kind("a.txt", DocumentKind::Text, "नमस्ते".as_bytes().to_vec());
        let out = acquire_text(&doc, None, &PipelineConfig::default())
            .await
            .unwrap();
        assert_eq!(out.text, "नमस्ते");
        assert_eq!(
            out.source,
            AcquisitionPath::Text {
                encoding: TextEncoding::Utf8
            }
        );
    }

    #[tokio::test]
    async fn latin1_text_is_flagged() {
        let doc = Document::with_kind("a.txt", DocumentKind::Text, b"caf\xE9".to_vec());
        let out = acquire_text(&doc, None, &PipelineConfig::default())
            .await
            .unwrap();
        assert_eq!(out.text, "café");
        assert!(matches!(
            out.source,
            AcquisitionPath::Text {
                encoding: TextEncoding::Latin1
            }
        ));
    }

    #[tokio::test]
    async fn image_goes_through_engine_with_hint() {
        let engine = EchoEngine {
            calls: AtomicUsize::new(0),
        };
        let config = PipelineConfig::builder().ocr_language("hin").build().unwrap();
        let doc = Document::with_kind("scan.png", DocumentKind::Image, png(3, 2));
        let out = acquire_text(&doc, Some(&engine), &config).await.unwrap();
        assert_eq!(out.text, "3x2 hin");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn image_without_engine_is_unavailable() {
        let doc = Document::with_kind("scan.png", DocumentKind::Image, png(2, 2));
        let err = acquire_text(&doc, None, &PipelineConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TranslitError::Ocr(OcrError::EngineUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn corrupt_image_is_decode_failure() {
        let engine = EchoEngine {
            calls: AtomicUsize::new(0),
        };
        let doc = Document::with_kind("x.png", DocumentKind::Image, b"not an image".to_vec());
        let err = acquire_text(&doc, Some(&engine), &PipelineConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TranslitError::Acquisition(AcquisitionError::ImageDecodeFailed { .. })
        ));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pages_join_in_order_under_concurrency() {
        let engine = EchoEngine {
            calls: AtomicUsize::new(0),
        };
        let config = PipelineConfig::builder().ocr_concurrency(3).build().unwrap();
        let pages = vec![(0, blank(1)), (1, blank(2)), (2, blank(3))];
        let text = ocr_pages(&engine, pages, &config).await.unwrap();
        assert_eq!(text, "1x2 -\n2x2 -\n3x2 -");
    }

    #[tokio::test]
    async fn first_failing_page_aborts() {
        let config = PipelineConfig::builder().ocr_concurrency(2).build().unwrap();
        let pages = vec![(0, blank(1)), (1, blank(5)), (2, blank(9))];
        let err = ocr_pages(&FailOnWide, pages, &config).await.unwrap_err();
        match err {
            TranslitError::Ocr(OcrError::EngineFailed { message, .. }) => {
                assert_eq!(message, "too wide: 5")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decoded_images_are_rgb8() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(2, 2));
        let mut buf = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        assert!(matches!(decode_image(&buf).unwrap(), DynamicImage::ImageRgb8(_)));
    }
}
