//! PDF rasterisation: render selected pages to `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is CPU-bound. `tokio::task::spawn_blocking` keeps it off the
//! async worker threads.
//!
//! ## Binding
//!
//! The library is located in this order: the configured path, the
//! `PDFIUM_LIB_PATH` environment variable, then the system loader. Any
//! binding failure is an [`AcquisitionError::PdfiumBindingFailed`].

use crate::config::{PageSelection, PipelineConfig};
use crate::error::{AcquisitionError, TranslitError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Points per inch in PDF user space.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Rendering knobs copied out of [`PipelineConfig`] so they can cross into
/// the blocking task.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub dpi: u32,
    pub max_pixels: u32,
    pub password: Option<String>,
    pub pages: PageSelection,
    pub library_path: Option<PathBuf>,
}

impl RenderOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            dpi: config.dpi,
            max_pixels: config.max_rendered_pixels,
            password: config.password.clone(),
            pages: config.pages.clone(),
            library_path: config.pdfium_lib_path.clone(),
        }
    }

    fn scale(&self) -> f32 {
        self.dpi as f32 / PDF_POINTS_PER_INCH
    }
}

/// Pages rendered from one PDF, in ascending page order.
pub struct RenderedPdf {
    /// Page count of the whole document.
    pub total_pages: usize,
    /// `(page_index_0based, image)` for every selected page.
    pub pages: Vec<(usize, DynamicImage)>,
}

/// Rasterise the selected pages of an in-memory PDF.
pub async fn render_pages(
    bytes: Vec<u8>,
    options: RenderOptions,
) -> Result<RenderedPdf, TranslitError> {
    let result = tokio::task::spawn_blocking(move || render_pages_blocking(bytes, &options))
        .await
        .map_err(|e| TranslitError::Internal(format!("Render task panicked: {}", e)))?;

    result.map_err(TranslitError::from)
}

/// Bind to pdfium using the configured path, `PDFIUM_LIB_PATH`, or the system library.
pub fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, AcquisitionError> {
    let explicit = library_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => {
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(&path).map_err(|e| {
                AcquisitionError::PdfiumBindingFailed(format!("{}: {}", path.display(), e))
            })?
        }
        None => Pdfium::bind_to_system_library()
            .map_err(|e| AcquisitionError::PdfiumBindingFailed(e.to_string()))?,
    };

    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    bytes: Vec<u8>,
    options: &RenderOptions,
) -> Result<RenderedPdf, AcquisitionError> {
    let pdfium = bind_pdfium(options.library_path.as_deref())?;

    let password = options.password.as_deref();
    let document = pdfium
        .load_pdf_from_byte_vec(bytes, password)
        .map_err(|e| map_load_error(&e, password.is_some()))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let indices = options.pages.to_indices(total_pages);
    if indices.is_empty() {
        return Err(AcquisitionError::PageOutOfRange { total: total_pages });
    }

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(options.scale())
        .set_maximum_width(options.max_pixels as i32)
        .set_maximum_height(options.max_pixels as i32);

    let mut rendered = Vec::with_capacity(indices.len());

    for idx in indices {
        let page = pages
            .get(idx as u16)
            .map_err(|e| AcquisitionError::PdfRenderFailed {
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| AcquisitionError::PdfRenderFailed {
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        rendered.push((idx, image));
    }

    Ok(RenderedPdf {
        total_pages,
        pages: rendered,
    })
}

fn map_load_error(e: &PdfiumError, had_password: bool) -> AcquisitionError {
    let err_str = format!("{:?}", e);
    let detail = if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            "wrong password for encrypted PDF".to_string()
        } else {
            "PDF is encrypted and requires a password (--password)".to_string()
        }
    } else {
        err_str
    };
    AcquisitionError::PdfRenderFailed { detail }
}
