//! In-memory backend and renderer used by unit tests.

use crate::backend::{
    MaterialDetail, Paragraph, ParagraphPreview, PreviewBackend, Slide, SlideItem, SlidePreview,
};
use crate::cancellation::CancellationToken;
use crate::error::{PreviewError, Result};
use crate::raster::{RasterDocument, RasterRenderer};
use image::RgbaImage;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct BackendState {
    paragraphs: Option<ParagraphPreview>,
    slides: Option<SlidePreview>,
    cancel_on_request: Option<CancellationToken>,
    failure: Option<(u16, Option<String>)>,
    requests: Vec<(i64, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn with_paragraphs(self, count: usize) -> Self {
        let paragraphs = (0..count)
            .map(|i| Paragraph {
                text: format!("Paragraph {i}"),
                style: if i == 0 { "Heading 1" } else { "Normal" }.to_string(),
            })
            .collect();
        self.with_paragraph_preview(ParagraphPreview {
            paragraphs,
            preview_paragraphs: count,
            total_paragraphs: count * 3,
            estimated_pages: 1,
        })
    }

    pub fn with_paragraph_preview(self, preview: ParagraphPreview) -> Self {
        self.state.lock().unwrap().paragraphs = Some(preview);
        self
    }

    pub fn with_slides(self, count: usize, total: usize) -> Self {
        let slides = (1..=count)
            .map(|n| Slide {
                slide_number: n,
                content: vec![SlideItem {
                    text: format!("Slide body {n}"),
                }],
            })
            .collect();
        self.with_slide_preview(SlidePreview {
            slides,
            preview_slides: count,
            total_slides: total,
        })
    }

    pub fn with_slide_preview(self, preview: SlidePreview) -> Self {
        self.state.lock().unwrap().slides = Some(preview);
        self
    }

    /// Cancel `token` while a preview request is in flight.
    pub fn cancelling(self, token: &CancellationToken) -> Self {
        self.state.lock().unwrap().cancel_on_request = Some(token.clone());
        self
    }

    pub fn failing(self, status: u16, detail: Option<&str>) -> Self {
        self.state.lock().unwrap().failure = Some((status, detail.map(str::to_string)));
        self
    }

    pub fn requests(&self) -> Vec<(i64, usize)> {
        self.state.lock().unwrap().requests.clone()
    }

    fn record(&self, material_id: i64, file_index: usize) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.requests.push((material_id, file_index));
        if let Some(token) = &state.cancel_on_request {
            token.cancel();
        }
        match &state.failure {
            Some((status, detail)) => Err(PreviewError::Backend {
                status: *status,
                detail: detail.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl PreviewBackend for FakeBackend {
    async fn fetch_paragraphs(&self, material_id: i64, file_index: usize) -> Result<ParagraphPreview> {
        self.record(material_id, file_index)?;
        Ok(self.state.lock().unwrap().paragraphs.clone().unwrap_or_default())
    }

    async fn fetch_slides(&self, material_id: i64, file_index: usize) -> Result<SlidePreview> {
        self.record(material_id, file_index)?;
        Ok(self.state.lock().unwrap().slides.clone().unwrap_or_default())
    }

    async fn fetch_material(&self, _material_id: i64) -> Result<MaterialDetail> {
        Err(PreviewError::Backend {
            status: 404,
            detail: Some("Material not found".to_string()),
        })
    }

    async fn fetch_file(&self, _path: &str) -> Result<Vec<u8>> {
        Ok(b"%PDF-1.7".to_vec())
    }
}

/// Document whose pages render to `100 * zoom` by `140 * zoom` surfaces.
#[derive(Debug, Clone)]
pub struct FakeDocument {
    pages: usize,
    failing_page: Option<usize>,
    cancel_on_render: Option<CancellationToken>,
    rendered: Arc<Mutex<Vec<usize>>>,
}

impl FakeDocument {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            failing_page: None,
            cancel_on_render: None,
            rendered: Arc::default(),
        }
    }

    pub fn failing_on(mut self, page: usize) -> Self {
        self.failing_page = Some(page);
        self
    }

    /// Cancel `token` while a page is being rendered.
    pub fn cancelling(mut self, token: &CancellationToken) -> Self {
        self.cancel_on_render = Some(token.clone());
        self
    }

    pub fn rendered(&self) -> Vec<usize> {
        self.rendered.lock().unwrap().clone()
    }
}

impl RasterDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    async fn render_page(&self, page: usize, zoom: f32) -> Result<RgbaImage> {
        self.rendered.lock().unwrap().push(page);
        if let Some(token) = &self.cancel_on_render {
            token.cancel();
        }
        if self.failing_page == Some(page) {
            return Err(PreviewError::Renderer(format!("page {page} is damaged")));
        }
        let width = (100.0 * zoom) as u32;
        let height = (140.0 * zoom) as u32;
        Ok(RgbaImage::new(width, height))
    }
}

#[derive(Debug, Clone)]
pub struct FakeRenderer {
    document: Option<FakeDocument>,
    opened: Arc<Mutex<Vec<String>>>,
}

impl FakeRenderer {
    pub fn with_pages(pages: usize) -> Self {
        Self::with_document(FakeDocument::new(pages))
    }

    pub fn with_document(document: FakeDocument) -> Self {
        Self {
            document: Some(document),
            opened: Arc::default(),
        }
    }

    pub fn broken() -> Self {
        Self {
            document: None,
            opened: Arc::default(),
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl RasterRenderer for FakeRenderer {
    type Document = FakeDocument;

    async fn open(&self, source: &str) -> Result<FakeDocument> {
        self.opened.lock().unwrap().push(source.to_string());
        self.document
            .clone()
            .ok_or_else(|| PreviewError::Renderer("Invalid PDF structure".to_string()))
    }
}
