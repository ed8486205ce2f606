//! Access to the materials REST backend.

mod http;
mod types;

pub use http::HttpBackend;
pub use types::{
    DepartmentRef, ErrorBody, MaterialDetail, MaterialFile, Paragraph, ParagraphPreview, Slide,
    SlideItem, SlidePreview, UploaderRef,
};

use crate::error::Result;
use std::future::Future;

/// Endpoints the preview controller consumes. Paragraph and slide extraction
/// happen server-side; the backend already truncates both.
pub trait PreviewBackend: Send + Sync {
    fn fetch_paragraphs(
        &self,
        material_id: i64,
        file_index: usize,
    ) -> impl Future<Output = Result<ParagraphPreview>> + Send;

    fn fetch_slides(
        &self,
        material_id: i64,
        file_index: usize,
    ) -> impl Future<Output = Result<SlidePreview>> + Send;

    fn fetch_material(&self, material_id: i64) -> impl Future<Output = Result<MaterialDetail>> + Send;

    /// Raw bytes of a static file, as linked from `MaterialFile::path`.
    fn fetch_file(&self, path: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

pub(crate) fn preview_path(material_id: i64, file_index: usize) -> String {
    format!("/api/preview/{material_id}/{file_index}")
}

pub(crate) fn material_path(material_id: i64) -> String {
    format!("/api/materials/{material_id}")
}
