//! Classification of material files into preview kinds.

use std::fmt;

/// How a file is previewed inside the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewKind {
    /// `.pdf`: pages rasterized client-side, at most `visible_unit_cap` of them.
    RasterPaginated,
    /// `.docx`: a single batch of paragraphs already truncated by the backend.
    ParagraphText,
    /// `.pptx`: slides already truncated by the backend, one shown at a time.
    SlideDeck,
    /// Anything else. Only the download action is offered.
    NonPreviewable,
}

impl PreviewKind {
    /// Classify a file by its extension, ignoring case.
    pub fn classify(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".pdf") {
            PreviewKind::RasterPaginated
        } else if lower.ends_with(".docx") {
            PreviewKind::ParagraphText
        } else if lower.ends_with(".pptx") {
            PreviewKind::SlideDeck
        } else {
            PreviewKind::NonPreviewable
        }
    }

    pub fn is_previewable(self) -> bool {
        !matches!(self, PreviewKind::NonPreviewable)
    }

    /// Whether prev/next controls exist for this kind. Paragraph previews are
    /// a single unit and never show them.
    pub fn supports_navigation(self) -> bool {
        matches!(self, PreviewKind::RasterPaginated | PreviewKind::SlideDeck)
    }

    /// Whether the content comes from `/api/preview` rather than a static file.
    pub fn uses_backend_preview(self) -> bool {
        matches!(self, PreviewKind::ParagraphText | PreviewKind::SlideDeck)
    }

    pub fn label(self) -> &'static str {
        match self {
            PreviewKind::RasterPaginated => "PDF",
            PreviewKind::ParagraphText => "DOCX",
            PreviewKind::SlideDeck => "PPTX",
            PreviewKind::NonPreviewable => "file",
        }
    }
}

impl fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
