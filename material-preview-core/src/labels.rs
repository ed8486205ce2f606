//! User-facing strings for the preview overlay.
//!
//! The library ships in Vietnamese first; English is available for
//! deployments outside the faculty.

use crate::kind::PreviewKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Detail used when an error response body cannot be decoded at all.
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Locale::Vi => "vi",
            Locale::En => "en",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    locale: Locale,
}

impl Labels {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn loading(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Đang tải...",
            Locale::En => "Loading...",
        }
    }

    /// Fallback when the backend rejects a preview without a `detail`.
    pub fn preview_unavailable(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Không thể tải file preview",
            Locale::En => "Could not load the file preview",
        }
    }

    pub fn raster_load_failed(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Lỗi khi tải PDF. Vui lòng thử tải xuống tệp.",
            Locale::En => "Failed to load the PDF. Please try downloading the file.",
        }
    }

    pub fn raster_page_failed(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Lỗi khi hiển thị trang PDF",
            Locale::En => "Failed to display the PDF page",
        }
    }

    pub fn load_failed(&self, kind: PreviewKind, detail: &str) -> String {
        match self.locale {
            Locale::Vi => format!(
                "Lỗi khi tải file {kind}: {detail}. Vui lòng thử tải xuống tệp."
            ),
            Locale::En => format!(
                "Failed to load the {kind} file: {detail}. Please try downloading the file."
            ),
        }
    }

    pub fn empty_content(&self, kind: PreviewKind) -> String {
        match self.locale {
            Locale::Vi => format!("File {kind} không có nội dung hoặc rỗng."),
            Locale::En => format!("The {kind} file has no content or is empty."),
        }
    }

    pub fn slide_title(&self, slide_number: usize) -> String {
        format!("Slide {slide_number}")
    }

    pub fn slide_without_text(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Slide không có nội dung văn bản",
            Locale::En => "This slide has no text content",
        }
    }

    /// `native_pages` is the renderer's page count before the cap is applied.
    pub fn raster_page_info(
        &self,
        current: usize,
        bound: usize,
        native_pages: usize,
        cap: usize,
    ) -> String {
        let base = match self.locale {
            Locale::Vi => format!("Trang {current}/{bound}"),
            Locale::En => format!("Page {current}/{bound}"),
        };
        if native_pages <= cap {
            return base;
        }
        match self.locale {
            Locale::Vi => format!("{base} (Xem trước {cap}/{native_pages} trang)"),
            Locale::En => format!("{base} (previewing {cap}/{native_pages} pages)"),
        }
    }

    pub fn paragraph_info(&self, preview: usize, total: usize, estimated_pages: usize) -> String {
        match self.locale {
            Locale::Vi => {
                format!("Xem trước {preview} / {total} đoạn văn (≈{estimated_pages} trang)")
            }
            Locale::En => {
                format!("Previewing {preview} / {total} paragraphs (≈{estimated_pages} pages)")
            }
        }
    }

    pub fn slide_info(&self, current: usize, preview: usize, total: usize) -> String {
        match self.locale {
            Locale::Vi => format!("Slide {current}/{preview} (Xem trước {preview}/{total} slides)"),
            Locale::En => format!("Slide {current}/{preview} (previewing {preview}/{total} slides)"),
        }
    }

    pub fn previous(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Trang trước",
            Locale::En => "Previous",
        }
    }

    pub fn next(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Trang sau",
            Locale::En => "Next",
        }
    }

    pub fn preview(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Xem trước",
            Locale::En => "Preview",
        }
    }

    pub fn download(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Tải xuống",
            Locale::En => "Download",
        }
    }

    pub fn close(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Đóng",
            Locale::En => "Close",
        }
    }

    pub fn no_files(&self) -> &'static str {
        match self.locale {
            Locale::Vi => "Không có tệp đính kèm",
            Locale::En => "No attached files",
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
