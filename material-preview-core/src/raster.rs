//! Seam to the external library that paginates and rasterizes PDFs.

use crate::error::Result;
use image::RgbaImage;
use std::fmt;
use std::future::Future;

/// A loaded paginated document. Clones are cheap handles to the same document.
pub trait RasterDocument: fmt::Debug + Clone + Send + Sync + 'static {
    /// Native page count as reported by the renderer, before any cap.
    fn page_count(&self) -> usize;

    /// Rasterize 1-based `page` at `zoom` onto a fresh surface.
    fn render_page(&self, page: usize, zoom: f32) -> impl Future<Output = Result<RgbaImage>> + Send;
}

pub trait RasterRenderer: Send + Sync {
    type Document: RasterDocument;

    /// Load the document behind `source`, a static file path or URL.
    fn open(&self, source: &str) -> impl Future<Output = Result<Self::Document>> + Send;
}

/// A rasterized page ready for display.
#[derive(Clone, PartialEq)]
pub struct RasterPage {
    pub page: usize,
    pub image: RgbaImage,
}

impl RasterPage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl fmt::Debug for RasterPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterPage")
            .field("page", &self.page)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Number of pages a preview may show.
pub fn bounded_page_count(native_pages: usize, cap: usize) -> usize {
    native_pages.min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_is_the_smaller_of_count_and_cap() {
        assert_eq!(bounded_page_count(12, 5), 5);
        assert_eq!(bounded_page_count(3, 5), 3);
        assert_eq!(bounded_page_count(5, 5), 5);
        assert_eq!(bounded_page_count(0, 5), 0);
    }

    #[test]
    fn debug_omits_pixels() {
        let page = RasterPage {
            page: 2,
            image: RgbaImage::new(4, 3),
        };
        assert_eq!(format!("{page:?}"), "RasterPage { page: 2, width: 4, height: 3 }");
    }
}
