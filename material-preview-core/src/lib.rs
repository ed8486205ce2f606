//! Bounded document preview for the materials library.
//!
//! A preview shows at most a handful of units of one attachment: the first
//! pages of a PDF (rasterized client-side), the paragraph batch the backend
//! extracted from a DOCX, or the slides it extracted from a PPTX.
//!
//! [`overlay::PreviewOverlay`] is the state machine. It performs no I/O and
//! hands out commands that a [`loader::Loader`] executes. Hosts that can
//! simply await use [`controller::PreviewController`] instead.

pub mod backend;
pub mod cancellation;
pub mod config;
pub mod controller;
pub mod error;
pub mod kind;
pub mod labels;
pub mod loader;
pub mod overlay;
pub mod raster;
pub mod session;

#[cfg(test)]
mod testing;

pub use backend::{HttpBackend, MaterialDetail, MaterialFile, PreviewBackend};
pub use config::{load_config, PreviewConfig};
pub use controller::PreviewController;
pub use error::{PreviewError, Result};
pub use kind::PreviewKind;
pub use labels::{Labels, Locale};
pub use loader::{render_page, LoadCommand, LoadOutcome, Loader, RenderCommand, RenderOutcome};
pub use overlay::{ContentArea, NavigationState, OpenRequest, OverlayState, PreviewOverlay};
pub use raster::{RasterDocument, RasterPage, RasterRenderer};
