//! Awaiting facade over [`PreviewOverlay`] and [`Loader`].
//!
//! Suitable for hosts that can hold the controller across an `.await`
//! (headless tools, tests). Event-loop hosts drive the overlay directly.

use crate::backend::PreviewBackend;
use crate::config::PreviewConfig;
use crate::loader::{render_page, Loader, RenderCommand};
use crate::overlay::{OpenRequest, PreviewOverlay};
use crate::raster::RasterRenderer;

pub struct PreviewController<B, R: RasterRenderer> {
    material_id: i64,
    overlay: PreviewOverlay<R::Document>,
    loader: Loader<B, R>,
}

impl<B: PreviewBackend, R: RasterRenderer> PreviewController<B, R> {
    pub fn new(config: &PreviewConfig, material_id: i64, backend: B, renderer: R) -> Self {
        Self {
            material_id,
            overlay: PreviewOverlay::new(config),
            loader: Loader::new(backend, renderer),
        }
    }

    pub fn material_id(&self) -> i64 {
        self.material_id
    }

    pub fn overlay(&self) -> &PreviewOverlay<R::Document> {
        &self.overlay
    }

    pub fn loader(&self) -> &Loader<B, R> {
        &self.loader
    }

    /// Open a preview of one of the material's files. Returns `false` when
    /// the file can only be downloaded.
    pub async fn open_preview(&mut self, file_index: usize, file_path: &str, file_name: &str) -> bool {
        let request = OpenRequest {
            material_id: self.material_id,
            file_index,
            file_path: file_path.to_string(),
            file_name: file_name.to_string(),
        };
        let Some(command) = self.overlay.open(request) else {
            return false;
        };
        let outcome = self.loader.load(command).await;
        let render = self.overlay.apply_load(outcome);
        self.render(render).await;
        true
    }

    pub fn close_preview(&mut self) {
        self.overlay.close();
    }

    pub async fn go_to_previous_unit(&mut self) {
        let render = self.overlay.previous();
        self.render(render).await;
    }

    pub async fn go_to_next_unit(&mut self) {
        let render = self.overlay.next();
        self.render(render).await;
    }

    async fn render(&mut self, command: Option<RenderCommand<R::Document>>) {
        if let Some(command) = command {
            let outcome = render_page(command).await;
            self.overlay.apply_render(outcome);
        }
    }
}
