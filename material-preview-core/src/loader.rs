//! Executes the asynchronous work the overlay asks for.
//!
//! The overlay never awaits anything itself. It hands out a [`LoadCommand`]
//! when a preview opens and a [`RenderCommand`] for every PDF page it wants
//! on screen; the host runs them through a [`Loader`] and feeds the outcomes
//! back. Every command carries the session's cancellation token, checked
//! after each suspension point.

use crate::backend::{ParagraphPreview, PreviewBackend, SlidePreview};
use crate::cancellation::CancellationToken;
use crate::error::{PreviewError, Result};
use crate::kind::PreviewKind;
use crate::raster::{RasterDocument, RasterPage, RasterRenderer};
use crate::session::Ticket;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum LoadCommand {
    Raster {
        ticket: Ticket,
        source: String,
        token: CancellationToken,
    },
    Paragraphs {
        ticket: Ticket,
        material_id: i64,
        file_index: usize,
        token: CancellationToken,
    },
    Slides {
        ticket: Ticket,
        material_id: i64,
        file_index: usize,
        token: CancellationToken,
    },
}

impl LoadCommand {
    pub fn ticket(&self) -> Ticket {
        match self {
            LoadCommand::Raster { ticket, .. }
            | LoadCommand::Paragraphs { ticket, .. }
            | LoadCommand::Slides { ticket, .. } => *ticket,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        match self {
            LoadCommand::Raster { token, .. }
            | LoadCommand::Paragraphs { token, .. }
            | LoadCommand::Slides { token, .. } => token,
        }
    }

    pub fn kind(&self) -> PreviewKind {
        match self {
            LoadCommand::Raster { .. } => PreviewKind::RasterPaginated,
            LoadCommand::Paragraphs { .. } => PreviewKind::ParagraphText,
            LoadCommand::Slides { .. } => PreviewKind::SlideDeck,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoadedContent<D> {
    Raster(D),
    Paragraphs(ParagraphPreview),
    Slides(SlidePreview),
}

/// Why a load or render produced nothing. Kept `Clone` so outcomes can travel
/// through UI message queues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    Cancelled,
    Failed { detail: Option<String> },
}

impl From<PreviewError> for LoadFailure {
    fn from(error: PreviewError) -> Self {
        if error.is_cancelled() {
            LoadFailure::Cancelled
        } else {
            LoadFailure::Failed {
                detail: error.detail(),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOutcome<D> {
    pub ticket: Ticket,
    pub result: std::result::Result<LoadedContent<D>, LoadFailure>,
}

#[derive(Debug, Clone)]
pub struct RenderCommand<D> {
    pub ticket: Ticket,
    pub document: D,
    /// 1-based page number.
    pub page: usize,
    pub zoom: f32,
    pub token: CancellationToken,
}

#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub ticket: Ticket,
    pub page: usize,
    pub result: std::result::Result<RasterPage, LoadFailure>,
}

/// Runs commands against a backend and a raster renderer.
#[derive(Debug)]
pub struct Loader<B, R> {
    backend: B,
    renderer: R,
}

impl<B: PreviewBackend, R: RasterRenderer> Loader<B, R> {
    pub fn new(backend: B, renderer: R) -> Self {
        Self { backend, renderer }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Perform exactly one backend request or renderer load for `command`.
    pub async fn load(&self, command: LoadCommand) -> LoadOutcome<R::Document> {
        let ticket = command.ticket();
        let kind = command.kind();
        let result = self.run_load(command).await.map_err(|err| {
            if !err.is_cancelled() {
                warn!(session = %ticket.session, %kind, "Preview load failed: {err}");
            }
            LoadFailure::from(err)
        });
        LoadOutcome { ticket, result }
    }

    async fn run_load(&self, command: LoadCommand) -> Result<LoadedContent<R::Document>> {
        command.token().check_cancelled("before-load")?;
        let loaded = match &command {
            LoadCommand::Raster { source, .. } => {
                let document = self.renderer.open(source).await?;
                debug!(source = %source, pages = document.page_count(), "Raster document opened");
                LoadedContent::Raster(document)
            }
            LoadCommand::Paragraphs {
                material_id,
                file_index,
                ..
            } => LoadedContent::Paragraphs(
                self.backend.fetch_paragraphs(*material_id, *file_index).await?,
            ),
            LoadCommand::Slides {
                material_id,
                file_index,
                ..
            } => LoadedContent::Slides(self.backend.fetch_slides(*material_id, *file_index).await?),
        };
        command.token().check_cancelled("after-load")?;
        Ok(loaded)
    }
}

/// Rasterize one page with a single renderer call.
pub async fn render_page<D: RasterDocument>(command: RenderCommand<D>) -> RenderOutcome {
    let RenderCommand {
        ticket,
        document,
        page,
        zoom,
        token,
    } = command;
    let result = run_render(&document, page, zoom, &token).await.map_err(|err| {
        if !err.is_cancelled() {
            warn!(session = %ticket.session, page, "Page render failed: {err}");
        }
        LoadFailure::from(err)
    });
    RenderOutcome { ticket, page, result }
}

async fn run_render<D: RasterDocument>(
    document: &D,
    page: usize,
    zoom: f32,
    token: &CancellationToken,
) -> Result<RasterPage> {
    token.check_cancelled("before-render")?;
    let page_count = document.page_count();
    if page == 0 || page > page_count {
        return Err(PreviewError::PageOutOfRange { page, page_count });
    }
    let image = document.render_page(page, zoom).await?;
    token.check_cancelled("after-render")?;
    debug!(page, width = image.width(), height = image.height(), "Page rendered");
    Ok(RasterPage { page, image })
}
