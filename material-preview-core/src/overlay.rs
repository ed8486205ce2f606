//! The preview overlay: one session, one content area, two navigation buttons.
//!
//! `Closed -> Loading -> Ready -> Closed`. Opening a new preview while one is
//! live discards the old session first, cancelling anything it still has in
//! flight. Failures never leave the overlay: they become an inline notice.

use crate::backend::{ParagraphPreview, SlidePreview};
use crate::config::PreviewConfig;
use crate::kind::PreviewKind;
use crate::labels::Labels;
use crate::loader::{LoadCommand, LoadFailure, LoadOutcome, LoadedContent, RenderCommand, RenderOutcome};
use crate::raster::{bounded_page_count, RasterDocument, RasterPage};
use crate::session::{Direction, Loaded, PreviewSession, SourceRef};
use tracing::{debug, info, warn};

/// "Open preview for file `file_index` of material `material_id`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub material_id: i64,
    pub file_index: usize,
    pub file_path: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Closed,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphBlock {
    pub text: String,
    pub heading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideView {
    pub title: String,
    pub blocks: Vec<String>,
    /// Shown instead of `blocks` when the slide has no text.
    pub placeholder: Option<String>,
}

/// What the overlay's content region currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentArea {
    Blank,
    Loading,
    Page(RasterPage),
    Paragraphs(Vec<ParagraphBlock>),
    Slide(SlideView),
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub visible: bool,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl NavigationState {
    /// Shown for kinds that navigate, but inert.
    fn inert(kind: PreviewKind) -> Self {
        Self {
            visible: kind.supports_navigation(),
            prev_enabled: false,
            next_enabled: false,
        }
    }
}

#[derive(Debug)]
pub struct PreviewOverlay<D> {
    labels: Labels,
    visible_unit_cap: usize,
    raster_zoom: f32,
    state: OverlayState,
    session: Option<PreviewSession<D>>,
    content: ContentArea,
    navigation: NavigationState,
    page_info: String,
}

impl<D: RasterDocument> PreviewOverlay<D> {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            labels: Labels::new(config.locale),
            visible_unit_cap: config.visible_unit_cap.max(1),
            raster_zoom: config.raster_zoom,
            state: OverlayState::Closed,
            session: None,
            content: ContentArea::Blank,
            navigation: NavigationState::default(),
            page_info: String::new(),
        }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != OverlayState::Closed
    }

    pub fn session(&self) -> Option<&PreviewSession<D>> {
        self.session.as_ref()
    }

    pub fn content(&self) -> &ContentArea {
        &self.content
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    pub fn page_info(&self) -> &str {
        &self.page_info
    }

    pub fn title(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.file_name())
    }

    pub fn current_index(&self) -> usize {
        self.session.as_ref().map_or(1, |session| session.current_index())
    }

    pub fn total_units(&self) -> usize {
        self.session.as_ref().map_or(0, |session| session.total_units())
    }

    /// Start a preview. Returns `None`, touching nothing, for files that can
    /// only be downloaded.
    pub fn open(&mut self, request: OpenRequest) -> Option<LoadCommand> {
        let kind = PreviewKind::classify(&request.file_name);
        if !kind.is_previewable() {
            debug!(file = %request.file_name, "Not previewable, download only");
            return None;
        }
        self.close();

        let source = if kind.uses_backend_preview() {
            SourceRef::Backend {
                material_id: request.material_id,
                file_index: request.file_index,
            }
        } else {
            SourceRef::File {
                path: request.file_path,
            }
        };
        let session = PreviewSession::new(kind, source, request.file_name, self.visible_unit_cap);
        info!(
            session = %session.id(),
            %kind,
            file = %session.file_name(),
            "Opening preview"
        );
        let command = session.load_command();

        self.session = Some(session);
        self.state = OverlayState::Loading;
        self.content = ContentArea::Loading;
        self.navigation = NavigationState::inert(kind);
        self.page_info.clear();
        Some(command)
    }

    /// Apply the result of a [`LoadCommand`]. For PDFs this returns the render
    /// of page 1.
    pub fn apply_load(&mut self, outcome: LoadOutcome<D>) -> Option<RenderCommand<D>> {
        let session = match self.session.as_ref() {
            Some(session) if session.accepts_load(outcome.ticket) => session,
            _ => {
                debug!(session = %outcome.ticket.session, "Dropping stale load result");
                return None;
            }
        };
        let kind = session.kind();

        match outcome.result {
            Err(LoadFailure::Cancelled) => {
                debug!(session = %outcome.ticket.session, "Load cancelled");
                None
            }
            Err(LoadFailure::Failed { detail }) => {
                self.fail_load(kind, detail);
                None
            }
            Ok(LoadedContent::Raster(document)) => self.settle_raster(document),
            Ok(LoadedContent::Paragraphs(preview)) => {
                self.settle_paragraphs(preview);
                None
            }
            Ok(LoadedContent::Slides(preview)) => {
                self.settle_slides(preview);
                None
            }
        }
    }

    /// Apply a rendered page. Anything but the latest render of the live
    /// session is dropped.
    pub fn apply_render(&mut self, outcome: RenderOutcome) {
        let accepted = self
            .session
            .as_ref()
            .is_some_and(|session| session.accepts_render(outcome.ticket));
        if !accepted {
            debug!(page = outcome.page, "Dropping superseded render");
            return;
        }
        match outcome.result {
            Ok(page) => self.content = ContentArea::Page(page),
            Err(LoadFailure::Cancelled) => {}
            Err(LoadFailure::Failed { detail }) => {
                warn!(page = outcome.page, detail = ?detail, "Showing page render failure");
                self.content = error_notice(self.labels.raster_page_failed());
            }
        }
    }

    pub fn previous(&mut self) -> Option<RenderCommand<D>> {
        self.step(Direction::Previous)
    }

    pub fn next(&mut self) -> Option<RenderCommand<D>> {
        self.step(Direction::Next)
    }

    /// Discard the session and hide the overlay. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.token().cancel();
            info!(session = %session.id(), kind = %session.kind(), "Closed preview");
        }
        self.state = OverlayState::Closed;
        self.content = ContentArea::Blank;
        self.navigation = NavigationState::default();
        self.page_info.clear();
    }

    fn step(&mut self, direction: Direction) -> Option<RenderCommand<D>> {
        if self.state != OverlayState::Ready {
            return None;
        }
        let zoom = self.raster_zoom;
        let session = self.session.as_mut()?;
        if !session.kind().supports_navigation() || !session.step(direction) {
            debug!(?direction, current = session.current_index(), "Navigation at boundary ignored");
            return None;
        }
        debug!(
            session = %session.id(),
            current = session.current_index(),
            total = session.total_units(),
            "Navigated"
        );

        let command = session.render_command(zoom);
        if command.is_some() {
            self.content = ContentArea::Loading;
        } else {
            self.show_current_slide();
        }
        self.sync_navigation();
        self.sync_page_info();
        command
    }

    fn fail_load(&mut self, kind: PreviewKind, detail: Option<String>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        warn!(session = %session.id(), %kind, detail = ?detail, "Preview failed to load");
        let cap = session.visible_unit_cap();
        session.settle(Loaded::Failed, 0, cap);

        let text = match kind {
            PreviewKind::RasterPaginated => self.labels.raster_load_failed().to_string(),
            _ => {
                let detail = detail
                    .as_deref()
                    .unwrap_or_else(|| self.labels.preview_unavailable());
                self.labels.load_failed(kind, detail)
            }
        };
        self.state = OverlayState::Ready;
        self.content = error_notice(&text);
        self.navigation = NavigationState::inert(kind);
        self.page_info.clear();
    }

    fn settle_empty(&mut self, kind: PreviewKind) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        info!(session = %session.id(), %kind, "Preview has no content");
        let cap = session.visible_unit_cap();
        session.settle(Loaded::Empty, 0, cap);
        self.state = OverlayState::Ready;
        self.content = ContentArea::Notice(Notice {
            kind: NoticeKind::Empty,
            text: self.labels.empty_content(kind),
        });
        self.navigation = NavigationState::default();
        self.page_info.clear();
    }

    fn settle_raster(&mut self, document: D) -> Option<RenderCommand<D>> {
        let native_pages = document.page_count();
        if native_pages == 0 {
            self.settle_empty(PreviewKind::RasterPaginated);
            return None;
        }
        let zoom = self.raster_zoom;
        let session = self.session.as_mut()?;
        let cap = session.visible_unit_cap();
        let bound = bounded_page_count(native_pages, cap);
        session.settle(
            Loaded::Raster {
                document,
                native_pages,
            },
            bound,
            cap,
        );
        info!(session = %session.id(), native_pages, bound, "PDF preview ready");
        let command = session.render_command(zoom);

        self.state = OverlayState::Ready;
        self.content = ContentArea::Loading;
        self.sync_navigation();
        self.sync_page_info();
        command
    }

    fn settle_paragraphs(&mut self, preview: ParagraphPreview) {
        if preview.paragraphs.is_empty() {
            self.settle_empty(PreviewKind::ParagraphText);
            return;
        }
        let blocks = preview
            .paragraphs
            .iter()
            .filter(|paragraph| !paragraph.is_blank())
            .map(|paragraph| ParagraphBlock {
                text: paragraph.text.clone(),
                heading: paragraph.is_heading(),
            })
            .collect();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        info!(
            session = %session.id(),
            paragraphs = preview.paragraphs.len(),
            total = preview.total_paragraphs,
            "DOCX preview ready"
        );
        // The whole batch is one unit; the backend already applied its cap.
        let cap = preview.preview_paragraphs;
        session.settle(Loaded::Paragraphs(preview), 1, cap);

        self.state = OverlayState::Ready;
        self.content = ContentArea::Paragraphs(blocks);
        self.sync_navigation();
        self.sync_page_info();
    }

    fn settle_slides(&mut self, preview: SlidePreview) {
        if preview.slides.is_empty() {
            self.settle_empty(PreviewKind::SlideDeck);
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let bound = preview.slides.len();
        info!(
            session = %session.id(),
            slides = bound,
            total = preview.total_slides,
            "PPTX preview ready"
        );
        session.settle(Loaded::Slides(preview), bound, bound);

        self.state = OverlayState::Ready;
        self.show_current_slide();
        self.sync_navigation();
        self.sync_page_info();
    }

    fn show_current_slide(&mut self) {
        let Some(slide) = self.session.as_ref().and_then(|session| session.current_slide()) else {
            return;
        };
        let blocks: Vec<String> = slide.content.iter().map(|item| item.text.clone()).collect();
        let placeholder = blocks
            .is_empty()
            .then(|| self.labels.slide_without_text().to_string());
        self.content = ContentArea::Slide(SlideView {
            title: self.labels.slide_title(slide.slide_number),
            blocks,
            placeholder,
        });
    }

    fn sync_navigation(&mut self) {
        self.navigation = match &self.session {
            Some(session) if session.kind().supports_navigation() => NavigationState {
                visible: true,
                prev_enabled: session.can_go_previous(),
                next_enabled: session.can_go_next(),
            },
            _ => NavigationState::default(),
        };
    }

    fn sync_page_info(&mut self) {
        let Some(session) = &self.session else {
            self.page_info.clear();
            return;
        };
        self.page_info = match session.loaded() {
            Some(Loaded::Raster { native_pages, .. }) => self.labels.raster_page_info(
                session.current_index(),
                session.total_units(),
                *native_pages,
                session.visible_unit_cap(),
            ),
            Some(Loaded::Paragraphs(preview)) => self.labels.paragraph_info(
                preview.preview_paragraphs,
                preview.total_paragraphs,
                preview.estimated_pages,
            ),
            Some(Loaded::Slides(preview)) => self.labels.slide_info(
                session.current_index(),
                preview.preview_slides,
                preview.total_slides,
            ),
            _ => String::new(),
        };
    }
}

fn error_notice(text: &str) -> ContentArea {
    ContentArea::Notice(Notice {
        kind: NoticeKind::Error,
        text: text.to_string(),
    })
}
