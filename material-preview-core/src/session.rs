//! The single preview session owned by the overlay.

use crate::backend::{ParagraphPreview, SlidePreview};
use crate::cancellation::CancellationToken;
use crate::kind::PreviewKind;
use crate::loader::{LoadCommand, RenderCommand};
use crate::raster::RasterDocument;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one asynchronous request issued on behalf of a session.
/// Sequence 0 is the initial load; renders count up from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub session: SessionId,
    pub seq: u64,
}

const LOAD_SEQ: u64 = 0;

/// Where the content of a session comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// Static file fetched and paginated by the raster renderer.
    File { path: String },
    /// Content extracted by `/api/preview/{material_id}/{file_index}`.
    Backend { material_id: i64, file_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// What the session holds once its load has settled.
#[derive(Debug, Clone)]
pub enum Loaded<D> {
    Raster { document: D, native_pages: usize },
    Paragraphs(ParagraphPreview),
    Slides(SlidePreview),
    /// Nothing to show: zero pages, paragraphs or slides.
    Empty,
    Failed,
}

/// State of one preview. `current_index` is 1-based and stays within
/// `1..=total_units` whenever `total_units > 0`.
#[derive(Debug)]
pub struct PreviewSession<D> {
    id: SessionId,
    kind: PreviewKind,
    source: SourceRef,
    file_name: String,
    total_units: usize,
    visible_unit_cap: usize,
    current_index: usize,
    loaded: Option<Loaded<D>>,
    token: CancellationToken,
    next_seq: u64,
    latest_render: Option<u64>,
}

impl<D: RasterDocument> PreviewSession<D> {
    pub fn new(kind: PreviewKind, source: SourceRef, file_name: String, visible_unit_cap: usize) -> Self {
        Self {
            id: SessionId::new(),
            kind,
            source,
            file_name,
            total_units: 0,
            visible_unit_cap,
            current_index: 1,
            loaded: None,
            token: CancellationToken::new(),
            next_seq: LOAD_SEQ + 1,
            latest_render: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> PreviewKind {
        self.kind
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn total_units(&self) -> usize {
        self.total_units
    }

    pub fn visible_unit_cap(&self) -> usize {
        self.visible_unit_cap
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn loaded(&self) -> Option<&Loaded<D>> {
        self.loaded.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loaded.is_none()
    }

    pub fn load_command(&self) -> LoadCommand {
        let ticket = Ticket {
            session: self.id,
            seq: LOAD_SEQ,
        };
        let token = self.token.clone();
        match (&self.source, self.kind) {
            (SourceRef::Backend { material_id, file_index }, PreviewKind::SlideDeck) => {
                LoadCommand::Slides {
                    ticket,
                    material_id: *material_id,
                    file_index: *file_index,
                    token,
                }
            }
            (SourceRef::Backend { material_id, file_index }, _) => LoadCommand::Paragraphs {
                ticket,
                material_id: *material_id,
                file_index: *file_index,
                token,
            },
            (SourceRef::File { path }, _) => LoadCommand::Raster {
                ticket,
                source: path.clone(),
                token,
            },
        }
    }

    pub fn accepts_load(&self, ticket: Ticket) -> bool {
        ticket.session == self.id
            && ticket.seq == LOAD_SEQ
            && self.is_loading()
            && !self.token.is_cancelled()
    }

    /// Only the most recently requested render of a live session is applied.
    pub fn accepts_render(&self, ticket: Ticket) -> bool {
        ticket.session == self.id
            && self.latest_render == Some(ticket.seq)
            && !self.token.is_cancelled()
    }

    /// Settle the load. `total_units` and the cap are fixed from here on.
    pub fn settle(&mut self, loaded: Loaded<D>, total_units: usize, visible_unit_cap: usize) {
        self.total_units = total_units;
        self.visible_unit_cap = visible_unit_cap;
        self.current_index = 1;
        self.loaded = Some(loaded);
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_index > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current_index < self.total_units
    }

    /// Move one unit. Returns `false`, leaving the index untouched, at a boundary.
    pub fn step(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Previous if self.can_go_previous() => {
                self.current_index -= 1;
                true
            }
            Direction::Next if self.can_go_next() => {
                self.current_index += 1;
                true
            }
            _ => false,
        }
    }

    /// Request the current page. Supersedes any render still in flight.
    pub fn render_command(&mut self, zoom: f32) -> Option<RenderCommand<D>> {
        let document = match &self.loaded {
            Some(Loaded::Raster { document, .. }) => document.clone(),
            _ => return None,
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_render = Some(seq);
        Some(RenderCommand {
            ticket: Ticket { session: self.id, seq },
            document,
            page: self.current_index,
            zoom,
            token: self.token.clone(),
        })
    }

    pub fn current_slide(&self) -> Option<&crate::backend::Slide> {
        match &self.loaded {
            Some(Loaded::Slides(preview)) => preview.slides.get(self.current_index - 1),
            _ => None,
        }
    }
}
