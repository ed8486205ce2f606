use anyhow::{anyhow, Context};
use image::RgbaImage;
use material_preview::{
    HttpBackend, PreviewBackend, PreviewError, RasterDocument, RasterRenderer, Result,
};
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, warn};

type Reply<T> = oneshot::Sender<anyhow::Result<T>>;

enum Request {
    Open {
        bytes: Vec<u8>,
        reply: Reply<(u64, usize)>,
    },
    Render {
        id: u64,
        page: usize,
        zoom: f32,
        reply: Reply<RgbaImage>,
    },
    Close {
        id: u64,
    },
}

/// Handle to the thread that owns the only PDFium binding of the process.
///
/// PDFium handles are not `Send`, so the library is bound once on the worker
/// and every parsed document stays there until its last handle is dropped.
/// Requests are served one at a time.
#[derive(Debug, Clone)]
pub struct PdfiumWorker {
    requests: Sender<Request>,
}

impl PdfiumWorker {
    pub fn spawn(library_dir: Option<PathBuf>) -> io::Result<Self> {
        Self::spawn_with(move || bind(library_dir.as_deref()))
    }

    fn spawn_with<F>(bind: F) -> io::Result<Self>
    where
        F: FnOnce() -> anyhow::Result<Pdfium> + Send + 'static,
    {
        let (requests, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("pdfium".into())
            .spawn(move || serve(bind, receiver))?;
        Ok(Self { requests })
    }

    async fn call<T>(&self, request: impl FnOnce(Reply<T>) -> Request) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(request(reply))
            .map_err(|_| worker_stopped())?;
        response
            .await
            .map_err(|_| worker_stopped())?
            .map_err(|err| PreviewError::Renderer(format!("{err:#}")))
    }
}

fn worker_stopped() -> PreviewError {
    PreviewError::Renderer("PDFium worker stopped".to_string())
}

fn serve<F>(bind: F, requests: Receiver<Request>)
where
    F: FnOnce() -> anyhow::Result<Pdfium>,
{
    let pdfium = bind().map_err(|err| format!("{err:#}"));
    if let Err(err) = &pdfium {
        warn!("PDFium unavailable, PDF previews will fail: {err}");
    }
    let mut documents = HashMap::new();
    let mut next_id = 0u64;

    while let Ok(request) = requests.recv() {
        match request {
            Request::Open { bytes, reply } => {
                let opened = match &pdfium {
                    Ok(pdfium) => pdfium
                        .load_pdf_from_byte_vec(bytes, None)
                        .context("Failed to load PDF document")
                        .map(|document| {
                            next_id += 1;
                            let page_count = document.pages().len() as usize;
                            documents.insert(next_id, document);
                            (next_id, page_count)
                        }),
                    Err(err) => Err(anyhow!("{err}")),
                };
                let _ = reply.send(opened);
            }
            Request::Render {
                id,
                page,
                zoom,
                reply,
            } => {
                let rendered = documents
                    .get(&id)
                    .context("PDF document is no longer open")
                    .and_then(|document| rasterize(document, page, zoom));
                let _ = reply.send(rendered);
            }
            Request::Close { id } => {
                documents.remove(&id);
                debug!(id, open = documents.len(), "Closed PDF document");
            }
        }
    }
    debug!("PDFium worker finished");
}

/// PDF renderer using pdfium-render through a [`PdfiumWorker`].
#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    backend: HttpBackend,
    worker: PdfiumWorker,
}

impl PdfiumRenderer {
    pub fn new(backend: HttpBackend, worker: PdfiumWorker) -> Self {
        Self { backend, worker }
    }
}

impl RasterRenderer for PdfiumRenderer {
    type Document = PdfiumDocument;

    async fn open(&self, source: &str) -> Result<PdfiumDocument> {
        self.worker.open(self.backend.fetch_file(source).await?).await
    }
}

impl PdfiumWorker {
    async fn open(&self, bytes: Vec<u8>) -> Result<PdfiumDocument> {
        let size = bytes.len();
        let (id, page_count) = self
            .call(|reply| Request::Open { bytes, reply })
            .await?;
        debug!(id, page_count, bytes = size, "Loaded PDF");
        Ok(PdfiumDocument {
            handle: Arc::new(DocumentHandle {
                id,
                requests: self.requests.clone(),
            }),
            page_count,
            worker: self.clone(),
        })
    }
}

/// Releases the worker's copy of the document when the last clone goes away.
struct DocumentHandle {
    id: u64,
    requests: Sender<Request>,
}

impl Drop for DocumentHandle {
    fn drop(&mut self) {
        let _ = self.requests.send(Request::Close { id: self.id });
    }
}

/// A PDF parsed on the worker plus its native page count.
#[derive(Clone)]
pub struct PdfiumDocument {
    handle: Arc<DocumentHandle>,
    page_count: usize,
    worker: PdfiumWorker,
}

impl fmt::Debug for PdfiumDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfiumDocument")
            .field("id", &self.handle.id)
            .field("page_count", &self.page_count)
            .finish()
    }
}

impl RasterDocument for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn render_page(&self, page: usize, zoom: f32) -> Result<RgbaImage> {
        let id = self.handle.id;
        self.worker
            .call(|reply| Request::Render {
                id,
                page,
                zoom,
                reply,
            })
            .await
    }
}

fn bind(library_dir: Option<&Path>) -> anyhow::Result<Pdfium> {
    let local = library_dir.unwrap_or_else(|| Path::new("./"));
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(local))
        .or_else(|_| Pdfium::bind_to_system_library())
        .context("Failed to bind to PDFium library. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries")?;
    Ok(Pdfium::new(bindings))
}

/// Rasterize 1-based `page_number` at `zoom` times its natural size.
fn rasterize(document: &PdfDocument<'_>, page_number: usize, zoom: f32) -> anyhow::Result<RgbaImage> {
    let index = page_number
        .checked_sub(1)
        .and_then(|index| u16::try_from(index).ok())
        .context("Page index out of bounds")?;
    let page = document
        .pages()
        .get(index)
        .context("Page index out of bounds")?;

    let render_width = (page.width().value * zoom) as i32;
    let render_height = (page.height().value * zoom) as i32;

    let render_config = PdfRenderConfig::new()
        .set_target_width(render_width)
        .set_maximum_height(render_height)
        .rotate_if_landscape(PdfPageRenderRotation::None, false);

    let bitmap = page
        .render_with_config(&render_config)
        .context("Failed to render page")?;

    let width = bitmap.width() as u32;
    let height = bitmap.height() as u32;
    let mut buffer = bitmap.as_raw_bytes().to_vec();
    bgra_to_rgba(&mut buffer);
    let image = RgbaImage::from_raw(width, height, buffer)
        .context("Failed to create image from bitmap")?;
    Ok(image)
}

/// PDFium bitmaps are BGRA.
fn bgra_to_rgba(buffer: &mut [u8]) {
    for pixel in buffer.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
}
