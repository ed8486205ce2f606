use anyhow::{Context, Result};
use clap::Parser;
use iced::{
    keyboard::{self, key},
    widget::{button, center, column, container, horizontal_space, image as img, row, scrollable, text, Column},
    Alignment, Element, Length, Subscription, Task, Theme,
};
use material_preview::{
    config::load_config, render_page, HttpBackend, LoadCommand, LoadOutcome, Loader, MaterialDetail,
    MaterialFile, OpenRequest, PreviewBackend, PreviewConfig, PreviewOverlay, RenderCommand,
    RenderOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

mod cli;
mod headless;
mod overlay;
mod renderer;

use cli::Cli;
use renderer::{PdfiumDocument, PdfiumRenderer, PdfiumWorker};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
type ViewerLoader = Loader<HttpBackend, PdfiumRenderer>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let reload_handle = init_tracing();

    let mut config = load_config(&cli.config);
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    set_log_level(&reload_handle, config.log_level.as_filter_str());
    info!(
        base_url = %config.base_url,
        material = cli.material,
        locale = %config.locale,
        "Starting material preview"
    );

    if cli.headless {
        let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
        return runtime.block_on(headless::run(
            &config,
            cli.material,
            cli.file,
            cli.dump_dir.clone(),
        ));
    }

    let backend = HttpBackend::new(&config).context("Failed to build HTTP client")?;
    let worker = PdfiumWorker::spawn(config.pdfium_library_path.clone())
        .context("Failed to start PDFium worker")?;
    let renderer = PdfiumRenderer::new(backend.clone(), worker);
    let loader = Arc::new(Loader::new(backend, renderer));
    let material_id = cli.material;
    let download_dir = cli.download_dir.clone();

    iced::application(Viewer::title, Viewer::update, Viewer::view)
        .subscription(Viewer::subscription)
        .theme(|_| Theme::Dark)
        .run_with(move || Viewer::new(&config, material_id, loader, download_dir))
        .context("Failed to run the viewer")
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(filter_layer))
        .init();
    handle
}

/// Apply the configured level unless `RUST_LOG` already chose one.
fn set_log_level(handle: &ReloadHandle, level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let directives = format!("material_preview={level},material_preview_viewer={level},warn");
    let parsed = EnvFilter::builder()
        .parse(&directives)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    MaterialLoaded(Result<MaterialDetail, String>),
    OpenPreview(usize),
    PreviewLoaded(LoadOutcome<PdfiumDocument>),
    PageRendered(RenderOutcome),
    PreviousUnit,
    NextUnit,
    ClosePreview,
    Download(usize),
    Downloaded(Result<PathBuf, String>),
}

enum MaterialState {
    Loading,
    Loaded(MaterialDetail),
    Failed(String),
}

struct Viewer {
    material_id: i64,
    material: MaterialState,
    overlay: PreviewOverlay<PdfiumDocument>,
    page_handle: Option<(usize, img::Handle)>,
    loader: Arc<ViewerLoader>,
    download_dir: PathBuf,
    status: Option<String>,
}

impl Viewer {
    fn new(
        config: &PreviewConfig,
        material_id: i64,
        loader: Arc<ViewerLoader>,
        download_dir: PathBuf,
    ) -> (Self, Task<Message>) {
        let fetcher = Arc::clone(&loader);
        let task = Task::perform(
            async move {
                fetcher
                    .backend()
                    .fetch_material(material_id)
                    .await
                    .map_err(|e| e.to_string())
            },
            Message::MaterialLoaded,
        );
        (
            Self {
                material_id,
                material: MaterialState::Loading,
                overlay: PreviewOverlay::new(config),
                page_handle: None,
                loader,
                download_dir,
                status: None,
            },
            task,
        )
    }

    fn title(&self) -> String {
        match &self.material {
            MaterialState::Loaded(detail) => detail.title.clone(),
            _ => "Material preview".to_string(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(handle_key)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::MaterialLoaded(Ok(detail)) => {
                info!(material = detail.id, files = detail.files.len(), "Material loaded");
                self.material = MaterialState::Loaded(detail);
            }
            Message::MaterialLoaded(Err(e)) => {
                error!("Failed to load material: {}", e);
                self.material = MaterialState::Failed(e);
            }
            Message::OpenPreview(index) => {
                let Some(file) = self.file(index) else {
                    return Task::none();
                };
                let request = OpenRequest {
                    material_id: self.material_id,
                    file_index: index,
                    file_path: file.path.clone(),
                    file_name: file.name.clone(),
                };
                if let Some(command) = self.overlay.open(request) {
                    self.page_handle = None;
                    return self.load(command);
                }
            }
            Message::PreviewLoaded(outcome) => {
                if let Some(command) = self.overlay.apply_load(outcome) {
                    return self.render(command);
                }
            }
            Message::PageRendered(outcome) => {
                self.overlay.apply_render(outcome);
            }
            Message::PreviousUnit => {
                if let Some(command) = self.overlay.previous() {
                    self.refresh_page_handle();
                    return self.render(command);
                }
            }
            Message::NextUnit => {
                if let Some(command) = self.overlay.next() {
                    self.refresh_page_handle();
                    return self.render(command);
                }
            }
            Message::ClosePreview => {
                self.overlay.close();
            }
            Message::Download(index) => {
                let Some(file) = self.file(index) else {
                    return Task::none();
                };
                let path = file.path.clone();
                let target = self.download_dir.join(&file.name);
                let loader = Arc::clone(&self.loader);
                return Task::perform(
                    async move {
                        let bytes = loader
                            .backend()
                            .fetch_file(&path)
                            .await
                            .map_err(|e| e.to_string())?;
                        tokio::fs::write(&target, bytes)
                            .await
                            .map_err(|e| format!("{}: {e}", target.display()))?;
                        Ok(target)
                    },
                    Message::Downloaded,
                );
            }
            Message::Downloaded(result) => {
                self.status = Some(match result {
                    Ok(path) => {
                        info!(path = %path.display(), "Downloaded file");
                        format!("{} {}", self.overlay.labels().download(), path.display())
                    }
                    Err(e) => {
                        error!("Download failed: {}", e);
                        e
                    }
                });
            }
        }
        self.refresh_page_handle();
        Task::none()
    }

    fn file(&self, index: usize) -> Option<&MaterialFile> {
        match &self.material {
            MaterialState::Loaded(detail) => detail.files.get(index),
            _ => None,
        }
    }

    fn load(&self, command: LoadCommand) -> Task<Message> {
        let loader = Arc::clone(&self.loader);
        Task::perform(
            async move { loader.load(command).await },
            Message::PreviewLoaded,
        )
    }

    fn render(&self, command: RenderCommand<PdfiumDocument>) -> Task<Message> {
        Task::perform(render_page(command), Message::PageRendered)
    }

    /// Keep one GPU image handle per displayed page instead of rebuilding it
    /// on every frame.
    fn refresh_page_handle(&mut self) {
        self.page_handle = match self.overlay.content() {
            material_preview::ContentArea::Page(page) => match self.page_handle.take() {
                Some((cached, handle)) if cached == page.page => Some((cached, handle)),
                _ => Some((
                    page.page,
                    img::Handle::from_rgba(page.width(), page.height(), page.image.as_raw().clone()),
                )),
            },
            _ => None,
        };
    }

    fn view(&self) -> Element<Message> {
        let base = self.material_view();
        if self.overlay.is_open() {
            let page = self.page_handle.as_ref().map(|(_, handle)| handle);
            overlay::modal(base, overlay::view(&self.overlay, page), Message::ClosePreview)
        } else {
            base
        }
    }

    fn material_view(&self) -> Element<Message> {
        let labels = self.overlay.labels();
        let detail = match &self.material {
            MaterialState::Loading => return center(text(labels.loading())).into(),
            MaterialState::Failed(e) => return center(text(e.as_str()).style(text::danger)).into(),
            MaterialState::Loaded(detail) => detail,
        };

        let mut info = column![text(detail.title.as_str()).size(28)].spacing(6);
        let mut subject = detail.subject.clone();
        if let Some(topic) = &detail.topic {
            subject = format!("{subject} · {topic}");
        }
        info = info.push(text(subject).size(16));
        if let Some(department) = &detail.department {
            info = info.push(text(department.name.as_str()).size(14));
        }
        let uploaded = match &detail.uploader {
            Some(uploader) => format!(
                "{} · {}",
                uploader.full_name,
                detail.created_at.format("%d/%m/%Y")
            ),
            None => detail.created_at.format("%d/%m/%Y").to_string(),
        };
        info = info.push(text(uploaded).size(14).style(text::secondary));

        let files: Element<Message> = if detail.files.is_empty() {
            text(labels.no_files()).into()
        } else {
            Column::with_children(detail.files.iter().enumerate().map(|(index, file)| {
                let mut actions = row![].spacing(8);
                if file.kind().is_previewable() {
                    actions = actions.push(
                        button(text(labels.preview())).on_press(Message::OpenPreview(index)),
                    );
                }
                actions = actions
                    .push(button(text(labels.download())).on_press(Message::Download(index)));

                container(
                    row![
                        text(file.file_type.as_str()).size(12).style(text::primary),
                        text(file.name.as_str()),
                        horizontal_space(),
                        actions,
                    ]
                    .spacing(10)
                    .align_y(Alignment::Center),
                )
                .padding(10)
                .style(container::bordered_box)
                .into()
            }))
            .spacing(8)
            .into()
        };

        let mut content = column![info, scrollable(files).height(Length::Fill)]
            .spacing(20)
            .padding(20);
        if let Some(status) = &self.status {
            content = content.push(text(status.as_str()).size(13));
        }
        content.into()
    }
}

fn handle_key(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key {
        keyboard::Key::Named(key::Named::Escape) => Some(Message::ClosePreview),
        keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::PreviousUnit),
        keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::NextUnit),
        _ => None,
    }
}
