//! Walks every previewable file of a material without opening a window.

use crate::renderer::{PdfiumRenderer, PdfiumWorker};
use anyhow::{Context, Result};
use material_preview::{
    overlay::ContentArea, HttpBackend, PreviewBackend, PreviewConfig, PreviewController,
};
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run(
    config: &PreviewConfig,
    material_id: i64,
    only_file: Option<usize>,
    dump_dir: Option<PathBuf>,
) -> Result<()> {
    let backend = HttpBackend::new(config).context("Failed to build HTTP client")?;
    let material = backend
        .fetch_material(material_id)
        .await
        .with_context(|| format!("Failed to load material {material_id}"))?;
    println!("{} ({})", material.title, material.subject);

    if let Some(dir) = &dump_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let worker = PdfiumWorker::spawn(config.pdfium_library_path.clone())
        .context("Failed to start PDFium worker")?;
    let renderer = PdfiumRenderer::new(backend.clone(), worker);
    let mut controller = PreviewController::new(config, material_id, backend, renderer);

    for (index, file) in material.files.iter().enumerate() {
        if only_file.is_some_and(|only| only != index) {
            continue;
        }
        if !controller.open_preview(index, &file.path, &file.name).await {
            println!("[{index}] {}: download only", file.name);
            continue;
        }
        info!(index, file = %file.name, kind = %file.kind(), "Walking preview");
        println!("[{index}] {}", file.name);

        loop {
            report(controller.overlay().content(), controller.overlay().page_info());
            if let (Some(dir), ContentArea::Page(page)) = (&dump_dir, controller.overlay().content()) {
                save_page(dir, index, page.page, &page.image)?;
            }
            let navigation = controller.overlay().navigation();
            if !navigation.next_enabled {
                break;
            }
            controller.go_to_next_unit().await;
        }
        controller.close_preview();
    }
    Ok(())
}

fn report(content: &ContentArea, page_info: &str) {
    let summary = match content {
        ContentArea::Blank => "blank".to_string(),
        ContentArea::Loading => "loading".to_string(),
        ContentArea::Page(page) => format!("page {} ({}x{})", page.page, page.width(), page.height()),
        ContentArea::Paragraphs(blocks) => format!("{} paragraphs", blocks.len()),
        ContentArea::Slide(slide) => format!("{}, {} blocks", slide.title, slide.blocks.len()),
        ContentArea::Notice(notice) => notice.text.clone(),
    };
    if page_info.is_empty() {
        println!("    {summary}");
    } else {
        println!("    {page_info}: {summary}");
    }
}

fn save_page(dir: &Path, file_index: usize, page: usize, image: &image::RgbaImage) -> Result<()> {
    let path = dir.join(format!("file{file_index}-page{page}.png"));
    image
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Saved page");
    Ok(())
}
