use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use image::RgbaImage;
use material_preview::{
    backend::PreviewBackend,
    overlay::{ContentArea, NoticeKind},
    HttpBackend, Locale, PreviewConfig, PreviewController, PreviewError, RasterDocument,
    RasterRenderer, Result,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const TOKEN: &str = "secret-token";

async fn preview(Path((material_id, file_index)): Path<(i64, usize)>) -> Response {
    if material_id != 1 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Không tìm thấy học liệu"})),
        )
            .into_response();
    }
    match file_index {
        0 => Json(json!({
            "type": "docx",
            "total_paragraphs": 90,
            "preview_paragraphs": 2,
            "paragraphs": [
                {"text": "Giới thiệu", "style": "Heading 1"},
                {"text": "Nội dung môn học", "style": "Normal"}
            ],
            "estimated_pages": 3
        }))
        .into_response(),
        1 => Json(json!({
            "type": "pptx",
            "total_slides": 8,
            "preview_slides": 2,
            "slides": [
                {"slide_number": 1, "content": [{"text": "Tiêu đề", "type": "PLACEHOLDER (14)"}]},
                {"slide_number": 2, "content": []}
            ]
        }))
        .into_response(),
        2 => (StatusCode::NOT_FOUND, Json(json!({"detail": "File not found"}))).into_response(),
        3 => (StatusCode::INTERNAL_SERVER_ERROR, "Traceback (most recent call last)").into_response(),
        _ => (StatusCode::BAD_REQUEST, Json(json!({}))).into_response(),
    }
}

async fn material(headers: HeaderMap, Path(material_id): Path<i64>) -> Response {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if cookie != format!("access_token=Bearer {TOKEN}") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        )
            .into_response();
    }
    Json(json!({
        "id": material_id,
        "title": "Xác suất thống kê",
        "subject": "Toán",
        "topic": "Biến ngẫu nhiên",
        "files": [
            {"type": "Tài liệu", "path": "/static/uploads/stats.pdf", "name": "stats.pdf"},
            {"type": "Bài giảng", "path": "/static/uploads/week1.docx", "name": "week1.docx"},
            {"type": "Đề cương", "path": "/static/uploads/outline.xlsx", "name": "outline.xlsx"}
        ],
        "department": {"id": 2, "code": "K2", "name": "Khoa Khoa học cơ bản"},
        "uploader": {"id": 5, "full_name": "Trần Thị B", "email": "b@example.edu"},
        "created_at": "2024-10-01T09:15:00.5",
        "updated_at": "2024-10-01T09:15:00.5"
    }))
    .into_response()
}

/// Seven pages, marked the way a PDF's page objects are.
async fn pdf() -> Vec<u8> {
    let mut body = b"%PDF-1.7\n".to_vec();
    for n in 1..=7 {
        body.extend_from_slice(format!("{n} 0 obj << /Type /Page >> endobj\n").as_bytes());
    }
    body
}

async fn spawn_backend() -> String {
    let router = Router::new()
        .route("/api/preview/{material_id}/{file_index}", get(preview))
        .route("/api/materials/{material_id}", get(material))
        .route("/static/uploads/stats.pdf", get(pdf));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn backend(base_url: &str, access_token: Option<&str>) -> HttpBackend {
    HttpBackend::new(&PreviewConfig {
        base_url: base_url.to_string(),
        access_token: access_token.map(str::to_string),
        locale: Locale::En,
        ..PreviewConfig::default()
    })
    .unwrap()
}

/// Counts `/Type /Page` markers instead of parsing the PDF.
#[derive(Debug, Clone)]
struct MarkerDocument {
    pages: usize,
}

impl RasterDocument for MarkerDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    async fn render_page(&self, _page: usize, zoom: f32) -> Result<RgbaImage> {
        Ok(RgbaImage::new((10.0 * zoom) as u32, (10.0 * zoom) as u32))
    }
}

struct MarkerRenderer {
    backend: Arc<HttpBackend>,
}

impl RasterRenderer for MarkerRenderer {
    type Document = MarkerDocument;

    async fn open(&self, source: &str) -> Result<MarkerDocument> {
        let bytes = self.backend.fetch_file(source).await?;
        let text = String::from_utf8_lossy(&bytes);
        if !text.starts_with("%PDF-") {
            return Err(PreviewError::Renderer("not a PDF".to_string()));
        }
        Ok(MarkerDocument {
            pages: text.matches("/Type /Page").count(),
        })
    }
}

#[tokio::test]
async fn fetches_paragraph_and_slide_previews() {
    let base_url = spawn_backend().await;
    let backend = backend(&base_url, None);

    let paragraphs = backend.fetch_paragraphs(1, 0).await.unwrap();
    assert_eq!(paragraphs.preview_paragraphs, 2);
    assert_eq!(paragraphs.total_paragraphs, 90);
    assert!(paragraphs.paragraphs[0].is_heading());

    let slides = backend.fetch_slides(1, 1).await.unwrap();
    assert_eq!(slides.slides.len(), 2);
    assert_eq!(slides.total_slides, 8);
}

#[tokio::test]
async fn error_bodies_map_to_details() {
    let base_url = spawn_backend().await;
    let backend = backend(&base_url, None);

    match backend.fetch_paragraphs(1, 2).await.unwrap_err() {
        PreviewError::Backend { status, detail } => {
            assert_eq!(status, 404);
            assert_eq!(detail.as_deref(), Some("File not found"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    match backend.fetch_slides(1, 3).await.unwrap_err() {
        PreviewError::Backend { status, detail } => {
            assert_eq!(status, 500);
            assert_eq!(detail.as_deref(), Some("Unknown error"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    match backend.fetch_slides(1, 4).await.unwrap_err() {
        PreviewError::Backend { status, detail } => {
            assert_eq!(status, 400);
            assert_eq!(detail, None);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn material_detail_requires_the_access_cookie() {
    let base_url = spawn_backend().await;

    let anonymous = backend(&base_url, None);
    assert!(matches!(
        anonymous.fetch_material(1).await,
        Err(PreviewError::Backend { status: 401, .. })
    ));

    let signed_in = backend(&base_url, Some(TOKEN));
    let detail = signed_in.fetch_material(1).await.unwrap();
    assert_eq!(detail.title, "Xác suất thống kê");
    let previewable: Vec<bool> = detail
        .files
        .iter()
        .map(|file| file.kind().is_previewable())
        .collect();
    assert_eq!(previewable, vec![true, true, false]);
}

#[tokio::test]
async fn controller_previews_over_http() {
    let base_url = spawn_backend().await;
    let shared = Arc::new(backend(&base_url, None));
    let config = PreviewConfig {
        locale: Locale::En,
        ..PreviewConfig::default()
    };
    let renderer = MarkerRenderer {
        backend: Arc::clone(&shared),
    };
    let mut controller = PreviewController::new(&config, 1, backend(&base_url, None), renderer);

    assert!(
        controller
            .open_preview(0, "/static/uploads/stats.pdf", "stats.pdf")
            .await
    );
    assert_eq!(controller.overlay().total_units(), 5);
    assert_eq!(
        controller.overlay().page_info(),
        "Page 1/5 (previewing 5/7 pages)"
    );
    assert!(matches!(controller.overlay().content(), ContentArea::Page(page) if page.width() == 15));

    assert!(controller.open_preview(2, "/static/uploads/gone.docx", "gone.docx").await);
    match controller.overlay().content() {
        ContentArea::Notice(notice) => {
            assert_eq!(notice.kind, NoticeKind::Error);
            assert!(notice.text.contains("File not found"));
        }
        other => panic!("unexpected content {other:?}"),
    }
    assert_eq!(controller.overlay().total_units(), 0);

    assert!(controller.open_preview(1, "/static/uploads/deck.pptx", "deck.pptx").await);
    controller.go_to_next_unit().await;
    assert_eq!(controller.overlay().current_index(), 2);
    assert_eq!(
        controller.overlay().page_info(),
        "Slide 2/2 (previewing 2/8 slides)"
    );
}
