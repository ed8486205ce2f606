//! Wire types of the materials REST API.

use crate::kind::PreviewKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One paragraph of a `.docx` preview.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Paragraph {
    pub text: String,
    #[serde(default = "default_style")]
    pub style: String,
}

impl Paragraph {
    pub fn is_heading(&self) -> bool {
        self.style.contains("Heading")
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn default_style() -> String {
    "Normal".to_string()
}

/// `GET /api/preview/{id}/{index}` for a `.docx` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParagraphPreview {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub preview_paragraphs: usize,
    #[serde(default)]
    pub total_paragraphs: usize,
    #[serde(default)]
    pub estimated_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlideItem {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Slide {
    pub slide_number: usize,
    #[serde(default)]
    pub content: Vec<SlideItem>,
}

/// `GET /api/preview/{id}/{index}` for a `.pptx` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlidePreview {
    #[serde(default)]
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub preview_slides: usize,
    #[serde(default)]
    pub total_slides: usize,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

/// An attachment of a material, as stored in `files_json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MaterialFile {
    #[serde(rename = "type", default)]
    pub file_type: String,
    pub path: String,
    pub name: String,
}

impl MaterialFile {
    pub fn kind(&self) -> PreviewKind {
        PreviewKind::classify(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DepartmentRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploaderRef {
    pub id: i64,
    pub full_name: String,
    pub email: String,
}

/// `GET /api/materials/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MaterialDetail {
    pub id: i64,
    pub title: String,
    pub subject: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub files: Vec<MaterialFile>,
    #[serde(default)]
    pub department: Option<DepartmentRef>,
    #[serde(default)]
    pub uploader: Option<UploaderRef>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
