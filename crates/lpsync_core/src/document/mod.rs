//! Layout document persistence.
//!
//! # Responsibility
//! - Read and write `LayoutDocument` files.
//! - Pick the text encoding from the file extension.
//!
//! # Invariants
//! - `.json` files use JSON; every other extension uses YAML.
//! - Writes replace the target file as a whole.

use crate::model::layout::LayoutDocument;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Text encoding of a layout document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

#[derive(Debug)]
pub enum DocumentError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Yaml(err) => write!(f, "invalid yaml layout document: {err}"),
            Self::Json(err) => write!(f, "invalid json layout document: {err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for DocumentError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parses a document from text in the given encoding.
pub fn parse_document(text: &str, format: DocumentFormat) -> DocumentResult<LayoutDocument> {
    let document = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
        DocumentFormat::Json => serde_json::from_str(text)?,
    };
    Ok(document)
}

/// Renders a document as text in the given encoding.
pub fn render_document(
    document: &LayoutDocument,
    format: DocumentFormat,
) -> DocumentResult<String> {
    let text = match format {
        DocumentFormat::Yaml => serde_yaml::to_string(document)?,
        DocumentFormat::Json => {
            let mut text = serde_json::to_string_pretty(document)?;
            text.push('\n');
            text
        }
    };
    Ok(text)
}

pub fn load_document(path: &Path) -> DocumentResult<LayoutDocument> {
    let format = DocumentFormat::from_path(path);
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_document(&text, format)?;
    info!(
        "event=document_load module=document status=ok format={} path={} app_pages={} widget_pages={}",
        format.as_str(),
        path.display(),
        document.apps.pages.len(),
        document.widgets.pages.len()
    );
    Ok(document)
}

pub fn save_document(path: &Path, document: &LayoutDocument) -> DocumentResult<()> {
    let format = DocumentFormat::from_path(path);
    let text = render_document(document, format)?;
    std::fs::write(path, text).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "event=document_save module=document status=ok format={} path={}",
        format.as_str(),
        path.display()
    );
    Ok(())
}
