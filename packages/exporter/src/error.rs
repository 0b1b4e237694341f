use retouch_common::CommonError;
use retouch_editor::TreeError;
use thiserror::Error;

/// Errors that can occur while exporting a page
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Content root not found (no data-content-root element and no <main>)")]
    ContentRootNotFound,

    #[error("Page {0} has no content to export")]
    EmptyContent(String),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Archive error: {0}")]
    Archive(#[from] CommonError),

    #[error("Invalid style config: {0}")]
    InvalidStyleConfig(#[from] serde_json::Error),
}
