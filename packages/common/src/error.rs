use std::path::PathBuf;
use thiserror::Error;

/// Error type shared by the retouch crates that touch files or archives
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type CommonResult<T> = Result<T, CommonError>;
