use crate::PointerId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Unknown resize handle: {0}")]
    UnknownHandle(String),

    #[error("No active session for pointer {0}")]
    NoSession(PointerId),
}
