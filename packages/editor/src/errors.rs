//! Error types for the editor

use crate::command_bus::BusError;
use crate::tree::{NodeId, TreeError};
use retouch_geometry::GeometryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Command error: {0}")]
    Bus(#[from] BusError),

    #[error("Target left the tree: {0}")]
    TargetUnmounted(String),

    #[error("Node is not an image: {0}")]
    NotAnImage(NodeId),
}
