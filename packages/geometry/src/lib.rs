//! # Retouch Geometry
//!
//! Drag and resize of selected elements: handle formulas, per-frame
//! presentation and debounced persistence with a forced flush on release.

mod controller;
mod error;
mod geometry;
mod handle;

pub use controller::{ControllerConfig, GeometrySink, PointerGeometryController, PointerId, Presenter};
pub use error::GeometryError;
pub use geometry::{Geometry, Point, MIN_SIZE};
pub use handle::Handle;
