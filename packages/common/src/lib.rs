//! Shared plumbing for the retouch crates: the file-system seam and zip
//! archive building.

pub mod archive;
pub mod error;
pub mod filesystem;

pub use archive::*;
pub use error::*;
pub use filesystem::*;
