//! # Retouch Exporter
//!
//! Bakes the edited page into a minimal static site:
//!
//! ```text
//! ElementTree ──capture──▶ PageSnapshot ──generate──▶ <page>-build.zip
//!                                                     ├── index.html
//!                                                     ├── styles.css
//!                                                     └── script.js
//! ```

mod css;
mod error;
mod generator;
mod html;
mod snapshot;
mod style_config;


pub use css::render_stylesheet;
pub use error::ExportError;
pub use generator::BuildGenerator;
pub use html::RenderOptions;
pub use retouch_common::BuildArtifact;
pub use snapshot::{ImageRef, PageSnapshot, CONTENT_ROOT_ATTR};
pub use style_config::{StyleConfig, Typography};
