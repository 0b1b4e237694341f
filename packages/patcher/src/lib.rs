//! # Retouch Patcher
//!
//! Offline export path: bakes an override snapshot back into the
//! project's template sources.
//!
//! ```text
//! overrides-snapshot.json ─┐
//!                          ├─▶ TemplatePatcher (per file) ─▶ patched-project.zip
//! project templates ───────┘
//! ```
//!
//! Templates are scanned with a token lexer rather than matched as raw
//! text, so markers inside comments or strings are never rewritten.

mod category;
mod error;
mod literal;
mod project;
mod scanner;
mod template;

pub use category::Category;
pub use error::PatchError;
pub use literal::{to_inline_literal, to_js_literal};
pub use project::{
    load_snapshot, patch_project, PatchOptions, PatchedFile, ProjectPatch, DEFAULT_EXCLUDES,
    OUTPUT_ARCHIVE, SNAPSHOT_FILE,
};
pub use scanner::{tokenize, Token};
pub use template::{FilePatch, TemplatePatcher};
