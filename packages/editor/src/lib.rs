//! # Retouch Editor
//!
//! In-place editing engine behind the control panel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ control panel: selection, style/text inputs │
//! └─────────────────────────────────────────────┘
//!            ↓ Command (via CommandBus)
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - ElementTree: live rendered elements      │
//! │  - EditHistoryJournal: changes + undo       │
//! │  - PointerGeometryController: resize/drag   │
//! └─────────────────────────────────────────────┘
//!            ↓
//! ┌─────────────────────────────────────────────┐
//! │ overrides: OverrideStore (durable)          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Store is source of truth**: the tree is a view of defaults plus
//!    overrides and can be rebuilt on reload
//! 2. **Journal is session-scoped**: deletions and the change list die
//!    with the session
//! 3. **Explicit time**: pointer handling takes `Instant`s from the caller
//!
//! ## Usage
//!
//! ```rust,ignore
//! use retouch_editor::{EditSession, ElementTree};
//!
//! let mut session = EditSession::new("home", tree, OverrideStore::open(path)?);
//! session.set_style(heading, StyleProperty::Color, "#ff0000")?;
//!
//! session.begin_resize(pointer, image, Handle::BottomRight, down, start)?;
//! session.pointer_move(pointer, position, Instant::now())?;
//! session.animation_frame();
//! session.pointer_up(pointer, position)?;
//! ```

mod command_bus;
mod errors;
mod journal;
mod session;
mod tree;

pub use command_bus::{BusError, Command, CommandBus, HandlerId};
pub use errors::EditorError;
pub use journal::{DeletedElementRecord, EditHistoryJournal, EditPatch};
pub use session::{EditSession, JournalingSink, TreePresenter};
pub use tree::{ElementTree, NodeId, NodeKind, TreeError, VNode, ENTITY_ID_ATTR, FIELD_ATTR};

// Re-export common types for convenience
pub use retouch_geometry::{Geometry, Handle, Point, PointerId};
pub use retouch_overrides::{OverrideKey, OverrideStore, StyleProperty};
