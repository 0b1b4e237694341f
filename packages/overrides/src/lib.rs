//! # Retouch Overrides
//!
//! Durable override layer for the in-place editor.
//!
//! ```text
//! pointer / text / style edits
//!            ↓
//! ┌─────────────────────────────────────────────┐
//! │ OverrideStore: key → JSON value             │
//! │  - entity ids for named collections         │
//! │  - property:tag:hashN for freeform text     │
//! └─────────────────────────────────────────────┘
//!            ↓
//! ContentSnapshot (defaults resolved through the store)
//!            ↓
//! static export / source patcher
//! ```

mod content;
mod error;
mod key;
mod store;
mod style;

pub use content::{
    Article, ContentSnapshot, Course, Entity, Event, FooterLink, HeroContent, LeaderboardEntry,
    Mentor, Opportunity, HERO_ENTITY_ID,
};
pub use error::OverrideError;
pub use key::{content_hash, OverrideKey};
pub use store::{OverrideStore, StoreStorage};
pub use style::{StyleOverride, StyleProperty};
