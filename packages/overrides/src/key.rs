//! # Override Keys
//!
//! Elements with an authored entity id are keyed by that id. Freeform
//! text elements have no stable identity, so they are keyed by
//! `"<property>:<tag>:hash<n>"` where `n` is a rolling hash of the
//! element's rendered text.
//!
//! Editing the text of a hash-keyed element changes its key and orphans
//! whatever was stored under the old one. Distinct texts may also
//! collide on the same 32-bit hash. Both are accepted tradeoffs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 32-bit rolling hash over the UTF-16 code units of `text`.
///
/// `hash = hash * 31 + unit`, seeded at 0, wrapping as a signed 32-bit
/// integer.
pub fn content_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Key of an entry in the override store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverrideKey {
    /// Authored stable id (named collection items, hero, ...)
    Entity(String),

    /// Derived from tag and rendered text
    Derived {
        property: String,
        tag: String,
        hash: i32,
    },
}

impl OverrideKey {
    pub fn entity(id: impl Into<String>) -> Self {
        OverrideKey::Entity(id.into())
    }

    /// Derive a key for `property` on a `<tag>` element rendering `text`
    pub fn derived(property: impl Into<String>, tag: &str, text: &str) -> Self {
        OverrideKey::Derived {
            property: property.into(),
            tag: tag.to_ascii_lowercase(),
            hash: content_hash(text),
        }
    }

    /// Parse a stored key. Anything that is not a well-formed derived key
    /// is treated as an entity id.
    pub fn parse(raw: &str) -> Self {
        Self::parse_derived(raw).unwrap_or_else(|| OverrideKey::Entity(raw.to_string()))
    }

    fn parse_derived(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ':');
        let property = parts.next()?;
        let tag = parts.next()?;
        let hash = parts.next()?.strip_prefix("hash")?.parse::<i32>().ok()?;

        if property.is_empty() || tag.is_empty() {
            return None;
        }

        Some(OverrideKey::Derived {
            property: property.to_string(),
            tag: tag.to_string(),
            hash,
        })
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, OverrideKey::Derived { .. })
    }

    /// Whether this derived key addresses `<tag>` elements rendering `text`
    pub fn matches_element(&self, tag: &str, text: &str) -> bool {
        match self {
            OverrideKey::Derived {
                tag: key_tag, hash, ..
            } => key_tag.eq_ignore_ascii_case(tag) && *hash == content_hash(text),
            OverrideKey::Entity(_) => false,
        }
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideKey::Entity(id) => f.write_str(id),
            OverrideKey::Derived {
                property,
                tag,
                hash,
            } => write!(f, "{}:{}:hash{}", property, tag, hash),
        }
    }
}

impl From<&str> for OverrideKey {
    fn from(raw: &str) -> Self {
        OverrideKey::parse(raw)
    }
}

impl Serialize for OverrideKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OverrideKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OverrideKey::parse(&raw))
    }
}
