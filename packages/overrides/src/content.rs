//! # Content Model
//!
//! Typed editable content for every category the site exposes. Each item
//! of a named collection carries an authored `id`, which is also its key
//! in the override store. Fields this model does not know about are kept
//! in `extra` and written back untouched.
//!
//! A [`ContentSnapshot`] is the JSON document the offline source patcher
//! consumes: every category plus the derived per-element style entries.

use crate::{OverrideError, OverrideKey, OverrideStore, StyleOverride, StyleProperty};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Store key of the hero block
pub const HERO_ENTITY_ID: &str = "hero";

/// Items addressable by an authored id
pub trait Entity {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroContent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for HeroContent {
    fn id(&self) -> &str {
        HERO_ENTITY_ID
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mentor {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterLink {
    pub id: String,
    pub label: String,
    pub href: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for LeaderboardEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Event {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Course {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Mentor {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Opportunity {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Article {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for FooterLink {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Every editable category in one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<HeroContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Course>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentors: Option<Vec<Mentor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<Vec<Opportunity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<Article>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_links: Option<Vec<FooterLink>>,
    /// Derived `property:tag:hashN` entries
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, Value>,
}

impl ContentSnapshot {
    /// Load a snapshot file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, OverrideError> {
        if !path.exists() {
            return Err(OverrideError::SnapshotNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| OverrideError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, OverrideError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, OverrideError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), OverrideError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Resolve compiled-in `defaults` through the store.
    ///
    /// Each entity is overlaid with the object stored under its id (hero
    /// under [`HERO_ENTITY_ID`]); entities without an entry keep their
    /// defaults. Every derived style entry of the store is carried over.
    pub fn resolve(defaults: &ContentSnapshot, store: &OverrideStore) -> ContentSnapshot {
        let mut styles = defaults.styles.clone();
        for (key, value) in store.derived_entries() {
            styles.insert(key.to_string(), value.clone());
        }

        let snapshot = ContentSnapshot {
            hero: defaults.hero.as_ref().map(|h| resolve_entity(h, store)),
            leaderboard: resolve_all(&defaults.leaderboard, store),
            events: resolve_all(&defaults.events, store),
            courses: resolve_all(&defaults.courses, store),
            mentors: resolve_all(&defaults.mentors, store),
            opportunities: resolve_all(&defaults.opportunities, store),
            articles: resolve_all(&defaults.articles, store),
            footer_links: resolve_all(&defaults.footer_links, store),
            styles,
        };

        debug!(styles = snapshot.styles.len(), "Resolved content snapshot");
        snapshot
    }

    /// Derived style entries whose values are usable as CSS values
    pub fn style_entries(&self) -> impl Iterator<Item = (OverrideKey, String)> + '_ {
        self.styles.iter().filter_map(|(raw, value)| {
            let key = OverrideKey::parse(raw);
            if !key.is_derived() {
                return None;
            }
            style_value(value).map(|v| (key, v))
        })
    }

    /// Resolved style for a `<tag>` element rendering `text`
    pub fn styles_for(&self, tag: &str, text: &str) -> StyleOverride {
        let mut style = StyleOverride::new();
        for (key, value) in self.style_entries() {
            if !key.matches_element(tag, text) {
                continue;
            }
            if let OverrideKey::Derived { property, .. } = &key {
                match StyleProperty::from_name(property) {
                    Some(p) => style.set(p, value),
                    None => warn!(key = %key, "Unknown style property in override key"),
                }
            }
        }
        style
    }
}

fn style_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn resolve_all<T>(items: &Option<Vec<T>>, store: &OverrideStore) -> Option<Vec<T>>
where
    T: Entity + Serialize + DeserializeOwned + Clone,
{
    items
        .as_ref()
        .map(|items| items.iter().map(|item| resolve_entity(item, store)).collect())
}

fn resolve_entity<T>(item: &T, store: &OverrideStore) -> T
where
    T: Entity + Serialize + DeserializeOwned + Clone,
{
    let Some(Value::Object(patch)) = store.get(item.id()) else {
        return item.clone();
    };

    let merged = match serde_json::to_value(item) {
        Ok(Value::Object(mut fields)) => {
            fields.extend(patch.clone());
            Value::Object(fields)
        }
        _ => return item.clone(),
    };

    match serde_json::from_value(merged) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(id = item.id(), error = %e, "Ignoring override that does not fit its entity");
            item.clone()
        }
    }
}
