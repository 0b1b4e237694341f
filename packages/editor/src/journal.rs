//! # Edit History Journal
//!
//! Session-scoped record of what the operator changed.
//!
//! ## Design
//!
//! - Each target id accumulates one [`EditPatch`]; recording merges into
//!   it and later values win per field
//! - Deleting an element detaches it from the live tree and pushes a
//!   [`DeletedElementRecord`] on a LIFO stack
//! - Undo pops the most recent deletion and puts the element back where
//!   it was, or at the end of its old parent when the captured next
//!   sibling moved away
//! - Nothing here is persisted; the journal dies with the session
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut journal = EditHistoryJournal::new();
//! journal.record("hero", EditPatch::text("Hello"));
//!
//! journal.delete(&mut tree, card)?;
//! journal.undo(&mut tree)?;
//! ```

use crate::tree::{ElementTree, NodeId, TreeError};
use retouch_geometry::Geometry;
use retouch_overrides::{StyleOverride, StyleProperty};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Accumulated change set of one target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPatch {
    #[serde(skip_serializing_if = "StyleOverride::is_empty", default)]
    pub styles: StyleOverride,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub layout: Option<Geometry>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
}

impl EditPatch {
    pub fn style(property: StyleProperty, value: impl Into<String>) -> Self {
        Self {
            styles: StyleOverride::new().with(property, value),
            ..Default::default()
        }
    }

    pub fn layout(geometry: Geometry) -> Self {
        Self {
            layout: Some(geometry),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self {
            image: Some(src.into()),
            ..Default::default()
        }
    }

    /// Fold `later` into this patch. Styles merge per property; the other
    /// fields are replaced when `later` sets them.
    pub fn merge(&mut self, later: EditPatch) {
        self.styles.merge(&later.styles);
        if later.layout.is_some() {
            self.layout = later.layout;
        }
        if later.text.is_some() {
            self.text = later.text;
        }
        if later.image.is_some() {
            self.image = later.image;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.layout.is_none() && self.text.is_none() && self.image.is_none()
    }

    /// One-line description for the control panel
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.styles.is_empty() {
            parts.push(self.styles.to_css());
        }
        if let Some(layout) = &self.layout {
            parts.push(format!(
                "layout {}x{} at ({}, {})",
                layout.width, layout.height, layout.x, layout.y
            ));
        }
        if let Some(text) = &self.text {
            parts.push(format!("text \"{}\"", text));
        }
        if let Some(image) = &self.image {
            parts.push(format!("image {}", image));
        }
        parts.join("; ")
    }
}

/// Where a deleted element used to live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedElementRecord {
    pub element: NodeId,
    pub parent: NodeId,
    pub next_sibling: Option<NodeId>,
}

#[derive(Debug, Default)]
pub struct EditHistoryJournal {
    entries: BTreeMap<String, EditPatch>,
    deleted: Vec<DeletedElementRecord>,
}

impl EditHistoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `patch` into the entry of `target_id`
    pub fn record(&mut self, target_id: impl Into<String>, patch: EditPatch) {
        let target_id = target_id.into();
        debug!(target_id = %target_id, "Recording edit");
        self.entries.entry(target_id).or_default().merge(patch);
    }

    pub fn entry(&self, target_id: &str) -> Option<&EditPatch> {
        self.entries.get(target_id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &EditPatch)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `target: summary` lines, sorted by target id
    pub fn changes(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, patch)| !patch.is_empty())
            .map(|(target, patch)| format!("{}: {}", target, patch.summary()))
            .collect()
    }

    /// Detach `element` from the tree and remember where it was
    pub fn delete(
        &mut self,
        tree: &mut ElementTree,
        element: NodeId,
    ) -> Result<DeletedElementRecord, TreeError> {
        let (parent, next_sibling) = tree.detach(element)?;
        let record = DeletedElementRecord {
            element,
            parent,
            next_sibling,
        };
        self.deleted.push(record);
        debug!(element = %element, parent = %parent, "Deleted element");
        Ok(record)
    }

    /// Restore the most recently deleted element.
    ///
    /// Returns `false` when there is nothing to undo. The element goes back
    /// before its captured next sibling if that node is still a child of
    /// the same parent, otherwise it becomes the parent's last child.
    pub fn undo(&mut self, tree: &mut ElementTree) -> Result<bool, TreeError> {
        let Some(record) = self.deleted.pop() else {
            return Ok(false);
        };

        match record.next_sibling {
            Some(sibling) if tree.parent(sibling) == Some(record.parent) => {
                tree.insert_before(record.parent, record.element, sibling)?;
            }
            _ => {
                tree.append(record.parent, record.element)?;
            }
        }

        debug!(element = %record.element, parent = %record.parent, "Restored element");
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.deleted.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.deleted.len()
    }

    /// Forget recorded edits and deletions
    pub fn clear(&mut self) {
        self.entries.clear();
        self.deleted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> (ElementTree, NodeId, [NodeId; 3]) {
        let mut tree = ElementTree::new("body");
        let ul = tree.create_element("ul");
        tree.append(tree.root(), ul).unwrap();
        let items = ["a", "b", "c"].map(|label| {
            let li = tree.create_element("li");
            let text = tree.create_text(label);
            tree.append(li, text).unwrap();
            tree.append(ul, li).unwrap();
            li
        });
        (tree, ul, items)
    }

    #[test]
    fn test_record_merges_per_field() {
        let mut journal = EditHistoryJournal::new();
        journal.record("hero", EditPatch::style(StyleProperty::Color, "#000"));
        journal.record("hero", EditPatch::style(StyleProperty::FontSize, "32px"));
        journal.record("hero", EditPatch::text("First"));
        journal.record("hero", EditPatch::style(StyleProperty::Color, "#fff"));
        journal.record("hero", EditPatch::text("Second"));

        let entry = journal.entry("hero").unwrap();
        assert_eq!(entry.styles.get(StyleProperty::Color), Some("#fff"));
        assert_eq!(entry.styles.get(StyleProperty::FontSize), Some("32px"));
        assert_eq!(entry.text.as_deref(), Some("Second"));
        assert!(entry.layout.is_none());
    }

    #[test]
    fn test_changes_summary() {
        let mut journal = EditHistoryJournal::new();
        journal.record("logo", EditPatch::layout(Geometry::new(0.0, 0.0, 120.0, 60.0)));
        journal.record("logo", EditPatch::image("/img/logo.png"));

        assert_eq!(
            journal.changes(),
            vec!["logo: layout 120x60 at (0, 0); image /img/logo.png".to_string()]
        );
    }

    #[test]
    fn test_delete_then_undo_restores_position() {
        let (mut tree, ul, [a, b, c]) = list();
        let mut journal = EditHistoryJournal::new();

        let record = journal.delete(&mut tree, b).unwrap();
        assert_eq!(record.parent, ul);
        assert_eq!(record.next_sibling, Some(c));
        assert_eq!(tree.children(ul), &[a, c]);

        assert!(journal.undo(&mut tree).unwrap());
        assert_eq!(tree.children(ul), &[a, b, c]);
        assert!(!journal.undo(&mut tree).unwrap());
    }

    #[test]
    fn test_undo_appends_when_sibling_gone() {
        let (mut tree, ul, [a, b, c]) = list();
        let mut journal = EditHistoryJournal::new();

        journal.delete(&mut tree, b).unwrap();
        // Sibling removed outside the journal
        tree.detach(c).unwrap();

        journal.undo(&mut tree).unwrap();
        assert_eq!(tree.children(ul), &[a, b]);
    }

    #[test]
    fn test_undo_is_lifo() {
        let (mut tree, ul, [a, b, c]) = list();
        let mut journal = EditHistoryJournal::new();

        journal.delete(&mut tree, a).unwrap();
        journal.delete(&mut tree, c).unwrap();
        assert_eq!(journal.undo_levels(), 2);

        journal.undo(&mut tree).unwrap();
        assert_eq!(tree.children(ul), &[b, c]);
        journal.undo(&mut tree).unwrap();
        assert_eq!(tree.children(ul), &[a, b, c]);
        assert!(!journal.can_undo());
    }

    #[test]
    fn test_delete_detached_fails() {
        let (mut tree, _, [a, _, _]) = list();
        let mut journal = EditHistoryJournal::new();
        journal.delete(&mut tree, a).unwrap();

        assert_eq!(journal.delete(&mut tree, a), Err(TreeError::Detached(a)));
        assert_eq!(journal.undo_levels(), 1);
    }
}
