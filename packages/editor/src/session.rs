//! # Edit Session
//!
//! What the control panel drives while the operator edits a page.
//!
//! An EditSession owns the live element tree, the override store, the
//! edit journal and the geometry controller, and keeps the four in step:
//! every edit lands in the tree (so it shows right away), in the store
//! (so it survives a reload) and in the journal (so the panel can list
//! it).

use crate::journal::{EditHistoryJournal, EditPatch};
use crate::tree::{ElementTree, NodeId, TreeError, FIELD_ATTR};
use crate::EditorError;
use retouch_geometry::{
    ControllerConfig, Geometry, GeometrySink, Handle, Point, PointerGeometryController, PointerId,
    Presenter,
};
use retouch_overrides::{OverrideKey, OverrideStore, StyleProperty};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Store field an image source is persisted under when the element
/// names none
const DEFAULT_IMAGE_FIELD: &str = "image";

/// Property name of derived keys holding geometry
const LAYOUT_PROPERTY: &str = "layout";

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    tree: ElementTree,
    store: OverrideStore,
    journal: EditHistoryJournal,
    geometry: PointerGeometryController,

    /// Store key of each geometry target, fixed when its resize begins
    layout_keys: HashMap<String, OverrideKey>,

    /// Element the panel is currently editing
    selected: Option<NodeId>,
}

impl EditSession {
    pub fn new(id: impl Into<String>, tree: ElementTree, store: OverrideStore) -> Self {
        Self::with_config(id, tree, store, ControllerConfig::default())
    }

    pub fn with_config(
        id: impl Into<String>,
        tree: ElementTree,
        store: OverrideStore,
        config: ControllerConfig,
    ) -> Self {
        Self {
            id: id.into(),
            tree,
            store,
            journal: EditHistoryJournal::new(),
            geometry: PointerGeometryController::with_config(config),
            layout_keys: HashMap::new(),
            selected: None,
        }
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn store(&self) -> &OverrideStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut OverrideStore {
        &mut self.store
    }

    pub fn journal(&self) -> &EditHistoryJournal {
        &self.journal
    }

    /// Hand the store back, e.g. to save it when the session ends
    pub fn into_store(self) -> OverrideStore {
        self.store
    }

    pub fn select(&mut self, node: NodeId) -> Result<(), EditorError> {
        if !self.tree.is_attached(node) {
            return Err(EditorError::TargetUnmounted(self.tree.target_id(node)));
        }
        self.tree.kind(node)?;
        self.selected = Some(node);
        Ok(())
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Store key a style edit of `node` is written under
    pub fn override_key(&self, node: NodeId, property: StyleProperty) -> Result<OverrideKey, EditorError> {
        if let Some(id) = self.tree.entity_id(node) {
            return Ok(OverrideKey::entity(id));
        }
        let tag = self
            .tree
            .tag(node)
            .ok_or(TreeError::NotAnElement(node))?;
        Ok(OverrideKey::derived(
            property.key_name(),
            tag,
            &self.tree.text_content(node),
        ))
    }

    /// Store key geometry of `node` is committed under.
    ///
    /// Without an entity id the key is derived from the element's text,
    /// or from its source for elements without text such as images.
    pub fn layout_key(&self, node: NodeId) -> Result<OverrideKey, EditorError> {
        if let Some(id) = self.tree.entity_id(node) {
            return Ok(OverrideKey::entity(id));
        }
        let tag = self
            .tree
            .tag(node)
            .ok_or(TreeError::NotAnElement(node))?;
        let mut content = self.tree.text_content(node);
        if content.is_empty() {
            if let Some(src) = self.tree.attribute(node, "src") {
                content = src.to_string();
            }
        }
        Ok(OverrideKey::derived(LAYOUT_PROPERTY, tag, &content))
    }

    pub fn set_style(
        &mut self,
        node: NodeId,
        property: StyleProperty,
        value: impl Into<String>,
    ) -> Result<OverrideKey, EditorError> {
        let value = value.into();
        let key = self.override_key(node, property)?;
        self.tree.set_style(node, property.css_name(), value.clone())?;

        match &key {
            OverrideKey::Entity(id) => {
                self.store
                    .set(id.clone(), json!({ property.key_name(): value.clone() }));
            }
            OverrideKey::Derived { .. } => {
                self.store.set_key(&key, Value::String(value.clone()));
            }
        }

        self.journal
            .record(self.tree.target_id(node), EditPatch::style(property, value));
        debug!(key = %key, property = property.key_name(), "Style edit");
        Ok(key)
    }

    /// Replace the text of `node`.
    ///
    /// When the node names a content field and sits inside an entity, the
    /// field of that entity is persisted too.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<(), EditorError> {
        let text = text.into();
        self.tree.set_text(node, text.clone())?;
        self.persist_field(node, None, Value::String(text.clone()));
        self.journal
            .record(self.tree.target_id(node), EditPatch::text(text));
        Ok(())
    }

    pub fn set_image(&mut self, node: NodeId, src: impl Into<String>) -> Result<(), EditorError> {
        if !self
            .tree
            .tag(node)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("img"))
        {
            return Err(EditorError::NotAnImage(node));
        }

        let src = src.into();
        self.tree.set_attribute(node, "src", src.clone())?;
        self.persist_field(node, Some(DEFAULT_IMAGE_FIELD), Value::String(src.clone()));
        self.journal
            .record(self.tree.target_id(node), EditPatch::image(src));
        Ok(())
    }

    fn persist_field(&mut self, node: NodeId, fallback: Option<&str>, value: Value) {
        let Some(field) = self
            .tree
            .attribute(node, FIELD_ATTR)
            .or(fallback)
            .map(str::to_string)
        else {
            return;
        };
        let Some(entity) = self.owning_entity(node) else {
            return;
        };

        let mut patch = Map::new();
        patch.insert(field, value);
        self.store.set(entity, Value::Object(patch));
    }

    /// Entity id of `node` or its closest ancestor
    fn owning_entity(&self, node: NodeId) -> Option<String> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(entity) = self.tree.entity_id(id) {
                return Some(entity.to_string());
            }
            current = self.tree.parent(id);
        }
        None
    }

    /// Remove `node` from the page; [`EditSession::undo`] brings it back.
    ///
    /// Geometry sessions on the node or anything under it are aborted.
    pub fn delete(&mut self, node: NodeId) -> Result<(), EditorError> {
        let targets: Vec<String> = self
            .tree
            .descendants(node)
            .into_iter()
            .filter(|id| self.tree.tag(*id).is_some())
            .map(|id| self.tree.target_id(id))
            .collect();

        self.journal.delete(&mut self.tree, node)?;

        for target in &targets {
            self.geometry.target_unmounted(target);
        }
        if self.selected.is_some_and(|s| !self.tree.is_attached(s)) {
            self.selected = None;
        }
        Ok(())
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        Ok(self.journal.undo(&mut self.tree)?)
    }

    /// Start a resize or drag of `node` on `pointer`
    pub fn begin_resize(
        &mut self,
        pointer: PointerId,
        node: NodeId,
        handle: Handle,
        start_pointer: Point,
        start_geometry: Geometry,
    ) -> Result<(), EditorError> {
        let target = self.tree.target_id(node);
        if !self.tree.is_attached(node) {
            return Err(EditorError::TargetUnmounted(target));
        }
        let key = self.layout_key(node)?;
        self.layout_keys.insert(target.clone(), key);

        if let Some(stale) =
            self.geometry
                .begin_session(pointer, target, handle, start_pointer, start_geometry)
        {
            warn!(pointer = %pointer, element = %stale, "Replaced unfinished geometry session");
        }
        Ok(())
    }

    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        position: Point,
        now: Instant,
    ) -> Result<Geometry, EditorError> {
        self.ensure_mounted(pointer)?;
        Ok(self.geometry.pointer_move(pointer, position, now)?)
    }

    /// Present in-flight geometry; call once per animation frame
    pub fn animation_frame(&mut self) -> usize {
        let mut presenter = TreePresenter {
            tree: &mut self.tree,
        };
        self.geometry.animation_frame(&mut presenter)
    }

    /// Run debounced geometry commits due at `now`
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut sink = JournalingSink {
            store: &mut self.store,
            journal: &mut self.journal,
            keys: &self.layout_keys,
        };
        self.geometry.poll(now, &mut sink)
    }

    pub fn pointer_up(&mut self, pointer: PointerId, position: Point) -> Result<Geometry, EditorError> {
        self.ensure_mounted(pointer)?;

        let mut presenter = TreePresenter {
            tree: &mut self.tree,
        };
        let mut sink = JournalingSink {
            store: &mut self.store,
            journal: &mut self.journal,
            keys: &self.layout_keys,
        };
        Ok(self
            .geometry
            .pointer_up(pointer, position, &mut presenter, &mut sink)?)
    }

    /// Abort the pointer's session when its target has left the tree
    fn ensure_mounted(&mut self, pointer: PointerId) -> Result<(), EditorError> {
        let Some(target) = self.geometry.active_target(pointer).map(str::to_string) else {
            return Ok(());
        };

        let mounted = self
            .tree
            .find_target(&target)
            .is_some_and(|node| self.tree.is_attached(node));
        if mounted {
            return Ok(());
        }

        self.geometry.target_unmounted(&target);
        Err(EditorError::TargetUnmounted(target))
    }
}

/// Writes in-flight geometry into inline styles of the tree
pub struct TreePresenter<'a> {
    pub tree: &'a mut ElementTree,
}

impl Presenter for TreePresenter<'_> {
    fn present(&mut self, target: &str, geometry: &Geometry) {
        let Some(node) = self.tree.find_target(target) else {
            return;
        };
        let rules = [
            ("left", geometry.x),
            ("top", geometry.y),
            ("width", geometry.width),
            ("height", geometry.height),
        ];
        for (property, value) in rules {
            if self.tree.set_style(node, property, format!("{}px", value)).is_err() {
                return;
            }
        }
    }
}

/// Commits geometry to the store and records it in the journal.
///
/// The store is written under the target's durable key from `keys`; the
/// journal keeps the session-scoped target id.
pub struct JournalingSink<'a> {
    pub store: &'a mut OverrideStore,
    pub journal: &'a mut EditHistoryJournal,
    pub keys: &'a HashMap<String, OverrideKey>,
}

impl GeometrySink for JournalingSink<'_> {
    fn commit(&mut self, target: &str, geometry: &Geometry) {
        match self.keys.get(target) {
            Some(key) => self.store.commit(&key.to_string(), geometry),
            None => warn!(element = target, "No store key for geometry target"),
        }
        self.journal.record(target, EditPatch::layout(*geometry));
    }
}
