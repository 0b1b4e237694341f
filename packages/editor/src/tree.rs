//! # Element Tree
//!
//! Live tree of rendered elements the operator edits in place.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Detaching a
//! node keeps it (and its subtree) alive in the arena so it can be
//! reinserted later; ids are only meaningful for the tree that issued
//! them and never survive a reload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Attribute carrying an authored stable id
pub const ENTITY_ID_ATTR: &str = "data-entity-id";

/// Attribute naming the content field an element renders
pub const FIELD_ATTR: &str = "data-field";

/// Handle to a node of one [`ElementTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node is not an element: {0}")]
    NotAnElement(NodeId),

    #[error("Node is already attached: {0}")]
    AlreadyAttached(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Cannot detach the root node")]
    CannotDetachRoot,

    #[error("Node is not attached: {0}")]
    Detached(NodeId),
}

/// Owned snapshot of a subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        styles: BTreeMap<String, String>,
        children: Vec<VNode>,
    },

    Text { content: String },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element { ref mut styles, .. } = self {
            styles.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            VNode::Text { .. } => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            VNode::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            VNode::Text { .. } => &[],
        }
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &VNode, out: &mut String) {
    match node {
        VNode::Text { content } => out.push_str(content),
        VNode::Element { children, .. } => {
            for child in children {
                collect_text(child, out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        styles: BTreeMap<String, String>,
    },
    Text {
        content: String,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ElementTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ElementTree {
    /// Tree with a single root element
    pub fn new(root_tag: impl Into<String>) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.create_element(root_tag);
        tree
    }

    /// Build a tree from a snapshot. A text snapshot is wrapped in a `<div>`.
    pub fn from_vnode(vnode: &VNode) -> Self {
        match vnode {
            VNode::Element { .. } => {
                let mut tree = Self {
                    nodes: Vec::new(),
                    root: NodeId(0),
                };
                tree.root = tree.instantiate(vnode);
                tree
            }
            VNode::Text { .. } => {
                let mut tree = Self::new("div");
                let child = tree.instantiate(vnode);
                let root = tree.root;
                tree.link(root, child, None);
                tree
            }
        }
    }

    /// Create detached nodes for `vnode` and return the subtree root
    pub fn instantiate(&mut self, vnode: &VNode) -> NodeId {
        match vnode {
            VNode::Text { content } => self.create_text(content.clone()),
            VNode::Element {
                tag,
                attributes,
                styles,
                children,
            } => {
                let id = self.push(NodeKind::Element {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                    styles: styles.clone(),
                });
                for child in children {
                    let child_id = self.instantiate(child);
                    self.link(id, child_id, None);
                }
                id
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
        })
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text {
            content: content.into(),
        })
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, TreeError> {
        Ok(&self.node(id)?.kind)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|c| *c == id)?;
        siblings.get(index + 1).copied()
    }

    /// Whether `id` is connected to the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        match self.kind(parent)? {
            NodeKind::Element { .. } => {}
            NodeKind::Text { .. } => return Err(TreeError::NotAnElement(parent)),
        }
        let node = self.node(child)?;
        if node.parent.is_some() || child == self.root {
            return Err(TreeError::AlreadyAttached(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(TreeError::CycleDetected);
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        let children = &mut self.nodes[parent.0].children;
        match index {
            Some(i) => children.insert(i, child),
            None => children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
    }

    /// Append a detached node as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_insert(parent, child)?;
        self.link(parent, child, None);
        Ok(())
    }

    /// Insert a detached node before `reference`, which must be a child of `parent`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), TreeError> {
        self.check_insert(parent, child)?;
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == reference)
            .ok_or(TreeError::NotAChild {
                parent,
                child: reference,
            })?;
        self.link(parent, child, Some(index));
        Ok(())
    }

    /// Detach `id` from its parent, keeping the subtree alive.
    ///
    /// Returns the former parent and next sibling.
    pub fn detach(&mut self, id: NodeId) -> Result<(NodeId, Option<NodeId>), TreeError> {
        if id == self.root {
            return Err(TreeError::CannotDetachRoot);
        }
        let parent = self.node(id)?.parent.ok_or(TreeError::Detached(id))?;
        let next_sibling = self.next_sibling(id);

        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;

        Ok((parent, next_sibling))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id).ok()? {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id).ok()? {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.insert(name.into(), value.into());
                Ok(())
            }
            NodeKind::Text { .. } => Err(TreeError::NotAnElement(id)),
        }
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        match self.kind(id).ok()? {
            NodeKind::Element { styles, .. } => styles.get(property).map(String::as_str),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn set_style(
        &mut self,
        id: NodeId,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { styles, .. } => {
                styles.insert(property.into(), value.into());
                Ok(())
            }
            NodeKind::Text { .. } => Err(TreeError::NotAnElement(id)),
        }
    }

    /// Authored entity id of an element, if any
    pub fn entity_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, ENTITY_ID_ATTR).filter(|v| !v.is_empty())
    }

    /// Concatenated text of the subtree rooted at `id`
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Ok(NodeKind::Text { content }) => out.push_str(content),
            Ok(NodeKind::Element { .. }) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            Err(_) => {}
        }
    }

    /// Replace the text of a node.
    ///
    /// Text nodes are updated in place; elements lose their children and
    /// get a single text child.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), TreeError> {
        let text = text.into();
        if let NodeKind::Text { content } = &mut self.node_mut(id)?.kind {
            *content = text;
            return Ok(());
        }

        let old_children = std::mem::take(&mut self.nodes[id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        let text_node = self.create_text(text);
        self.link(id, text_node, None);
        Ok(())
    }

    /// Nodes of the subtree at `from`, in document order
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if !self.contains(id) {
                continue;
            }
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// First attached element whose `name` attribute equals `value`
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.attribute(*id, name) == Some(value))
    }

    /// First attached element carrying the `name` attribute
    pub fn find_with_attribute(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.attribute(*id, name).is_some())
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.tag(*id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }

    /// Session-scoped target id: the entity id, else the node handle
    pub fn target_id(&self, id: NodeId) -> String {
        self.entity_id(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// Resolve a target id produced by [`ElementTree::target_id`]
    pub fn find_target(&self, target: &str) -> Option<NodeId> {
        if let Some(index) = target.strip_prefix("node-").and_then(|n| n.parse().ok()) {
            let id = NodeId(index);
            if self.contains(id) && self.entity_id(id).is_none() {
                return Some(id);
            }
        }
        self.find_by_attribute(ENTITY_ID_ATTR, target)
    }

    /// Owned copy of the subtree rooted at `id`
    pub fn snapshot(&self, id: NodeId) -> Result<VNode, TreeError> {
        let node = self.node(id)?;
        Ok(match &node.kind {
            NodeKind::Text { content } => VNode::text(content.clone()),
            NodeKind::Element {
                tag,
                attributes,
                styles,
            } => VNode::Element {
                tag: tag.clone(),
                attributes: attributes.clone(),
                styles: styles.clone(),
                children: node
                    .children
                    .iter()
                    .map(|c| self.snapshot(*c))
                    .collect::<Result<_, _>>()?,
            },
        })
    }
}
