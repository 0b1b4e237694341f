//! Owned capture of the page region that gets exported

use crate::{ExportError, StyleConfig};
use retouch_editor::{ElementTree, VNode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Attribute marking the exported region of a page
pub const CONTENT_ROOT_ATTR: &str = "data-content-root";

/// An `<img>` of the captured fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// `None` when the element has no usable source
    pub src: Option<String>,
    pub alt: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl ImageRef {
    pub(crate) fn from_vnode(vnode: &VNode) -> Self {
        let dimension = |name: &str| {
            vnode
                .attribute(name)
                .or_else(|| match vnode {
                    VNode::Element { styles, .. } => styles.get(name).map(String::as_str),
                    VNode::Text { .. } => None,
                })
                .map(str::to_string)
        };

        Self {
            src: image_source(vnode).map(str::to_string),
            alt: vnode.attribute("alt").unwrap_or_default().to_string(),
            width: dimension("width"),
            height: dimension("height"),
        }
    }
}

/// Resolved, non-empty `src` of an image node
pub(crate) fn image_source(vnode: &VNode) -> Option<&str> {
    vnode
        .attribute("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub page_id: String,
    pub title: String,
    /// Content root, owned
    pub content: VNode,
    pub style: StyleConfig,
    images: Vec<ImageRef>,
}

impl PageSnapshot {
    /// Capture the content region of `tree`.
    ///
    /// The region is the element carrying `data-content-root`, else the
    /// first `<main>`.
    pub fn capture(
        tree: &ElementTree,
        page_id: impl Into<String>,
        title: impl Into<String>,
        style: StyleConfig,
    ) -> Result<Self, ExportError> {
        let root = tree
            .find_with_attribute(CONTENT_ROOT_ATTR)
            .or_else(|| tree.find_by_tag("main"))
            .ok_or(ExportError::ContentRootNotFound)?;

        let snapshot = Self::from_content(page_id, title, tree.snapshot(root)?, style);
        debug!(
            page = %snapshot.page_id,
            images = snapshot.images.len(),
            "Captured page snapshot"
        );
        Ok(snapshot)
    }

    /// Build a snapshot around an already captured content root
    pub fn from_content(
        page_id: impl Into<String>,
        title: impl Into<String>,
        content: VNode,
        style: StyleConfig,
    ) -> Self {
        let mut images = Vec::new();
        collect_images(&content, &mut images);

        Self {
            page_id: page_id.into(),
            title: title.into(),
            content,
            style,
            images,
        }
    }

    /// Every `<img>` of the content, in document order
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }
}

fn collect_images(vnode: &VNode, out: &mut Vec<ImageRef>) {
    if vnode.tag().is_some_and(|tag| tag.eq_ignore_ascii_case("img")) {
        out.push(ImageRef::from_vnode(vnode));
    }
    for child in vnode.children() {
        collect_images(child, out);
    }
}
