use crate::css::render_stylesheet;
use crate::html::{render_document, render_fragment, RenderOptions};
use crate::{ExportError, PageSnapshot};
use retouch_common::{ArchiveBuilder, BuildArtifact};
use tracing::info;

/// Depth of the fragment inside `<html><body><main>`
const FRAGMENT_DEPTH: usize = 3;

/// Packages a captured page as a minimal static site
#[derive(Debug, Clone, Default)]
pub struct BuildGenerator {
    options: RenderOptions,
}

impl BuildGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render `index.html`, `styles.css` and `script.js` and zip them as
    /// `<page_id>-build.zip`.
    ///
    /// Fails without an artifact when the content renders empty.
    pub fn generate(&self, snapshot: &PageSnapshot) -> Result<BuildArtifact, ExportError> {
        let fragment = render_fragment(snapshot, &self.options, FRAGMENT_DEPTH);
        if fragment.trim().is_empty() {
            return Err(ExportError::EmptyContent(snapshot.page_id.clone()));
        }

        let html = render_document(snapshot, &fragment, &self.options);
        let css = render_stylesheet(&snapshot.style);
        let script = render_script(&snapshot.page_id);

        let mut archive = ArchiveBuilder::new();
        archive.add_file("index.html", html.as_bytes())?;
        archive.add_file("styles.css", css.as_bytes())?;
        archive.add_file("script.js", script.as_bytes())?;
        let bytes = archive.finish()?;

        let file_name = format!("{}-build.zip", snapshot.page_id);
        info!(page = %snapshot.page_id, file = %file_name, size = bytes.len(), "Generated build");
        Ok(BuildArtifact::zip(file_name, bytes))
    }
}

fn render_script(page_id: &str) -> String {
    format!(
        "// Static build of \"{}\"\n\
         document.addEventListener(\"DOMContentLoaded\", function () {{\n  \
         document.documentElement.classList.add(\"js\");\n\
         }});\n",
        page_id.replace('"', "\\\"")
    )
}
