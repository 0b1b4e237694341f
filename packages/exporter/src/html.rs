use crate::snapshot::image_source;
use crate::PageSnapshot;
use retouch_editor::VNode;
use std::collections::BTreeMap;
use tracing::warn;

/// Options for markup rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

struct Context<'a> {
    options: &'a RenderOptions,
    page_id: &'a str,
    depth: usize,
    /// Inside mixed content, where whitespace is significant
    inline: bool,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a RenderOptions, page_id: &'a str) -> Self {
        Self {
            options,
            page_id,
            depth: 0,
            inline: false,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Render the children of the content root.
///
/// Images without a usable source are dropped with a warning.
pub fn render_fragment(snapshot: &PageSnapshot, options: &RenderOptions, depth: usize) -> String {
    let mut ctx = Context::new(options, &snapshot.page_id);
    ctx.depth = depth;
    let children = snapshot.content.children();

    if is_block(children) {
        for child in children {
            render_node(child, &mut ctx);
        }
    } else if !children.is_empty() {
        if options.pretty {
            ctx.add_indent();
        }
        ctx.inline = true;
        for child in children {
            render_node(child, &mut ctx);
        }
        ctx.inline = false;
        if options.pretty {
            ctx.add("\n");
        }
    }
    ctx.get_output()
}

/// Standalone document embedding `fragment`
pub fn render_document(snapshot: &PageSnapshot, fragment: &str, options: &RenderOptions) -> String {
    let mut ctx = Context::new(options, &snapshot.page_id);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html lang=\"en\">");
    ctx.indent();

    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.add_line(&format!("<title>{}</title>", escape_html(&snapshot.title)));
    ctx.add_line("<link rel=\"stylesheet\" href=\"styles.css\">");
    ctx.dedent();
    ctx.add_line("</head>");

    ctx.add_line("<body>");
    ctx.indent();
    ctx.add_line(&format!(
        "<main id=\"{}\" class=\"retouch-page\">",
        escape_html(&snapshot.page_id)
    ));
    ctx.add(fragment);
    ctx.add_line("</main>");
    ctx.add_line("<script src=\"script.js\"></script>");
    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    ctx.get_output()
}

fn render_node(vnode: &VNode, ctx: &mut Context) {
    match vnode {
        VNode::Text { content } if ctx.inline => ctx.add(&escape_html(content)),
        // Formatting whitespace between block children
        VNode::Text { .. } => {}
        VNode::Element {
            tag,
            attributes,
            styles,
            children,
        } => {
            if tag.eq_ignore_ascii_case("img") && image_source(vnode).is_none() {
                warn!(
                    page = ctx.page_id,
                    alt = attributes.get("alt").map(String::as_str).unwrap_or_default(),
                    "Skipping image without a source"
                );
                return;
            }
            render_tag(tag, attributes, styles, children, ctx);
        }
    }
}

fn render_tag(
    name: &str,
    attributes: &BTreeMap<String, String>,
    styles: &BTreeMap<String, String>,
    children: &[VNode],
    ctx: &mut Context,
) {
    let pretty = ctx.options.pretty && !ctx.inline;

    // Opening tag
    if pretty {
        ctx.add_indent();
    }
    ctx.add(&format!("<{}", name));

    for (attr_name, value) in attributes {
        ctx.add(&format!(" {}=\"{}\"", attr_name, escape_html(value)));
    }

    if !styles.is_empty() {
        let declarations = styles
            .iter()
            .map(|(key, value)| format!("{}: {};", key, value))
            .collect::<Vec<_>>()
            .join(" ");
        ctx.add(&format!(" style=\"{}\"", escape_html(&declarations)));
    }

    // Self-closing tags
    if children.is_empty() && is_self_closing(name) {
        ctx.add(" />");
        if pretty {
            ctx.add("\n");
        }
        return;
    }

    ctx.add(">");

    if !ctx.inline && is_block(children) {
        if pretty {
            ctx.add("\n");
        }
        ctx.indent();
        for child in children {
            render_node(child, ctx);
        }
        ctx.dedent();
        if pretty {
            ctx.add_indent();
        }
    } else {
        let outer = std::mem::replace(&mut ctx.inline, true);
        for child in children {
            render_node(child, ctx);
        }
        ctx.inline = outer;
    }

    // Closing tag
    ctx.add(&format!("</{}>", name));
    if pretty {
        ctx.add("\n");
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "img"
            | "input"
            | "br"
            | "hr"
            | "meta"
            | "link"
            | "area"
            | "base"
            | "col"
            | "embed"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Children that can be laid out one per line: elements, with nothing
/// but formatting whitespace between them
fn is_block(children: &[VNode]) -> bool {
    let mut has_element = false;
    for child in children {
        match child {
            VNode::Element { .. } => has_element = true,
            VNode::Text { content } if content.trim().is_empty() => {}
            VNode::Text { .. } => return false,
        }
    }
    has_element
}
