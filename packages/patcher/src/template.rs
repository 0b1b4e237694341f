//! # Template Patching
//!
//! Rewrites one template source against a snapshot.
//!
//! ## Matching
//!
//! - Collection categories: `const|let|var <marker>` (optionally
//!   exported, optionally type-annotated) initialized with an array or
//!   object literal. The literal span is replaced, nothing else.
//! - Style calls: `<helper>("<tag>", "<text>")` whose derived keys have
//!   entries in the snapshot become an inline style object.
//!
//! All edits of a file are collected first and applied into a fresh
//! buffer, so a file is either fully patched or left alone.

use crate::category::Category;
use crate::literal::{to_inline_literal, to_js_literal};
use crate::scanner::{tokenize, unquote, Spanned, Token};
use crate::PatchError;
use retouch_overrides::ContentSnapshot;
use serde_json::{Map, Value};
use std::ops::Range;
use tracing::{debug, warn};

/// Patched source of one file and what was applied to it
#[derive(Debug, Clone, PartialEq)]
pub struct FilePatch {
    pub content: String,
    /// Category names and style targets, in source order
    pub applied: Vec<String>,
}

#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    replacement: String,
    label: String,
    /// Category edits replace whole literals and win over style edits
    /// nested inside them
    category: bool,
}

/// A matched `const|let|var <marker> = <literal>` declaration
#[derive(Debug, PartialEq)]
struct Declaration {
    keyword_start: usize,
    literal: Range<usize>,
    is_array: bool,
}

/// A matched `<helper>("<tag>", "<text>")` call
#[derive(Debug, PartialEq)]
struct StyleCall {
    range: Range<usize>,
    tag: String,
    text: String,
}

pub struct TemplatePatcher<'a> {
    snapshot: &'a ContentSnapshot,
    style_helper: &'a str,
    categories: Vec<(Category, Value)>,
}

impl<'a> TemplatePatcher<'a> {
    pub fn new(snapshot: &'a ContentSnapshot, style_helper: &'a str) -> Result<Self, PatchError> {
        let mut categories = Vec::new();
        for category in Category::ALL {
            match category.value(snapshot)? {
                Some(value) => categories.push((category, value)),
                None => debug!(category = %category, "Category absent from snapshot"),
            }
        }

        Ok(Self {
            snapshot,
            style_helper,
            categories,
        })
    }

    /// Patch `source`. Returns `None` when nothing in it matched.
    pub fn patch(&self, source: &str) -> Result<Option<FilePatch>, PatchError> {
        let tokens = tokenize(source);
        let mut edits = Vec::new();

        for (category, value) in &self.categories {
            let marker = category.marker();
            let Some(declaration) = find_declaration(&tokens, marker, value.is_array())? else {
                continue;
            };

            let indent = line_indent(source, declaration.keyword_start);
            edits.push(Edit {
                range: declaration.literal,
                replacement: to_js_literal(value, indent),
                label: category.name().to_string(),
                category: true,
            });
        }

        if !self.snapshot.styles.is_empty() {
            for call in find_style_calls(&tokens, self.style_helper) {
                let style = self.snapshot.styles_for(&call.tag, &call.text);
                if style.is_empty() {
                    continue;
                }

                let object: Map<String, Value> = style
                    .properties
                    .iter()
                    .map(|(property, value)| {
                        (property.js_name().to_string(), Value::String(value.clone()))
                    })
                    .collect();

                edits.push(Edit {
                    range: call.range,
                    replacement: to_inline_literal(&Value::Object(object)),
                    label: format!("styles <{}> \"{}\"", call.tag, call.text),
                    category: false,
                });
            }
        }

        if edits.is_empty() {
            return Ok(None);
        }

        let mut edits = drop_nested_style_edits(edits);
        edits.sort_by_key(|e| e.range.start);
        let applied = edits.iter().map(|e| e.label.clone()).collect();
        let content = apply_edits(source, edits)?;
        Ok(Some(FilePatch { content, applied }))
    }
}

fn shape_name(is_array: bool) -> &'static str {
    if is_array {
        "an array"
    } else {
        "an object"
    }
}

/// First declaration of `marker` initialized with a literal of the
/// expected shape (array or object)
fn find_declaration(
    tokens: &[Spanned],
    marker: &str,
    expect_array: bool,
) -> Result<Option<Declaration>, PatchError> {
    for i in 0..tokens.len().saturating_sub(1) {
        let is_keyword = matches!(tokens[i].0, Token::Const | Token::Let | Token::Var);
        if !is_keyword || tokens[i + 1].0 != Token::Ident(marker) {
            continue;
        }
        if let Some(declaration) = literal_initializer(tokens, i, marker, expect_array)? {
            return Ok(Some(declaration));
        }
    }
    Ok(None)
}

fn literal_initializer(
    tokens: &[Spanned],
    keyword: usize,
    marker: &str,
    expect_array: bool,
) -> Result<Option<Declaration>, PatchError> {
    let mut j = keyword + 2;

    // Type annotation, up to the `=` at depth 0
    if matches!(tokens.get(j), Some((Token::Colon, _))) {
        let mut depth = 0usize;
        j += 1;
        loop {
            match tokens.get(j).map(|(t, _)| t) {
                None => return Ok(None),
                Some(Token::Equals) if depth == 0 => break,
                Some(Token::Semicolon) if depth == 0 => return Ok(None),
                Some(t) if t.is_open() || *t == Token::LAngle => depth += 1,
                Some(t) if t.is_close() || *t == Token::RAngle => depth = depth.saturating_sub(1),
                Some(_) => {}
            }
            j += 1;
        }
    }

    if !matches!(tokens.get(j), Some((Token::Equals, _))) {
        return Ok(None);
    }
    j += 1;

    let is_array = match tokens.get(j) {
        Some((Token::LBracket, _)) => true,
        Some((Token::LBrace, _)) => false,
        _ => {
            debug!(marker, "Declaration is not initialized with a literal");
            return Ok(None);
        }
    };
    if is_array != expect_array {
        warn!(
            marker,
            found = shape_name(is_array),
            expected = shape_name(expect_array),
            "Skipping declaration with a different shape"
        );
        return Ok(None);
    }

    let start = tokens[j].1.start;
    let end = matching_close(tokens, j, marker)?;
    Ok(Some(Declaration {
        keyword_start: tokens[keyword].1.start,
        literal: start..end,
        is_array,
    }))
}

/// End offset of the group opened at `open`
fn matching_close(tokens: &[Spanned], open: usize, marker: &str) -> Result<usize, PatchError> {
    let mut expected: Vec<Token> = Vec::new();

    for (token, span) in &tokens[open..] {
        if let Some(closer) = token.closer() {
            expected.push(closer);
            continue;
        }
        if !token.is_close() {
            continue;
        }

        match expected.pop() {
            Some(closer) if closer == *token => {}
            Some(closer) => {
                return Err(PatchError::MalformedLiteral {
                    marker: marker.to_string(),
                    offset: span.start,
                    reason: format!("expected {} but found {}", closer, token),
                })
            }
            None => break,
        }
        if expected.is_empty() {
            return Ok(span.end);
        }
    }

    Err(PatchError::MalformedLiteral {
        marker: marker.to_string(),
        offset: tokens[open].1.start,
        reason: "literal is never closed".to_string(),
    })
}

fn find_style_calls(tokens: &[Spanned], helper: &str) -> Vec<StyleCall> {
    let mut calls = Vec::new();

    for i in 0..tokens.len() {
        if tokens[i].0 != Token::Ident(helper) {
            continue;
        }
        // Member calls like `utils.editableStyle(...)` are left alone
        if i > 0 && tokens[i - 1].0 == Token::Dot {
            continue;
        }

        let window = |offset: usize| tokens.get(i + offset).map(|(t, _)| t);
        let (Some(Token::LParen), Some(Token::String(tag)), Some(Token::Comma), Some(Token::String(text))) =
            (window(1), window(2), window(3), window(4))
        else {
            continue;
        };

        let mut close = i + 5;
        if window(5) == Some(&Token::Comma) {
            close += 1;
        }
        if !matches!(tokens.get(close), Some((Token::RParen, _))) {
            continue;
        }

        calls.push(StyleCall {
            range: tokens[i].1.start..tokens[close].1.end,
            tag: unquote(tag),
            text: unquote(text),
        });
    }

    calls
}

/// Leading whitespace of the line containing `offset`
fn line_indent(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[line_start..];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}

fn drop_nested_style_edits(edits: Vec<Edit>) -> Vec<Edit> {
    let literals: Vec<Range<usize>> = edits
        .iter()
        .filter(|e| e.category)
        .map(|e| e.range.clone())
        .collect();

    edits
        .into_iter()
        .filter(|edit| {
            let nested = !edit.category
                && literals
                    .iter()
                    .any(|r| r.start <= edit.range.start && edit.range.end <= r.end);
            if nested {
                debug!(label = %edit.label, "Style call is inside a replaced literal");
            }
            !nested
        })
        .collect()
}

/// Apply non-overlapping edits into a new buffer
fn apply_edits(source: &str, mut edits: Vec<Edit>) -> Result<String, PatchError> {
    edits.sort_by_key(|e| e.range.start);

    for pair in edits.windows(2) {
        if pair[0].range.end > pair[1].range.start {
            return Err(PatchError::OverlappingEdits(pair[1].range.start));
        }
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_overrides::{Event, HeroContent, OverrideKey, StyleProperty};
    use serde_json::json;

    fn event(id: &str, title: &str) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn snapshot() -> ContentSnapshot {
        ContentSnapshot {
            events: Some(vec![event("e1", "Hackathon")]),
            ..Default::default()
        }
    }

    #[test]
    fn test_declaration_with_type_annotation() {
        let source = "export const events: Array<Event> = [{ id: 'x' }];";
        let tokens = tokenize(source);
        let declaration = find_declaration(&tokens, "events", true).unwrap().unwrap();
        assert_eq!(&source[declaration.literal], "[{ id: 'x' }]");
        assert!(declaration.is_array);
    }

    #[test]
    fn test_non_literal_declarations_are_skipped() {
        let source = "const events = useEvents();\nconst events2 = [];";
        let tokens = tokenize(source);
        assert_eq!(find_declaration(&tokens, "events", true).unwrap(), None);
    }

    #[test]
    fn test_unclosed_literal_is_malformed() {
        let source = "const events = [{ id: 1 ];";
        let tokens = tokenize(source);
        let err = find_declaration(&tokens, "events", true).unwrap_err();
        assert!(matches!(err, PatchError::MalformedLiteral { offset: 24, .. }));
    }

    #[test]
    fn test_patch_replaces_only_the_literal() {
        let source = "import x from 'y';\n\n// events shown on /events\n  const events = [\n    { id: \"old\", title: \"Old ] title\" }, // trailing\n  ];\n\nexport default events;\n";
        let snapshot = snapshot();
        let patcher = TemplatePatcher::new(&snapshot, "editableStyle").unwrap();

        let patch = patcher.patch(source).unwrap().unwrap();
        assert_eq!(
            patch.content,
            "import x from 'y';\n\n// events shown on /events\n  const events = [\n    {\n      id: \"e1\",\n      title: \"Hackathon\"\n    }\n  ];\n\nexport default events;\n"
        );
        assert_eq!(patch.applied, vec!["events".to_string()]);
    }

    #[test]
    fn test_missing_marker_leaves_file_alone() {
        let snapshot = snapshot();
        let patcher = TemplatePatcher::new(&snapshot, "editableStyle").unwrap();
        assert_eq!(patcher.patch("const courses = [];").unwrap(), None);
    }

    #[test]
    fn test_declaration_of_other_shape_is_skipped() {
        let snapshot = ContentSnapshot {
            hero: Some(HeroContent {
                title: "Hi".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let patcher = TemplatePatcher::new(&snapshot, "editableStyle").unwrap();
        assert_eq!(patcher.patch("const heroContent = [];").unwrap(), None);

        let source = "const events = { CLICK: 'click' };\nlet events = [];";
        let tokens = tokenize(source);
        let declaration = find_declaration(&tokens, "events", true).unwrap().unwrap();
        assert_eq!(&source[declaration.literal], "[]");
    }

    #[test]
    fn test_apostrophes_in_jsx_text_keep_style_calls() {
        let mut snapshot = ContentSnapshot::default();
        snapshot.styles.insert(
            OverrideKey::derived("textColor", "span", "here").to_string(),
            json!("#f00"),
        );
        let patcher = TemplatePatcher::new(&snapshot, "editableStyle").unwrap();

        let source = r#"<p>It's <span style={editableStyle("span", "here")}>here</span>, isn't it</p>"#;
        let patch = patcher.patch(source).unwrap().unwrap();
        assert_eq!(
            patch.content,
            r##"<p>It's <span style={{ color: "#f00" }}>here</span>, isn't it</p>"##
        );
    }

    #[test]
    fn test_style_calls_become_objects() {
        let mut snapshot = ContentSnapshot::default();
        snapshot.styles.insert(
            OverrideKey::derived(StyleProperty::Color.key_name(), "h2", "Meet our mentors").to_string(),
            json!("#ff0000"),
        );
        snapshot.styles.insert(
            OverrideKey::derived("fontSize", "h2", "Meet our mentors").to_string(),
            json!("40px"),
        );
        let patcher = TemplatePatcher::new(&snapshot, "editableStyle").unwrap();

        let source = r##"<h2 style={editableStyle("h2", "Meet our mentors")}>Meet our mentors</h2>
<h2 style={editableStyle("h2", "Events")}>Events</h2>
<p style={styles.editableStyle("h2", "Meet our mentors")} />"##;

        let patch = patcher.patch(source).unwrap().unwrap();
        assert_eq!(
            patch.content,
            r##"<h2 style={{ color: "#ff0000", fontSize: "40px" }}>Meet our mentors</h2>
<h2 style={editableStyle("h2", "Events")}>Events</h2>
<p style={styles.editableStyle("h2", "Meet our mentors")} />"##
        );
        assert_eq!(patch.applied.len(), 1);
    }

    #[test]
    fn test_style_call_inside_replaced_literal_is_dropped() {
        let mut snapshot = snapshot();
        snapshot.styles.insert(
            OverrideKey::derived("textColor", "h3", "Hackathon").to_string(),
            json!("#000"),
        );
        let patcher = TemplatePatcher::new(&snapshot, "editableStyle").unwrap();

        let source = "const events = [{ id: 'e1', style: editableStyle('h3', 'Hackathon') }];";
        let patch = patcher.patch(source).unwrap().unwrap();
        assert_eq!(patch.applied, vec!["events".to_string()]);
        assert!(!patch.content.contains("editableStyle"));
    }

    #[test]
    fn test_line_indent() {
        let source = "a\n\t  const x = 1;";
        assert_eq!(line_indent(source, 5), "\t  ");
        assert_eq!(line_indent(source, 0), "");
    }
}
