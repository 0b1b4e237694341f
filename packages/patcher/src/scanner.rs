//! Token scanner for JS/TS/JSX templates using logos
//!
//! Only the structure the patcher needs is tokenized: declarations,
//! brackets, string literals and identifiers. Comments and template
//! literals are consumed whole so that brackets or quotes inside them
//! never affect matching. Characters the scanner does not know are
//! dropped.
//!
//! JSX text between tags is skipped by [`tokenize`], so prose like
//! `It's` never opens a string literal.

use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token<'src> {
    // Declaration keywords
    #[token("const")]
    Const,
    #[token("let")]
    Let,
    #[token("var")]
    Var,
    #[token("export")]
    Export,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    // Single-line string literals, quotes included
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\\n]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"`([^`\\]|\\.)*`", |lex| lex.slice())]
    Template(&'src str),

    #[regex(r"[0-9][0-9_]*(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| lex.slice())]
    Number(&'src str),

    // Symbols
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("/")]
    Slash,
    #[token("=")]
    Equals,
    #[token("=>")]
    Arrow,
    #[token("==")]
    #[token("===")]
    #[token("!=")]
    #[token("!==")]
    #[token("<=")]
    #[token(">=")]
    Compare,
}

impl<'src> Token<'src> {
    /// Opening bracket of a nestable group
    pub fn is_open(&self) -> bool {
        matches!(self, Token::LBrace | Token::LBracket | Token::LParen)
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Token::RBrace | Token::RBracket | Token::RParen)
    }

    /// Closing bracket matching this opening one
    pub fn closer(&self) -> Option<Token<'src>> {
        match self {
            Token::LBrace => Some(Token::RBrace),
            Token::LBracket => Some(Token::RBracket),
            Token::LParen => Some(Token::RParen),
            _ => None,
        }
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Const => write!(f, "const"),
            Token::Let => write!(f, "let"),
            Token::Var => write!(f, "var"),
            Token::Export => write!(f, "export"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string {}", s),
            Token::Template(_) => write!(f, "template literal"),
            Token::Number(n) => write!(f, "number {}", n),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Slash => write!(f, "/"),
            Token::Equals => write!(f, "="),
            Token::Arrow => write!(f, "=>"),
            Token::Compare => write!(f, "comparison"),
        }
    }
}

pub type Spanned<'src> = (Token<'src>, Range<usize>);

/// Where the scanner is in a JSX-bearing source
#[derive(Debug, Clone, Copy, PartialEq)]
enum Context {
    /// Script code, with the number of braces opened inside it
    Script(usize),
    /// Inside `<...>` of a JSX tag
    Tag { closing: bool, self_closing: bool },
    /// Between the tags of a JSX element
    Children,
}

/// Tokenize a template source
pub fn tokenize(source: &str) -> Vec<Spanned<'_>> {
    let mut lexer = Token::lexer(source);
    let mut stack = vec![Context::Script(0)];
    let mut tokens: Vec<Spanned<'_>> = Vec::new();

    loop {
        if stack.last() == Some(&Context::Children) {
            let text = lexer.remainder();
            lexer.bump(text.find(['<', '{']).unwrap_or(text.len()));
        }

        let Some(result) = lexer.next() else {
            break;
        };
        let Ok(token) = result else {
            continue;
        };

        let previous = tokens.last().map(|(t, _)| t);
        advance(&mut stack, &token, previous, lexer.remainder());
        tokens.push((token, lexer.span()));
    }

    tokens
}

fn advance(stack: &mut Vec<Context>, token: &Token<'_>, previous: Option<&Token<'_>>, rest: &str) {
    let Some(&top) = stack.last() else {
        return;
    };

    match (top, token) {
        (Context::Script(depth), Token::LBrace) => replace_top(stack, Context::Script(depth + 1)),
        (Context::Script(depth), Token::RBrace) if depth > 0 => {
            replace_top(stack, Context::Script(depth - 1))
        }
        (Context::Script(_), Token::RBrace) => {
            // End of a `{...}` expression inside JSX
            if stack.len() > 1 {
                stack.pop();
            }
        }
        (Context::Script(_), Token::LAngle) if opens_element(previous, rest) => {
            stack.push(Context::Tag {
                closing: false,
                self_closing: false,
            })
        }
        (Context::Tag { .. } | Context::Children, Token::LBrace) => stack.push(Context::Script(0)),
        (Context::Tag { closing: false, .. }, Token::Slash) if rest.starts_with('>') => replace_top(
            stack,
            Context::Tag {
                closing: false,
                self_closing: true,
            },
        ),
        (
            Context::Tag {
                closing: false,
                self_closing: false,
            },
            Token::RAngle,
        ) => replace_top(stack, Context::Children),
        (Context::Tag { .. }, Token::RAngle) => {
            stack.pop();
        }
        (Context::Children, Token::LAngle) if rest.starts_with('/') => replace_top(
            stack,
            Context::Tag {
                closing: true,
                self_closing: false,
            },
        ),
        (Context::Children, Token::LAngle) => stack.push(Context::Tag {
            closing: false,
            self_closing: false,
        }),
        _ => {}
    }
}

fn replace_top(stack: &mut [Context], context: Context) {
    if let Some(top) = stack.last_mut() {
        *top = context;
    }
}

/// Whether a `<` in script code starts a JSX element rather than a
/// comparison or a list of type parameters
fn opens_element(previous: Option<&Token<'_>>, rest: &str) -> bool {
    let after_operand = match previous {
        Some(Token::Ident(word)) => !matches!(*word, "return" | "yield" | "await" | "case" | "default"),
        Some(
            Token::Number(_) | Token::String(_) | Token::Template(_) | Token::RParen | Token::RBracket,
        ) => true,
        _ => false,
    };
    if after_operand {
        return false;
    }

    // Fragment
    if rest.starts_with('>') {
        return true;
    }
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$') {
        return false;
    }

    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '-' | ':')))
        .unwrap_or(rest.len());
    let after = rest[name_len..].trim_start();

    // `<T,>(x) => ...`, `<T extends U>` and `<T>(x) => ...`
    let type_parameters = after.starts_with(',')
        || after.starts_with("extends ")
        || after
            .strip_prefix('>')
            .is_some_and(|tail| tail.trim_start().starts_with('('));
    !type_parameters
}

/// Decode the contents of a string token (quotes included)
pub fn unquote(literal: &str) -> String {
    let inner = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default();

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_declaration_tokens() {
        assert_eq!(
            kinds("export const events: Event[] = [];"),
            vec![
                Token::Export,
                Token::Const,
                Token::Ident("events"),
                Token::Colon,
                Token::Ident("Event"),
                Token::LBracket,
                Token::RBracket,
                Token::Equals,
                Token::LBracket,
                Token::RBracket,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_keywords_need_word_boundary() {
        assert_eq!(kinds("constant letter"), vec![Token::Ident("constant"), Token::Ident("letter")]);
    }

    #[test]
    fn test_strings_and_templates() {
        let source = r#"'it\'s' "a \"b\"" `multi
line ${x}`"#;
        let tokens = kinds(source);
        assert_eq!(tokens[0], Token::String(r"'it\'s'"));
        assert_eq!(tokens[1], Token::String(r#""a \"b\"""#));
        assert!(matches!(tokens[2], Token::Template(_)));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_comments_hide_brackets() {
        let source = "/* const events = [ */ // ]\n{ /** doc **/ }";
        assert_eq!(kinds(source), vec![Token::LBrace, Token::RBrace]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a => b === c = d"),
            vec![
                Token::Ident("a"),
                Token::Arrow,
                Token::Ident("b"),
                Token::Compare,
                Token::Ident("c"),
                Token::Equals,
                Token::Ident("d"),
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("x = 'é';");
        assert_eq!(tokens[2].1, 4..8);
    }

    #[test]
    fn test_jsx_text_is_not_scanned() {
        let source = r#"<p>It's <span style={editableStyle("span", "here")}>here</span>, isn't it</p>"#;
        let strings: Vec<Token<'_>> = kinds(source)
            .into_iter()
            .filter(|t| matches!(t, Token::String(_)))
            .collect();
        assert_eq!(strings, vec![Token::String(r#""span""#), Token::String(r#""here""#)]);
    }

    #[test]
    fn test_scripts_resume_after_jsx() {
        let source = "const view = () => (\n  <ul>\n    {items.map((i) => <li key={i}>Don't {i}</li>)}\n    <br />\n  </ul>\n);\nconst label = 'done';";
        let tokens = kinds(source);
        assert!(tokens.contains(&Token::Ident("items")));
        assert_eq!(tokens[tokens.len() - 2], Token::String("'done'"));
        assert!(!tokens.iter().any(|t| matches!(t, Token::String(s) if s.starts_with("'t"))));
    }

    #[test]
    fn test_comparisons_and_generics_are_not_jsx() {
        let source = "if (count < limit) { go('a'); }\nconst pick = <T,>(x: T) => x;\nconst id = <T>(x: T) => 'b';";
        let strings: Vec<Token<'_>> = kinds(source)
            .into_iter()
            .filter(|t| matches!(t, Token::String(_)))
            .collect();
        assert_eq!(strings, vec![Token::String("'a'"), Token::String("'b'")]);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""Meet our \"mentors\"""#), "Meet our \"mentors\"");
        assert_eq!(unquote(r"'it\'s'"), "it's");
        assert_eq!(unquote("''"), "");
    }
}
