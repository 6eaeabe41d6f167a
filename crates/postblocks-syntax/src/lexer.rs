//! # Lexer - Tokenizing Post Documents and HTML Fragments
//!
//! This module provides the first stage of parsing: breaking source text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! The most important property of this lexer is that **every byte in the input
//! appears in exactly one token**. We never skip or discard characters. This
//! is what lets a parse node's span be sliced straight back out of the source:
//!
//! ```
//! use postblocks_syntax::lexer::lex;
//!
//! let input = "<!--blk:note {\"pinned\":true}-->hi<!--/blk:note-->";
//! let tokens = lex(input);
//!
//! // Concatenating all token texts gives back the original
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Two Token Sets
//!
//! Post documents and the HTML inside their sections have different special
//! characters, so there are two Logos enums:
//!
//! - [`TokenKind`] for documents: comment brackets (`<!--`, `-->`), `/`, and
//!   the JSON punctuation needed to find the end of an attribute payload
//!   (`{`, `}`, `"`, `\`).
//! - [`HtmlTokenKind`] for fragments: tag brackets (`<`, `</`, `>`, `/>`),
//!   `=` and both quote characters.
//!
//! Both map onto the shared [`SyntaxKind`] so one parser and one tree type
//! serve both grammars.
//!
//! ## Token Design Philosophy
//!
//! Tokens are kept **minimal and context-free**. The lexer doesn't know if a
//! `"` opens a JSON string or is a stray quote in prose - that's the parser's
//! job. In particular there is no string token: a string regex would happily
//! run across a delimiter when prose contains an unbalanced quote.
//!
//! Characters with no token of their own (a lone `-` or `<`) come out of Logos
//! as errors and are kept as `TEXT`.
//!
//! [`SyntaxKind`]: crate::syntax_kind::SyntaxKind

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds for post documents.
///
/// The `#[logos(skip r"")]` attribute means "skip nothing" - we explicitly
/// handle all input rather than letting Logos skip anything.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum TokenKind {
    /// Spaces, tabs and line endings
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// `<!--` opening a comment or delimiter
    #[token("<!--")]
    CommentOpen,

    /// `-->` closing a comment or delimiter
    #[token("-->")]
    CommentClose,

    /// `/` for closing delimiters, namespaces and void delimiters
    #[token("/")]
    Slash,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("\"")]
    Quote,

    #[token("\\")]
    Backslash,

    /// Plain text - anything not matched by other rules
    #[regex(r#"[^ \t\r\n\f<{}"\\/-]+"#)]
    Text,
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::CommentOpen => SyntaxKind::COMMENT_OPEN,
            TokenKind::CommentClose => SyntaxKind::COMMENT_CLOSE,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::Quote => SyntaxKind::QUOTE,
            TokenKind::Backslash => SyntaxKind::BACKSLASH,
            TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// Token kinds for HTML fragments.
///
/// Every character is covered by some rule, and no token has a shorter
/// token as a strict prefix that the DFA would have to back out to, so this
/// lexer never produces errors. Comments are recognised by the grammar from
/// `<` followed by a `!--` text run.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum HtmlTokenKind {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[token("<")]
    LAngle,

    #[token("</")]
    LAngleSlash,

    #[token(">")]
    RAngle,

    /// `/>` stays two tokens: the grammar decides whether the slash closes
    /// the tag or belongs to an unquoted attribute value
    #[token("/")]
    Slash,

    #[token("=")]
    Eq,

    #[token("\"")]
    Quote,

    #[token("'")]
    Apostrophe,

    /// Names, values and character data, `-` and `!` included
    #[regex(r#"[^ \t\r\n\f<>="'/]+"#)]
    Text,
}

impl From<HtmlTokenKind> for SyntaxKind {
    fn from(kind: HtmlTokenKind) -> Self {
        match kind {
            HtmlTokenKind::Whitespace => SyntaxKind::WHITESPACE,
            HtmlTokenKind::LAngle => SyntaxKind::L_ANGLE,
            HtmlTokenKind::LAngleSlash => SyntaxKind::L_ANGLE_SLASH,
            HtmlTokenKind::RAngle => SyntaxKind::R_ANGLE,
            HtmlTokenKind::Slash => SyntaxKind::SLASH,
            HtmlTokenKind::Eq => SyntaxKind::EQ,
            HtmlTokenKind::Quote => SyntaxKind::QUOTE,
            HtmlTokenKind::Apostrophe => SyntaxKind::APOSTROPHE,
            HtmlTokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex a post document into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with::<TokenKind>(input)
}

/// Lex an HTML fragment into a sequence of tokens.
pub fn lex_html(input: &str) -> Vec<Token<'_>> {
    lex_with::<HtmlTokenKind>(input)
}

/// Lex a post document and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = result.map_or(SyntaxKind::TEXT, SyntaxKind::from);
        tokens.push((Token { kind, text }, span));
    }

    tokens
}

fn lex_with<'a, T>(input: &'a str) -> Vec<Token<'a>>
where
    T: Logos<'a, Source = str> + Into<SyntaxKind>,
    T::Extras: Default,
{
    let mut tokens = Vec::new();
    let mut lexer = T::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        // Logos error means unrecognized character - treat as TEXT
        let kind = result.map_or(SyntaxKind::TEXT, Into::into);
        tokens.push(Token { kind, text });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(kind: SyntaxKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_plain_text() {
        assert_eq!(lex("hello"), vec![token(SyntaxKind::TEXT, "hello")]);
    }

    #[test]
    fn lex_whitespace_includes_newlines() {
        assert_eq!(
            lex(" \n\t "),
            vec![token(SyntaxKind::WHITESPACE, " \n\t ")]
        );
    }

    #[test]
    fn lex_opening_delimiter() {
        assert_eq!(
            lex(r#"<!--blk:note {"a":1}-->"#),
            vec![
                token(SyntaxKind::COMMENT_OPEN, "<!--"),
                token(SyntaxKind::TEXT, "blk:note"),
                token(SyntaxKind::WHITESPACE, " "),
                token(SyntaxKind::L_BRACE, "{"),
                token(SyntaxKind::QUOTE, "\""),
                token(SyntaxKind::TEXT, "a"),
                token(SyntaxKind::QUOTE, "\""),
                token(SyntaxKind::TEXT, ":1"),
                token(SyntaxKind::R_BRACE, "}"),
                token(SyntaxKind::COMMENT_CLOSE, "-->"),
            ]
        );
    }

    #[test]
    fn lex_closing_and_void_delimiters() {
        assert_eq!(
            lex("<!--/blk:a--><!--blk:b/-->"),
            vec![
                token(SyntaxKind::COMMENT_OPEN, "<!--"),
                token(SyntaxKind::SLASH, "/"),
                token(SyntaxKind::TEXT, "blk:a"),
                token(SyntaxKind::COMMENT_CLOSE, "-->"),
                token(SyntaxKind::COMMENT_OPEN, "<!--"),
                token(SyntaxKind::TEXT, "blk:b"),
                token(SyntaxKind::SLASH, "/"),
                token(SyntaxKind::COMMENT_CLOSE, "-->"),
            ]
        );
    }

    #[test]
    fn lex_backslash_is_its_own_token() {
        assert_eq!(
            lex(r#"a\"b"#),
            vec![
                token(SyntaxKind::TEXT, "a"),
                token(SyntaxKind::BACKSLASH, "\\"),
                token(SyntaxKind::QUOTE, "\""),
                token(SyntaxKind::TEXT, "b"),
            ]
        );
    }

    #[test]
    fn lex_html_tag() {
        assert_eq!(
            lex_html(r#"<a href='x'>"#),
            vec![
                token(SyntaxKind::L_ANGLE, "<"),
                token(SyntaxKind::TEXT, "a"),
                token(SyntaxKind::WHITESPACE, " "),
                token(SyntaxKind::TEXT, "href"),
                token(SyntaxKind::EQ, "="),
                token(SyntaxKind::APOSTROPHE, "'"),
                token(SyntaxKind::TEXT, "x"),
                token(SyntaxKind::APOSTROPHE, "'"),
                token(SyntaxKind::R_ANGLE, ">"),
            ]
        );
    }

    #[test]
    fn lex_html_end_and_self_closing_tags() {
        assert_eq!(
            lex_html("</p><br/>"),
            vec![
                token(SyntaxKind::L_ANGLE_SLASH, "</"),
                token(SyntaxKind::TEXT, "p"),
                token(SyntaxKind::R_ANGLE, ">"),
                token(SyntaxKind::L_ANGLE, "<"),
                token(SyntaxKind::TEXT, "br"),
                token(SyntaxKind::SLASH, "/"),
                token(SyntaxKind::R_ANGLE, ">"),
            ]
        );
    }

    #[test]
    fn all_bytes_preserved() {
        let input = "intro <!-- plain comment --> a - b < c\n<!--blk:x {\"k\":\"}\"}/-->";
        let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn all_bytes_preserved_html() {
        let input = "<p class=\"a-b\">x -> y &amp; <em>z</em></p><!-- c -->";
        assert!(lex_html("<!-- c -->").iter().all(|t| t.kind != SyntaxKind::COMMENT_OPEN));
        let reconstructed: String = lex_html(input).iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn spans_are_correct() {
        let input = "hello <!--blk:x-->";
        for (token, span) in &lex_with_spans(input) {
            assert_eq!(token.text, &input[span.clone()]);
        }
    }
}
