//! # postblocks-syntax
//!
//! Lossless syntax trees for block-delimited post documents using [Rowan] +
//! [Logos], following the [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## What Gets Parsed
//!
//! A post document is freeform text interleaved with structured sections.
//! Sections are marked with HTML comments that name a block type and may
//! carry a JSON attribute payload:
//!
//! ```text
//! Intro text
//! <!--blk:core/image {"id":7}-->
//! <figure><img src="cat.png"></figure>
//! <!--/blk:core/image-->
//! <!--blk:spacer /-->
//! ```
//!
//! Inside a section the content is usually HTML, which block types query to
//! derive attributes. This crate parses both: documents with [`parse`], HTML
//! fragments with [`parse_html`].
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! - [`lexer`] breaks the input into tokens; every byte lands in one token.
//! - [`parser`] runs grammar rules that emit events through a marker system.
//! - [`parser::sink`] replays the events into an immutable green tree.
//! - [`ast`] puts typed accessors over the resulting nodes.
//!
//! Parsing never fails. Broken input still produces a complete tree, and the
//! problems are reported as [`SyntaxError`]s next to it.
//!
//! ## Module Structure
//!
//! ```text
//! postblocks-syntax/
//! ├── lib.rs            # This file - public API and tree snapshot tests
//! ├── syntax_kind.rs    # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs          # Logos-based tokenizers (document and HTML)
//! ├── error.rs          # SyntaxError
//! ├── ast.rs            # Typed node wrappers
//! └── parser/
//!     ├── mod.rs        # Parser struct, Marker system, parse() / parse_html()
//!     ├── event.rs      # Event enum (Start, Token, Finish, Placeholder)
//!     ├── sink.rs       # Converts events to Rowan GreenNode
//!     └── grammar/
//!         ├── mod.rs        # Document: freeform spans and sections
//!         ├── delimiter.rs  # <!--blk:...--> delimiters
//!         └── html.rs       # HTML fragments
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use postblocks_syntax::{parse, SyntaxKind};
//!
//! let parse = parse("<!--blk:note {\"pinned\":true}-->hi<!--/blk:note-->");
//! assert!(parse.errors().is_empty());
//!
//! let tree = parse.syntax();
//! assert_eq!(tree.kind(), SyntaxKind::ROOT);
//! let section = tree.children().next().unwrap();
//! assert_eq!(section.kind(), SyntaxKind::SECTION);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use error::SyntaxError;
pub use parser::grammar::delimiter::{NAME_PREFIX, is_valid_name};
pub use parser::{Parse, parse, parse_html};
pub use syntax_kind::{PostLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    /// Helper to format a syntax tree for snapshot testing.
    fn format_tree(node: &SyntaxNode, indent: usize) -> String {
        let mut result = String::new();
        let prefix = "  ".repeat(indent);

        result.push_str(&format!(
            "{}{:?}@{:?}\n",
            prefix,
            node.kind(),
            node.text_range()
        ));

        for child in node.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Node(n) => {
                    result.push_str(&format_tree(&n, indent + 1));
                }
                rowan::NodeOrToken::Token(t) => {
                    let text = t.text().replace('\n', "\\n");
                    result.push_str(&format!(
                        "{}  {:?}@{:?} {:?}\n",
                        prefix,
                        t.kind(),
                        t.text_range(),
                        text
                    ));
                }
            }
        }

        result
    }

    #[test]
    fn snapshot_section_with_attributes() {
        let parse = parse(r#"hi<!--blk:a {"k":1}-->x<!--/blk:a-->"#);
        assert!(parse.errors().is_empty());
        assert_snapshot!(format_tree(&parse.syntax(), 0), @r#"
        ROOT@0..36
          FREEFORM@0..2
            TEXT@0..2 "hi"
          SECTION@2..36
            OPENING_DELIMITER@2..22
              COMMENT_OPEN@2..6 "<!--"
              BLOCK_NAME@6..11 "blk:a"
              WHITESPACE@11..12 " "
              ATTRIBUTES@12..19
                L_BRACE@12..13 "{"
                QUOTE@13..14 "\""
                TEXT@14..15 "k"
                QUOTE@15..16 "\""
                TEXT@16..18 ":1"
                R_BRACE@18..19 "}"
              COMMENT_CLOSE@19..22 "-->"
            CONTENT@22..23
              TEXT@22..23 "x"
            CLOSING_DELIMITER@23..36
              COMMENT_OPEN@23..27 "<!--"
              SLASH@27..28 "/"
              BLOCK_NAME@28..33 "blk:a"
              COMMENT_CLOSE@33..36 "-->"
        "#);
    }

    #[test]
    fn snapshot_void_delimiter() {
        let parse = parse("<!--blk:hr /-->");
        assert_snapshot!(format_tree(&parse.syntax(), 0), @r#"
        ROOT@0..15
          SECTION@0..15
            VOID_DELIMITER@0..15
              COMMENT_OPEN@0..4 "<!--"
              BLOCK_NAME@4..10 "blk:hr"
              WHITESPACE@10..11 " "
              SLASH@11..12 "/"
              COMMENT_CLOSE@12..15 "-->"
        "#);
    }

    #[test]
    fn snapshot_html_fragment() {
        let parse = parse_html(r#"<p class="x">a<br></p>"#);
        assert_snapshot!(format_tree(&parse.syntax(), 0), @r#"
        FRAGMENT@0..22
          ELEMENT@0..22
            START_TAG@0..13
              L_ANGLE@0..1 "<"
              TAG_NAME@1..2 "p"
              WHITESPACE@2..3 " "
              ATTRIBUTE@3..12
                ATTR_NAME@3..8 "class"
                EQ@8..9 "="
                ATTR_VALUE@9..12
                  QUOTE@9..10 "\""
                  TEXT@10..11 "x"
                  QUOTE@11..12 "\""
              R_ANGLE@12..13 ">"
            HTML_TEXT@13..14
              TEXT@13..14 "a"
            ELEMENT@14..18
              START_TAG@14..18
                L_ANGLE@14..15 "<"
                TAG_NAME@15..17 "br"
                R_ANGLE@17..18 ">"
            END_TAG@18..22
              L_ANGLE_SLASH@18..20 "</"
              TAG_NAME@20..21 "p"
              R_ANGLE@21..22 ">"
        "#);
    }

    // === Error tolerance ===
    // Broken documents still give a full tree with every byte in place.

    #[test]
    fn messy_document_keeps_all_bytes() {
        let input = r#"Draft <!-- todo -->
<!--blk:Gallery {"ids":[1,2]}-->
<!--blk:quote {"cite":"unterminated -->
text <!--/blk:nothing-->
<!--blk:list-->
- one
"#;
        let parse = parse(input);
        assert_eq!(parse.syntax().text().to_string(), input);
        assert!(!parse.errors().is_empty());
    }

    #[test]
    fn roundtrip_preserves_text() {
        let inputs = [
            "",
            "plain",
            "<!-- comment -->",
            "<!--blk:a-->x<!--/blk:a-->",
            "<!-- blk:a {} -->x<!-- /blk:a -->",
            "<!--blk:ns/a {\"s\":\"-->\"} /-->",
            "a - b -- c --> d <!- e",
            "{\"not\":\"attrs\"}",
        ];

        for input in inputs {
            let tree = parse(input).syntax();
            assert_eq!(
                tree.text().to_string(),
                input,
                "Roundtrip failed for: {:?}",
                input
            );
        }
    }

    #[test]
    fn html_roundtrip_preserves_text() {
        let inputs = [
            "<p>unclosed",
            "</stray>",
            "<a href=x>1 < 2</a>",
            "<!-- c --><!DOCTYPE html><?xml v?>",
            "<img src=\"a\"/><br/>",
            "<p class='a\"b'>q</p>",
            "<script>if (a </b> c) {}</script><a href=/x/>y</a>",
        ];

        for input in inputs {
            assert_eq!(parse_html(input).syntax().text().to_string(), input);
        }
    }
}
