//! HTML fragment rules.
//!
//! Section content is usually a fragment of HTML. Attribute matchers query
//! it, so we parse it into a tree of elements the same lossless way we parse
//! documents. The rules are forgiving in the way browsers are:
//!
//! - void elements (`<br>`, `<img>`, ...) and `<x/>` have no children
//! - `<p>`, `<li>`, `<td>` and the other elements with optional end tags
//!   are closed by the start tag of a sibling they cannot contain
//! - an end tag for an ancestor implicitly closes everything below it
//! - an end tag matching nothing open is wrapped in an ERROR node
//! - `<script>`, `<style>`, `<textarea>` and `<title>` hold raw text up to
//!   their own end tag
//! - a `<` that does not start a tag is plain text
//!
//! Open elements live on an explicit stack rather than the call stack, and
//! nesting stops at [`MAX_NESTING`]: deeper start tags still become
//! elements, but childless ones, and a `NestingTooDeep` error is recorded.
//!
//! ```text
//! FRAGMENT
//!   ELEMENT
//!     START_TAG  L_ANGLE TAG_NAME ATTRIBUTE* (R_ANGLE | SLASH_R_ANGLE)
//!     HTML_TEXT
//!     ELEMENT ...
//!     END_TAG    L_ANGLE_SLASH TAG_NAME R_ANGLE
//!   COMMENT
//! ```

use crate::error::SyntaxError;
use crate::parser::{Marker, Parser};
use crate::syntax_kind::SyntaxKind;

const COMMENT_BANG: &str = "!--";

/// Elements that never have content or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Deepest element nesting kept in the tree.
pub const MAX_NESTING: usize = 256;

/// Start tags that close an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// An element whose start tag has been parsed and whose end is still ahead.
struct OpenElement {
    name: String,
    marker: Marker,
}

/// Parse the root of an HTML fragment.
pub fn fragment(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let mut open: Vec<OpenElement> = Vec::new();
    let mut too_deep = false;

    while !p.at_end() {
        match p.current() {
            SyntaxKind::L_ANGLE_SLASH if starts_name(p.nth_text(1)) => {
                let name = tag_name_at(p, 1);
                match open.iter().rposition(|e| e.name == name) {
                    Some(index) => {
                        close_from(p, &mut open, index + 1);
                        end_tag(p);
                        close_from(p, &mut open, index);
                    }
                    None => stray_end_tag(p),
                }
            }
            SyntaxKind::L_ANGLE if starts_name(p.nth_text(1)) => {
                if let Some(index) = implied_end(&open, &tag_name_at(p, 1)) {
                    close_from(p, &mut open, index);
                }
                element(p, &mut open, &mut too_deep);
            }
            SyntaxKind::L_ANGLE if p.nth_text(1).starts_with(COMMENT_BANG) => comment(p),
            SyntaxKind::L_ANGLE if starts_declaration(p.nth_text(1)) => declaration(p),
            _ => text(p),
        }
    }

    close_from(p, &mut open, 0);
    m.complete(p, SyntaxKind::FRAGMENT);
}

/// Complete every open element from `depth` up, innermost first.
fn close_from(p: &mut Parser<'_, '_>, open: &mut Vec<OpenElement>, depth: usize) {
    for element in open.drain(depth..).rev() {
        element.marker.complete(p, SyntaxKind::ELEMENT);
    }
}

/// Parse a start tag. Elements that can have children are left open on `open`.
fn element(p: &mut Parser<'_, '_>, open: &mut Vec<OpenElement>, too_deep: &mut bool) {
    let offset = p.offset();
    let m = p.start();
    let (name, self_closing) = start_tag(p);

    if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
        m.complete(p, SyntaxKind::ELEMENT);
    } else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
        raw_text(p, &name);
        if p.at(SyntaxKind::L_ANGLE_SLASH) {
            end_tag(p);
        }
        m.complete(p, SyntaxKind::ELEMENT);
    } else if open.len() >= MAX_NESTING {
        if !*too_deep {
            p.error(SyntaxError::NestingTooDeep {
                limit: MAX_NESTING,
                offset,
            });
            *too_deep = true;
        }
        m.complete(p, SyntaxKind::ELEMENT);
    } else {
        open.push(OpenElement { name, marker: m });
    }
}

/// Index of the open element a `tag` start tag implicitly closes, if any.
///
/// Walks down the stack until a boundary element; the outermost element
/// `tag` closes wins, so everything opened inside it closes too.
fn implied_end(open: &[OpenElement], tag: &str) -> Option<usize> {
    let (closes, boundaries): (&[&str], &[&str]) = match tag {
        "li" => (&["li"], &["ul", "ol", "menu", "table", "td", "th", "button"]),
        "dt" | "dd" => (&["dt", "dd"], &["dl", "table", "td", "th", "button"]),
        "option" => (&["option"], &["select", "datalist", "optgroup"]),
        "optgroup" => (&["option", "optgroup"], &["select", "datalist"]),
        "tr" => (&["tr"], &["table", "thead", "tbody", "tfoot"]),
        "td" | "th" => (&["td", "th"], &["tr", "table"]),
        "thead" | "tbody" | "tfoot" => (&["thead", "tbody", "tfoot"], &["table"]),
        tag if CLOSES_P.contains(&tag) => (
            &["p"],
            &["button", "table", "td", "th", "caption", "object", "template"],
        ),
        _ => return None,
    };

    let mut found = None;
    for (index, element) in open.iter().enumerate().rev() {
        let name = element.name.as_str();
        if closes.contains(&name) {
            found = Some(index);
        } else if boundaries.contains(&name) {
            break;
        }
    }
    found
}

/// Content of a raw text element, markup included, up to its end tag.
fn raw_text(p: &mut Parser<'_, '_>, name: &str) {
    if p.at_end() || at_end_tag_for(p, name) {
        return;
    }
    let m = p.start();
    while !p.at_end() && !at_end_tag_for(p, name) {
        p.bump();
    }
    m.complete(p, SyntaxKind::HTML_TEXT);
}

fn at_end_tag_for(p: &Parser<'_, '_>, name: &str) -> bool {
    p.at(SyntaxKind::L_ANGLE_SLASH) && tag_name_at(p, 1) == name
}

/// Returns the lowercased tag name and whether the tag ended in `/>`.
fn start_tag(p: &mut Parser<'_, '_>) -> (String, bool) {
    let m = p.start();
    p.bump(); // <
    let name = name(p, SyntaxKind::TAG_NAME);

    let mut self_closing = false;
    loop {
        match p.current() {
            SyntaxKind::WHITESPACE => p.bump(),
            SyntaxKind::TEXT => attribute(p),
            SyntaxKind::R_ANGLE => {
                p.bump();
                break;
            }
            SyntaxKind::SLASH if p.nth(1) == SyntaxKind::R_ANGLE => {
                p.bump_n(2, SyntaxKind::SLASH_R_ANGLE);
                self_closing = true;
                break;
            }
            // Unterminated tag, let the next construct start
            SyntaxKind::L_ANGLE | SyntaxKind::L_ANGLE_SLASH | SyntaxKind::EOF => break,
            _ => p.bump(),
        }
    }

    m.complete(p, SyntaxKind::START_TAG);
    (name, self_closing)
}

fn attribute(p: &mut Parser<'_, '_>) {
    let m = p.start();
    name(p, SyntaxKind::ATTR_NAME);

    if p.at(SyntaxKind::EQ) || (p.at(SyntaxKind::WHITESPACE) && p.nth(1) == SyntaxKind::EQ) {
        p.eat(SyntaxKind::WHITESPACE);
        p.bump(); // =
        p.eat(SyntaxKind::WHITESPACE);
        attribute_value(p);
    }

    m.complete(p, SyntaxKind::ATTRIBUTE);
}

fn attribute_value(p: &mut Parser<'_, '_>) {
    match p.current() {
        quote @ (SyntaxKind::QUOTE | SyntaxKind::APOSTROPHE) => {
            let m = p.start();
            p.bump();
            while !p.at_end() && !p.at(quote) {
                p.bump();
            }
            p.eat(quote);
            m.complete(p, SyntaxKind::ATTR_VALUE);
        }
        kind if !ends_unquoted_value(kind) => {
            let m = p.start();
            while !ends_unquoted_value(p.current()) {
                p.bump();
            }
            m.complete(p, SyntaxKind::ATTR_VALUE);
        }
        _ => {}
    }
}

/// Unquoted values run to whitespace or `>`, so `href=/a/>` keeps its slash.
fn ends_unquoted_value(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::WHITESPACE | SyntaxKind::R_ANGLE | SyntaxKind::EOF
    )
}

fn end_tag(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // </
    name(p, SyntaxKind::TAG_NAME);
    while !matches!(
        p.current(),
        SyntaxKind::R_ANGLE | SyntaxKind::L_ANGLE | SyntaxKind::L_ANGLE_SLASH | SyntaxKind::EOF
    ) {
        p.bump();
    }
    p.eat(SyntaxKind::R_ANGLE);
    m.complete(p, SyntaxKind::END_TAG);
}

fn stray_end_tag(p: &mut Parser<'_, '_>) {
    let offset = p.offset();
    let name = tag_name_at(p, 1);
    let m = p.start();
    end_tag(p);
    m.complete(p, SyntaxKind::ERROR);
    p.error(SyntaxError::UnexpectedEndTag { name, offset });
}

/// `<!-- ... -->`. The lexer has no comment tokens, so track the text after
/// `<!--` and stop at the first `>` it ends in `--` for.
fn comment(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // <
    let mut body = String::new();
    while !p.at_end() {
        if p.at(SyntaxKind::R_ANGLE) && body.len() >= COMMENT_BANG.len() + 2 && body.ends_with("--")
        {
            p.bump();
            break;
        }
        body.push_str(p.nth_text(0));
        p.bump();
    }
    m.complete(p, SyntaxKind::COMMENT);
}

/// `<!DOCTYPE ...>` or `<?xml ...?>`, kept as an opaque COMMENT.
fn declaration(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // <
    while !p.at_end() && !p.at(SyntaxKind::R_ANGLE) {
        p.bump();
    }
    p.eat(SyntaxKind::R_ANGLE);
    m.complete(p, SyntaxKind::COMMENT);
}

/// Character data up to the next construct. Always consumes at least one token.
fn text(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump();
    while !p.at_end() && !at_markup(p) {
        p.bump();
    }
    m.complete(p, SyntaxKind::HTML_TEXT);
}

fn at_markup(p: &Parser<'_, '_>) -> bool {
    match p.current() {
        SyntaxKind::L_ANGLE_SLASH => starts_name(p.nth_text(1)),
        // `!` also covers comments
        SyntaxKind::L_ANGLE => {
            let next = p.nth_text(1);
            starts_name(next) || starts_declaration(next)
        }
        _ => false,
    }
}

fn starts_name(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_alphabetic())
}

fn starts_declaration(text: &str) -> bool {
    text.starts_with(['!', '?'])
}

/// Glue consecutive TEXT tokens into one `kind` token, returning it lowercased.
fn name(p: &mut Parser<'_, '_>, kind: SyntaxKind) -> String {
    let n = text_run(p, 0);
    let name = glue(p, 0, n);
    p.bump_n(n, kind);
    name
}

fn tag_name_at(p: &Parser<'_, '_>, start: usize) -> String {
    glue(p, start, text_run(p, start))
}

fn text_run(p: &Parser<'_, '_>, start: usize) -> usize {
    let mut n = 0;
    while p.nth(start + n) == SyntaxKind::TEXT && n < u16::MAX as usize {
        n += 1;
    }
    n
}

fn glue(p: &Parser<'_, '_>, start: usize, n: usize) -> String {
    (start..start + n)
        .map(|k| p.nth_text(k))
        .collect::<String>()
        .to_ascii_lowercase()
}
