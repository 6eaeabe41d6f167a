//! Typed views over the untyped Rowan tree.
//!
//! Each wrapper holds a [`SyntaxNode`] of one known kind and exposes the
//! pieces callers care about (names, payload text, spans) without them having
//! to walk children and match on [`SyntaxKind`] themselves. Wrappers never
//! allocate a tree of their own; they are as cheap to clone as the node.
//!
//! ```
//! use postblocks_syntax::ast::{AstNode, Document, Item};
//! use postblocks_syntax::parse;
//!
//! let doc = Document::cast(parse("a<!--blk:note {\"x\":1}-->b<!--/blk:note-->").syntax()).unwrap();
//! let names: Vec<_> = doc
//!     .items()
//!     .map(|item| match item {
//!         Item::Section(s) => s.name(),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(names, vec![None, Some("note".to_string())]);
//! ```

use std::ops::Range;

use crate::parser::grammar::delimiter::NAME_PREFIX;
use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A typed wrapper around a syntax node of a particular kind.
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(node: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;

    /// Byte range of the node in the source it was parsed from.
    fn span(&self) -> Range<usize> {
        let range = self.syntax().text_range();
        usize::from(range.start())..usize::from(range.end())
    }

    /// Source text of the node, verbatim.
    fn text(&self) -> String {
        self.syntax().text().to_string()
    }
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                Self::can_cast(node.kind()).then(|| Self(node))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(
    /// A whole post document.
    Document, ROOT
);
ast_node!(
    /// Text outside any section.
    Freeform, FREEFORM
);
ast_node!(
    /// An opening/closing pair with its content, or a single void delimiter.
    Section, SECTION
);
ast_node!(Delimiter, OPENING_DELIMITER | CLOSING_DELIMITER | VOID_DELIMITER);
ast_node!(
    /// Something the parser could not place, such as a stray closing delimiter.
    ErrorNode, ERROR
);
ast_node!(
    /// The root of a parsed HTML fragment.
    Fragment, FRAGMENT
);
ast_node!(Element, ELEMENT);
ast_node!(Attribute, ATTRIBUTE);

/// A top-level item of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Freeform(Freeform),
    Section(Section),
    Error(ErrorNode),
}

impl Item {
    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Item::Freeform(it) => it.syntax(),
            Item::Section(it) => it.syntax(),
            Item::Error(it) => it.syntax(),
        }
    }

    pub fn span(&self) -> Range<usize> {
        let range = self.syntax().text_range();
        usize::from(range.start())..usize::from(range.end())
    }
}

impl Document {
    /// Top-level items in document order.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(|node| match node.kind() {
            SyntaxKind::FREEFORM => Freeform::cast(node).map(Item::Freeform),
            SyntaxKind::SECTION => Section::cast(node).map(Item::Section),
            SyntaxKind::ERROR => ErrorNode::cast(node).map(Item::Error),
            _ => None,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        self.0.children().filter_map(Section::cast)
    }
}

impl Section {
    /// The opening delimiter, or the void delimiter for a self-closing section.
    pub fn opening(&self) -> Option<Delimiter> {
        self.0
            .children()
            .find(|n| {
                matches!(
                    n.kind(),
                    SyntaxKind::OPENING_DELIMITER | SyntaxKind::VOID_DELIMITER
                )
            })
            .and_then(Delimiter::cast)
    }

    pub fn closing(&self) -> Option<Delimiter> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::CLOSING_DELIMITER)
            .and_then(Delimiter::cast)
    }

    pub fn is_void(&self) -> bool {
        self.opening().is_some_and(|d| d.is_void())
    }

    /// Declared name without the `blk:` prefix.
    pub fn name(&self) -> Option<String> {
        self.opening().and_then(|d| d.name())
    }

    /// Raw text of the section content. Empty for void sections.
    pub fn content(&self) -> String {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::CONTENT)
            .map(|n| n.text().to_string())
            .unwrap_or_default()
    }
}

impl Delimiter {
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind()
    }

    pub fn is_closing(&self) -> bool {
        self.kind() == SyntaxKind::CLOSING_DELIMITER
    }

    pub fn is_void(&self) -> bool {
        self.kind() == SyntaxKind::VOID_DELIMITER
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::BLOCK_NAME)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| {
            t.text()
                .strip_prefix(NAME_PREFIX)
                .unwrap_or(t.text())
                .to_string()
        })
    }

    /// The `{...}` payload, unparsed.
    pub fn attributes(&self) -> Option<String> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::ATTRIBUTES)
            .map(|n| n.text().to_string())
    }
}

impl Fragment {
    /// Top-level elements.
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.children().filter_map(Element::cast)
    }

    /// Every element in the fragment, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.descendants().filter_map(Element::cast)
    }

    /// Raw text of all character data.
    pub fn text_content(&self) -> String {
        text_content(&self.0)
    }
}

impl Element {
    fn start_tag(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::START_TAG)
    }

    /// Lowercased tag name.
    pub fn tag_name(&self) -> String {
        self.start_tag()
            .and_then(|tag| {
                tag.children_with_tokens()
                    .filter_map(|it| it.into_token())
                    .find(|t| t.kind() == SyntaxKind::TAG_NAME)
            })
            .map(|t| t.text().to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> {
        self.start_tag()
            .into_iter()
            .flat_map(|tag| tag.children().filter_map(Attribute::cast))
    }

    /// Raw value of the first attribute called `name` (case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .find(|a| a.name().eq_ignore_ascii_case(name))
            .map(|a| a.value())
    }

    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.children().filter_map(Element::cast)
    }

    /// Nearest enclosing element, `None` at the top of the fragment.
    pub fn parent_element(&self) -> Option<Element> {
        self.0.parent().and_then(Element::cast)
    }

    /// Source text between the start tag and the end tag.
    pub fn inner_html(&self) -> String {
        self.0
            .children_with_tokens()
            .filter(|it| !matches!(it.kind(), SyntaxKind::START_TAG | SyntaxKind::END_TAG))
            .map(|it| it.to_string())
            .collect()
    }

    /// Raw text of all character data inside the element.
    pub fn text_content(&self) -> String {
        text_content(&self.0)
    }
}

impl Attribute {
    /// Lowercased attribute name.
    pub fn name(&self) -> String {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::ATTR_NAME)
            .map(|t| t.text().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Raw value with any surrounding quotes removed. Bare attributes have an
    /// empty value.
    pub fn value(&self) -> String {
        let Some(value) = self
            .0
            .children()
            .find(|n| n.kind() == SyntaxKind::ATTR_VALUE)
        else {
            return String::new();
        };
        let text = value.text().to_string();
        for quote in ['"', '\''] {
            if let Some(inner) = text.strip_prefix(quote) {
                return inner.strip_suffix(quote).unwrap_or(inner).to_string();
            }
        }
        text
    }
}

fn text_content(node: &SyntaxNode) -> String {
    node.descendants()
        .filter(|n| n.kind() == SyntaxKind::HTML_TEXT)
        .map(|n| n.text().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, parse_html};
    use pretty_assertions::assert_eq;

    fn document(input: &str) -> Document {
        Document::cast(parse(input).syntax()).unwrap()
    }

    fn fragment(input: &str) -> Fragment {
        Fragment::cast(parse_html(input).syntax()).unwrap()
    }

    #[test]
    fn cast_checks_kind() {
        let root = parse("x").syntax();
        assert!(Fragment::cast(root.clone()).is_none());
        assert!(Document::cast(root).is_some());
    }

    #[test]
    fn section_accessors() {
        let doc = document(r#"<!--blk:core/quote {"cite":"me"}--> q <!--/blk:core/quote-->"#);
        let section = doc.sections().next().unwrap();
        assert_eq!(section.name().as_deref(), Some("core/quote"));
        assert_eq!(
            section.opening().unwrap().attributes().as_deref(),
            Some(r#"{"cite":"me"}"#)
        );
        assert_eq!(section.content(), " q ");
        assert!(!section.is_void());
        assert_eq!(section.closing().unwrap().name().as_deref(), Some("core/quote"));
    }

    #[test]
    fn void_section_has_no_content() {
        let doc = document("<!--blk:spacer /-->");
        let section = doc.sections().next().unwrap();
        assert!(section.is_void());
        assert_eq!(section.content(), "");
        assert!(section.closing().is_none());
        assert_eq!(section.opening().unwrap().attributes(), None);
    }

    #[test]
    fn item_spans_cover_document() {
        let input = "a <!--blk:x-->b<!--/blk:x--> c<!--/blk:y-->";
        let doc = document(input);
        let spans: Vec<_> = doc.items().map(|i| i.span()).collect();
        assert_eq!(spans, vec![0..2, 2..28, 28..30, 30..43]);
    }

    #[test]
    fn element_accessors() {
        let frag = fragment(
            r#"<figure id="f1" class="wide wp-image"><img SRC='a.png' alt=cat><figcaption>A <em>cat</em></figcaption></figure>"#,
        );
        let figure = frag.elements().next().unwrap();
        assert_eq!(figure.tag_name(), "figure");
        assert_eq!(figure.id().as_deref(), Some("f1"));
        assert!(figure.has_class("wp-image"));
        assert!(!figure.has_class("wp"));

        let children: Vec<_> = figure.child_elements().map(|e| e.tag_name()).collect();
        assert_eq!(children, vec!["img", "figcaption"]);

        let img = figure.child_elements().next().unwrap();
        assert_eq!(img.attribute("src").as_deref(), Some("a.png"));
        assert_eq!(img.attribute("alt").as_deref(), Some("cat"));
        assert_eq!(img.parent_element(), Some(figure.clone()));

        let caption = figure.child_elements().nth(1).unwrap();
        assert_eq!(caption.inner_html(), "A <em>cat</em>");
        assert_eq!(caption.text_content(), "A cat");
    }

    #[test]
    fn bare_attribute_has_empty_value() {
        let frag = fragment("<input checked>");
        let input = frag.elements().next().unwrap();
        assert_eq!(input.attribute("checked").as_deref(), Some(""));
        assert_eq!(input.attribute("missing"), None);
    }

    #[test]
    fn descendants_are_in_document_order() {
        let frag = fragment("<ul><li>a</li><li><b>b</b></li></ul><p>c</p>");
        let tags: Vec<_> = frag.descendants().map(|e| e.tag_name()).collect();
        assert_eq!(tags, vec!["ul", "li", "li", "b", "p"]);
        assert_eq!(frag.text_content(), "abc");
    }
}
