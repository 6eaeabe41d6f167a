//! SyntaxKind enum for all tokens and nodes in the post document CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Both grammars (block delimiters and HTML fragments) build trees from it, so
//! one set of tree types serves both. Every byte in the source must appear as
//! a token in the tree.

/// All syntax kinds for the document and HTML fragment CSTs.
///
/// This enum represents both tokens (lexer output) and composite nodes (parser output).
/// The `repr(u16)` ensures efficient storage in rowan's green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (lexer output) ===
    /// Whitespace, including line endings
    WHITESPACE,
    /// Run of ordinary characters
    TEXT,
    /// `<!--`
    COMMENT_OPEN,
    /// `-->`
    COMMENT_CLOSE,
    /// `/`
    SLASH,
    /// `{` opening an attribute payload
    L_BRACE,
    /// `}` closing an attribute payload
    R_BRACE,
    /// `"`
    QUOTE,
    /// `\` escape inside attribute payload strings
    BACKSLASH,
    /// `<` opening an HTML tag
    L_ANGLE,
    /// `</` opening an HTML end tag
    L_ANGLE_SLASH,
    /// `>` closing an HTML tag
    R_ANGLE,
    /// `/>` closing a self-closing HTML tag (composite token)
    SLASH_R_ANGLE,
    /// `=` between an HTML attribute name and value
    EQ,
    /// `'`
    APOSTROPHE,
    /// Block name in a delimiter, including the `blk:` prefix (composite token)
    BLOCK_NAME,
    /// HTML tag name (composite token)
    TAG_NAME,
    /// HTML attribute name (composite token)
    ATTR_NAME,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root of a post document
    ROOT,
    /// Text outside any structured section
    FREEFORM,
    /// A structured section: opening + content + closing, or a void delimiter
    SECTION,
    /// `<!--blk:name {...}-->`
    OPENING_DELIMITER,
    /// `<!--/blk:name-->`
    CLOSING_DELIMITER,
    /// `<!--blk:name {...} /-->`
    VOID_DELIMITER,
    /// JSON attribute payload of a delimiter
    ATTRIBUTES,
    /// Raw inner text of a section
    CONTENT,
    /// Root of an HTML fragment
    FRAGMENT,
    /// HTML element (start tag, children, optional end tag)
    ELEMENT,
    /// `<tag attr="value">`
    START_TAG,
    /// `</tag>`
    END_TAG,
    /// Single HTML attribute
    ATTRIBUTE,
    /// HTML attribute value, quotes included
    ATTR_VALUE,
    /// Character data between tags
    HTML_TEXT,
    /// HTML comment, doctype or processing instruction
    COMMENT,

    /// Error recovery node
    ERROR,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PostLang {}

impl rowan::Language for PostLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::ERROR as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<PostLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<PostLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<PostLang>;
