//! # CSS-style Selectors over HTML Fragments
//!
//! Matcher rules name the element they read from with a small selector
//! language:
//!
//! | syntax          | matches                                    |
//! |-----------------|--------------------------------------------|
//! | `img`           | elements by tag name (case-insensitive)    |
//! | `*`             | any element                                |
//! | `#hero`         | `id="hero"`                                |
//! | `.caption`      | elements whose `class` list has `caption`  |
//! | `[href]`        | elements with an `href` attribute          |
//! | `[rel=next]`    | attribute equal to a value (may be quoted) |
//! | `figure img`    | descendant combinator                      |
//! | `ul > li`       | child combinator                           |
//! | `h1, h2`        | either alternative                         |
//!
//! The empty selector selects the scope itself: the whole fragment at the
//! top level, or the current element inside a `query`.

use std::collections::HashSet;

use html_escape::decode_html_entities;
use postblocks_syntax::ast::{AstNode, Element, Fragment};
use postblocks_syntax::{SyntaxError, SyntaxNode, parse_html};

use crate::attributes::cursor::Cursor;
use crate::error::ExtractError;

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
    name: String,
    value: Option<String>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, ExtractError> {
        let invalid = |reason: String| ExtractError::InvalidSelector {
            selector: selector.to_string(),
            reason,
        };

        let mut cur = Cursor::new(selector);
        let mut alternatives = Vec::new();
        cur.skip_whitespace();

        while !cur.eof() {
            alternatives.push(complex(&mut cur).map_err(invalid)?);
            cur.skip_whitespace();
            if cur.eof() {
                break;
            }
            if !cur.eat(b',') {
                return Err(invalid(format!("unexpected `{}`", cur.rest())));
            }
            cur.skip_whitespace();
            if cur.eof() {
                return Err(invalid("expected a selector after `,`".into()));
            }
        }

        Ok(Self { alternatives })
    }

    /// True for the empty selector, which designates the scope itself.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }
}

impl Complex {
    /// Match right to left: the last compound against `element`, then walk
    /// up through ancestors. Candidates sit on an explicit worklist of
    /// (element, compounds left to match), each visited once.
    fn matches(&self, element: &Element) -> bool {
        let mut pending = vec![(element.clone(), self.compounds.len())];
        let mut seen = HashSet::new();

        while let Some((candidate, remaining)) = pending.pop() {
            if !seen.insert((candidate.span(), remaining)) {
                continue;
            }
            if !self.compounds[remaining - 1].matches(&candidate) {
                continue;
            }
            if remaining == 1 {
                return true;
            }

            let mut ancestor = candidate.parent_element();
            match self.combinators[remaining - 2] {
                Combinator::Child => pending.extend(ancestor.map(|parent| (parent, remaining - 1))),
                Combinator::Descendant => {
                    while let Some(parent) = ancestor {
                        ancestor = parent.parent_element();
                        pending.push((parent, remaining - 1));
                    }
                }
            }
        }
        false
    }
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        self.tag.as_ref().is_none_or(|tag| element.tag_name() == *tag)
            && self
                .id
                .as_ref()
                .is_none_or(|id| element.id().as_deref() == Some(id.as_str()))
            && self.classes.iter().all(|class| element.has_class(class))
            && self.attributes.iter().all(|test| {
                match (&test.value, element.attribute(&test.name)) {
                    (_, None) => false,
                    (None, Some(_)) => true,
                    (Some(expected), Some(actual)) => decode_html_entities(&actual) == *expected,
                }
            })
    }
}

fn complex(cur: &mut Cursor<'_>) -> Result<Complex, String> {
    let mut compounds = vec![compound(cur)?];
    let mut combinators = Vec::new();

    loop {
        let had_whitespace = cur.skip_whitespace();
        let combinator = if cur.eat(b'>') {
            cur.skip_whitespace();
            Combinator::Child
        } else if had_whitespace && !matches!(cur.peek(), None | Some(b',')) {
            Combinator::Descendant
        } else {
            break;
        };
        combinators.push(combinator);
        compounds.push(compound(cur)?);
    }

    Ok(Complex {
        compounds,
        combinators,
    })
}

fn compound(cur: &mut Cursor<'_>) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let mut any = cur.eat(b'*');
    if !any {
        let tag = cur.eat_while(is_ident);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
            any = true;
        }
    }

    loop {
        match cur.peek() {
            Some(b'#') => {
                cur.bump();
                compound.id = Some(ident(cur)?.to_string());
            }
            Some(b'.') => {
                cur.bump();
                compound.classes.push(ident(cur)?.to_string());
            }
            Some(b'[') => {
                cur.bump();
                compound.attributes.push(attribute_test(cur)?);
            }
            _ => break,
        }
        any = true;
    }

    if !any {
        return Err(if cur.eof() {
            "expected a selector".into()
        } else {
            format!("unexpected `{}`", cur.rest())
        });
    }
    Ok(compound)
}

fn attribute_test(cur: &mut Cursor<'_>) -> Result<AttributeTest, String> {
    cur.skip_whitespace();
    let name = ident(cur)?.to_ascii_lowercase();
    cur.skip_whitespace();

    let value = if cur.eat(b'=') {
        cur.skip_whitespace();
        let value = match cur.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                cur.bump();
                let value = cur.eat_while(|b| b != quote);
                if !cur.eat(quote) {
                    return Err("unterminated string".into());
                }
                value
            }
            _ => ident(cur)?,
        };
        cur.skip_whitespace();
        Some(value.to_string())
    } else {
        None
    };

    if !cur.eat(b']') {
        return Err("expected `]`".into());
    }
    Ok(AttributeTest { name, value })
}

fn ident<'a>(cur: &mut Cursor<'a>) -> Result<&'a str, String> {
    match cur.eat_while(is_ident) {
        "" => Err("expected a name".into()),
        name => Ok(name),
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// The part of a parsed fragment a matcher runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Fragment(Fragment),
    Element(Element),
}

impl Scope {
    /// Parse `html` into a fragment scope.
    ///
    /// HTML is parsed forgivingly; the one failure is markup nested past
    /// the parser's depth limit.
    pub fn parse(html: &str) -> Result<Self, ExtractError> {
        let parse = parse_html(html);
        if let Some(error) = parse
            .errors()
            .iter()
            .find(|e| matches!(e, SyntaxError::NestingTooDeep { .. }))
        {
            return Err(ExtractError::Markup(error.clone()));
        }

        match Fragment::cast(parse.syntax()) {
            Some(fragment) => Ok(Scope::Fragment(fragment)),
            None => unreachable!("parse_html always yields a FRAGMENT root"),
        }
    }

    fn node(&self) -> &SyntaxNode {
        match self {
            Scope::Fragment(fragment) => fragment.syntax(),
            Scope::Element(element) => element.syntax(),
        }
    }

    /// Elements strictly inside the scope, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = Element> + '_ {
        let node = self.node();
        node.descendants()
            .filter(move |n| n != node)
            .filter_map(Element::cast)
    }

    pub fn select_all(&self, selector: &Selector) -> Vec<Element> {
        self.descendants().filter(|e| selector.matches(e)).collect()
    }

    pub fn select_first(&self, selector: &Selector) -> Option<Element> {
        self.descendants().find(|e| selector.matches(e))
    }

    /// The scope itself for an empty selector, otherwise the first match.
    pub fn find(&self, selector: &Selector) -> Option<Scope> {
        if selector.is_empty() {
            Some(self.clone())
        } else {
            self.select_first(selector).map(Scope::Element)
        }
    }

    /// Decoded attribute value. A fragment has no attributes.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match self {
            Scope::Fragment(_) => None,
            Scope::Element(element) => element
                .attribute(name)
                .map(|value| decode_html_entities(&value).into_owned()),
        }
    }

    /// Source HTML inside the scope.
    pub fn inner_html(&self) -> String {
        match self {
            Scope::Fragment(fragment) => fragment.text(),
            Scope::Element(element) => element.inner_html(),
        }
    }

    /// Decoded character data inside the scope.
    pub fn text_content(&self) -> String {
        let raw = match self {
            Scope::Fragment(fragment) => fragment.text_content(),
            Scope::Element(element) => element.text_content(),
        };
        decode_html_entities(&raw).into_owned()
    }
}
