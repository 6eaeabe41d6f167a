//! # Matcher Rules
//!
//! A matcher rule derives one attribute value from a section's HTML. Block
//! types declare a set of them keyed by attribute name:
//!
//! ```
//! use std::collections::BTreeMap;
//! use postblocks_engine::attributes::matchers::{attr, query, text};
//!
//! # fn main() -> Result<(), postblocks_engine::ExtractError> {
//! let rules = BTreeMap::from([
//!     ("url".to_string(), attr("img", "src")?),
//!     ("caption".to_string(), text("figcaption")?),
//!     (
//!         "links".to_string(),
//!         query("a", BTreeMap::from([("href".to_string(), attr("", "href")?)]))?,
//!     ),
//! ]);
//! assert!(rules.values().all(|rule| rule.is_matcher()));
//! assert!(attr("a >", "href").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! Only rules built here (or with [`MatcherRule::tagged`]) carry the matcher
//! tag. The resolver skips anything else in the set, so a stray callable can
//! never contribute an attribute.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::attributes::selector::{Scope, Selector};
use crate::error::ExtractError;

/// What a rule runs: `Ok(None)` means "no match, contribute no key".
pub type MatcherFn = dyn Fn(&Scope) -> Result<Option<Value>, ExtractError> + Send + Sync;

/// Attribute name → rule.
pub type MatcherSet = BTreeMap<String, MatcherRule>;

/// An extraction rule plus the tag saying it is a known matcher.
#[derive(Clone)]
pub struct MatcherRule {
    is_matcher: bool,
    evaluate: Arc<MatcherFn>,
}

impl MatcherRule {
    /// A custom rule recognised by the resolver.
    pub fn tagged(
        f: impl Fn(&Scope) -> Result<Option<Value>, ExtractError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            is_matcher: true,
            evaluate: Arc::new(f),
        }
    }

    /// A callable without the matcher tag. The resolver never runs it.
    pub fn untagged(
        f: impl Fn(&Scope) -> Result<Option<Value>, ExtractError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            is_matcher: false,
            evaluate: Arc::new(f),
        }
    }

    pub fn is_matcher(&self) -> bool {
        self.is_matcher
    }

    pub fn evaluate(&self, scope: &Scope) -> Result<Option<Value>, ExtractError> {
        (self.evaluate)(scope)
    }
}

impl fmt::Debug for MatcherRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherRule")
            .field("is_matcher", &self.is_matcher)
            .finish_non_exhaustive()
    }
}

/// Evaluate the tagged rules of `rules` against `scope`.
///
/// Untagged rules are dropped silently. Rules that find nothing leave their
/// key out.
pub fn evaluate_matchers(
    rules: &MatcherSet,
    scope: &Scope,
) -> Result<Map<String, Value>, ExtractError> {
    let mut extracted = Map::new();
    for (key, rule) in rules {
        if !rule.is_matcher() {
            log::trace!("ignoring untagged rule for attribute `{key}`");
            continue;
        }
        if let Some(value) = rule.evaluate(scope)? {
            extracted.insert(key.clone(), value);
        }
    }
    Ok(extracted)
}

/// Value of `attribute` on the first element matching `selector`.
///
/// Like every builder here, the selector is parsed up front; a bad one is
/// an error now rather than on every section.
pub fn attr(selector: &str, attribute: &str) -> Result<MatcherRule, ExtractError> {
    let selector = Selector::parse(selector)?;
    let attribute = attribute.to_string();
    Ok(MatcherRule::tagged(move |scope| {
        Ok(scope
            .find(&selector)
            .and_then(|t| t.attribute(&attribute))
            .map(Value::String))
    }))
}

/// Inner HTML of the first element matching `selector`.
pub fn html(selector: &str) -> Result<MatcherRule, ExtractError> {
    let selector = Selector::parse(selector)?;
    Ok(MatcherRule::tagged(move |scope| {
        Ok(scope.find(&selector).map(|t| Value::String(t.inner_html())))
    }))
}

/// Text content of the first element matching `selector`.
pub fn text(selector: &str) -> Result<MatcherRule, ExtractError> {
    let selector = Selector::parse(selector)?;
    Ok(MatcherRule::tagged(move |scope| {
        Ok(scope
            .find(&selector)
            .map(|t| Value::String(t.text_content())))
    }))
}

/// One object per element matching `selector`, built by running `matchers`
/// with that element as the scope. Always yields an array, possibly empty.
pub fn query(selector: &str, matchers: MatcherSet) -> Result<MatcherRule, ExtractError> {
    let selector = Selector::parse(selector)?;
    Ok(MatcherRule::tagged(move |scope| {
        let items = scope
            .select_all(&selector)
            .into_iter()
            .map(|element| evaluate_matchers(&matchers, &Scope::Element(element)).map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Value::Array(items)))
    }))
}

/// DOM-property style access: `innerHTML`, `textContent`, or any attribute.
pub fn prop(selector: &str, name: &str) -> Result<MatcherRule, ExtractError> {
    match name {
        "innerHTML" => html(selector),
        "textContent" => text(selector),
        attribute => attr(selector, attribute),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    const FIGURE: &str = r#"<figure><img src="cat.png" alt="A cat"><figcaption>My <b>cat</b> &amp; me</figcaption></figure>"#;

    fn eval(rule: Result<MatcherRule, ExtractError>, html: &str) -> Option<Value> {
        rule.unwrap()
            .evaluate(&Scope::parse(html).unwrap())
            .unwrap()
    }

    #[test]
    fn attr_reads_first_match() {
        assert_eq!(eval(attr("img", "src"), FIGURE), Some(json!("cat.png")));
        assert_eq!(eval(attr("img", "title"), FIGURE), None);
        assert_eq!(eval(attr("video", "src"), FIGURE), None);
    }

    #[test]
    fn html_and_text() {
        assert_eq!(
            eval(html("figcaption"), FIGURE),
            Some(json!("My <b>cat</b> &amp; me"))
        );
        assert_eq!(eval(text("figcaption"), FIGURE), Some(json!("My cat & me")));
    }

    #[test]
    fn empty_selector_reads_the_whole_fragment() {
        assert_eq!(eval(html(""), "<p>a</p>b"), Some(json!("<p>a</p>b")));
        assert_eq!(eval(text(""), "<p>a</p>b"), Some(json!("ab")));
        assert_eq!(eval(attr("", "id"), "<p id=x>a</p>"), None);
    }

    #[test]
    fn prop_dispatches_on_name() {
        assert_eq!(
            eval(prop("figcaption", "innerHTML"), FIGURE),
            eval(html("figcaption"), FIGURE)
        );
        assert_eq!(
            eval(prop("figcaption", "textContent"), FIGURE),
            Some(json!("My cat & me"))
        );
        assert_eq!(eval(prop("img", "alt"), FIGURE), Some(json!("A cat")));
    }

    #[test]
    fn query_builds_one_object_per_match() {
        let rule = query(
            "li",
            BTreeMap::from([
                ("href".to_string(), attr("a", "href").unwrap()),
                ("label".to_string(), text("").unwrap()),
            ]),
        );
        let html = r#"<ul><li><a href="/1">One</a></li><li>Two</li></ul>"#;
        assert_eq!(
            eval(rule, html),
            Some(json!([
                {"href": "/1", "label": "One"},
                {"label": "Two"},
            ]))
        );
    }

    #[test]
    fn query_with_no_matches_is_empty_array() {
        assert_eq!(eval(query("li", MatcherSet::new()), "<p>x</p>"), Some(json!([])));
    }

    #[rstest]
    #[case::list_items_without_end_tags(
        "<ul><li>a<li>b</ul>",
        query("li", MatcherSet::from([("t".to_string(), text("").unwrap())])),
        json!([{"t": "a"}, {"t": "b"}])
    )]
    #[case::unquoted_href_ending_in_slash(
        "<a href=/path/>link</a>",
        html("a"),
        json!("link")
    )]
    #[case::unquoted_href_value("<a href=/path/>link</a>", attr("a", "href"), json!("/path/"))]
    #[case::script_is_raw_text(
        "<p>x<script>if(a<b){}</script>",
        text("p"),
        json!("xif(a<b){}")
    )]
    #[case::script_markup_is_not_elements("<script>a<b>c</b></script>", html("b"), Value::Null)]
    #[case::paragraphs_without_end_tags("<p>one<p>two", text("p"), json!("one"))]
    #[case::table_cells(
        "<table><tr><td>1<td>2</table>",
        query("td", MatcherSet::from([("v".to_string(), text("").unwrap())])),
        json!([{"v": "1"}, {"v": "2"}])
    )]
    fn legacy_markup(
        #[case] markup: &str,
        #[case] rule: Result<MatcherRule, ExtractError>,
        #[case] expected: Value,
    ) {
        let expected = (!expected.is_null()).then_some(expected);
        assert_eq!(eval(rule, markup), expected);
    }

    #[rstest]
    #[case(attr("a >", "href"))]
    #[case(html("figure,"))]
    #[case(text("[href"))]
    #[case(query("#", MatcherSet::new()))]
    #[case(prop("a!b", "innerHTML"))]
    fn invalid_selector_fails_when_building(#[case] rule: Result<MatcherRule, ExtractError>) {
        assert!(matches!(rule, Err(ExtractError::InvalidSelector { .. })));
    }

    #[test]
    fn untagged_rules_are_skipped() {
        let rules = MatcherSet::from([
            ("url".to_string(), attr("img", "src").unwrap()),
            (
                "sneaky".to_string(),
                MatcherRule::untagged(|_| Ok(Some(json!("should not appear")))),
            ),
        ]);
        let extracted = evaluate_matchers(&rules, &Scope::parse(FIGURE).unwrap()).unwrap();
        assert_eq!(Value::Object(extracted), json!({"url": "cat.png"}));
    }

    #[test]
    fn custom_tagged_rule_errors_propagate() {
        let rules = MatcherSet::from([(
            "count".to_string(),
            MatcherRule::tagged(|_| Err(ExtractError::failed("boom"))),
        )]);
        let err = evaluate_matchers(&rules, &Scope::parse("").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
