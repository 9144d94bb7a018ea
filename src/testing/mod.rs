//! Headless testing support: a plain html rendering context.
//!
//! [`HtmlContext`] is a self-contained [`RenderContext`] with no template
//! engine behind it: tags are serialized directly, untrusted content is
//! html-escaped, attribute values are always escaped. Use
//! [`render_to_string`] to capture a component's output for assertions.

use std::sync::Arc;

use crate::class::ComponentClass;
use crate::element::{Element, ElementInput};
use crate::render::{Content, RenderContext};
use crate::value::{OptionsMap, Value};

/// A standalone rendering context producing plain html text.
#[derive(Debug, Default)]
pub struct HtmlContext;

impl HtmlContext {
    pub fn new() -> Self {
        Self
    }
}

impl RenderContext for HtmlContext {
    fn append_raw(&self, buffer: &mut Content, text: &str) {
        buffer.push_raw(text);
    }

    fn is_trusted(&self, content: &Content) -> bool {
        content.is_trusted()
    }

    fn mark_trusted(&self, mut content: Content) -> Content {
        content.set_trusted(true);
        content
    }

    fn capture(&mut self, block: &mut dyn FnMut(&mut dyn RenderContext) -> Content) -> Content {
        block(self)
    }

    fn wrap_tag(&self, tag: &str, inner: &Content, attrs: &OptionsMap) -> Content {
        let mut out = String::new();
        out.push('<');
        out.push_str(tag);
        for (key, value) in attrs.iter() {
            match value {
                Value::Bool(false) => {}
                Value::Bool(true) => {
                    out.push(' ');
                    out.push_str(key);
                }
                other => {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&other.text()));
                    out.push('"');
                }
            }
        }
        out.push('>');
        if inner.is_trusted() {
            out.push_str(inner.as_str());
        } else {
            out.push_str(&escape_text(inner.as_str()));
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
        Content::from_text(out, true)
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Construct an instance of `class` from `input` and render it to a plain
/// string through a fresh [`HtmlContext`].
pub fn render_to_string(class: &Arc<ComponentClass>, input: ElementInput) -> String {
    let mut ctx = HtmlContext::new();
    let mut element = Element::new(Arc::clone(class), &mut ctx, input);
    element.render(&mut ctx).as_str().to_owned()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_tag_serializes_attrs_in_order() {
        let ctx = HtmlContext::new();
        let mut attrs = OptionsMap::new();
        attrs.insert("id", "x");
        attrs.insert("title", "t");
        let out = ctx.wrap_tag("span", &Content::from_text("hi", true), &attrs);
        assert_eq!(out.as_str(), "<span id=\"x\" title=\"t\">hi</span>");
        assert!(out.is_trusted());
    }

    #[test]
    fn untrusted_inner_is_escaped() {
        let ctx = HtmlContext::new();
        let out = ctx.wrap_tag(
            "p",
            &Content::from_text("<b>&</b>", false),
            &OptionsMap::new(),
        );
        assert_eq!(out.as_str(), "<p>&lt;b&gt;&amp;&lt;/b&gt;</p>");
    }

    #[test]
    fn attr_values_are_escaped() {
        let ctx = HtmlContext::new();
        let mut attrs = OptionsMap::new();
        attrs.insert("title", "say \"hi\"");
        let out = ctx.wrap_tag("i", &Content::empty(), &attrs);
        assert_eq!(out.as_str(), "<i title=\"say &quot;hi&quot;\"></i>");
    }

    #[test]
    fn boolean_attrs() {
        let ctx = HtmlContext::new();
        let mut attrs = OptionsMap::new();
        attrs.insert("disabled", true);
        attrs.insert("hidden", false);
        let out = ctx.wrap_tag("button", &Content::empty(), &attrs);
        assert_eq!(out.as_str(), "<button disabled></button>");
    }

    #[test]
    fn list_attrs_join_with_spaces() {
        let ctx = HtmlContext::new();
        let mut attrs = OptionsMap::new();
        attrs.insert(
            "class",
            Value::List(vec![Value::from("a"), Value::from("b")]),
        );
        let out = ctx.wrap_tag("div", &Content::empty(), &attrs);
        assert_eq!(out.as_str(), "<div class=\"a b\"></div>");
    }

    #[test]
    fn render_to_string_runs_the_full_lifecycle() {
        let base = ComponentClass::base();
        let out = render_to_string(
            &base,
            ElementInput::new()
                .opt("id", "x")
                .block(|_el, ctx| ctx.mark_trusted(Content::from_text("body", false))),
        );
        assert_eq!(out, "<div id=\"x\">body</div>");
    }
}
