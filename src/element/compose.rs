//! Deferred child rendering.
//!
//! A container creates children through declared helpers. In deferred mode a
//! child is not rendered at creation time: it is parked in a keyed arena and
//! an opaque placeholder marker flows into the surrounding content instead.
//! Once the container's capture phase finishes, the composer renders every
//! pending child, substitutes each of the container's own markers with its
//! child's output, and appends children that never surfaced inline (extracted
//! ones, or markers the block dropped) to their target sections.
//!
//! Markers embed the container's id, so a marker leaking across container
//! boundaries resolves to nothing rather than to someone else's child.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{Key, KeyData};

use crate::element::base::{Element, ElementInput};
use crate::render::{Content, RenderContext};
use crate::value::Value;

slotmap::new_key_type! {
    /// Arena key for one pending child.
    pub struct ChildKey;
}

/// A child created under deferred mode, waiting for composition.
pub(crate) struct PendingChild {
    pub(crate) element: Element,
    pub(crate) target: String,
    pub(crate) extracted: bool,
}

static CONTAINER_SEQ: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_container_id() -> u64 {
    CONTAINER_SEQ.fetch_add(1, Ordering::Relaxed)
}

const MARKER_PREFIX: &str = "<!-- tagsmith:child(";
const MARKER_SUFFIX: &str = ") -->";

fn marker_for(container: u64, key: ChildKey) -> String {
    format!(
        "{}{:x}:{:x}{}",
        MARKER_PREFIX,
        container,
        key.data().as_ffi(),
        MARKER_SUFFIX
    )
}

enum Piece<'a> {
    Text(&'a str),
    Marker { container: u64, key: ChildKey },
}

fn parse_marker_body(body: &str) -> Option<(u64, ChildKey)> {
    let (container, key) = body.split_once(':')?;
    let container = u64::from_str_radix(container, 16).ok()?;
    let key = u64::from_str_radix(key, 16).ok()?;
    Some((container, ChildKey::from(KeyData::from_ffi(key))))
}

fn split_markers(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(MARKER_PREFIX) {
        if start > 0 {
            pieces.push(Piece::Text(&rest[..start]));
        }
        let after = &rest[start + MARKER_PREFIX.len()..];
        if let Some(end) = after.find(MARKER_SUFFIX) {
            if let Some((container, key)) = parse_marker_body(&after[..end]) {
                pieces.push(Piece::Marker { container, key });
                rest = &after[end + MARKER_SUFFIX.len()..];
                continue;
            }
        }
        // Malformed marker text passes through verbatim.
        pieces.push(Piece::Text(MARKER_PREFIX));
        rest = after;
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    pieces
}

impl Element {
    /// Create a child through the helper declared under `name`.
    ///
    /// Returns the content to emit inline: the child's markup when rendering
    /// synchronously, a placeholder marker in deferred mode, or empty content
    /// when the child is routed into a section. Unknown helper names yield
    /// empty content.
    pub fn call_child(
        &mut self,
        name: &str,
        input: ElementInput,
        ctx: &mut dyn RenderContext,
    ) -> Content {
        self.call_child_inner(name, input, false, ctx)
    }

    /// Option-driven child creation: the option's value becomes the child's
    /// construction input, and the child is always extracted to its section.
    pub(crate) fn call_child_from_option(
        &mut self,
        name: &str,
        value: Value,
        ctx: &mut dyn RenderContext,
    ) {
        let input = ElementInput::from_child_option(value);
        self.call_child_inner(name, input, true, ctx);
    }

    fn call_child_inner(
        &mut self,
        name: &str,
        input: ElementInput,
        extracted: bool,
        ctx: &mut dyn RenderContext,
    ) -> Content {
        let Some(decl) = self.class.find_child(name) else {
            return Content::empty();
        };
        let ElementInput { mut args, mut opts, block } = input;
        opts.insert("helper_name", Value::Str(name.to_owned()));
        // Declared defaults win over caller input.
        args.extend(decl.default_args().iter().cloned());
        opts.merge(decl.default_opts().clone());
        let target = opts
            .remove("section")
            .map(|v| v.text())
            .unwrap_or_else(|| decl.section().to_owned());

        let deferred = self.deferred;
        self.mode_frozen = true;
        let mut child = Element::new(
            decl.class().clone(),
            ctx,
            ElementInput { args, opts, block },
        );

        if deferred {
            let key = self.children.insert(PendingChild {
                element: child,
                target,
                extracted,
            });
            if extracted {
                Content::empty()
            } else {
                ctx.mark_trusted(Content::from_text(
                    marker_for(self.container_id, key),
                    false,
                ))
            }
        } else if extracted || self.extract_children || self.omit_content() {
            let out = ctx.capture(&mut |ctx| child.render(ctx));
            self.sections.append(&target, &out);
            Content::empty()
        } else {
            child.render(ctx)
        }
    }

    /// Render all pending children and splice them into the captured
    /// content. Runs after the capture phase; calling it again is a no-op
    /// since the arena is drained.
    pub(crate) fn resolve_pending_children(&mut self, ctx: &mut dyn RenderContext) {
        if self.children.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.children);
        // Render in creation order; slotmap iteration follows slot order,
        // which matches insertion for an arena that never removes.
        let mut rendered: Vec<(ChildKey, Content, String)> = Vec::new();
        for (key, mut child) in pending {
            let out = ctx.capture(&mut |ctx| child.element.render(ctx));
            rendered.push((key, out, child.target));
        }

        let content = self.sections.take("content");
        let trusted = content.is_trusted();
        let mut rebuilt = Content::empty();
        for piece in split_markers(content.as_str()) {
            match piece {
                Piece::Text(text) => rebuilt.append(&Content::from_text(text, trusted)),
                Piece::Marker { container, key } if container == self.container_id => {
                    if let Some(index) = rendered.iter().position(|(k, _, _)| *k == key) {
                        let (_, out, _) = rendered.remove(index);
                        rebuilt.append(&out);
                    }
                    // Unknown key: the marker dissolves into nothing.
                }
                // Foreign markers dissolve too.
                Piece::Marker { .. } => {}
            }
        }
        self.sections.set("content", rebuilt);

        // Children that never surfaced inline go to their target sections,
        // in creation order.
        for (_, out, target) in rendered {
            self.sections.append(&target, &out);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ChildSpec, ComponentClass};
    use crate::testing::HtmlContext;
    use crate::value::{sym, OptionsMap};

    fn item_class() -> std::sync::Arc<ComponentClass> {
        let base = ComponentClass::base();
        ComponentClass::derive("item", &base)
            .default_tag("li")
            .build()
            .unwrap()
    }

    fn list_class() -> std::sync::Arc<ComponentClass> {
        let base = ComponentClass::base();
        ComponentClass::derive("list", &base)
            .default_tag("ul")
            .child("item", &item_class(), ChildSpec::new())
            .build()
            .unwrap()
    }

    #[test]
    fn marker_roundtrip() {
        let mut arena: slotmap::SlotMap<ChildKey, ()> = slotmap::SlotMap::with_key();
        let key = arena.insert(());
        let marker = marker_for(7, key);
        let pieces = split_markers(&marker);
        assert_eq!(pieces.len(), 1);
        match &pieces[0] {
            Piece::Marker { container, key: parsed } => {
                assert_eq!(*container, 7);
                assert_eq!(*parsed, key);
            }
            Piece::Text(_) => panic!("expected a marker"),
        }
    }

    #[test]
    fn split_preserves_surrounding_text() {
        let mut arena: slotmap::SlotMap<ChildKey, ()> = slotmap::SlotMap::with_key();
        let key = arena.insert(());
        let text = format!("before{}after", marker_for(1, key));
        let pieces = split_markers(&text);
        assert_eq!(pieces.len(), 3);
        assert!(matches!(pieces[0], Piece::Text("before")));
        assert!(matches!(pieces[1], Piece::Marker { container: 1, .. }));
        assert!(matches!(pieces[2], Piece::Text("after")));
    }

    #[test]
    fn malformed_marker_passes_through() {
        let text = "a<!-- tagsmith:child(oops)b";
        let joined: String = split_markers(text)
            .iter()
            .map(|p| match p {
                Piece::Text(t) => *t,
                Piece::Marker { .. } => "",
            })
            .collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn synchronous_child_renders_inline() {
        let mut ctx = HtmlContext::new();
        let mut list = Element::new(list_class(), &mut ctx, ElementInput::new());
        let out = list.call_child("item", ElementInput::new(), &mut ctx);
        assert_eq!(out.as_str(), "<li></li>");
    }

    #[test]
    fn unknown_helper_yields_empty() {
        let mut ctx = HtmlContext::new();
        let mut list = Element::new(list_class(), &mut ctx, ElementInput::new());
        assert!(list.call_child("missing", ElementInput::new(), &mut ctx).is_empty());
    }

    #[test]
    fn deferred_child_yields_a_marker() {
        let mut ctx = HtmlContext::new();
        let mut list = Element::new(list_class(), &mut ctx, ElementInput::new());
        list.set_deferred(true);
        let out = list.call_child("item", ElementInput::new(), &mut ctx);
        assert!(out.as_str().starts_with(MARKER_PREFIX));
        assert!(out.is_trusted());
        assert_eq!(list.children.len(), 1);
    }

    #[test]
    fn mode_freezes_at_first_child() {
        let mut ctx = HtmlContext::new();
        let mut list = Element::new(list_class(), &mut ctx, ElementInput::new());
        list.set_deferred(true);
        list.call_child("item", ElementInput::new(), &mut ctx);
        list.set_deferred(false);
        assert!(list.deferred());
    }

    #[test]
    fn foreign_and_stale_markers_dissolve() {
        let mut ctx = HtmlContext::new();
        let mut el = Element::new(list_class(), &mut ctx, ElementInput::new());
        el.set_deferred(true);
        el.call_child("item", ElementInput::new(), &mut ctx);

        // A marker from another container and one with a bogus key.
        let mut arena: slotmap::SlotMap<ChildKey, ()> = slotmap::SlotMap::with_key();
        let foreign = marker_for(el.container_id + 1, arena.insert(()));
        let stale = marker_for(el.container_id, arena.insert(()));
        let body = format!("a{foreign}b{stale}c");
        el.set_section("content", Content::from_text(body, true));

        el.resolve_pending_children(&mut ctx);
        assert_eq!(el.section("content").as_str(), "abc");
        // The real child was never inline, so it fell back to its section.
        assert_eq!(el.section("children").as_str(), "<li></li>");
    }

    #[test]
    fn child_defaults_override_caller_options() {
        let base = ComponentClass::base();
        let item = item_class();
        let list = ComponentClass::derive("list", &base)
            .child(
                "item",
                &item,
                ChildSpec::new().opt("id", "fixed").arg(sym("extra")),
            )
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        let mut el = Element::new(list, &mut ctx, ElementInput::new());
        let out = el.call_child("item", ElementInput::new().opt("id", "user"), &mut ctx);
        assert_eq!(out.as_str(), "<li id=\"fixed\"></li>");
    }

    #[test]
    fn child_helper_name_is_set() {
        let item = item_class();
        let base = ComponentClass::base();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(String::new()));
        let sink = seen.clone();
        let probe = ComponentClass::derive("probe", &item)
            .before(crate::class::Phase::Capture, move |el, _ctx| {
                *sink.lock().unwrap() = el.helper_name().unwrap_or("").to_owned();
            })
            .build()
            .unwrap();
        let list = ComponentClass::derive("list", &base)
            .child("entry", &probe, ChildSpec::new())
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        let mut el = Element::new(list, &mut ctx, ElementInput::new());
        el.call_child("entry", ElementInput::new(), &mut ctx);
        assert_eq!(*seen.lock().unwrap(), "entry");
    }

    #[test]
    fn section_option_overrides_declared_target() {
        let base = ComponentClass::base();
        let item = item_class();
        let list = ComponentClass::derive("list", &base)
            .section(&["aside"])
            .child("item", &item, ChildSpec::new())
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        let mut el = Element::new(list, &mut ctx, ElementInput::new());
        el.set_extract_children(true);
        el.call_child(
            "item",
            ElementInput::new().opt("section", sym("aside")),
            &mut ctx,
        );
        assert_eq!(el.section("aside").as_str(), "<li></li>");
        assert!(el.section("children").is_empty());
    }

    #[test]
    fn from_child_option_shapes() {
        let input = ElementInput::from_child_option(sym("x"));
        assert_eq!(input.args, vec![sym("x")]);

        let mut map = OptionsMap::new();
        map.insert("id", "a");
        let input = ElementInput::from_child_option(Value::Map(map));
        assert!(input.args.is_empty());
        assert_eq!(input.opts.get("id"), Some(&Value::from("a")));

        let mut map = OptionsMap::new();
        map.insert("id", "b");
        let input =
            ElementInput::from_child_option(Value::List(vec![sym("y"), Value::Map(map)]));
        assert_eq!(input.args, vec![sym("y")]);
        assert_eq!(input.opts.get("id"), Some(&Value::from("b")));
    }
}
