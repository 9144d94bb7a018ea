//! Named content sections and their placement order.
//!
//! A component class declares named sections; instances accumulate output
//! into them during the capture phase, and the final inner markup is the
//! concatenation of all sections in the class's *placement* order. Placement
//! is a plain linear list of section names bracketed by two sentinels,
//! `start` and `end`, which are insertion anchors only — they never appear as
//! entries themselves.
//!
//! Unknown section names are deliberate no-ops at the instance level: reading
//! one yields empty content and writing one is ignored, so partially
//! specified components still render.

use std::collections::HashMap;

use crate::render::Content;

/// Where a placed section lands relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Before,
    After,
}

/// The target of a `place` operation: another section or a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// The virtual start of the placement order.
    Start,
    /// The virtual end of the placement order.
    End,
    /// A named section.
    Section(String),
}

impl Anchor {
    /// Anchor at a named section.
    pub fn section(name: &str) -> Self {
        Self::Section(name.to_owned())
    }
}

/// Move `name` within `order` relative to `target`.
///
/// No-op (returning `false`) when `name` is absent, the target section is
/// absent, or the move is otherwise impossible. Placing before `Start` or
/// after `End` pins the section at the corresponding edge.
pub(crate) fn apply_place(
    order: &mut Vec<String>,
    name: &str,
    relation: Relation,
    target: &Anchor,
) -> bool {
    let Some(from) = order.iter().position(|s| s == name) else {
        return false;
    };
    match target {
        Anchor::Start => {
            let item = order.remove(from);
            order.insert(0, item);
        }
        Anchor::End => {
            let item = order.remove(from);
            order.push(item);
        }
        Anchor::Section(dst) => {
            if dst == name || !order.iter().any(|s| s == dst) {
                return false;
            }
            let item = order.remove(from);
            let base = order
                .iter()
                .position(|s| s == dst)
                .expect("target still present after removal");
            let to = match relation {
                Relation::Before => base,
                Relation::After => base + 1,
            };
            order.insert(to, item);
        }
    }
    true
}

/// Whether `name` is one of the sentinel spellings and therefore not
/// declarable as a section.
pub(crate) fn is_sentinel(name: &str) -> bool {
    name == "start" || name == "end"
}

// ---------------------------------------------------------------------------
// SectionBuffer
// ---------------------------------------------------------------------------

/// Per-instance content accumulators, one per declared section.
///
/// Slots are lazily initialized to empty content. Only names declared on the
/// owning class (or its ancestors) are addressable.
#[derive(Debug, Default)]
pub struct SectionBuffer {
    known: Vec<String>,
    slots: HashMap<String, Content>,
}

impl SectionBuffer {
    /// A buffer addressing the given section names.
    pub fn new(known: Vec<String>) -> Self {
        Self {
            known,
            slots: HashMap::new(),
        }
    }

    /// The declared section names, in declaration (root-first) order.
    pub fn known(&self) -> &[String] {
        &self.known
    }

    fn is_known(&self, name: &str) -> bool {
        self.known.iter().any(|s| s == name)
    }

    /// The current content of `name`; empty for unknown or untouched names.
    pub fn get(&self, name: &str) -> Content {
        self.slots.get(name).cloned().unwrap_or_else(Content::empty)
    }

    /// Replace the content of `name`; ignored for unknown names.
    pub fn set(&mut self, name: &str, content: Content) {
        if self.is_known(name) {
            self.slots.insert(name.to_owned(), content);
        }
    }

    /// Append to the content of `name`; ignored for unknown names.
    pub fn append(&mut self, name: &str, content: &Content) {
        if self.is_known(name) {
            self.slots
                .entry(name.to_owned())
                .or_insert_with(Content::empty)
                .append(content);
        }
    }

    /// Remove and return the content of `name`, resetting the slot to empty.
    pub fn take(&mut self, name: &str) -> Content {
        self.slots.remove(name).unwrap_or_else(Content::empty)
    }

    /// Concatenate sections in `order` (minus `except`), resetting each
    /// consumed section to empty. Composition is one-shot: a second call
    /// yields empty content unless sections were refilled.
    pub fn compose(&mut self, order: &[String], except: &[&str]) -> Content {
        let mut out = Content::empty();
        for name in order {
            if except.contains(&name.as_str()) || !self.is_known(name) {
                continue;
            }
            let piece = self.take(name);
            out.append(&piece);
        }
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Vec<String> {
        vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]
    }

    // -----------------------------------------------------------------------
    // apply_place
    // -----------------------------------------------------------------------

    #[test]
    fn place_before_section() {
        let mut ord = order();
        assert!(apply_place(&mut ord, "c", Relation::Before, &Anchor::section("a")));
        assert_eq!(ord, vec!["c", "a", "b"]);
    }

    #[test]
    fn place_after_section() {
        let mut ord = order();
        assert!(apply_place(&mut ord, "a", Relation::After, &Anchor::section("b")));
        assert_eq!(ord, vec!["b", "a", "c"]);
    }

    #[test]
    fn place_at_start_and_end() {
        let mut ord = order();
        assert!(apply_place(&mut ord, "b", Relation::Before, &Anchor::Start));
        assert_eq!(ord, vec!["b", "a", "c"]);
        assert!(apply_place(&mut ord, "b", Relation::Before, &Anchor::End));
        assert_eq!(ord, vec!["a", "c", "b"]);
    }

    #[test]
    fn place_unknown_name_is_noop() {
        let mut ord = order();
        assert!(!apply_place(&mut ord, "zz", Relation::Before, &Anchor::Start));
        assert_eq!(ord, order());
    }

    #[test]
    fn place_unknown_target_is_noop() {
        let mut ord = order();
        assert!(!apply_place(&mut ord, "a", Relation::Before, &Anchor::section("zz")));
        assert_eq!(ord, order());
    }

    #[test]
    fn place_onto_itself_is_noop() {
        let mut ord = order();
        assert!(!apply_place(&mut ord, "a", Relation::Before, &Anchor::section("a")));
        assert_eq!(ord, order());
    }

    #[test]
    fn sentinel_spellings() {
        assert!(is_sentinel("start"));
        assert!(is_sentinel("end"));
        assert!(!is_sentinel("content"));
    }

    // -----------------------------------------------------------------------
    // SectionBuffer
    // -----------------------------------------------------------------------

    fn buffer() -> SectionBuffer {
        SectionBuffer::new(order())
    }

    #[test]
    fn get_untouched_is_empty() {
        let buf = buffer();
        assert!(buf.get("a").is_empty());
    }

    #[test]
    fn get_unknown_is_empty() {
        let buf = buffer();
        assert!(buf.get("missing").is_empty());
    }

    #[test]
    fn set_unknown_is_ignored() {
        let mut buf = buffer();
        buf.set("missing", Content::from_text("x", true));
        assert!(buf.get("missing").is_empty());
    }

    #[test]
    fn set_and_get_roundtrip() {
        let mut buf = buffer();
        buf.set("a", Content::from_text("hello", true));
        assert_eq!(buf.get("a").as_str(), "hello");
    }

    #[test]
    fn append_accumulates() {
        let mut buf = buffer();
        buf.append("a", &Content::from_text("x", true));
        buf.append("a", &Content::from_text("y", true));
        assert_eq!(buf.get("a").as_str(), "xy");
    }

    #[test]
    fn take_resets_slot() {
        let mut buf = buffer();
        buf.set("a", Content::from_text("x", true));
        assert_eq!(buf.take("a").as_str(), "x");
        assert!(buf.get("a").is_empty());
    }

    #[test]
    fn compose_concatenates_in_order() {
        let mut buf = buffer();
        buf.set("c", Content::from_text("3", true));
        buf.set("a", Content::from_text("1", true));
        buf.set("b", Content::from_text("2", true));
        let out = buf.compose(&order(), &[]);
        assert_eq!(out.as_str(), "123");
    }

    #[test]
    fn compose_is_destructive() {
        let mut buf = buffer();
        buf.set("a", Content::from_text("1", true));
        assert_eq!(buf.compose(&order(), &[]).as_str(), "1");
        assert!(buf.compose(&order(), &[]).is_empty());
    }

    #[test]
    fn compose_skips_except() {
        let mut buf = buffer();
        buf.set("a", Content::from_text("1", true));
        buf.set("b", Content::from_text("2", true));
        let out = buf.compose(&order(), &["b"]);
        assert_eq!(out.as_str(), "1");
        // The skipped section is untouched.
        assert_eq!(buf.get("b").as_str(), "2");
    }

    #[test]
    fn compose_skips_unknown_order_entries() {
        let mut buf = buffer();
        buf.set("a", Content::from_text("1", true));
        let ord = vec!["zz".to_owned(), "a".to_owned()];
        assert_eq!(buf.compose(&ord, &[]).as_str(), "1");
    }
}
