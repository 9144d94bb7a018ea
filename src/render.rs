//! The rendering-context boundary.
//!
//! The engine never serializes a tag or escapes markup itself — everything
//! textual goes through a [`RenderContext`] supplied by the host template
//! engine. [`Content`] is the opaque appendable value flowing between the
//! two: a piece of text plus a trust flag the context uses to decide whether
//! escaping is still needed. The crate's own [`crate::testing::HtmlContext`]
//! is a plain standalone implementation.

use crate::value::OptionsMap;

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// An opaque, appendable piece of output.
///
/// Empty content counts as trusted. Appending untrusted content to trusted
/// content taints the result; what "trusted" means (and when to escape) is
/// entirely the context's business.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    text: String,
    trusted: bool,
}

impl Content {
    /// Empty, trusted content.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            trusted: true,
        }
    }

    /// Content from raw text with an explicit trust flag.
    pub fn from_text(text: impl Into<String>, trusted: bool) -> Self {
        Self {
            text: text.into(),
            trusted,
        }
    }

    /// The textual payload.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether there is no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the payload is marked trusted.
    pub fn is_trusted(&self) -> bool {
        self.is_empty() || self.trusted
    }

    pub(crate) fn set_trusted(&mut self, trusted: bool) {
        self.trusted = trusted;
    }

    /// Append another piece of content, combining trust flags.
    pub fn append(&mut self, other: &Content) {
        if other.is_empty() {
            return;
        }
        self.trusted = self.is_trusted() && other.is_trusted();
        self.text.push_str(&other.text);
    }

    /// Append raw text without changing the trust flag.
    pub(crate) fn push_raw(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

// ---------------------------------------------------------------------------
// RenderContext
// ---------------------------------------------------------------------------

/// The interface a host template engine exposes to components.
///
/// All tag serialization, escaping policy, and buffer semantics live behind
/// this trait. Components call it; they never produce markup on their own.
pub trait RenderContext {
    /// A fresh, empty content value.
    fn empty_content(&self) -> Content {
        Content::empty()
    }

    /// Append raw text to a buffer without escaping.
    fn append_raw(&self, buffer: &mut Content, text: &str);

    /// Whether `content` is already safe to emit verbatim.
    fn is_trusted(&self, content: &Content) -> bool;

    /// Mark `content` as safe to emit verbatim.
    fn mark_trusted(&self, content: Content) -> Content;

    /// Run a block that produces nested output and return it as a value
    /// rather than writing to any ambient buffer.
    fn capture(&mut self, block: &mut dyn FnMut(&mut dyn RenderContext) -> Content) -> Content;

    /// Serialize a complete tag around `inner` with the given attributes.
    fn wrap_tag(&self, tag: &str, inner: &Content, attrs: &OptionsMap) -> Content;
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_is_trusted() {
        let content = Content::empty();
        assert!(content.is_empty());
        assert!(content.is_trusted());
    }

    #[test]
    fn from_text_carries_flag() {
        assert!(Content::from_text("<b>", true).is_trusted());
        assert!(!Content::from_text("<b>", false).is_trusted());
    }

    #[test]
    fn append_combines_text() {
        let mut content = Content::from_text("a", true);
        content.append(&Content::from_text("b", true));
        assert_eq!(content.as_str(), "ab");
        assert!(content.is_trusted());
    }

    #[test]
    fn append_untrusted_taints() {
        let mut content = Content::from_text("a", true);
        content.append(&Content::from_text("b", false));
        assert!(!content.is_trusted());
    }

    #[test]
    fn append_empty_keeps_trust() {
        let mut content = Content::from_text("a", true);
        content.append(&Content::empty());
        assert!(content.is_trusted());
        assert_eq!(content.as_str(), "a");
    }

    #[test]
    fn append_to_empty_takes_other_flag() {
        let mut content = Content::empty();
        content.append(&Content::from_text("x", false));
        assert!(!content.is_trusted());
    }
}
