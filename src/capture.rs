//! Capture lists: ordered value sequences with condition-driven extraction.
//!
//! Argument resolution works by *capturing*: matching elements are removed
//! from the input sequence and handed to a resolver, leaving the rest in
//! place for later specs or generic fallback handling. Both extraction
//! operations preserve the relative order of the remaining elements, and both
//! are total — an empty list or a miss yields an empty result, never an
//! error.

use crate::condition::{matches, Condition};
use crate::value::Value;

/// A mutable ordered sequence supporting condition-driven extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureList {
    items: Vec<Value>,
}

impl CaptureList {
    /// Create an empty capture list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The remaining elements, in order.
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Consume the list, returning the remaining elements.
    pub fn into_inner(self) -> Vec<Value> {
        self.items
    }

    /// The number of remaining elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no remaining elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an element at the end.
    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    /// Remove every element matching `conditions`, in place, and return the
    /// removed elements in their original order.
    pub fn capture_all(&mut self, conditions: &[Condition]) -> Vec<Value> {
        self.capture_with(|value| matches(value, conditions))
    }

    /// Remove and return only the first element matching `conditions`, or
    /// `None` when nothing matches. The rest of the list is untouched.
    pub fn capture_first(&mut self, conditions: &[Condition]) -> Option<Value> {
        let index = self
            .items
            .iter()
            .position(|value| matches(value, conditions))?;
        Some(self.items.remove(index))
    }

    /// Block form of [`capture_first`](Self::capture_first): remove and
    /// return the first element for which `predicate` returns true.
    pub fn capture_first_with(&mut self, predicate: impl Fn(&Value) -> bool) -> Option<Value> {
        let index = self.items.iter().position(|value| predicate(value))?;
        Some(self.items.remove(index))
    }

    /// Block form of [`capture_all`](Self::capture_all): remove every element
    /// for which `predicate` returns true.
    pub fn capture_with(&mut self, predicate: impl Fn(&Value) -> bool) -> Vec<Value> {
        let mut captured = Vec::new();
        let mut remaining = Vec::with_capacity(self.items.len());
        for value in self.items.drain(..) {
            if predicate(&value) {
                captured.push(value);
            } else {
                remaining.push(value);
            }
        }
        self.items = remaining;
        captured
    }
}

impl From<Vec<Value>> for CaptureList {
    fn from(items: Vec<Value>) -> Self {
        Self { items }
    }
}

impl FromIterator<Value> for CaptureList {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
