//! Condition matching: the predicate language that argument and option specs
//! use to recognize construction input.
//!
//! A spec carries a list of [`Condition`]s. The list is OR-combined, except
//! that [`Condition::All`] entries act as conjunctions: an element matches
//! when it satisfies at least one OR-branch *and* every `All` sub-list.
//! Matching is side-effect-free and deterministic for a given input, so it is
//! safe to evaluate repeatedly and out of order.

use std::fmt;
use std::sync::Arc;

use crate::element::Element;
use crate::value::{Kind, Value};

/// A shared predicate over a value.
pub type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A predicate over the element under construction and a candidate value.
///
/// Evaluated lazily at match time, which lets a condition depend on state
/// resolved earlier in the same construction pass (options already applied,
/// whether a body block was given, and so on).
pub type StateFn = Arc<dyn Fn(&Element, &Value) -> bool + Send + Sync>;

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// A single matching condition.
#[derive(Clone)]
pub enum Condition {
    /// Matches (or rejects) unconditionally.
    Always(bool),
    /// Set membership: the value must equal one of these.
    OneOf(Vec<Value>),
    /// Wildcard match over the value's textual form.
    Pattern(Pattern),
    /// Capability check on the value's [`Kind`].
    OfKind(Kind),
    /// Structural equality against a single value.
    Eq(Value),
    /// A callable predicate; a truthy result counts as a match.
    Check(PredicateFn),
    /// A predicate that also sees the element under construction. Matches
    /// nothing outside a resolution pass (when no element exists).
    State(StateFn),
    /// Conjunction wrapper: AND-combined with the outer OR result. The
    /// sub-list is itself OR-combined.
    All(Vec<Condition>),
}

impl Condition {
    /// Shorthand for an equality condition against a symbol.
    pub fn symbol(name: &str) -> Self {
        Self::Eq(Value::Symbol(name.to_owned()))
    }

    /// Shorthand for a pattern condition.
    pub fn pattern(pat: &str) -> Self {
        Self::Pattern(Pattern::new(pat))
    }

    /// Shorthand for a predicate condition.
    pub fn check(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Check(Arc::new(f))
    }

    /// Shorthand for a state-aware predicate condition.
    pub fn state(f: impl Fn(&Element, &Value) -> bool + Send + Sync + 'static) -> Self {
        Self::State(Arc::new(f))
    }

    fn matches_one(&self, element: Option<&Element>, value: &Value) -> bool {
        match self {
            Self::Always(b) => *b,
            Self::OneOf(set) => set.contains(value),
            Self::Pattern(pat) => pat.matches(&value.text()),
            Self::OfKind(kind) => value.kind() == *kind,
            Self::Eq(expected) => expected == value,
            Self::Check(f) => f(value),
            Self::State(f) => element.is_some_and(|el| f(el, value)),
            // `All` never acts as an OR-branch; handled by `matches`.
            Self::All(_) => false,
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always(b) => f.debug_tuple("Always").field(b).finish(),
            Self::OneOf(set) => f.debug_tuple("OneOf").field(set).finish(),
            Self::Pattern(pat) => f.debug_tuple("Pattern").field(pat).finish(),
            Self::OfKind(kind) => f.debug_tuple("OfKind").field(kind).finish(),
            Self::Eq(value) => f.debug_tuple("Eq").field(value).finish(),
            Self::Check(_) => f.write_str("Check(..)"),
            Self::State(_) => f.write_str("State(..)"),
            Self::All(list) => f.debug_tuple("All").field(list).finish(),
        }
    }
}

/// Evaluate a condition list against a value, with no element in scope.
/// [`Condition::State`] entries match nothing here; use [`matches_with`]
/// during a resolution pass.
pub fn matches(value: &Value, conditions: &[Condition]) -> bool {
    eval(None, value, conditions)
}

/// Evaluate a condition list against a value during resolution, with the
/// element under construction in scope for [`Condition::State`] entries.
pub fn matches_with(element: &Element, value: &Value, conditions: &[Condition]) -> bool {
    eval(Some(element), value, conditions)
}

/// Non-`All` entries are OR-combined; every `All` entry must hold in
/// addition. An empty list (or a list with only `All` entries) matches
/// nothing, since there is no OR-branch to satisfy.
fn eval(element: Option<&Element>, value: &Value, conditions: &[Condition]) -> bool {
    let mut any_branch = false;
    let mut matched = false;
    for condition in conditions {
        if let Condition::All(_) = condition {
            continue;
        }
        any_branch = true;
        if condition.matches_one(element, value) {
            matched = true;
            break;
        }
    }
    if !any_branch || !matched {
        return false;
    }
    conditions.iter().all(|condition| match condition {
        Condition::All(sub) => eval(element, value, sub),
        _ => true,
    })
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A lightweight wildcard pattern: `*` matches any run of characters,
/// `?` matches exactly one. Anchored at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
}

impl Pattern {
    /// Compile a pattern from its source text.
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_owned(),
        }
    }

    /// The original pattern text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `text` satisfies the pattern.
    pub fn matches(&self, text: &str) -> bool {
        let pat: Vec<char> = self.source.chars().collect();
        let txt: Vec<char> = text.chars().collect();

        // Iterative glob match with single-star backtracking.
        let (mut p, mut t) = (0, 0);
        let mut star: Option<(usize, usize)> = None;
        while t < txt.len() {
            if p < pat.len() && (pat[p] == '?' || pat[p] == txt[t]) {
                p += 1;
                t += 1;
            } else if p < pat.len() && pat[p] == '*' {
                star = Some((p, t));
                p += 1;
            } else if let Some((sp, st)) = star {
                p = sp + 1;
                t = st + 1;
                star = Some((sp, st + 1));
            } else {
                return false;
            }
        }
        while p < pat.len() && pat[p] == '*' {
            p += 1;
        }
        p == pat.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
