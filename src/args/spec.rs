//! Attribute spec declarations.
//!
//! A spec is a declared rule for recognizing and consuming part of a
//! component's construction input: argument specs match positional values,
//! option specs match option-map *keys*. Each spec dispatches its captures to
//! an inline callback or, failing that, to the setter registered under the
//! spec's name.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::condition::Condition;
use crate::element::Element;
use crate::render::RenderContext;
use crate::value::Value;

bitflags! {
    /// Behavior flags for argument specs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SpecFlags: u8 {
        /// Stop after the first matching positional value.
        const FIRST_ONLY = 1 << 0;
        /// Resolve this spec after the option specs of the same class,
        /// so its conditions can depend on option-derived state.
        const AFTER_OPTIONS = 1 << 1;
    }
}

/// An inline callback invoked for every captured value.
///
/// Receives the element under construction, the rendering context, the
/// spec/option name, and the captured value.
pub type SpecCallback =
    Arc<dyn Fn(&mut Element, &mut dyn RenderContext, &str, Value) + Send + Sync>;

/// A named setter invoked when a spec has no inline callback.
pub type SetterFn = Arc<dyn Fn(&mut Element, Value) + Send + Sync>;

/// A declared positional-value spec.
#[derive(Clone)]
pub struct ArgumentSpec {
    pub(crate) name: String,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) callback: Option<SpecCallback>,
    pub(crate) flags: SpecFlags,
}

impl ArgumentSpec {
    /// The spec's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The spec's behavior flags.
    pub fn flags(&self) -> SpecFlags {
        self.flags
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("name", &self.name)
            .field("conditions", &self.conditions)
            .field("callback", &self.callback.is_some())
            .field("flags", &self.flags)
            .finish()
    }
}

/// A declared keyed-value spec; conditions apply to option keys.
#[derive(Clone)]
pub struct OptionSpec {
    pub(crate) name: String,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) callback: Option<SpecCallback>,
}

impl OptionSpec {
    /// The spec's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &self.name)
            .field("conditions", &self.conditions)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// The default condition when a spec declares none: the spec's own name, as
/// a symbol, by equality.
pub(crate) fn name_condition(name: &str) -> Vec<Condition> {
    vec![Condition::symbol(name)]
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_compose() {
        let flags = SpecFlags::FIRST_ONLY | SpecFlags::AFTER_OPTIONS;
        assert!(flags.contains(SpecFlags::FIRST_ONLY));
        assert!(flags.contains(SpecFlags::AFTER_OPTIONS));
        assert!(!SpecFlags::default().contains(SpecFlags::FIRST_ONLY));
    }

    #[test]
    fn default_condition_is_name_symbol() {
        use crate::condition::matches;
        use crate::value::{sym, Value};

        let conds = name_condition("disabled");
        assert!(matches(&sym("disabled"), &conds));
        assert!(!matches(&Value::from("disabled"), &conds));
    }
}
