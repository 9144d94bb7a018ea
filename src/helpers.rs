//! The helper registry: named entry points a template layer exposes.
//!
//! A registry maps helper names to component-class factories. Calling a
//! helper constructs an instance of the bound class (with the helper's name
//! recorded on it) and renders it through the supplied context. Registration
//! is explicit and fails loudly on collisions; unregistering an unknown name
//! is a quiet no-op so teardown code can stay unconditional.

use std::collections::HashMap;
use std::sync::Arc;

use crate::class::ComponentClass;
use crate::element::{Element, ElementInput};
use crate::error::DeclarationError;
use crate::render::{Content, RenderContext};
use crate::value::{is_identifier, Value};

/// A name → component-class mapping.
#[derive(Debug, Default)]
pub struct HelperRegistry {
    helpers: HashMap<String, Arc<ComponentClass>>,
}

impl HelperRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class` under `name`.
    pub fn register(
        &mut self,
        name: &str,
        class: &Arc<ComponentClass>,
    ) -> Result<(), DeclarationError> {
        if !is_identifier(name) {
            return Err(DeclarationError::InvalidHelperName {
                name: name.to_owned(),
            });
        }
        if self.helpers.contains_key(name) {
            return Err(DeclarationError::HelperExists {
                name: name.to_owned(),
            });
        }
        self.helpers.insert(name.to_owned(), Arc::clone(class));
        Ok(())
    }

    /// Register `class` under `prefix_name`, the usual spelling for helper
    /// families like `nav_bar` and `nav_item`.
    pub fn register_prefixed(
        &mut self,
        prefix: &str,
        name: &str,
        class: &Arc<ComponentClass>,
    ) -> Result<(), DeclarationError> {
        self.register(&format!("{prefix}_{name}"), class)
    }

    /// Remove a helper; returns whether it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.helpers.remove(name).is_some()
    }

    /// Remove a prefixed helper; returns whether it was registered.
    pub fn unregister_prefixed(&mut self, prefix: &str, name: &str) -> bool {
        self.unregister(&format!("{prefix}_{name}"))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// The registered helper names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(String::as_str)
    }

    /// The class registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<ComponentClass>> {
        self.helpers.get(name)
    }

    /// Construct an instance through the helper `name` without rendering it.
    /// `None` for unknown names.
    pub fn build(
        &self,
        name: &str,
        ctx: &mut dyn RenderContext,
        input: ElementInput,
    ) -> Option<Element> {
        let class = self.helpers.get(name)?;
        let input = input.opt("helper_name", Value::Str(name.to_owned()));
        Some(Element::new(Arc::clone(class), ctx, input))
    }

    /// Construct and render an instance through the helper `name`. `None`
    /// for unknown names.
    pub fn call(
        &self,
        name: &str,
        ctx: &mut dyn RenderContext,
        input: ElementInput,
    ) -> Option<Content> {
        let mut element = self.build(name, ctx, input)?;
        Some(element.render(ctx))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
