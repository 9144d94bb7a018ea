//! Per-class metadata and the derived-lookup machinery.
//!
//! Rust has no inheritance, so a "component class" here is an immutable
//! metadata object built once by [`ClassBuilder`](super::ClassBuilder) and
//! shared behind an `Arc`. Derivation is an explicit parent link; the
//! ancestor walk is the [`lineage`](ComponentClass::lineage) iterator, which
//! starts at the class itself and ends at the root (a class without a
//! parent) — it can never run past it.
//!
//! Two lookup flavors implement the "subclasses extend, don't replace"
//! contract:
//!
//! - [`get_derived`](ComponentClass::get_derived): first value found walking
//!   self → root (single-value semantics, e.g. the default tag).
//! - [`collect_derived`](ComponentClass::collect_derived): every class's own
//!   values merged with **root values first** (e.g. sections, hooks, default
//!   html classes). The returned collection is freshly cloned; mutating it
//!   never touches stored metadata.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::args::spec::{ArgumentSpec, OptionSpec, SetterFn};
use crate::class::hooks::{Hook, Phase, PhaseHooks};
use crate::value::{OptionsMap, Value};

/// Immutable, `Arc`-shared metadata describing one component class.
///
/// Built by [`ClassBuilder`](super::ClassBuilder); read-only afterwards, so
/// instantiating many components from already-defined classes is safe across
/// threads without locking.
pub struct ComponentClass {
    pub(crate) name: String,
    pub(crate) parent: Option<Arc<ComponentClass>>,
    pub(crate) arguments: Vec<ArgumentSpec>,
    pub(crate) options: Vec<OptionSpec>,
    pub(crate) setters: HashMap<String, SetterFn>,
    pub(crate) hooks: HashMap<Phase, PhaseHooks>,
    pub(crate) sections: Vec<String>,
    pub(crate) placement: Option<Vec<String>>,
    pub(crate) default_tag: Option<String>,
    pub(crate) omit_content: Option<bool>,
    pub(crate) html_classes: Vec<String>,
    pub(crate) children: Vec<ChildDecl>,
    pub(crate) deferred_render: Option<bool>,
}

impl ComponentClass {
    /// The fixed root class: declares the `content` section and nothing else.
    pub fn base() -> Arc<Self> {
        super::ClassBuilder::root("base")
            .section(&["content"])
            .build()
            .expect("base class declarations are valid")
    }

    /// This class's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent class, if this is not a root.
    pub fn parent(&self) -> Option<&Arc<ComponentClass>> {
        self.parent.as_ref()
    }

    /// Walk from this class up to (and including) the root.
    pub fn lineage(&self) -> impl Iterator<Item = &ComponentClass> {
        std::iter::successors(Some(self), |class| class.parent.as_deref())
    }

    /// The lineage as shared handles, derived → root.
    pub(crate) fn lineage_arcs(self: &Arc<Self>) -> Vec<Arc<ComponentClass>> {
        std::iter::successors(Some(Arc::clone(self)), |class| class.parent.clone()).collect()
    }

    /// First value `accessor` yields walking self → root.
    pub fn get_derived<'a, T: ?Sized>(
        &'a self,
        accessor: impl Fn(&'a ComponentClass) -> Option<&'a T>,
    ) -> Option<&'a T> {
        self.lineage().find_map(accessor)
    }

    /// Every class's own values merged root-first into one collection.
    pub fn collect_derived<'a, T: Clone + 'a>(
        &'a self,
        accessor: impl Fn(&'a ComponentClass) -> &'a [T],
    ) -> Vec<T> {
        let mut per_class: Vec<&[T]> = self.lineage().map(accessor).collect();
        per_class.reverse();
        per_class.into_iter().flatten().cloned().collect()
    }

    /// The derived default tag, if any class in the lineage declared one.
    pub fn default_tag(&self) -> Option<&str> {
        self.get_derived(|class| class.default_tag.as_deref())
    }

    /// Whether instances skip capturing their body block.
    pub fn omit_content(&self) -> bool {
        self.get_derived(|class| class.omit_content.as_ref())
            .copied()
            .unwrap_or(false)
    }

    /// Whether containers of this class start out in deferred mode.
    pub fn deferred_render(&self) -> bool {
        self.get_derived(|class| class.deferred_render.as_ref())
            .copied()
            .unwrap_or(false)
    }

    /// All declared section names, root-first, in declaration order.
    pub fn all_sections(&self) -> Vec<String> {
        self.collect_derived(|class| class.sections.as_slice())
    }

    /// The effective placement order: this class's own if it declared
    /// sections or placements, else a clone of the nearest ancestor's.
    pub fn placement(&self) -> Vec<String> {
        self.get_derived(|class| class.placement.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    /// The derived default html classes, root-first.
    pub fn default_html_classes(&self) -> Vec<String> {
        self.collect_derived(|class| class.html_classes.as_slice())
    }

    /// The setter registered under `name`, nearest class first.
    pub(crate) fn find_setter(&self, name: &str) -> Option<SetterFn> {
        self.lineage()
            .find_map(|class| class.setters.get(name))
            .cloned()
    }

    /// The child helper declared under `name`, nearest class first.
    pub(crate) fn find_child(&self, name: &str) -> Option<ChildDecl> {
        self.lineage()
            .find_map(|class| class.children.iter().find(|child| child.name == name))
            .cloned()
    }

    /// All "before" hooks for `phase`, in root→derived execution order.
    pub(crate) fn collect_before(&self, phase: Phase) -> Vec<Hook> {
        let mut per_class: Vec<&[Hook]> = self
            .lineage()
            .map(|class| {
                class
                    .hooks
                    .get(&phase)
                    .map(|hooks| hooks.before.as_slice())
                    .unwrap_or(&[])
            })
            .collect();
        per_class.reverse();
        per_class.into_iter().flatten().cloned().collect()
    }

    /// All "after" hooks for `phase`, in the reverse of before-hook order:
    /// derived→root, each class's own registrations reversed.
    pub(crate) fn collect_after(&self, phase: Phase) -> Vec<Hook> {
        self.lineage()
            .flat_map(|class| {
                class
                    .hooks
                    .get(&phase)
                    .map(|hooks| hooks.after.as_slice())
                    .unwrap_or(&[])
                    .iter()
                    .rev()
                    .cloned()
            })
            .collect()
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("arguments", &self.arguments)
            .field("options", &self.options)
            .field("sections", &self.sections)
            .field("placement", &self.placement)
            .field("default_tag", &self.default_tag)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ChildDecl
// ---------------------------------------------------------------------------

/// A declared child helper: a name bound to a first-class component-class
/// factory plus defaults for every child created through it.
#[derive(Clone)]
pub struct ChildDecl {
    pub(crate) name: String,
    pub(crate) class: Arc<ComponentClass>,
    pub(crate) default_args: Vec<Value>,
    pub(crate) default_opts: OptionsMap,
    pub(crate) section: String,
    pub(crate) option: Option<String>,
}

impl ChildDecl {
    /// The helper's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class children of this helper are constructed from.
    pub fn class(&self) -> &Arc<ComponentClass> {
        &self.class
    }

    /// The section the helper's children render into.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Default positional arguments passed to every child.
    pub fn default_args(&self) -> &[Value] {
        &self.default_args
    }

    /// Default options passed to every child.
    pub fn default_opts(&self) -> &OptionsMap {
        &self.default_opts
    }
}

impl fmt::Debug for ChildDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildDecl")
            .field("name", &self.name)
            .field("class", &self.class.name())
            .field("section", &self.section)
            .field("option", &self.option)
            .finish_non_exhaustive()
    }
}
