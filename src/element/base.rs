//! Component instances.
//!
//! An [`Element`] is one live component: a tag, html attributes and classes,
//! named content sections, and a lifecycle. Construction runs the initialize
//! phase (input resolution); [`render`](Element::render) runs the capture and
//! render phases and memoizes the result, so rendering twice returns the
//! first output without re-running hooks or the body block.

use std::collections::HashMap;
use std::sync::Arc;

use crate::capture::CaptureList;
use crate::class::hooks::Phase;
use crate::class::metadata::ComponentClass;
use crate::element::compose::{next_container_id, ChildKey, PendingChild};
use crate::render::{Content, RenderContext};
use crate::sections::{apply_place, Anchor, Relation, SectionBuffer};
use crate::value::{OptionsMap, Value};

use slotmap::SlotMap;

/// A body block: runs during the capture phase and yields the instance's
/// main content.
pub type BlockFn = Box<dyn FnMut(&mut Element, &mut dyn RenderContext) -> Content>;

// ---------------------------------------------------------------------------
// ElementInput
// ---------------------------------------------------------------------------

/// Construction input: positional arguments, keyed options, and an optional
/// body block.
#[derive(Default)]
pub struct ElementInput {
    pub(crate) args: Vec<Value>,
    pub(crate) opts: OptionsMap,
    pub(crate) block: Option<BlockFn>,
}

impl ElementInput {
    /// Empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build input from a plain value list; a trailing map becomes the
    /// option map.
    pub fn from_values(mut values: Vec<Value>) -> Self {
        let opts = match values.last() {
            Some(Value::Map(_)) => match values.pop() {
                Some(Value::Map(map)) => map,
                _ => OptionsMap::new(),
            },
            _ => OptionsMap::new(),
        };
        Self {
            args: values,
            opts,
            block: None,
        }
    }

    /// Input from a single option value, as used by option-driven child
    /// creation: a map supplies options, a list supplies positional values
    /// (with a trailing map again as options), anything else is one
    /// positional argument.
    pub(crate) fn from_child_option(value: Value) -> Self {
        match value {
            Value::Map(map) => Self {
                args: Vec::new(),
                opts: map,
                block: None,
            },
            Value::List(items) => Self::from_values(items),
            other => Self {
                args: vec![other],
                opts: OptionsMap::new(),
                block: None,
            },
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set an option.
    pub fn opt(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.opts.insert(key, value);
        self
    }

    /// Merge a whole option map, overwriting existing keys.
    pub fn opts(mut self, opts: OptionsMap) -> Self {
        self.opts.merge(opts);
        self
    }

    /// Attach the body block.
    pub fn block(
        mut self,
        block: impl FnMut(&mut Element, &mut dyn RenderContext) -> Content + 'static,
    ) -> Self {
        self.block = Some(Box::new(block));
        self
    }
}

impl std::fmt::Debug for ElementInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementInput")
            .field("args", &self.args)
            .field("opts", &self.opts)
            .field("block", &self.block.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// One live component instance.
pub struct Element {
    pub(crate) class: Arc<ComponentClass>,
    pub(crate) tag: String,
    pub(crate) helper_name: Option<String>,
    pub(crate) attrs: OptionsMap,
    pub(crate) html_classes: Vec<String>,
    pub(crate) sections: SectionBuffer,
    pub(crate) placement: Vec<String>,
    pub(crate) block: Option<BlockFn>,
    has_block: bool,
    leftover_args: Vec<Value>,
    provided_args: HashMap<String, Vec<Value>>,
    provided_opts: HashMap<String, OptionsMap>,
    cached: Option<Content>,
    pub(crate) deferred: bool,
    pub(crate) mode_frozen: bool,
    pub(crate) extract_children: bool,
    pub(crate) children: SlotMap<ChildKey, PendingChild>,
    pub(crate) container_id: u64,
}

impl Element {
    /// Construct an instance of `class` from the given input. Runs the
    /// initialize phase: hooks bracket tag resolution and input extraction.
    pub fn new(class: Arc<ComponentClass>, ctx: &mut dyn RenderContext, input: ElementInput) -> Self {
        let ElementInput { args, opts, block } = input;
        let mut args = CaptureList::from(args);
        let mut opts = opts;
        let has_block = block.is_some();
        let sections = SectionBuffer::new(class.all_sections());
        let placement = class.placement();
        let deferred = class.deferred_render();

        let mut element = Element {
            class,
            tag: String::new(),
            helper_name: None,
            attrs: OptionsMap::new(),
            html_classes: Vec::new(),
            sections,
            placement,
            block,
            has_block,
            leftover_args: Vec::new(),
            provided_args: HashMap::new(),
            provided_opts: HashMap::new(),
            cached: None,
            deferred,
            mode_frozen: false,
            extract_children: false,
            children: SlotMap::with_key(),
            container_id: next_container_id(),
        };

        element.run_phase(Phase::Initialize, ctx, |el, ctx| {
            let defaults = el.class.default_html_classes();
            for name in defaults {
                el.add_html_class(&name);
            }
            if let Some(value) = opts.remove("class") {
                el.add_classes_from_value(&value);
            }
            el.helper_name = opts.remove("helper_name").map(|v| v.text());
            let tag = opts
                .remove("tag")
                .map(|v| v.text())
                .or_else(|| el.class.default_tag().map(str::to_owned))
                .unwrap_or_else(|| "div".to_owned());
            el.tag = tag;

            crate::args::resolve::resolve(el, ctx, &mut args, &mut opts);

            el.leftover_args = std::mem::take(&mut args).into_inner();
            el.attrs.merge(std::mem::take(&mut opts));
        });
        element
    }

    /// Render the instance: capture phase (body block into `content`,
    /// pending children resolved), section composition, render phase
    /// (outer tag). The result is memoized.
    pub fn render(&mut self, ctx: &mut dyn RenderContext) -> Content {
        if let Some(cached) = &self.cached {
            return cached.clone();
        }

        self.run_phase(Phase::Capture, ctx, |el, ctx| {
            if !el.omit_content() {
                if let Some(mut block) = el.block.take() {
                    let content = ctx.capture(&mut |ctx| block(&mut *el, ctx));
                    el.sections.append("content", &content);
                }
            }
        });

        let mut output = Content::empty();
        self.run_phase(Phase::Render, ctx, |el, ctx| {
            let order = el.placement.clone();
            let inner = el.sections.compose(&order, &[]);
            let attrs = el.final_attrs();
            let tag = el.tag.clone();
            output = ctx.wrap_tag(&tag, &inner, &attrs);
        });

        self.cached = Some(output.clone());
        output
    }

    pub(crate) fn run_phase(
        &mut self,
        phase: Phase,
        ctx: &mut dyn RenderContext,
        body: impl FnOnce(&mut Element, &mut dyn RenderContext),
    ) {
        let before = self.class.collect_before(phase);
        let after = self.class.collect_after(phase);
        for hook in before {
            hook(self, ctx);
        }
        body(self, ctx);
        for hook in after {
            hook(self, ctx);
        }
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// The class this instance was constructed from.
    pub fn class(&self) -> &Arc<ComponentClass> {
        &self.class
    }

    /// The helper name this instance was created through, if any.
    pub fn helper_name(&self) -> Option<&str> {
        self.helper_name.as_deref()
    }

    /// The resolved tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Override the tag. Takes effect if the instance has not rendered yet.
    pub fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_owned();
    }

    /// Whether a body block was supplied at construction.
    pub fn has_block(&self) -> bool {
        self.has_block
    }

    /// Whether this instance skips capturing its body block.
    pub fn omit_content(&self) -> bool {
        self.class.omit_content()
    }

    // -----------------------------------------------------------------------
    // Attributes and html classes
    // -----------------------------------------------------------------------

    /// The plain html attributes (construction options no spec claimed).
    pub fn attrs(&self) -> &OptionsMap {
        &self.attrs
    }

    /// Mutable access to the html attributes.
    pub fn attrs_mut(&mut self) -> &mut OptionsMap {
        &mut self.attrs
    }

    /// The current html class list, in addition order.
    pub fn html_classes(&self) -> &[String] {
        &self.html_classes
    }

    /// Add an html class; duplicates and empty names are ignored.
    pub fn add_html_class(&mut self, name: &str) {
        if !name.is_empty() && !self.html_classes.iter().any(|c| c == name) {
            self.html_classes.push(name.to_owned());
        }
    }

    /// Remove an html class; absent names are ignored.
    pub fn remove_html_class(&mut self, name: &str) {
        self.html_classes.retain(|c| c != name);
    }

    /// Whether the html class list contains `name`.
    pub fn has_html_class(&self, name: &str) -> bool {
        self.html_classes.iter().any(|c| c == name)
    }

    fn add_classes_from_value(&mut self, value: &Value) {
        match value {
            Value::List(items) => {
                for item in items {
                    self.add_classes_from_value(item);
                }
            }
            other => {
                let text = other.text();
                for name in text.split_whitespace() {
                    self.add_html_class(name);
                }
            }
        }
    }

    fn final_attrs(&self) -> OptionsMap {
        let mut attrs = OptionsMap::new();
        if !self.html_classes.is_empty() {
            attrs.insert(
                "class",
                Value::List(
                    self.html_classes
                        .iter()
                        .map(|c| Value::Str(c.clone()))
                        .collect(),
                ),
            );
        }
        attrs.merge(self.attrs.clone());
        attrs.drop_empty();
        attrs
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    /// The content of a section; empty for unknown names.
    pub fn section(&self, name: &str) -> Content {
        self.sections.get(name)
    }

    /// Replace a section's content; ignored for unknown names.
    pub fn set_section(&mut self, name: &str, content: Content) {
        self.sections.set(name, content);
    }

    /// Append to a section's content; ignored for unknown names.
    pub fn append_section(&mut self, name: &str, content: &Content) {
        self.sections.append(name, content);
    }

    /// Move a section within this instance's placement order. The class's
    /// own placement is untouched.
    pub fn place(&mut self, name: &str, relation: Relation, target: Anchor) -> bool {
        apply_place(&mut self.placement, name, relation, &target)
    }

    /// This instance's placement order snapshot.
    pub fn placement(&self) -> &[String] {
        &self.placement
    }

    // -----------------------------------------------------------------------
    // Resolution results
    // -----------------------------------------------------------------------

    /// Positional values no spec claimed, in their original order.
    pub fn leftover_args(&self) -> &[Value] {
        &self.leftover_args
    }

    /// Whether the argument spec `name` captured at least one value.
    pub fn argument_provided(&self, name: &str) -> bool {
        self.provided_args.contains_key(name)
    }

    /// The values captured by the argument spec `name`.
    pub fn provided_arguments(&self, name: &str) -> &[Value] {
        self.provided_args.get(name).map_or(&[], |v| v.as_slice())
    }

    /// Whether the option spec `name` captured at least one key.
    pub fn option_provided(&self, name: &str) -> bool {
        self.provided_opts.contains_key(name)
    }

    /// The key/value pairs captured by the option spec `name`.
    pub fn provided_options(&self, name: &str) -> Option<&OptionsMap> {
        self.provided_opts.get(name)
    }

    /// Whether a spec named `name` (argument or option) captured anything.
    pub fn attribute_provided(&self, name: &str) -> bool {
        self.argument_provided(name) || self.option_provided(name)
    }

    pub(crate) fn record_provided_argument(&mut self, name: &str, values: &[Value]) {
        self.provided_args
            .entry(name.to_owned())
            .or_default()
            .extend_from_slice(values);
    }

    pub(crate) fn record_provided_option(&mut self, name: &str, key: &str, value: Value) {
        self.provided_opts
            .entry(name.to_owned())
            .or_default()
            .insert(key, value);
    }

    // -----------------------------------------------------------------------
    // Container mode
    // -----------------------------------------------------------------------

    /// Whether children render deferred (as markers resolved after capture).
    pub fn deferred(&self) -> bool {
        self.deferred
    }

    /// Switch deferred mode. Ignored once the first child exists; the mode
    /// is frozen for the rest of the instance's life.
    pub fn set_deferred(&mut self, value: bool) {
        if !self.mode_frozen && self.children.is_empty() {
            self.deferred = value;
        }
    }

    /// Route all children into their target sections instead of emitting
    /// them inline.
    pub fn set_extract_children(&mut self, value: bool) {
        self.extract_children = value;
    }

    /// Whether children are routed into sections instead of inline output.
    pub fn extract_children(&self) -> bool {
        self.extract_children
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("class", &self.class.name())
            .field("tag", &self.tag)
            .field("helper_name", &self.helper_name)
            .field("attrs", &self.attrs)
            .field("html_classes", &self.html_classes)
            .field("deferred", &self.deferred)
            .field("pending_children", &self.children.len())
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
