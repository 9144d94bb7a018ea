//! The class-declaration surface.
//!
//! `ClassBuilder` is where component authors declare everything a class
//! knows: argument and option specs, setters, lifecycle hooks, sections and
//! placement, the default tag, and child helpers. Declarations accumulate on
//! the builder and freeze into an immutable [`ComponentClass`] at
//! [`build`](ClassBuilder::build). The first invalid declaration is
//! remembered and reported from `build`, so the chainable style stays intact.

use std::collections::HashMap;
use std::sync::Arc;

use crate::args::spec::{
    name_condition, ArgumentSpec, OptionSpec, SetterFn, SpecCallback, SpecFlags,
};
use crate::class::hooks::{Hook, Phase, PhaseHooks};
use crate::class::metadata::{ChildDecl, ComponentClass};
use crate::condition::Condition;
use crate::element::Element;
use crate::error::DeclarationError;
use crate::render::{Content, RenderContext};
use crate::sections::{apply_place, is_sentinel, Anchor, Relation};
use crate::value::{is_identifier, Kind, OptionsMap, Value};

/// Builder for a [`ComponentClass`].
///
/// # Examples
///
/// ```ignore
/// use tagsmith::class::ComponentClass;
/// use tagsmith::condition::Condition;
///
/// let base = ComponentClass::base();
/// let button = ComponentClass::derive("button", &base)
///     .default_tag("button")
///     .option("size", vec![])
///     .setter("size", |el, value| {
///         el.add_html_class(&format!("btn-{}", value.text()));
///     })
///     .build()
///     .unwrap();
/// ```
pub struct ClassBuilder {
    name: String,
    parent: Option<Arc<ComponentClass>>,
    error: Option<DeclarationError>,
    arguments: Vec<ArgumentSpec>,
    options: Vec<OptionSpec>,
    setters: HashMap<String, SetterFn>,
    hooks: HashMap<Phase, PhaseHooks>,
    sections: Vec<String>,
    placement: Vec<String>,
    placement_touched: bool,
    default_tag: Option<String>,
    omit_content: Option<bool>,
    html_classes: Vec<String>,
    children: Vec<ChildDecl>,
    deferred_render: Option<bool>,
}

impl ComponentClass {
    /// Start declaring a subclass of `parent`.
    pub fn derive(name: &str, parent: &Arc<ComponentClass>) -> ClassBuilder {
        ClassBuilder::new(name, Some(Arc::clone(parent)))
    }
}

impl ClassBuilder {
    /// Start declaring a root class (one without a parent; the ancestor walk
    /// of every subclass terminates here).
    pub fn root(name: &str) -> Self {
        Self::new(name, None)
    }

    fn new(name: &str, parent: Option<Arc<ComponentClass>>) -> Self {
        let placement = parent
            .as_ref()
            .map(|p| p.placement())
            .unwrap_or_default();
        Self {
            name: name.to_owned(),
            parent,
            error: None,
            arguments: Vec::new(),
            options: Vec::new(),
            setters: HashMap::new(),
            hooks: HashMap::new(),
            sections: Vec::new(),
            placement,
            placement_touched: false,
            default_tag: None,
            omit_content: None,
            html_classes: Vec::new(),
            children: Vec::new(),
            deferred_render: None,
        }
    }

    fn fail(&mut self, error: DeclarationError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    // -----------------------------------------------------------------------
    // Attribute specs
    // -----------------------------------------------------------------------

    /// Declare a positional-value spec dispatching to the setter registered
    /// under `name`. Empty `conditions` default to matching the name itself
    /// as a symbol. Re-declaring a name on the same class overwrites the
    /// earlier spec.
    pub fn argument(self, name: &str, conditions: Vec<Condition>, flags: SpecFlags) -> Self {
        self.push_argument(name, conditions, flags, None)
    }

    /// Declare a positional-value spec with an inline callback.
    pub fn argument_with(
        self,
        name: &str,
        conditions: Vec<Condition>,
        flags: SpecFlags,
        callback: impl Fn(&mut Element, &mut dyn RenderContext, &str, Value) + Send + Sync + 'static,
    ) -> Self {
        self.push_argument(name, conditions, flags, Some(Arc::new(callback)))
    }

    fn push_argument(
        mut self,
        name: &str,
        conditions: Vec<Condition>,
        flags: SpecFlags,
        callback: Option<SpecCallback>,
    ) -> Self {
        if !is_identifier(name) {
            self.fail(DeclarationError::InvalidSpecName {
                name: name.to_owned(),
            });
            return self;
        }
        let spec = ArgumentSpec {
            name: name.to_owned(),
            conditions: if conditions.is_empty() {
                name_condition(name)
            } else {
                conditions
            },
            callback,
            flags,
        };
        if let Some(slot) = self.arguments.iter_mut().find(|s| s.name == name) {
            *slot = spec;
        } else {
            self.arguments.push(spec);
        }
        self
    }

    /// Declare a keyed-value spec; conditions match option keys. Empty
    /// `conditions` default to key-equality with `name`.
    pub fn option(self, name: &str, conditions: Vec<Condition>) -> Self {
        self.push_option(name, conditions, None)
    }

    /// Declare a keyed-value spec with an inline callback.
    pub fn option_with(
        self,
        name: &str,
        conditions: Vec<Condition>,
        callback: impl Fn(&mut Element, &mut dyn RenderContext, &str, Value) + Send + Sync + 'static,
    ) -> Self {
        self.push_option(name, conditions, Some(Arc::new(callback)))
    }

    fn push_option(
        mut self,
        name: &str,
        conditions: Vec<Condition>,
        callback: Option<SpecCallback>,
    ) -> Self {
        if !is_identifier(name) {
            self.fail(DeclarationError::InvalidSpecName {
                name: name.to_owned(),
            });
            return self;
        }
        let spec = OptionSpec {
            name: name.to_owned(),
            conditions: if conditions.is_empty() {
                name_condition(name)
            } else {
                conditions
            },
            callback,
        };
        if let Some(slot) = self.options.iter_mut().find(|s| s.name == name) {
            *slot = spec;
        } else {
            self.options.push(spec);
        }
        self
    }

    /// Register the setter invoked for specs named `name` that carry no
    /// inline callback.
    pub fn setter(
        mut self,
        name: &str,
        setter: impl Fn(&mut Element, Value) + Send + Sync + 'static,
    ) -> Self {
        if !is_identifier(name) {
            self.fail(DeclarationError::InvalidSpecName {
                name: name.to_owned(),
            });
            return self;
        }
        self.setters.insert(name.to_owned(), Arc::new(setter));
        self
    }

    // -----------------------------------------------------------------------
    // Hooks
    // -----------------------------------------------------------------------

    /// Register a hook running before `phase`. Root classes prepend their own
    /// registrations so root hooks are outermost.
    pub fn before(
        mut self,
        phase: Phase,
        hook: impl Fn(&mut Element, &mut dyn RenderContext) + Send + Sync + 'static,
    ) -> Self {
        let list = &mut self.hooks.entry(phase).or_default().before;
        if self.parent.is_none() {
            list.insert(0, Arc::new(hook));
        } else {
            list.push(Arc::new(hook));
        }
        self
    }

    /// Register a hook running after `phase`. Runs in the reverse of the
    /// before-hook order.
    pub fn after(
        mut self,
        phase: Phase,
        hook: impl Fn(&mut Element, &mut dyn RenderContext) + Send + Sync + 'static,
    ) -> Self {
        let list = &mut self.hooks.entry(phase).or_default().after;
        if self.parent.is_none() {
            list.insert(0, Arc::new(hook));
        } else {
            list.push(Arc::new(hook));
        }
        self
    }

    // -----------------------------------------------------------------------
    // Sections and placement
    // -----------------------------------------------------------------------

    /// Declare content sections on this class. Duplicates (anywhere in the
    /// lineage) and the sentinel spellings are ignored; each new section is
    /// inserted just before the end of this class's placement order.
    pub fn section(mut self, names: &[&str]) -> Self {
        for &name in names {
            if is_sentinel(name) {
                continue;
            }
            if !is_identifier(name) {
                self.fail(DeclarationError::InvalidSectionName {
                    name: name.to_owned(),
                });
                return self;
            }
            if self.known_section(name) {
                continue;
            }
            self.sections.push(name.to_owned());
            if !self.placement.iter().any(|s| s == name) {
                self.placement.push(name.to_owned());
            }
            self.placement_touched = true;
        }
        self
    }

    fn known_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s == name)
            || self
                .parent
                .as_ref()
                .is_some_and(|p| p.all_sections().iter().any(|s| s == name))
    }

    /// Move `name` relative to `target` in this class's placement order.
    /// Unknown names or targets are a no-op.
    pub fn place(mut self, name: &str, relation: Relation, target: Anchor) -> Self {
        if apply_place(&mut self.placement, name, relation, &target) {
            self.placement_touched = true;
        }
        self
    }

    // -----------------------------------------------------------------------
    // Class flags
    // -----------------------------------------------------------------------

    /// The tag used when construction input supplies none.
    pub fn default_tag(mut self, name: &str) -> Self {
        let valid = !name.is_empty()
            && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            self.fail(DeclarationError::InvalidTagName {
                name: name.to_owned(),
            });
            return self;
        }
        self.default_tag = Some(name.to_owned());
        self
    }

    /// Skip capturing the body block on instances of this class.
    pub fn omit_content(mut self) -> Self {
        self.omit_content = Some(true);
        self
    }

    /// Html classes automatically added to every instance.
    pub fn html_class(mut self, classes: &[&str]) -> Self {
        for &class in classes {
            if !class.is_empty() && !self.html_classes.iter().any(|c| c == class) {
                self.html_classes.push(class.to_owned());
            }
        }
        self
    }

    /// Start container instances of this class in deferred-render mode.
    pub fn deferred_render(mut self) -> Self {
        self.deferred_render = Some(true);
        self
    }

    // -----------------------------------------------------------------------
    // Text containers
    // -----------------------------------------------------------------------

    /// Make this a text-contained class: a `body` section placed before
    /// `content`, filled from a `body`/`text` option or from the first
    /// unclaimed string argument. A supplied block takes priority: while one
    /// is present, string arguments stay unclaimed.
    pub fn text_container(self) -> Self {
        self.text_container_with(true)
    }

    /// [`text_container`](Self::text_container) with an explicit block
    /// priority: pass `false` to capture string arguments even when a block
    /// is given (the block's output then follows the body text).
    pub fn text_container_with(mut self, text_in_block: bool) -> Self {
        // Soft tag default: keep any tag already declared on this class or
        // an ancestor.
        if self.default_tag.is_none()
            && !self
                .parent
                .as_ref()
                .is_some_and(|p| p.default_tag().is_some())
        {
            self.default_tag = Some("p".to_owned());
        }
        self = self.option_with(
            "body",
            vec![Condition::OneOf(vec![
                Value::Symbol("body".to_owned()),
                Value::Symbol("text".to_owned()),
            ])],
            |el: &mut Element, _ctx: &mut dyn RenderContext, _name: &str, value: Value| {
                let text = Content::from_text(value.text(), true);
                el.append_section("body", &text);
            },
        );
        self = self.argument_with(
            "body",
            vec![
                Condition::OfKind(Kind::Str),
                Condition::All(vec![Condition::state(move |el, _value| {
                    !el.has_block() || !text_in_block
                })]),
            ],
            SpecFlags::FIRST_ONLY | SpecFlags::AFTER_OPTIONS,
            |el: &mut Element, _ctx: &mut dyn RenderContext, _name: &str, value: Value| {
                let text = Content::from_text(value.text(), true);
                el.append_section("body", &text);
            },
        );
        self.section(&["body"])
            .place("body", Relation::Before, Anchor::section("content"))
    }

    // -----------------------------------------------------------------------
    // Child helpers
    // -----------------------------------------------------------------------

    /// Declare a child helper: `name` bound to the `class` factory, with the
    /// defaults described by `spec`. When `spec` binds an option, creating
    /// the component with that option turns deferred mode on and builds the
    /// child from the option's value.
    pub fn child(mut self, name: &str, class: &Arc<ComponentClass>, spec: ChildSpec) -> Self {
        if !is_identifier(name) {
            self.fail(DeclarationError::InvalidChildName {
                name: name.to_owned(),
            });
            return self;
        }
        let option = spec.option.map(|opt| match opt {
            ChildOption::Named(n) => n,
            ChildOption::SameName => name.to_owned(),
        });
        let decl = ChildDecl {
            name: name.to_owned(),
            class: Arc::clone(class),
            default_args: spec.default_args,
            default_opts: spec.default_opts,
            section: spec.section.unwrap_or_else(|| "children".to_owned()),
            option: option.clone(),
        };
        self.children.push(decl);

        if let Some(opt_name) = option {
            let helper = name.to_owned();
            self = self.push_option(
                &opt_name,
                Vec::new(),
                Some(Arc::new(
                    move |el: &mut Element, ctx: &mut dyn RenderContext, _key: &str, value: Value| {
                        el.set_deferred(true);
                        el.call_child_from_option(&helper, value, ctx);
                    },
                )),
            );
        }
        self
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Freeze the declarations into an immutable class handle.
    pub fn build(mut self) -> Result<Arc<ComponentClass>, DeclarationError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if !self.children.is_empty() {
            // Container classes always carry a `children` section and the
            // pending-child composer that runs once capture has finished.
            self = self.section(&["children"]);
            if let Some(error) = self.error.take() {
                return Err(error);
            }
            let lineage_has_composer = self
                .parent
                .as_ref()
                .is_some_and(|p| p.lineage().any(|c| !c.children.is_empty()));
            if !lineage_has_composer {
                let composer: Hook =
                    Arc::new(|el: &mut Element, ctx: &mut dyn RenderContext| {
                        el.resolve_pending_children(ctx);
                    });
                self.hooks
                    .entry(Phase::Capture)
                    .or_default()
                    .after
                    .push(composer);
            }
        }
        Ok(Arc::new(ComponentClass {
            name: self.name,
            parent: self.parent,
            arguments: self.arguments,
            options: self.options,
            setters: self.setters,
            hooks: self.hooks,
            sections: self.sections,
            placement: self.placement_touched.then_some(self.placement),
            default_tag: self.default_tag,
            omit_content: self.omit_content,
            html_classes: self.html_classes,
            children: self.children,
            deferred_render: self.deferred_render,
        }))
    }
}

// ---------------------------------------------------------------------------
// ChildSpec
// ---------------------------------------------------------------------------

enum ChildOption {
    SameName,
    Named(String),
}

/// Defaults and bindings for a child helper declaration.
pub struct ChildSpec {
    default_args: Vec<Value>,
    default_opts: OptionsMap,
    section: Option<String>,
    option: Option<ChildOption>,
}

impl ChildSpec {
    /// An empty child spec: no defaults, target section `children`.
    pub fn new() -> Self {
        Self {
            default_args: Vec::new(),
            default_opts: OptionsMap::new(),
            section: None,
            option: None,
        }
    }

    /// Add a default positional argument passed to every child.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.default_args.push(value.into());
        self
    }

    /// Add a default option passed to every child. Declared defaults win
    /// over caller-supplied options.
    pub fn opt(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.default_opts.insert(key, value);
        self
    }

    /// The section children render into (default `children`).
    pub fn section(mut self, name: &str) -> Self {
        self.section = Some(name.to_owned());
        self
    }

    /// Also create children from a construction option with the helper's
    /// own name.
    pub fn bind_option(mut self) -> Self {
        self.option = Some(ChildOption::SameName);
        self
    }

    /// Also create children from a construction option named `name`.
    pub fn bind_option_as(mut self, name: &str) -> Self {
        self.option = Some(ChildOption::Named(name.to_owned()));
        self
    }
}

impl Default for ChildSpec {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
