//! # tagsmith
//!
//! A declarative, inheritance-aware engine for tree-shaped HTML components.
//!
//! tagsmith separates *what a component is* from *how it is built*: a
//! [`ComponentClass`](class::ComponentClass) is an immutable bundle of
//! declarations (argument and option specs, lifecycle hooks, sections,
//! child helpers) assembled once through a builder, and an
//! [`Element`](element::Element) is one live instance constructed from
//! dynamic input. Classes derive from one another, and lookups walk the
//! lineage so subclasses extend rather than replace what their ancestors
//! declared. All markup flows through a host-supplied
//! [`RenderContext`](render::RenderContext); the engine never escapes or
//! serializes html on its own.
//!
//! ## Core Systems
//!
//! - **[`value`]** — Dynamic construction values and the ordered options map
//! - **[`condition`]** — The predicate language specs match input with
//! - **[`capture`]** — Condition-driven extraction from value sequences
//! - **[`args`]** — Attribute specs and the per-class resolution pass
//! - **[`class`]** — Class metadata, the declaration builder, hook chains
//! - **[`sections`]** — Named content sections and placement order
//! - **[`element`]** — Component instances and deferred child composition
//! - **[`helpers`]** — The helper registry template layers call into
//! - **[`render`]** — The `RenderContext` boundary and `Content` values
//! - **[`testing`]** — A standalone html context for headless assertions

pub mod args;
pub mod capture;
pub mod class;
pub mod condition;
pub mod element;
pub mod error;
pub mod helpers;
pub mod render;
pub mod sections;
pub mod testing;
pub mod value;

pub use class::{ChildSpec, ClassBuilder, ComponentClass, Phase};
pub use condition::Condition;
pub use element::{Element, ElementInput};
pub use error::DeclarationError;
pub use helpers::HelperRegistry;
pub use render::{Content, RenderContext};
pub use value::{sym, OptionsMap, Value};
