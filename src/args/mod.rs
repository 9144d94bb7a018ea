//! Construction-input resolution: attribute specs and the per-class
//! extraction pass that dispatches captured values to callbacks and setters.

pub(crate) mod resolve;
pub mod spec;

pub use spec::{ArgumentSpec, OptionSpec, SetterFn, SpecCallback, SpecFlags};
