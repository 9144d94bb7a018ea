//! Component instances and the deferred-child composer.

pub mod base;
pub mod compose;

pub use base::{BlockFn, Element, ElementInput};
pub use compose::ChildKey;
