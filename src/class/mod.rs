//! Component classes: immutable metadata, the declaration builder, and
//! lifecycle hook chains.

pub mod builder;
pub mod hooks;
pub mod metadata;

pub use builder::{ChildSpec, ClassBuilder};
pub use hooks::{Hook, Phase};
pub use metadata::{ChildDecl, ComponentClass};
