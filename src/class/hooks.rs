//! Lifecycle hook chains.
//!
//! Every component lifecycle phase is bracketed by an ordered hook chain:
//! all "before" hooks run in root→derived class order, then the phase body,
//! then all "after" hooks in the exact reverse order (derived→root, each
//! class's own registrations reversed). The root class prepends its own
//! registrations while descendants append, so root hooks are always the
//! outermost bracket. Hook return values are ignored — hooks mutate instance
//! state but never short-circuit the phase.

use std::sync::Arc;

use crate::element::Element;
use crate::render::RenderContext;

/// The lifecycle phases a component instance moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Construction: options normalized, tag resolved, attributes captured.
    Initialize,
    /// Content capture: the body block runs, sections are filled.
    Capture,
    /// Final assembly: sections composed and wrapped into the outer tag.
    Render,
}

/// A registered hook. Hooks may mutate the element and use the rendering
/// context; their output is discarded.
pub type Hook = Arc<dyn Fn(&mut Element, &mut dyn RenderContext) + Send + Sync>;

/// One class's own before/after registrations for a single phase.
#[derive(Clone, Default)]
pub(crate) struct PhaseHooks {
    pub(crate) before: Vec<Hook>,
    pub(crate) after: Vec<Hook>,
}

impl std::fmt::Debug for PhaseHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseHooks")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}
