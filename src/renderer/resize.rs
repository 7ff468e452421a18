//! Resize / resource-lifecycle state machine.
//!
//! ```text
//!              same size                 fits allocation             exceeds allocation
//!  Resize ──▶ Stable (no-op)   or   ──▶ Fast (uniform + binding   or ──▶ Slow (idle wait +
//!                                         rewrites only)                   recreate targets)
//! ```
//!
//! Allocations only grow while fast resizing is enabled. With fast resizing
//! disabled every change is a slow resize to exactly the requested size.

use crate::renderer::core::Extent2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeKind {
    /// Nothing changed.
    Stable,
    /// The new size fits the current allocation.
    Fast,
    /// Targets must be recreated at `allocation`.
    Slow { allocation: Extent2D },
}

/// Tracks the allocated and rendered extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeController {
    allocated: Extent2D,
    render: Extent2D,
    fast_resize: bool,
}

impl ResizeController {
    #[must_use]
    pub fn new(initial: Extent2D, fast_resize: bool) -> Self {
        Self {
            allocated: initial,
            render: initial,
            fast_resize,
        }
    }

    /// Size of the allocated targets.
    #[inline]
    #[must_use]
    pub fn allocated(&self) -> Extent2D {
        self.allocated
    }

    /// Size rendered each frame, never larger than [`allocated`](Self::allocated).
    #[inline]
    #[must_use]
    pub fn render(&self) -> Extent2D {
        self.render
    }

    /// Classifies a resize request without applying it.
    #[must_use]
    pub fn plan(&self, requested: Extent2D) -> ResizeKind {
        if requested == self.render {
            ResizeKind::Stable
        } else if self.fast_resize && requested.fits_within(self.allocated) {
            ResizeKind::Fast
        } else if self.fast_resize {
            ResizeKind::Slow {
                allocation: self.allocated.max(requested),
            }
        } else {
            ResizeKind::Slow {
                allocation: requested,
            }
        }
    }

    /// Plans and applies a resize request.
    pub fn apply(&mut self, requested: Extent2D) -> ResizeKind {
        let kind = self.plan(requested);
        match kind {
            ResizeKind::Stable => {}
            ResizeKind::Fast => self.render = requested,
            ResizeKind::Slow { allocation } => {
                self.allocated = allocation;
                self.render = requested;
            }
        }
        kind
    }
}
