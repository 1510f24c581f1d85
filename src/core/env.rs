//! Purpose: Describe the host capabilities the device store depends on.
//! Exports: `Environment`, `ServerEnvironment`, `WindowSnapshot`, `FrameId`, `Viewport`.
//! Role: Injected seam so window probing never relies on global symbol checks.
//! Invariants: Implementations without a window report no viewport and no nesting.
//! Invariants: Queries are total and side-effect free.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Identity of a browsing context. Two handles compare equal when they name
/// the same frame.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FrameId(pub u64);

/// Host queries consulted by [`crate::core::device::DeviceStore`].
///
/// `frame_ancestry_differs` is only meaningful when `has_window` is true;
/// callers check the capability first.
pub trait Environment {
    fn has_window(&self) -> bool;
    fn frame_ancestry_differs(&self) -> bool;
    fn viewport(&self) -> Option<Viewport>;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn has_window(&self) -> bool {
        (**self).has_window()
    }

    fn frame_ancestry_differs(&self) -> bool {
        (**self).frame_ancestry_differs()
    }

    fn viewport(&self) -> Option<Viewport> {
        (**self).viewport()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn has_window(&self) -> bool {
        (**self).has_window()
    }

    fn frame_ancestry_differs(&self) -> bool {
        (**self).frame_ancestry_differs()
    }

    fn viewport(&self) -> Option<Viewport> {
        (**self).viewport()
    }
}

/// Server-side evaluation: there is no host window to inspect.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerEnvironment;

impl Environment for ServerEnvironment {
    fn has_window(&self) -> bool {
        false
    }

    fn frame_ancestry_differs(&self) -> bool {
        false
    }

    fn viewport(&self) -> Option<Viewport> {
        None
    }
}

/// A host window described by its size and the identities of its own frame
/// and its top-level ancestor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowSnapshot {
    pub viewport: Viewport,
    pub self_frame: FrameId,
    pub top_frame: FrameId,
}

impl WindowSnapshot {
    pub fn top_level(viewport: Viewport) -> Self {
        Self {
            viewport,
            self_frame: FrameId(0),
            top_frame: FrameId(0),
        }
    }

    pub fn nested(viewport: Viewport) -> Self {
        Self {
            viewport,
            self_frame: FrameId(1),
            top_frame: FrameId(0),
        }
    }
}

impl Environment for WindowSnapshot {
    fn has_window(&self) -> bool {
        true
    }

    fn frame_ancestry_differs(&self) -> bool {
        self.self_frame != self.top_frame
    }

    fn viewport(&self) -> Option<Viewport> {
        Some(self.viewport)
    }
}
