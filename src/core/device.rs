//! Purpose: Hold viewport size and embedded-context state for one application instance.
//! Exports: `DeviceStore`, `DeviceChange`, `DeviceSnapshot`, `SubscriptionId`.
//! Role: Observable state container consumed by UI code; owned and passed explicitly.
//! Invariants: `is_embedded` is derived from (override flag, environment) only.
//! Invariants: Without a host window `is_embedded` is false, override included.
//! Invariants: Listeners hear about a change only when the observed value differs.
//! Notes: Single-owner state; the embedded flag is cached in a `Cell` so reads stay `&self`.

use std::cell::Cell;
use std::fmt;

use serde::Serialize;

use super::env::{Environment, Viewport};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeviceChange {
    Resized(Viewport),
    Embedded(bool),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SubscriptionId(u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub width: u32,
    pub height: u32,
    pub is_embedded: bool,
    pub forced_embedded: bool,
}

type Listener = Box<dyn FnMut(&DeviceChange)>;

pub struct DeviceStore<E> {
    env: E,
    viewport: Viewport,
    forced_embedded: bool,
    embedded: Cell<Option<bool>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<E: Environment> DeviceStore<E> {
    pub fn new(env: E) -> Self {
        let viewport = env.viewport().unwrap_or_default();
        Self {
            env,
            viewport,
            forced_embedded: false,
            embedded: Cell::new(None),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn forced_embedded(&self) -> bool {
        self.forced_embedded
    }

    /// Whether the application runs inside a foreign parent frame, or has
    /// been forced to behave as if it does. Computed on first read and
    /// cached until a dependency changes.
    pub fn is_embedded(&self) -> bool {
        if let Some(cached) = self.embedded.get() {
            return cached;
        }
        let value = evaluate_embedded(&self.env, self.forced_embedded);
        self.embedded.set(Some(value));
        value
    }

    pub fn set_forced_embedded(&mut self, forced: bool) {
        if self.forced_embedded == forced {
            return;
        }
        self.forced_embedded = forced;
        self.invalidate_embedded();
    }

    /// Resize notification from the host window.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.apply_viewport(Viewport::new(width, height));
    }

    /// Mutate the injected environment in place, then recompute everything
    /// derived from it.
    pub fn update_environment<F>(&mut self, update: F)
    where
        F: FnOnce(&mut E),
    {
        update(&mut self.env);
        self.refresh_environment();
    }

    /// Swap the injected environment, e.g. when server rendering hands over
    /// to a live window. Returns the previous environment.
    pub fn replace_environment(&mut self, env: E) -> E {
        let previous = std::mem::replace(&mut self.env, env);
        self.refresh_environment();
        previous
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&DeviceChange) + 'static,
    {
        // Listeners compare against the cached flag, so make sure it exists.
        self.is_embedded();
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            width: self.viewport.width,
            height: self.viewport.height,
            is_embedded: self.is_embedded(),
            forced_embedded: self.forced_embedded,
        }
    }

    fn refresh_environment(&mut self) {
        let viewport = self.env.viewport().unwrap_or_default();
        self.apply_viewport(viewport);
        self.invalidate_embedded();
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.notify(DeviceChange::Resized(viewport));
    }

    fn invalidate_embedded(&mut self) {
        let previous = self.embedded.take();
        if self.listeners.is_empty() {
            return;
        }
        let current = self.is_embedded();
        if previous != Some(current) {
            tracing::debug!(embedded = current, "embedded context changed");
            self.notify(DeviceChange::Embedded(current));
        }
    }

    fn notify(&mut self, change: DeviceChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for DeviceStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceStore")
            .field("env", &self.env)
            .field("viewport", &self.viewport)
            .field("forced_embedded", &self.forced_embedded)
            .field("embedded", &self.embedded.get())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn evaluate_embedded<E: Environment>(env: &E, forced: bool) -> bool {
    if !env.has_window() {
        return false;
    }
    if forced {
        return true;
    }
    env.frame_ancestry_differs()
}
