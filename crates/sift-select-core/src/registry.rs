//! Page-wide coordination of open overlays.
//!
//! At most one overlay on a page may be open at a time. Every overlay enrolls
//! with the page's [`OpenOverlayRegistry`] and hands it a close hook; opening
//! an overlay through [`register_open`](OpenOverlayRegistry::register_open)
//! invokes the hook of whichever overlay was open before.

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{Key, SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifier of an overlay enrolled in an [`OpenOverlayRegistry`].
    ///
    /// Identifiers stay valid until the overlay withdraws and are never
    /// reused while the registry is alive.
    pub struct OverlayId;
}

impl OverlayId {
    /// Convert the id to a raw u64 value.
    ///
    /// Useful wherever a stable textual token for the overlay is needed.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

type CloseHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct RegistryState {
    members: SlotMap<OverlayId, CloseHook>,
    open: Option<OverlayId>,
}

/// Tracks which enrolled overlay, if any, is currently open.
#[derive(Default)]
pub struct OpenOverlayRegistry {
    state: Mutex<RegistryState>,
}

impl OpenOverlayRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enroll an overlay, returning its id.
    ///
    /// `close` is invoked when another overlay opens while this one is open.
    /// It runs without the registry lock held and may call back into the
    /// registry.
    pub fn enroll<F>(&self, close: F) -> OverlayId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.state.lock().members.insert(Arc::new(close));
        tracing::debug!(target: targets::REGISTRY, overlay = id.as_raw(), "overlay enrolled");
        id
    }

    /// Remove an overlay from the registry.
    ///
    /// Returns `false` if the overlay was not enrolled.
    pub fn withdraw(&self, id: OverlayId) -> bool {
        let mut state = self.state.lock();
        if state.open == Some(id) {
            state.open = None;
        }
        let removed = state.members.remove(id).is_some();
        if removed {
            tracing::debug!(target: targets::REGISTRY, overlay = id.as_raw(), "overlay withdrawn");
        }
        removed
    }

    /// Mark `id` as the open overlay, closing the previously open one.
    ///
    /// Unknown ids are ignored.
    pub fn register_open(&self, id: OverlayId) {
        let displaced = {
            let mut state = self.state.lock();
            if !state.members.contains_key(id) {
                tracing::warn!(target: targets::REGISTRY, overlay = id.as_raw(), "open requested for unknown overlay");
                return;
            }
            match state.open.replace(id) {
                Some(previous) if previous != id => state
                    .members
                    .get(previous)
                    .cloned()
                    .map(|hook| (previous, hook)),
                _ => None,
            }
        };

        if let Some((previous, close)) = displaced {
            tracing::debug!(
                target: targets::REGISTRY,
                opened = id.as_raw(),
                closed = previous.as_raw(),
                "closing previously open overlay"
            );
            close();
        }
    }

    /// Clear the open mark if it belongs to `id`.
    ///
    /// Returns `true` if `id` was the open overlay.
    pub fn clear(&self, id: OverlayId) -> bool {
        let mut state = self.state.lock();
        if state.open == Some(id) {
            state.open = None;
            true
        } else {
            false
        }
    }

    /// The currently open overlay.
    pub fn open_overlay(&self) -> Option<OverlayId> {
        self.state.lock().open
    }

    /// Whether `id` is the currently open overlay.
    pub fn is_open(&self, id: OverlayId) -> bool {
        self.state.lock().open == Some(id)
    }

    /// Whether `id` is enrolled.
    pub fn contains(&self, id: OverlayId) -> bool {
        self.state.lock().members.contains_key(id)
    }

    /// Number of enrolled overlays.
    pub fn len(&self) -> usize {
        self.state.lock().members.len()
    }

    /// Whether no overlay is enrolled.
    pub fn is_empty(&self) -> bool {
        self.state.lock().members.is_empty()
    }
}
