//! The page a widget lives on.
//!
//! A [`Document`] holds the state that is shared by every widget on a page:
//! the [`OpenOverlayRegistry`] that keeps at most one dropdown open, the
//! document-level click dispatch used to close dropdowns on outside clicks,
//! the bubbled change notifications of its controls, keyboard focus, and the
//! set of overlays currently mounted next to their native controls.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sift_select_core::logging::targets;
use sift_select_core::{OpenOverlayRegistry, OverlayId, Signal};

use crate::native::{ChangeEvent, NativeSelectBuilder};

/// Something that can hold keyboard focus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// The display affordance of an overlay.
    Display(OverlayId),
    /// The search field of an overlay.
    Search(OverlayId),
    /// Any other element, identified by the host.
    Element(String),
}

/// Where a click that reached the document landed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClickTarget {
    /// Inside the container of an overlay.
    Overlay(OverlayId),
    /// On another element, identified by the host.
    Element(String),
    /// On the page background.
    Background,
}

impl ClickTarget {
    /// Whether the click landed inside the container of `overlay`.
    pub fn is_inside(&self, overlay: OverlayId) -> bool {
        matches!(self, Self::Overlay(id) if *id == overlay)
    }
}

/// A page hosting native controls and their overlays.
pub struct Document {
    overlays: OpenOverlayRegistry,
    focus: Mutex<Option<FocusTarget>>,
    mounted: Mutex<HashMap<OverlayId, Option<String>>>,

    /// Emitted for every click that propagates to the document.
    pub clicked: Signal<ClickTarget>,
    /// Emitted for every bubbling change notification of a control.
    pub changed: Signal<ChangeEvent>,
}

impl Document {
    /// Create an empty page.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            overlays: OpenOverlayRegistry::new(),
            focus: Mutex::new(None),
            mounted: Mutex::new(HashMap::new()),
            clicked: Signal::new(),
            changed: Signal::new(),
        })
    }

    /// Start building a native control attached to this page.
    pub fn create_select(self: &Arc<Self>) -> NativeSelectBuilder {
        NativeSelectBuilder::new().document(self)
    }

    /// The page-wide open-overlay registry.
    pub fn overlays(&self) -> &OpenOverlayRegistry {
        &self.overlays
    }

    // =========================================================================
    // Clicks
    // =========================================================================

    /// Deliver a click to the document-level listeners.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_click(&self, target: ClickTarget) -> usize {
        tracing::trace!(target: targets::WIDGET, ?target, "document click");
        self.clicked.emit(target)
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// The element holding keyboard focus.
    pub fn focused(&self) -> Option<FocusTarget> {
        self.focus.lock().clone()
    }

    /// Whether `target` holds keyboard focus.
    pub fn has_focus(&self, target: &FocusTarget) -> bool {
        self.focus.lock().as_ref() == Some(target)
    }

    /// Move keyboard focus to `target`.
    pub fn set_focus(&self, target: FocusTarget) {
        *self.focus.lock() = Some(target);
    }

    /// Remove keyboard focus from whatever holds it.
    pub fn blur(&self) {
        *self.focus.lock() = None;
    }

    /// Remove keyboard focus if any part of `overlay` holds it.
    pub(crate) fn blur_overlay(&self, overlay: OverlayId) {
        let mut focus = self.focus.lock();
        if matches!(
            &*focus,
            Some(FocusTarget::Display(id) | FocusTarget::Search(id)) if *id == overlay
        ) {
            *focus = None;
        }
    }

    // =========================================================================
    // Mounted overlays
    // =========================================================================

    /// Insert an overlay's container before the control identified by `anchor`.
    pub(crate) fn mount(&self, overlay: OverlayId, anchor: Option<String>) {
        self.mounted.lock().insert(overlay, anchor);
    }

    /// Remove an overlay's container. Returns `false` if it was not mounted.
    pub(crate) fn unmount(&self, overlay: OverlayId) -> bool {
        self.mounted.lock().remove(&overlay).is_some()
    }

    /// Whether the overlay's container is on the page.
    pub fn is_mounted(&self, overlay: OverlayId) -> bool {
        self.mounted.lock().contains_key(&overlay)
    }

    /// Id of the control an overlay is mounted next to.
    pub fn mount_anchor(&self, overlay: OverlayId) -> Option<String> {
        self.mounted.lock().get(&overlay).cloned().flatten()
    }

    /// Number of overlay containers on the page.
    pub fn mounted_count(&self) -> usize {
        self.mounted.lock().len()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("focus", &*self.focus.lock())
            .field("mounted", &self.mounted.lock().len())
            .field("open_overlay", &self.overlays.open_overlay())
            .finish()
    }
}
