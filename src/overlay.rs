//! Overlay position synchronizer.
//!
//! Keeps screen-space overlays (popovers rendered outside the map's own
//! layer tree) glued to geographic anchors while the viewport moves.
//!
//! Viewport events never project directly. They store the latest viewport
//! state and request one frame; further events before that frame are
//! absorbed. The frame then projects every anchor exactly once against the
//! newest state, so intermediate states are discarded.
//!
//! Each anchor also carries a hover/click open state with a delayed close:
//! the overlay sits at a different screen position than its marker, so the
//! pointer needs a short grace period to travel from one to the other.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use crate::events::{Subscription, ViewportEventKind};
use crate::geo::{GeoPoint, ScreenPoint};
use crate::projection::project;
use crate::traits::{Scheduler, TaskId};
use crate::viewport::{ViewportController, ViewportState};

/// Horizontal and vertical shift of overlay content relative to its size:
/// bottom-center of the content sits on the projected point.
pub const CONTENT_TRANSLATE: (f64, f64) = (-0.5, -1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Closed,
    Open,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAnchor<C> {
    pub geo_position: GeoPoint,
    pub is_open: bool,
    pub content: C,
}

impl<C> OverlayAnchor<C> {
    pub fn new(geo_position: GeoPoint, content: C) -> Self {
        Self {
            geo_position,
            is_open: false,
            content,
        }
    }

    pub fn state(&self) -> OverlayState {
        if self.is_open {
            OverlayState::Open
        } else {
            OverlayState::Closed
        }
    }
}

/// Where overlay content is drawn: the projected anchor point plus the
/// content-relative shift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    pub left: f64,
    pub top: f64,
    pub translate: (f64, f64),
}

impl OverlayPlacement {
    fn at(point: ScreenPoint) -> Self {
        Self {
            left: point.x,
            top: point.y,
            translate: CONTENT_TRANSLATE,
        }
    }

    /// Top-left corner of content with the given pixel size.
    pub fn content_origin(&self, width: f64, height: f64) -> ScreenPoint {
        ScreenPoint::new(
            self.left + self.translate.0 * width,
            self.top + self.translate.1 * height,
        )
    }
}

type OpenChangeCallback = Rc<dyn Fn(AnchorId, bool)>;

struct PendingClose {
    timer: TaskId,
    token: u64,
}

struct Tracked<C> {
    anchor: OverlayAnchor<C>,
    screen: Option<ScreenPoint>,
    pending_close: Option<PendingClose>,
}

struct SyncState<C> {
    anchors: BTreeMap<AnchorId, Tracked<C>>,
    latest: ViewportState,
    pending_frame: Option<TaskId>,
    next_anchor: u64,
    next_token: u64,
    projections: u64,
    on_open_change: Option<OpenChangeCallback>,
}

pub struct OverlaySynchronizer<C: 'static> {
    shared: Rc<RefCell<SyncState<C>>>,
    scheduler: Rc<dyn Scheduler>,
    close_delay: Duration,
    subscription: Option<Subscription>,
}

impl<C: 'static> OverlaySynchronizer<C> {
    /// Subscribes to the controller's move, zoom and resize notifications.
    ///
    /// Torn down by [`teardown`](Self::teardown) or on drop, whichever comes
    /// first.
    pub fn attach(controller: &ViewportController, scheduler: Rc<dyn Scheduler>, close_delay: Duration) -> Self {
        let shared = Rc::new(RefCell::new(SyncState {
            anchors: BTreeMap::new(),
            latest: controller.state(),
            pending_frame: None,
            next_anchor: 0,
            next_token: 0,
            projections: 0,
            on_open_change: None,
        }));

        let weak = Rc::downgrade(&shared);
        let listener_scheduler = scheduler.clone();
        let subscription = controller.subscribe(
            &[ViewportEventKind::Move, ViewportEventKind::Zoom, ViewportEventKind::Resize],
            move |event| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                shared.borrow_mut().latest = event.state;
                schedule_recompute(&shared, &listener_scheduler);
            },
        );

        Self {
            shared,
            scheduler,
            close_delay,
            subscription: Some(subscription),
        }
    }

    /// Receives every open/close transition after it happened.
    pub fn on_open_change(&self, callback: impl Fn(AnchorId, bool) + 'static) {
        self.shared.borrow_mut().on_open_change = Some(Rc::new(callback));
    }

    /// Starts tracking `anchor`; its screen position is available after the
    /// next frame.
    pub fn register(&self, anchor: OverlayAnchor<C>) -> AnchorId {
        let id = {
            let mut state = self.shared.borrow_mut();
            state.next_anchor += 1;
            let id = AnchorId(state.next_anchor);
            state.anchors.insert(
                id,
                Tracked {
                    anchor,
                    screen: None,
                    pending_close: None,
                },
            );
            id
        };
        schedule_recompute(&self.shared, &self.scheduler);
        id
    }

    /// Stops tracking `id`, closing it and cancelling its close timer.
    pub fn remove(&self, id: AnchorId) -> Option<OverlayAnchor<C>> {
        let tracked = self.shared.borrow_mut().anchors.remove(&id)?;
        if let Some(pending) = &tracked.pending_close {
            self.scheduler.clear_timeout(pending.timer);
        }

        let was_open = tracked.anchor.is_open;
        let mut anchor = tracked.anchor;
        anchor.is_open = false;
        if was_open {
            notify(&self.shared, id, false);
        }
        Some(anchor)
    }

    /// Moves an anchor (e.g. a new position for a moving entity).
    pub fn set_position(&self, id: AnchorId, geo_position: GeoPoint) {
        let found = match self.shared.borrow_mut().anchors.get_mut(&id) {
            Some(tracked) => {
                tracked.anchor.geo_position = geo_position;
                true
            }
            None => false,
        };
        if found {
            schedule_recompute(&self.shared, &self.scheduler);
        }
    }

    pub fn set_content(&self, id: AnchorId, content: C) {
        if let Some(tracked) = self.shared.borrow_mut().anchors.get_mut(&id) {
            tracked.anchor.content = content;
        }
    }

    pub fn pointer_enter_anchor(&self, id: AnchorId) {
        self.cancel_close(id);
        self.set_open(id, true);
    }

    pub fn pointer_leave_anchor(&self, id: AnchorId) {
        self.schedule_close(id);
    }

    /// Clicking toggles regardless of hover state.
    pub fn click_anchor(&self, id: AnchorId) {
        self.cancel_close(id);
        if let Some(open) = self.is_open(id) {
            self.set_open(id, !open);
        }
    }

    /// Entering the overlay content keeps a pending close from firing.
    pub fn pointer_enter_content(&self, id: AnchorId) {
        self.cancel_close(id);
    }

    pub fn pointer_leave_content(&self, id: AnchorId) {
        self.schedule_close(id);
    }

    /// Sets the open state directly, as a popover's own dismissal would.
    pub fn set_open(&self, id: AnchorId, open: bool) {
        let changed = match self.shared.borrow_mut().anchors.get_mut(&id) {
            Some(tracked) if tracked.anchor.is_open != open => {
                tracked.anchor.is_open = open;
                true
            }
            _ => false,
        };
        if changed {
            debug!(anchor = id.0, open, "overlay open state changed");
            notify(&self.shared, id, open);
        }
    }

    pub fn is_open(&self, id: AnchorId) -> Option<bool> {
        self.shared.borrow().anchors.get(&id).map(|tracked| tracked.anchor.is_open)
    }

    pub fn overlay_state(&self, id: AnchorId) -> Option<OverlayState> {
        self.shared.borrow().anchors.get(&id).map(|tracked| tracked.anchor.state())
    }

    /// Last projected position; `None` until the first frame or while the
    /// container is not laid out.
    pub fn screen_position(&self, id: AnchorId) -> Option<ScreenPoint> {
        self.shared.borrow().anchors.get(&id).and_then(|tracked| tracked.screen)
    }

    /// Placement for rendering; `None` means render nothing.
    pub fn placement(&self, id: AnchorId) -> Option<OverlayPlacement> {
        self.screen_position(id).map(OverlayPlacement::at)
    }

    pub fn with_anchor<R>(&self, id: AnchorId, f: impl FnOnce(&OverlayAnchor<C>) -> R) -> Option<R> {
        self.shared.borrow().anchors.get(&id).map(|tracked| f(&tracked.anchor))
    }

    pub fn anchor_ids(&self) -> Vec<AnchorId> {
        self.shared.borrow().anchors.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.shared.borrow().anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.borrow().anchors.is_empty()
    }

    /// Total anchor projections performed so far.
    pub fn projection_count(&self) -> u64 {
        self.shared.borrow().projections
    }

    pub fn has_pending_frame(&self) -> bool {
        self.shared.borrow().pending_frame.is_some()
    }

    pub fn has_pending_close(&self, id: AnchorId) -> bool {
        self.shared
            .borrow()
            .anchors
            .get(&id)
            .is_some_and(|tracked| tracked.pending_close.is_some())
    }

    /// Unsubscribes from the viewport and cancels all pending frame and
    /// timer work. Anchors are dropped without close notifications.
    pub fn teardown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        subscription.dispose();

        let mut state = self.shared.borrow_mut();
        if let Some(frame) = state.pending_frame.take() {
            self.scheduler.cancel_frame(frame);
        }
        for tracked in state.anchors.values_mut() {
            if let Some(pending) = tracked.pending_close.take() {
                self.scheduler.clear_timeout(pending.timer);
            }
        }
        state.anchors.clear();
        state.on_open_change = None;
        debug!("overlay synchronizer torn down");
    }

    fn cancel_close(&self, id: AnchorId) {
        let pending = self
            .shared
            .borrow_mut()
            .anchors
            .get_mut(&id)
            .and_then(|tracked| tracked.pending_close.take());
        if let Some(pending) = pending {
            trace!(anchor = id.0, "close cancelled");
            self.scheduler.clear_timeout(pending.timer);
        }
    }

    fn schedule_close(&self, id: AnchorId) {
        self.cancel_close(id);

        let token = {
            let mut state = self.shared.borrow_mut();
            if !state.anchors.contains_key(&id) {
                return;
            }
            state.next_token += 1;
            state.next_token
        };

        let weak = Rc::downgrade(&self.shared);
        let timer = self.scheduler.set_timeout(
            self.close_delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    fire_close(&shared, id, token);
                }
            }),
        );

        if let Some(tracked) = self.shared.borrow_mut().anchors.get_mut(&id) {
            tracked.pending_close = Some(PendingClose { timer, token });
        }
    }
}

impl<C: 'static> Drop for OverlaySynchronizer<C> {
    fn drop(&mut self) {
        self.release();
    }
}

fn schedule_recompute<C: 'static>(shared: &Rc<RefCell<SyncState<C>>>, scheduler: &Rc<dyn Scheduler>) {
    if shared.borrow().pending_frame.is_some() {
        trace!("recompute already pending, absorbing trigger");
        return;
    }

    let weak: Weak<RefCell<SyncState<C>>> = Rc::downgrade(shared);
    let frame = scheduler.request_frame(Box::new(move || {
        if let Some(shared) = weak.upgrade() {
            recompute(&shared);
        }
    }));
    shared.borrow_mut().pending_frame = Some(frame);
}

fn recompute<C>(shared: &Rc<RefCell<SyncState<C>>>) {
    let mut guard = shared.borrow_mut();
    let state = &mut *guard;
    state.pending_frame = None;

    let viewport = state.latest;
    if !viewport.size.is_laid_out() {
        trace!("container not laid out, skipping overlay recompute");
        for tracked in state.anchors.values_mut() {
            tracked.screen = None;
        }
        return;
    }

    for tracked in state.anchors.values_mut() {
        tracked.screen = Some(project(tracked.anchor.geo_position, &viewport));
        state.projections += 1;
    }
    trace!(anchors = state.anchors.len(), "overlay positions recomputed");
}

/// Closes `id` only if `token` still identifies its pending close; a timer
/// that was superseded or cancelled after being queued does nothing.
fn fire_close<C>(shared: &Rc<RefCell<SyncState<C>>>, id: AnchorId, token: u64) {
    let closed = {
        let mut state = shared.borrow_mut();
        match state.anchors.get_mut(&id) {
            Some(tracked) if tracked.pending_close.as_ref().is_some_and(|pending| pending.token == token) => {
                tracked.pending_close = None;
                let was_open = tracked.anchor.is_open;
                tracked.anchor.is_open = false;
                was_open
            }
            _ => {
                trace!(anchor = id.0, token, "stale close timer ignored");
                false
            }
        }
    };

    if closed {
        debug!(anchor = id.0, "overlay closed after delay");
        notify(shared, id, false);
    }
}

fn notify<C>(shared: &Rc<RefCell<SyncState<C>>>, id: AnchorId, open: bool) {
    let callback = shared.borrow().on_open_change.clone();
    if let Some(callback) = callback {
        callback(id, open);
    }
}
