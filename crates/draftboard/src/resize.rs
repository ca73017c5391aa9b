//! Pointer-drag resizing for the panels around a canvas.
//!
//! Two resizers share one drag protocol:
//!
//! - [`PixelResizer`] - a fixed pixel width clamped to `[min, max]`
//! - [`PercentResizer`] - a share of a live-measured container, clamped to
//!   `[min, max]` percent
//!
//! A drag is an explicit [`DragSession`]: starting one attaches pointer
//! listeners to the whole interaction surface and sets the drag affordances,
//! and releasing it (or dropping it, e.g. when the owning view is torn down
//! mid-drag) detaches and restores them. Pointer moves are coalesced: only the
//! latest cursor position is kept, and [`PixelResizer::frame`] applies at most
//! one clamped update per rendering frame.

use log::{debug, trace};
use serde::Deserialize;

/// Which edge of the panel carries the drag handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    /// Dragging left grows the panel.
    Left,
    /// Dragging right grows the panel.
    Right,
}

/// Bounds of a pixel-width panel.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PixelSpec {
    pub initial: f32,
    pub min: f32,
    pub max: f32,
    pub side: HandleSide,
}

/// Bounds of a percentage-width panel, in percent of the container.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PercentSpec {
    pub initial: f32,
    pub min: f32,
    pub max: f32,
    pub side: HandleSide,
}

/// Identifies a set of listeners attached by an [`InteractionSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// The surface that receives pointer events during a drag, usually the whole
/// document rather than the handle, so fast movement does not abort it.
pub trait InteractionSurface {
    /// Start delivering pointer move and up events to the active resizer.
    fn attach_pointer_listeners(&mut self) -> ListenerToken;

    /// Stop delivering the events registered under `token`.
    fn detach_pointer_listeners(&mut self, token: ListenerToken);

    /// Show the resize cursor and disable text selection.
    fn set_drag_affordances(&mut self);

    /// Restore the default cursor and text selection.
    fn clear_drag_affordances(&mut self);
}

impl<T: InteractionSurface + ?Sized> InteractionSurface for &mut T {
    fn attach_pointer_listeners(&mut self) -> ListenerToken {
        (**self).attach_pointer_listeners()
    }

    fn detach_pointer_listeners(&mut self, token: ListenerToken) {
        (**self).detach_pointer_listeners(token)
    }

    fn set_drag_affordances(&mut self) {
        (**self).set_drag_affordances()
    }

    fn clear_drag_affordances(&mut self) {
        (**self).clear_drag_affordances()
    }
}

/// Horizontal extent of a container element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    pub left: f32,
    pub width: f32,
}

/// Live measurement of the container a percentage panel is sized against.
pub trait ContainerMeasure {
    /// Returns the container's current extent, or `None` if it is not mounted.
    fn measure(&self) -> Option<ContainerRect>;
}

/// An in-progress drag.
///
/// Owns the surface's listeners for its lifetime; [`release`](Self::release)
/// and `Drop` both detach them and restore affordances, exactly once.
#[derive(Debug)]
pub struct DragSession<S: InteractionSurface> {
    surface: Option<S>,
    token: ListenerToken,
    start_cursor: f32,
    start_value: f32,
}

impl<S: InteractionSurface> DragSession<S> {
    pub fn start(mut surface: S, start_cursor: f32, start_value: f32) -> Self {
        let token = surface.attach_pointer_listeners();
        surface.set_drag_affordances();
        debug!(token = token.0, start_cursor = start_cursor; "Drag session started");
        Self {
            surface: Some(surface),
            token,
            start_cursor,
            start_value,
        }
    }

    pub fn start_cursor(&self) -> f32 {
        self.start_cursor
    }

    pub fn start_value(&self) -> f32 {
        self.start_value
    }

    /// Ends the drag.
    pub fn release(mut self) {
        self.dispose();
    }

    fn dispose(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.detach_pointer_listeners(self.token);
            surface.clear_drag_affordances();
            debug!(token = self.token.0; "Drag session released");
        }
    }
}

impl<S: InteractionSurface> Drop for DragSession<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Latest-wins buffer of pointer moves between frames.
#[derive(Debug)]
struct Drag<S: InteractionSurface> {
    session: Option<DragSession<S>>,
    pending: Option<f32>,
}

impl<S: InteractionSurface> Drag<S> {
    fn new() -> Self {
        Self {
            session: None,
            pending: None,
        }
    }

    fn start(&mut self, surface: S, cursor_x: f32, value: f32) {
        self.end();
        self.session = Some(DragSession::start(surface, cursor_x, value));
    }

    fn pointer_move(&mut self, cursor_x: f32) {
        if self.session.is_some() {
            self.pending = Some(cursor_x);
        }
    }

    /// Takes the latest move together with the session it belongs to.
    fn take(&mut self) -> Option<(&DragSession<S>, f32)> {
        let cursor_x = self.pending.take()?;
        self.session.as_ref().map(|session| (session, cursor_x))
    }

    fn end(&mut self) {
        self.pending = None;
        if let Some(session) = self.session.take() {
            session.release();
        }
    }

    fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

/// Resizes a panel of fixed pixel width.
///
/// # Examples
///
/// ```
/// # use draftboard::resize::{HandleSide, InteractionSurface, ListenerToken, PixelResizer, PixelSpec};
/// struct Document;
/// impl InteractionSurface for Document {
///     fn attach_pointer_listeners(&mut self) -> ListenerToken { ListenerToken(1) }
///     fn detach_pointer_listeners(&mut self, _: ListenerToken) {}
///     fn set_drag_affordances(&mut self) {}
///     fn clear_drag_affordances(&mut self) {}
/// }
///
/// let spec = PixelSpec { initial: 320.0, min: 200.0, max: 500.0, side: HandleSide::Right };
/// let mut sidebar = PixelResizer::new(spec);
/// sidebar.start(Document, 320.0);
/// sidebar.pointer_move(400.0);
/// assert_eq!(sidebar.frame(), Some(400.0));
/// sidebar.pointer_up();
/// assert_eq!(sidebar.value(), 400.0);
/// ```
#[derive(Debug)]
pub struct PixelResizer<S: InteractionSurface> {
    spec: PixelSpec,
    value: f32,
    drag: Drag<S>,
}

impl<S: InteractionSurface> PixelResizer<S> {
    pub fn new(spec: PixelSpec) -> Self {
        Self {
            value: clamp(spec.initial, spec.min, spec.max),
            spec,
            drag: Drag::new(),
        }
    }

    pub fn spec(&self) -> &PixelSpec {
        &self.spec
    }

    /// Current width in pixels.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Sets the width directly, clamped to the configured bounds.
    pub fn set_value(&mut self, value: f32) {
        self.value = clamp(value, self.spec.min, self.spec.max);
    }

    pub fn is_resizing(&self) -> bool {
        self.drag.is_active()
    }

    /// Begins a drag at `cursor_x`, ending any drag already in progress.
    pub fn start(&mut self, surface: S, cursor_x: f32) {
        self.drag.start(surface, cursor_x, self.value);
    }

    /// Records the latest cursor position. Nothing changes until the next frame.
    pub fn pointer_move(&mut self, cursor_x: f32) {
        self.drag.pointer_move(cursor_x);
    }

    /// Applies the latest pointer move, if any, and returns the new width.
    pub fn frame(&mut self) -> Option<f32> {
        let (session, cursor_x) = self.drag.take()?;
        let delta = cursor_x - session.start_cursor();
        let raw = match self.spec.side {
            HandleSide::Right => session.start_value() + delta,
            HandleSide::Left => session.start_value() - delta,
        };
        self.value = clamp(raw, self.spec.min, self.spec.max);
        trace!(raw = raw, width = self.value; "Panel resized");
        Some(self.value)
    }

    /// Ends the drag, dropping any move not yet applied by a frame.
    pub fn pointer_up(&mut self) {
        self.drag.end();
    }

    /// Releases the drag when the owning view goes away.
    pub fn teardown(&mut self) {
        self.drag.end();
    }
}

/// Resizes a panel as a percentage of a container's width.
#[derive(Debug)]
pub struct PercentResizer<S: InteractionSurface, C: ContainerMeasure> {
    spec: PercentSpec,
    container: C,
    value: f32,
    drag: Drag<S>,
}

impl<S: InteractionSurface, C: ContainerMeasure> PercentResizer<S, C> {
    pub fn new(spec: PercentSpec, container: C) -> Self {
        Self {
            value: clamp(spec.initial, spec.min, spec.max),
            spec,
            container,
            drag: Drag::new(),
        }
    }

    pub fn spec(&self) -> &PercentSpec {
        &self.spec
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Current share of the container, in percent.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Sets the share directly, clamped to the configured bounds.
    pub fn set_value(&mut self, value: f32) {
        self.value = clamp(value, self.spec.min, self.spec.max);
    }

    pub fn is_resizing(&self) -> bool {
        self.drag.is_active()
    }

    pub fn start(&mut self, surface: S, cursor_x: f32) {
        self.drag.start(surface, cursor_x, self.value);
    }

    pub fn pointer_move(&mut self, cursor_x: f32) {
        self.drag.pointer_move(cursor_x);
    }

    /// Applies the latest pointer move against the container's current extent.
    ///
    /// The move is discarded if the container is unmounted or has no width.
    pub fn frame(&mut self) -> Option<f32> {
        let (_, cursor_x) = self.drag.take()?;
        let rect = self.container.measure().filter(|rect| rect.width > 0.0)?;
        let offset = cursor_x - rect.left;
        let raw = match self.spec.side {
            HandleSide::Right => offset / rect.width * 100.0,
            HandleSide::Left => (rect.width - offset) / rect.width * 100.0,
        };
        self.value = clamp(raw, self.spec.min, self.spec.max);
        trace!(raw = raw, percent = self.value; "Panel resized");
        Some(self.value)
    }

    pub fn pointer_up(&mut self) {
        self.drag.end();
    }

    pub fn teardown(&mut self) {
        self.drag.end();
    }
}

fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
