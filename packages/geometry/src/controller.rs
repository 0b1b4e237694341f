//! # Pointer Geometry Controller
//!
//! Turns pointer-down/move/up streams on a resize handle or drag
//! affordance into geometry updates for one target element.
//!
//! Two outputs run at different rates:
//!
//! - **Presentation**: the latest geometry is pushed to the
//!   [`Presenter`] on every animation frame that follows a move, at most
//!   once per frame.
//! - **Persistence**: commits to the [`GeometrySink`] are debounced and
//!   skipped when the change since the last commit is below the
//!   threshold. Releasing the pointer always flushes the final geometry.
//!
//! The controller never reads a clock. Callers pass the event time in,
//! which keeps debounce behavior deterministic.

use crate::{Geometry, GeometryError, Handle, Point, MIN_SIZE};
use retouch_overrides::OverrideStore;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Pointer device identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u32);

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual layer that shows in-flight geometry
pub trait Presenter {
    fn present(&mut self, target: &str, geometry: &Geometry);
}

/// Durable destination of committed geometry
pub trait GeometrySink {
    fn commit(&mut self, target: &str, geometry: &Geometry);
}

impl GeometrySink for OverrideStore {
    fn commit(&mut self, target: &str, geometry: &Geometry) {
        self.set(target, json!({ "layout": geometry }));
    }
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Minimum width/height after a resize
    pub min_size: f64,
    /// Quiet period before a logical commit
    pub debounce: Duration,
    /// Smallest change worth committing before release
    pub commit_threshold: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_size: MIN_SIZE,
            debounce: Duration::from_millis(150),
            commit_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    target: String,
    handle: Handle,
    start_pointer: Point,
    start: Geometry,
    current: Geometry,
    last_committed: Geometry,
    last_move: Option<Instant>,
    frame_pending: bool,
    commit_pending: bool,
}

impl Session {
    fn resolve(&self, position: Point, min_size: f64) -> Geometry {
        let dx = position.x - self.start_pointer.x;
        let dy = position.y - self.start_pointer.y;
        self.handle.apply(&self.start, dx, dy, min_size)
    }

    fn change_since_commit(&self) -> f64 {
        if self.handle.is_resize() {
            self.current.size_delta(&self.last_committed)
        } else {
            self.current.position_delta(&self.last_committed)
        }
    }
}

/// Geometry sessions, at most one per pointer device
#[derive(Debug, Default)]
pub struct PointerGeometryController {
    config: ControllerConfig,
    sessions: BTreeMap<PointerId, Session>,
}

impl PointerGeometryController {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        Self {
            config,
            sessions: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Start a session for `pointer`.
    ///
    /// A session still open on the same pointer (a missed pointer-up) is
    /// discarded without committing; its target is returned.
    pub fn begin_session(
        &mut self,
        pointer: PointerId,
        target: impl Into<String>,
        handle: Handle,
        start_pointer: Point,
        start_geometry: Geometry,
    ) -> Option<String> {
        let target = target.into();
        debug!(pointer = %pointer, element = %target, handle = %handle, "Begin geometry session");

        let stale = self.sessions.insert(
            pointer,
            Session {
                target,
                handle,
                start_pointer,
                start: start_geometry,
                current: start_geometry,
                last_committed: start_geometry,
                last_move: None,
                frame_pending: false,
                commit_pending: false,
            },
        );

        stale.map(|session| {
            debug!(pointer = %pointer, element = %session.target, "Cancelled stale geometry session");
            session.target
        })
    }

    /// Track a pointer move. Nothing is presented or committed here.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        position: Point,
        now: Instant,
    ) -> Result<Geometry, GeometryError> {
        let min_size = self.config.min_size;
        let session = self
            .sessions
            .get_mut(&pointer)
            .ok_or(GeometryError::NoSession(pointer))?;

        session.current = session.resolve(position, min_size);
        session.last_move = Some(now);
        session.frame_pending = true;
        session.commit_pending = true;

        trace!(pointer = %pointer, geometry = ?session.current, "Pointer move");
        Ok(session.current)
    }

    /// Push pending geometry to the presentation layer.
    ///
    /// Call once per animation frame. Returns how many targets were updated.
    pub fn animation_frame(&mut self, presenter: &mut impl Presenter) -> usize {
        let mut presented = 0;
        for session in self.sessions.values_mut() {
            if session.frame_pending {
                presenter.present(&session.target, &session.current);
                session.frame_pending = false;
                presented += 1;
            }
        }
        presented
    }

    /// Debounced logical commit.
    ///
    /// A session commits once the pointer has been still for the debounce
    /// window and the change since its last commit reaches the threshold.
    /// Returns how many sessions committed.
    pub fn poll(&mut self, now: Instant, sink: &mut impl GeometrySink) -> usize {
        let debounce = self.config.debounce;
        let threshold = self.config.commit_threshold;
        let mut committed = 0;

        for session in self.sessions.values_mut() {
            if !session.commit_pending {
                continue;
            }
            let settled = session
                .last_move
                .map(|at| now.saturating_duration_since(at) >= debounce)
                .unwrap_or(false);
            if !settled || session.change_since_commit() < threshold {
                continue;
            }

            sink.commit(&session.target, &session.current);
            session.last_committed = session.current;
            session.commit_pending = false;
            committed += 1;
            debug!(element = %session.target, geometry = ?session.current, "Debounced geometry commit");
        }

        committed
    }

    /// Finish the session on pointer release.
    ///
    /// The geometry implied by the release position is presented and
    /// committed right away, whatever the debounce state.
    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        position: Point,
        presenter: &mut impl Presenter,
        sink: &mut impl GeometrySink,
    ) -> Result<Geometry, GeometryError> {
        let session = self
            .sessions
            .remove(&pointer)
            .ok_or(GeometryError::NoSession(pointer))?;

        let last = session.resolve(position, self.config.min_size);
        presenter.present(&session.target, &last);
        sink.commit(&session.target, &last);

        debug!(pointer = %pointer, element = %session.target, geometry = ?last, "Flushed geometry on release");
        Ok(last)
    }

    /// Drop the session on `pointer` without committing
    pub fn cancel(&mut self, pointer: PointerId) -> bool {
        self.sessions.remove(&pointer).is_some()
    }

    /// Abort every session on a target that left the tree.
    ///
    /// Nothing is written; whatever was committed before stays as is.
    pub fn target_unmounted(&mut self, target: &str) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.target != target);
        let aborted = before - self.sessions.len();
        if aborted > 0 {
            debug!(element = target, aborted, "Aborted geometry sessions for unmounted target");
        }
        aborted
    }

    pub fn is_active(&self, pointer: PointerId) -> bool {
        self.sessions.contains_key(&pointer)
    }

    pub fn active_target(&self, pointer: PointerId) -> Option<&str> {
        self.sessions.get(&pointer).map(|s| s.target.as_str())
    }

    /// Latest in-flight geometry of the session on `pointer`
    pub fn current_geometry(&self, pointer: PointerId) -> Option<Geometry> {
        self.sessions.get(&pointer).map(|s| s.current)
    }
}
