//! Interaction data: body snapshots, drag sessions, tunables, and the events
//! the controller emits.

use crate::interaction::explosion::ExplosionParams;
use bevy::prelude::*;
use serde::Deserialize;

// ── Bodies ─────────────────────────────────────────────────────────────────────

/// Linear / angular damping pair of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragCoefficients {
    pub linear: f32,
    pub angular: f32,
}

/// Snapshot of a body under the pointer, as reported by the physics query.
///
/// The controller never owns the body; it keeps only the `entity` id while a
/// drag is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraggableBody {
    pub entity: Entity,
    /// World-space centre of mass.
    pub position: Vec2,
    pub drag: DragCoefficients,
    /// Kinematic and fixed bodies are immovable and never draggable.
    pub kinematic: bool,
}

impl DraggableBody {
    #[inline]
    pub fn is_draggable(&self) -> bool {
        !self.kinematic
    }
}

/// Result of a point query under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point.
    pub point: Vec2,
    /// The hit point expressed in the body's local frame.
    pub local_point: Vec2,
    pub body: DraggableBody,
}

// ── Spring ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub stiffness: f32,
    pub damping: f32,
    pub rest_length: f32,
}

// ── Session ────────────────────────────────────────────────────────────────────

/// Where the controller is in the drag lifecycle.
///
/// `Attaching` and `Releasing` are transient: they are entered and left within
/// the same tick, so callers only ever observe `Idle` or `Dragging` between
/// updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Attaching,
    Dragging,
    Releasing,
}

/// One continuous pointer-held interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub body: Entity,
    /// Coefficients restored on release.
    pub original_drag: DragCoefficients,
    /// Current world-space target of the spring's free end.
    pub target: Vec2,
}

// ── Tunables ───────────────────────────────────────────────────────────────────

/// Behaviour bound to right-click and double-click.
///
/// Exactly one is active; the two are never combined in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickAction {
    /// Show the current points total floating above the clicked body.
    #[default]
    Inspect,
    /// Push the clicked body away from the click point.
    Explode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTunables {
    pub spring: SpringParams,
    /// Damping applied while a body is held.
    pub held_drag: DragCoefficients,
    pub double_click_time: f32,
    pub click_action: ClickAction,
    pub explosion: ExplosionParams,
}

// ── Events ─────────────────────────────────────────────────────────────────────

/// Everything the controller wants the rest of the app to react to.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    /// A drag session attached to `body`; ragdoll takeover should begin.
    DragStarted { body: Entity },
    /// The session on `body` ended (the body may no longer exist).
    DragEnded { body: Entity },
    /// An explode action fired at `at`; spawn the cosmetic burst there.
    Exploded { body: Entity, at: Vec2 },
    /// An inspect action asked to show `points` above `anchor` (world space).
    ShowPoints { anchor: Vec2, points: u64 },
}
