//! The drag-and-release interaction state machine.
//!
//! [`DragController`] is engine-agnostic: it talks to the physics world only
//! through the [`PhysicsQuery`], [`SpringConstraint`], and [`BodyControl`]
//! traits and reports everything else as [`InteractionEvent`]s.  The Bevy
//! adapter in [`super::ecs`] implements the traits over Rapier and forwards
//! the events as messages.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──press on dynamic body──▶ Attaching ──▶ Dragging ──release──▶ Releasing ──▶ Idle
//!                                                  │ ▲
//!                                                  └─┘ held: move spring anchor
//! ```
//!
//! The spring constraint is allocated lazily on the first attach and then
//! reused for every later session.

use super::explosion::explosion_impulse;
use super::state::{
    ClickAction, DragCoefficients, DragPhase, DragSession, DragTunables, InteractionEvent, RayHit,
    SpringParams,
};
use crate::input::{ClickState, InputAction, InputSample};
use crate::points::PointsLedger;
use bevy::prelude::*;
use rand::Rng;

// ── Collaborators ─────────────────────────────────────────────────────────────

/// Point query against the physics world.
pub trait PhysicsQuery {
    /// The body under `point` (world space), if any collider is there.
    fn raycast(&self, point: Vec2) -> Option<RayHit>;
}

/// The single reusable spring joint that pulls a body toward the pointer.
pub trait SpringConstraint {
    fn is_allocated(&self) -> bool;
    fn allocate(&mut self);
    /// Pin the free end at `anchor` and connect the other end to `local_point`
    /// in `body`'s frame.
    fn attach(&mut self, anchor: Vec2, body: Entity, local_point: Vec2, spring: SpringParams);
    fn move_anchor(&mut self, point: Vec2);
    /// Disconnect from the current body; the constraint itself stays allocated.
    fn detach(&mut self);
}

/// Mutations the controller makes on bodies it does not own.
pub trait BodyControl {
    fn contains(&self, body: Entity) -> bool;
    /// Returns `false` if the body no longer exists.
    fn set_drag(&mut self, body: Entity, drag: DragCoefficients) -> bool;
    fn apply_impulse(&mut self, body: Entity, impulse: Vec2, torque: f32);
}

// ── Controller ────────────────────────────────────────────────────────────────

#[derive(Resource, Debug, Clone)]
pub struct DragController {
    tunables: DragTunables,
    clicks: ClickState,
    phase: DragPhase,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(tunables: DragTunables) -> Self {
        Self {
            tunables,
            clicks: ClickState::default(),
            phase: DragPhase::Idle,
            session: None,
        }
    }

    #[inline]
    pub fn tunables(&self) -> &DragTunables {
        &self.tunables
    }

    #[inline]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[inline]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    #[inline]
    pub fn clicks(&self) -> &ClickState {
        &self.clicks
    }

    /// Advance the state machine by one input tick.
    ///
    /// Click handling follows [`ClickState::classify`]; afterwards an active
    /// session either follows the pointer (button held) or is released.  The
    /// session step is not a click check, so a right-click while dragging
    /// still keeps the held body following the pointer.
    pub fn update<W, R>(
        &mut self,
        sample: &InputSample,
        world: &mut W,
        ledger: Option<&PointsLedger>,
        rng: &mut R,
    ) -> Vec<InteractionEvent>
    where
        W: PhysicsQuery + SpringConstraint + BodyControl,
        R: Rng + ?Sized,
    {
        let mut events = Vec::new();

        let action = self.clicks.classify(
            sample,
            self.tunables.double_click_time,
            self.session.is_some(),
        );
        match action {
            InputAction::RightClick | InputAction::DoubleLeftClick => {
                self.click_action(sample, world, ledger, rng, &mut events);
            }
            InputAction::DragStart => self.begin_drag(sample, world, &mut events),
            InputAction::DragContinue | InputAction::NoAction => {}
        }

        self.service_session(sample, world, &mut events);
        events
    }

    fn begin_drag<W>(&mut self, sample: &InputSample, world: &mut W, events: &mut Vec<InteractionEvent>)
    where
        W: PhysicsQuery + SpringConstraint + BodyControl,
    {
        let Some(pointer) = sample.pointer else {
            return;
        };
        let Some(hit) = world.raycast(pointer) else {
            return;
        };
        if !hit.body.is_draggable() {
            debug!("Ignoring press on immovable body {:?}", hit.body.entity);
            return;
        }

        if self.session.is_some() {
            self.release(world, events);
        }

        // Idle → Attaching
        self.phase = DragPhase::Attaching;
        if !world.is_allocated() {
            world.allocate();
        }
        world.attach(hit.point, hit.body.entity, hit.local_point, self.tunables.spring);

        // Attaching → Dragging
        world.set_drag(hit.body.entity, self.tunables.held_drag);
        self.session = Some(DragSession {
            body: hit.body.entity,
            original_drag: hit.body.drag,
            target: hit.point,
        });
        self.phase = DragPhase::Dragging;
        events.push(InteractionEvent::DragStarted {
            body: hit.body.entity,
        });
    }

    fn service_session<W>(&mut self, sample: &InputSample, world: &mut W, events: &mut Vec<InteractionEvent>)
    where
        W: SpringConstraint + BodyControl,
    {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if !sample.left_held || !world.contains(session.body) {
            self.release(world, events);
            return;
        }

        if let Some(pointer) = sample.pointer {
            session.target = pointer;
            world.move_anchor(pointer);
        }
    }

    fn release<W>(&mut self, world: &mut W, events: &mut Vec<InteractionEvent>)
    where
        W: SpringConstraint + BodyControl,
    {
        let Some(session) = self.session.take() else {
            return;
        };

        // Dragging → Releasing
        self.phase = DragPhase::Releasing;
        if world.contains(session.body) {
            world.set_drag(session.body, session.original_drag);
        } else {
            debug!(
                "Dragged body {:?} vanished mid-drag; skipping damping restore",
                session.body
            );
        }
        world.detach();
        events.push(InteractionEvent::DragEnded { body: session.body });

        // Releasing → Idle
        self.phase = DragPhase::Idle;
    }

    fn click_action<W, R>(
        &mut self,
        sample: &InputSample,
        world: &mut W,
        ledger: Option<&PointsLedger>,
        rng: &mut R,
        events: &mut Vec<InteractionEvent>,
    ) where
        W: PhysicsQuery + BodyControl,
        R: Rng + ?Sized,
    {
        let Some(pointer) = sample.pointer else {
            return;
        };
        let Some(hit) = world.raycast(pointer).filter(|hit| hit.body.is_draggable()) else {
            debug!("Click at {pointer:?} didn't hit a movable body");
            return;
        };

        match self.tunables.click_action {
            ClickAction::Explode => {
                let impulse =
                    explosion_impulse(pointer, hit.body.position, &self.tunables.explosion, rng);
                world.apply_impulse(hit.body.entity, impulse.linear, impulse.torque);
                events.push(InteractionEvent::Exploded {
                    body: hit.body.entity,
                    at: pointer,
                });
            }
            ClickAction::Inspect => match ledger {
                Some(ledger) => {
                    let points = ledger.get();
                    info!("Inspected {:?}; showing points: {points}", hit.body.entity);
                    events.push(InteractionEvent::ShowPoints {
                        anchor: hit.body.position,
                        points,
                    });
                }
                None => warn!("Inspect click ignored: no points ledger"),
            },
        }
    }
}
