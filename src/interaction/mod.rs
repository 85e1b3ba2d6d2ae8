//! Pointer interaction: drag-and-release with a spring joint, plus the
//! right-click / double-click action.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | Body snapshots, drag sessions, tunables, [`InteractionEvent`] |
//! | [`controller`] | [`DragController`] state machine and its collaborator traits |
//! | [`explosion`] | Impulse maths for the explode action |
//! | [`ecs`] | Rapier-backed collaborators and the per-frame input system |

pub mod controller;
pub mod ecs;
pub mod explosion;
pub mod state;

pub use controller::{BodyControl, DragController, PhysicsQuery, SpringConstraint};
pub use ecs::{
    body_local_point, interaction_input_system, is_immovable, DragAnchor, DragAnchorBody,
    InteractionWorld,
};
pub use explosion::{explosion_impulse, ExplosionImpulse, ExplosionParams};
pub use state::{
    ClickAction, DragCoefficients, DragPhase, DragSession, DragTunables, DraggableBody,
    InteractionEvent, RayHit, SpringParams,
};
