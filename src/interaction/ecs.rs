//! Bevy adapter for the drag controller.
//!
//! [`InteractionWorld`] is a [`SystemParam`] that implements the controller's
//! collaborator traits over Rapier:
//!
//! | Trait               | Backed by                                                   |
//! |---------------------|-------------------------------------------------------------|
//! | [`PhysicsQuery`]    | `intersect_point` on the default Rapier context             |
//! | [`SpringConstraint`]| one kinematic [`DragAnchorBody`] carrying an `ImpulseJoint` |
//! | [`BodyControl`]     | `Damping` / `ExternalImpulse` on the hit body               |
//!
//! [`interaction_input_system`] samples the mouse, runs the controller, and
//! forwards its events as [`InteractionEvent`] messages.

use super::controller::{BodyControl, DragController, PhysicsQuery, SpringConstraint};
use super::state::{DragCoefficients, DraggableBody, InteractionEvent, RayHit, SpringParams};
use crate::input::InputSample;
use crate::points::PointsLedger;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier2d::prelude::*;

// ── Components / resources ────────────────────────────────────────────────────

/// Marker for the kinematic body at the pointer end of the drag spring.
#[derive(Component)]
pub struct DragAnchorBody;

/// The lazily-spawned spring anchor entity, reused across drag sessions.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct DragAnchor(pub Option<Entity>);

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `point` expressed in the body's local frame.
pub fn body_local_point(transform: &GlobalTransform, point: Vec2) -> Vec2 {
    transform
        .affine()
        .inverse()
        .transform_point3(point.extend(0.0))
        .truncate()
}

/// Only dynamic bodies react to the drag spring.
#[inline]
pub fn is_immovable(body: &RigidBody) -> bool {
    !matches!(body, RigidBody::Dynamic)
}

// ── Collaborator adapter ──────────────────────────────────────────────────────

type BodyItem = (
    &'static RigidBody,
    &'static GlobalTransform,
    Option<&'static mut Damping>,
);

/// Everything the controller may touch in one tick.
#[derive(SystemParam)]
pub struct InteractionWorld<'w, 's> {
    commands: Commands<'w, 's>,
    rapier: ReadRapierContext<'w, 's>,
    bodies: Query<'w, 's, BodyItem, Without<DragAnchorBody>>,
    anchor: ResMut<'w, DragAnchor>,
}

impl PhysicsQuery for InteractionWorld<'_, '_> {
    fn raycast(&self, point: Vec2) -> Option<RayHit> {
        let Ok(rapier) = self.rapier.single() else {
            return None;
        };

        let mut hit_entity = None;
        rapier.intersect_point(
            point,
            QueryFilter::default().exclude_sensors(),
            |entity| {
                hit_entity = Some(entity);
                false
            },
        );

        // A collider without a rigid body on the same entity is not actionable.
        let entity = hit_entity?;
        let (body, transform, damping) = self.bodies.get(entity).ok()?;

        Some(RayHit {
            point,
            local_point: body_local_point(transform, point),
            body: DraggableBody {
                entity,
                position: transform.translation().truncate(),
                drag: damping
                    .map(|d| DragCoefficients {
                        linear: d.linear_damping,
                        angular: d.angular_damping,
                    })
                    .unwrap_or_default(),
                kinematic: is_immovable(body),
            },
        })
    }
}

impl SpringConstraint for InteractionWorld<'_, '_> {
    fn is_allocated(&self) -> bool {
        self.anchor.0.is_some()
    }

    fn allocate(&mut self) {
        let entity = self
            .commands
            .spawn((
                DragAnchorBody,
                RigidBody::KinematicPositionBased,
                Transform::default(),
            ))
            .id();
        self.anchor.0 = Some(entity);
        debug!("Spawned drag anchor {entity:?}");
    }

    fn attach(&mut self, anchor: Vec2, body: Entity, local_point: Vec2, spring: SpringParams) {
        let Some(entity) = self.anchor.0 else {
            return;
        };
        let joint = SpringJointBuilder::new(spring.rest_length, spring.stiffness, spring.damping)
            .local_anchor1(local_point);
        self.commands.entity(entity).insert((
            Transform::from_translation(anchor.extend(0.0)),
            ImpulseJoint::new(body, joint),
        ));
    }

    fn move_anchor(&mut self, point: Vec2) {
        if let Some(entity) = self.anchor.0 {
            self.commands
                .entity(entity)
                .insert(Transform::from_translation(point.extend(0.0)));
        }
    }

    fn detach(&mut self) {
        if let Some(entity) = self.anchor.0 {
            self.commands.entity(entity).remove::<ImpulseJoint>();
        }
    }
}

impl BodyControl for InteractionWorld<'_, '_> {
    fn contains(&self, body: Entity) -> bool {
        self.bodies.contains(body)
    }

    fn set_drag(&mut self, body: Entity, drag: DragCoefficients) -> bool {
        match self.bodies.get_mut(body) {
            Ok((_, _, Some(mut damping))) => {
                damping.linear_damping = drag.linear;
                damping.angular_damping = drag.angular;
                true
            }
            Ok((_, _, None)) => {
                self.commands.entity(body).insert(Damping {
                    linear_damping: drag.linear,
                    angular_damping: drag.angular,
                });
                true
            }
            Err(_) => false,
        }
    }

    fn apply_impulse(&mut self, body: Entity, impulse: Vec2, torque: f32) {
        self.commands.entity(body).insert(ExternalImpulse {
            impulse,
            torque_impulse: torque,
        });
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Convert the primary window's cursor into world space via the 2D camera.
fn pointer_world(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera2d>>,
) -> Option<Vec2> {
    let cursor = windows.single().ok()?.cursor_position()?;
    let (camera, camera_transform) = cameras.single().ok()?;
    camera.viewport_to_world_2d(camera_transform, cursor).ok()
}

/// Sample the mouse, advance the [`DragController`], and publish its events.
#[allow(clippy::too_many_arguments)]
pub fn interaction_input_system(
    time: Res<Time>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut controller: ResMut<DragController>,
    mut world: InteractionWorld,
    ledger: Option<Res<PointsLedger>>,
    mut interactions: MessageWriter<InteractionEvent>,
) {
    let sample = InputSample {
        time: time.elapsed_secs_f64(),
        pointer: pointer_world(&windows, &cameras),
        left_pressed: mouse.just_pressed(MouseButton::Left),
        left_held: mouse.pressed(MouseButton::Left),
        right_pressed: mouse.just_pressed(MouseButton::Right),
    };

    let events = controller.update(
        &sample,
        &mut world,
        ledger.as_deref(),
        &mut rand::thread_rng(),
    );
    for event in events {
        interactions.write(event);
    }
}
