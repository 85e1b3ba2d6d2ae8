//! Drag controller behaviour against an in-memory physics world.
//!
//! `FakeWorld` implements the controller's collaborator traits with plain
//! maps, so these run without Rapier or a Bevy app.
//!
//! Covered scenarios:
//! 1. Kinematic bodies are never grabbed.
//! 2. Held damping is applied and the original restored on release.
//! 3. A body despawned mid-drag releases cleanly without restoring damping.
//! 4. The spring constraint is allocated once and reused.
//! 5. Double-click and right-click run the configured click action.

use std::collections::HashMap;

use bevy::prelude::*;
use pet_toy::input::InputSample;
use pet_toy::interaction::{
    BodyControl, ClickAction, DragCoefficients, DragController, DragPhase, DragTunables,
    DraggableBody, ExplosionParams, InteractionEvent, PhysicsQuery, RayHit, SpringConstraint,
    SpringParams,
};
use pet_toy::points::{LedgerSettings, PointsLedger};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Fake physics world ────────────────────────────────────────────────────────

const BODY_RADIUS: f32 = 50.0;

struct FakeBody {
    position: Vec2,
    drag: DragCoefficients,
    kinematic: bool,
}

#[derive(Default)]
struct FakeWorld {
    ids: World,
    bodies: HashMap<Entity, FakeBody>,
    allocations: u32,
    attached: Option<(Entity, Vec2, SpringParams)>,
    anchor: Option<Vec2>,
    impulses: Vec<(Entity, Vec2, f32)>,
}

impl FakeWorld {
    fn spawn(&mut self, position: Vec2, drag: DragCoefficients, kinematic: bool) -> Entity {
        let entity = self.ids.spawn_empty().id();
        self.bodies.insert(
            entity,
            FakeBody {
                position,
                drag,
                kinematic,
            },
        );
        entity
    }

    fn drag_of(&self, entity: Entity) -> DragCoefficients {
        self.bodies[&entity].drag
    }
}

impl PhysicsQuery for FakeWorld {
    fn raycast(&self, point: Vec2) -> Option<RayHit> {
        self.bodies
            .iter()
            .find(|(_, body)| body.position.distance(point) <= BODY_RADIUS)
            .map(|(&entity, body)| RayHit {
                point,
                local_point: point - body.position,
                body: DraggableBody {
                    entity,
                    position: body.position,
                    drag: body.drag,
                    kinematic: body.kinematic,
                },
            })
    }
}

impl SpringConstraint for FakeWorld {
    fn is_allocated(&self) -> bool {
        self.allocations > 0
    }

    fn allocate(&mut self) {
        self.allocations += 1;
    }

    fn attach(&mut self, anchor: Vec2, body: Entity, local_point: Vec2, spring: SpringParams) {
        assert!(self.is_allocated(), "attach before allocate");
        self.anchor = Some(anchor);
        self.attached = Some((body, local_point, spring));
    }

    fn move_anchor(&mut self, point: Vec2) {
        self.anchor = Some(point);
    }

    fn detach(&mut self) {
        self.attached = None;
    }
}

impl BodyControl for FakeWorld {
    fn contains(&self, body: Entity) -> bool {
        self.bodies.contains_key(&body)
    }

    fn set_drag(&mut self, body: Entity, drag: DragCoefficients) -> bool {
        match self.bodies.get_mut(&body) {
            Some(b) => {
                b.drag = drag;
                true
            }
            None => false,
        }
    }

    fn apply_impulse(&mut self, body: Entity, impulse: Vec2, torque: f32) {
        self.impulses.push((body, impulse, torque));
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

const HELD: DragCoefficients = DragCoefficients {
    linear: 10.0,
    angular: 5.0,
};
const RESTING: DragCoefficients = DragCoefficients {
    linear: 0.5,
    angular: 0.2,
};

fn tunables(click_action: ClickAction) -> DragTunables {
    DragTunables {
        spring: SpringParams {
            stiffness: 280.0,
            damping: 180.0,
            rest_length: 20.0,
        },
        held_drag: HELD,
        double_click_time: 0.3,
        click_action,
        explosion: ExplosionParams {
            force: 1000.0,
            max_torque: 40.0,
        },
    }
}

fn press(time: f64, at: Vec2) -> InputSample {
    InputSample {
        time,
        pointer: Some(at),
        left_pressed: true,
        left_held: true,
        right_pressed: false,
    }
}

fn hold(time: f64, at: Vec2) -> InputSample {
    InputSample {
        time,
        pointer: Some(at),
        left_pressed: false,
        left_held: true,
        right_pressed: false,
    }
}

fn release(time: f64, at: Vec2) -> InputSample {
    InputSample {
        time,
        pointer: Some(at),
        ..Default::default()
    }
}

fn right_click(time: f64, at: Vec2) -> InputSample {
    InputSample {
        time,
        pointer: Some(at),
        right_pressed: true,
        ..Default::default()
    }
}

fn quiet_ledger(points: u64) -> PointsLedger {
    let mut ledger = PointsLedger::new(
        LedgerSettings {
            log_changes: false,
            ..LedgerSettings::default()
        },
        None,
    );
    ledger.add(points);
    ledger
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn kinematic_body_is_never_grabbed() {
    let mut world = FakeWorld::default();
    let ledge = world.spawn(Vec2::ZERO, RESTING, true);
    let mut controller = DragController::new(tunables(ClickAction::Inspect));
    let mut rng = StdRng::seed_from_u64(1);

    let events = controller.update(&press(1.0, Vec2::ZERO), &mut world, None, &mut rng);

    assert!(events.is_empty());
    assert!(controller.session().is_none());
    assert_eq!(controller.phase(), DragPhase::Idle);
    assert_eq!(world.allocations, 0);
    assert_eq!(world.drag_of(ledge), RESTING);
}

#[test]
fn drag_applies_and_restores_damping() {
    let mut world = FakeWorld::default();
    let pet = world.spawn(Vec2::new(100.0, 0.0), RESTING, false);
    let mut controller = DragController::new(tunables(ClickAction::Inspect));
    let mut rng = StdRng::seed_from_u64(1);

    let grab = Vec2::new(110.0, 5.0);
    let events = controller.update(&press(1.0, grab), &mut world, None, &mut rng);
    assert_eq!(events, vec![InteractionEvent::DragStarted { body: pet }]);
    assert_eq!(controller.phase(), DragPhase::Dragging);
    assert_eq!(world.drag_of(pet), HELD);

    let (body, local, spring) = world.attached.expect("spring attached");
    assert_eq!(body, pet);
    assert_eq!(local, Vec2::new(10.0, 5.0));
    assert_eq!(spring.rest_length, 20.0);
    assert_eq!(world.anchor, Some(grab));

    let target = Vec2::new(300.0, 200.0);
    let events = controller.update(&hold(1.1, target), &mut world, None, &mut rng);
    assert!(events.is_empty());
    assert_eq!(world.anchor, Some(target));
    assert_eq!(controller.session().map(|s| s.target), Some(target));

    let events = controller.update(&release(1.2, target), &mut world, None, &mut rng);
    assert_eq!(events, vec![InteractionEvent::DragEnded { body: pet }]);
    assert_eq!(controller.phase(), DragPhase::Idle);
    assert!(controller.session().is_none());
    assert!(world.attached.is_none());
    assert_eq!(world.drag_of(pet), RESTING);
}

#[test]
fn body_despawned_mid_drag_releases_cleanly() {
    let mut world = FakeWorld::default();
    let pet = world.spawn(Vec2::ZERO, RESTING, false);
    let mut controller = DragController::new(tunables(ClickAction::Inspect));
    let mut rng = StdRng::seed_from_u64(1);

    controller.update(&press(1.0, Vec2::ZERO), &mut world, None, &mut rng);
    world.bodies.remove(&pet);

    let events = controller.update(&hold(1.1, Vec2::ONE), &mut world, None, &mut rng);
    assert_eq!(events, vec![InteractionEvent::DragEnded { body: pet }]);
    assert_eq!(controller.phase(), DragPhase::Idle);
    assert!(world.attached.is_none());
}

#[test]
fn spring_constraint_is_allocated_once() {
    let mut world = FakeWorld::default();
    world.spawn(Vec2::ZERO, RESTING, false);
    let mut controller = DragController::new(tunables(ClickAction::Inspect));
    let mut rng = StdRng::seed_from_u64(1);

    controller.update(&press(1.0, Vec2::ZERO), &mut world, None, &mut rng);
    controller.update(&release(1.1, Vec2::ZERO), &mut world, None, &mut rng);
    controller.update(&press(2.0, Vec2::ZERO), &mut world, None, &mut rng);
    controller.update(&release(2.1, Vec2::ZERO), &mut world, None, &mut rng);

    assert_eq!(world.allocations, 1);
}

#[test]
fn double_click_shows_points() {
    let mut world = FakeWorld::default();
    let position = Vec2::new(-40.0, 20.0);
    world.spawn(position, RESTING, false);
    let mut controller = DragController::new(tunables(ClickAction::Inspect));
    let ledger = quiet_ledger(7);
    let mut rng = StdRng::seed_from_u64(1);

    controller.update(&press(1.0, position), &mut world, Some(&ledger), &mut rng);
    controller.update(&release(1.05, position), &mut world, Some(&ledger), &mut rng);
    let events = controller.update(&press(1.2, position), &mut world, Some(&ledger), &mut rng);

    assert_eq!(
        events,
        vec![InteractionEvent::ShowPoints {
            anchor: position,
            points: 7
        }]
    );
    assert!(controller.session().is_none(), "double-click must not start a drag");
    assert_eq!(controller.clicks().last_click, 0.0);
}

#[test]
fn slow_second_click_is_a_new_drag() {
    let mut world = FakeWorld::default();
    let pet = world.spawn(Vec2::ZERO, RESTING, false);
    let mut controller = DragController::new(tunables(ClickAction::Inspect));
    let mut rng = StdRng::seed_from_u64(1);

    controller.update(&press(1.0, Vec2::ZERO), &mut world, None, &mut rng);
    controller.update(&release(1.1, Vec2::ZERO), &mut world, None, &mut rng);
    let events = controller.update(&press(1.5, Vec2::ZERO), &mut world, None, &mut rng);

    assert_eq!(events, vec![InteractionEvent::DragStarted { body: pet }]);
}

#[test]
fn inspect_without_ledger_does_nothing() {
    let mut world = FakeWorld::default();
    world.spawn(Vec2::ZERO, RESTING, false);
    let mut controller = DragController::new(tunables(ClickAction::Inspect));
    let mut rng = StdRng::seed_from_u64(1);

    let events = controller.update(&right_click(1.0, Vec2::ZERO), &mut world, None, &mut rng);
    assert!(events.is_empty());
}

#[test]
fn right_click_explodes_away_from_pointer() {
    let mut world = FakeWorld::default();
    let center = Vec2::new(200.0, 0.0);
    let pet = world.spawn(center, RESTING, false);
    let mut controller = DragController::new(tunables(ClickAction::Explode));
    let mut rng = StdRng::seed_from_u64(42);

    let click = center - Vec2::new(20.0, 0.0);
    let events = controller.update(&right_click(1.0, click), &mut world, None, &mut rng);

    assert_eq!(events, vec![InteractionEvent::Exploded { body: pet, at: click }]);
    assert_eq!(world.impulses.len(), 1);
    let (body, impulse, torque) = world.impulses[0];
    assert_eq!(body, pet);
    assert!((impulse - Vec2::new(1000.0, 0.0)).length() < 1e-3);
    assert!(torque.abs() <= 40.0);
}

#[test]
fn click_on_empty_space_or_kinematic_does_nothing() {
    let mut world = FakeWorld::default();
    world.spawn(Vec2::ZERO, RESTING, true);
    let mut controller = DragController::new(tunables(ClickAction::Explode));
    let mut rng = StdRng::seed_from_u64(1);

    let on_kinematic = controller.update(&right_click(1.0, Vec2::ZERO), &mut world, None, &mut rng);
    let on_nothing =
        controller.update(&right_click(2.0, Vec2::new(900.0, 0.0)), &mut world, None, &mut rng);

    assert!(on_kinematic.is_empty());
    assert!(on_nothing.is_empty());
    assert!(world.impulses.is_empty());
}
