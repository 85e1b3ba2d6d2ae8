//! Scene: the arena, the pet, and a handful of toy blocks.

use crate::collision::PreImpactVelocity;
use crate::config::PetConfig;
use crate::constants::{ARENA_HALF_HEIGHT, ARENA_HALF_WIDTH, GRAVITY, PET_RADIUS, TOY_COUNT};
use crate::particles::circle_mesh;
use crate::ragdoll::{AnimationDriver, RagdollState};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

const WALL_THICKNESS: f32 = 40.0;
const TOY_SIZE: f32 = 48.0;

/// The animated pet.
#[derive(Component)]
pub struct Pet;

/// Any body whose impacts score points.
#[derive(Component)]
pub struct Toy;

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Configure Rapier physics: downward gravity in pixel units.
pub fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::new(0.0, GRAVITY);
    }
}

pub fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    spawn_arena(&mut commands);
    spawn_ledge(&mut commands, &mut meshes, &mut materials);
    spawn_pet(&mut commands, &mut meshes, &mut materials);

    let mut rng = rand::thread_rng();
    let toy_mesh = meshes.add(Rectangle::new(TOY_SIZE, TOY_SIZE));
    for i in 0..TOY_COUNT {
        let x = -ARENA_HALF_WIDTH * 0.6 + i as f32 * (ARENA_HALF_WIDTH * 1.2 / TOY_COUNT as f32);
        let y = rng.gen_range(0.0..ARENA_HALF_HEIGHT * 0.5);
        let hue = rng.gen_range(0.0..360.0);
        commands.spawn((
            (
                Transform::from_translation(Vec3::new(x, y, 0.1)),
                Mesh2d(toy_mesh.clone()),
                MeshMaterial2d(materials.add(ColorMaterial::from_color(Color::hsl(hue, 0.6, 0.55)))),
                Toy,
                RigidBody::Dynamic,
            ),
            (
                Collider::cuboid(TOY_SIZE * 0.5, TOY_SIZE * 0.5),
                Restitution::coefficient(0.4),
                Friction::coefficient(0.6),
                Velocity::zero(),
                PreImpactVelocity::default(),
                Damping {
                    linear_damping: 0.1,
                    angular_damping: 0.1,
                },
                ActiveEvents::COLLISION_EVENTS,
            ),
        ));
    }
    println!("Spawned pet and {} toys", TOY_COUNT);
}

fn spawn_arena(commands: &mut Commands) {
    let walls = [
        (Vec2::new(0.0, -ARENA_HALF_HEIGHT), Vec2::new(ARENA_HALF_WIDTH, WALL_THICKNESS * 0.5)),
        (Vec2::new(0.0, ARENA_HALF_HEIGHT), Vec2::new(ARENA_HALF_WIDTH, WALL_THICKNESS * 0.5)),
        (Vec2::new(-ARENA_HALF_WIDTH, 0.0), Vec2::new(WALL_THICKNESS * 0.5, ARENA_HALF_HEIGHT)),
        (Vec2::new(ARENA_HALF_WIDTH, 0.0), Vec2::new(WALL_THICKNESS * 0.5, ARENA_HALF_HEIGHT)),
    ];
    for (center, half) in walls {
        commands.spawn((
            Transform::from_translation(center.extend(0.0)),
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y),
            Friction::coefficient(0.8),
        ));
    }
}

/// A kinematic shelf: solid to the pet but never draggable.
fn spawn_ledge(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) {
    let size = Vec2::new(220.0, 18.0);
    commands.spawn((
        Transform::from_translation(Vec3::new(ARENA_HALF_WIDTH * 0.45, 0.0, 0.05)),
        Mesh2d(meshes.add(Rectangle::new(size.x, size.y))),
        MeshMaterial2d(materials.add(ColorMaterial::from_color(Color::srgb(0.35, 0.35, 0.42)))),
        RigidBody::KinematicPositionBased,
        Collider::cuboid(size.x * 0.5, size.y * 0.5),
    ));
}

fn spawn_pet(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) {
    commands.spawn((
        (
            Transform::from_translation(Vec3::new(0.0, 0.0, 0.2)),
            Mesh2d(meshes.add(circle_mesh(PET_RADIUS, 32))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(Color::srgb(0.95, 0.6, 0.3)))),
            Pet,
            Toy,
            RagdollState::default(),
            AnimationDriver::default(),
        ),
        (
            RigidBody::Dynamic,
            Collider::ball(PET_RADIUS),
            Restitution::coefficient(0.3),
            Friction::coefficient(0.7),
            Velocity::zero(),
            PreImpactVelocity::default(),
            Damping {
                linear_damping: 0.2,
                angular_damping: 0.5,
            },
            ActiveEvents::COLLISION_EVENTS,
            Sleeping::disabled(),
        ),
    ));
}

// ── Idle animation ────────────────────────────────────────────────────────────

/// `true` when the animation clock crossed a multiple of `period` between
/// `before` and `after`.
#[inline]
pub fn hop_due(before: f32, after: f32, period: f32) -> bool {
    if period <= 0.0 {
        return false;
    }
    (after / period).floor() > (before / period).floor()
}

/// While animated, the pet hops in place on a fixed rhythm.
pub fn idle_animation_system(
    time: Res<Time>,
    config: Res<PetConfig>,
    mut pets: Query<(&mut AnimationDriver, &mut Velocity), With<Pet>>,
) {
    let dt = time.delta_secs();
    for (mut driver, mut velocity) in pets.iter_mut() {
        if !driver.enabled {
            continue;
        }
        let before = driver.clock;
        driver.clock += dt;
        if hop_due(before, driver.clock, config.idle_hop_period) {
            velocity.linvel.y = config.idle_hop_speed;
            velocity.angvel *= 0.5;
        }
    }
}
