//! Particle effects: collision sparks and explosion bursts.
//!
//! ## Design
//!
//! Particles are lightweight ECS entities with a [`Particle`] component that
//! stores physics state (velocity, age, colour).  A two-system pipeline handles
//! them:
//!
//! | System                        | Schedule | Purpose                                      |
//! |-------------------------------|----------|----------------------------------------------|
//! | `attach_particle_mesh_system` | Update   | Attach `Mesh2d` to freshly-spawned particles |
//! | `particle_update_system`      | Update   | Move, fade, shrink, despawn expired ones     |
//!
//! Spawn helpers only take `&mut Commands`; the mesh arrives one frame later
//! from `attach_particle_mesh_system`.  One shared circle mesh
//! ([`ParticleMesh`]) serves every particle, while each gets its own
//! [`ColorMaterial`] so alpha can fade individually.

use crate::config::PetConfig;
use crate::interaction::InteractionEvent;
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use rand::Rng;

// ── Resources ────────────────────────────────────────────────────────────────

/// Shared circle mesh used by all particle entities (created once at startup).
#[derive(Resource)]
pub struct ParticleMesh(pub Handle<Mesh>);

// ── Component ────────────────────────────────────────────────────────────────

/// Which effect a particle belongs to.  Spark caps count only `Spark`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Spark,
    Explosion,
}

/// Short-lived visual particle entity.
#[derive(Component)]
pub struct Particle {
    pub kind: ParticleKind,
    /// World-space velocity (px/s).
    pub velocity: Vec2,
    /// Time alive so far (s).
    pub age: f32,
    /// Total lifetime (s); entity is despawned when `age >= lifetime`.
    pub lifetime: f32,
    /// Shrink to nothing over the lifetime as well as fading.
    pub shrink: bool,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// `None` until `attach_particle_mesh_system` runs.
    pub material: Option<Handle<ColorMaterial>>,
}

impl Particle {
    /// Alpha and scale at the current age.
    pub fn fade(&self) -> (f32, f32) {
        let t = (self.age / self.lifetime).clamp(0.0, 1.0);
        let alpha = (1.0 - t).powi(2);
        let scale = if self.shrink { 1.0 - t } else { 1.0 };
        (alpha, scale)
    }
}

// ── Startup system ────────────────────────────────────────────────────────────

pub fn init_particle_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(circle_mesh(3.0, 8));
    commands.insert_resource(ParticleMesh(handle));
}

// ── Update systems ────────────────────────────────────────────────────────────

/// Attach `Mesh2d` + `MeshMaterial2d` to every newly-spawned [`Particle`].
pub fn attach_particle_mesh_system(
    mut commands: Commands,
    particle_mesh: Res<ParticleMesh>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Particle), Added<Particle>>,
) {
    for (entity, mut particle) in query.iter_mut() {
        let mat_handle = materials.add(ColorMaterial::from_color(Color::srgba(
            particle.r, particle.g, particle.b, 1.0,
        )));
        particle.material = Some(mat_handle.clone());
        commands
            .entity(entity)
            .insert((Mesh2d(particle_mesh.0.clone()), MeshMaterial2d(mat_handle)));
    }
}

/// Advance all particles: translate by velocity, fade alpha quadratically,
/// shrink explosion debris, and despawn expired ones.
pub fn particle_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Transform, &mut Particle)>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut particle) in query.iter_mut() {
        particle.age += dt;

        if particle.age >= particle.lifetime {
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation.x += particle.velocity.x * dt;
        transform.translation.y += particle.velocity.y * dt;

        let (alpha, scale) = particle.fade();
        transform.scale = Vec3::splat(scale);

        if let Some(ref handle) = particle.material {
            if let Some(mat) = materials.get_mut(handle) {
                mat.color = Color::srgba(particle.r, particle.g, particle.b, alpha);
            }
        }
    }
}

/// Throw an explosion burst wherever an explode click landed.
pub fn explosion_burst_system(
    mut commands: Commands,
    mut interactions: MessageReader<InteractionEvent>,
    config: Res<PetConfig>,
) {
    for event in interactions.read() {
        if let InteractionEvent::Exploded { at, .. } = *event {
            spawn_explosion_burst(&mut commands, at, config.explosion_burst_count);
        }
    }
}

// ── Public spawn helpers ──────────────────────────────────────────────────────

/// How many sparks may still be spawned without exceeding `cap` live ones.
#[inline]
pub fn spark_budget(live: usize, requested: u32, cap: u32) -> u32 {
    let room = (cap as usize).saturating_sub(live) as u32;
    requested.min(room)
}

/// Spawn `count` yellow sparks radiating from a contact point.
pub fn spawn_collision_sparks(commands: &mut Commands, pos: Vec2, count: u32) {
    let mut rng = rand::thread_rng();

    for _ in 0..count {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let speed = rng.gen_range(80.0_f32..200.0_f32);
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;

        let r = rng.gen_range(0.95_f32..1.0_f32);
        let g = rng.gen_range(0.85_f32..1.0_f32);
        let b = rng.gen_range(0.10_f32..0.35_f32);

        let lifetime = rng.gen_range(0.25_f32..0.50_f32);

        commands.spawn((
            Particle {
                kind: ParticleKind::Spark,
                velocity,
                age: 0.0,
                lifetime,
                shrink: false,
                r,
                g,
                b,
                material: None,
            },
            Transform::from_translation(pos.extend(0.9)),
            Visibility::default(),
        ));
    }
}

/// Spawn an orange burst at the click point of an explosion.
pub fn spawn_explosion_burst(commands: &mut Commands, pos: Vec2, count: u32) {
    let mut rng = rand::thread_rng();

    for _ in 0..count {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let speed = rng.gen_range(150.0_f32..400.0_f32);
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;

        let r = 1.0;
        let g = rng.gen_range(0.35_f32..0.65_f32);
        let b = rng.gen_range(0.0_f32..0.15_f32);

        let lifetime = rng.gen_range(0.40_f32..0.80_f32);
        let offset = Vec2::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0));

        commands.spawn((
            Particle {
                kind: ParticleKind::Explosion,
                velocity,
                age: 0.0,
                lifetime,
                shrink: true,
                r,
                g,
                b,
                material: None,
            },
            Transform::from_translation((pos + offset).extend(0.9)),
            Visibility::default(),
        ));
    }
}

// ── Mesh helper ───────────────────────────────────────────────────────────────

/// Build a filled circle mesh approximated by an `n`-sided regular polygon.
///
/// Uses a triangle fan from the centre: `(0, i, i+1 mod n)`.
pub fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let x = radius * angle.cos();
        let y = radius * angle.sin();
        positions.push([x, y, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([x / (2.0 * radius) + 0.5, y / (2.0 * radius) + 0.5]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        let v1 = i + 1;
        let v2 = (i + 1) % n as u32 + 1;
        indices.extend_from_slice(&[0, v1, v2]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
