//! Collision-driven scoring.
//!
//! Every contact that starts involving a [`Toy`] and whose relative speed is
//! above `min_collision_velocity` earns points once and throws a spark burst
//! at the contact point.  Both participants get their ragdoll resume
//! countdown restarted.
//!
//! Rapier reports a contact only after the step that resolved it, so the
//! `Velocity` visible at that point is already the bounce.  Bodies carrying
//! [`PreImpactVelocity`] get their velocity snapshotted right before each
//! physics step and scoring reads that snapshot instead.

use crate::config::PetConfig;
use crate::particles::{spark_budget, spawn_collision_sparks, Particle, ParticleKind};
use crate::pet::Toy;
use crate::points::PointsLedger;
use crate::ragdoll::RagdollState;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Linear velocity as it was just before the last physics step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PreImpactVelocity(pub Vec2);

/// Snapshot `Velocity` into [`PreImpactVelocity`].  Runs in `PostUpdate`
/// ahead of `PhysicsSet::SyncBackend`.
pub fn record_pre_impact_velocity_system(
    mut bodies: Query<(&Velocity, &mut PreImpactVelocity)>,
) {
    for (velocity, mut pre) in &mut bodies {
        pre.0 = velocity.linvel;
    }
}

/// Speed used for scoring: the pre-step snapshot when present, else the
/// current velocity, else at rest.
#[inline]
pub fn impact_velocity(pre: Option<&PreImpactVelocity>, current: Option<&Velocity>) -> Vec2 {
    match (pre, current) {
        (Some(pre), _) => pre.0,
        (None, Some(current)) => current.linvel,
        (None, None) => Vec2::ZERO,
    }
}

/// Threshold and burst size for scoring impacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactScoring {
    /// Relative speed (px/s) that must be strictly exceeded.
    pub min_velocity: f32,
    /// Sparks requested per qualifying impact.
    pub burst_count: u32,
}

/// One contact between two colliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub relative_velocity: Vec2,
    /// First contact point in world space.
    pub contact: Vec2,
}

/// Visual response to a qualifying impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactBurst {
    pub at: Vec2,
    pub count: u32,
}

impl ImpactScoring {
    #[inline]
    pub fn qualifies(&self, impact: &Impact) -> bool {
        impact.relative_velocity.length() > self.min_velocity
    }

    /// Score `impact`: one ledger increment (when a ledger exists) and a
    /// burst at the contact point.  `None` for impacts that are too soft.
    pub fn score(&self, impact: &Impact, ledger: Option<&mut PointsLedger>) -> Option<ImpactBurst> {
        if !self.qualifies(impact) {
            return None;
        }
        if let Some(ledger) = ledger {
            ledger.add_for_collision();
        }
        Some(ImpactBurst {
            at: impact.contact,
            count: self.burst_count,
        })
    }
}

/// First solver contact between two colliders, if Rapier has one.
fn first_contact_point(rapier: &ReadRapierContext, e1: Entity, e2: Entity) -> Option<Vec2> {
    let context = rapier.single().ok()?;
    let pair = context.contact_pair(e1, e2)?;
    for manifold in pair.manifolds() {
        if let Some(contact) = manifold.solver_contact(0) {
            return Some(contact.point());
        }
    }
    None
}

/// Turn Rapier `CollisionEvent::Started` into points, sparks, and ragdoll
/// resume requests.
#[allow(clippy::too_many_arguments)]
pub fn impact_scoring_system(
    mut commands: Commands,
    mut collisions: MessageReader<CollisionEvent>,
    rapier: ReadRapierContext,
    toys: Query<(), With<Toy>>,
    bodies: Query<(&GlobalTransform, Option<&PreImpactVelocity>, Option<&Velocity>)>,
    mut ragdolls: Query<&mut RagdollState>,
    particles: Query<&Particle>,
    mut ledger: Option<ResMut<PointsLedger>>,
    config: Res<PetConfig>,
) {
    let scoring = config.impact_scoring();
    let mut live_sparks = particles
        .iter()
        .filter(|p| p.kind == ParticleKind::Spark)
        .count();

    for event in collisions.read() {
        let CollisionEvent::Started(e1, e2, _) = *event else {
            continue;
        };
        if !toys.contains(e1) && !toys.contains(e2) {
            continue;
        }

        let velocity_of = |entity: Entity| {
            bodies
                .get(entity)
                .ok()
                .map(|(_, pre, current)| impact_velocity(pre, current))
                .unwrap_or(Vec2::ZERO)
        };
        let position_of = |entity: Entity| {
            bodies
                .get(entity)
                .map(|(t, _, _)| t.translation().truncate())
                .unwrap_or(Vec2::ZERO)
        };

        let contact = first_contact_point(&rapier, e1, e2)
            .unwrap_or_else(|| (position_of(e1) + position_of(e2)) * 0.5);
        let impact = Impact {
            relative_velocity: velocity_of(e1) - velocity_of(e2),
            contact,
        };

        let Some(burst) = scoring.score(&impact, ledger.as_deref_mut()) else {
            continue;
        };

        let count = spark_budget(live_sparks, burst.count, config.collision_max_particles);
        spawn_collision_sparks(&mut commands, burst.at, count);
        live_sparks += count as usize;

        for entity in [e1, e2] {
            if let Ok(mut state) = ragdolls.get_mut(entity) {
                state.on_qualifying_collision(config.time_to_resume_animation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::LedgerSettings;

    fn scoring() -> ImpactScoring {
        ImpactScoring {
            min_velocity: 0.5,
            burst_count: 10,
        }
    }

    fn ledger() -> PointsLedger {
        PointsLedger::new(
            LedgerSettings {
                log_changes: false,
                ..LedgerSettings::default()
            },
            None,
        )
    }

    fn impact(speed: f32) -> Impact {
        Impact {
            relative_velocity: Vec2::new(0.0, speed),
            contact: Vec2::new(3.0, 4.0),
        }
    }

    #[test]
    fn fast_impact_scores_once() {
        let mut ledger = ledger();
        let burst = scoring().score(&impact(1.0), Some(&mut ledger));

        assert_eq!(
            burst,
            Some(ImpactBurst {
                at: Vec2::new(3.0, 4.0),
                count: 10
            })
        );
        assert_eq!(ledger.get(), 1);
    }

    #[test]
    fn slow_impact_is_ignored() {
        let mut ledger = ledger();
        assert_eq!(scoring().score(&impact(0.3), Some(&mut ledger)), None);
        assert_eq!(ledger.get(), 0);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(!scoring().qualifies(&impact(0.5)));
    }

    #[test]
    fn snapshot_wins_over_post_bounce_velocity() {
        let pre = PreImpactVelocity(Vec2::new(0.0, -250.0));
        let bounced = Velocity::linear(Vec2::new(0.0, 37.0));
        assert_eq!(
            impact_velocity(Some(&pre), Some(&bounced)),
            Vec2::new(0.0, -250.0)
        );
        assert_eq!(impact_velocity(None, Some(&bounced)), Vec2::new(0.0, 37.0));
        assert_eq!(impact_velocity(None, None), Vec2::ZERO);
    }

    #[test]
    fn burst_without_ledger() {
        assert!(scoring().score(&impact(2.0), None).is_some());
    }
}
