//! Impulse maths for the explode click action.

use bevy::prelude::*;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionParams {
    /// Magnitude of the linear impulse.
    pub force: f32,
    /// Torque impulse is drawn uniformly from `±max_torque`.
    pub max_torque: f32,
}

/// Linear and angular impulse for one explosion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionImpulse {
    pub linear: Vec2,
    pub torque: f32,
}

/// Push the body away from the click: along the unit vector from `click` to
/// `center`, scaled by `params.force`, plus a small random spin.
///
/// A click exactly on the centre has no direction and yields zero linear
/// impulse (the spin is still applied).
pub fn explosion_impulse<R: Rng + ?Sized>(
    click: Vec2,
    center: Vec2,
    params: &ExplosionParams,
    rng: &mut R,
) -> ExplosionImpulse {
    let dir = (center - click).normalize_or_zero();
    let torque = if params.max_torque > 0.0 {
        rng.gen_range(-params.max_torque..params.max_torque)
    } else {
        0.0
    };
    ExplosionImpulse {
        linear: dir * params.force,
        torque,
    }
}
