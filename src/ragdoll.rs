//! Ragdoll / animation takeover.
//!
//! A body with an [`AnimationDriver`] is normally `Animated`.  Grabbing it
//! switches it to `Ragdoll` and turns the driver off so the physics spring
//! has full control.  Once released, the first qualifying collision schedules
//! a return to `Animated` after `time_to_resume_animation`; every further
//! qualifying collision restarts that countdown from the full delay, so at
//! most one resume is ever pending per body.
//!
//! Bodies without a driver skip all of this silently.

use crate::config::PetConfig;
use crate::interaction::InteractionEvent;
use bevy::prelude::*;

/// Capability to switch a body's animation on or off.
pub trait AnimationSwitch {
    fn set_enabled(&mut self, enabled: bool);
}

/// Drives the pet's idle animation while enabled.
///
/// `clock` accumulates animated time and is read by
/// [`crate::pet::idle_animation_system`].
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AnimationDriver {
    pub enabled: bool,
    pub clock: f32,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self {
            enabled: true,
            clock: 0.0,
        }
    }
}

impl AnimationSwitch for AnimationDriver {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            self.clock = 0.0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RagdollMode {
    #[default]
    Animated,
    Ragdoll,
}

/// Per-body ragdoll flag plus the pending resume countdown.
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub struct RagdollState {
    mode: RagdollMode,
    being_dragged: bool,
    /// Seconds until animation resumes; `None` when nothing is pending.
    resume_in: Option<f32>,
}

impl RagdollState {
    #[inline]
    pub fn mode(&self) -> RagdollMode {
        self.mode
    }

    #[inline]
    pub fn is_being_dragged(&self) -> bool {
        self.being_dragged
    }

    #[inline]
    pub fn pending_resume(&self) -> Option<f32> {
        self.resume_in
    }

    /// A drag session attached to this body.
    ///
    /// With `cancel_pending` the stale resume countdown is dropped; without it
    /// the countdown keeps running and may re-enable animation mid-drag.
    pub fn begin_drag(&mut self, driver: Option<&mut dyn AnimationSwitch>, cancel_pending: bool) {
        self.being_dragged = true;
        let Some(driver) = driver else {
            return;
        };
        if cancel_pending {
            self.resume_in = None;
        }
        if self.mode != RagdollMode::Ragdoll {
            self.mode = RagdollMode::Ragdoll;
            driver.set_enabled(false);
            info!("Entered ragdoll mode - animation disabled");
        }
    }

    pub fn end_drag(&mut self) {
        self.being_dragged = false;
    }

    /// Schedule (or restart) the resume countdown.  Returns `true` when a
    /// countdown is now pending because of this collision.
    pub fn on_qualifying_collision(&mut self, delay: f32) -> bool {
        if self.mode == RagdollMode::Ragdoll && !self.being_dragged {
            self.resume_in = Some(delay);
            true
        } else {
            false
        }
    }

    /// Advance the countdown by `dt`.  Returns `true` on the tick the body
    /// goes back to `Animated`.
    pub fn tick(&mut self, dt: f32, driver: Option<&mut dyn AnimationSwitch>) -> bool {
        let Some(remaining) = self.resume_in else {
            return false;
        };
        let remaining = remaining - dt;
        if remaining > 0.0 {
            self.resume_in = Some(remaining);
            return false;
        }
        self.resume_in = None;

        match driver {
            Some(driver) if self.mode == RagdollMode::Ragdoll => {
                self.mode = RagdollMode::Animated;
                driver.set_enabled(true);
                info!("Exited ragdoll mode - animation resumed");
                true
            }
            _ => false,
        }
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Apply drag start / end to the grabbed body's [`RagdollState`].
pub fn ragdoll_drag_system(
    mut interactions: MessageReader<InteractionEvent>,
    mut bodies: Query<(&mut RagdollState, Option<&mut AnimationDriver>)>,
    config: Res<PetConfig>,
) {
    for event in interactions.read() {
        match *event {
            InteractionEvent::DragStarted { body } => {
                if let Ok((mut state, mut driver)) = bodies.get_mut(body) {
                    state.begin_drag(
                        driver
                            .as_deref_mut()
                            .map(|d| d as &mut dyn AnimationSwitch),
                        config.cancel_resume_on_drag,
                    );
                }
            }
            InteractionEvent::DragEnded { body } => {
                if let Ok((mut state, _)) = bodies.get_mut(body) {
                    state.end_drag();
                }
            }
            InteractionEvent::Exploded { .. } | InteractionEvent::ShowPoints { .. } => {}
        }
    }
}

/// Count down pending resumes and re-enable animation when they expire.
pub fn ragdoll_resume_system(
    time: Res<Time>,
    mut bodies: Query<(&mut RagdollState, Option<&mut AnimationDriver>)>,
) {
    let dt = time.delta_secs();
    for (mut state, mut driver) in bodies.iter_mut() {
        if state.pending_resume().is_none() {
            continue;
        }
        state.tick(
            dt,
            driver
                .as_deref_mut()
                .map(|d| d as &mut dyn AnimationSwitch),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ragdolled(driver: &mut AnimationDriver) -> RagdollState {
        let mut state = RagdollState::default();
        state.begin_drag(Some(driver), true);
        state.end_drag();
        state
    }

    #[test]
    fn drag_start_disables_animation() {
        let mut driver = AnimationDriver::default();
        let mut state = RagdollState::default();
        state.begin_drag(Some(&mut driver), true);

        assert_eq!(state.mode(), RagdollMode::Ragdoll);
        assert!(state.is_being_dragged());
        assert!(!driver.enabled);
    }

    #[test]
    fn no_driver_means_no_ragdoll() {
        let mut state = RagdollState::default();
        state.begin_drag(None, true);
        state.end_drag();

        assert_eq!(state.mode(), RagdollMode::Animated);
        assert!(!state.on_qualifying_collision(0.5));
        assert_eq!(state.pending_resume(), None);
    }

    #[test]
    fn collision_while_dragged_does_not_schedule() {
        let mut driver = AnimationDriver::default();
        let mut state = RagdollState::default();
        state.begin_drag(Some(&mut driver), true);

        assert!(!state.on_qualifying_collision(0.5));
        assert_eq!(state.pending_resume(), None);
    }

    #[test]
    fn second_collision_restarts_the_full_delay() {
        let mut driver = AnimationDriver::default();
        let mut state = ragdolled(&mut driver);

        assert!(state.on_qualifying_collision(0.5));
        assert!(!state.tick(0.3, Some(&mut driver)));
        assert!((state.pending_resume().unwrap() - 0.2).abs() < 1e-6);

        assert!(state.on_qualifying_collision(0.5));
        assert_eq!(state.pending_resume(), Some(0.5));

        // 0.3 s after the restart is not enough even though 0.6 s passed overall.
        assert!(!state.tick(0.3, Some(&mut driver)));
        assert_eq!(state.mode(), RagdollMode::Ragdoll);
        assert!(state.tick(0.25, Some(&mut driver)));
        assert_eq!(state.mode(), RagdollMode::Animated);
        assert!(driver.enabled);
        assert_eq!(state.pending_resume(), None);
    }

    #[test]
    fn drag_start_cancels_pending_resume_when_configured() {
        let mut driver = AnimationDriver::default();
        let mut state = ragdolled(&mut driver);
        state.on_qualifying_collision(0.5);

        state.begin_drag(Some(&mut driver), true);
        assert_eq!(state.pending_resume(), None);
        assert!(!state.tick(1.0, Some(&mut driver)));
        assert!(!driver.enabled);
    }

    #[test]
    fn stale_timer_fires_mid_drag_without_cancellation() {
        let mut driver = AnimationDriver::default();
        let mut state = ragdolled(&mut driver);
        state.on_qualifying_collision(0.5);

        state.begin_drag(Some(&mut driver), false);
        assert!(state.tick(0.6, Some(&mut driver)));
        assert!(state.is_being_dragged());
        assert!(driver.enabled, "stale timer re-enables animation while held");
    }
}
