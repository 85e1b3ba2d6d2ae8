//! Runtime configuration loaded from `assets/pet.toml`.
//!
//! [`PetConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  The composition root calls [`load_pet_config`]
//! before building the app, because the points ledger and its cloud store are
//! constructed from it.  Missing keys fall back to the compile-time defaults,
//! so a minimal TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<PetConfig>` to any system parameter list and read values
//! with `config.min_collision_velocity`, `config.double_click_time`, etc.
//! Subsystems that live outside the ECS receive a narrowed settings struct
//! instead (see [`PetConfig::drag_tunables`] and friends).

use std::path::Path;

use crate::collision::ImpactScoring;
use crate::constants::*;
use crate::error::{validate_non_negative, validate_positive, PetError, PetResult};
use crate::hud::FloatingTextStyle;
use crate::interaction::{ClickAction, DragCoefficients, DragTunables, ExplosionParams, SpringParams};
use crate::points::LedgerSettings;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable interaction and gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PetConfig {
    // ── Drag: Spring ──────────────────────────────────────────────────────────
    pub spring_stiffness: f32,
    pub spring_damping: f32,
    pub spring_rest_length: f32,

    // ── Drag: Coefficients while held ─────────────────────────────────────────
    pub drag_linear_damping: f32,
    pub drag_angular_damping: f32,

    // ── Clicks ────────────────────────────────────────────────────────────────
    pub double_click_time: f32,
    /// Which behaviour right-click and double-click trigger.
    pub click_action: ClickAction,

    // ── Explosion ─────────────────────────────────────────────────────────────
    pub explosion_force: f32,
    pub explosion_torque: f32,

    // ── Collisions ────────────────────────────────────────────────────────────
    pub min_collision_velocity: f32,
    pub collision_burst_count: u32,
    pub collision_max_particles: u32,
    pub explosion_burst_count: u32,

    // ── Ragdoll ───────────────────────────────────────────────────────────────
    pub time_to_resume_animation: f32,
    /// When set, starting a drag drops any pending resume timer on the
    /// dragged body.
    ///
    /// Off by default: the stale timer keeps running and can re-enable
    /// animation while the body is still held.
    pub cancel_resume_on_drag: bool,

    // ── Points ────────────────────────────────────────────────────────────────
    pub points_per_collision: u64,
    pub autosave_interval: f32,
    pub load_delay: f32,
    /// Log every add / reset / save to the console.
    pub log_points: bool,
    pub save_dir: String,
    pub save_file_name: String,

    // ── HUD ───────────────────────────────────────────────────────────────────
    pub points_prefix: String,
    pub points_font_size: f32,
    pub hide_points_when_zero: bool,
    pub floating_text_duration: f32,
    pub floating_text_rise: f32,
    pub floating_text_offset: f32,
    pub floating_text_font_size: f32,

    // ── Idle animation ────────────────────────────────────────────────────────
    pub idle_hop_period: f32,
    pub idle_hop_speed: f32,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            // Drag: Spring
            spring_stiffness: SPRING_STIFFNESS,
            spring_damping: SPRING_DAMPING,
            spring_rest_length: SPRING_REST_LENGTH,
            // Drag: Coefficients
            drag_linear_damping: DRAG_LINEAR_DAMPING,
            drag_angular_damping: DRAG_ANGULAR_DAMPING,
            // Clicks
            double_click_time: DOUBLE_CLICK_TIME,
            click_action: ClickAction::default(),
            // Explosion
            explosion_force: EXPLOSION_FORCE,
            explosion_torque: EXPLOSION_TORQUE,
            // Collisions
            min_collision_velocity: MIN_COLLISION_VELOCITY,
            collision_burst_count: COLLISION_BURST_COUNT,
            collision_max_particles: COLLISION_MAX_PARTICLES,
            explosion_burst_count: EXPLOSION_BURST_COUNT,
            // Ragdoll
            time_to_resume_animation: TIME_TO_RESUME_ANIMATION,
            cancel_resume_on_drag: false,
            // Points
            points_per_collision: POINTS_PER_COLLISION,
            autosave_interval: AUTOSAVE_INTERVAL,
            load_delay: LOAD_DELAY,
            log_points: true,
            save_dir: SAVE_DIR.to_string(),
            save_file_name: SAVE_FILE_NAME.to_string(),
            // HUD
            points_prefix: POINTS_PREFIX.to_string(),
            points_font_size: POINTS_FONT_SIZE,
            hide_points_when_zero: false,
            floating_text_duration: FLOATING_TEXT_DURATION,
            floating_text_rise: FLOATING_TEXT_RISE,
            floating_text_offset: FLOATING_TEXT_OFFSET,
            floating_text_font_size: FLOATING_TEXT_FONT_SIZE,
            // Idle animation
            idle_hop_period: IDLE_HOP_PERIOD,
            idle_hop_speed: IDLE_HOP_SPEED,
        }
    }
}

impl PetConfig {
    /// Parse and validate a TOML document.  Keys that are absent keep their
    /// compiled defaults.
    pub fn from_toml_str(contents: &str) -> PetResult<Self> {
        let config: PetConfig = toml::from_str(contents).map_err(|err| PetError::ConfigParse {
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make timers never fire or springs explode.
    pub fn validate(&self) -> PetResult<()> {
        validate_positive("spring_stiffness", self.spring_stiffness)?;
        validate_non_negative("spring_damping", self.spring_damping)?;
        validate_non_negative("spring_rest_length", self.spring_rest_length)?;
        validate_non_negative("drag_linear_damping", self.drag_linear_damping)?;
        validate_non_negative("drag_angular_damping", self.drag_angular_damping)?;
        validate_positive("double_click_time", self.double_click_time)?;
        validate_non_negative("explosion_force", self.explosion_force)?;
        validate_non_negative("explosion_torque", self.explosion_torque)?;
        validate_non_negative("min_collision_velocity", self.min_collision_velocity)?;
        validate_non_negative("time_to_resume_animation", self.time_to_resume_animation)?;
        validate_positive("autosave_interval", self.autosave_interval)?;
        validate_non_negative("load_delay", self.load_delay)?;
        validate_positive("floating_text_duration", self.floating_text_duration)?;
        validate_positive("idle_hop_period", self.idle_hop_period)?;
        Ok(())
    }

    /// Tunables handed to the [`crate::interaction::DragController`].
    pub fn drag_tunables(&self) -> DragTunables {
        DragTunables {
            spring: SpringParams {
                stiffness: self.spring_stiffness,
                damping: self.spring_damping,
                rest_length: self.spring_rest_length,
            },
            held_drag: DragCoefficients {
                linear: self.drag_linear_damping,
                angular: self.drag_angular_damping,
            },
            double_click_time: self.double_click_time,
            click_action: self.click_action,
            explosion: ExplosionParams {
                force: self.explosion_force,
                max_torque: self.explosion_torque,
            },
        }
    }

    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            per_collision: self.points_per_collision,
            autosave_interval: self.autosave_interval,
            log_changes: self.log_points,
        }
    }

    pub fn impact_scoring(&self) -> ImpactScoring {
        ImpactScoring {
            min_velocity: self.min_collision_velocity,
            burst_count: self.collision_burst_count,
        }
    }

    pub fn floating_text_style(&self) -> FloatingTextStyle {
        FloatingTextStyle {
            duration: self.floating_text_duration,
            rise: self.floating_text_rise,
            offset: self.floating_text_offset,
            font_size: self.floating_text_font_size,
        }
    }
}

/// Read `path` and return the config it describes.
///
/// A missing file is not an error (compiled defaults are returned).  Parse and
/// validation errors are printed to stderr and also fall back to defaults, so a
/// typo in the TOML never stops the toy from starting.
pub fn load_pet_config(path: impl AsRef<Path>) -> PetConfig {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => match PetConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                println!("✓ Loaded pet config from {}", path.display());
                loaded
            }
            Err(e) => {
                eprintln!("⚠ Failed to load {}: {e}; using defaults", path.display());
                PetConfig::default()
            }
        },
        Err(_) => {
            println!("ℹ No {} found; using compiled defaults", path.display());
            PetConfig::default()
        }
    }
}
