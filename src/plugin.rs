//! `PetToyPlugin`: wires the interaction, ragdoll, scoring, persistence, and
//! HUD systems into the Bevy schedule.
//!
//! The plugin expects `PetConfig` to be inserted before it is added (it falls
//! back to defaults otherwise).  The `PointsLedger` and `PointsFeed` are
//! optional: without them the toy still plays, it just doesn't score or save.

use crate::collision::{impact_scoring_system, record_pre_impact_velocity_system};
use crate::config::PetConfig;
use crate::hud::{
    floating_text_system, points_hud_system, setup_points_hud, spawn_floating_text_system,
};
use crate::interaction::{interaction_input_system, DragAnchor, DragController, InteractionEvent};
use crate::particles::{
    attach_particle_mesh_system, explosion_burst_system, init_particle_mesh,
    particle_update_system,
};
use crate::pet::{idle_animation_system, setup_camera, setup_physics_config, spawn_scene};
use crate::points::{points_feed_system, points_tick_system, PointsChanged, PointsLedger};
use crate::ragdoll::{ragdoll_drag_system, ragdoll_resume_system};
use bevy::prelude::*;
use bevy::window::{AppLifecycle, WindowFocused};
use bevy_rapier2d::prelude::PhysicsSet;

pub struct PetToyPlugin;

impl Plugin for PetToyPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<PetConfig>()
            .cloned()
            .unwrap_or_default();

        app.add_message::<InteractionEvent>()
            .add_message::<PointsChanged>()
            .insert_resource(config.clone())
            .insert_resource(DragController::new(config.drag_tunables()))
            .init_resource::<DragAnchor>()
            .add_systems(
                Startup,
                (
                    setup_physics_config,
                    setup_camera,
                    init_particle_mesh,
                    spawn_scene,
                    setup_points_hud,
                ),
            )
            .add_systems(
                Update,
                (
                    interaction_input_system,
                    ragdoll_drag_system,
                    explosion_burst_system,
                    spawn_floating_text_system,
                    impact_scoring_system,
                    ragdoll_resume_system,
                    idle_animation_system,
                    points_tick_system,
                    points_feed_system,
                    points_hud_system,
                    attach_particle_mesh_system,
                    particle_update_system,
                    floating_text_system,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    ledger_keys_system,
                    focus_save_system,
                    lifecycle_save_system,
                )
                    .before(points_tick_system),
            )
            .add_systems(
                PostUpdate,
                record_pre_impact_velocity_system.before(PhysicsSet::SyncBackend),
            )
            .add_systems(Last, exit_save_system);
    }
}

// ── Lifecycle hooks ───────────────────────────────────────────────────────────

/// F5 = force save, F9 = force load, F1 = store diagnostics.
pub fn ledger_keys_system(
    keys: Res<ButtonInput<KeyCode>>,
    ledger: Option<ResMut<PointsLedger>>,
) {
    let Some(mut ledger) = ledger else {
        return;
    };
    if keys.just_pressed(KeyCode::F5) {
        ledger.force_save();
    }
    if keys.just_pressed(KeyCode::F9) {
        ledger.force_load();
    }
    if keys.just_pressed(KeyCode::F1) {
        ledger.log_store_info();
    }
}

/// Save whenever a window loses focus.
pub fn focus_save_system(
    mut focus: MessageReader<WindowFocused>,
    ledger: Option<ResMut<PointsLedger>>,
) {
    let Some(mut ledger) = ledger else {
        focus.clear();
        return;
    };
    for event in focus.read() {
        ledger.on_focus(event.focused);
    }
}

/// Save when the platform suspends the app.
pub fn lifecycle_save_system(
    mut lifecycle: MessageReader<AppLifecycle>,
    ledger: Option<ResMut<PointsLedger>>,
) {
    let Some(mut ledger) = ledger else {
        lifecycle.clear();
        return;
    };
    for event in lifecycle.read() {
        match event {
            AppLifecycle::WillSuspend | AppLifecycle::Suspended => ledger.on_pause(true),
            AppLifecycle::WillResume | AppLifecycle::Running => ledger.on_pause(false),
            AppLifecycle::Idle => {}
        }
    }
}

/// Final save on the way out.
pub fn exit_save_system(mut exits: MessageReader<AppExit>, ledger: Option<ResMut<PointsLedger>>) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut ledger) = ledger {
        info!("Exiting - saving {} points", ledger.get());
        ledger.save_now();
    }
}
