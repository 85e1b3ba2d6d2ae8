//! Centralised interaction and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Units
//!
//! World units are pixels.  Rapier runs with [`PIXELS_PER_METER`] so that a
//! metre-scale pet (roughly 1.2 m across) is about 120 px on screen.  Speeds
//! are therefore px/s and impulses px·kg/s.
//!
//! ## Tuning guidance
//!
//! Every constant below is mirrored by a field in [`crate::config::PetConfig`];
//! override it in `assets/pet.toml` instead of editing this file when
//! experimenting.

// ── World ─────────────────────────────────────────────────────────────────────

/// Rapier length scale.  Gravity, rest lengths, and impulses are all tuned
/// against this value.
pub const PIXELS_PER_METER: f32 = 100.0;

/// Downward gravity in px/s² (9.81 m/s²).
pub const GRAVITY: f32 = -981.0;

/// Half-extent of the square arena the pet lives in.
pub const ARENA_HALF_WIDTH: f32 = 560.0;

/// Half-height of the arena; floor sits at `-ARENA_HALF_HEIGHT`.
pub const ARENA_HALF_HEIGHT: f32 = 300.0;

/// Radius of the pet's ball collider.
pub const PET_RADIUS: f32 = 60.0;

/// Number of small toy blocks scattered around the pet at startup.
pub const TOY_COUNT: u32 = 4;

// ── Drag: Spring ──────────────────────────────────────────────────────────────

/// Spring stiffness of the drag joint.
///
/// Roughly a 2.5 Hz spring on a 1.1 kg body.  Higher values make the pet snap
/// to the pointer; lower values make it lag and swing.
pub const SPRING_STIFFNESS: f32 = 280.0;

/// Spring damping of the drag joint.
///
/// Heavily over-damped so the pet follows without orbiting the pointer.
pub const SPRING_DAMPING: f32 = 180.0;

/// Rest length between the pointer anchor and the grabbed point (world units).
pub const SPRING_REST_LENGTH: f32 = 20.0;

// ── Drag: Coefficients while held ─────────────────────────────────────────────

/// Linear damping applied to a body while it is being dragged.
pub const DRAG_LINEAR_DAMPING: f32 = 10.0;

/// Angular damping applied to a body while it is being dragged.
pub const DRAG_ANGULAR_DAMPING: f32 = 5.0;

// ── Clicks ────────────────────────────────────────────────────────────────────

/// Maximum gap (s) between two left presses for them to count as a double-click.
pub const DOUBLE_CLICK_TIME: f32 = 0.3;

// ── Explosion ─────────────────────────────────────────────────────────────────

/// Magnitude of the linear impulse applied by the explode action.
pub const EXPLOSION_FORCE: f32 = 1000.0;

/// Upper bound of the random torque impulse added by the explode action.
///
/// The applied torque is drawn uniformly from `±EXPLOSION_TORQUE`.
pub const EXPLOSION_TORQUE: f32 = 40.0;

// ── Collisions ────────────────────────────────────────────────────────────────

/// Minimum relative impact speed (px/s) for a collision to score and spark.
pub const MIN_COLLISION_VELOCITY: f32 = 50.0;

/// Sparks emitted per qualifying collision.
pub const COLLISION_BURST_COUNT: u32 = 10;

/// Cap on live collision sparks across the whole scene.
pub const COLLISION_MAX_PARTICLES: u32 = 20;

/// Particles emitted by one explosion.
pub const EXPLOSION_BURST_COUNT: u32 = 30;

// ── Ragdoll ───────────────────────────────────────────────────────────────────

/// Seconds after the most recent qualifying collision before animation resumes.
pub const TIME_TO_RESUME_ANIMATION: f32 = 0.5;

// ── Points ────────────────────────────────────────────────────────────────────

/// Points awarded per qualifying collision.
pub const POINTS_PER_COLLISION: u64 = 1;

/// Seconds between periodic autosaves.
pub const AUTOSAVE_INTERVAL: f32 = 5.0;

/// Delay (s) before the one-shot startup load, giving the store time to come up.
pub const LOAD_DELAY: f32 = 0.1;

/// Directory the local cloud-save backend writes into.
pub const SAVE_DIR: &str = "saves";

/// File name of the save blob inside [`SAVE_DIR`].
pub const SAVE_FILE_NAME: &str = "pet_save.dat";

// ── HUD ───────────────────────────────────────────────────────────────────────

/// Label prefix of the permanent points display.
pub const POINTS_PREFIX: &str = "Points: ";

/// Font size of the permanent points display.
pub const POINTS_FONT_SIZE: f32 = 24.0;

/// Lifetime (s) of a floating "Total: N pts" label.
pub const FLOATING_TEXT_DURATION: f32 = 2.0;

/// Distance (px) a floating label rises over its lifetime.
pub const FLOATING_TEXT_RISE: f32 = 60.0;

/// Screen-space offset (px) of a floating label above its anchor.
pub const FLOATING_TEXT_OFFSET: f32 = 80.0;

/// Font size of floating labels.
pub const FLOATING_TEXT_FONT_SIZE: f32 = 32.0;

// ── Idle animation ────────────────────────────────────────────────────────────

/// Period (s) of one idle hop while the pet is animated.
pub const IDLE_HOP_PERIOD: f32 = 1.6;

/// Upward launch speed (px/s) of an idle hop.
pub const IDLE_HOP_SPEED: f32 = 260.0;
