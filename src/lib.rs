//! Pet toy library
//!
//! A physics pet you can grab, fling, and click on.  Dragging is a spring
//! joint to the pointer; releasing lets the pet ragdoll until a collision
//! brings its animation back.  Hard impacts score points, which are kept in
//! a ledger and saved to a cloud store.

pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod hud;
pub mod input;
pub mod interaction;
pub mod particles;
pub mod persistence;
pub mod pet;
pub mod plugin;
pub mod points;
pub mod ragdoll;
