use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use pet_toy::config::load_pet_config;
use pet_toy::constants::PIXELS_PER_METER;
use pet_toy::persistence::{CloudStore, FileCloudStore};
use pet_toy::plugin::PetToyPlugin;
use pet_toy::points::{PointsFeed, PointsLedger};

fn main() {
    let config = load_pet_config("assets/pet.toml");

    let store = FileCloudStore::new(&config.save_dir, &config.save_file_name);
    println!("Cloud store: {}", store.describe());

    // The ledger loads a moment after start so the first frame isn't held
    // up by storage.
    let mut ledger = PointsLedger::new(config.ledger_settings(), Some(Box::new(store)));
    ledger.schedule_load(config.load_delay);
    let feed = PointsFeed::attach(&mut ledger);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Pet Toy".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.12)))
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(
            PIXELS_PER_METER,
        ))
        .insert_resource(config)
        .insert_resource(ledger)
        .insert_resource(feed)
        .add_plugins(PetToyPlugin)
        .run();
}
