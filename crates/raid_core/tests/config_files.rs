//! Configuration file handling for raid_core.

use raid_core::config::RaidConfig;
use raid_core::error::{ConfigError, RaidError};
use raid_core::prelude::Tier;

#[test]
fn test_load_or_create_writes_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config").join("raid.ron");
    assert!(!path.exists());

    let config = RaidConfig::load_or_create(&path).expect("defaults are written");
    assert_eq!(config, RaidConfig::default());
    assert!(path.exists());

    let reloaded = RaidConfig::load(&path).expect("written file loads");
    assert_eq!(reloaded, config);
}

#[test]
fn test_load_or_create_keeps_existing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("raid.ron");
    std::fs::write(&path, "(raid: (spawn_radius: 75.0, despawn_seconds: 600.0))").expect("write");

    let config = RaidConfig::load_or_create(&path).expect("existing file loads");
    assert!((config.raid.spawn_radius - 75.0).abs() < f32::EPSILON);
    assert!((config.raid.despawn_seconds - 600.0).abs() < f64::EPSILON);
    assert_eq!(config.tiers, RaidConfig::default().tiers);
}

#[test]
fn test_save_round_trip_with_edits() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("raid.ron");
    let mut config = RaidConfig::default();
    config.raid.timer_tier = Tier::Boss;
    config.raid.allow_offline_raids = false;
    config.damage.structures = false;
    config.save(&path).expect("save");

    assert_eq!(RaidConfig::load(&path).expect("load"), config);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = RaidConfig::load(dir.path().join("absent.ron")).expect_err("missing");
    assert!(matches!(err, RaidError::ConfigIo { .. }));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("raid.ron");
    std::fs::write(&path, "(raid: (spawn_radius: \"far\"))").expect("write");
    let err = RaidConfig::load(&path).expect_err("malformed");
    assert!(matches!(err, RaidError::ConfigParse { .. }));
    assert!(err.to_string().contains("raid.ron"));
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("raid.ron");
    std::fs::write(&path, "(raid: (offline_raid_chance: 1.5))").expect("write");
    let err = RaidConfig::load(&path).expect_err("invalid");
    assert!(matches!(
        err,
        RaidError::InvalidConfig(ConfigError::ProbabilityOutOfRange { .. })
    ));
}
