//! Offline-raid gate.
//!
//! Raids against a connected owner always proceed. Against an unattended base
//! they proceed only when offline raids are enabled and a uniform draw in
//! `[0, 1)` is at most `offline_raid_chance`; the chance is the probability of
//! proceeding.

use rand::Rng;

use crate::config::RaidSettings;

/// Decide whether a raid may proceed, drawing from `rng` when needed.
pub fn may_proceed<R: Rng + ?Sized>(owner_online: bool, settings: &RaidSettings, rng: &mut R) -> bool {
    if owner_online {
        return true;
    }
    if !settings.allow_offline_raids {
        return false;
    }
    may_proceed_with_draw(false, settings, rng.gen::<f32>())
}

/// Same decision with the random draw supplied by the caller.
#[must_use]
pub fn may_proceed_with_draw(owner_online: bool, settings: &RaidSettings, draw: f32) -> bool {
    owner_online || (settings.allow_offline_raids && draw <= settings.offline_raid_chance)
}
