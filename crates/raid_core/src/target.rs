//! Target selection.
//!
//! Bases are queried from the world on every request; nothing is cached since
//! bases can be built, destroyed, or change hands between raids.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::world::{OwnerId, Target, WorldAdapter};

/// Whether a base may be raided at all.
#[must_use]
pub fn is_eligible(target: &Target) -> bool {
    target.assigned_owner().is_some()
}

/// Every eligible base currently known to the world.
pub fn eligible_targets<W: WorldAdapter + ?Sized>(world: &W) -> Vec<Target> {
    world
        .find_ownable_bases()
        .into_iter()
        .filter(is_eligible)
        .collect()
}

/// Pick one eligible base uniformly at random.
///
/// `None` means no raid can be started right now; it is not an error.
pub fn select_target<W, R>(world: &W, rng: &mut R) -> Option<Target>
where
    W: WorldAdapter + ?Sized,
    R: Rng + ?Sized,
{
    eligible_targets(world).choose(rng).copied()
}

/// Find an eligible base belonging to `owner`.
///
/// When the owner has several bases one is picked at random.
pub fn find_by_owner<W, R>(world: &W, owner: OwnerId, rng: &mut R) -> Option<Target>
where
    W: WorldAdapter + ?Sized,
    R: Rng + ?Sized,
{
    let owned: Vec<Target> = eligible_targets(world)
        .into_iter()
        .filter(|t| t.owner == Some(owner))
        .collect();
    owned.choose(rng).copied()
}
