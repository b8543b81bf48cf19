//! Damage filter and launch benchmarks for raid_core.
//!
//! Run with: `cargo bench -p raid_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raid_core::prelude::*;
use raid_core::sandbox::TerrainProfile;

fn populated_director() -> (RaidDirector, Vec<AgentHandle>) {
    let mut config = RaidConfig::default();
    config.damage.structures = false;
    let mut world = SandboxWorld::new(TerrainProfile::rolling(10.0, 3.0, 40.0));
    for owner in 1..=32 {
        world.add_base(Target::owned(
            OwnerId(owner),
            Vec3::new(owner as f32 * 120.0, 10.0, 0.0),
        ));
        world.set_owner_online(OwnerId(owner), true);
    }

    let mut director = RaidDirector::new(config, 7).expect("valid config");
    let mut agents = Vec::new();
    for _ in 0..32 {
        let outcome = director.launch(
            &mut world,
            RaidRequest::random(Tier::Boss, Trigger::Command),
            0.0,
        );
        if let Some(summary) = outcome.summary() {
            agents.extend_from_slice(&summary.agents);
        }
    }
    (director, agents)
}

/// Filter cost for the common and raid-agent cases.
pub fn damage_filter_benchmark(c: &mut Criterion) {
    let (director, agents) = populated_director();
    let raider = agents.first().copied().unwrap_or(AgentHandle(1));

    let player_hit = DamageEvent::new(VictimCategory::Structure, Initiator::Player(42));
    let raider_hit = DamageEvent::new(VictimCategory::Structure, Initiator::Agent(raider));
    let stranger_hit = DamageEvent::new(VictimCategory::Structure, Initiator::Agent(AgentHandle(u64::MAX)));

    c.bench_function("filter_damage_player", |b| {
        b.iter(|| director.filter_damage(black_box(&player_hit)))
    });
    c.bench_function("filter_damage_raider", |b| {
        b.iter(|| director.filter_damage(black_box(&raider_hit)))
    });
    c.bench_function("filter_damage_unknown_agent", |b| {
        b.iter(|| director.filter_damage(black_box(&stranger_hit)))
    });
}

/// Full launch pipeline for one boss raid.
pub fn launch_benchmark(c: &mut Criterion) {
    c.bench_function("launch_boss_raid", |b| {
        b.iter(|| {
            let mut world = SandboxWorld::new(TerrainProfile::flat(0.0));
            world.add_base(Target::owned(OwnerId(1), Vec3::ZERO));
            world.set_owner_online(OwnerId(1), true);
            let mut director = RaidDirector::new(RaidConfig::default(), black_box(3)).expect("valid config");
            director.launch(
                &mut world,
                RaidRequest::random(Tier::Boss, Trigger::Command),
                0.0,
            )
        })
    });
}

criterion_group!(benches, damage_filter_benchmark, launch_benchmark);
criterion_main!(benches);
