//! Spatial engine demo
//!
//! Bounces entities around a closed cube for a number of ticks. Each tick the
//! live structures receive `update` calls, the static ones are rebuilt from a
//! snapshot, and every structure answers the same radius query so their
//! results can be cross-checked. Per-structure timings are logged at the end.
//!
//! Usage: spatial_engine_demo [ENTITY_COUNT] [TICKS] [SEED]

use std::time::{Duration, Instant};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_engine::glam::{Vec2, Vec3};
use spatial_engine::spatial::{
    AABB, Bvh, Entity, EntityId, Grid2D, Grid2dConfig, KdTree, LooseOctree, Octree, Rect,
    Result, SpatialHash,
};
use spatial_engine::{spatial_error, spatial_info, spatial_warn};

const SOURCE: &str = "demo";
const HALF_WORLD: f32 = 100.0;
const TICK_SECONDS: f32 = 1.0 / 60.0;
const PROBE_RADIUS: f32 = 15.0;

// ===== ARGUMENTS =====

#[derive(Parser, Debug)]
#[command(name = "spatial_engine_demo", about = "Bouncing-entity benchmark for every spatial structure")]
struct DemoArgs {
    /// Number of simulated entities
    #[arg(default_value_t = 2000, value_parser = clap::value_parser!(u32).range(1..))]
    entity_count: u32,
    /// Number of ticks to simulate
    #[arg(default_value_t = 120)]
    ticks: u32,
    /// Seed for the scene generator
    #[arg(default_value_t = 7)]
    seed: u64,
}

// ===== SIMULATION =====

struct Body {
    entity: Entity,
    velocity: Vec3,
}

fn spawn_bodies(count: usize, rng: &mut StdRng) -> Vec<Body> {
    let mut random_vec = |extent: f32| {
        Vec3::new(
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
        )
    };
    (0..count)
        .map(|i| {
            let position = random_vec(HALF_WORLD * 0.9);
            let velocity = random_vec(40.0);
            Body {
                entity: Entity::new(i as EntityId, position, 0.5 + (i % 4) as f32 * 0.5),
                velocity,
            }
        })
        .collect()
}

/// Advance every body, reflecting off the cube walls.
fn step(bodies: &mut [Body]) {
    for body in bodies {
        let mut next = body.entity.position + body.velocity * TICK_SECONDS;
        for axis in 0..3 {
            if next[axis].abs() > HALF_WORLD {
                next[axis] = next[axis].clamp(-HALF_WORLD, HALF_WORLD);
                body.velocity[axis] = -body.velocity[axis];
            }
        }
        body.entity.position = next;
    }
}

/// Map an XY position onto the grid, whose origin is the cube's min corner.
fn to_grid(position: Vec3) -> Vec2 {
    position.truncate() + Vec2::splat(HALF_WORLD)
}

// ===== TIMING =====

#[derive(Default)]
struct Stopwatch {
    totals: Vec<(&'static str, Duration)>,
}

impl Stopwatch {
    fn time<T>(&mut self, label: &'static str, work: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = work();
        let elapsed = start.elapsed();
        match self.totals.iter_mut().find(|(name, _)| *name == label) {
            Some((_, total)) => *total += elapsed,
            None => self.totals.push((label, elapsed)),
        }
        out
    }

    fn report(&self, ticks: u32) {
        for (label, total) in &self.totals {
            let per_tick = total.as_secs_f64() * 1000.0 / ticks.max(1) as f64;
            spatial_info!(SOURCE, "{:<24} {:>9.3} ms/tick", label, per_tick);
        }
    }
}

// ===== MAIN LOOP =====

fn sorted(mut ids: Vec<EntityId>) -> Vec<EntityId> {
    ids.sort_unstable();
    ids
}

fn run(args: &DemoArgs) -> Result<()> {
    let world = AABB::new(Vec3::splat(-HALF_WORLD), Vec3::splat(HALF_WORLD));
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut bodies = spawn_bodies(args.entity_count as usize, &mut rng);

    let mut octree = Octree::with_defaults(world)?;
    let mut hash = SpatialHash::new(8.0)?;
    let mut loose = LooseOctree::with_defaults(world)?;
    let mut grid = Grid2D::new(Grid2dConfig { width: 20, height: 20, cell_size: 10.0 })?;

    for body in &bodies {
        octree.insert(body.entity);
        hash.insert(body.entity);
        loose.insert(body.entity);
        grid.insert(body.entity.id, to_grid(body.entity.position));
    }

    spatial_info!(SOURCE, "Simulating {} entities for {} ticks (seed {})",
        args.entity_count, args.ticks, args.seed);

    let mut stopwatch = Stopwatch::default();
    let mut mismatches = 0u32;
    let mut collision_pairs = 0usize;
    let mut ray_hits = 0u32;

    for tick in 0..args.ticks {
        step(&mut bodies);

        stopwatch.time("Octree update", || {
            for body in &bodies {
                octree.update(body.entity);
            }
        });
        stopwatch.time("SpatialHash update", || {
            for body in &bodies {
                hash.update(body.entity);
            }
        });
        stopwatch.time("LooseOctree update", || {
            for body in &bodies {
                loose.update(body.entity);
            }
        });
        stopwatch.time("Grid2D update", || {
            for body in &bodies {
                grid.update(body.entity.id, to_grid(body.entity.position));
            }
        });

        let snapshot: Vec<Entity> = bodies.iter().map(|b| b.entity).collect();
        let kd = stopwatch.time("KdTree build", || KdTree::build(&snapshot));
        let bvh = stopwatch.time("Bvh build", || Bvh::build(&snapshot));

        // Same probe for every structure
        let center = bodies[tick as usize % bodies.len()].entity.position;
        let reference = sorted(stopwatch.time("Octree query", || octree.query_radius(center, PROBE_RADIUS)));
        let answers = [
            ("SpatialHash", stopwatch.time("SpatialHash query", || hash.query_radius(center, PROBE_RADIUS))),
            ("LooseOctree", stopwatch.time("LooseOctree query", || loose.query_radius(center, PROBE_RADIUS))),
            ("KdTree", stopwatch.time("KdTree query", || kd.query_radius(center, PROBE_RADIUS))),
            ("Bvh", stopwatch.time("Bvh query", || bvh.query_radius(center, PROBE_RADIUS))),
        ];
        for (name, answer) in answers {
            if sorted(answer) != reference {
                mismatches += 1;
                spatial_warn!(SOURCE, "Tick {}: {} disagrees with Octree at {:?}", tick, name, center);
            }
        }

        let nearest_octree = octree.query_nearest(center + Vec3::splat(0.25));
        let nearest_kd = kd.query_nearest(center + Vec3::splat(0.25));
        if nearest_octree.id != nearest_kd.id
            && (nearest_octree.distance - nearest_kd.distance).abs() > 1e-4
        {
            mismatches += 1;
            spatial_warn!(SOURCE, "Tick {}: nearest differs (Octree {} / KdTree {})",
                tick, nearest_octree.id, nearest_kd.id);
        }

        let grid_center = to_grid(center);
        let rect = Rect::new(grid_center.x - PROBE_RADIUS, grid_center.y - PROBE_RADIUS,
            PROBE_RADIUS * 2.0, PROBE_RADIUS * 2.0);
        stopwatch.time("Grid2D query", || grid.query_rect(&rect));

        collision_pairs += stopwatch.time("SpatialHash collisions", || hash.find_collisions().len());
        stopwatch.time("LooseOctree collisions", || loose.find_collisions());

        let hit = stopwatch.time("Bvh raycast", || bvh.raycast(Vec3::splat(-HALF_WORLD), Vec3::ONE, 400.0));
        if hit.is_hit() {
            ray_hits += 1;
        }
    }

    stopwatch.report(args.ticks);
    spatial_info!(SOURCE,
        "Done: {} entities, {} hash collision pairs, {} ray hits, {} mismatches",
        octree.len(), collision_pairs, ray_hits, mismatches);

    if mismatches > 0 {
        spatial_warn!(SOURCE, "Structures disagreed {} time(s)", mismatches);
    }
    Ok(())
}

fn main() {
    let args = DemoArgs::parse();

    if let Err(err) = run(&args) {
        spatial_error!(SOURCE, "Demo failed: {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
