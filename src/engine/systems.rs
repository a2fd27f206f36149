// Per-frame world update.
//
// Update order inside a frame is read-then-write: position snapshots of the
// sugar cubes and of the whole colony are taken once, then every ant is
// stepped against those snapshots. No ant ever observes another ant's
// post-update position within the same tick, which keeps the simulation
// independent of iteration order.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;

use super::components::{AntAgent, Color, SugarLure, Transform, Velocity};
use super::steering::{self, GROUND_Y, SteeringParams};

// ============================================================================
// SCENE CONSTANTS
// ============================================================================

pub const ANT_COUNT: usize = 28;
pub const ANT_SPEED: f32 = 0.95;
pub const ANT_WANDER_RADIUS: f32 = 0.6;

/// XZ spots of the three sugar cubes.
pub const SUGAR_SPOTS: [[f32; 2]; 3] = [[0.9, -0.9], [-1.1, -1.8], [0.0, -2.4]];
pub const SUGAR_REST_Y: f32 = 0.12;

const BOB_FREQ: f32 = 1.4;
const BOB_AMPLITUDE: f32 = 0.02;

// ============================================================================
// SPAWNING
// ============================================================================

/// Spawn the colony on a loose ring in front of the hero object, each ant
/// with a tiny random initial velocity and its own wander phase.
pub fn spawn_colony(world: &mut World, rng: &mut impl Rng) {
    for _ in 0..ANT_COUNT {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = 0.35 + rng.r#gen::<f32>() * 1.8;
        let x = angle.cos() * radius;
        let z = -0.4 - rng.r#gen::<f32>() * 2.6;

        let velocity = Vec3::new(
            (rng.r#gen::<f32>() - 0.5) * 0.02,
            0.0,
            (rng.r#gen::<f32>() - 0.5) * 0.02,
        );

        let shade = 0.06 + rng.r#gen::<f32>() * 0.05;
        world.spawn((
            Transform::from_position(Vec3::new(x, GROUND_Y, z)),
            Velocity { linear: velocity },
            AntAgent {
                speed: ANT_SPEED,
                wander_radius: ANT_WANDER_RADIUS,
                phase: rng.r#gen::<f32>() * 100.0,
            },
            Color {
                r: shade,
                g: shade,
                b: shade + 0.02,
            },
        ));
    }
}

pub fn spawn_sugar(world: &mut World, rng: &mut impl Rng) {
    for [x, z] in SUGAR_SPOTS {
        world.spawn((
            Transform::from_position(Vec3::new(x, SUGAR_REST_Y, z)),
            SugarLure {
                rest_y: SUGAR_REST_Y,
                bob_phase: rng.r#gen::<f32>() * std::f32::consts::TAU,
            },
            Color {
                r: 1.0,
                g: 0.99,
                b: 0.97,
            },
        ));
    }
}

// ============================================================================
// FRAME UPDATE
// ============================================================================

/// Step every ant by `dt` against a single pre-frame snapshot of the world.
pub fn advance_colony(
    world: &mut World,
    params: &SteeringParams,
    time: f32,
    dt: f32,
    rng: &mut impl Rng,
) {
    // Snapshots first. The neighbor list includes each ant's own position;
    // the steering engine skips the distance-zero entry.
    let targets: Vec<Vec3> = world
        .query::<(&Transform, &SugarLure)>()
        .iter(world)
        .map(|(t, _)| t.position)
        .collect();
    let neighbors: Vec<Vec3> = world
        .query::<(&Transform, &AntAgent)>()
        .iter(world)
        .map(|(t, _)| t.position)
        .collect();

    let mut ants = world.query::<(&mut Transform, &mut Velocity, &AntAgent)>();
    for (mut transform, mut velocity, agent) in ants.iter_mut(world) {
        steering::step_ant(
            params,
            agent,
            &mut transform,
            &mut velocity,
            time,
            dt,
            &targets,
            &neighbors,
            rng,
        );
    }
}

/// Gentle vertical bob of the sugar cubes. Host-scene animation only; the
/// ants just see the moving positions in their next snapshot.
pub fn bob_sugar(world: &mut World, time: f32) {
    let mut cubes = world.query::<(&mut Transform, &SugarLure)>();
    for (mut transform, lure) in cubes.iter_mut(world) {
        transform.position.y = lure.rest_y + (time * BOB_FREQ + lure.bob_phase).sin() * BOB_AMPLITUDE;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn spawns_the_full_scene() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(1);
        spawn_colony(&mut world, &mut rng);
        spawn_sugar(&mut world, &mut rng);

        let ants = world.query::<&AntAgent>().iter(&world).count();
        let cubes = world.query::<&SugarLure>().iter(&world).count();
        assert_eq!(ants, ANT_COUNT);
        assert_eq!(cubes, SUGAR_SPOTS.len());
    }

    #[test]
    fn ants_never_move_the_sugar() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(2);
        spawn_colony(&mut world, &mut rng);
        spawn_sugar(&mut world, &mut rng);

        let before: Vec<Vec3> = world
            .query::<(&Transform, &SugarLure)>()
            .iter(&world)
            .map(|(t, _)| t.position)
            .collect();

        let params = SteeringParams::default();
        for i in 0..120 {
            advance_colony(&mut world, &params, i as f32 * DT, DT, &mut rng);
        }

        let after: Vec<Vec3> = world
            .query::<(&Transform, &SugarLure)>()
            .iter(&world)
            .map(|(t, _)| t.position)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn updates_are_simultaneous_within_a_tick() {
        // Two ants mirrored across the origin, wander and jitter disabled.
        // With a shared pre-frame snapshot the update is symmetric, so the
        // configuration stays mirrored. An implementation that let the
        // second ant see the first ant's fresh position would break this.
        let mut world = World::new();
        let agent = AntAgent {
            speed: ANT_SPEED,
            wander_radius: 0.0,
            phase: 0.0,
        };
        for x in [-0.05f32, 0.05] {
            world.spawn((
                Transform::from_position(Vec3::new(x, GROUND_Y, 0.0)),
                Velocity::default(),
                agent,
            ));
        }

        let params = SteeringParams {
            jitter: 0.0,
            ..SteeringParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        for i in 0..60 {
            advance_colony(&mut world, &params, i as f32 * DT, DT, &mut rng);
        }

        let xs: Vec<f32> = world
            .query::<(&Transform, &AntAgent)>()
            .iter(&world)
            .map(|(t, _)| t.position.x)
            .collect();
        assert_eq!(xs.len(), 2);
        assert!(
            (xs[0] + xs[1]).abs() < 1e-5,
            "mirror symmetry broken: {xs:?}"
        );
    }

    #[test]
    fn sugar_bob_stays_within_amplitude() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(4);
        spawn_sugar(&mut world, &mut rng);
        for i in 0..400 {
            bob_sugar(&mut world, i as f32 * 0.033);
            for (t, lure) in world.query::<(&Transform, &SugarLure)>().iter(&world) {
                assert!((t.position.y - lure.rest_y).abs() <= BOB_AMPLITUDE + 1e-6);
            }
        }
    }
}
