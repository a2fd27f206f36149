// Ant steering engine: wander + seek + separation blended into a damped
// velocity, integrated on the XZ ground plane.
//
// Per tick, for one ant:
//   1. pick the nearest sugar cube (squared distance, first wins ties)
//   2. wander   — two phase-shifted sinusoids of accumulated time
//   3. seek     — toward the nearest cube, weighted by inverse distance
//   4. separate — away from neighbors inside the separation radius
//   5. blend with a slice of the previous velocity + a tiny random jitter
//   6. exponentially smooth the velocity toward the blend, clamp its speed
//   7. Euler-integrate, re-pin y to the ground, face the travel direction
//
// The wander signal is a pure function of time and the ant's phase offset;
// the only genuine per-frame randomness is the jitter, drawn from an
// injected RNG so trajectories replay exactly under a fixed seed.

use glam::Vec3;
use rand::Rng;

use super::components::{AntAgent, Transform, Velocity};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Height ants are pinned to every tick, regardless of steering numerics.
pub const GROUND_Y: f32 = 0.05;

/// Fraction of an ant's nominal speed it is actually allowed to reach.
/// The headroom keeps the damped velocity from saturating visibly.
pub const SPEED_HEADROOM: f32 = 0.6;

/// Below this length the home vector is not normalized (already at target).
pub const SEEK_EPSILON: f32 = 1e-3;

/// Squared-speed threshold under which the heading is left untouched, so a
/// near-stationary ant keeps its last facing instead of snapping.
pub const HEADING_EPSILON_SQ: f32 = 1e-5;

/// Velocity smoothing rate in 1/sec. `1 - exp(-rate * dt)` of the gap to the
/// desired velocity is closed each tick; 3.71/s closes ~6% per frame at
/// 60 Hz, which is the tuned reference feel, at any frame rate.
pub const VELOCITY_SMOOTHING: f32 = 3.71;

// Wander sinusoid frequencies (rad/sec) and the scale applied to the phase
// offset on the z axis so the two channels decorrelate.
const WANDER_FREQ_X: f32 = 1.2;
const WANDER_FREQ_Z: f32 = 0.9;
const WANDER_PHASE_SKEW: f32 = 0.7;

// Fixed blend weights: seek strongest, separation next (see
// `SteeringParams::separation_strength`), wander lighter, inertia smallest.
const WANDER_BLEND: f32 = 0.6;
const SEEK_BLEND: f32 = 1.0;
const INERTIA_BLEND: f32 = 0.4;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Colony-wide steering tunables.
///
/// Defaults reproduce the reference vignette; they were tuned by eye, not
/// derived, so the debug overlay exposes them as sliders.
#[derive(Debug, Clone, Copy)]
pub struct SteeringParams {
    /// Neighbors closer than this push the ant away.
    pub separation_radius: f32,
    /// Blend weight of the (unit-length) separation force.
    pub separation_strength: f32,
    /// Cap on the inverse-distance seek weight, so a cube right under an
    /// ant pulls hard but never snaps it instantly onto the target.
    pub seek_weight_cap: f32,
    /// Distance softening added before inverting, keeps the weight finite
    /// at zero distance.
    pub seek_falloff: f32,
    /// Half-range of the uniform per-axis jitter added to the blend.
    pub jitter: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            separation_radius: 0.35,
            separation_strength: 0.8,
            seek_weight_cap: 1.5,
            seek_falloff: 0.5,
            jitter: 0.01,
        }
    }
}

// ============================================================================
// FORCE TERMS
// ============================================================================

/// Nearest target by squared distance, with its squared distance.
/// First-encountered wins on exact ties. `None` when `targets` is empty.
pub fn nearest_target(position: Vec3, targets: &[Vec3]) -> Option<(Vec3, f32)> {
    let mut best: Option<(Vec3, f32)> = None;
    for &t in targets {
        let d_sq = position.distance_squared(t);
        if best.is_none_or(|(_, b)| d_sq < b) {
            best = Some((t, d_sq));
        }
    }
    best
}

/// Smooth time-driven drift in the ground plane, bounded by
/// `0.5 * wander_radius` per axis. Continuous in `time` — this is NOT
/// resampled randomness, two ants differ only by their phase offset.
pub fn wander_force(time: f32, phase: f32, wander_radius: f32) -> Vec3 {
    Vec3::new(
        (time * WANDER_FREQ_X + phase).sin(),
        0.0,
        (time * WANDER_FREQ_Z + phase * WANDER_PHASE_SKEW).cos(),
    ) * (0.5 * wander_radius)
}

/// Ground-projected pull toward the nearest target, weighted by inverse
/// distance (clamped). Zero when there are no targets.
pub fn seek_force(position: Vec3, targets: &[Vec3], params: &SteeringParams) -> Vec3 {
    let Some((target, dist_sq)) = nearest_target(position, targets) else {
        return Vec3::ZERO;
    };

    let mut home = target - position;
    home.y = 0.0;
    if home.length() > SEEK_EPSILON {
        home = home.normalize();
    }

    // Closer cubes pull harder, capped so ants approach and then circle
    // instead of locking on.
    let weight = (1.0 / (dist_sq.sqrt() + params.seek_falloff)).clamp(0.0, params.seek_weight_cap);
    home * weight
}

/// Unit-length push away from neighbors inside `radius`, or zero when none
/// contribute. Each away-vector is weighted by inverse distance before
/// averaging; a neighbor at exactly zero distance is the ant's own entry in
/// the snapshot and is skipped.
pub fn separation_force(position: Vec3, neighbors: &[Vec3], radius: f32) -> Vec3 {
    let mut push = Vec3::ZERO;
    let mut count = 0;

    for &other in neighbors {
        let d = position.distance(other);
        if d > 0.0 && d < radius {
            // (position - other) / d is the unit away-vector; the extra /d
            // weights near neighbors harder.
            push += (position - other) / (d * d);
            count += 1;
        }
    }

    if count == 0 {
        return Vec3::ZERO;
    }
    (push / count as f32).normalize_or_zero()
}

// ============================================================================
// PER-TICK STEP
// ============================================================================

/// Advance one ant by `dt` seconds against per-frame snapshots of target and
/// neighbor positions. Mutates position, velocity, and heading in place.
///
/// Empty snapshots are fine (the matching force terms are zero). The
/// snapshots must be taken before ANY ant of the frame is stepped, so all
/// ants see the same pre-update world — see `systems::advance_colony`.
#[allow(clippy::too_many_arguments)]
pub fn step_ant(
    params: &SteeringParams,
    agent: &AntAgent,
    transform: &mut Transform,
    velocity: &mut Velocity,
    time: f32,
    dt: f32,
    targets: &[Vec3],
    neighbors: &[Vec3],
    rng: &mut impl Rng,
) {
    let wander = wander_force(time, agent.phase, agent.wander_radius);
    let seek = seek_force(transform.position, targets, params);
    let separation = separation_force(transform.position, neighbors, params.separation_radius);

    let mut desired = wander * WANDER_BLEND
        + seek * SEEK_BLEND
        + separation * params.separation_strength
        + velocity.linear * INERTIA_BLEND;

    if params.jitter > 0.0 {
        desired.x += rng.gen_range(-params.jitter..params.jitter);
        desired.z += rng.gen_range(-params.jitter..params.jitter);
    }

    // Frame-rate-independent approach toward the blend, then speed cap.
    let alpha = 1.0 - (-VELOCITY_SMOOTHING * dt).exp();
    velocity.linear = velocity.linear.lerp(desired, alpha);
    velocity.linear = velocity.linear.clamp_length_max(agent.speed * SPEED_HEADROOM);

    transform.position += velocity.linear * dt;
    // Normalization numerics can leak into y; the ground pin is exact.
    transform.position.y = GROUND_Y;

    if velocity.linear.length_squared() > HEADING_EPSILON_SQ {
        transform.heading = velocity.linear.x.atan2(velocity.linear.z);
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

    fn ant() -> (AntAgent, Transform, Velocity) {
        (
            AntAgent {
                speed: 0.95,
                wander_radius: 0.6,
                phase: 12.5,
            },
            Transform::from_position(Vec3::new(0.6, GROUND_Y, -0.8)),
            Velocity::default(),
        )
    }

    #[test]
    fn ground_pin_is_exact() {
        let params = SteeringParams::default();
        let (agent, mut t, mut v) = ant();
        let mut rng = StdRng::seed_from_u64(1);
        let targets = [Vec3::new(0.9, 0.12, -0.9)];
        for i in 0..500 {
            let time = i as f32 * DT;
            step_ant(&params, &agent, &mut t, &mut v, time, DT, &targets, &[], &mut rng);
            assert_eq!(t.position.y, GROUND_Y);
        }
    }

    #[test]
    fn speed_never_exceeds_headroom() {
        let params = SteeringParams::default();
        let (agent, mut t, mut v) = ant();
        let mut rng = StdRng::seed_from_u64(2);
        let targets = [Vec3::new(2.0, 0.12, 2.0)];
        for i in 0..500 {
            let time = i as f32 * DT;
            step_ant(&params, &agent, &mut t, &mut v, time, DT, &targets, &[], &mut rng);
            assert!(v.linear.length() <= agent.speed * SPEED_HEADROOM + 1e-4);
        }
    }

    #[test]
    fn no_targets_means_no_seek() {
        let params = SteeringParams::default();
        assert_eq!(seek_force(Vec3::new(1.0, GROUND_Y, 1.0), &[], &params), Vec3::ZERO);
    }

    #[test]
    fn nearest_tie_break_keeps_first() {
        let pos = Vec3::ZERO;
        let targets = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)];
        let (t, _) = nearest_target(pos, &targets).unwrap();
        assert_eq!(t, targets[0]);
    }

    #[test]
    fn wander_is_bounded_and_planar() {
        for i in 0..1000 {
            let w = wander_force(i as f32 * 0.05, 7.3, 0.6);
            assert_eq!(w.y, 0.0);
            assert!(w.length() <= 0.5 * 0.6 * std::f32::consts::SQRT_2 + 1e-6);
        }
    }

    #[test]
    fn single_target_draws_the_ant_in() {
        let params = SteeringParams::default();
        let agent = AntAgent {
            speed: 0.95,
            wander_radius: 0.6,
            phase: 3.0,
        };
        let mut t = Transform::from_position(Vec3::new(2.0, GROUND_Y, 0.0));
        let mut v = Velocity::default();
        let mut rng = StdRng::seed_from_u64(3);
        let target = Vec3::new(0.0, 0.12, 0.0);
        let initial = t.position.distance(target);

        let mut closest = f32::INFINITY;
        for i in 0..1200 {
            let time = i as f32 * DT;
            step_ant(&params, &agent, &mut t, &mut v, time, DT, &[target], &[], &mut rng);
            closest = closest.min(t.position.distance(target));
        }

        // Reaches the cube, then loiters near it rather than flying off.
        assert!(closest < 0.4, "closest approach {closest}");
        let settled = t.position.distance(target);
        assert!(settled < initial, "ended at {settled}, started at {initial}");
        assert!(settled < 1.2, "wandered too far after arrival: {settled}");
    }

    #[test]
    fn crowded_ants_repel() {
        // Wander and jitter off: pure separation + inertia, deterministic.
        let params = SteeringParams {
            jitter: 0.0,
            ..SteeringParams::default()
        };
        let agent = AntAgent {
            speed: 0.95,
            wander_radius: 0.0,
            phase: 0.0,
        };
        let mut a = Transform::from_position(Vec3::new(-0.05, GROUND_Y, 0.0));
        let mut b = Transform::from_position(Vec3::new(0.05, GROUND_Y, 0.0));
        let mut va = Velocity::default();
        let mut vb = Velocity::default();
        let mut rng = StdRng::seed_from_u64(4);

        let initial = a.position.distance(b.position);
        for i in 0..240 {
            let time = i as f32 * DT;
            // Same pre-step snapshot for both, as the frame driver does.
            let snapshot = [a.position, b.position];
            step_ant(&params, &agent, &mut a, &mut va, time, DT, &[], &snapshot, &mut rng);
            step_ant(&params, &agent, &mut b, &mut vb, time, DT, &[], &snapshot, &mut rng);
        }
        let after = a.position.distance(b.position);
        assert!(after > initial, "ants failed to repel: {initial} -> {after}");
        assert!(after >= params.separation_radius - 0.05);
    }

    #[test]
    fn trajectories_replay_under_fixed_seed() {
        let params = SteeringParams::default();
        let run = |seed: u64| {
            let (agent, mut t, mut v) = ant();
            let mut rng = StdRng::seed_from_u64(seed);
            let targets = [Vec3::new(0.9, 0.12, -0.9), Vec3::new(-1.1, 0.12, -1.8)];
            let neighbors = [Vec3::new(0.4, GROUND_Y, -0.6)];
            for i in 0..300 {
                let time = i as f32 * DT;
                step_ant(
                    &params, &agent, &mut t, &mut v, time, DT, &targets, &neighbors, &mut rng,
                );
            }
            (t.position, v.linear, t.heading)
        };
        assert_eq!(run(42), run(42));
    }
}
