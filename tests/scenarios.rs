//! End-to-end behaviour of the stepped simulation.

use fanflow::prelude::*;
use fanflow::thermal::target_temperature;

const DT: f32 = 1.0 / 60.0;

fn build(count: usize, seed: u64, env: EnvironmentState) -> Simulation {
    Simulation::builder()
        .with_particle_count(count)
        .with_seed(seed)
        .with_environment(env)
        .build()
        .unwrap()
}

fn mean_target_error(sim: &Simulation, mut select: impl FnMut(&Particle) -> bool) -> f32 {
    let room = sim.room();
    let (sum, n) = sim
        .field()
        .particles()
        .iter()
        .filter(|p| select(p))
        .fold((0.0f32, 0usize), |(sum, n), p| {
            (sum + (p.temperature - target_temperature(room, p.position.y)).abs(), n + 1)
        });
    assert!(n > 0, "empty selection");
    sum / n as f32
}

#[test]
fn test_fan_off_stays_finite_and_bounded() {
    let mut sim = build(1000, 11, EnvironmentState::new());
    for _ in 0..500 {
        sim.step(DT);
        let stats = FieldStats::collect(sim.field(), sim.room());
        assert_eq!(stats.non_finite, 0, "non-finite at frame {}", sim.frame());
        assert_eq!(stats.out_of_bounds, 0, "escaped at frame {}", sim.frame());
        assert!(stats.min_temperature >= 0.0 && stats.max_temperature <= 1.0);
    }
    assert_eq!(sim.field().len(), 1000);
}

#[test]
fn test_fan_on_stays_finite_and_bounded() {
    for direction in [FanDirection::Forward, FanDirection::Reverse] {
        let env = EnvironmentState::running(5.0, direction)
            .with_window_open(true)
            .with_door_open(true);
        let mut sim = build(1000, 17, env);
        for _ in 0..300 {
            sim.step(DT);
            let stats = FieldStats::collect(sim.field(), sim.room());
            assert!(stats.is_healthy(), "{:?} at frame {}: {:?}", direction, sim.frame(), stats);
            assert!(stats.min_temperature >= 0.0 && stats.max_temperature <= 1.0);
        }
    }
}

#[test]
fn test_forward_fan_pushes_air_down_under_the_blades() {
    let env = EnvironmentState::running(5.0, FanDirection::Forward);
    let mut sim = build(2000, 3, env);
    let radius = env.downdraft_radius();
    let axis = sim.room().fan_axis;
    let fan_y = sim.room().fan_y;
    let floor_y = sim.room().floor_y;

    let mut vy_sum = 0.0f64;
    let mut samples = 0usize;
    for _ in 0..100 {
        sim.step(DT);
        let column = FieldStats::region(sim.field(), sim.room(), |p| {
            let dx = p.position.x - axis.x;
            let dz = p.position.z - axis.y;
            dx.hypot(dz) < radius && p.position.y < fan_y && p.position.y > floor_y + 0.05
        });
        vy_sum += column.mean_velocity.y as f64 * column.count as f64;
        samples += column.count;
    }

    assert!(samples > 0);
    let mean_vy = vy_sum / samples as f64;
    assert!(mean_vy < 0.0, "mean vertical velocity in the column was {}", mean_vy);
}

#[test]
fn test_reverse_fan_lifts_air_under_the_blades() {
    let env = EnvironmentState::running(5.0, FanDirection::Reverse);
    let mut sim = build(2000, 4, env);
    let radius = env.downdraft_radius();
    let fan_y = sim.room().fan_y;
    let floor_y = sim.room().floor_y;

    sim.step(DT);
    let column = FieldStats::region(sim.field(), sim.room(), |p| {
        p.position.x.hypot(p.position.z) < radius * 0.8
            && p.position.y < fan_y - 1.0
            && p.position.y > floor_y + 0.5
    });
    assert!(column.count > 0);
    assert!(column.mean_velocity.y > 0.0);
}

#[test]
fn test_open_window_cools_the_window_wall() {
    let window_x = -RoomGeometry::default().bounds.x * 0.7;
    let near_window = |p: &Particle| p.position.x < window_x;

    let mut open = build(3000, 21, EnvironmentState::new().with_window_open(true));
    let mut closed = build(3000, 21, EnvironmentState::new());
    for _ in 0..200 {
        open.step(DT);
        closed.step(DT);
    }

    let open_stats = FieldStats::region(open.field(), open.room(), near_window);
    let closed_stats = FieldStats::region(closed.field(), closed.room(), near_window);
    assert!(open_stats.count > 0 && closed_stats.count > 0);
    assert!(
        open_stats.mean_temperature < closed_stats.mean_temperature,
        "open {} vs closed {}",
        open_stats.mean_temperature,
        closed_stats.mean_temperature
    );
}

#[test]
fn test_open_window_draws_air_toward_it() {
    let mut sim = build(2000, 8, EnvironmentState::new().with_window_open(true));
    let window_x = -sim.room().bounds.x * 0.7;
    let before = FieldStats::region(sim.field(), sim.room(), |p| p.position.x < window_x).count;
    for _ in 0..60 {
        sim.step(DT);
    }
    let after = FieldStats::region(sim.field(), sim.room(), |p| p.position.x < window_x).count;
    assert!(after > before, "{} -> {} particles by the window", before, after);
}

#[test]
fn test_fan_off_relaxes_toward_height_profile() {
    let mut sim = build(2000, 5, EnvironmentState::new());
    let initial = mean_target_error(&sim, |_| true);
    assert!(initial > 0.05);

    for _ in 0..100 {
        sim.step(DT);
    }
    let after = mean_target_error(&sim, |_| true);
    assert!(after < initial * 0.6, "error went from {} to {}", initial, after);

    // Away from floor cooling and ceiling heating the profile is reached
    // and held.
    let band = |p: &Particle| p.position.y.abs() < 1.5;
    for _ in 0..200 {
        sim.step(DT);
    }
    let settled = mean_target_error(&sim, band);
    for _ in 0..200 {
        sim.step(DT);
    }
    let held = mean_target_error(&sim, band);
    assert!(settled < 0.06, "band error {}", settled);
    assert!(held < 0.06, "band error {}", held);
}

#[test]
fn test_environment_commands_between_steps() {
    let mut sim = build(500, 2, EnvironmentState::new());
    sim.step(DT);
    sim.environment_mut().toggle_power();
    sim.environment_mut().set_speed(3.0);
    assert_eq!(sim.environment().fan_mode(), FanMode::Forward);
    sim.step(DT);
    sim.environment_mut().toggle_direction();
    assert_eq!(sim.environment().fan_mode(), FanMode::Reverse);
    sim.step(DT);

    let census = ZoneCensus::collect(sim.field(), sim.environment(), sim.room(), sim.obstacles());
    assert!(census.zoned() > 0);
    assert_eq!(census.zoned() + census.unzoned, 500);
}
