//! Integration tests for the public simulation API.
//!
//! These exercise the invariants a renderer relies on: particles stay on the
//! sphere, velocities stay tangent, and runs are reproducible.

use sphere_flow::prelude::*;
use sphere_flow::{to_cartesian, to_polar, Polar};

const EPS: f32 = 1e-3;

fn config(count: usize) -> SimulationConfig {
    SimulationConfig {
        particle_count: count,
        seed: 1234,
        ..Default::default()
    }
}

fn run(sim: &mut Simulation, frames: u64, delta_time: f32) {
    for step in 0..frames {
        sim.update(delta_time, step);
    }
}

// ============================================================================
// Surface invariants
// ============================================================================

#[test]
fn test_particles_stay_on_sphere() {
    let mut sim = Simulation::new(config(2_000)).unwrap();
    sim.init().unwrap();

    for step in 0..100 {
        sim.update(0.5, step);
        for p in sim.particles() {
            assert!(
                (p.position.length() - 50.0).abs() < EPS,
                "radius drifted to {}",
                p.position.length()
            );
        }
    }
}

#[test]
fn test_velocity_stays_tangent() {
    let mut sim = Simulation::new(config(2_000)).unwrap();
    sim.init().unwrap();

    for step in 0..100 {
        sim.update(0.5, step);
        for p in sim.particles() {
            assert!(p.radial_velocity(50.0).abs() < 1e-5);
        }
    }
}

#[test]
fn test_pulse_mode_keeps_invariants() {
    let mut sim = Simulation::new(config(500))
        .unwrap()
        .with_noise_mode(NoiseMode::Pulse(PulseConfig {
            loop_frequency: 10,
            ..Default::default()
        }))
        .unwrap();
    sim.init().unwrap();

    // Kicks of up to 100 units per step get scaled by noise_strength * dt.
    run(&mut sim, 40, 0.5);
    for p in sim.particles() {
        assert!((p.position.length() - 50.0).abs() < EPS);
        assert!(p.velocity.is_finite());
    }
}

#[test]
fn test_zero_loop_frequency_is_rejected() {
    let result = Simulation::new(config(10))
        .unwrap()
        .with_noise_mode(NoiseMode::Pulse(PulseConfig {
            loop_frequency: 0,
            ..Default::default()
        }));
    assert!(matches!(result, Err(SimulationError::Config(_))));

    let json = r#"{ "noise": { "mode": { "Pulse": { "loop_frequency": 0 } } } }"#;
    assert!(SimulationConfig::from_json(json).is_err());
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_identical_runs_match() {
    let mut a = Simulation::new(config(1_000)).unwrap();
    let mut b = Simulation::new(config(1_000)).unwrap();
    a.init().unwrap();
    b.init().unwrap();

    run(&mut a, 50, 0.5);
    run(&mut b, 50, 0.5);

    assert_eq!(a.particles(), b.particles());
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = Simulation::new(config(100)).unwrap();
    let mut b = Simulation::new(config(100)).unwrap().with_seed(4321);
    a.init().unwrap();
    b.init().unwrap();

    run(&mut a, 5, 0.5);
    run(&mut b, 5, 0.5);

    assert_ne!(a.particles(), b.particles());
}

#[test]
fn test_pulse_runs_are_reproducible() {
    let build = || {
        let mut sim = Simulation::new(config(300))
            .unwrap()
            .with_noise_mode(NoiseMode::Pulse(PulseConfig {
                loop_frequency: 4,
                ..Default::default()
            }))
            .unwrap();
        sim.init().unwrap();
        sim
    };
    let mut a = build();
    let mut b = build();
    run(&mut a, 20, 0.5);
    run(&mut b, 20, 0.5);
    assert_eq!(a.particles(), b.particles());
}

// ============================================================================
// Recycling and damping
// ============================================================================

fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        sphere_radius: 50.0,
        physics: PhysicsConfig {
            friction: 0.02,
            spring_strength: 0.0,
            noise_strength: 0.0,
            ..Default::default()
        },
        ..config(0)
    }
}

#[test]
fn test_stalled_particle_respawns_on_sphere() {
    let mut stalled = Particle::new(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO);
    stalled.origin = Vec3::new(50.0, 0.0, 0.0);

    let mut sim = Simulation::from_particles(quiet_config(), vec![stalled]).unwrap();
    let stats = sim.update(1.0, 0);

    let p = sim.particles()[0];
    assert_eq!(stats.recycled, 1);
    assert!((p.position.length() - 50.0).abs() < EPS);
    assert_eq!(p.origin, p.position);
}

#[test]
fn test_friction_alone_slows_particles() {
    let particles: Vec<Particle> = (0..50)
        .map(|i| {
            let position = to_cartesian(Polar::new(i as f32 * 0.1, 0.3 + i as f32 * 0.05), 50.0);
            let mut p = Particle::new(position, Vec3::ZERO);
            // Tangent direction along increasing theta.
            p.velocity = Vec3::new(-position.y, position.x, 0.0).normalize() * 0.05;
            p
        })
        .collect();
    let before: Vec<f32> = particles.iter().map(|p| p.speed()).collect();

    let mut sim = Simulation::from_particles(quiet_config(), particles).unwrap();
    sim.update(1.0, 0);

    for (p, speed) in sim.particles().iter().zip(before) {
        assert!(p.speed() < speed);
    }
}

#[test]
fn test_single_particle_scenario() {
    let particle = Particle::new(Vec3::new(0.0, 0.0, 50.0), Vec3::new(0.01, 0.0, 0.0));
    let mut sim = Simulation::from_particles(quiet_config(), vec![particle]).unwrap();

    let stats = sim.update(1.0, 0);

    let p = sim.particles()[0];
    assert_eq!(stats.recycled, 0);
    assert!((p.velocity.x - 0.0098).abs() < 1e-6);
    assert!(p.speed() > sim.config().physics.recycle_threshold);
}

// ============================================================================
// Colors and render output
// ============================================================================

#[test]
fn test_colors_are_normalized() {
    let mut sim = Simulation::new(config(500))
        .unwrap()
        .with_colors(ColorScheme::Zoned {
            inner: SpeedGradient::new(Palette::Fire, 0.0, 0.05),
            outer: SpeedGradient::new(Palette::Ocean, 0.0, 0.05),
            boundary: ZoneBoundary::default(),
            threshold: -5.0,
            blend_width: 4.0,
        })
        .unwrap();
    sim.init().unwrap();
    run(&mut sim, 10, 0.5);

    for c in sim.colors() {
        assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
    }
}

#[test]
fn test_vertices_match_particles() {
    let mut sim = Simulation::new(config(32)).unwrap();
    sim.init().unwrap();
    sim.update(0.5, 0);

    let vertices = sim.vertices();
    assert_eq!(vertices.len(), 32);
    for (v, p) in vertices.iter().zip(sim.particles()) {
        assert_eq!(v.position, p.position.to_array());
        assert_eq!(v.color, p.color.to_array());
    }
}

// ============================================================================
// Coordinates
// ============================================================================

#[test]
fn test_initial_population_round_trips_through_polar() {
    let mut sim = Simulation::new(config(1_000)).unwrap();
    sim.init().unwrap();

    for p in sim.particles() {
        let polar = to_polar(p.position);
        assert!(polar.theta > -std::f32::consts::PI - 1e-6 && polar.theta <= std::f32::consts::PI);
        assert!((0.0..=std::f32::consts::PI).contains(&polar.phi));
        let back = to_cartesian(polar, 50.0);
        assert!((back - p.position).length() < 1e-2);
    }
}
