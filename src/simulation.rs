//! Simulation builder and runner

use crate::color::ColorScheme;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::noise::{NoiseField, NoiseMode};
use crate::particle::Particle;
use crate::render::{self, RenderVertex};
use crate::store::{Frame, ParticleStore, StepStats};
use glam::Vec3;

/// Where particle colors come from.
enum ColorSource {
    Scheme(ColorScheme),
    Gradient(Box<dyn Fn(f32) -> Vec3 + Send + Sync>),
}

impl ColorSource {
    #[inline]
    fn color(&self, speed: f32, position: Vec3) -> Vec3 {
        match self {
            ColorSource::Scheme(scheme) => scheme.color(speed, position),
            ColorSource::Gradient(gradient) => gradient(speed),
        }
    }
}

/// Derive the noise table seed from the simulation seed.
fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Particles on a sphere, driven by a noise field.
///
/// Build with [`Simulation::new`], optionally chain `with_*` methods, call
/// [`init`](Simulation::init) once, then call [`update`](Simulation::update)
/// once per frame with a caller-maintained step counter.
///
/// ```ignore
/// let mut sim = Simulation::new(SimulationConfig::default())?
///     .with_colors(ColorScheme::Speed(SpeedGradient::new(Palette::Fire, 0.0, 0.1)))?;
/// sim.init()?;
///
/// let mut step = 0;
/// loop {
///     sim.update(0.5, step);
///     render(sim.particles());
///     step += 1;
/// }
/// ```
pub struct Simulation {
    config: SimulationConfig,
    noise: NoiseField,
    store: ParticleStore,
    colors: ColorSource,
    initialized: bool,
    last_stats: StepStats,
}

impl Simulation {
    /// Validate `config` and build an empty simulation.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let noise = NoiseField::new(&config.noise, noise_seed(config.seed));
        let colors = ColorSource::Scheme(config.colors.clone());

        Ok(Self {
            config,
            noise,
            store: ParticleStore::new(),
            colors,
            initialized: false,
            last_stats: StepStats::default(),
        })
    }

    /// Build a simulation around existing particles instead of sampling them.
    ///
    /// `particle_count` in `config` is overwritten with `particles.len()`.
    /// The result counts as initialized.
    pub fn from_particles(
        mut config: SimulationConfig,
        particles: Vec<Particle>,
    ) -> Result<Self, SimulationError> {
        config.particle_count = particles.len();
        let mut sim = Self::new(config)?;
        sim.store = ParticleStore::from_particles(particles);
        sim.initialized = true;
        Ok(sim)
    }

    /// Reseed the noise field and every random stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self.noise = NoiseField::new(&self.config.noise, noise_seed(seed));
        self
    }

    /// Switch the noise strategy.
    ///
    /// The new mode goes through the same checks as [`Simulation::new`].
    pub fn with_noise_mode(mut self, mode: NoiseMode) -> Result<Self, SimulationError> {
        self.config.noise.mode = mode;
        self.config.noise.validate()?;
        self.noise = NoiseField::new(&self.config.noise, noise_seed(self.config.seed));
        Ok(self)
    }

    /// Replace the color scheme.
    pub fn with_colors(mut self, scheme: ColorScheme) -> Result<Self, SimulationError> {
        scheme.validate()?;
        self.config.colors = scheme.clone();
        self.colors = ColorSource::Scheme(scheme);
        Ok(self)
    }

    /// Color particles with a custom speed gradient, overriding the scheme.
    pub fn with_gradient<F>(mut self, gradient: F) -> Self
    where
        F: Fn(f32) -> Vec3 + Send + Sync + 'static,
    {
        self.colors = ColorSource::Gradient(Box::new(gradient));
        self
    }

    /// Populate the particle store. Must be called exactly once.
    pub fn init(&mut self) -> Result<(), SimulationError> {
        if self.initialized {
            return Err(SimulationError::AlreadyInitialized);
        }

        self.store.populate(
            self.config.particle_count,
            self.config.sphere_radius,
            self.config.seed,
            &self.config.spawn,
        );
        self.initialized = true;

        log::debug!(
            "initialized {} particles on a sphere of radius {}",
            self.store.len(),
            self.config.sphere_radius
        );
        Ok(())
    }

    /// Advance every particle by `delta_time`.
    ///
    /// `step` is the caller's frame counter and must increase monotonically;
    /// it drives the noise field's time axis and the pulse schedule.
    pub fn update(&mut self, delta_time: f32, step: u64) -> StepStats {
        if !self.initialized {
            log::warn!("update called before init, ignoring step {}", step);
            return StepStats::default();
        }
        debug_assert!(delta_time.is_finite(), "delta_time must be finite");

        let colors = &self.colors;
        let color = |speed: f32, position: Vec3| colors.color(speed, position);
        let frame = Frame {
            radius: self.config.sphere_radius,
            delta_time,
            step,
            seed: self.config.seed,
            physics: &self.config.physics,
            spawn: &self.config.spawn,
            noise: &self.noise,
            color: &color,
        };

        let stats = self.store.step(&frame);
        if stats.recycled > 0 {
            log::trace!("step {}: recycled {} particles", step, stats.recycled);
        }
        self.last_stats = stats;
        stats
    }

    /// Display color for a particle moving at `speed` at `position`.
    ///
    /// The same function the update uses, exposed for presentation layers.
    pub fn color_for(&self, speed: f32, position: Vec3) -> Vec3 {
        self.colors.color(speed, position)
    }

    /// Active configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn sphere_radius(&self) -> f32 {
        self.config.sphere_radius
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Read-only view of the particles, in store order.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        self.store.as_slice()
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Statistics from the most recent update.
    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.store.iter().map(|p| p.position)
    }

    pub fn velocities(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.store.iter().map(|p| p.velocity)
    }

    pub fn colors(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.store.iter().map(|p| p.color)
    }

    /// Copy positions into `out` as `xyz` triples. See [`render::write_positions`].
    pub fn write_positions(&self, out: &mut [f32]) -> usize {
        render::write_positions(self.particles(), out)
    }

    /// Copy colors into `out` as `rgb` triples. See [`render::write_colors`].
    pub fn write_colors(&self, out: &mut [f32]) -> usize {
        render::write_colors(self.particles(), out)
    }

    /// One interleaved vertex per particle.
    pub fn vertices(&self) -> Vec<RenderVertex> {
        let mut out = Vec::with_capacity(self.len());
        render::fill_vertices(self.particles(), &mut out);
        out
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("particles", &self.store.len())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            particle_count: 64,
            seed: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_init_populates_once() {
        let mut sim = Simulation::new(small_config()).unwrap();
        assert!(sim.is_empty());

        sim.init().unwrap();
        assert_eq!(sim.len(), 64);
        assert!(matches!(sim.init(), Err(SimulationError::AlreadyInitialized)));
    }

    #[test]
    fn test_update_before_init_is_noop() {
        let mut sim = Simulation::new(small_config()).unwrap();
        assert_eq!(sim.update(0.5, 0), StepStats::default());
        assert!(sim.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimulationConfig {
            sphere_radius: -1.0,
            ..small_config()
        };
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Config(ConfigError::InvalidRadius(_)))
        ));
    }

    #[test]
    fn test_builders_validate_their_input() {
        use crate::color::{Palette, SpeedGradient};
        use crate::noise::PulseConfig;

        let zero_loop = NoiseMode::Pulse(PulseConfig {
            loop_frequency: 0,
            ..Default::default()
        });
        assert!(matches!(
            Simulation::new(small_config()).unwrap().with_noise_mode(zero_loop),
            Err(SimulationError::Config(ConfigError::InvalidParameter {
                name: "loop_frequency",
                ..
            }))
        ));

        let reversed = ColorScheme::Speed(SpeedGradient::new(Palette::Fire, 1.0, 0.0));
        assert!(matches!(
            Simulation::new(small_config()).unwrap().with_colors(reversed),
            Err(SimulationError::Config(ConfigError::InvalidRange { .. }))
        ));

        let mut sim = Simulation::new(small_config())
            .unwrap()
            .with_noise_mode(NoiseMode::Pulse(PulseConfig {
                loop_frequency: 1,
                ..Default::default()
            }))
            .unwrap();
        sim.init().unwrap();
        sim.update(0.5, 0);
        assert!(sim.particles().iter().all(|p| p.position.is_finite()));
    }

    #[test]
    fn test_zero_particles() {
        let mut sim = Simulation::new(SimulationConfig {
            particle_count: 0,
            ..small_config()
        })
        .unwrap();
        sim.init().unwrap();
        assert_eq!(sim.update(0.5, 0), StepStats::default());
        assert!(sim.vertices().is_empty());
    }

    #[test]
    fn test_custom_gradient_overrides_scheme() {
        let mut sim = Simulation::new(small_config())
            .unwrap()
            .with_gradient(|_| Vec3::new(0.0, 1.0, 0.0));
        sim.init().unwrap();
        sim.update(0.5, 0);

        assert!(sim.colors().all(|c| c == Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(sim.color_for(1.0, Vec3::ZERO), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_colors_match_color_for() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.init().unwrap();
        sim.update(0.5, 0);

        for p in sim.particles() {
            if p.origin != p.position {
                // Not recycled this step: color is a function of current state.
                assert_eq!(p.color, sim.color_for(p.speed(), p.position));
            }
        }
    }

    #[test]
    fn test_with_seed_changes_population() {
        let mut a = Simulation::new(small_config()).unwrap();
        let mut b = Simulation::new(small_config()).unwrap().with_seed(6);
        a.init().unwrap();
        b.init().unwrap();
        assert_ne!(a.particles()[0].position, b.particles()[0].position);
    }

    #[test]
    fn test_render_buffers_follow_store() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.init().unwrap();
        sim.update(0.5, 0);

        let mut positions = vec![0.0; sim.len() * 3];
        assert_eq!(sim.write_positions(&mut positions), sim.len());
        let p = sim.particles()[10].position;
        assert_eq!(&positions[30..33], &p.to_array());
    }
}
