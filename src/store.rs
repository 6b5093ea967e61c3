use crate::canvas::Surface;
use crate::particle::{self, Particle};
use std::f32::consts::TAU;

const SPARKLE_CHANCE: f32 = 0.15;
const SPARKLE_COUNT: usize = 2;
const SPARKLE_LIFE: i32 = 18;
const SPARKLE_MAX_SPEED: f32 = 1.6;

/// Owns every live particle, in insertion order.
#[derive(Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Runs one frame over every particle in store order: kinematics, draw,
    /// sparkle while dying, then eviction once dead. Sparkles spawned during
    /// the pass are appended afterwards and first move on the next frame.
    pub fn step_and_prune<S: Surface + ?Sized>(&mut self, surface: &mut S, rng: &mut fastrand::Rng) {
        let mut sparkles = Vec::new();

        self.particles.retain_mut(|p| {
            *p = particle::step(*p);
            let dead = p.is_dead();

            if !dead {
                particle::render(p, surface);
            }

            if p.emits_sparkles() && p.is_dying() && rng.f32() < SPARKLE_CHANCE {
                for _ in 0..SPARKLE_COUNT {
                    let angle = rng.f32() * TAU;
                    let speed = rng.f32() * SPARKLE_MAX_SPEED;
                    sparkles.push(Particle::launch(
                        p.x,
                        p.y,
                        angle,
                        speed,
                        p.color(),
                        SPARKLE_LIFE,
                        particle::random_radius(rng),
                    )
                    .as_sparkle());
                }
            }

            !dead
        });

        self.particles.append(&mut sparkles);
    }
}
