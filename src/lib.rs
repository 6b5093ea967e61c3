//! Particle fireworks for true-color terminals.
//!
//! Particles live in a [`store::ParticleStore`] and are advanced once per
//! frame by [`particle::step`]. They are composited additively onto a
//! [`canvas::Canvas`] that is never cleared, only faded, so every particle
//! leaves a trail. [`effects::fireworks::FireworksEffect`] ties the store,
//! rockets, timers and controls together.

pub mod canvas;
pub mod config;
pub mod controls;
pub mod effects;
pub mod emitter;
pub mod error;
pub mod particle;
pub mod stars;
pub mod store;
pub mod timer;
