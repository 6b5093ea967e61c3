use crate::particle::{self, Particle, Rgb};
use crate::store::ParticleStore;
use std::f32::consts::{FRAC_PI_2, TAU};

pub const DEFAULT_PALETTE: [Rgb; 7] = [
    (0xff, 0xdd, 0x57),
    (0xff, 0xd1, 0x66),
    (0xff, 0x8a, 0x00),
    (0xff, 0x3d, 0x81),
    (0x7a, 0xfc, 0xff),
    (0x9b, 0x5c, 0xff),
    (0xff, 0x6b, 0x6b),
];

pub const DEFAULT_BURST_COUNT: usize = 80;

pub const ROCKET_STEPS: u32 = 45;
pub const ROCKET_BURST_COUNT: usize = 90;

const TRAIL_COLOR: Rgb = (255, 255, 255);
const TRAIL_LIFE: i32 = 18;

#[derive(Clone, Copy, Debug)]
pub struct BurstOptions<'a> {
    pub count: usize,
    pub palette: &'a [Rgb],
}

impl Default for BurstOptions<'static> {
    fn default() -> Self {
        Self {
            count: DEFAULT_BURST_COUNT,
            palette: &DEFAULT_PALETTE,
        }
    }
}

impl<'a> BurstOptions<'a> {
    pub fn new(count: usize, palette: &'a [Rgb]) -> Self {
        Self { count, palette }
    }
}

/// Radial explosion: `count` particles leave `(x, y)` in random directions.
/// Speeds are the sum of two uniform terms, so slow particles dominate and
/// the burst has a dense core.
pub fn burst(store: &mut ParticleStore, x: f32, y: f32, options: &BurstOptions, rng: &mut fastrand::Rng) {
    let palette = if options.palette.is_empty() {
        &DEFAULT_PALETTE[..]
    } else {
        options.palette
    };

    for _ in 0..options.count {
        let angle = rng.f32() * TAU;
        let speed = rng.f32() * 4.0 + rng.f32() * 2.0;
        let color = palette[rng.usize(..palette.len())];
        let life = rng.i32(60..100);
        store.add(Particle::launch(x, y, angle, speed, color, life, particle::random_radius(rng)));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Ascending,
    Done,
}

/// A rocket is a scripted ascent rather than a physics body: one trail
/// particle per tick along a straight line to the peak, then a burst.
#[derive(Clone, Debug)]
pub struct Rocket {
    x: f32,
    start_y: f32,
    peak_y: f32,
    tick_count: u32,
    phase: Phase,
}

impl Rocket {
    pub fn new(x: f32, start_y: f32, peak_y: f32) -> Self {
        Self {
            x,
            start_y,
            peak_y,
            tick_count: 0,
            phase: Phase::Ascending,
        }
    }

    /// Picks a launch column in the middle 80% of the surface, starting just
    /// below the bottom edge and peaking in the upper part.
    pub fn launch(width: f32, height: f32, rng: &mut fastrand::Rng) -> Self {
        let x = rng.f32() * (width * 0.8) + width * 0.1;
        let start_y = height + 20.0;
        let peak_y = rng.f32() * (height * 0.45) + 40.0;
        Self::new(x, start_y, peak_y)
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn peak_y(&self) -> f32 {
        self.peak_y
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Emits one trail particle; on the final tick also fires the terminal
    /// burst. A finished rocket ignores further ticks.
    pub fn tick(&mut self, store: &mut ParticleStore, palette: &[Rgb], rng: &mut fastrand::Rng) -> Phase {
        if self.phase == Phase::Done {
            return Phase::Done;
        }

        let rise = self.tick_count as f32 * (self.start_y - self.peak_y) / ROCKET_STEPS as f32;
        store.add(Particle::launch(
            self.x - rng.f32() * 2.0,
            self.start_y - rise,
            -FRAC_PI_2 + (rng.f32() - 0.5) * 0.4,
            rng.f32() * 0.8 + 0.6,
            TRAIL_COLOR,
            TRAIL_LIFE,
            particle::random_radius(rng),
        ));
        self.tick_count += 1;

        if self.tick_count >= ROCKET_STEPS {
            burst(
                store,
                self.x,
                self.peak_y,
                &BurstOptions::new(ROCKET_BURST_COUNT, palette),
                rng,
            );
            self.phase = Phase::Done;
        }
        self.phase
    }
}
