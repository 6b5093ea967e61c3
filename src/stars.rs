use crate::canvas::Surface;
use crate::particle::Rgb;

const STAR_COLOR: Rgb = (255, 255, 255);

// Portion of the surface (from the top) stars may appear in.
const SKY_FRACTION: f32 = 0.45;

/// Faint twinkling points, redrawn every few frames. The faded background
/// lets each batch linger briefly.
pub struct StarField {
    frame: u64,
    every: u64,
    count: usize,
}

impl StarField {
    pub fn new(every: u64, count: usize) -> Self {
        Self {
            frame: 0,
            every: every.max(1),
            count,
        }
    }

    /// Returns true when this frame drew a batch.
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S, rng: &mut fastrand::Rng) -> bool {
        self.frame += 1;
        if self.frame % self.every != 0 {
            return false;
        }
        let (width, height) = (surface.width(), surface.height());
        for _ in 0..self.count {
            let x = rng.f32() * width;
            let y = rng.f32() * height * SKY_FRACTION;
            surface.plot(x, y, STAR_COLOR, 0.4 * rng.f32() * 0.8);
        }
        true
    }
}

impl Default for StarField {
    fn default() -> Self {
        Self::new(3, 6)
    }
}
