use crate::canvas::Surface;

pub type Rgb = (u8, u8, u8);

pub const GRAVITY: f32 = 0.06;
pub const FRICTION: f32 = 0.99;

/// Life at which a particle is drawn fully opaque. Longer-lived particles
/// clamp at alpha 1 only through their initial value.
pub const FULL_LIFE: i32 = 80;

/// Particles below this life are in their sparkle window.
pub const DYING_LIFE: i32 = 8;

const MIN_ALPHA: f32 = 0.02;

/// A single point of light. Position and velocity are in logical surface
/// units; radius and color are fixed for the particle's whole life.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: i32,
    pub alpha: f32,
    color: Rgb,
    radius: f32,
    emits_sparkles: bool,
}

impl Particle {
    /// Creates a particle at `(x, y)` moving along `angle` (radians, y down)
    /// at `speed` units per frame.
    pub fn launch(x: f32, y: f32, angle: f32, speed: f32, color: Rgb, life: i32, radius: f32) -> Self {
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            life,
            alpha: 1.0,
            color,
            radius,
            emits_sparkles: true,
        }
    }

    /// Marks the particle as a sparkle. Sparkles are excluded from the
    /// sparkle rule.
    pub fn as_sparkle(mut self) -> Self {
        self.emits_sparkles = false;
        self
    }

    pub fn emits_sparkles(&self) -> bool {
        self.emits_sparkles
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_dying(&self) -> bool {
        self.life < DYING_LIFE
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0 || self.alpha <= MIN_ALPHA
    }
}

/// Display radius for a freshly emitted particle, uniform in [1, 3).
pub fn random_radius(rng: &mut fastrand::Rng) -> f32 {
    rng.f32() * 2.0 + 1.0
}

pub fn opacity(life: i32) -> f32 {
    (life as f32 / FULL_LIFE as f32).max(0.0)
}

/// One frame of kinematics. Friction is applied before gravity, and both
/// before the position moves.
pub fn step(mut particle: Particle) -> Particle {
    particle.vx *= FRICTION;
    particle.vy *= FRICTION;
    particle.vy += GRAVITY;
    particle.x += particle.vx;
    particle.y += particle.vy;
    particle.life -= 1;
    particle.alpha = opacity(particle.life);
    particle
}

pub fn render<S: Surface + ?Sized>(particle: &Particle, surface: &mut S) {
    surface.fill_disc(
        particle.x,
        particle.y,
        particle.radius,
        particle.color,
        particle.alpha,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    const WHITE: Rgb = (255, 255, 255);

    #[test]
    fn straight_up_launch_decelerates() {
        let p = Particle::launch(100.0, 200.0, -FRAC_PI_2, 5.0, WHITE, 80, 2.0);
        let next = step(p);
        assert!((next.vy - (-4.89)).abs() < 1e-4, "vy was {}", next.vy);
        assert!(next.y < p.y);
        assert!(next.vx.abs() < 1e-4);
    }

    #[test]
    fn gravity_eventually_turns_the_particle_around() {
        let mut p = Particle::launch(0.0, 0.0, -FRAC_PI_2, 5.0, WHITE, 500, 2.0);
        let mut frames = 0;
        while p.vy < 0.0 {
            p = step(p);
            frames += 1;
            assert!(frames < 200);
        }
        assert!(frames > 1);
    }

    #[test]
    fn alpha_reaches_zero_after_full_life() {
        let mut p = Particle::launch(0.0, 0.0, 0.0, 1.0, WHITE, FULL_LIFE, 1.0);
        for _ in 0..FULL_LIFE {
            p = step(p);
        }
        assert_eq!(p.alpha, 0.0);
        assert!(p.is_dead());
    }

    #[test]
    fn dead_at_low_alpha_before_life_runs_out() {
        let mut p = Particle::launch(0.0, 0.0, 0.0, 0.0, WHITE, 2, 1.0);
        p = step(p);
        assert_eq!(p.life, 1);
        assert!(p.alpha <= MIN_ALPHA);
        assert!(p.is_dead());
    }

    #[test]
    fn dying_window_starts_below_eight() {
        let mut p = Particle::launch(0.0, 0.0, 0.0, 0.0, WHITE, 9, 1.0);
        p = step(p);
        assert!(!p.is_dying());
        p = step(p);
        assert!(p.is_dying());
    }

    #[test]
    fn sparkles_are_excluded_from_the_sparkle_rule() {
        let p = Particle::launch(0.0, 0.0, 0.0, 1.0, WHITE, 18, 1.0);
        assert!(p.emits_sparkles());
        let sparkle = step(p.as_sparkle());
        assert!(!sparkle.emits_sparkles());
        assert_eq!(sparkle.color(), WHITE);
    }

    #[test]
    fn radius_stays_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let r = random_radius(&mut rng);
            assert!((1.0..3.0).contains(&r));
        }
    }

    proptest! {
        #[test]
        fn alpha_tracks_life(
            life in 1i32..200,
            angle in 0.0f32..std::f32::consts::TAU,
            speed in 0.0f32..6.0,
            frames in 1usize..120,
        ) {
            let mut p = Particle::launch(50.0, 50.0, angle, speed, WHITE, life, 2.0);
            for _ in 0..frames {
                let before = p;
                p = step(p);
                prop_assert_eq!(p.life, before.life - 1);
                prop_assert_eq!(p.alpha, (p.life as f32 / 80.0).max(0.0));
                prop_assert!(p.alpha <= before.alpha.max(opacity(before.life)));
                prop_assert_eq!(p.color(), before.color());
                prop_assert_eq!(p.radius(), before.radius());
            }
        }
    }
}
