//! Frame-driven timers. Each one is advanced by the simulation loop with the
//! elapsed frame time, so firing order is deterministic and testable.

const MIN_PERIOD_MS: f32 = 1.0;

/// Repeating timer.
#[derive(Clone, Debug)]
pub struct Interval {
    period_ms: f32,
    elapsed_ms: f32,
}

impl Interval {
    pub fn new(period_ms: f32) -> Self {
        Self {
            period_ms: period_ms.max(MIN_PERIOD_MS),
            elapsed_ms: 0.0,
        }
    }

    pub fn period_ms(&self) -> f32 {
        self.period_ms
    }

    /// Advances the timer and returns how many periods completed.
    pub fn advance(&mut self, dt_ms: f32) -> u32 {
        self.elapsed_ms += dt_ms;
        let mut fired = 0;
        while self.elapsed_ms >= self.period_ms {
            self.elapsed_ms -= self.period_ms;
            fired += 1;
        }
        fired
    }
}

/// One-shot timer. Inert once it has fired.
#[derive(Clone, Debug)]
pub struct Timeout {
    remaining_ms: f32,
    fired: bool,
}

impl Timeout {
    pub fn new(delay_ms: f32) -> Self {
        Self {
            remaining_ms: delay_ms,
            fired: false,
        }
    }

    /// Returns true on exactly one call: the one that crosses the delay.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if self.fired {
            return false;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms <= 0.0 {
            self.fired = true;
        }
        self.fired
    }

    pub fn is_done(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_fires_every_period() {
        let mut interval = Interval::new(800.0);
        let mut fired = 0;
        for _ in 0..200 {
            fired += interval.advance(16.0);
        }
        // 3200ms elapsed
        assert_eq!(fired, 4);
    }

    #[test]
    fn interval_catches_up_on_long_frames() {
        let mut interval = Interval::new(100.0);
        assert_eq!(interval.advance(350.0), 3);
        assert_eq!(interval.advance(50.0), 1);
    }

    #[test]
    fn interval_period_has_a_floor() {
        let mut interval = Interval::new(0.0);
        assert_eq!(interval.period_ms(), 1.0);
        assert_eq!(interval.advance(5.0), 5);
    }

    #[test]
    fn timeout_fires_once() {
        let mut timeout = Timeout::new(500.0);
        let mut fired_at = Vec::new();
        for frame in 0..100 {
            if timeout.advance(16.0) {
                fired_at.push(frame);
            }
        }
        assert_eq!(fired_at, vec![31]);
        assert!(timeout.is_done());
    }
}
