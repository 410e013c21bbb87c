//! Fixed-step simulation clock

/// Counts fixed ticks and the simulated time they add up to
#[derive(Debug, Clone)]
pub struct Clock {
    delta: f32,
    tick: u64,
    elapsed: f64,
}

impl Clock {
    /// Create a clock ticking `tick_rate` times per second
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            delta: 1.0 / tick_rate.max(1) as f32,
            tick: 0,
            elapsed: 0.0,
        }
    }

    /// Advance by one tick
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed += f64::from(self.delta);
    }

    /// Seconds per tick
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Number of completed ticks
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since start
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(60)
    }
}
