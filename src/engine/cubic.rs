// Cubic congestion window governing in-flight interest concurrency.

use std::time::Instant;

/// Tunables for the cubic window. Defaults follow TCP-Cubic.
#[derive(Debug, Clone, Copy)]
pub struct CubicConfig {
    /// Initial window, in interests.
    pub init_cwnd: f64,
    /// Multiplicative decrease factor applied on a loss signal.
    pub beta: f64,
    /// Cubic scaling constant.
    pub c: f64,
}

impl Default for CubicConfig {
    fn default() -> Self {
        Self {
            init_cwnd: 1.0,
            beta: 0.7,
            c: 0.4,
        }
    }
}

/// Window-based rate control: slow start until the first loss, then concave
/// cubic growth toward (and past) the window size at which the loss occurred,
/// with multiplicative decrease on every loss signal.
pub struct CubicWindow {
    config: CubicConfig,
    cwnd: f64,
    ssthresh: f64,
    w_max: f64,
    epoch_start: Option<Instant>,
}

impl CubicWindow {
    pub fn new(config: CubicConfig) -> Self {
        Self {
            config,
            cwnd: config.init_cwnd.max(1.0),
            ssthresh: f64::INFINITY,
            w_max: 0.0,
            epoch_start: None,
        }
    }

    /// Current concurrency budget, never below one interest.
    pub fn window(&self) -> usize {
        self.cwnd.floor().max(1.0) as usize
    }

    /// An interest was satisfied: grow the window.
    pub fn on_ack(&mut self) {
        if self.cwnd < self.ssthresh {
            // Slow start.
            self.cwnd += 1.0;
            return;
        }

        let epoch = *self.epoch_start.get_or_insert_with(Instant::now);
        let t = epoch.elapsed().as_secs_f64();
        // K: time to grow back to w_max along the cubic curve.
        let k = (self.w_max * (1.0 - self.config.beta) / self.config.c).cbrt();
        let target = self.config.c * (t - k).powi(3) + self.w_max;
        if target > self.cwnd {
            self.cwnd += (target - self.cwnd) / self.cwnd;
        } else {
            // Below the curve: probe gently.
            self.cwnd += 0.01 / self.cwnd;
        }
    }

    /// Loss signal (timeout or nack): back off multiplicatively and start a
    /// new cubic epoch.
    pub fn on_loss(&mut self) {
        self.w_max = self.cwnd;
        self.cwnd = (self.cwnd * self.config.beta).max(1.0);
        self.ssthresh = self.cwnd;
        self.epoch_start = None;
    }
}

impl Default for CubicWindow {
    fn default() -> Self {
        Self::new(CubicConfig::default())
    }
}
