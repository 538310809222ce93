//! Frame-driven auto-rotation of the globe's spin axis.

/// How the globe spins when the user is not interacting. Chosen once at
/// configuration time; both variants advance only the lambda axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationPolicy {
    /// Spin during an idle window after init or interaction, at a speed
    /// inversely proportional to the current scale (zoomed-in views rotate
    /// slower). Once the idle window elapses the spin stops and the intro
    /// banner is faded out, exactly once for the lifetime of the driver.
    /// Fully suspended while a drag is active.
    IdleAware { delay_ms: f64 },
    /// Constant angular velocity, every tick, with no idle/active
    /// distinction. A concurrent drag free-runs against it, last writer
    /// wins within a tick. Simplification kept from one source variant.
    AlwaysOn { deg_per_ms: f64 },
}

impl Default for RotationPolicy {
    fn default() -> Self {
        RotationPolicy::IdleAware { delay_ms: 3000.0 }
    }
}

/// What a single tick produced: a lambda increment in degrees, and whether
/// the intro banner should be hidden now.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickAdvance {
    pub delta_lambda: f64,
    pub hide_banner: bool,
}

/// Animation clock + policy. Not fire-and-forget: `stop` suspends the
/// idle-aware spin for the whole duration of a drag, and `restart`
/// re-baselines elapsed-time tracking so resuming never produces a large
/// spurious jump.
#[derive(Clone, Debug)]
pub struct AutoRotate {
    policy: RotationPolicy,
    last_interaction_ms: f64,
    last_tick_ms: f64,
    running: bool,
    banner_faded: bool,
}

impl AutoRotate {
    pub fn new(policy: RotationPolicy, now_ms: f64) -> Self {
        Self {
            policy,
            last_interaction_ms: now_ms,
            last_tick_ms: now_ms,
            running: true,
            banner_faded: false,
        }
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn restart(&mut self, now_ms: f64) {
        self.running = true;
        self.last_interaction_ms = now_ms;
        self.last_tick_ms = now_ms;
    }

    /// Advance the clock one frame. `scale` is the projection's current
    /// scale, used by the idle-aware speed curve.
    pub fn tick(&mut self, now_ms: f64, scale: f64) -> TickAdvance {
        match self.policy {
            RotationPolicy::IdleAware { delay_ms } => {
                self.last_tick_ms = now_ms;
                if !self.running {
                    return TickAdvance::default();
                }
                let elapsed = now_ms - self.last_interaction_ms;
                if elapsed < delay_ms {
                    // Step bounded to a 60ms-equivalent so a long gap between
                    // frames cannot produce a visible jump.
                    TickAdvance {
                        delta_lambda: (elapsed % 60.0) * (2.0 / scale),
                        hide_banner: false,
                    }
                } else {
                    let hide = !self.banner_faded;
                    self.banner_faded = true;
                    TickAdvance {
                        delta_lambda: 0.0,
                        hide_banner: hide,
                    }
                }
            }
            RotationPolicy::AlwaysOn { deg_per_ms } => {
                let dt = (now_ms - self.last_tick_ms).max(0.0);
                self.last_tick_ms = now_ms;
                TickAdvance {
                    delta_lambda: deg_per_ms * dt,
                    hide_banner: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_aware_spins_within_window() {
        let mut driver = AutoRotate::new(RotationPolicy::IdleAware { delay_ms: 3000.0 }, 1000.0);
        let adv = driver.tick(1100.0, 200.0);
        // (100 % 60) * (2 / 200)
        assert!((adv.delta_lambda - 0.4).abs() < 1e-12, "{}", adv.delta_lambda);
        assert!(!adv.hide_banner);
    }

    #[test]
    fn idle_aware_speed_is_inverse_to_scale() {
        let mut a = AutoRotate::new(RotationPolicy::IdleAware { delay_ms: 3000.0 }, 0.0);
        let mut b = a.clone();
        let zoomed_out = a.tick(50.0, 100.0).delta_lambda;
        let zoomed_in = b.tick(50.0, 400.0).delta_lambda;
        assert!(zoomed_out > zoomed_in);
        assert!((zoomed_out / zoomed_in - 4.0).abs() < 1e-9);
    }

    #[test]
    fn banner_fade_fires_exactly_once() {
        let mut driver = AutoRotate::new(RotationPolicy::IdleAware { delay_ms: 3000.0 }, 0.0);
        assert!(driver.tick(3500.0, 200.0).hide_banner);
        assert!(!driver.tick(3600.0, 200.0).hide_banner);
        assert!(driver.tick(3600.0, 200.0).delta_lambda == 0.0);
        // Still latched after a restart and a fresh idle window.
        driver.restart(10_000.0);
        assert!(!driver.tick(14_000.0, 200.0).hide_banner);
    }

    #[test]
    fn stop_suspends_and_restart_rebaselines() {
        let mut driver = AutoRotate::new(RotationPolicy::IdleAware { delay_ms: 3000.0 }, 0.0);
        driver.stop();
        assert_eq!(driver.tick(100.0, 200.0), TickAdvance::default());
        // A restart long after the stop must not replay the dead time.
        driver.restart(60_000.0);
        let adv = driver.tick(60_030.0, 200.0);
        assert!((adv.delta_lambda - 30.0 * (2.0 / 200.0)).abs() < 1e-12);
    }

    #[test]
    fn always_on_ignores_stop() {
        let mut driver = AutoRotate::new(RotationPolicy::AlwaysOn { deg_per_ms: 0.01 }, 0.0);
        driver.stop();
        let adv = driver.tick(16.0, 200.0);
        assert!((adv.delta_lambda - 0.16).abs() < 1e-12);
        assert!(!adv.hide_banner);
        let adv = driver.tick(32.0, 200.0);
        assert!((adv.delta_lambda - 0.16).abs() < 1e-12);
    }
}
