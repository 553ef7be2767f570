//! Explode-and-return state machine.

/// Frames after which the explosion switches back to idle
pub const EXPLOSION_FRAMES: u32 = 400;
/// Frames of free drift before particles start homing
pub const HOMING_DELAY_FRAMES: u32 = 30;
/// Per-frame growth of the homing fraction
pub const HOMING_RAMP: f64 = 0.0002;
/// Upper bound on the fraction of the remaining offset closed per frame
pub const HOMING_MAX: f64 = 0.08;
/// Velocity decay applied every frame while exploding
pub const DAMPING: f64 = 0.96;
/// Impulse multiplier for the topper
pub const TOPPER_IMPULSE: f64 = 1.5;

/// Explosion state shared by every entity update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Explosion {
    active: bool,
    time: u32,
}

impl Explosion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Frames elapsed since the last trigger
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Starts an explosion. Returns `false` and changes nothing while one is running.
    pub fn trigger(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.time = 0;
        true
    }

    /// Advances one frame, returning `true` on the frame the explosion expires
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.time += 1;
        if self.time > EXPLOSION_FRAMES {
            self.active = false;
            return true;
        }
        false
    }

    /// Fraction of the remaining offset to home closed this frame
    pub fn homing_factor(&self) -> f64 {
        if !self.active || self.time <= HOMING_DELAY_FRAMES {
            return 0.0;
        }
        (f64::from(self.time - HOMING_DELAY_FRAMES) * HOMING_RAMP).min(HOMING_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_trigger_is_a_no_op() {
        let mut explosion = Explosion::new();
        assert!(explosion.trigger());
        for _ in 0..10 {
            explosion.tick();
        }
        let before = explosion;
        assert!(!explosion.trigger());
        assert_eq!(explosion, before);
        assert_eq!(explosion.time(), 10);
    }

    #[test]
    fn expires_after_the_frame_budget() {
        let mut explosion = Explosion::new();
        explosion.trigger();
        for _ in 0..EXPLOSION_FRAMES {
            assert!(!explosion.tick());
        }
        assert!(explosion.is_active());
        assert!(explosion.tick());
        assert!(!explosion.is_active());
    }

    #[test]
    fn can_retrigger_after_expiry() {
        let mut explosion = Explosion::new();
        explosion.trigger();
        while explosion.is_active() {
            explosion.tick();
        }
        assert!(explosion.trigger());
        assert_eq!(explosion.time(), 0);
    }

    #[test]
    fn homing_ramps_then_clamps() {
        let mut explosion = Explosion::new();
        explosion.trigger();
        for _ in 0..HOMING_DELAY_FRAMES {
            explosion.tick();
        }
        assert_eq!(explosion.homing_factor(), 0.0);
        explosion.tick();
        assert!((explosion.homing_factor() - HOMING_RAMP).abs() < 1e-12);

        let saturated = Explosion {
            active: true,
            time: 1_000,
        };
        assert_eq!(saturated.homing_factor(), HOMING_MAX);
    }

    #[test]
    fn idle_tick_does_nothing() {
        let mut explosion = Explosion::new();
        assert!(!explosion.tick());
        assert_eq!(explosion.time(), 0);
    }
}
