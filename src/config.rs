use clap::Args;

use crate::error::{Error, Result};

/// Scene configuration
#[derive(Args, Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of tree particles (the topper is always added on top)
    #[arg(long, default_value_t = 12_000)]
    pub particle_count: usize,
    /// Number of background stars
    #[arg(long, default_value_t = 1_000)]
    pub star_count: usize,
    /// Number of snowflakes
    #[arg(long, default_value_t = 400)]
    pub snow_count: usize,
    /// Perspective projection constant
    #[arg(long, default_value_t = 900.0)]
    pub fov: f64,
    /// Magnitude of the explosion impulse
    #[arg(long, default_value_t = 35.0)]
    pub explode_force: f64,
    /// Return rate, reserved for tuning the homing blend
    #[arg(long, default_value_t = 0.006)]
    pub return_speed: f64,
    /// Seed for the scene RNG (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            particle_count: 12_000,
            star_count: 1_000,
            snow_count: 400,
            fov: 900.0,
            explode_force: 35.0,
            return_speed: 0.006,
            seed: None,
        }
    }
}

impl Config {
    /// Rejects values the projection or the explosion cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.fov.is_finite() || self.fov <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fov must be a positive number, got {}",
                self.fov
            )));
        }
        if !self.explode_force.is_finite() || self.explode_force < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "explode force must be zero or positive, got {}",
                self.explode_force
            )));
        }
        if !self.return_speed.is_finite() || self.return_speed < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "return speed must be zero or positive, got {}",
                self.return_speed
            )));
        }
        Ok(())
    }
}
