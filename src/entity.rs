//! Particles that make up the tree and the snow.

use rand::Rng;
use std::f64::consts::TAU;

use crate::explosion::{Explosion, DAMPING, TOPPER_IMPULSE};
use crate::math::Vec3;
use crate::sprites::SpriteId;

/// Snowflakes wrap back to the bottom once they pass this height
pub const SNOW_WRAP_Y: f64 = 1000.0;

/// What an entity is, which decides how it moves and how it is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    RibbonOrnament,
    SurfaceGift,
    SurfaceCandy,
    SurfaceBall,
    SurfaceTinyStar,
    FoliageLeaf,
    FoliageTinyStar,
    TopperStar,
    Snowflake,
}

impl EntityKind {
    /// Sprite drawn for this kind
    pub fn sprite(self) -> SpriteId {
        match self {
            EntityKind::RibbonOrnament => SpriteId::BallGold,
            EntityKind::SurfaceGift => SpriteId::Gift,
            EntityKind::SurfaceCandy => SpriteId::Candy,
            EntityKind::SurfaceBall => SpriteId::BallRed,
            EntityKind::SurfaceTinyStar | EntityKind::FoliageTinyStar => SpriteId::TinyStar,
            EntityKind::FoliageLeaf => SpriteId::Leaf,
            EntityKind::TopperStar => SpriteId::TopStar,
            EntityKind::Snowflake => SpriteId::Snow,
        }
    }

    /// Amplitude of the idle sway; zero for kinds that do not sway
    pub fn idle_amplitude(self) -> f64 {
        match self {
            EntityKind::FoliageLeaf => 1.0,
            EntityKind::TopperStar | EntityKind::Snowflake => 0.0,
            _ => 3.0,
        }
    }

    /// Extra factor on the drawn sprite size
    pub fn size_multiplier(self) -> f64 {
        match self {
            EntityKind::TopperStar => 1.5,
            EntityKind::FoliageLeaf => 0.6,
            _ => 1.0,
        }
    }

    /// Opacity at elapsed time `t`
    pub fn alpha(self, t: f64, phase: f64) -> f64 {
        match self {
            EntityKind::SurfaceTinyStar
            | EntityKind::FoliageTinyStar
            | EntityKind::RibbonOrnament => 0.7 + 0.3 * (t * 8.0 + phase).sin(),
            _ => 1.0,
        }
    }

    /// Whether a detonation pushes this kind around
    pub fn is_explosive(self) -> bool {
        self != EntityKind::Snowflake
    }
}

/// A single particle
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Vec3,
    /// Rest position. Snow only uses it as the spawn point.
    pub home: Vec3,
    pub velocity: Vec3,
    pub size: f64,
    pub phase: f64,
    /// Fall speed, only meaningful for snow
    pub fall_speed: f64,
}

impl Entity {
    /// Creates an entity resting at `home`
    pub fn new(kind: EntityKind, home: Vec3, size: f64, phase: f64) -> Self {
        Entity {
            kind,
            position: home,
            home,
            velocity: [0.0; 3],
            size,
            phase,
            fall_speed: 0.0,
        }
    }

    /// Creates a snowflake falling at `fall_speed` units per frame
    pub fn snowflake(position: Vec3, size: f64, fall_speed: f64, phase: f64) -> Self {
        Entity {
            fall_speed,
            ..Entity::new(EntityKind::Snowflake, position, size, phase)
        }
    }

    /// Gives the entity a random outward kick of up to `force` per axis
    pub fn apply_impulse<R: Rng>(&mut self, rng: &mut R, force: f64) {
        if !self.kind.is_explosive() {
            return;
        }
        let multiplier = if self.kind == EntityKind::TopperStar {
            TOPPER_IMPULSE
        } else {
            1.0
        };
        let force = rng.gen::<f64>() * force;
        for v in self.velocity.iter_mut() {
            *v = (rng.gen::<f64>() - 0.5) * force * 2.0 * multiplier;
        }
    }

    /// Advances the entity by one frame at elapsed time `t` seconds
    pub fn update(&mut self, t: f64, explosion: &Explosion) {
        if self.kind == EntityKind::Snowflake {
            self.position[1] += self.fall_speed;
            if self.position[1] > SNOW_WRAP_Y {
                self.position[1] = -SNOW_WRAP_Y;
            }
            self.position[0] += (t + self.phase).sin() * 0.5;
            return;
        }

        if explosion.is_active() {
            let homing = explosion.homing_factor();
            for axis in 0..3 {
                self.position[axis] += self.velocity[axis];
                self.velocity[axis] *= DAMPING;
                self.position[axis] += (self.home[axis] - self.position[axis]) * homing;
            }
        } else if self.kind != EntityKind::TopperStar {
            let amp = self.kind.idle_amplitude();
            let angle = t + self.phase;
            self.position = [
                self.home[0] + angle.sin() * amp,
                self.home[1] + angle.cos() * amp,
                self.home[2],
            ];
        }
    }
}

/// Random phase in `[0, 2π)`
pub fn random_phase<R: Rng>(rng: &mut R) -> f64 {
    rng.gen::<f64>() * TAU
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::distance;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn exploding(time: u32) -> Explosion {
        let mut explosion = Explosion::new();
        explosion.trigger();
        for _ in 0..time {
            explosion.tick();
        }
        explosion
    }

    #[test]
    fn idle_entities_stay_near_home() {
        let idle = Explosion::new();
        for kind in [
            EntityKind::RibbonOrnament,
            EntityKind::SurfaceGift,
            EntityKind::FoliageLeaf,
            EntityKind::FoliageTinyStar,
        ] {
            let mut entity = Entity::new(kind, [10.0, -20.0, 30.0], 1.0, 1.3);
            for frame in 0..500 {
                entity.update(frame as f64 * 0.37, &idle);
                let d = distance(&entity.position, &entity.home);
                assert!(d <= kind.idle_amplitude() + 1e-9, "{kind:?} drifted {d}");
                assert_eq!(entity.position[2], entity.home[2]);
            }
        }
    }

    #[test]
    fn topper_does_not_sway_when_idle() {
        let mut topper = Entity::new(EntityKind::TopperStar, [0.0, -360.0, 0.0], 12.0, 0.5);
        topper.update(12.5, &Explosion::new());
        assert_eq!(topper.position, topper.home);
    }

    #[test]
    fn snow_wraps_to_the_bottom() {
        let mut flake = Entity::snowflake([0.0, 999.5, 0.0], 2.0, 1.0, 0.0);
        flake.update(0.0, &Explosion::new());
        assert_eq!(flake.position[1], -SNOW_WRAP_Y);
    }

    #[test]
    fn snow_sways_sideways_as_it_falls() {
        let mut flake = Entity::snowflake([0.0; 3], 2.0, 1.5, 0.0);
        flake.update(1.0, &Explosion::new());
        assert!((flake.position[0] - 0.5 * 1.0f64.sin()).abs() < 1e-12);
        assert!((flake.position[0] - 0.4207).abs() < 1e-4);
        assert_eq!(flake.position[1], 1.5);
        assert_eq!(flake.position[2], 0.0);

        let mut flake = Entity::snowflake([10.0, 0.0, 0.0], 2.0, 1.0, 2.0);
        flake.update(0.5, &exploding(50));
        assert!((flake.position[0] - (10.0 + 0.5 * 2.5f64.sin())).abs() < 1e-12);
    }

    #[test]
    fn snow_ignores_explosions() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut flake = Entity::snowflake([5.0, 0.0, 5.0], 2.0, 2.0, 0.0);
        flake.apply_impulse(&mut rng, 35.0);
        assert_eq!(flake.velocity, [0.0; 3]);
        flake.update(0.0, &exploding(50));
        assert_eq!(flake.position, [5.0, 2.0, 5.0]);
    }

    #[test]
    fn impulse_is_bounded_by_force() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut leaf = Entity::new(EntityKind::FoliageLeaf, [0.0; 3], 1.0, 0.0);
            leaf.apply_impulse(&mut rng, 35.0);
            assert!(leaf.velocity.iter().all(|v| v.abs() <= 35.0));

            let mut topper = Entity::new(EntityKind::TopperStar, [0.0; 3], 12.0, 0.0);
            topper.apply_impulse(&mut rng, 35.0);
            assert!(topper.velocity.iter().all(|v| v.abs() <= 35.0 * TOPPER_IMPULSE));
        }
    }

    #[test]
    fn drift_is_damped_before_homing_starts() {
        let mut gift = Entity::new(EntityKind::SurfaceGift, [0.0; 3], 4.0, 0.0);
        gift.velocity = [10.0, 0.0, 0.0];
        gift.update(0.0, &exploding(1));
        assert_eq!(gift.position[0], 10.0);
        assert!((gift.velocity[0] - 9.6).abs() < 1e-12);
    }

    #[test]
    fn homing_pulls_towards_home_without_overshoot() {
        let mut ball = Entity::new(EntityKind::SurfaceBall, [0.0; 3], 4.0, 0.0);
        ball.position = [100.0, 0.0, 0.0];
        let explosion = exploding(400);
        assert!(explosion.is_active());
        let mut previous = distance(&ball.position, &ball.home);
        for _ in 0..50 {
            ball.update(0.0, &explosion);
            let d = distance(&ball.position, &ball.home);
            assert!(d < previous);
            assert!(ball.position[0] > 0.0);
            previous = d;
        }
    }

    #[test]
    fn tiny_stars_pulse_while_the_topper_stays_opaque() {
        assert_eq!(EntityKind::TopperStar.alpha(3.0, 1.0), 1.0);
        assert_eq!(EntityKind::FoliageLeaf.alpha(3.0, 1.0), 1.0);
        for t in [0.0, 0.2, 0.4, 1.7] {
            let a = EntityKind::SurfaceTinyStar.alpha(t, 0.3);
            assert!((0.4..=1.0).contains(&a));
        }
    }
}
