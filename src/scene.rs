//! Populates the tree, the snow and the star field.

use std::f64::consts::{PI, TAU};

use log::debug;
use rand::Rng;

use crate::config::Config;
use crate::entity::{random_phase, Entity, EntityKind};

/// Lowest point of the tree cone
pub const CONE_BASE_Y: f64 = -300.0;
/// Height of the tree cone
pub const CONE_HEIGHT: f64 = 600.0;
/// Radius of the cone at its widest
pub const CONE_MAX_RADIUS: f64 = 250.0;
/// Rest position of the topper
pub const TOPPER_HOME: [f64; 3] = [0.0, -360.0, 0.0];

const RIBBON_SHARE: f64 = 0.10;
const SURFACE_SHARE: f64 = 0.25;
const EMBEDDED_STAR_CHANCE: f64 = 0.05;
const RIBBON_TURNS: f64 = 12.5;
/// Snow spawns within +/- this on every axis
const SNOW_EXTENT: f64 = 1000.0;

/// A background star, positioned in normalized screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub alpha: f64,
    pub phase: f64,
}

impl Star {
    /// Opacity at elapsed time `t`
    pub fn flicker_alpha(&self, t: f64) -> f64 {
        self.alpha * ((t * 3.0 + self.phase).sin() * 0.5 + 0.5)
    }
}

/// Everything the scene builder produces
#[derive(Debug, Clone)]
pub struct Scene {
    /// Topper first, then the general population
    pub particles: Vec<Entity>,
    pub snowflakes: Vec<Entity>,
    pub stars: Vec<Star>,
}

impl Scene {
    pub fn build<R: Rng>(config: &Config, rng: &mut R) -> Self {
        let mut particles = Vec::with_capacity(config.particle_count + 1);
        particles.push(Entity::new(
            EntityKind::TopperStar,
            TOPPER_HOME,
            12.0,
            random_phase(rng),
        ));
        particles.extend((0..config.particle_count).map(|_| tree_particle(rng)));

        let snowflakes = (0..config.snow_count).map(|_| snowflake(rng)).collect();
        let stars = (0..config.star_count).map(|_| star(rng)).collect();

        let scene = Scene {
            particles,
            snowflakes,
            stars,
        };
        debug!(
            "built scene: {} particles, {} snowflakes, {} stars",
            scene.particles.len(),
            scene.snowflakes.len(),
            scene.stars.len()
        );
        scene
    }
}

/// Radius of the cone at height `y`
pub fn cone_radius_at(y: f64) -> f64 {
    (y - CONE_BASE_Y) / CONE_HEIGHT * CONE_MAX_RADIUS
}

fn random_height<R: Rng>(rng: &mut R) -> f64 {
    CONE_BASE_Y + rng.gen::<f64>() * CONE_HEIGHT
}

fn on_circle(radius: f64, angle: f64, y: f64) -> [f64; 3] {
    [angle.cos() * radius, y, angle.sin() * radius]
}

fn tree_particle<R: Rng>(rng: &mut R) -> Entity {
    let roll = rng.gen::<f64>();
    let (kind, home, size) = if roll < RIBBON_SHARE {
        let t = rng.gen::<f64>();
        let y = -350.0 + t * 700.0;
        let radius = 20.0 + t * 280.0;
        let angle = t * TAU * RIBBON_TURNS;
        (EntityKind::RibbonOrnament, on_circle(radius, angle, y), 1.2)
    } else if roll < SURFACE_SHARE {
        let y = random_height(rng);
        let angle = rng.gen::<f64>() * TAU;
        let radius = cone_radius_at(y) * (0.95 + rng.gen::<f64>() * 0.1);
        let kind = match rng.gen::<f64>() {
            r if r < 0.2 => EntityKind::SurfaceGift,
            r if r < 0.5 => EntityKind::SurfaceCandy,
            r if r < 0.7 => EntityKind::SurfaceBall,
            _ => EntityKind::SurfaceTinyStar,
        };
        let size = rng.gen::<f64>() * 3.0 + 3.0;
        (kind, on_circle(radius, angle, y), size)
    } else {
        let y = random_height(rng);
        let radius = fill_radius(cone_radius_at(y), rng.gen::<f64>());
        let angle = rng.gen::<f64>() * TAU;
        let (kind, size) = if rng.gen::<f64>() < EMBEDDED_STAR_CHANCE {
            (EntityKind::FoliageTinyStar, rng.gen::<f64>() * 2.0 + 2.0)
        } else {
            (EntityKind::FoliageLeaf, rng.gen::<f64>() * 2.0 + 0.5)
        };
        (kind, on_circle(radius, angle, y), size)
    };
    Entity::new(kind, home, size, random_phase(rng))
}

/// Area-uniform radius inside a disk of `max_radius` for a uniform sample `u`
pub fn fill_radius(max_radius: f64, u: f64) -> f64 {
    max_radius * u.sqrt()
}

fn snowflake<R: Rng>(rng: &mut R) -> Entity {
    let position = [
        (rng.gen::<f64>() - 0.5) * 2.0 * SNOW_EXTENT,
        rng.gen::<f64>() * 2.0 * SNOW_EXTENT - SNOW_EXTENT,
        (rng.gen::<f64>() - 0.5) * 2.0 * SNOW_EXTENT,
    ];
    let size = rng.gen::<f64>() * 2.0 + 1.0;
    let fall_speed = rng.gen::<f64>() * 2.0 + 1.0;
    Entity::snowflake(position, size, fall_speed, random_phase(rng))
}

fn star<R: Rng>(rng: &mut R) -> Star {
    let brightness = rng.gen::<f64>().powi(4);
    Star {
        x: rng.gen(),
        y: rng.gen(),
        size: rng.gen::<f64>() * 2.0 + 0.5,
        alpha: brightness * 0.9 + 0.1,
        phase: rng.gen::<f64>() * PI * 2.0,
    }
}
