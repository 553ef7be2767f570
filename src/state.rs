use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::compositor::{background, depth_sort, draw_items, draw_stars, project_visible};
use crate::config::Config;
use crate::entity::Entity;
use crate::error::Result;
use crate::explosion::Explosion;
use crate::graphics::Surface;
use crate::interaction::{InputEvent, Interaction};
use crate::scene::{Scene, Star};
use crate::sprites::{SpriteAtlas, TextureProvider};

/// Whole simulation state, advanced and drawn one frame at a time
#[derive(Debug)]
pub struct Simulation {
    config: Config,
    camera: Camera,
    explosion: Explosion,
    interaction: Interaction,
    /// Topper and tree particles
    particles: Vec<Entity>,
    snowflakes: Vec<Entity>,
    stars: Vec<Star>,
    atlas: SpriteAtlas,
    rng: StdRng,
    /// Seconds of simulated time
    elapsed: f64,
    frame: u64,
}

impl Simulation {
    /// Builds the scene. Fails before any frame runs if the config or sprite catalog is unusable.
    pub fn new(config: Config, textures: &dyn TextureProvider) -> Result<Self> {
        config.validate()?;
        let atlas = SpriteAtlas::from_provider(textures)?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scene = Scene::build(&config, &mut rng);
        info!(
            "scene ready: {} particles, {} snowflakes, {} stars",
            scene.particles.len(),
            scene.snowflakes.len(),
            scene.stars.len()
        );
        Ok(Simulation {
            config,
            camera: Camera::default(),
            explosion: Explosion::new(),
            interaction: Interaction::default(),
            particles: scene.particles,
            snowflakes: scene.snowflakes,
            stars: scene.stars,
            atlas,
            rng,
            elapsed: 0.0,
            frame: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn explosion(&self) -> &Explosion {
        &self.explosion
    }

    pub fn particles(&self) -> &[Entity] {
        &self.particles
    }

    pub fn snowflakes(&self) -> &[Entity] {
        &self.snowflakes
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Puts the camera back to its starting orbit
    pub fn reset_camera(&mut self) {
        self.camera = Camera::default();
    }

    /// Feeds one input event
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Detonate => {
                self.detonate();
            }
            other => self.interaction.apply(other, &mut self.camera),
        }
    }

    /// Blows the tree apart. Returns `false` if an explosion is already running.
    pub fn detonate(&mut self) -> bool {
        if !self.explosion.trigger() {
            debug!("detonate ignored, explosion already running");
            return false;
        }
        let force = self.config.explode_force;
        for particle in &mut self.particles {
            particle.apply_impulse(&mut self.rng, force);
        }
        info!("detonated at frame {}", self.frame);
        true
    }

    /// Moves everything forward one frame; `dt` seconds drive the sway and flicker clocks
    pub fn advance_frame(&mut self, dt: f64) {
        self.elapsed += dt;
        self.frame += 1;
        if !self.interaction.is_dragging() {
            self.camera.auto_rotate();
        }
        let t = self.elapsed;
        for entity in self.particles.iter_mut().chain(self.snowflakes.iter_mut()) {
            entity.update(t, &self.explosion);
        }
        if self.explosion.tick() {
            info!("explosion finished at frame {}", self.frame);
        }
    }

    /// Draws the current frame and returns how many sprites were drawn
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> usize {
        let width = surface.width() as f64;
        let height = surface.height() as f64;
        let t = self.elapsed;

        surface.fill_radial_gradient(&background(width, height));
        draw_stars(surface, &self.stars, t);

        let projector = self.camera.projector(self.config.fov, width, height);
        let mut items = project_visible(&projector, self.particles.iter().chain(&self.snowflakes));
        depth_sort(&mut items);
        draw_items(surface, &self.atlas, &items, t);
        items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::tests::RecordingSurface;
    use crate::entity::EntityKind;
    use crate::error::Error;
    use crate::explosion::EXPLOSION_FRAMES;
    use crate::graphics::PixelBuffer;
    use crate::math::distance;
    use crate::sprites::{ProceduralSprites, Sprite, SpriteId};

    const DT: f64 = 1.0 / 60.0;

    fn simulation(particle_count: usize) -> Simulation {
        let config = Config {
            particle_count,
            star_count: 50,
            snow_count: 40,
            seed: Some(42),
            ..Config::default()
        };
        Simulation::new(config, &ProceduralSprites::new()).unwrap()
    }

    struct NoCandy(ProceduralSprites);

    impl TextureProvider for NoCandy {
        fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
            match id {
                SpriteId::Candy => None,
                other => self.0.sprite(other),
            }
        }
    }

    #[test]
    fn incomplete_catalog_aborts_construction() {
        let err = Simulation::new(Config::default(), &NoCandy(ProceduralSprites::new())).unwrap_err();
        assert!(matches!(err, Error::MissingSprite(SpriteId::Candy)));
    }

    #[test]
    fn invalid_config_aborts_construction() {
        let config = Config {
            fov: -1.0,
            ..Config::default()
        };
        assert!(Simulation::new(config, &ProceduralSprites::new()).is_err());
    }

    #[test]
    fn detonate_is_idempotent_while_active() {
        let mut sim = simulation(200);
        assert!(sim.detonate());
        sim.advance_frame(DT);
        let velocities: Vec<_> = sim.particles().iter().map(|p| p.velocity).collect();
        let explosion = *sim.explosion();

        sim.handle_input(InputEvent::Detonate);
        assert_eq!(*sim.explosion(), explosion);
        let after: Vec<_> = sim.particles().iter().map(|p| p.velocity).collect();
        assert_eq!(velocities, after);
    }

    #[test]
    fn detonate_leaves_snow_alone() {
        let mut sim = simulation(200);
        sim.detonate();
        assert!(sim.snowflakes().iter().all(|s| s.velocity == [0.0; 3]));
        assert!(sim.particles()[0].velocity != [0.0; 3]);
    }

    #[test]
    fn particles_return_home_within_the_budget() {
        let mut sim = simulation(1_000);
        sim.detonate();
        let speeds: Vec<f64> = sim
            .particles()
            .iter()
            .map(|p| distance(&p.velocity, &[0.0; 3]))
            .collect();

        let mut frames = 0;
        while sim.explosion().is_active() {
            let before: Vec<_> = sim.particles().iter().map(|p| p.position).collect();
            sim.advance_frame(DT);
            frames += 1;
            for ((p, prev), speed) in sim.particles().iter().zip(&before).zip(&speeds) {
                let step = distance(&p.position, prev);
                assert!(step <= 2.0 * speed + 1e-9, "jump of {step} at frame {frames}");
            }
        }
        assert_eq!(frames, EXPLOSION_FRAMES as usize + 1);
        for p in sim.particles() {
            assert!(distance(&p.position, &p.home) < 1.0, "{:?} left behind", p.kind);
        }

        sim.advance_frame(DT);
        for p in sim.particles() {
            let bound = p.kind.idle_amplitude().max(1.0);
            assert!(distance(&p.position, &p.home) <= bound + 1e-9);
        }
    }

    #[test]
    fn camera_only_auto_rotates_when_not_dragging() {
        let mut sim = simulation(0);
        sim.advance_frame(DT);
        let azimuth = sim.camera().azimuth;
        assert!(azimuth > 0.0);

        sim.handle_input(InputEvent::PointerDown);
        sim.advance_frame(DT);
        assert_eq!(sim.camera().azimuth, azimuth);

        sim.handle_input(InputEvent::PointerMove { dx: 10.0, dy: 0.0 });
        assert!(sim.camera().azimuth < azimuth);
        sim.handle_input(InputEvent::PointerUp);
    }

    #[test]
    fn render_draws_back_to_front() {
        let mut sim = simulation(500);
        sim.advance_frame(DT);
        let mut surface = RecordingSurface::new(1200, 900);
        let drawn = sim.render(&mut surface);
        assert_eq!(surface.gradients, 1);
        assert_eq!(surface.rects.len(), 50);
        assert_eq!(drawn, surface.blits.len());
        assert!(drawn > 400);

        let projector = sim.camera().projector(sim.config().fov, 1200.0, 900.0);
        let mut items = project_visible(&projector, sim.particles().iter().chain(sim.snowflakes()));
        depth_sort(&mut items);
        let expected: Vec<_> = items.iter().map(|i| i.rect()).collect();
        let drawn_rects: Vec<_> = surface.blits.iter().map(|(r, _)| *r).collect();
        assert_eq!(drawn_rects, expected);
        assert!(items.windows(2).all(|w| w[0].depth >= w[1].depth));
    }

    #[test]
    fn survives_surface_resizes() {
        let mut sim = simulation(300);
        let mut buffer = PixelBuffer::new(320, 200);
        sim.advance_frame(DT);
        let large = sim.render(&mut buffer);
        buffer.resize(40, 30);
        sim.advance_frame(DT);
        let small = sim.render(&mut buffer);
        assert!(small < large);
        assert_eq!(sim.particles().len(), 301);
    }

    #[test]
    fn topper_is_drawn_opaque() {
        let mut sim = simulation(0);
        sim.advance_frame(DT);
        let mut surface = RecordingSurface::new(1200, 900);
        sim.render(&mut surface);

        let topper = &sim.particles()[0];
        assert_eq!(topper.kind, EntityKind::TopperStar);
        let projector = sim.camera().projector(sim.config().fov, 1200.0, 900.0);
        let item = project_visible(&projector, [topper])[0];
        let (_, alpha) = surface
            .blits
            .iter()
            .find(|(rect, _)| *rect == item.rect())
            .expect("topper drawn");
        assert_eq!(*alpha, 1.0);
    }
}
