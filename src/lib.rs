//! A particle tree rendered through a hand-rolled perspective camera.
//!
//! [`Simulation`] owns the scene and exposes two per-frame entry points:
//! [`Simulation::advance_frame`] moves everything forward and
//! [`Simulation::render`] draws onto any [`Surface`].

pub mod app;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod entity;
pub mod error;
pub mod explosion;
pub mod graphics;
pub mod interaction;
pub mod math;
pub mod scene;
pub mod sprites;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use graphics::{PixelBuffer, Surface};
pub use interaction::InputEvent;
pub use sprites::{ProceduralSprites, TextureProvider};
pub use state::Simulation;
