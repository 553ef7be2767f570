//! Back-to-front compositing of the projected scene.

use crate::camera::Projector;
use crate::entity::{Entity, EntityKind};
use crate::graphics::{RadialGradient, Rect, Rgba, Surface};
use crate::scene::Star;
use crate::sprites::SpriteAtlas;

/// Fixed magnification from projected size to pixels
pub const SPRITE_MAGNIFICATION: f64 = 5.0;

/// An entity that survived projection this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub depth: f64,
    pub size: f64,
    pub phase: f64,
}

impl RenderItem {
    /// Destination square for the sprite
    pub fn rect(&self) -> Rect {
        let side = self.size * self.scale * SPRITE_MAGNIFICATION * self.kind.size_multiplier();
        Rect::centered(self.x, self.y, side)
    }
}

/// Dark vignette filling the whole surface
pub fn background(width: f64, height: f64) -> RadialGradient {
    RadialGradient {
        center: (width / 2.0, height),
        radius: width * 1.5,
        stops: vec![
            (0.0, Rgba::new(0x09, 0x15, 0x2b, 255)),
            (0.5, Rgba::new(0x03, 0x05, 0x08, 255)),
            (1.0, Rgba::BLACK),
        ],
    }
}

/// Draws the flickering star field
pub fn draw_stars<S: Surface + ?Sized>(surface: &mut S, stars: &[Star], t: f64) {
    let (width, height) = (surface.width() as f64, surface.height() as f64);
    for star in stars {
        let rect = Rect::new(star.x * width, star.y * height, star.size, star.size);
        surface.fill_rect(rect, Rgba::WHITE, star.flicker_alpha(t));
    }
}

/// Projects every entity, keeping only the visible ones
pub fn project_visible<'a, I>(projector: &Projector, entities: I) -> Vec<RenderItem>
where
    I: IntoIterator<Item = &'a Entity>,
{
    entities
        .into_iter()
        .filter_map(|entity| {
            projector.project(&entity.position).map(|p| RenderItem {
                kind: entity.kind,
                x: p.x,
                y: p.y,
                scale: p.scale,
                depth: p.depth,
                size: entity.size,
                phase: entity.phase,
            })
        })
        .collect()
}

/// Orders items farthest first. Ties keep their input order.
pub fn depth_sort(items: &mut [RenderItem]) {
    items.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

/// Blits items in slice order
pub fn draw_items<S: Surface + ?Sized>(
    surface: &mut S,
    atlas: &SpriteAtlas,
    items: &[RenderItem],
    t: f64,
) {
    for item in items {
        let sprite = atlas.get(item.kind.sprite());
        surface.blit(sprite, item.rect(), item.kind.alpha(t, item.phase));
    }
}
