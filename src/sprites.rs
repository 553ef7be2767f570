//! Sprite catalog: the small images every particle is drawn with.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::graphics::{gradient_color, Rgba};

/// Side length of the generated sprites
pub const SPRITE_SIZE: usize = 32;

/// Identifies one image in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Leaf,
    BallRed,
    BallGold,
    Candy,
    Gift,
    Snow,
    TopStar,
    TinyStar,
}

impl SpriteId {
    pub const ALL: [SpriteId; 8] = [
        SpriteId::Leaf,
        SpriteId::BallRed,
        SpriteId::BallGold,
        SpriteId::Candy,
        SpriteId::Gift,
        SpriteId::Snow,
        SpriteId::TopStar,
        SpriteId::TinyStar,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// An RGBA raster, row-major, 4 bytes per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Sprite {
    /// A fully transparent sprite
    pub fn new(width: usize, height: usize) -> Self {
        Sprite {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    /// Color at `(x, y)`; callers stay in bounds
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let offset = (y * self.width + x) * 4;
        Rgba::new(
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        )
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width && y < self.height {
            let offset = (y * self.width + x) * 4;
            self.pixels[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Composites `color` over the existing pixel
    fn blend_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let under = self.pixel(x, y);
        self.set_pixel(x, y, color.over(under));
    }

    /// Runs `shade` for each pixel centre, blending whatever it returns
    fn paint<F>(&mut self, mut shade: F)
    where
        F: FnMut(f64, f64) -> Option<Rgba>,
    {
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(color) = shade(x as f64 + 0.5, y as f64 + 0.5) {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    fn check(&self, id: SpriteId) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::MalformedSprite {
                id,
                reason: format!("empty dimensions {}x{}", self.width, self.height),
            });
        }
        let expected = self.width * self.height * 4;
        if self.pixels.len() != expected {
            return Err(Error::MalformedSprite {
                id,
                reason: format!("expected {expected} bytes, found {}", self.pixels.len()),
            });
        }
        Ok(())
    }
}

/// Source of sprite images
pub trait TextureProvider {
    /// Image for `id`, or `None` if the catalog lacks it
    fn sprite(&self, id: SpriteId) -> Option<&Sprite>;
}

/// Validated catalog holding one sprite per id
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    sprites: Vec<Sprite>,
}

impl SpriteAtlas {
    /// Copies every sprite out of `provider`, failing on the first gap or bad image
    pub fn from_provider(provider: &dyn TextureProvider) -> Result<Self> {
        let mut sprites = Vec::with_capacity(SpriteId::ALL.len());
        for id in SpriteId::ALL {
            let sprite = provider.sprite(id).ok_or(Error::MissingSprite(id))?;
            sprite.check(id)?;
            sprites.push(sprite.clone());
        }
        Ok(SpriteAtlas { sprites })
    }

    pub fn get(&self, id: SpriteId) -> &Sprite {
        &self.sprites[id.index()]
    }
}

/// Draws the catalog procedurally at startup
#[derive(Debug, Clone)]
pub struct ProceduralSprites {
    sprites: HashMap<SpriteId, Sprite>,
}

impl Default for ProceduralSprites {
    fn default() -> Self {
        Self::new()
    }
}

impl ProceduralSprites {
    pub fn new() -> Self {
        let sprites = SpriteId::ALL
            .iter()
            .map(|&id| (id, draw_sprite(id)))
            .collect();
        ProceduralSprites { sprites }
    }
}

impl TextureProvider for ProceduralSprites {
    fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }
}

fn draw_sprite(id: SpriteId) -> Sprite {
    let mut sprite = Sprite::new(SPRITE_SIZE, SPRITE_SIZE);
    let half = SPRITE_SIZE as f64 / 2.0;
    match id {
        SpriteId::Leaf => {
            let inner = Rgba::new(120, 255, 120, 255);
            let outer = Rgba::new(0, 40, 0, 0);
            sprite.paint(|x, y| {
                let r = (x - half).hypot(y - half);
                (r <= half / 2.0).then(|| inner.lerp(outer, r / half))
            });
        }
        SpriteId::BallRed | SpriteId::BallGold => {
            let base = if id == SpriteId::BallRed {
                Rgba::new(0xee, 0, 0, 255)
            } else {
                Rgba::new(0xff, 0xbb, 0, 255)
            };
            let stops = [
                (0.0, Rgba::WHITE),
                (0.3, base),
                (1.0, Rgba::new(0x11, 0x11, 0x11, 255)),
            ];
            sprite.paint(|x, y| {
                if (x - half).hypot(y - half) > half - 3.0 {
                    return None;
                }
                let highlight = (x - (half - 4.0)).hypot(y - (half - 4.0));
                Some(gradient_color(&stops, ((highlight - 2.0) / (half - 4.0)).clamp(0.0, 1.0)))
            });
        }
        SpriteId::Candy => draw_candy(&mut sprite, half),
        SpriteId::Gift => {
            let wrap = Rgba::new(0xc6, 0x28, 0x28, 255);
            let ribbon = Rgba::new(0xff, 0xeb, 0x3b, 255);
            sprite.paint(|x, y| {
                let inside = |x0: f64, y0: f64, w: f64, h: f64| {
                    x >= x0 && x < x0 + w && y >= y0 && y < y0 + h
                };
                if inside(14.0, 6.0, 4.0, 20.0) || inside(6.0, 14.0, 20.0, 4.0) {
                    Some(ribbon)
                } else if inside(6.0, 6.0, 20.0, 20.0) {
                    Some(wrap)
                } else {
                    None
                }
            });
        }
        SpriteId::Snow => {
            sprite.paint(|x, y| ((x - half).hypot(y - half) <= 3.0).then_some(Rgba::WHITE));
        }
        SpriteId::TopStar => {
            let glow = Rgba::new(0xff, 0xd7, 0x00, 255);
            sprite.paint(|x, y| {
                let r = (x - half).hypot(y - half);
                (r < half).then(|| glow.with_alpha((1.0 - r / half) * 0.6))
            });
            let points = star_polygon(half, half, 5, 10.0, 5.0);
            sprite.paint(|x, y| point_in_polygon(x, y, &points).then_some(Rgba::WHITE));
        }
        SpriteId::TinyStar => {
            let points = star_polygon(half, half, 4, 8.0, 3.0);
            sprite.paint(|x, y| point_in_polygon(x, y, &points).then_some(Rgba::WHITE));
        }
    }
    sprite
}

/// Hooked cane: white stroke with red dashes, tilted 30 degrees
fn draw_candy(sprite: &mut Sprite, half: f64) {
    let mut path = vec![(0.0, 8.0), (0.0, -4.0)];
    for step in 1..=12 {
        let t = step as f64 / 12.0;
        let u = 1.0 - t;
        let x = 3.0 * u * t * t * 8.0 + t * t * t * 8.0;
        let y = u * u * u * -4.0 + 3.0 * u * u * t * -10.0 + 3.0 * u * t * t * -10.0 + t * t * t * -4.0;
        path.push((x, y));
    }
    let (sin, cos) = (PI / 6.0).sin_cos();
    let path: Vec<(f64, f64)> = path
        .into_iter()
        .map(|(x, y)| (x * cos - y * sin + half, x * sin + y * cos + half))
        .collect();

    let red = Rgba::new(0xdd, 0, 0, 255);
    sprite.paint(|x, y| {
        let mut best = f64::INFINITY;
        let mut best_len = 0.0;
        let mut walked = 0.0;
        for seg in path.windows(2) {
            let (ax, ay) = seg[0];
            let (bx, by) = seg[1];
            let (dx, dy) = (bx - ax, by - ay);
            let len = dx.hypot(dy);
            let t = if len > 0.0 {
                (((x - ax) * dx + (y - ay) * dy) / (len * len)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let d = (x - (ax + dx * t)).hypot(y - (ay + dy * t));
            if d < best {
                best = d;
                best_len = walked + len * t;
            }
            walked += len;
        }
        if best > 3.0 {
            return None;
        }
        if best_len % 8.0 < 4.0 {
            Some(red)
        } else {
            Some(Rgba::WHITE)
        }
    });
}

fn star_polygon(cx: f64, cy: f64, spikes: usize, outer: f64, inner: f64) -> Vec<(f64, f64)> {
    let step = PI / spikes as f64;
    let mut rot = PI / 2.0 * 3.0;
    let mut points = Vec::with_capacity(spikes * 2);
    for _ in 0..spikes {
        points.push((cx + rot.cos() * outer, cy + rot.sin() * outer));
        rot += step;
        points.push((cx + rot.cos() * inner, cy + rot.sin() * inner));
        rot += step;
    }
    points
}

/// Even-odd test against a closed polygon
fn point_in_polygon(x: f64, y: f64, points: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Partial(ProceduralSprites, SpriteId);

    impl TextureProvider for Partial {
        fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
            if id == self.1 {
                None
            } else {
                self.0.sprite(id)
            }
        }
    }

    struct Broken(Sprite);

    impl TextureProvider for Broken {
        fn sprite(&self, _id: SpriteId) -> Option<&Sprite> {
            Some(&self.0)
        }
    }

    #[test]
    fn procedural_catalog_is_complete() {
        let atlas = SpriteAtlas::from_provider(&ProceduralSprites::new()).unwrap();
        for id in SpriteId::ALL {
            let sprite = atlas.get(id);
            assert_eq!((sprite.width, sprite.height), (SPRITE_SIZE, SPRITE_SIZE));
            let opaque = (0..SPRITE_SIZE * SPRITE_SIZE)
                .filter(|i| sprite.pixels[i * 4 + 3] > 0)
                .count();
            assert!(opaque > 0, "{id:?} is blank");
        }
    }

    #[test]
    fn missing_sprite_is_reported() {
        let provider = Partial(ProceduralSprites::new(), SpriteId::Candy);
        let err = SpriteAtlas::from_provider(&provider).unwrap_err();
        assert!(matches!(err, Error::MissingSprite(SpriteId::Candy)));
    }

    #[test]
    fn short_pixel_buffer_is_malformed() {
        let mut sprite = Sprite::new(4, 4);
        sprite.pixels.truncate(10);
        let err = SpriteAtlas::from_provider(&Broken(sprite)).unwrap_err();
        assert!(matches!(err, Error::MalformedSprite { id: SpriteId::Leaf, .. }));
    }

    #[test]
    fn empty_sprite_is_malformed() {
        let err = SpriteAtlas::from_provider(&Broken(Sprite::new(0, 0))).unwrap_err();
        assert!(matches!(err, Error::MalformedSprite { .. }));
    }

    #[test]
    fn star_centre_is_filled_and_corner_is_not() {
        let points = star_polygon(16.0, 16.0, 5, 10.0, 5.0);
        assert!(point_in_polygon(16.0, 16.0, &points));
        assert!(!point_in_polygon(1.0, 1.0, &points));
    }
}
