use crate::sprites::Sprite;

/// 8-bit RGBA color, not premultiplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Same color with opacity `alpha` in `[0, 1]`
    pub fn with_alpha(self, alpha: f64) -> Self {
        Rgba {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Linear interpolation towards `other`, `t` clamped to `[0, 1]`
    pub fn lerp(self, other: Rgba, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Source-over compositing of `self` onto `under`
    pub fn over(self, under: Rgba) -> Rgba {
        let sa = self.a as f64 / 255.0;
        let da = under.a as f64 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Rgba::default();
        }
        let mix = |s: u8, d: u8| {
            ((s as f64 * sa + d as f64 * da * (1.0 - sa)) / out_a).round() as u8
        };
        Rgba::new(
            mix(self.r, under.r),
            mix(self.g, under.g),
            mix(self.b, under.b),
            (out_a * 255.0).round() as u8,
        )
    }
}

/// Color at `t` along a list of `(offset, color)` stops sorted by offset
pub fn gradient_color(stops: &[(f64, Rgba)], t: f64) -> Rgba {
    let Some(&(first_t, first)) = stops.first() else {
        return Rgba::default();
    };
    if t <= first_t {
        return first;
    }
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            return c0.lerp(c1, (t - t0) / (t1 - t0));
        }
    }
    stops[stops.len() - 1].1
}

/// Axis-aligned destination rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `side` centred on `(cx, cy)`
    pub fn centered(cx: f64, cy: f64, side: f64) -> Self {
        Rect::new(cx - side / 2.0, cy - side / 2.0, side, side)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Pixel index range covered by the rect, clipped to `width` x `height`
    fn pixel_bounds(&self, width: usize, height: usize) -> Option<(usize, usize, usize, usize)> {
        let min_x = self.x.floor().max(0.0);
        let min_y = self.y.floor().max(0.0);
        let max_x = (self.x + self.width).ceil().min(width as f64);
        let max_y = (self.y + self.height).ceil().min(height as f64);
        if min_x >= max_x || min_y >= max_y {
            return None;
        }
        Some((min_x as usize, min_y as usize, max_x as usize, max_y as usize))
    }
}

/// Circular gradient used for the backdrop
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: (f64, f64),
    pub radius: f64,
    pub stops: Vec<(f64, Rgba)>,
}

impl RadialGradient {
    pub fn color_at(&self, x: f64, y: f64) -> Rgba {
        let d = (x - self.center.0).hypot(y - self.center.1);
        let t = if self.radius > 0.0 { d / self.radius } else { 1.0 };
        gradient_color(&self.stops, t)
    }
}

/// Anything the frame can be drawn onto
pub trait Surface {
    /// Current width in pixels; may change between frames
    fn width(&self) -> usize;
    /// Current height in pixels; may change between frames
    fn height(&self) -> usize;
    fn fill_radial_gradient(&mut self, gradient: &RadialGradient);
    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64);
    /// Draws `sprite` stretched over `dest`, scaled by global `alpha`
    fn blit(&mut self, sprite: &Sprite, dest: Rect, alpha: f64);
}

/// Off-screen RGBA framebuffer
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixel_data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        PixelBuffer {
            width,
            height,
            pixel_data: vec![0; width * height * 4],
        }
    }

    /// Resizes the buffer, clearing it when the size changed
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixel_data = vec![0; width * height * 4];
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let offset = (y * self.width + x) * 4;
        Rgba::new(
            self.pixel_data[offset],
            self.pixel_data[offset + 1],
            self.pixel_data[offset + 2],
            self.pixel_data[offset + 3],
        )
    }

    /// Mean color of the block starting at `(x, y)`, clipped to the buffer
    pub fn average(&self, x: usize, y: usize, width: usize, height: usize) -> Rgba {
        let max_x = (x + width).min(self.width);
        let max_y = (y + height).min(self.height);
        let mut sum = [0u32; 3];
        let mut count = 0u32;
        for py in y..max_y {
            for px in x..max_x {
                let offset = (py * self.width + px) * 4;
                sum[0] += self.pixel_data[offset] as u32;
                sum[1] += self.pixel_data[offset + 1] as u32;
                sum[2] += self.pixel_data[offset + 2] as u32;
                count += 1;
            }
        }
        if count == 0 {
            return Rgba::BLACK;
        }
        Rgba::new(
            (sum[0] / count) as u8,
            (sum[1] / count) as u8,
            (sum[2] / count) as u8,
            255,
        )
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba, alpha: f64) {
        let a = color.a as f64 / 255.0 * alpha;
        if a <= 0.0 {
            return;
        }
        let offset = (y * self.width + x) * 4;
        let pixel = &mut self.pixel_data[offset..offset + 4];
        let mix = |src: u8, dst: u8| (src as f64 * a + dst as f64 * (1.0 - a)).round() as u8;
        pixel[0] = mix(color.r, pixel[0]);
        pixel[1] = mix(color.g, pixel[1]);
        pixel[2] = mix(color.b, pixel[2]);
        pixel[3] = 255;
    }
}

impl Surface for PixelBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn fill_radial_gradient(&mut self, gradient: &RadialGradient) {
        for y in 0..self.height {
            for x in 0..self.width {
                let color = gradient.color_at(x as f64 + 0.5, y as f64 + 0.5);
                let offset = (y * self.width + x) * 4;
                self.pixel_data[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64) {
        let Some((min_x, min_y, max_x, max_y)) = rect.pixel_bounds(self.width, self.height) else {
            return;
        };
        for y in min_y..max_y {
            for x in min_x..max_x {
                self.blend(x, y, color, alpha);
            }
        }
    }

    fn blit(&mut self, sprite: &Sprite, dest: Rect, alpha: f64) {
        if dest.width <= 0.0 || dest.height <= 0.0 || alpha <= 0.0 {
            return;
        }
        let Some((min_x, min_y, max_x, max_y)) = dest.pixel_bounds(self.width, self.height) else {
            return;
        };
        for y in min_y..max_y {
            let v = (y as f64 + 0.5 - dest.y) / dest.height;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let sy = ((v * sprite.height as f64) as usize).min(sprite.height - 1);
            for x in min_x..max_x {
                let u = (x as f64 + 0.5 - dest.x) / dest.width;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let sx = ((u * sprite.width as f64) as usize).min(sprite.width - 1);
                self.blend(x, y, sprite.pixel(sx, sy), alpha);
            }
        }
    }
}
