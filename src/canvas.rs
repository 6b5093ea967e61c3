use crate::particle::Rgb;
use std::io::Write;

/// Drawing operations the simulation needs. Coordinates are logical units;
/// anything outside the surface is clipped.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Paints `color` at `alpha` over the whole surface.
    fn fade(&mut self, color: Rgb, alpha: f32);

    /// Filled disc with additive ("lighter") compositing.
    fn fill_disc(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32);

    /// Single pixel, normal source-over compositing.
    fn plot(&mut self, x: f32, y: f32, color: Rgb, alpha: f32);
}

/// Persistent RGB framebuffer backed by terminal half-blocks: each cell holds
/// two vertically stacked pixels, and each pixel spans `scale` logical units.
pub struct Canvas {
    width: usize,
    height: usize,
    scale: f32,
    pixels: Vec<[f32; 3]>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize, scale: f32) -> Self {
        let width = cols.max(1);
        let height = rows.max(1) * 2;
        Self {
            width,
            height,
            scale,
            pixels: vec![[0.0; 3]; width * height],
        }
    }

    /// Rebuilds the backing store for a new terminal size. Drawing
    /// coordinates stay in logical units, so simulation state is unaffected.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        *self = Self::new(cols, rows, self.scale);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixel(&self, px: usize, py: usize) -> Rgb {
        to_rgb(self.pixels[py * self.width + px])
    }

    fn index(&self, px: isize, py: isize) -> Option<usize> {
        if px >= 0 && py >= 0 && (px as usize) < self.width && (py as usize) < self.height {
            Some(py as usize * self.width + px as usize)
        } else {
            None
        }
    }

    /// Appends the frame as half-block escape sequences, starting from the
    /// top-left corner.
    pub fn encode(&self, buf: &mut Vec<u8>) -> std::io::Result<()> {
        buf.extend_from_slice(b"\x1b[H");

        let mut prev_top_color: Option<Rgb> = None;
        let mut prev_bot_color: Option<Rgb> = None;

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_color = to_rgb(self.pixels[y * self.width + x]);
                let bot_color = if y + 1 < self.height {
                    to_rgb(self.pixels[(y + 1) * self.width + x])
                } else {
                    top_color
                };

                if prev_top_color != Some(top_color) {
                    write!(buf, "\x1b[48;2;{};{};{}m", top_color.0, top_color.1, top_color.2)?;
                    prev_top_color = Some(top_color);
                }
                if prev_bot_color != Some(bot_color) {
                    write!(buf, "\x1b[38;2;{};{};{}m", bot_color.0, bot_color.1, bot_color.2)?;
                    prev_bot_color = Some(bot_color);
                }

                buf.extend_from_slice("▄".as_bytes());
            }
            buf.extend_from_slice(b"\x1b[0m");
            prev_top_color = None;
            prev_bot_color = None;
            if y + 2 < self.height {
                buf.extend_from_slice(b"\r\n");
            }
        }
        Ok(())
    }
}

impl Surface for Canvas {
    fn width(&self) -> f32 {
        self.width as f32 * self.scale
    }

    fn height(&self) -> f32 {
        self.height as f32 * self.scale
    }

    fn fade(&mut self, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let target = to_unit(color);
        for pixel in &mut self.pixels {
            for (p, t) in pixel.iter_mut().zip(target) {
                *p = *p * (1.0 - alpha) + t * alpha;
            }
        }
    }

    fn fill_disc(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let cx = x / self.scale;
        let cy = y / self.scale;
        let r = (radius / self.scale).max(0.5);
        let center = (cx.floor() as isize, cy.floor() as isize);
        let add = to_unit(color).map(|c| c * alpha);

        // bounding box clipped to the framebuffer
        let last_row = self.height as isize - 1;
        let last_col = self.width as isize - 1;
        let rows = ((cy - r).floor() as isize).max(0)..=((cy + r).ceil() as isize).min(last_row);
        let cols = ((cx - r).floor() as isize).max(0)..=((cx + r).ceil() as isize).min(last_col);

        for py in rows {
            for px in cols.clone() {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy > r * r && (px, py) != center {
                    continue;
                }
                if let Some(idx) = self.index(px, py) {
                    for (p, a) in self.pixels[idx].iter_mut().zip(add) {
                        *p = (*p + a).min(1.0);
                    }
                }
            }
        }
    }

    fn plot(&mut self, x: f32, y: f32, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let px = (x / self.scale).floor() as isize;
        let py = (y / self.scale).floor() as isize;
        if let Some(idx) = self.index(px, py) {
            let src = to_unit(color);
            for (p, s) in self.pixels[idx].iter_mut().zip(src) {
                *p = *p * (1.0 - alpha) + s * alpha;
            }
        }
    }
}

fn to_unit(color: Rgb) -> [f32; 3] {
    [
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
    ]
}

fn to_rgb(pixel: [f32; 3]) -> Rgb {
    (
        (pixel[0] * 255.0).round() as u8,
        (pixel[1] * 255.0).round() as u8,
        (pixel[2] * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_size_follows_scale() {
        let canvas = Canvas::new(80, 20, 4.0);
        assert_eq!(canvas.pixel_size(), (80, 40));
        assert_eq!(canvas.width(), 320.0);
        assert_eq!(canvas.height(), 160.0);
    }

    #[test]
    fn repeated_fade_converges_on_background() {
        let mut canvas = Canvas::new(4, 2, 1.0);
        canvas.fill_disc(1.5, 1.5, 0.5, (255, 255, 255), 1.0);
        assert_eq!(canvas.pixel(1, 1), (255, 255, 255));
        for _ in 0..60 {
            canvas.fade((2, 6, 23), 0.28);
        }
        assert_eq!(canvas.pixel(1, 1), (2, 6, 23));
        assert_eq!(canvas.pixel(0, 0), (2, 6, 23));
    }

    #[test]
    fn fill_disc_is_additive_and_saturates() {
        let mut canvas = Canvas::new(4, 2, 1.0);
        canvas.fill_disc(2.5, 2.5, 0.5, (100, 0, 0), 1.0);
        canvas.fill_disc(2.5, 2.5, 0.5, (100, 50, 0), 1.0);
        assert_eq!(canvas.pixel(2, 2), (200, 50, 0));
        canvas.fill_disc(2.5, 2.5, 0.5, (200, 0, 0), 1.0);
        assert_eq!(canvas.pixel(2, 2), (255, 50, 0));
    }

    #[test]
    fn fill_disc_respects_alpha() {
        let mut canvas = Canvas::new(4, 2, 1.0);
        canvas.fill_disc(0.5, 0.5, 0.5, (200, 100, 0), 0.5);
        assert_eq!(canvas.pixel(0, 0), (100, 50, 0));
    }

    #[test]
    fn tiny_disc_still_lights_its_pixel() {
        let mut canvas = Canvas::new(10, 5, 4.0);
        canvas.fill_disc(13.0, 9.0, 1.0, (255, 255, 255), 1.0);
        assert_eq!(canvas.pixel(3, 2), (255, 255, 255));
    }

    #[test]
    fn off_surface_drawing_is_clipped() {
        let mut canvas = Canvas::new(4, 2, 1.0);
        canvas.fill_disc(-50.0, 900.0, 3.0, (255, 255, 255), 1.0);
        canvas.plot(-1.0, -1.0, (255, 255, 255), 1.0);
        canvas.plot(4.0, 0.0, (255, 255, 255), 1.0);
        for py in 0..4 {
            for px in 0..4 {
                assert_eq!(canvas.pixel(px, py), (0, 0, 0));
            }
        }
    }

    #[test]
    fn oversized_disc_only_touches_the_framebuffer() {
        let mut canvas = Canvas::new(4, 2, 0.001);
        canvas.fill_disc(0.002, 0.002, 3.0, (255, 255, 255), 1.0);
        for py in 0..4 {
            for px in 0..4 {
                assert_eq!(canvas.pixel(px, py), (255, 255, 255));
            }
        }
    }

    #[test]
    fn huge_disc_far_off_surface_draws_nothing() {
        let mut canvas = Canvas::new(4, 2, 0.001);
        canvas.fill_disc(-5000.0, 5000.0, 3.0, (255, 255, 255), 1.0);
        for py in 0..4 {
            for px in 0..4 {
                assert_eq!(canvas.pixel(px, py), (0, 0, 0));
            }
        }
    }

    #[test]
    fn plot_blends_over_existing_color() {
        let mut canvas = Canvas::new(2, 1, 1.0);
        canvas.plot(0.0, 0.0, (255, 255, 255), 0.2);
        assert_eq!(canvas.pixel(0, 0), (51, 51, 51));
    }

    #[test]
    fn resize_keeps_scale() {
        let mut canvas = Canvas::new(10, 5, 3.0);
        canvas.resize(20, 8);
        assert_eq!(canvas.pixel_size(), (20, 16));
        assert_eq!(canvas.width(), 60.0);
    }

    #[test]
    fn encode_emits_one_half_block_per_cell() {
        let canvas = Canvas::new(5, 3, 1.0);
        let mut buf = Vec::new();
        canvas.encode(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("\x1b[H"));
        assert_eq!(text.matches('▄').count(), 15);
        assert_eq!(text.matches("\r\n").count(), 2);
    }
}
