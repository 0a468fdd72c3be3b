//! Display-list rasterization.
//!
//! Draws one tick's line segments into a `u32` framebuffer: a line pass
//! at table intensity with a fixed alpha, then a point pass that re-plots
//! every segment's endpoints at full intensity. The point pass is a
//! correctness requirement, not a cosmetic one — a zero-length segment is
//! a point the beam dwelled on and would otherwise vanish.
//!
//! With the debug overlay enabled, bars derived from the synthesizer's
//! diagnostics snapshot and a trace of its last PCM buffer are drawn on
//! top. The overlay draws nothing before the first fill has published a
//! snapshot.

use super::color::ColorTable;
use crate::machine::{DisplayList, BEAM_MAX_X, BEAM_MAX_Y};
use crate::psg::SynthDiagnostics;

/// Alpha applied to the line pass; endpoints re-plot at full intensity.
pub const LINE_ALPHA: f32 = 0.75;

/// Overlay trace color (the only non-grayscale the renderer emits).
const OVERLAY_PCM_COLOR: u32 = 0x0000_00FF;

fn gray(shade: u8) -> u32 {
    let s = shade as u32;
    (s << 16) | (s << 8) | s
}

/// Rasterizes display lists into a framebuffer sized for the window.
#[derive(Debug, Clone)]
pub struct VectorRenderer {
    width: usize,
    height: usize,
    /// Beam units per pixel.
    scale: i32,
    frame: Vec<u32>,
    colors: ColorTable,
}

impl VectorRenderer {
    /// Create a renderer for a window of the given pixel size.
    pub fn new(width: usize, height: usize) -> Self {
        let scale_x = BEAM_MAX_X / width.max(1) as i32;
        let scale_y = BEAM_MAX_Y / height.max(1) as i32;
        VectorRenderer {
            width,
            height,
            scale: scale_x.max(scale_y).max(1),
            frame: vec![0; width * height],
            colors: ColorTable::new(),
        }
    }

    /// Framebuffer of the last rendered frame, row-major `0RGB`.
    pub fn buffer(&self) -> &[u32] {
        &self.frame
    }

    /// Framebuffer width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Framebuffer height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rasterize one frame: clear, line pass, endpoint point pass, then
    /// the debug overlay when enabled and a diagnostics snapshot exists.
    pub fn render(&mut self, list: &DisplayList, diag: Option<&SynthDiagnostics>, overlay: bool) {
        self.frame.fill(0);

        for segment in list {
            let intensity = self.colors.intensity(segment.color);
            let shade = (intensity * LINE_ALPHA * 255.0) as u8;
            self.draw_line(
                segment.x0 / self.scale,
                segment.y0 / self.scale,
                segment.x1 / self.scale,
                segment.y1 / self.scale,
                gray(shade),
            );
        }

        // Zero-length segments have no line pixels; the endpoints keep
        // them visible.
        for segment in list {
            let intensity = self.colors.intensity(segment.color);
            let shade = (intensity * 255.0) as u8;
            self.plot(segment.x0 / self.scale, segment.y0 / self.scale, gray(shade));
            self.plot(segment.x1 / self.scale, segment.y1 / self.scale, gray(shade));
        }

        if overlay {
            if let Some(diag) = diag {
                self.draw_overlay(diag);
            }
        }
    }

    /// Audio-state bars and PCM trace, all positioned in beam space.
    fn draw_overlay(&mut self, diag: &SynthDiagnostics) {
        let s = self.scale;
        let bar = |renderer: &mut Self, y: i32, len: i32| {
            renderer.draw_line(1000 / s, y / s, (1000 + len.max(0)) / s, y / s, gray(255));
        };

        // Per-voice volume, then voice A mute flags, then the periods
        for voice in 0..3 {
            bar(self, 20_000 + voice as i32 * 500, diag.volume[voice] as i32 * 1500);
        }
        bar(self, 24_000, if diag.tone_muted[0] { 2000 } else { 0 });
        bar(self, 24_500, if diag.noise_muted[0] { 2000 } else { 0 });
        bar(self, 28_000, diag.tone_period[0] as i32 * 6);
        bar(self, 28_500, diag.noise_period as i32 * 40);

        for (i, &sample) in diag.pcm.iter().take(300).enumerate() {
            let x = i as i32 * 100;
            self.draw_line(
                x / s,
                39_500 / s,
                x / s,
                (39_500 - 20 * sample as i32) / s,
                OVERLAY_PCM_COLOR,
            );
        }
    }

    fn plot(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.frame[y as usize * self.width + x as usize] = color;
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.plot(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::LineSegment;

    fn point_segment(x: i32, y: i32, color: u8) -> LineSegment {
        LineSegment {
            x0: x,
            y0: y,
            x1: x,
            y1: y,
            color,
        }
    }

    #[test]
    fn test_degenerate_segment_is_visible() {
        let mut renderer = VectorRenderer::new(330, 410);
        let mut list = DisplayList::new();
        list.push(point_segment(5000, 5000, 127));
        renderer.render(&list, None, false);

        // Default geometry scales 100 beam units per pixel
        let pixel = renderer.buffer()[50 * 330 + 50];
        assert_ne!(pixel, 0);
        assert_eq!(pixel, gray((127.0 / 128.0 * 255.0) as u8));
    }

    #[test]
    fn test_endpoints_brighter_than_line_body() {
        let mut renderer = VectorRenderer::new(330, 410);
        let mut list = DisplayList::new();
        list.push(LineSegment {
            x0: 0,
            y0: 0,
            x1: 10_000,
            y1: 0,
            color: 127,
        });
        renderer.render(&list, None, false);

        let start = renderer.buffer()[0];
        let body = renderer.buffer()[50];
        assert_eq!(start, gray((127.0 / 128.0 * 255.0) as u8));
        assert_eq!(body, gray((127.0 / 128.0 * LINE_ALPHA * 255.0) as u8));
        assert!((start & 0xFF) > (body & 0xFF));
    }

    #[test]
    fn test_out_of_bounds_segments_are_clipped() {
        let mut renderer = VectorRenderer::new(330, 410);
        let mut list = DisplayList::new();
        list.push(LineSegment {
            x0: -50_000,
            y0: -50_000,
            x1: 90_000,
            y1: 90_000,
            color: 127,
        });
        renderer.render(&list, None, false);
    }

    #[test]
    fn test_overlay_without_snapshot_draws_nothing_extra() {
        let mut list = DisplayList::new();
        list.push(point_segment(5000, 5000, 64));

        let mut plain = VectorRenderer::new(330, 410);
        plain.render(&list, None, false);
        let mut overlaid = VectorRenderer::new(330, 410);
        overlaid.render(&list, None, true);
        assert_eq!(plain.buffer(), overlaid.buffer());
    }

    #[test]
    fn test_overlay_draws_pcm_trace() {
        use crate::psg::{PsgSynth, RegisterFile};

        let regs = RegisterFile::new();
        let pcm = PsgSynth::new().fill_tick(&regs);
        let diag = SynthDiagnostics::capture(&regs, &pcm);

        let list = DisplayList::new();
        let mut plain = VectorRenderer::new(330, 410);
        plain.render(&list, Some(&diag), false);
        let mut overlaid = VectorRenderer::new(330, 410);
        overlaid.render(&list, Some(&diag), true);
        assert_ne!(plain.buffer(), overlaid.buffer());
    }
}
