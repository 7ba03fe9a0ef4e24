//! FPS graph overlay, rasterized on the CPU into an RGBA image.
//!
//! Rendering is a pure function of the sample snapshot: every call starts from
//! a cleared canvas, so the same samples always produce the same pixels.

use image::{Pixel, Rgba, RgbaImage};

use crate::fps::Snapshot;

pub const OVERLAY_WIDTH: u32 = 320;
pub const OVERLAY_HEIGHT: u32 = 160;
pub const MIN_FPS: f64 = 15.0;
pub const MAX_FPS: f64 = 200.0;
pub const REFERENCE_FPS: [f64; 3] = [30.0, 60.0, 120.0];

const GRID_SPACING: u32 = 20;
const LABEL_X: i32 = 4;
const READOUT_X: i32 = 6;
const READOUT_Y: i32 = 6;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 160]);
const GRID: Rgba<u8> = Rgba([255, 255, 255, 28]);
const TRACE: Rgba<u8> = Rgba([90, 220, 255, 255]);
const READOUT: Rgba<u8> = Rgba([255, 255, 255, 255]);

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;

#[derive(Clone, Copy, Debug, Default)]
pub struct FpsVisualizer;

impl FpsVisualizer {
    pub fn new() -> Self {
        Self
    }

    pub fn blank_canvas(&self) -> RgbaImage {
        RgbaImage::new(OVERLAY_WIDTH, OVERLAY_HEIGHT)
    }

    pub fn render(&self, samples: Snapshot<'_>) -> RgbaImage {
        let mut canvas = self.blank_canvas();
        self.render_into(samples, &mut canvas);
        canvas
    }

    pub fn render_into(&self, samples: Snapshot<'_>, canvas: &mut RgbaImage) {
        if canvas.dimensions() != (OVERLAY_WIDTH, OVERLAY_HEIGHT) {
            *canvas = self.blank_canvas();
        }

        for pixel in canvas.pixels_mut() {
            *pixel = BACKGROUND;
        }

        draw_grid(canvas);

        for fps in REFERENCE_FPS {
            let color = reference_color(fps);
            let y = fps_to_y(fps).round() as i32;
            draw_line(canvas, (0, y), (OVERLAY_WIDTH as i32 - 1, y), color);
            draw_text(canvas, LABEL_X, y - GLYPH_HEIGHT - 2, &format!("{fps:.0}"), color);
        }

        draw_trace(canvas, samples);

        if let Some(latest) = samples.latest() {
            let text = format!("{} FPS", latest.round() as i64);
            draw_text(canvas, READOUT_X, READOUT_Y, &text, READOUT);
        }
    }
}

/// Maps an FPS value onto a pixel row; `MIN_FPS` sits on the bottom edge and
/// `MAX_FPS` on the top.
pub fn fps_to_y(fps: f64) -> f32 {
    let height = OVERLAY_HEIGHT as f64;
    (height - (fps - MIN_FPS) / (MAX_FPS - MIN_FPS) * height) as f32
}

/// Maps sample `index` of `count` across the full overlay width.
pub fn index_to_x(index: usize, count: usize) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    (index as f64 / (count - 1) as f64 * OVERLAY_WIDTH as f64) as f32
}

fn reference_color(fps: f64) -> Rgba<u8> {
    if fps >= 120.0 {
        Rgba([110, 230, 110, 200])
    } else if fps >= 60.0 {
        Rgba([240, 210, 80, 200])
    } else {
        Rgba([240, 90, 80, 200])
    }
}

fn draw_grid(canvas: &mut RgbaImage) {
    let (width, height) = canvas.dimensions();
    for x in (GRID_SPACING..width).step_by(GRID_SPACING as usize) {
        draw_line(canvas, (x as i32, 0), (x as i32, height as i32 - 1), GRID);
    }
    for y in (GRID_SPACING..height).step_by(GRID_SPACING as usize) {
        draw_line(canvas, (0, y as i32), (width as i32 - 1, y as i32), GRID);
    }
}

fn draw_trace(canvas: &mut RgbaImage, samples: Snapshot<'_>) {
    let count = samples.len();
    let mut points = samples.iter().enumerate().map(|(index, fps)| {
        let x = index_to_x(index, count).round() as i32;
        let y = fps_to_y(fps.clamp(MIN_FPS, MAX_FPS)).round() as i32;
        (x, y)
    });

    let Some(mut cursor) = points.next() else {
        return;
    };
    for next in points {
        draw_line(canvas, cursor, next, TRACE);
        cursor = next;
    }
}

fn plot(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    // Edge coordinates (x == width, y == height) land on the last row/column.
    let x = x.clamp(0, width as i32 - 1) as u32;
    let y = y.clamp(0, height as i32 - 1) as u32;
    paint(canvas.get_pixel_mut(x, y), color);
}

fn paint(pixel: &mut Rgba<u8>, color: Rgba<u8>) {
    if color[3] == u8::MAX {
        *pixel = color;
    } else {
        pixel.blend(&color);
    }
}

fn draw_line(canvas: &mut RgbaImage, from: (i32, i32), to: (i32, i32), color: Rgba<u8>) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let step_x = if x0 < x1 { 1 } else { -1 };
    let step_y = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        plot(canvas, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += step_x;
        }
        if e2 <= dx {
            err += dx;
            y0 += step_y;
        }
    }
}

fn draw_text(canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let mut cursor_x = x;
    for ch in text.chars() {
        if let Some(rows) = glyph_rows(ch.to_ascii_uppercase()) {
            for (row, mask) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (mask >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + col;
                    let py = y + row as i32;
                    // Text is clipped rather than clamped onto the border.
                    if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                        paint(canvas.get_pixel_mut(px as u32, py as u32), color);
                    }
                }
            }
        }
        cursor_x += GLYPH_ADVANCE;
    }
}

fn glyph_rows(ch: char) -> Option<[u8; GLYPH_HEIGHT as usize]> {
    Some(match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        '-' => [0b00000, 0b00000, 0b00000, 0b01110, 0b00000, 0b00000, 0b00000],
        _ => return None,
    })
}
