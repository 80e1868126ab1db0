//! Software drawing into the softbuffer framebuffer (`0x00RRGGBB` per pixel).

use image::RgbaImage;
use miniview::loader;
use miniview::mode::RenameDraft;
use miniview::Viewer;

pub type Color = (u8, u8, u8, u8);

pub const BG_COLOR: u32 = rgb(0x11, 0x11, 0x11);
const BAR_COLOR: Color = (0x18, 0x18, 0x18, 255);
const TEXT_COLOR: Color = (0xdd, 0xdd, 0xdd, 255);
const ERROR_COLOR: Color = (255, 80, 80, 255);
const PANEL_COLOR: Color = (0, 0, 0, 200);

pub const TEXT_SCALE: u32 = 2;
/// Glyph cell width at scale 1: 5 pixels plus 1 spacing.
const GLYPH_W: u32 = 6;
const LINE_H: i32 = 7 * TEXT_SCALE as i32 + 6;
/// Height of the status bar under the image viewport.
pub const STATUS_BAR_H: u32 = 7 * TEXT_SCALE + 8;

// 5x7 bitmap font for ASCII 32..127, one byte per column, LSB = top row.
static FONT_5X7: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14],
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62], [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00],
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00], [0x14, 0x08, 0x3E, 0x08, 0x14], [0x08, 0x08, 0x3E, 0x08, 0x08],
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02],
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4B, 0x31],
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39], [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03],
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1E], [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00],
    [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14], [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06],
    [0x3E, 0x41, 0x5D, 0x55, 0x1E], [0x7E, 0x11, 0x11, 0x11, 0x7E], [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22],
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], [0x7F, 0x09, 0x09, 0x09, 0x01], [0x3E, 0x41, 0x49, 0x49, 0x7A],
    [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00], [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41],
    [0x7F, 0x40, 0x40, 0x40, 0x40], [0x7F, 0x02, 0x0C, 0x02, 0x7F], [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E],
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], [0x7F, 0x09, 0x19, 0x29, 0x46], [0x46, 0x49, 0x49, 0x49, 0x31],
    [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F], [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x3F, 0x40, 0x38, 0x40, 0x3F],
    [0x63, 0x14, 0x08, 0x14, 0x63], [0x07, 0x08, 0x70, 0x08, 0x07], [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7F, 0x41, 0x41, 0x00],
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00], [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40],
    [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78], [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20],
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7E, 0x09, 0x01, 0x02], [0x0C, 0x52, 0x52, 0x52, 0x3E],
    [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00], [0x20, 0x40, 0x44, 0x3D, 0x00], [0x7F, 0x10, 0x28, 0x44, 0x00],
    [0x00, 0x41, 0x7F, 0x40, 0x00], [0x7C, 0x04, 0x18, 0x04, 0x78], [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38],
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], [0x7C, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20],
    [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C], [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C],
    [0x44, 0x28, 0x10, 0x28, 0x44], [0x0C, 0x50, 0x50, 0x50, 0x3C], [0x44, 0x64, 0x54, 0x4C, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00],
    [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00], [0x10, 0x08, 0x08, 0x10, 0x08], [0x00, 0x00, 0x00, 0x00, 0x00],
];

pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn mix(src: u8, dst: u8, alpha: u32) -> u8 {
    ((src as u32 * alpha + dst as u32 * (255 - alpha)) / 255) as u8
}

/// A borrowed framebuffer with its dimensions.
pub struct Canvas<'a> {
    buf: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut [u32], width: u32, height: u32) -> Self {
        Self { buf, width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let off = (y as u32 * self.width + x as u32) as usize;
        (off < self.buf.len()).then_some(off)
    }

    fn blend(&mut self, x: i32, y: i32, color: Color) {
        let Some(off) = self.offset(x, y) else { return };
        let a = color.3 as u32;
        if a == 255 {
            self.buf[off] = rgb(color.0, color.1, color.2);
        } else if a > 0 {
            let (dr, dg, db) = unpack_rgb(self.buf[off]);
            self.buf[off] = rgb(mix(color.0, dr, a), mix(color.1, dg, a), mix(color.2, db, a));
        }
    }

    pub fn fill(&mut self, color: u32) {
        self.buf.fill(color);
    }

    pub fn fill_rect(&mut self, rx: i32, ry: i32, rw: u32, rh: u32, color: Color) {
        for y in ry..ry + rh as i32 {
            for x in rx..rx + rw as i32 {
                self.blend(x, y, color);
            }
        }
    }

    fn draw_char(&mut self, ch: char, px: i32, py: i32, scale: u32, color: Color) {
        let idx = (ch as u32).wrapping_sub(32) as usize;
        let Some(glyph) = FONT_5X7.get(idx) else { return };
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..7u32 {
                if bits & (1 << row) != 0 {
                    let x = px + (col as u32 * scale) as i32;
                    let y = py + (row * scale) as i32;
                    self.fill_rect(x, y, scale, scale, color);
                }
            }
        }
    }

    /// Draw a string; returns the x position after the last character.
    pub fn draw_text(&mut self, text: &str, px: i32, py: i32, scale: u32, color: Color) -> i32 {
        let mut x = px;
        for ch in text.chars() {
            self.draw_char(ch, x, py, scale, color);
            x += (GLYPH_W * scale) as i32;
        }
        x
    }

    /// Alpha-blend `img` with its top-left at (x0, y0), clipped to rows above `clip_h`.
    pub fn blit_rgba(&mut self, img: &RgbaImage, x0: i32, y0: i32, clip_h: u32) {
        let clip_h = clip_h.min(self.height) as i32;
        let sy_start = (-y0).max(0) as u32;
        let sy_end = ((clip_h - y0).max(0) as u32).min(img.height());
        let sx_start = (-x0).max(0) as u32;
        let sx_end = ((self.width as i32 - x0).max(0) as u32).min(img.width());

        for sy in sy_start..sy_end {
            for sx in sx_start..sx_end {
                let p = img.get_pixel(sx, sy).0;
                self.blend(x0 + sx as i32, y0 + sy as i32, (p[0], p[1], p[2], p[3]));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Frame composition
// ---------------------------------------------------------------------------

/// Image viewport size for a window of the given size.
pub fn viewport(width: u32, height: u32) -> (u32, u32) {
    (width, height.saturating_sub(STATUS_BAR_H))
}

pub fn draw_viewer(canvas: &mut Canvas, viewer: &Viewer) {
    canvas.fill(BG_COLOR);
    let (view_w, view_h) = viewport(canvas.width(), canvas.height());

    if let (Some(img), Some(plan)) = (viewer.image(), viewer.render_plan(view_w, view_h)) {
        if let Some(placed) = loader::resize_for_display(img, &plan, view_w, view_h) {
            canvas.blit_rgba(&placed.pixels, placed.x, placed.y, view_h);
        }
    }

    canvas.fill_rect(0, view_h as i32, canvas.width(), STATUS_BAR_H, BAR_COLOR);
    canvas.draw_text(viewer.status(), 8, view_h as i32 + 4, TEXT_SCALE, TEXT_COLOR);

    if let Some(draft) = viewer.mode().draft() {
        draw_rename_panel(canvas, draft, view_w, view_h);
    }
}

fn draw_rename_panel(canvas: &mut Canvas, draft: &RenameDraft, view_w: u32, view_h: u32) {
    let panel_w = view_w.saturating_sub(40).min(720);
    let panel_h = (LINE_H * 4) as u32;
    let px = (view_w as i32 - panel_w as i32) / 2;
    let py = (view_h as i32 - panel_h as i32) / 2;
    canvas.fill_rect(px, py, panel_w, panel_h, PANEL_COLOR);

    let tx = px + 12;
    let mut ty = py + 8;
    let title = format!("Rename {}", draft.target().file_name());
    canvas.draw_text(&title, tx, ty, TEXT_SCALE, TEXT_COLOR);
    ty += LINE_H;

    let (before, after) = draft.buffer().split_at(draft.caret());
    let mut x = canvas.draw_text(before, tx, ty, TEXT_SCALE, (255, 255, 255, 255));
    canvas.fill_rect(x, ty - 2, 2, (7 * TEXT_SCALE + 4) as u32, TEXT_COLOR);
    x = canvas.draw_text(after, x + 2, ty, TEXT_SCALE, (255, 255, 255, 255));
    if !draft.target().extension().is_empty() {
        let ext = format!(".{}", draft.target().extension());
        canvas.draw_text(&ext, x, ty, TEXT_SCALE, (140, 140, 140, 255));
    }
    ty += LINE_H;

    match draft.error() {
        Some(err) if draft.needs_ack() => {
            canvas.draw_text(err, tx, ty, TEXT_SCALE, ERROR_COLOR);
            canvas.draw_text("Enter or edit to continue", tx, ty + LINE_H, TEXT_SCALE, TEXT_COLOR);
        }
        Some(err) => {
            canvas.draw_text(err, tx, ty, TEXT_SCALE, ERROR_COLOR);
        }
        None => {
            canvas.draw_text("Enter: rename   Esc: cancel", tx, ty, TEXT_SCALE, TEXT_COLOR);
        }
    }
}
