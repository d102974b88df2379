use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::WindowCanvas;
use sdl2::Sdl;

use vip8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use vip8_core::Pixels;

const BACKGROUND: Color = Color::RGB(0x10, 0x18, 0x10);
const FOREGROUND: Color = Color::RGB(0x9C, 0xE5, 0x9C);

/// # Display
/// Scaled rendering of the machine's 64x32 monochrome frame onto an SDL2
/// window. Each machine pixel becomes a `scale` x `scale` filled square.
///
/// The driver calls [`render`](Display::render) only when the core
/// reports a dirty frame, so nothing here tracks frame state.
pub struct Display {
    canvas: WindowCanvas,
    scale: u32,
}

impl Display {
    pub fn new(sdl: &Sdl, scale: u32) -> Result<Self, String> {
        let video = sdl.video()?;
        let window = video
            .window(
                "vip8",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        Ok(Display { canvas, scale })
    }

    /// Repaints the whole frame.
    pub fn render(&mut self, pixels: &Pixels) -> Result<(), String> {
        self.canvas.set_draw_color(BACKGROUND);
        self.canvas.clear();
        self.canvas.set_draw_color(FOREGROUND);
        self.canvas.fill_rects(&lit_rects(pixels, self.scale))?;
        self.canvas.present();
        Ok(())
    }
}

/// One scaled square per lit pixel.
fn lit_rects(pixels: &Pixels, scale: u32) -> Vec<Rect> {
    pixels
        .iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &pixel)| pixel == 1)
                .map(move |(x, _)| {
                    Rect::new(
                        (x as u32 * scale) as i32,
                        (y as u32 * scale) as i32,
                        scale,
                        scale,
                    )
                })
        })
        .collect()
}
