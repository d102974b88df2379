use crate::bus::Screen;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Pixel grid indexed as `[y][x]`; 1 is lit, 0 is dark.
pub type Pixels = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// The canonical [`Screen`]: a 64x32 monochrome frame with XOR blitting.
///
/// Tracks a dirty flag so a driver only repaints after a `00E0` or
/// `Dxyn` actually changed something; [`take_frame`](FrameBuffer::take_frame)
/// hands the frame over and rearms the flag.
pub struct FrameBuffer {
    pixels: Pixels,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            // Dirty from the start so the first frame paints.
            dirty: true,
        }
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    /// Returns the frame if it changed since the last take.
    pub fn take_frame(&mut self) -> Option<Pixels> {
        if self.dirty {
            self.dirty = false;
            Some(self.pixels)
        } else {
            None
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for FrameBuffer {
    fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    fn draw_sprite(&mut self, rows: &[u8], x: u8, y: u8) -> bool {
        let mut collided = false;
        for (row, byte) in rows.iter().enumerate() {
            let py = (y as usize + row) % DISPLAY_HEIGHT;
            for bit in 0..8 {
                if byte & (0x80 >> bit) == 0 {
                    continue;
                }
                let px = (x as usize + bit) % DISPLAY_WIDTH;
                if self.pixels[py][px] == 1 {
                    collided = true;
                }
                self.pixels[py][px] ^= 1;
            }
        }
        self.dirty = true;
        collided
    }
}
