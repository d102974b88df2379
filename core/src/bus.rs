//! Seams between the interpreter core and its peripherals.
//!
//! The core never holds a reference into peripheral state; it calls these
//! traits from inside `step()` and `tick_60hz()` and forgets about them.

/// Owns the visible pixel state. The `Dxyn` opcode is the sole producer
/// of pixel mutations, via [`draw_sprite`](Screen::draw_sprite).
pub trait Screen {
    /// Turn every pixel off.
    fn clear(&mut self);

    /// XOR-blit sprite rows at (x, y), one byte per row, most significant
    /// bit leftmost, wrapping on both axes. Returns true if any lit pixel
    /// was flipped off (a collision).
    fn draw_sprite(&mut self, rows: &[u8], x: u8, y: u8) -> bool;
}

/// Reports the currently held key code (0x0..=0xF), or `None`.
///
/// The machine tracks a single pressed key at a time, not a 16-key
/// bitmap. Implementations must answer from one atomic snapshot; the
/// core reads exactly once per key-dependent opcode.
pub trait Keypad {
    fn current_key(&self) -> Option<u8>;
}

/// A snapshot value is itself a key source.
impl Keypad for Option<u8> {
    fn current_key(&self) -> Option<u8> {
        *self
    }
}

/// Single-tone audio output, gated by the sound timer.
pub trait Buzzer {
    fn start_tone(&mut self);
    fn stop_tone(&mut self);
}

/// The peripherals one `step()` may touch.
pub(crate) struct Peripherals<'a> {
    pub screen: &'a mut dyn Screen,
    pub keypad: &'a dyn Keypad,
}
