//! Fixed parameters of the machine.

/// Total addressable memory in bytes. Every effective address an opcode
/// computes must land inside this range.
pub const MEMORY_SIZE: usize = 4096;

/// Program images are copied in here and execution starts here.
pub const LOAD_OFFSET: usize = 0x200;

/// The built-in font table sits at the very start of memory.
pub const FONT_BASE: usize = 0x000;

/// Bytes per font glyph.
pub const GLYPH_BYTES: usize = 5;

/// Maximum nesting depth of subroutine calls.
pub const STACK_DEPTH: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The delay and sound timers count down at this fixed rate regardless
/// of how fast instructions are being dispatched.
pub const TIMER_HZ: u32 = 60;

/// Default instruction-dispatch rate. Dispatch speed is configurable;
/// the timer rate is not.
pub const DEFAULT_CYCLE_HZ: u32 = 600;

/// Glyphs for the hexadecimal digits 0-F, five rows of eight pixels each,
/// most significant bit leftmost.
pub const FONT_SPRITES: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
