use crate::constants::{FONT_BASE, FONT_SPRITES, LOAD_OFFSET, MEMORY_SIZE, STACK_DEPTH};

/// Everything the interpreter mutates while running a program.
///
/// Registers
/// - (v) 16 8-bit registers V0..VF. VF doubles as the carry/borrow/
///   collision flag and is rewritten as a side effect of the arithmetic,
///   shift, and draw opcodes.
/// - (i) the 16-bit address register used for indirect memory access and
///   as the sprite source pointer.
///
/// Control
/// - (pc) the 16-bit program counter; always points at the next word to
///   fetch and is advanced by 2 before an opcode executes.
/// - (stack, sp) return addresses for subroutine calls. `sp` indexes the
///   next free slot, so 0 means empty.
///
/// Timers
/// - (delay_timer, sound_timer) 8-bit counters decremented at 60 Hz while
///   non-zero. A non-zero sound timer keeps the tone playing.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct State {
    pub memory: [u8; MEMORY_SIZE],
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub stack: [u16; STACK_DEPTH],
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl State {
    /// The post-reset state: memory zeroed except for the font table,
    /// everything else zeroed, PC at the load offset.
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_BASE..FONT_BASE + FONT_SPRITES.len()].copy_from_slice(&FONT_SPRITES);

        State {
            memory,
            v: [0; 16],
            i: 0,
            pc: LOAD_OFFSET as u16,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_font_then_zeroes() {
        let state = State::new();
        assert_eq!(state.memory[0..5], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert!(state.memory[80..].iter().all(|&b| b == 0));
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
    }
}
