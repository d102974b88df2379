use crate::bus::Peripherals;
use crate::error::Fault;
use crate::machine::Step;
use crate::opcode::Opcode;
use crate::operations as ops;
use crate::state::State;

/// Handler for one decoded opcode. Runs with PC already advanced past the
/// instruction word.
pub(crate) type OpFn = fn(Opcode, &mut State, &mut Peripherals<'_>) -> Result<Step, Fault>;

/// Selects the handler for an instruction word, or `None` if the word
/// matches nothing.
///
/// Precedence: exact-word matches (`00E0`, `00EE`) first, then top-nibble
/// families, with a secondary nibble or byte disambiguating the `0x5`,
/// `0x8`, `0x9`, `0xE` and `0xF` families.
pub(crate) fn decode(op: Opcode) -> Option<OpFn> {
    let handler: OpFn = match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => ops::cls,
        (0x0, 0x0, 0xE, 0xE) => ops::ret,
        (0x1, ..) => ops::jp,
        (0x2, ..) => ops::call,
        (0x3, ..) => ops::se_byte,
        (0x4, ..) => ops::sne_byte,
        (0x5, .., 0x0) => ops::se_reg,
        (0x6, ..) => ops::ld_byte,
        (0x7, ..) => ops::add_byte,
        (0x8, .., 0x0) => ops::ld_reg,
        (0x8, .., 0x1) => ops::or,
        (0x8, .., 0x2) => ops::and,
        (0x8, .., 0x3) => ops::xor,
        (0x8, .., 0x4) => ops::add_reg,
        (0x8, .., 0x5) => ops::sub,
        (0x8, .., 0x6) => ops::shr,
        (0x8, .., 0x7) => ops::subn,
        (0x8, .., 0xE) => ops::shl,
        (0x9, .., 0x0) => ops::sne_reg,
        (0xA, ..) => ops::ld_i,
        (0xB, ..) => ops::jp_v0,
        (0xC, ..) => ops::rnd,
        (0xD, ..) => ops::drw,
        (0xE, .., 0x9, 0xE) => ops::skp,
        (0xE, .., 0xA, 0x1) => ops::sknp,
        (0xF, .., 0x0, 0x7) => ops::ld_from_dt,
        (0xF, .., 0x0, 0xA) => ops::ld_key,
        (0xF, .., 0x1, 0x5) => ops::ld_dt,
        (0xF, .., 0x1, 0x8) => ops::ld_st,
        (0xF, .., 0x1, 0xE) => ops::add_i,
        (0xF, .., 0x2, 0x9) => ops::ld_font,
        (0xF, .., 0x3, 0x3) => ops::bcd,
        (0xF, .., 0x5, 0x5) => ops::store_regs,
        (0xF, .., 0x6, 0x5) => ops::load_regs,
        _ => return None,
    };
    Some(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Screen;
    use crate::frame::FrameBuffer;

    /// Decode and execute one word the way the machine would: PC is
    /// advanced past the instruction before the handler runs.
    fn try_exec(
        word: u16,
        state: &mut State,
        screen: &mut FrameBuffer,
        key: Option<u8>,
    ) -> Result<Step, Fault> {
        let op = Opcode::new(word);
        let handler = decode(op).expect("word should decode");
        state.pc += 2;
        handler(
            op,
            state,
            &mut Peripherals {
                screen,
                keypad: &key,
            },
        )
    }

    fn exec_with(word: u16, state: &mut State, screen: &mut FrameBuffer, key: Option<u8>) -> Step {
        try_exec(word, state, screen, key).unwrap()
    }

    fn exec(word: u16, state: &mut State) -> Step {
        exec_with(word, state, &mut FrameBuffer::new(), None)
    }

    #[test]
    fn test_00e0_clears_screen() {
        let mut state = State::new();
        let mut screen = FrameBuffer::new();
        screen.draw_sprite(&[0xFF], 0, 0);
        exec_with(0x00E0, &mut state, &mut screen, None);
        assert!(screen.pixels().iter().flatten().all(|&p| p == 0));
    }

    #[test]
    fn test_00ee_pops_return_address() {
        let mut state = State::new();
        state.stack[0] = 0x0ABC;
        state.sp = 1;
        exec(0x00EE, &mut state);
        assert_eq!(state.pc, 0x0ABC);
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_00ee_faults_on_empty_stack() {
        let mut state = State::new();
        let err = try_exec(0x00EE, &mut state, &mut FrameBuffer::new(), None).unwrap_err();
        assert_eq!(err, Fault::StackUnderflow { pc: 0x200 });
    }

    #[test]
    fn test_1nnn_jumps_absolute() {
        let mut state = State::new();
        exec(0x1ABC, &mut state);
        assert_eq!(state.pc, 0x0ABC);
    }

    #[test]
    fn test_2nnn_pushes_advanced_pc() {
        let mut state = State::new();
        exec(0x2400, &mut state);
        assert_eq!(state.sp, 1);
        assert_eq!(state.stack[0], 0x202);
        assert_eq!(state.pc, 0x400);
    }

    #[test]
    fn test_2nnn_faults_when_stack_full() {
        let mut state = State::new();
        state.sp = state.stack.len() as u8;
        let err = try_exec(0x2400, &mut state, &mut FrameBuffer::new(), None).unwrap_err();
        assert_eq!(err, Fault::StackOverflow { pc: 0x200 });
    }

    #[test]
    fn test_3xkk_skips_on_equal() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        exec(0x3111, &mut state);
        assert_eq!(state.pc, 0x204);
        exec(0x3112, &mut state);
        assert_eq!(state.pc, 0x206);
    }

    #[test]
    fn test_4xkk_skips_on_not_equal() {
        let mut state = State::new();
        exec(0x4111, &mut state);
        assert_eq!(state.pc, 0x204);
        state.v[0x1] = 0x11;
        exec(0x4111, &mut state);
        assert_eq!(state.pc, 0x206);
    }

    #[test]
    fn test_5xy0_skips_on_register_equal() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        exec(0x5120, &mut state);
        assert_eq!(state.pc, 0x204);
        state.v[0x2] = 0x12;
        exec(0x5120, &mut state);
        assert_eq!(state.pc, 0x206);
    }

    #[test]
    fn test_9xy0_skips_on_register_not_equal() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        exec(0x9120, &mut state);
        assert_eq!(state.pc, 0x204);
        state.v[0x2] = 0x11;
        exec(0x9120, &mut state);
        assert_eq!(state.pc, 0x206);
    }

    #[test]
    fn test_6xkk_loads_immediate() {
        let mut state = State::new();
        exec(0x6122, &mut state);
        assert_eq!(state.v[0x1], 0x22);
    }

    #[test]
    fn test_7xkk_adds_with_wraparound() {
        let mut state = State::new();
        state.v[0x1] = 0xFF;
        exec(0x7102, &mut state);
        assert_eq!(state.v[0x1], 0x01);
    }

    #[test]
    fn test_8xy0_copies_register() {
        let mut state = State::new();
        state.v[0x2] = 0x42;
        exec(0x8120, &mut state);
        assert_eq!(state.v[0x1], 0x42);
    }

    #[test]
    fn test_8xy1_8xy2_8xy3_bitwise() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        exec(0x8121, &mut state);
        assert_eq!(state.v[0x1], 0x7);

        state.v[0x1] = 0x6;
        exec(0x8122, &mut state);
        assert_eq!(state.v[0x1], 0x2);

        state.v[0x1] = 0x6;
        exec(0x8123, &mut state);
        assert_eq!(state.v[0x1], 0x5);
    }

    #[test]
    fn test_8xy4_sets_carry_iff_overflow() {
        let mut state = State::new();
        state.v[0x1] = 0xEE;
        state.v[0x2] = 0x11;
        state.v[0xF] = 1; // must be rewritten even without carry
        exec(0x8124, &mut state);
        assert_eq!(state.v[0x1], 0xFF);
        assert_eq!(state.v[0xF], 0);

        state.v[0x1] = 0xFF;
        exec(0x8124, &mut state);
        assert_eq!(state.v[0x1], 0x10);
        assert_eq!(state.v[0xF], 1);
    }

    #[test]
    fn test_8xy5_clears_flag_iff_borrow() {
        let mut state = State::new();
        state.v[0x1] = 0x33;
        state.v[0x2] = 0x11;
        exec(0x8125, &mut state);
        assert_eq!(state.v[0x1], 0x22);
        assert_eq!(state.v[0xF], 1);

        state.v[0x1] = 0x11;
        state.v[0x2] = 0x12;
        exec(0x8125, &mut state);
        assert_eq!(state.v[0x1], 0xFF);
        assert_eq!(state.v[0xF], 0);
    }

    #[test]
    fn test_8xy6_shifts_right_flagging_lsb() {
        let mut state = State::new();
        state.v[0x1] = 0b1010_0011;
        exec(0x8106, &mut state);
        assert_eq!(state.v[0x1], 0b0101_0001);
        assert_eq!(state.v[0xF], 1);

        state.v[0x1] = 0b0000_0100;
        exec(0x8106, &mut state);
        assert_eq!(state.v[0x1], 0b0000_0010);
        assert_eq!(state.v[0xF], 0);
    }

    #[test]
    fn test_8xy7_subtracts_reversed() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x33;
        exec(0x8127, &mut state);
        assert_eq!(state.v[0x1], 0x22);
        assert_eq!(state.v[0xF], 1);

        state.v[0x1] = 0x34;
        exec(0x8127, &mut state);
        assert_eq!(state.v[0x1], 0xFF);
        assert_eq!(state.v[0xF], 0);
    }

    #[test]
    fn test_8xye_shifts_left_flagging_msb_as_bit() {
        let mut state = State::new();
        state.v[0x1] = 0b1010_0011;
        exec(0x810E, &mut state);
        assert_eq!(state.v[0x1], 0b0100_0110);
        // The flag is the MSB as 0/1, not the raw masked byte.
        assert_eq!(state.v[0xF], 1);

        state.v[0x1] = 0b0000_0100;
        exec(0x810E, &mut state);
        assert_eq!(state.v[0x1], 0b0000_1000);
        assert_eq!(state.v[0xF], 0);
    }

    #[test]
    fn test_annn_loads_i() {
        let mut state = State::new();
        exec(0xAABC, &mut state);
        assert_eq!(state.i, 0xABC);
    }

    #[test]
    fn test_bnnn_jumps_offset_by_v0() {
        let mut state = State::new();
        state.v[0x0] = 0x2;
        exec(0xBABC, &mut state);
        assert_eq!(state.pc, 0xABE);
    }

    #[test]
    fn test_cxkk_masks_random_byte() {
        // kk = 0 forces the result to 0 whatever the random byte was.
        let mut state = State::new();
        state.v[0x1] = 0xAA;
        exec(0xC100, &mut state);
        assert_eq!(state.v[0x1], 0);
    }

    #[test]
    fn test_dxyn_draws_glyph_at_offset() {
        let mut state = State::new();
        let mut screen = FrameBuffer::new();
        state.v[0x0] = 0x1;
        // Five rows of the "0" glyph at I = 0, offset by (1, 1).
        exec_with(0xD005, &mut state, &mut screen, None);
        let pixels = screen.pixels();
        assert_eq!(pixels[1][1..5], [1, 1, 1, 1]);
        assert_eq!(pixels[2][1..5], [1, 0, 0, 1]);
        assert_eq!(pixels[3][1..5], [1, 0, 0, 1]);
        assert_eq!(pixels[4][1..5], [1, 0, 0, 1]);
        assert_eq!(pixels[5][1..5], [1, 1, 1, 1]);
        assert_eq!(state.v[0xF], 0);
    }

    #[test]
    fn test_dxyn_collision_on_second_draw() {
        let mut state = State::new();
        let mut screen = FrameBuffer::new();
        state.memory[0x300] = 0b1000_0000;
        state.i = 0x300;
        exec_with(0xD001, &mut state, &mut screen, None);
        assert_eq!(state.v[0xF], 0);
        exec_with(0xD001, &mut state, &mut screen, None);
        assert_eq!(state.v[0xF], 1);
        assert_eq!(screen.pixels()[0][0], 0);
        // I is never modified by a draw.
        assert_eq!(state.i, 0x300);
    }

    #[test]
    fn test_dxyn_wraps_columns() {
        let mut state = State::new();
        let mut screen = FrameBuffer::new();
        state.memory[0x300] = 0xFF;
        state.i = 0x300;
        state.v[0x1] = 60;
        exec_with(0xD101, &mut state, &mut screen, None);
        assert!(screen.pixels()[0][60..64].iter().all(|&p| p == 1));
        assert!(screen.pixels()[0][0..4].iter().all(|&p| p == 1));
    }

    #[test]
    fn test_dxyn_faults_past_end_of_memory() {
        let mut state = State::new();
        state.i = 0xFFF;
        let err = try_exec(0xD002, &mut state, &mut FrameBuffer::new(), None).unwrap_err();
        assert_eq!(err, Fault::OutOfBounds { addr: 0x1000 });
    }

    #[test]
    fn test_ex9e_skips_when_key_matches() {
        let mut state = State::new();
        state.v[0x1] = 0xE;
        exec_with(0xE19E, &mut state, &mut FrameBuffer::new(), Some(0xE));
        assert_eq!(state.pc, 0x204);
        exec_with(0xE19E, &mut state, &mut FrameBuffer::new(), None);
        assert_eq!(state.pc, 0x206);
    }

    #[test]
    fn test_exa1_skips_when_key_differs() {
        let mut state = State::new();
        state.v[0x1] = 0xE;
        exec_with(0xE1A1, &mut state, &mut FrameBuffer::new(), None);
        assert_eq!(state.pc, 0x204);
        exec_with(0xE1A1, &mut state, &mut FrameBuffer::new(), Some(0xE));
        assert_eq!(state.pc, 0x206);
    }

    #[test]
    fn test_fx07_reads_delay_timer() {
        let mut state = State::new();
        state.delay_timer = 0xF;
        exec(0xF107, &mut state);
        assert_eq!(state.v[0x1], 0xF);
    }

    #[test]
    fn test_fx0a_blocks_until_key_held() {
        let mut state = State::new();
        let step = exec_with(0xF10A, &mut state, &mut FrameBuffer::new(), None);
        assert_eq!(step, Step::Blocked);
        // PC rewound so the next fetch re-reads the same instruction.
        assert_eq!(state.pc, 0x200);

        let step = exec_with(0xF10A, &mut state, &mut FrameBuffer::new(), Some(0xB));
        assert_eq!(step, Step::Executed);
        assert_eq!(state.v[0x1], 0xB);
        assert_eq!(state.pc, 0x202);
    }

    #[test]
    fn test_fx15_fx18_write_timers() {
        let mut state = State::new();
        state.v[0x1] = 0x20;
        exec(0xF115, &mut state);
        assert_eq!(state.delay_timer, 0x20);
        exec(0xF118, &mut state);
        assert_eq!(state.sound_timer, 0x20);
    }

    #[test]
    fn test_fx1e_adds_to_i_with_carry_out_of_address_space() {
        let mut state = State::new();
        state.i = 0x100;
        state.v[0x1] = 0x1;
        state.v[0xF] = 1;
        exec(0xF11E, &mut state);
        assert_eq!(state.i, 0x101);
        assert_eq!(state.v[0xF], 0);

        state.i = 0xFFF;
        exec(0xF11E, &mut state);
        assert_eq!(state.i, 0x000);
        assert_eq!(state.v[0xF], 1);
    }

    #[test]
    fn test_fx29_points_i_at_glyph() {
        let mut state = State::new();
        state.v[0x1] = 0x2;
        exec(0xF129, &mut state);
        assert_eq!(state.i, 10);
        assert_eq!(state.memory[state.i as usize], 0xF0);
    }

    #[test]
    fn test_fx33_stores_decimal_digits() {
        let mut state = State::new();
        state.v[0x1] = 156;
        state.i = 0x300;
        exec(0xF133, &mut state);
        assert_eq!(state.memory[0x300..0x303], [1, 5, 6]);
    }

    #[test]
    fn test_fx33_faults_near_end_of_memory() {
        let mut state = State::new();
        state.i = 0xFFE;
        let err = try_exec(0xF133, &mut state, &mut FrameBuffer::new(), None).unwrap_err();
        assert_eq!(err, Fault::OutOfBounds { addr: 0x1000 });
    }

    #[test]
    fn test_fx55_stores_registers_inclusive() {
        let mut state = State::new();
        state.i = 0x300;
        state.v[..5].copy_from_slice(&[1, 2, 3, 4, 5]);
        exec(0xF455, &mut state);
        assert_eq!(state.memory[0x300..0x305], [1, 2, 3, 4, 5]);
        assert_eq!(state.i, 0x300);
    }

    #[test]
    fn test_fx65_loads_registers_inclusive() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300..0x305].copy_from_slice(&[1, 2, 3, 4, 5]);
        exec(0xF465, &mut state);
        assert_eq!(state.v[..5], [1, 2, 3, 4, 5]);
        assert_eq!(state.i, 0x300);
    }

    #[test]
    fn test_fx55_faults_past_end_of_memory() {
        let mut state = State::new();
        state.i = 0xFFD;
        let err = try_exec(0xF555, &mut state, &mut FrameBuffer::new(), None).unwrap_err();
        assert_eq!(err, Fault::OutOfBounds { addr: 0x1002 });
    }

    #[test]
    fn test_reserved_words_do_not_decode() {
        for &word in &[0x5121, 0x8FF8, 0x9AB5, 0xE19F, 0xF1FF, 0x0123] {
            assert!(decode(Opcode::new(word)).is_none(), "{:04X}", word);
        }
    }
}
