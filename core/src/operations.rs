//! One handler per opcode.
//!
//! Every handler runs after the machine has already advanced PC past the
//! instruction word. Jumps and calls therefore assign PC absolutely, and
//! a skip is a further `pc += 2` on top of the pre-advance. All 8-bit
//! arithmetic wraps modulo 256, and every flag-defining opcode rewrites
//! VF even when no carry/borrow/collision occurred.

use std::ops::Range;

use crate::bus::Peripherals;
use crate::constants::{FONT_BASE, GLYPH_BYTES, MEMORY_SIZE};
use crate::error::Fault;
use crate::machine::Step;
use crate::opcode::Opcode;
use crate::state::State;

/// Bounds-check a memory span computed from the I register. Out-of-range
/// access faults rather than wrapping.
fn span(start: u16, len: usize) -> Result<Range<usize>, Fault> {
    let start = start as usize;
    let end = start + len;
    if end > MEMORY_SIZE {
        Err(Fault::OutOfBounds { addr: end - 1 })
    } else {
        Ok(start..end)
    }
}

fn skip_if(state: &mut State, cond: bool) {
    if cond {
        state.pc += 2;
    }
}

/// `00E0` — clear the screen.
pub(crate) fn cls(_op: Opcode, _state: &mut State, bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    bus.screen.clear();
    Ok(Step::Executed)
}

/// `00EE` — pop the call stack into PC.
pub(crate) fn ret(_op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    if state.sp == 0 {
        return Err(Fault::StackUnderflow { pc: state.pc - 2 });
    }
    state.sp -= 1;
    state.pc = state.stack[state.sp as usize];
    Ok(Step::Executed)
}

/// `1nnn` — PC = nnn.
pub(crate) fn jp(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.pc = op.addr();
    Ok(Step::Executed)
}

/// `2nnn` — push the return address, PC = nnn.
pub(crate) fn call(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    if state.sp as usize == state.stack.len() {
        return Err(Fault::StackOverflow { pc: state.pc - 2 });
    }
    state.stack[state.sp as usize] = state.pc;
    state.sp += 1;
    state.pc = op.addr();
    Ok(Step::Executed)
}

/// `3xkk` — skip if Vx == kk.
pub(crate) fn se_byte(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    skip_if(state, state.v[op.x() as usize] == op.kk());
    Ok(Step::Executed)
}

/// `4xkk` — skip if Vx != kk.
pub(crate) fn sne_byte(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    skip_if(state, state.v[op.x() as usize] != op.kk());
    Ok(Step::Executed)
}

/// `5xy0` — skip if Vx == Vy.
pub(crate) fn se_reg(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    skip_if(state, state.v[op.x() as usize] == state.v[op.y() as usize]);
    Ok(Step::Executed)
}

/// `6xkk` — Vx = kk.
pub(crate) fn ld_byte(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.v[op.x() as usize] = op.kk();
    Ok(Step::Executed)
}

/// `7xkk` — Vx += kk, wrapping, flag untouched.
pub(crate) fn add_byte(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let x = op.x() as usize;
    state.v[x] = state.v[x].wrapping_add(op.kk());
    Ok(Step::Executed)
}

/// `8xy0` — Vx = Vy.
pub(crate) fn ld_reg(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.v[op.x() as usize] = state.v[op.y() as usize];
    Ok(Step::Executed)
}

/// `8xy1` — Vx |= Vy.
pub(crate) fn or(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.v[op.x() as usize] |= state.v[op.y() as usize];
    Ok(Step::Executed)
}

/// `8xy2` — Vx &= Vy.
pub(crate) fn and(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.v[op.x() as usize] &= state.v[op.y() as usize];
    Ok(Step::Executed)
}

/// `8xy3` — Vx ^= Vy.
pub(crate) fn xor(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.v[op.x() as usize] ^= state.v[op.y() as usize];
    Ok(Step::Executed)
}

/// `8xy4` — Vx += Vy; VF = 1 on carry, else 0.
pub(crate) fn add_reg(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let x = op.x() as usize;
    let (sum, carry) = state.v[x].overflowing_add(state.v[op.y() as usize]);
    state.v[x] = sum;
    state.v[0xF] = carry as u8;
    Ok(Step::Executed)
}

/// `8xy5` — Vx -= Vy; VF = 0 on borrow, else 1.
pub(crate) fn sub(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let x = op.x() as usize;
    let (diff, borrow) = state.v[x].overflowing_sub(state.v[op.y() as usize]);
    state.v[x] = diff;
    state.v[0xF] = !borrow as u8;
    Ok(Step::Executed)
}

/// `8xy6` — VF = pre-shift LSB of Vx; Vx >>= 1.
pub(crate) fn shr(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let x = op.x() as usize;
    let vx = state.v[x];
    state.v[x] = vx >> 1;
    state.v[0xF] = vx & 0x1;
    Ok(Step::Executed)
}

/// `8xy7` — Vx = Vy - Vx; VF = 0 on borrow, else 1.
pub(crate) fn subn(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let x = op.x() as usize;
    let (diff, borrow) = state.v[op.y() as usize].overflowing_sub(state.v[x]);
    state.v[x] = diff;
    state.v[0xF] = !borrow as u8;
    Ok(Step::Executed)
}

/// `8xyE` — VF = pre-shift MSB of Vx as 0/1; Vx <<= 1, wrapping.
pub(crate) fn shl(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let x = op.x() as usize;
    let vx = state.v[x];
    state.v[x] = vx << 1;
    state.v[0xF] = vx >> 7;
    Ok(Step::Executed)
}

/// `9xy0` — skip if Vx != Vy.
pub(crate) fn sne_reg(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    skip_if(state, state.v[op.x() as usize] != state.v[op.y() as usize]);
    Ok(Step::Executed)
}

/// `Annn` — I = nnn.
pub(crate) fn ld_i(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.i = op.addr();
    Ok(Step::Executed)
}

/// `Bnnn` — PC = nnn + V0.
pub(crate) fn jp_v0(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.pc = op.addr() + u16::from(state.v[0x0]);
    Ok(Step::Executed)
}

/// `Cxkk` — Vx = random byte AND kk.
pub(crate) fn rnd(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let byte: u8 = rand::random();
    state.v[op.x() as usize] = byte & op.kk();
    Ok(Step::Executed)
}

/// `Dxyn` — XOR-blit n sprite rows from memory[I..] at (Vx, Vy);
/// VF = collision. I is never modified.
pub(crate) fn drw(op: Opcode, state: &mut State, bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let rows = span(state.i, op.n() as usize)?;
    let collided = bus.screen.draw_sprite(
        &state.memory[rows],
        state.v[op.x() as usize],
        state.v[op.y() as usize],
    );
    state.v[0xF] = collided as u8;
    Ok(Step::Executed)
}

/// `Ex9E` — skip if the held key equals Vx.
pub(crate) fn skp(op: Opcode, state: &mut State, bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let held = bus.keypad.current_key();
    skip_if(state, held == Some(state.v[op.x() as usize]));
    Ok(Step::Executed)
}

/// `ExA1` — skip unless the held key equals Vx.
pub(crate) fn sknp(op: Opcode, state: &mut State, bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let held = bus.keypad.current_key();
    skip_if(state, held != Some(state.v[op.x() as usize]));
    Ok(Step::Executed)
}

/// `Fx07` — Vx = delay timer.
pub(crate) fn ld_from_dt(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.v[op.x() as usize] = state.delay_timer;
    Ok(Step::Executed)
}

/// `Fx0A` — wait for a key, then Vx = that key.
///
/// With no key held, PC rewinds over the instruction and the step reports
/// [`Step::Blocked`] so the driver can stop burning dispatch cycles while
/// the timers keep ticking. The next step re-fetches this instruction.
pub(crate) fn ld_key(op: Opcode, state: &mut State, bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    match bus.keypad.current_key() {
        Some(key) => {
            state.v[op.x() as usize] = key;
            Ok(Step::Executed)
        }
        None => {
            state.pc -= 2;
            Ok(Step::Blocked)
        }
    }
}

/// `Fx15` — delay timer = Vx.
pub(crate) fn ld_dt(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.delay_timer = state.v[op.x() as usize];
    Ok(Step::Executed)
}

/// `Fx18` — sound timer = Vx.
pub(crate) fn ld_st(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    state.sound_timer = state.v[op.x() as usize];
    Ok(Step::Executed)
}

/// `Fx1E` — I += Vx; VF = 1 if the sum left the address space, and I
/// wraps back into it.
pub(crate) fn add_i(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let sum = u32::from(state.i) + u32::from(state.v[op.x() as usize]);
    state.v[0xF] = (sum > 0xFFF) as u8;
    state.i = (sum & 0xFFF) as u16;
    Ok(Step::Executed)
}

/// `Fx29` — I = address of the font glyph for Vx.
pub(crate) fn ld_font(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let glyph = state.v[op.x() as usize] as usize;
    state.i = (FONT_BASE + glyph * GLYPH_BYTES) as u16;
    Ok(Step::Executed)
}

/// `Fx33` — memory[I..I+3] = decimal digits of Vx, most significant
/// first.
pub(crate) fn bcd(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let vx = state.v[op.x() as usize];
    let digits = [vx / 100, vx / 10 % 10, vx % 10];
    let dst = span(state.i, digits.len())?;
    state.memory[dst].copy_from_slice(&digits);
    Ok(Step::Executed)
}

/// `Fx55` — memory[I..=I+x] = V0..=Vx. I is left unmodified.
pub(crate) fn store_regs(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let last = op.x() as usize;
    let dst = span(state.i, last + 1)?;
    state.memory[dst].copy_from_slice(&state.v[..=last]);
    Ok(Step::Executed)
}

/// `Fx65` — V0..=Vx = memory[I..=I+x]. I is left unmodified.
pub(crate) fn load_regs(op: Opcode, state: &mut State, _bus: &mut Peripherals<'_>) -> Result<Step, Fault> {
    let last = op.x() as usize;
    let src = span(state.i, last + 1)?;
    state.v[..=last].copy_from_slice(&state.memory[src]);
    Ok(Step::Executed)
}
