use log::{debug, warn};

use crate::bus::{Buzzer, Keypad, Peripherals, Screen};
use crate::constants::{LOAD_OFFSET, MEMORY_SIZE};
use crate::error::Fault;
use crate::instruction;
use crate::opcode::Opcode;
use crate::state::State;

/// Outcome of a single fetch-decode-execute cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// An instruction executed normally.
    Executed,
    /// `Fx0A` found no key held. PC was rewound, so the next step
    /// re-fetches the same instruction; the driver should keep calling
    /// `tick_60hz()` but need not burn dispatch cycles until a key
    /// arrives.
    Blocked,
    /// The fetched word matched no opcode. Logged and skipped; PC has
    /// already moved past it.
    Unknown(u16),
}

/// # Machine
/// The interpreter core: owns all machine state and runs on two
/// independent clocks supplied by the driver.
///
/// - `step()` performs one fetch-decode-execute cycle at whatever rate
///   the driver dispatches.
/// - `tick_60hz()` counts the delay and sound timers down at a fixed
///   60 Hz and gates the tone.
///
/// Both mutate the same state and must be serialized by the caller; the
/// core takes no locks. Fatal faults come back as [`Fault`]; after one,
/// the driver must stop stepping.
pub struct Machine {
    state: State,
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            state: State::new(),
        }
    }

    /// Reinitializes every piece of core state (memory, registers, stack,
    /// timers, font table, PC) and clears the screen.
    pub fn reset(&mut self, screen: &mut dyn Screen) {
        self.state = State::new();
        screen.clear();
        debug!("machine reset, pc at {:#05x}", self.state.pc);
    }

    /// Resets, then copies a program image in at the load offset.
    ///
    /// All-or-nothing: an image larger than the space above the load
    /// offset is rejected before any state is touched.
    pub fn load(&mut self, image: &[u8], screen: &mut dyn Screen) -> Result<(), Fault> {
        let max = MEMORY_SIZE - LOAD_OFFSET;
        if image.len() > max {
            return Err(Fault::ProgramTooLarge {
                len: image.len(),
                max,
            });
        }
        self.reset(screen);
        self.state.memory[LOAD_OFFSET..LOAD_OFFSET + image.len()].copy_from_slice(image);
        debug!("loaded {} byte program image", image.len());
        Ok(())
    }

    /// One fetch-decode-execute cycle.
    ///
    /// Fetches the big-endian word at PC, advances PC by 2, then decodes
    /// and executes. Branching opcodes assign PC absolutely on top of the
    /// pre-advance; skip opcodes add a further 2.
    pub fn step(&mut self, screen: &mut dyn Screen, keypad: &dyn Keypad) -> Result<Step, Fault> {
        let op = Opcode::new(self.fetch()?);
        self.state.pc += 2;
        match instruction::decode(op) {
            Some(execute) => execute(op, &mut self.state, &mut Peripherals { screen, keypad }),
            None => {
                warn!(
                    "unknown instruction {:04X} at {:#05x}",
                    op.word(),
                    self.state.pc - 2
                );
                Ok(Step::Unknown(op.word()))
            }
        }
    }

    /// Fixed 60 Hz tick: counts both timers down and gates the tone on
    /// the sound timer. Must run at wall-clock rate regardless of how
    /// fast `step()` is being called.
    pub fn tick_60hz(&mut self, buzzer: &mut dyn Buzzer) {
        if self.state.delay_timer > 0 {
            self.state.delay_timer -= 1;
        }
        if self.state.sound_timer > 0 {
            self.state.sound_timer -= 1;
        }
        if self.state.sound_timer > 0 {
            buzzer.start_tone();
        } else {
            buzzer.stop_tone();
        }
    }

    fn fetch(&self) -> Result<u16, Fault> {
        let pc = self.state.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Fault::OutOfBounds { addr: pc });
        }
        Ok(u16::from_be_bytes([
            self.state.memory[pc],
            self.state.memory[pc + 1],
        ]))
    }

    // Observational accessors for overlays and debugging. Opcode
    // semantics never go through these.

    pub fn registers(&self) -> &[u8; 16] {
        &self.state.v
    }

    pub fn i(&self) -> u16 {
        self.state.i
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    /// The live portion of the call stack, oldest return address first.
    pub fn stack(&self) -> &[u16] {
        &self.state.stack[..self.state.sp as usize]
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
