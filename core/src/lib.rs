//! # vip8-core
//! An interpreter for the CHIP-8 fantasy architecture: 4096 bytes of
//! memory, sixteen 8-bit registers, a 16-slot call stack, two 60 Hz
//! countdown timers, and a 64x32 monochrome frame.
//!
//! The crate owns no window, keyboard, or audio device. Those are seams:
//! a driver hands a [`Screen`], [`Keypad`], and [`Buzzer`] to the
//! [`Machine`] and pumps it with `step()` at its chosen dispatch rate and
//! `tick_60hz()` at a fixed 60 Hz.

pub use crate::bus::{Buzzer, Keypad, Screen};
pub use crate::error::Fault;
pub use crate::frame::{FrameBuffer, Pixels};
pub use crate::machine::{Machine, Step};

mod bus;
pub mod constants;
mod error;
mod frame;
mod instruction;
mod machine;
mod opcode;
mod operations;
mod state;
