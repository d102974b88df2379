use thiserror::Error;

/// Fatal execution faults. Once `step()` or `load()` returns one of
/// these the driver must stop dispatching; the core does not try to
/// recover. An unrecognized instruction word is deliberately not a fault
/// (see [`Step::Unknown`](crate::Step::Unknown)).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Fault {
    /// `2nnn` with the call stack already at capacity.
    #[error("call stack overflow at {pc:#05x}")]
    StackOverflow { pc: u16 },

    /// `00EE` with nothing to return to.
    #[error("return with an empty call stack at {pc:#05x}")]
    StackUnderflow { pc: u16 },

    /// A computed address fell outside the 4096-byte address space.
    /// Silent wraparound would mask program bugs, so this halts instead.
    #[error("memory access out of bounds at {addr:#05x}")]
    OutOfBounds { addr: usize },

    /// The program image does not fit between the load offset and the
    /// end of memory. Nothing was copied.
    #[error("program image is {len} bytes but at most {max} fit")]
    ProgramTooLarge { len: usize, max: usize },
}
