/// A fetched 16-bit instruction word.
///
/// The top nibble selects an opcode family; the remaining nibbles carry
/// operands at fixed positions:
/// - `[_x__]` the Vx register index
/// - `[__y_]` the Vy register index
/// - `[___n]` a 4-bit immediate (sprite height)
/// - `[__kk]` an 8-bit immediate
/// - `[_nnn]` a 12-bit address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Opcode(u16);

impl Opcode {
    pub fn new(word: u16) -> Self {
        Opcode(word)
    }

    pub fn word(self) -> u16 {
        self.0
    }

    /// All four nibbles, most significant first. Decode matches on this.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 & 0xF000) >> 12) as u8,
            self.x(),
            self.y(),
            self.n(),
        )
    }

    pub fn x(self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    pub fn y(self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }

    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    pub fn addr(self) -> u16 {
        self.0 & 0x0FFF
    }
}
