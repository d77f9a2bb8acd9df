use crate::memory::TypeAddr;

/// One fetched 2-byte word split into its nibbles.
///
/// ```text
///  b1          b2
/// [upper_b1 | lower_b1 | upper_b2 | lower_b2]
///   family      X          Y         N
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub upper_b1: u8,
    pub lower_b1: u8,
    pub upper_b2: u8,
    pub lower_b2: u8,
    pub b2: u8,
}

impl Instruction {
    pub fn new(b1: u8, b2: u8) -> Self {
        Self {
            upper_b1: (b1 & 0xF0) >> 4,
            lower_b1: b1 & 0x0F,
            upper_b2: (b2 & 0xF0) >> 4,
            lower_b2: b2 & 0x0F,
            b2,
        }
    }

    pub fn from_code(code: u16) -> Self {
        Self::new((code >> 8) as u8, code as u8)
    }

    // NNN
    pub fn address(&self) -> TypeAddr {
        ((self.lower_b1 as u16) << 8) | self.b2 as u16
    }

    pub fn code(&self) -> u16 {
        ((self.upper_b1 as u16) << 12) | self.address()
    }

    pub fn nibbles(&self) -> (u8, u8, u8, u8) {
        (self.upper_b1, self.lower_b1, self.upper_b2, self.lower_b2)
    }
}

impl PartialEq<u16> for Instruction {
    fn eq(&self, ins: &u16) -> bool {
        ins.eq(&self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCodes {
    // 00E0
    // turn all pixels to 0
    ClearScreen,
    // 00EE
    PopSubroutine,
    // 1NNN
    // set PC to address NNN, "jump" to memory location
    Jump(TypeAddr),
    // 2NNN
    PushSubroutine(TypeAddr),

    // 3XNN
    SkipEqualConstant(u8, u8),
    // 4XNN
    SkipNotEqualConstant(u8, u8),
    // 5XY_
    SkipEqualRegister(u8, u8),
    // 9XY_
    SkipNotEqualRegister(u8, u8),

    // 6XNN
    SetRegister(u8, u8),
    // 7XNN
    AddToRegister(u8, u8),

    // 8XY0
    CopyRegister(u8, u8),
    // 8XY1
    Or(u8, u8),
    // 8XY2
    And(u8, u8),
    // 8XY3
    XOr(u8, u8),
    /// 8XY4
    Add(u8, u8),
    // 8XY5
    SubtractForward(u8, u8),
    // 8XY7
    SubtractBackward(u8, u8),
    // 8XY6
    RightShift(u8),
    // 8XYE
    LeftShift(u8),

    // ANNN
    SetIndexRegister(TypeAddr),
    // BNNN
    JumpWithOffset(TypeAddr),
    // CXNN
    Random(u8, u8),
    // DXYN
    // draw an N pixel tall sprite starting at I at (VX, VY)
    Display(u8, u8, u8),

    // EX9E
    SkipIfPressed(u8),
    // EXA1
    SkipIfNotPressed(u8),

    // FX07
    CopyDelayToRegister(u8),
    // FX0A
    GetKey(u8),
    // FX15
    CopyRegisterToDelay(u8),
    // FX18
    CopyRegisterToSound(u8),
    // FX1E
    AddToIndex(u8),
    // FX29
    PointChar(u8),
    // FX33
    ToDecimal(u8),
    // FX55
    StoreRegisterToMemory(u8),
    // FX65
    LoadRegisterFromMemory(u8),

    /// Anything else, kept around so it can be reported.
    Unknown(u16),
}

impl OpCodes {
    /// Classifies a word purely from its four nibbles.
    ///
    /// The top nibble picks the family. Families 0x0, 0x8, 0xE and 0xF then
    /// need an exact sub-opcode match in the low byte, otherwise the word is
    /// `Unknown`.
    pub fn decode(ins: &Instruction) -> Self {
        let (x, y, n, nn) = (ins.lower_b1, ins.upper_b2, ins.lower_b2, ins.b2);

        match ins.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Self::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Self::PopSubroutine,
            (0x1, ..) => Self::Jump(ins.address()),
            (0x2, ..) => Self::PushSubroutine(ins.address()),
            (0x3, ..) => Self::SkipEqualConstant(x, nn),
            (0x4, ..) => Self::SkipNotEqualConstant(x, nn),
            (0x5, ..) => Self::SkipEqualRegister(x, y),
            (0x6, ..) => Self::SetRegister(x, nn),
            (0x7, ..) => Self::AddToRegister(x, nn),
            (0x8, .., 0x0) => Self::CopyRegister(x, y),
            (0x8, .., 0x1) => Self::Or(x, y),
            (0x8, .., 0x2) => Self::And(x, y),
            (0x8, .., 0x3) => Self::XOr(x, y),
            (0x8, .., 0x4) => Self::Add(x, y),
            (0x8, .., 0x5) => Self::SubtractForward(x, y),
            (0x8, .., 0x6) => Self::RightShift(x),
            (0x8, .., 0x7) => Self::SubtractBackward(x, y),
            (0x8, .., 0xE) => Self::LeftShift(x),
            (0x9, ..) => Self::SkipNotEqualRegister(x, y),
            (0xA, ..) => Self::SetIndexRegister(ins.address()),
            (0xB, ..) => Self::JumpWithOffset(ins.address()),
            (0xC, ..) => Self::Random(x, nn),
            (0xD, ..) => Self::Display(x, y, n),
            (0xE, _, 0x9, 0xE) => Self::SkipIfPressed(x),
            (0xE, _, 0xA, 0x1) => Self::SkipIfNotPressed(x),
            (0xF, _, 0x0, 0x7) => Self::CopyDelayToRegister(x),
            (0xF, _, 0x0, 0xA) => Self::GetKey(x),
            (0xF, _, 0x1, 0x5) => Self::CopyRegisterToDelay(x),
            (0xF, _, 0x1, 0x8) => Self::CopyRegisterToSound(x),
            (0xF, _, 0x1, 0xE) => Self::AddToIndex(x),
            (0xF, _, 0x2, 0x9) => Self::PointChar(x),
            (0xF, _, 0x3, 0x3) => Self::ToDecimal(x),
            (0xF, _, 0x5, 0x5) => Self::StoreRegisterToMemory(x),
            (0xF, _, 0x6, 0x5) => Self::LoadRegisterFromMemory(x),
            _ => Self::Unknown(ins.code()),
        }
    }

    pub fn decode_raw(code: u16) -> Self {
        Self::decode(&Instruction::from_code(code))
    }
}
