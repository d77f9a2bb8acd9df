use std::{fs, path::Path};

use crate::{
    error::{Error, Result},
    registers::{IndexRegister, ProgramCounter},
};

pub type TypeAddr = u16; // in reality u12

pub const MEMORY_SIZE: usize = 4096;
pub const ADDR_MASK: TypeAddr = 0x0FFF;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const FONT_OFFSET: TypeAddr = 0x050;
pub const GLYPH_HEIGHT: u8 = 5;
pub const STACK_DEPTH: usize = 16;

type FontBytes = [u8; 5 * 16];

const DEFAULT_FONT: FontBytes = [
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

/// 4k of byte-addressed memory plus the pointer registers that walk it.
///
/// Font glyphs sit at 0x050..0x0A0 and programs are loaded at 0x200. Every
/// address is masked to 12 bits, so a runaway pc or index register wraps
/// around instead of faulting.
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let start = FONT_OFFSET as usize;
        bytes[start..start + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);

        Self {
            bytes,
            pc: ProgramCounter(PROGRAM_START),
            index: IndexRegister(0x0),
            stack: Stack::new(),
        }
    }

    pub fn set(&mut self, addr: TypeAddr, val: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = val;
    }

    pub fn get(&self, addr: TypeAddr) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    pub fn increment_pc(&mut self) {
        self.pc.increment();
    }

    /// Reads the big-endian word at pc and steps past it.
    pub fn next_instruction(&mut self) -> (u8, u8) {
        let addr = self.pc.0;
        let word = (self.get(addr), self.get(addr.wrapping_add(1)));
        self.increment_pc();
        word
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    /// Copies a program verbatim to 0x200.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        let start = PROGRAM_START as usize;
        let max_size = MEMORY_SIZE - start;
        if bytes.len() > max_size {
            return Err(Error::RomTooLarge {
                size: bytes.len(),
                max_size,
            });
        }
        self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn load_rom_by_file(&mut self, path: &Path) -> Result<usize> {
        let program = fs::read(path).map_err(|source| Error::RomRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_rom(&program)?;
        Ok(program.len())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Return addresses for 2NNN/00EE, bounded at `STACK_DEPTH`.
pub struct Stack {
    addresses: Vec<TypeAddr>,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: Vec::with_capacity(STACK_DEPTH),
        }
    }

    /// Returns false when the stack is already full.
    pub fn push(&mut self, addr: TypeAddr) -> bool {
        if self.addresses.len() >= STACK_DEPTH {
            return false;
        }
        self.addresses.push(addr);
        true
    }

    pub fn pop(&mut self) -> Option<TypeAddr> {
        self.addresses.pop()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
