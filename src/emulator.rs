use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    decode::{Instruction, OpCodes},
    display::{Display, HEIGHT, WIDTH},
    keyboard::KeyLatch,
    memory::{Memory, ADDR_MASK, FONT_OFFSET, GLYPH_HEIGHT},
    registers::{Registers, FLAG},
    sound::Sound,
    timer::Timer,
};

/// How an executed instruction wants the scheduler to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Completed,
    /// Run the same instruction again next cycle (FX0A with no key held).
    Retry,
}

/// Everything the program can see: memory, registers, timers and the
/// currently latched key. Display and sound are borrowed per call.
pub struct Emulator {
    pub regs: Registers,
    pub mem: Memory,
    pub delay_timer: Timer,
    pub sound_timer: Timer,
    pub keys: KeyLatch,
    rng: StdRng,
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let now = Instant::now();
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            delay_timer: Timer::new(0, now),
            sound_timer: Timer::new(0, now),
            keys: KeyLatch::new(),
            rng,
        }
    }

    pub fn fetch_decode(&mut self) -> OpCodes {
        let (b1, b2) = self.mem.next_instruction();
        OpCodes::decode(&Instruction::new(b1, b2))
    }

    /// One full fetch, decode, execute pass followed by timer and key
    /// housekeeping at `now`.
    pub fn cycle(
        &mut self,
        display: &mut impl Display,
        sound: &mut impl Sound,
        now: Instant,
    ) -> Step {
        let start = self.mem.pc.0;
        let operation = self.fetch_decode();
        log::trace!("{:03x}: {:?}", start, operation);

        let step = self.execute_ins(operation, display, now);
        if step == Step::Retry {
            self.mem.set_pc(start);
        }

        self.sync_timers(sound, now);
        self.keys.expire(now);
        step
    }

    pub fn execute_ins(
        &mut self,
        ins: OpCodes,
        display: &mut impl Display,
        now: Instant,
    ) -> Step {
        match ins {
            OpCodes::ClearScreen => display.clear(),
            OpCodes::PopSubroutine => match self.mem.stack.pop() {
                Some(addr) => self.mem.set_pc(addr),
                None => log::debug!("return with empty call stack ignored"),
            },
            OpCodes::Jump(addr) => self.mem.set_pc(addr),
            OpCodes::PushSubroutine(addr) => {
                // store the already advanced pc to come back to
                if self.mem.stack.push(self.mem.pc.0) {
                    self.mem.set_pc(addr);
                } else {
                    log::warn!("call stack full, call to {:03x} ignored", addr);
                }
            }
            OpCodes::SkipEqualConstant(vx, nn) => {
                if self.regs.get(vx) == nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualConstant(vx, nn) => {
                if self.regs.get(vx) != nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SetRegister(vx, nn) => self.regs.set_register(vx, nn),
            OpCodes::AddToRegister(vx, nn) => self.regs.add_to_register(vx, nn),
            OpCodes::CopyRegister(vx, vy) => self.regs.set_register(vx, self.regs.get(vy)),
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            // Flag goes in first, result second: with X = F the result wins.
            OpCodes::Add(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let (z, carry) = x.overflowing_add(y);
                self.regs.set_flag(carry);
                self.regs.set_register(vx, z);
            }
            OpCodes::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_flag(x > y);
                self.regs.set_register(vx, x.wrapping_sub(y));
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_flag(y > x);
                self.regs.set_register(vx, y.wrapping_sub(x));
            }
            OpCodes::RightShift(vx) => {
                let vx_value = self.regs.get(vx);
                self.regs.set_register(FLAG, vx_value & 1);
                self.regs.set_register(vx, vx_value >> 1);
            }
            OpCodes::LeftShift(vx) => {
                let vx_value = self.regs.get(vx);
                self.regs.set_register(FLAG, (vx_value >> 7) & 1);
                self.regs.set_register(vx, vx_value << 1);
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::JumpWithOffset(addr) => {
                self.mem.set_pc(addr + self.regs.get(0) as u16);
            }
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, ransuu & nn);
            }
            OpCodes::Display(vx, vy, height) => self.draw(vx, vy, height, display),
            OpCodes::SkipIfPressed(vx) => {
                if self.keys.current() == Some(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipIfNotPressed(vx) => {
                // no key at all counts as "not equal"
                if self.keys.current() != Some(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::CopyDelayToRegister(vx) => self.regs.set_register(vx, self.delay_timer.count),
            OpCodes::GetKey(vx) => match self.keys.current() {
                Some(key) => self.regs.set_register(vx, key),
                None => return Step::Retry,
            },
            OpCodes::CopyRegisterToDelay(vx) => self.delay_timer.set(self.regs.get(vx), now),
            OpCodes::CopyRegisterToSound(vx) => self.sound_timer.set(self.regs.get(vx), now),
            OpCodes::AddToIndex(vx) => {
                let sum = self.mem.index.0 + self.regs.get(vx) as u16;
                self.regs.set_flag(sum > ADDR_MASK);
                self.mem.set_index(sum);
            }
            OpCodes::PointChar(vx) => {
                let char = (self.regs.get(vx) & 0x0F) as u16;
                self.mem.set_index(char * GLYPH_HEIGHT as u16 + FONT_OFFSET);
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let index = self.mem.index.0;
                self.mem.set(index, value / 100);
                self.mem.set(index + 1, (value / 10) % 10);
                self.mem.set(index + 2, value % 10);
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                for reg in 0..=vx {
                    self.mem.set(self.mem.index.0 + reg as u16, self.regs.get(reg));
                }
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                for reg in 0..=vx {
                    let reg_val = self.mem.get(self.mem.index.0 + reg as u16);
                    self.regs.set_register(reg, reg_val);
                }
            }
            OpCodes::Unknown(code) => {
                log::warn!(
                    "unknown instruction {:04x} at {:03x}",
                    code,
                    self.mem.pc.0.wrapping_sub(2) & ADDR_MASK
                );
            }
        }
        Step::Completed
    }

    // DXYN: rows of 8 cells, MSB first, clipped at the right and bottom edges.
    fn draw(&mut self, vx: u8, vy: u8, height: u8, display: &mut impl Display) {
        let x = self.regs.get(vx) as usize % WIDTH;
        let mut y = self.regs.get(vy) as usize % HEIGHT;
        let index = self.mem.index.0;

        self.regs.set_flag(false);
        for row in 0..height as u16 {
            let sprite = self.mem.get(index + row);
            for i in 0..8 {
                if (sprite >> (7 - i)) & 1 == 0 {
                    continue;
                }
                if x + i >= WIDTH {
                    break;
                }
                if display.flip_pixel(x + i, y) {
                    self.regs.set_flag(true);
                }
            }
            y += 1;
            if y >= HEIGHT {
                break;
            }
        }
    }

    pub fn sync_timers(&mut self, sound: &mut impl Sound, now: Instant) {
        self.delay_timer.sync(now);

        if self.sound_timer.is_active() {
            sound.play();
            self.sound_timer.sync(now);
        } else {
            sound.stop();
        }
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
