// 16 8-bit data registers named V0 to VF, VF doubles as the flag
// I -> address register (12 bits)
//
// Delay timer & Sound timer: Count down at 60 times / s until 0
// Beep when sound timer is non-zero
//
// Display res: 64 width, 32 height
//
// 2-byte big-endian opcodes
//      NNN: address
//      NN: 8-bit constant
//      N: 4-bit constant
//      X and Y: 4-bit register identifier

pub mod config;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod scheduler;
pub mod sound;
pub mod timer;

pub use config::Config;
pub use emulator::{Emulator, Step};
pub use error::{Error, Result};
pub use scheduler::{ClockRate, Scheduler};
