use std::path::PathBuf;

use clap::Parser;

use crate::scheduler::ClockRate;

/// Command line options.
#[derive(Parser, Debug)]
#[command(version, about = "Run a CHIP-8 program", long_about = None)]
pub struct Config {
    /// Path to the program to load at 0x200
    #[arg(value_name = "ROM")]
    pub rom: PathBuf,

    /// Cycles per second; runs unthrottled when omitted
    #[arg(long, value_name = "N")]
    pub clock_hz: Option<u32>,

    /// Don't open an audio device
    #[arg(long)]
    pub mute: bool,

    /// Seed for CXNN; entropy-seeded when omitted
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

impl Config {
    pub fn clock_rate(&self) -> ClockRate {
        self.clock_hz.map_or(ClockRate::Unthrottled, ClockRate::Hz)
    }
}
