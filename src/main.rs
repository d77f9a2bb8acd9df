use clap::Parser;

use chipvm::{
    display::Screen,
    sound::{Beeper, Mute},
    Config, Emulator, Scheduler,
};

// CPU: unthrottled unless --clock-hz is given
// Display: 60 times per second
// Timer: 60 times per second

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    if let Err(e) = run(&config) {
        eprintln!("chipvm: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> chipvm::Result<()> {
    let mut emu = match config.seed {
        Some(seed) => Emulator::with_seed(seed),
        None => Emulator::new(),
    };
    let size = emu.mem.load_rom_by_file(&config.rom)?;
    log::info!("loaded {} ({} bytes)", config.rom.display(), size);

    let mut screen = Screen::new("chipvm - ESC to exit")?;
    let mut scheduler = Scheduler::new(config.clock_rate());

    if config.mute {
        scheduler.run(&mut emu, &mut screen, &mut Mute);
    } else {
        let mut beeper = Beeper::new()?;
        scheduler.run(&mut emu, &mut screen, &mut beeper);
    }
    Ok(())
}
