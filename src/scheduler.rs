use std::time::{Duration, Instant};

use crate::{
    display::Display,
    emulator::Emulator,
    keyboard::{Event, Input},
    sound::Sound,
};

/// How fast cycles are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockRate {
    /// As fast as the host allows.
    #[default]
    Unthrottled,
    /// A fixed number of cycles per second.
    Hz(u32),
}

impl ClockRate {
    fn period(self) -> Option<Duration> {
        match self {
            ClockRate::Unthrottled => None,
            ClockRate::Hz(0) => None,
            ClockRate::Hz(hz) => Some(Duration::from_secs(1) / hz),
        }
    }
}

/// Drives the machine: drain host events, run one cycle, repeat until the
/// host asks to quit.
pub struct Scheduler {
    clock: ClockRate,
    cycles: u64,
}

impl Scheduler {
    pub fn new(clock: ClockRate) -> Self {
        Self { clock, cycles: 0 }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Handles pending events, then executes one cycle at `now`. Returns
    /// false once a quit request has been seen; nothing after it is read.
    pub fn step<F, S>(
        &mut self,
        emu: &mut Emulator,
        frontend: &mut F,
        sound: &mut S,
        now: Instant,
    ) -> bool
    where
        F: Display + Input,
        S: Sound,
    {
        while let Some(event) = frontend.poll_event() {
            match event {
                Event::Quit => {
                    log::info!("quit requested after {} cycles", self.cycles);
                    sound.stop();
                    return false;
                }
                Event::KeyDown(key) => {
                    log::debug!("key down: {:x}", key);
                    emu.keys.press(key, now);
                }
            }
        }

        emu.cycle(frontend, sound, now);
        self.cycles += 1;
        true
    }

    pub fn run<F, S>(&mut self, emu: &mut Emulator, frontend: &mut F, sound: &mut S)
    where
        F: Display + Input,
        S: Sound,
    {
        let cycle_time = self.clock.period();
        loop {
            let started = Instant::now();
            if !self.step(emu, frontend, sound, started) {
                break;
            }

            // Handle timing
            if let Some(cycle_time) = cycle_time {
                let elapsed_cycle_time = started.elapsed();
                if cycle_time > elapsed_cycle_time {
                    std::thread::sleep(cycle_time - elapsed_cycle_time);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::FrameBuffer;
    use crate::sound::Mute;
    use crate::timer::TIMER_PERIOD;
    use std::collections::VecDeque;

    /// Replays queued events, then stays idle for `idle` polls before
    /// asking to quit. Each cycle consumes exactly one idle poll.
    struct Scripted {
        fb: FrameBuffer,
        events: VecDeque<Event>,
        idle: Option<usize>,
    }

    impl Scripted {
        fn new(events: &[Event]) -> Self {
            Self {
                fb: FrameBuffer::new(),
                events: events.iter().copied().collect(),
                idle: None,
            }
        }

        fn quit_after(mut self, cycles: usize) -> Self {
            self.idle = Some(cycles);
            self
        }
    }

    impl Display for Scripted {
        fn clear(&mut self) {
            self.fb.clear()
        }

        fn flip_pixel(&mut self, x: usize, y: usize) -> bool {
            self.fb.flip_pixel(x, y)
        }
    }

    impl Input for Scripted {
        fn poll_event(&mut self) -> Option<Event> {
            if let Some(event) = self.events.pop_front() {
                return Some(event);
            }
            match self.idle {
                Some(0) => Some(Event::Quit),
                Some(n) => {
                    self.idle = Some(n - 1);
                    None
                }
                None => None,
            }
        }
    }

    fn spin_rom() -> Emulator {
        let mut emu = Emulator::with_seed(0);
        // 1200: jump to self
        emu.mem.load_rom(&[0x12, 0x00]).unwrap();
        emu
    }

    #[test]
    fn quit_stops_before_cycling_and_leaves_later_events() {
        let mut emu = spin_rom();
        let mut frontend = Scripted::new(&[Event::Quit, Event::KeyDown(0x5)]);
        let mut scheduler = Scheduler::new(ClockRate::Unthrottled);

        scheduler.run(&mut emu, &mut frontend, &mut Mute);

        assert_eq!(scheduler.cycles(), 0);
        assert_eq!(frontend.events.len(), 1);
        assert!(!emu.keys.is_pressed());
    }

    #[test]
    fn run_cycles_until_quit() {
        let mut emu = spin_rom();
        let mut frontend = Scripted::new(&[]).quit_after(1000);
        let mut scheduler = Scheduler::new(ClockRate::default());

        scheduler.run(&mut emu, &mut frontend, &mut Mute);

        assert_eq!(scheduler.cycles(), 1000);
        assert_eq!(emu.mem.pc.0, 0x200);
    }

    #[test]
    fn key_down_is_latched_for_the_cycle() {
        let t0 = Instant::now();
        let mut emu = Emulator::with_seed(0);
        // F30A, then jump to self
        emu.mem.load_rom(&[0xF3, 0x0A, 0x12, 0x02]).unwrap();
        let mut frontend = Scripted::new(&[]);
        let mut scheduler = Scheduler::new(ClockRate::Unthrottled);

        assert!(scheduler.step(&mut emu, &mut frontend, &mut Mute, t0));
        assert_eq!(emu.mem.pc.0, 0x200);

        frontend.events.push_back(Event::KeyDown(0xB));
        assert!(scheduler.step(&mut emu, &mut frontend, &mut Mute, t0 + TIMER_PERIOD));
        assert_eq!(emu.regs.get(3), 0xB);
        assert_eq!(emu.mem.pc.0, 0x202);
        assert_eq!(scheduler.cycles(), 2);
    }

    #[test]
    fn latched_key_is_forgotten_after_window() {
        let t0 = Instant::now();
        let mut emu = spin_rom();
        let mut frontend = Scripted::new(&[Event::KeyDown(0x1)]);
        let mut scheduler = Scheduler::new(ClockRate::Unthrottled);

        scheduler.step(&mut emu, &mut frontend, &mut Mute, t0);
        assert_eq!(emu.keys.current(), Some(0x1));
        scheduler.step(&mut emu, &mut frontend, &mut Mute, t0 + TIMER_PERIOD / 2);
        assert_eq!(emu.keys.current(), Some(0x1));
        scheduler.step(
            &mut emu,
            &mut frontend,
            &mut Mute,
            t0 + TIMER_PERIOD + Duration::from_millis(1),
        );
        assert_eq!(emu.keys.current(), None);
    }

    #[test]
    fn throttled_clock_paces_cycles() {
        let mut emu = spin_rom();
        let mut frontend = Scripted::new(&[]).quit_after(3);
        let mut scheduler = Scheduler::new(ClockRate::Hz(100));

        let started = Instant::now();
        scheduler.run(&mut emu, &mut frontend, &mut Mute);

        assert_eq!(scheduler.cycles(), 3);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn clock_periods() {
        assert_eq!(ClockRate::Unthrottled.period(), None);
        assert_eq!(ClockRate::Hz(0).period(), None);
        assert_eq!(ClockRate::Hz(500).period(), Some(Duration::from_millis(2)));
    }
}
