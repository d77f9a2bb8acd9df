use std::time::{Duration, Instant};

use minifb::Key;

/// How long a key-down stays visible to the program.
pub const DEBOUNCE_WINDOW: Duration = crate::timer::TIMER_PERIOD;

/// Something the host asked of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Quit,
    /// A logical keypad key, 0x0..=0xF.
    KeyDown(u8),
}

/// Source of host events, drained once per loop iteration.
pub trait Input {
    fn poll_event(&mut self) -> Option<Event>;
}

/// # Keymap
/// The hexadecimal keypad is mapped to the left 4 alphanumeric columns.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub fn keymap(key: Key) -> Option<u8> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}

/// Remembers the single most recent key-down for one debounce window.
///
/// There is no key-up: the latch forgets the key once `DEBOUNCE_WINDOW` has
/// passed since it was pressed, whatever the physical key is doing. A held
/// key stays visible only as long as the host keeps repeating key-downs.
#[derive(Debug, Default)]
pub struct KeyLatch {
    key: Option<u8>,
    opened_at: Option<Instant>,
}

impl KeyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: u8, now: Instant) {
        self.key = Some(key & 0xF);
        self.opened_at = Some(now);
    }

    pub fn expire(&mut self, now: Instant) {
        if let Some(opened_at) = self.opened_at {
            if now.saturating_duration_since(opened_at) >= DEBOUNCE_WINDOW {
                self.key = None;
                self.opened_at = None;
            }
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.key.is_some()
    }

    pub fn current(&self) -> Option<u8> {
        self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap_covers_all_sixteen_keys() {
        let keys = [
            Key::X,
            Key::Key1,
            Key::Key2,
            Key::Key3,
            Key::Q,
            Key::W,
            Key::E,
            Key::A,
            Key::S,
            Key::D,
            Key::Z,
            Key::C,
            Key::Key4,
            Key::R,
            Key::F,
            Key::V,
        ];
        for (expected, key) in keys.into_iter().enumerate() {
            assert_eq!(keymap(key), Some(expected as u8));
        }
        assert_eq!(keymap(Key::Space), None);
        assert_eq!(keymap(Key::Escape), None);
    }

    #[test]
    fn key_visible_for_one_window() {
        let t0 = Instant::now();
        let mut latch = KeyLatch::new();
        latch.press(0xA, t0);

        latch.expire(t0 + DEBOUNCE_WINDOW - Duration::from_nanos(1));
        assert!(latch.is_pressed());
        assert_eq!(latch.current(), Some(0xA));

        latch.expire(t0 + DEBOUNCE_WINDOW + Duration::from_millis(1));
        assert!(!latch.is_pressed());
        assert_eq!(latch.current(), None);
    }

    #[test]
    fn repeated_key_down_reopens_window() {
        let t0 = Instant::now();
        let mut latch = KeyLatch::new();
        latch.press(0x3, t0);
        let t1 = t0 + DEBOUNCE_WINDOW / 2;
        latch.press(0x3, t1);
        latch.expire(t0 + DEBOUNCE_WINDOW);
        assert_eq!(latch.current(), Some(0x3));
        latch.expire(t1 + DEBOUNCE_WINDOW);
        assert_eq!(latch.current(), None);
    }

    #[test]
    fn newest_key_wins() {
        let t0 = Instant::now();
        let mut latch = KeyLatch::new();
        latch.press(0x1, t0);
        latch.press(0x2, t0);
        assert_eq!(latch.current(), Some(0x2));
    }
}
