use std::collections::VecDeque;
use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use crate::error::Result;
use crate::keyboard::{keymap, Event, Input};

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

// Limit to max ~60 fps update rate
const FRAME_INTERVAL: Duration = Duration::from_micros(16600);

/// What the executor needs from a screen.
pub trait Display {
    /// Blank every cell.
    fn clear(&mut self);

    /// XOR-toggle the cell at (x, y). Returns true iff a lit cell went dark.
    /// Out-of-bounds coordinates are ignored.
    fn flip_pixel(&mut self, x: usize, y: usize) -> bool;
}

/// 64x32 monochrome cells, no window attached.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bit_buffer: Vec<bool>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: vec![false; WIDTH * HEIGHT],
        }
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.bit_buffer[y * WIDTH + x]
    }

    pub fn lit_count(&self) -> usize {
        self.bit_buffer.iter().filter(|&&bit| bit).count()
    }

    fn from_u16_rgb(r: u16, g: u16, b: u16) -> u32 {
        let (r, g, b) = (r as u32, g as u32, b as u32);
        (r << 16) | (g << 8) | b
    }

    fn paint(&self, pixel_buffer: &mut [u32]) {
        let on = Self::from_u16_rgb(0, 127, 255);
        let off = Self::from_u16_rgb(0, 0, 0);
        for (pixel, &bit) in pixel_buffer.iter_mut().zip(&self.bit_buffer) {
            *pixel = if bit { on } else { off };
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        self.bit_buffer.fill(false);
    }

    fn flip_pixel(&mut self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        let cell = &mut self.bit_buffer[y * WIDTH + x];
        let turned_off = *cell;
        *cell = !*cell;
        turned_off
    }
}

/// A `FrameBuffer` shown in a minifb window.
///
/// The window is only presented from `poll_event`, at most once per frame
/// interval, so drawing never stalls the CPU loop. Presenting is also what
/// pumps the host's keyboard events.
pub struct Screen {
    fb: FrameBuffer,
    pixel_buffer: Vec<u32>,
    window: Window,
    last_present: Option<Instant>,
    pending: VecDeque<Event>,
}

impl Screen {
    pub fn new(title: &str) -> Result<Self> {
        let mut window = Window::new(
            title,
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale: Scale::X16,
                ..WindowOptions::default()
            },
        )?;
        window.set_position(500, 300);
        window.limit_update_rate(None);
        log::info!("opened {}x{} window", WIDTH, HEIGHT);

        Ok(Self {
            fb: FrameBuffer::new(),
            pixel_buffer: vec![0; WIDTH * HEIGHT],
            window,
            last_present: None,
            pending: VecDeque::new(),
        })
    }

    fn present(&mut self) {
        self.fb.paint(&mut self.pixel_buffer);
        if let Err(e) = self
            .window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
        {
            log::warn!("window refresh failed: {}", e);
        }

        if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
            self.pending.push_back(Event::Quit);
            return;
        }
        for key in self.window.get_keys_pressed(KeyRepeat::Yes) {
            if let Some(kc) = keymap(key) {
                self.pending.push_back(Event::KeyDown(kc));
            }
        }
    }
}

impl Display for Screen {
    fn clear(&mut self) {
        self.fb.clear();
    }

    fn flip_pixel(&mut self, x: usize, y: usize) -> bool {
        self.fb.flip_pixel(x, y)
    }
}

impl Input for Screen {
    fn poll_event(&mut self) -> Option<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        let now = Instant::now();
        let due = self
            .last_present
            .map_or(true, |last| now.duration_since(last) >= FRAME_INTERVAL);
        if !due {
            return None;
        }
        self.last_present = Some(now);
        self.present();
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_reports_turn_off_only() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.flip_pixel(3, 4));
        assert!(fb.is_set(3, 4));
        assert!(fb.flip_pixel(3, 4));
        assert!(!fb.is_set(3, 4));
    }

    #[test]
    fn flip_out_of_bounds_is_noop() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.flip_pixel(WIDTH, 0));
        assert!(!fb.flip_pixel(0, HEIGHT));
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn clear_blanks_everything() {
        let mut fb = FrameBuffer::new();
        fb.flip_pixel(0, 0);
        fb.flip_pixel(WIDTH - 1, HEIGHT - 1);
        fb.clear();
        assert_eq!(fb.lit_count(), 0);
    }

    #[test]
    fn paint_maps_bits_to_colours() {
        let mut fb = FrameBuffer::new();
        fb.flip_pixel(1, 0);
        let mut pixels = vec![0xFFFF_FFFF; WIDTH * HEIGHT];
        fb.paint(&mut pixels);
        assert_eq!(pixels[0], 0x000000);
        assert_eq!(pixels[1], 0x007FFF);
    }
}
