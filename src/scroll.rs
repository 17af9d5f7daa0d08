//! Horizontal scroll state for lines wider than the panel.
//!
//! A line that fits is pinned at offset 0. A wider line becomes an infinite
//! strip of `text` + a blank gap with period `width + gap`; each tick the
//! offset advances and wraps, and the composer draws the text twice (at
//! `-offset` and `-offset + period`) so the wrap is seamless.
//!
//! When the text content changes the offset resets to 0 and the width is
//! re-measured — a carried-over offset could exceed the new text's period.

use embedded_graphics::mono_font::MonoFont;

/// Per-line scroll state machine.
#[derive(Debug, Clone)]
pub struct Scroller {
    text: String,
    /// Advance of one glyph in the line's font, px.
    char_advance_px: u32,
    /// Visible width available to this line, px.
    max_width_px: u32,
    /// Measured width of the current text, px.
    text_width_px: u32,
    offset_px: u32,
}

impl Scroller {
    pub fn new(font: &MonoFont<'_>, max_width_px: u32) -> Self {
        Self {
            text: String::new(),
            char_advance_px: font.character_size.width + font.character_spacing,
            max_width_px,
            text_width_px: 0,
            offset_px: 0,
        }
    }

    /// Replaces the line content. A changed text resets the animation.
    pub fn set_text(&mut self, text: &str) {
        if text == self.text {
            return;
        }
        self.text.clear();
        self.text.push_str(text);
        self.text_width_px = self.char_advance_px * text.chars().count() as u32;
        self.offset_px = 0;
    }

    /// Restarts the animation without touching the content.
    pub fn reset(&mut self) {
        self.offset_px = 0;
    }

    /// Advances the animation by one tick. Static text never drifts.
    pub fn tick(&mut self, speed_px: u32, gap_px: u32) {
        if !self.is_scrolling() {
            self.offset_px = 0;
            return;
        }
        self.offset_px = (self.offset_px + speed_px) % self.period_px(gap_px);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_scrolling(&self) -> bool {
        self.text_width_px > self.max_width_px
    }

    #[allow(dead_code)]
    pub fn text_width_px(&self) -> u32 {
        self.text_width_px
    }

    /// Pixel distance after which the animation exactly repeats.
    pub fn period_px(&self, gap_px: u32) -> u32 {
        self.text_width_px + gap_px
    }

    /// Current render offset, px. Always in `[0, period)` while scrolling,
    /// always 0 otherwise.
    pub fn offset_px(&self) -> i32 {
        self.offset_px as i32
    }
}
