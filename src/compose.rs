//! Frame composition for the 128x64 panel.
//!
//! Four text bands, a page-indicator dot pair, and a full-width separator
//! between the fixed block and the paged block. Draw order is an invariant:
//! text first (each line clipped to its own band), dots, separator last —
//! the separator row must survive any glyph the lines can produce.
//!
//! Pixel layout matches the deployed fleet:
//!
//! ```text
//!   y= 1  IP:<address>            (bold)
//!   y=15  <hostname>  <ram>
//!   y=30  ────────────────────    separator
//!   y=33  paged row 3
//!   y=47  paged row 4                     oo   page dots, bottom-right
//! ```

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_6X13_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::frame::{DISPLAY_WIDTH, FrameBuffer};
use crate::page::Page;
use crate::scroll::Scroller;

/// Vertical band reserved for one text line, px.
pub const LINE_HEIGHT: u32 = 14;

pub const Y_LINE1: i32 = 1;
pub const Y_LINE2: i32 = 15;
pub const Y_SEPARATOR: i32 = 30;
pub const Y_LINE3: i32 = 33;
pub const Y_LINE4: i32 = 47;

/// Emphasized font for the IP line; regular font everywhere else. Both have
/// a 6 px advance, so one width measurement rule covers every line.
pub const FONT_BOLD: &MonoFont<'static> = &FONT_6X13_BOLD;
pub const FONT_REGULAR: &MonoFont<'static> = &FONT_6X10;

const DOT_DIAMETER: u32 = 5;
const DOT_Y: i32 = 59;
const DOT_A_X: i32 = 115;
const DOT_B_X: i32 = 121;

/// Composes one frame from the four lines and the active page.
pub fn compose(
    fixed: [&Scroller; 2],
    paged: [&Scroller; 2],
    page: Page,
    gap_px: u32,
) -> FrameBuffer {
    let mut fb = FrameBuffer::new();

    draw_line(&mut fb, fixed[0], Y_LINE1, FONT_BOLD, gap_px);
    draw_line(&mut fb, fixed[1], Y_LINE2, FONT_REGULAR, gap_px);
    draw_line(&mut fb, paged[0], Y_LINE3, FONT_REGULAR, gap_px);
    draw_line(&mut fb, paged[1], Y_LINE4, FONT_REGULAR, gap_px);

    draw_page_dots(&mut fb, page);

    // Separator goes down last.
    Line::new(
        Point::new(0, Y_SEPARATOR),
        Point::new(DISPLAY_WIDTH as i32 - 1, Y_SEPARATOR),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
    .draw(&mut fb)
    .unwrap();

    fb
}

/// Draws one line into its band. A scrolling line is an infinite strip: the
/// text appears at `-offset` and again one period later, and the band clip
/// keeps every pixel inside `[0, width) x [y, y + LINE_HEIGHT)`.
fn draw_line(fb: &mut FrameBuffer, line: &Scroller, y: i32, font: &MonoFont<'static>, gap_px: u32) {
    let style = MonoTextStyle::new(font, BinaryColor::On);
    let band = Rectangle::new(Point::new(0, y), Size::new(DISPLAY_WIDTH, LINE_HEIGHT));
    let mut clipped = fb.clipped(&band);

    if line.is_scrolling() {
        let offset = line.offset_px();
        let period = line.period_px(gap_px) as i32;
        Text::with_baseline(line.text(), Point::new(-offset, y), style, Baseline::Top)
            .draw(&mut clipped)
            .unwrap();
        Text::with_baseline(
            line.text(),
            Point::new(-offset + period, y),
            style,
            Baseline::Top,
        )
        .draw(&mut clipped)
        .unwrap();
    } else {
        Text::with_baseline(line.text(), Point::new(0, y), style, Baseline::Top)
            .draw(&mut clipped)
            .unwrap();
    }
}

/// Two 5 px dots bottom-right; the active page's dot is filled, the other
/// hollow.
fn draw_page_dots(fb: &mut FrameBuffer, page: Page) {
    let filled = PrimitiveStyle::with_fill(BinaryColor::On);
    let hollow = PrimitiveStyle::with_stroke(BinaryColor::On, 1);

    Circle::new(Point::new(DOT_A_X, DOT_Y), DOT_DIAMETER)
        .into_styled(if page == Page::A { filled } else { hollow })
        .draw(fb)
        .unwrap();
    Circle::new(Point::new(DOT_B_X, DOT_Y), DOT_DIAMETER)
        .into_styled(if page == Page::B { filled } else { hollow })
        .draw(fb)
        .unwrap();
}
