//! Pure unit tests for the page and scroll arithmetic.
//!
//! These exercise the timing math that keeps a whole fleet visually in sync,
//! validated without a panel, without Linux, and without any native external
//! dependencies. They run as part of the standard `cargo test` invocation.
//!
//! Because the main crate is a binary with platform-gated native dependencies
//! (`linux-embedded-hal` only builds against Linux I2C), these tests define
//! the minimal logic inline rather than importing from the crate. The
//! functions mirror the real implementations in `src/page.rs`, `src/scroll.rs`
//! and `src/metrics.rs` exactly.
//!
//! Whenever the real implementations change, these mirrors must be updated.

// ---------------------------------------------------------------------------
// Inline mirrors
// ---------------------------------------------------------------------------

/// Mirror of src/page::Page::at (0 = page A, 1 = page B).
fn page_index(now_epoch_secs: f64, flip_interval_secs: u64) -> u64 {
    (now_epoch_secs / flip_interval_secs as f64).floor() as u64 % 2
}

/// Mirror of src/scroll::Scroller::tick for an oversized line.
fn advance_offset(offset: u32, text_width: u32, gap: u32, speed: u32) -> u32 {
    (offset + speed) % (text_width + gap)
}

/// Mirror of src/metrics::memory_label.
fn memory_label(total_bytes: u64) -> &'static str {
    let gib = total_bytes as f64 / 1024f64.powi(3);
    if gib < 3.0 {
        "2GB"
    } else if gib < 6.0 {
        "4GB"
    } else {
        "8GB"
    }
}

// ---------------------------------------------------------------------------
// Tests: page derivation
// ---------------------------------------------------------------------------

#[test]
fn page_scenario_from_the_field() {
    // interval=5: t=12 -> floor(12/5)=2, even -> page A.
    assert_eq!(page_index(12.0, 5), 0);
    // t=17 -> floor(17/5)=3, odd -> page B.
    assert_eq!(page_index(17.0, 5), 1);
}

#[test]
fn page_cycles_with_period_two_intervals() {
    for interval in [1u64, 5, 30] {
        for t in [0.0, 0.9, 12.0, 1_754_500_000.25] {
            assert_eq!(
                page_index(t, interval),
                page_index(t + 2.0 * interval as f64, interval)
            );
            assert_ne!(
                page_index(t, interval),
                page_index(t + interval as f64, interval)
            );
        }
    }
}

#[test]
fn two_hosts_with_agreeing_clocks_agree_on_the_page() {
    // Sub-interval skew inside the same slot does not split the fleet.
    let t = 1_754_500_010.0;
    assert_eq!(page_index(t, 5), page_index(t + 0.8, 5));
}

// ---------------------------------------------------------------------------
// Tests: scroll arithmetic
// ---------------------------------------------------------------------------

#[test]
fn offset_walks_the_full_period_and_wraps() {
    // width=150 on a 128 px panel, gap=28 -> period 178.
    let (width, gap, speed) = (150u32, 28u32, 1u32);
    let period = width + gap;
    assert_eq!(period, 178);

    let mut offset = 0u32;
    for tick in 1..=period {
        offset = advance_offset(offset, width, gap, speed);
        if tick < period {
            assert_eq!(offset, tick);
        }
    }
    assert_eq!(offset, 0, "offset returns to start after exactly one period");
}

#[test]
fn offset_never_leaves_its_range() {
    let (width, gap) = (150u32, 28u32);
    for speed in [1u32, 2, 3, 7] {
        let mut offset = 0u32;
        for _ in 0..1000 {
            offset = advance_offset(offset, width, gap, speed);
            assert!(offset < width + gap);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests: RAM label buckets
// ---------------------------------------------------------------------------

#[test]
fn ram_buckets_cover_the_board_lineup() {
    const GIB: u64 = 1024 * 1024 * 1024;
    // Boards report slightly under nominal; the buckets absorb that.
    assert_eq!(memory_label(2 * GIB - 64 * 1024), "2GB");
    assert_eq!(memory_label(4 * GIB - 64 * 1024), "4GB");
    assert_eq!(memory_label(8 * GIB - 64 * 1024), "8GB");
}
