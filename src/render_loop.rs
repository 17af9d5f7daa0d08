//! The render loop.
//!
//! Single-threaded, run-until-cancelled. Each iteration: derive the page
//! from wall-clock time, sample metrics, refresh the four lines' text,
//! compose a frame with the current scroll offsets, present it, advance the
//! animations, then sleep whatever is left of the frame budget. A failed
//! present is logged and retried on the next tick — a transient bus glitch
//! must not kill a long-running monitor.
//!
//! Time enters through a parameter (`tick(now)`), never from inside the
//! components, so tests drive a bounded number of iterations at arbitrary
//! timestamps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::{info, warn};

use crate::compose::{self, FONT_BOLD, FONT_REGULAR};
use crate::config::Config;
use crate::frame::{DISPLAY_WIDTH, FrameBuffer};
use crate::metrics::{MetricsSnapshot, MetricsSource};
use crate::page::{self, Page};
use crate::scroll::Scroller;
use crate::sink::FrameSink;

pub struct RenderLoop {
    config: Config,
    metrics: MetricsSource,
    fixed_top: Scroller,
    fixed_bottom: Scroller,
    paged_row3: Scroller,
    paged_row4: Scroller,
    last_page: Option<Page>,
}

impl RenderLoop {
    pub fn new(config: Config) -> Self {
        let metrics = MetricsSource::new(
            config.disk_mount.clone(),
            Duration::from_secs(config.metrics_refresh_secs),
        );
        Self {
            metrics,
            fixed_top: Scroller::new(FONT_BOLD, DISPLAY_WIDTH),
            fixed_bottom: Scroller::new(FONT_REGULAR, DISPLAY_WIDTH),
            paged_row3: Scroller::new(FONT_REGULAR, DISPLAY_WIDTH),
            paged_row4: Scroller::new(FONT_REGULAR, DISPLAY_WIDTH),
            last_page: None,
            config,
        }
    }

    /// Runs until `cancel` is set, then blanks the panel and returns. No
    /// state survives the process: a restart re-derives everything from the
    /// clock and current metrics, losing only scroll continuity.
    pub fn run(&mut self, sink: &mut dyn FrameSink, cancel: &AtomicBool) -> Result<()> {
        let budget = Duration::from_secs_f64(self.config.frame_interval_secs);
        info!(
            "render loop started: {}s page flips, {}s frames",
            self.config.page_flip_secs, self.config.frame_interval_secs
        );

        while !cancel.load(Ordering::Relaxed) {
            let started = Instant::now();
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs_f64();

            let frame = self.tick(now);
            if let Err(e) = sink.present(&frame) {
                warn!("present failed, retrying next tick: {e:#}");
            }

            if let Some(rest) = budget.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        info!("render loop cancelled, blanking panel");
        if let Err(e) = sink.clear() {
            warn!("could not blank panel on shutdown: {e:#}");
        }
        Ok(())
    }

    fn tick(&mut self, now_epoch_secs: f64) -> FrameBuffer {
        let snapshot = self.metrics.sample();
        self.tick_with(now_epoch_secs, &snapshot)
    }

    /// One iteration with time and metrics injected.
    fn tick_with(&mut self, now_epoch_secs: f64, snapshot: &MetricsSnapshot) -> FrameBuffer {
        let page = Page::at(now_epoch_secs, self.config.page_flip_secs);

        // Paged rows start fresh on every flip.
        if self.last_page != Some(page) {
            self.paged_row3.reset();
            self.paged_row4.reset();
            self.last_page = Some(page);
        }

        let [top, bottom] = page::fixed_lines(snapshot);
        let [row3, row4] = page::paged_lines(page, snapshot);
        self.fixed_top.set_text(&top);
        self.fixed_bottom.set_text(&bottom);
        self.paged_row3.set_text(&row3);
        self.paged_row4.set_text(&row4);

        let frame = compose::compose(
            [&self.fixed_top, &self.fixed_bottom],
            [&self.paged_row3, &self.paged_row4],
            page,
            self.config.scroll_gap_px,
        );

        for line in [
            &mut self.fixed_top,
            &mut self.fixed_bottom,
            &mut self.paged_row3,
            &mut self.paged_row4,
        ] {
            line.tick(self.config.scroll_speed_px, self.config.scroll_gap_px);
        }

        frame
    }
}
