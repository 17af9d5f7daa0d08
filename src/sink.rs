//! Frame sink: the seam between composition and glass.
//!
//! The render loop only knows `FrameSink`. The production implementation
//! drives an SSD1306 controller over Linux `/dev/i2c-N`; tests substitute a
//! capturing sink. `present` is synchronous and safe to retry — a failed
//! write leaves the panel showing the previous frame and the next tick sends
//! a complete replacement.

use anyhow::Result;

use crate::frame::FrameBuffer;

pub trait FrameSink {
    /// Pushes one composed frame to the panel. Blocking.
    fn present(&mut self, frame: &FrameBuffer) -> Result<()>;

    /// Blanks the panel. Used once at shutdown.
    fn clear(&mut self) -> Result<()>;
}

#[cfg(target_os = "linux")]
pub use ssd1306::Ssd1306Sink;

#[cfg(target_os = "linux")]
mod ssd1306 {
    use anyhow::{Context, Result, anyhow};
    use embedded_hal::i2c::I2c;
    use linux_embedded_hal::I2cdev;
    use tracing::info;

    use super::FrameSink;
    use crate::frame::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FrameBuffer};

    /// SSD1306 command set (the subset this driver issues).
    #[allow(dead_code)]
    mod cmd {
        pub const DISPLAY_OFF: u8 = 0xAE;
        pub const DISPLAY_ON: u8 = 0xAF;
        pub const SET_CONTRAST: u8 = 0x81;
        pub const SET_NORMAL: u8 = 0xA6;
        pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
        pub const SET_COM_PINS: u8 = 0xDA;
        pub const SET_VCOM_DETECT: u8 = 0xDB;
        pub const SET_CLOCK_DIV: u8 = 0xD5;
        pub const SET_PRECHARGE: u8 = 0xD9;
        pub const SET_MUX_RATIO: u8 = 0xA8;
        pub const SET_START_LINE: u8 = 0x40;
        pub const SET_SEG_REMAP: u8 = 0xA1;
        pub const SET_COM_SCAN_DEC: u8 = 0xC8;
        pub const SET_CHARGE_PUMP: u8 = 0x8D;
        pub const SET_MEMORY_MODE: u8 = 0x20;
        pub const SET_COLUMN_ADDR: u8 = 0x21;
        pub const SET_PAGE_ADDR: u8 = 0x22;
        pub const RESUME_FROM_RAM: u8 = 0xA4;
    }

    const PAGES: usize = DISPLAY_HEIGHT as usize / 8;

    /// SSD1306 128x64 over I2C.
    pub struct Ssd1306Sink {
        i2c: I2cdev,
        address: u8,
    }

    impl Ssd1306Sink {
        /// Opens the bus and runs the panel init sequence. Any failure here
        /// is fatal to startup: a panel that cannot init can never present.
        pub fn open(bus: u8, address: u8, contrast: u8) -> Result<Self> {
            let path = format!("/dev/i2c-{bus}");
            let i2c = I2cdev::new(&path).with_context(|| format!("opening {path}"))?;

            let mut sink = Self { i2c, address };
            sink.init(contrast)
                .with_context(|| format!("initializing SSD1306 at 0x{address:02X} on {path}"))?;
            info!("SSD1306 ready at 0x{address:02X} on {path}");
            Ok(sink)
        }

        fn init(&mut self, contrast: u8) -> Result<()> {
            let init_cmds: &[u8] = &[
                cmd::DISPLAY_OFF,
                cmd::SET_CLOCK_DIV,
                0x80,
                cmd::SET_MUX_RATIO,
                (DISPLAY_HEIGHT - 1) as u8,
                cmd::SET_DISPLAY_OFFSET,
                0x00,
                cmd::SET_START_LINE,
                cmd::SET_CHARGE_PUMP,
                0x14,
                cmd::SET_MEMORY_MODE,
                0x00, // horizontal addressing: one write per frame
                cmd::SET_SEG_REMAP,
                cmd::SET_COM_SCAN_DEC,
                cmd::SET_COM_PINS,
                0x12,
                cmd::SET_CONTRAST,
                contrast,
                cmd::SET_PRECHARGE,
                0xF1,
                cmd::SET_VCOM_DETECT,
                0x40,
                cmd::RESUME_FROM_RAM,
                cmd::SET_NORMAL,
                cmd::DISPLAY_ON,
            ];

            for &c in init_cmds {
                self.command(c)?;
            }
            Ok(())
        }

        fn command(&mut self, c: u8) -> Result<()> {
            self.i2c
                .write(self.address, &[0x00, c])
                .map_err(|e| anyhow!("i2c command write to 0x{:02X}: {e}", self.address))
        }

        /// Row-major frame -> SSD1306 page-major wire bytes. Within a page
        /// byte, bit 0 is the topmost of its eight rows.
        fn repack(frame: &FrameBuffer) -> Vec<u8> {
            let mut data = Vec::with_capacity(1 + PAGES * DISPLAY_WIDTH as usize);
            data.push(0x40); // data stream control byte
            for page in 0..PAGES {
                for x in 0..DISPLAY_WIDTH as usize {
                    let mut byte = 0u8;
                    for bit in 0..8 {
                        if frame.pixel(x, page * 8 + bit) == Some(true) {
                            byte |= 1 << bit;
                        }
                    }
                    data.push(byte);
                }
            }
            data
        }
    }

    impl FrameSink for Ssd1306Sink {
        fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
            self.command(cmd::SET_COLUMN_ADDR)?;
            self.command(0)?;
            self.command((DISPLAY_WIDTH - 1) as u8)?;
            self.command(cmd::SET_PAGE_ADDR)?;
            self.command(0)?;
            self.command((PAGES - 1) as u8)?;

            let data = Self::repack(frame);
            self.i2c
                .write(self.address, &data)
                .map_err(|e| anyhow!("i2c frame write to 0x{:02X}: {e}", self.address))
        }

        fn clear(&mut self) -> Result<()> {
            self.present(&FrameBuffer::new())
        }
    }

}
