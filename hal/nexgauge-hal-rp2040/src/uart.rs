//! Display UART
//!
//! Transmit-only and blocking: commands are a few dozen bytes at 9600
//! baud and the sampler waits for each to leave the FIFO.

use embassy_rp::uart::{self, Blocking, UartTx as RpUartTx};
use nexgauge_hal::uart::{DataBits, Parity, StopBits};
use nexgauge_hal::{UartConfig, UartTx};

use crate::pins::DisplayPeripherals;

/// Translate the shared UART settings to embassy-rp's
pub fn to_rp_config(config: &UartConfig) -> uart::Config {
    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}

/// Blocking transmitter wired to the display
pub struct DisplayUart {
    tx: RpUartTx<'static, Blocking>,
}

impl DisplayUart {
    /// Open UART0 on the display pins
    pub fn new(display: DisplayPeripherals, config: &UartConfig) -> Self {
        // RX is unused; the display's replies are ignored
        let DisplayPeripherals { uart, tx, rx: _ } = display;
        Self {
            tx: RpUartTx::new_blocking(uart, tx, to_rp_config(config)),
        }
    }
}

impl UartTx for DisplayUart {
    type Error = uart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.blocking_flush()
    }
}
