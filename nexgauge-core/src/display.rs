//! Display link
//!
//! Owns the serial transmitter and turns readings into display commands.
//! Writes are fire-and-forget: a failure is reported to the caller once and
//! never retried.

use nexgauge_hal::UartTx;
use nexgauge_protocol::{CommandError, DisplayCommand, FieldId, MAX_COMMAND_LEN};

use crate::temperature::TemperatureReading;

/// Why a command did not reach the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Command could not be built
    Command(CommandError),
    /// UART reported a write error
    Write,
}

impl From<CommandError> for LinkError {
    fn from(e: CommandError) -> Self {
        LinkError::Command(e)
    }
}

/// Serial link to the display
#[derive(Debug)]
pub struct DisplayLink<T> {
    tx: T,
    sent: u32,
}

impl<T: UartTx> DisplayLink<T> {
    /// Wrap a UART transmitter
    pub fn new(tx: T) -> Self {
        Self { tx, sent: 0 }
    }

    /// Encode and transmit one command
    pub fn send(&mut self, command: &DisplayCommand) -> Result<(), LinkError> {
        let mut buffer = [0u8; MAX_COMMAND_LEN];
        let len = command.encode(&mut buffer)?;

        self.tx
            .write_blocking(&buffer[..len])
            .map_err(|_| LinkError::Write)?;
        self.tx.flush().map_err(|_| LinkError::Write)?;

        self.sent = self.sent.wrapping_add(1);
        Ok(())
    }

    /// Show a numeric value
    pub fn show_number(
        &mut self,
        field: &FieldId,
        value: f32,
        decimals: u8,
    ) -> Result<(), LinkError> {
        let command = DisplayCommand::number(field, value, decimals)?;
        self.send(&command)
    }

    /// Show a temperature, or the placeholder when disconnected
    pub fn show_temperature(
        &mut self,
        field: &FieldId,
        reading: TemperatureReading,
        decimals: u8,
    ) -> Result<(), LinkError> {
        match reading {
            TemperatureReading::Celsius(c) => self.show_number(field, c, decimals),
            TemperatureReading::Disconnected => self.send(&DisplayCommand::placeholder(field)),
        }
    }

    /// Show free text
    pub fn show_text(&mut self, field: &FieldId, text: &str) -> Result<(), LinkError> {
        let command = DisplayCommand::text(field, text)?;
        self.send(&command)
    }

    /// Number of commands written successfully
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Access the transmitter
    pub fn tx(&self) -> &T {
        &self.tx
    }
}


#[cfg(test)]
mod tests {
    use super::mock::RecordingUart;
    use super::*;

    fn field(id: &str) -> FieldId {
        FieldId::new(id).unwrap()
    }

    #[test]
    fn test_show_number_writes_command() {
        let mut link = DisplayLink::new(RecordingUart::default());
        link.show_number(&field("t1"), 72.0, 0).unwrap();
        assert_eq!(link.tx().bytes, b"t1.txt=\"72\"\xFF\xFF\xFF");
        assert_eq!(link.tx().flushes, 1);
        assert_eq!(link.sent(), 1);
    }

    #[test]
    fn test_disconnected_temperature_shows_placeholder() {
        let mut link = DisplayLink::new(RecordingUart::default());
        link.show_temperature(&field("t1"), TemperatureReading::Disconnected, 0)
            .unwrap();
        assert_eq!(link.tx().commands(), [&b"t1.txt=\"--\""[..]]);
    }

    #[test]
    fn test_valid_temperature_is_numeric() {
        let mut link = DisplayLink::new(RecordingUart::default());
        link.show_temperature(&field("t1"), TemperatureReading::Celsius(23.6), 0)
            .unwrap();
        assert_eq!(link.tx().commands(), [&b"t1.txt=\"24\""[..]]);
    }

    #[test]
    fn test_write_failure_is_reported_not_counted() {
        let mut link = DisplayLink::new(RecordingUart {
            fail: true,
            ..Default::default()
        });
        assert_eq!(
            link.show_number(&field("t0"), 1.0, 0),
            Err(LinkError::Write)
        );
        assert_eq!(link.sent(), 0);
    }

    #[test]
    fn test_command_error_is_reported() {
        let mut link = DisplayLink::new(RecordingUart::default());
        assert_eq!(
            link.show_number(&field("t0"), 1.0, 9),
            Err(LinkError::Command(CommandError::InvalidPrecision))
        );
        assert!(link.tx().bytes.is_empty());
    }
}
