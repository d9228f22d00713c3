//! Display command construction and encoding
//!
//! A [`DisplayCommand`] is immutable once built: the field id is validated
//! and the value is rendered (and escaped, for free text) at construction.
//! Encoding only copies bytes.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::decimal::{format_decimal, PLACEHOLDER};

/// Three bytes that end every command
pub const TERMINATOR: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Assignment between field id and quoted value
const ASSIGN_TEXT: &[u8] = b".txt=\"";

/// Maximum field id length (e.g. `page1.t10`)
pub const MAX_FIELD_ID_LEN: usize = 16;

/// Maximum unescaped text length for [`DisplayCommand::text`]
pub const MAX_TEXT_LEN: usize = 48;

/// Maximum rendered value length (text may double when escaped)
const MAX_RENDERED_LEN: usize = MAX_TEXT_LEN * 2;

/// Maximum encoded command length
pub const MAX_COMMAND_LEN: usize =
    MAX_FIELD_ID_LEN + ASSIGN_TEXT.len() + MAX_RENDERED_LEN + 1 + TERMINATOR.len();

/// Errors that can occur while building or encoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Field id empty, too long, or contains characters outside `[A-Za-z0-9_.]`
    InvalidFieldId,
    /// More fractional digits requested than supported
    InvalidPrecision,
    /// Value too large to render
    ValueOutOfRange,
    /// Text exceeds [`MAX_TEXT_LEN`]
    TextTooLong,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Name of a text object on the display (e.g. `t0`)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldId(String<MAX_FIELD_ID_LEN>);

impl FieldId {
    /// Validate and copy a field id
    pub fn new(id: &str) -> Result<Self, CommandError> {
        if id.is_empty() || id.starts_with('.') || id.ends_with('.') {
            return Err(CommandError::InvalidFieldId);
        }
        if !id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
        {
            return Err(CommandError::InvalidFieldId);
        }
        String::try_from(id)
            .map(Self)
            .map_err(|_| CommandError::InvalidFieldId)
    }

    /// Text object `t<index>`, the display editor's default naming
    pub fn text(index: u8) -> Self {
        let mut id = String::new();
        // "t255" is the longest possible id, well under capacity
        let _ = write!(id, "t{}", index);
        Self(id)
    }

    /// The id as sent on the wire
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A single `field.txt="value"` assignment
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayCommand {
    field: FieldId,
    value: String<MAX_RENDERED_LEN>,
}

impl DisplayCommand {
    /// Numeric value with a fixed number of fractional digits
    ///
    /// Non-finite values render as the placeholder.
    pub fn number(field: &FieldId, value: f32, decimals: u8) -> Result<Self, CommandError> {
        let rendered = format_decimal(value, decimals)?;
        let mut out = String::new();
        out.push_str(&rendered)
            .map_err(|_| CommandError::ValueOutOfRange)?;
        Ok(Self {
            field: field.clone(),
            value: out,
        })
    }

    /// Placeholder shown when a reading is unavailable
    pub fn placeholder(field: &FieldId) -> Self {
        let mut value = String::new();
        // PLACEHOLDER is two bytes; capacity cannot be exceeded
        let _ = value.push_str(PLACEHOLDER);
        Self {
            field: field.clone(),
            value,
        }
    }

    /// Free text, with `"` and `\` escaped
    pub fn text(field: &FieldId, text: &str) -> Result<Self, CommandError> {
        if text.len() > MAX_TEXT_LEN {
            return Err(CommandError::TextTooLong);
        }

        let mut value = String::new();
        for c in text.chars() {
            if c == '"' || c == '\\' {
                value.push('\\').map_err(|_| CommandError::TextTooLong)?;
            }
            value.push(c).map_err(|_| CommandError::TextTooLong)?;
        }

        Ok(Self {
            field: field.clone(),
            value,
        })
    }

    /// Target field
    pub fn field(&self) -> &FieldId {
        &self.field
    }

    /// Rendered value, as it appears between the quotes
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Whether this command carries the placeholder
    pub fn is_placeholder(&self) -> bool {
        self.value.as_str() == PLACEHOLDER
    }

    /// Number of bytes [`encode`](Self::encode) writes
    pub fn encoded_len(&self) -> usize {
        self.field.as_str().len() + ASSIGN_TEXT.len() + self.value.len() + 1 + TERMINATOR.len()
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, CommandError> {
        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(CommandError::BufferTooSmall);
        }

        let mut pos = 0;
        for part in [
            self.field.as_str().as_bytes(),
            ASSIGN_TEXT,
            self.value.as_bytes(),
            &b"\""[..],
            &TERMINATOR[..],
        ] {
            buffer[pos..pos + part.len()].copy_from_slice(part);
            pos += part.len();
        }

        Ok(pos)
    }

    /// Encode this command into a heapless Vec
    pub fn to_bytes(&self) -> Result<Vec<u8, MAX_COMMAND_LEN>, CommandError> {
        let mut buffer = [0u8; MAX_COMMAND_LEN];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| CommandError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Build the bytes for `field_id.txt="<value>"` plus terminators
pub fn format(
    field_id: &str,
    value: f32,
    decimals: u8,
) -> Result<Vec<u8, MAX_COMMAND_LEN>, CommandError> {
    let field = FieldId::new(field_id)?;
    DisplayCommand::number(&field, value, decimals)?.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: &str) -> FieldId {
        FieldId::new(id).unwrap()
    }

    #[test]
    fn test_format_whole_number() {
        let bytes = format("t1", 72.0, 0).unwrap();
        assert_eq!(&bytes[..], b"t1.txt=\"72\"\xFF\xFF\xFF");
    }

    #[test]
    fn test_format_one_decimal() {
        let bytes = format("t2", 48.26, 1).unwrap();
        assert_eq!(&bytes[..], b"t2.txt=\"48.3\"\xFF\xFF\xFF");
    }

    #[test]
    fn test_terminator_is_exactly_three_bytes() {
        let bytes = format("t0", 1.0, 0).unwrap();
        let tail = &bytes[bytes.len() - 4..];
        assert_eq!(tail, &[b'"', 0xFF, 0xFF, 0xFF]);
        assert_eq!(bytes.iter().filter(|&&b| b == 0xFF).count(), 3);
    }

    #[test]
    fn test_placeholder() {
        let cmd = DisplayCommand::placeholder(&field("t1"));
        assert!(cmd.is_placeholder());
        assert_eq!(&cmd.to_bytes().unwrap()[..], b"t1.txt=\"--\"\xFF\xFF\xFF");
    }

    #[test]
    fn test_nan_renders_placeholder() {
        let cmd = DisplayCommand::number(&field("t1"), f32::NAN, 0).unwrap();
        assert!(cmd.is_placeholder());
    }

    #[test]
    fn test_text_escaping() {
        let cmd = DisplayCommand::text(&field("t0"), "say \"hi\" \\o/").unwrap();
        assert_eq!(cmd.value(), "say \\\"hi\\\" \\\\o/");
        let bytes = cmd.to_bytes().unwrap();
        assert!(bytes.starts_with(b"t0.txt=\"say \\\"hi"));
        assert!(bytes.ends_with(b"o/\"\xFF\xFF\xFF"));
    }

    #[test]
    fn test_text_too_long() {
        let long = [b'a'; MAX_TEXT_LEN + 1];
        let long = core::str::from_utf8(&long).unwrap();
        assert_eq!(
            DisplayCommand::text(&field("t0"), long),
            Err(CommandError::TextTooLong)
        );
    }

    #[test]
    fn test_fully_escaped_text_fits() {
        let quotes = [b'"'; MAX_TEXT_LEN];
        let quotes = core::str::from_utf8(&quotes).unwrap();
        let cmd = DisplayCommand::text(&field("page1.t10"), quotes).unwrap();
        assert_eq!(cmd.value().len(), MAX_TEXT_LEN * 2);
        assert!(cmd.encoded_len() <= MAX_COMMAND_LEN);
        assert!(cmd.to_bytes().is_ok());
    }

    #[test]
    fn test_field_id_validation() {
        assert!(FieldId::new("t0").is_ok());
        assert!(FieldId::new("page1.t10").is_ok());
        assert!(FieldId::new("rpm_value").is_ok());

        assert_eq!(FieldId::new(""), Err(CommandError::InvalidFieldId));
        assert_eq!(FieldId::new("t 0"), Err(CommandError::InvalidFieldId));
        assert_eq!(FieldId::new("t0\""), Err(CommandError::InvalidFieldId));
        assert_eq!(FieldId::new(".t0"), Err(CommandError::InvalidFieldId));
        assert_eq!(
            FieldId::new("a_very_long_field_id"),
            Err(CommandError::InvalidFieldId)
        );
    }

    #[test]
    fn test_text_object_ids() {
        assert_eq!(FieldId::text(0).as_str(), "t0");
        assert_eq!(FieldId::text(12), FieldId::new("t12").unwrap());
        assert_eq!(FieldId::text(u8::MAX).as_str(), "t255");
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let cmd = DisplayCommand::number(&field("t1"), 72.0, 0).unwrap();
        let mut buffer = [0u8; 8];
        assert_eq!(cmd.encode(&mut buffer), Err(CommandError::BufferTooSmall));

        let mut exact = [0u8; 14];
        assert_eq!(cmd.encoded_len(), 14);
        assert_eq!(cmd.encode(&mut exact), Ok(14));
    }
}
