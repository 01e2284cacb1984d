//! Vendor label alphabets.
//!
//! Most radios do not store channel labels as ASCII. Each byte is an index
//! into a vendor-specific character table, and unused trailing positions
//! hold a pad byte.

use crate::error::{Error, Result};

/// A single-byte, index-based label alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    table: &'static str,
    pad: u8,
    unknown: char,
}

impl Charset {
    /// `table` lists the characters in index order. `pad` fills unused
    /// positions on encode and is stripped from the tail on decode. Bytes
    /// past the end of the table decode as `unknown`.
    pub const fn new(table: &'static str, pad: u8, unknown: char) -> Self {
        Charset {
            table,
            pad,
            unknown,
        }
    }

    /// The characters this alphabet can represent.
    pub fn characters(&self) -> &'static str {
        self.table
    }

    pub fn pad(&self) -> u8 {
        self.pad
    }

    /// Decode a stored label. Trailing pad bytes and trailing spaces are
    /// dropped.
    pub fn decode(&self, raw: &[u8]) -> String {
        let end = raw
            .iter()
            .rposition(|&b| b != self.pad)
            .map_or(0, |pos| pos + 1);
        let text: String = raw[..end]
            .iter()
            .map(|&b| self.table.chars().nth(b as usize).unwrap_or(self.unknown))
            .collect();
        text.trim_end().to_string()
    }

    /// Encode `text` into exactly `len` bytes, padding with the pad byte.
    ///
    /// Characters outside the alphabet and labels longer than `len` are
    /// rejected.
    pub fn encode(&self, text: &str, len: usize) -> Result<Vec<u8>> {
        let text = text.trim_end();
        let mut out = Vec::with_capacity(len);
        for c in text.chars() {
            let index = self.table.chars().position(|t| t == c).ok_or_else(|| {
                Error::InvalidParameter(format!("character {c:?} not valid in label"))
            })?;
            out.push(index as u8);
        }
        if out.len() > len {
            return Err(Error::InvalidParameter(format!(
                "label {text:?} longer than {len} characters"
            )));
        }
        out.resize(len, self.pad);
        Ok(out)
    }

    /// True if every character of `text` is in the alphabet.
    pub fn is_valid(&self, text: &str) -> bool {
        text.chars().all(|c| self.table.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPPER: Charset = Charset::new(" ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789", 0x00, '?');
    const PADDED: Charset = Charset::new("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ ", 0xFF, '.');

    #[test]
    fn decode_indexes_table() {
        assert_eq!(UPPER.decode(&[1, 2, 3]), "ABC");
    }

    #[test]
    fn decode_strips_padding_and_trailing_spaces() {
        assert_eq!(UPPER.decode(&[11, 9, 0, 0, 0]), "KI");
        assert_eq!(PADDED.decode(&[10, 11, 36, 0xFF, 0xFF]), "AB");
    }

    #[test]
    fn decode_maps_out_of_table_bytes() {
        assert_eq!(PADDED.decode(&[10, 0x70, 11]), "A.B");
    }

    #[test]
    fn encode_pads_to_length() {
        assert_eq!(PADDED.encode("AB", 4).unwrap(), vec![10, 11, 0xFF, 0xFF]);
        assert_eq!(UPPER.encode("W1", 5).unwrap(), vec![23, 28, 0, 0, 0]);
    }

    #[test]
    fn encode_rejects_unknown_and_long() {
        assert!(UPPER.encode("a", 5).is_err());
        assert!(UPPER.encode("ABCDEF", 5).is_err());
    }

    #[test]
    fn encode_then_decode_preserves_label() {
        let raw = UPPER.encode("K3 ABC", 8).unwrap();
        assert_eq!(UPPER.decode(&raw), "K3 ABC");
    }
}
