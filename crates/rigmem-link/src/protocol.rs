//! Frame codec for delimiter-terminated, checksummed command frames.
//!
//! Commands are a mnemonic followed by arguments joined with the link's
//! argument separator, terminated by the link's delimiter:
//!
//! ```text
//! <mnemonic>[<arg><sep><arg>...]<delimiter>
//! ```
//!
//! Memory access commands carry a hex payload and a trailing checksum:
//!
//! ```text
//! <mnemonic><addr: 4 hex><len: 2 hex>[<payload hex>]<checksum: 2 hex><delimiter>
//! ```
//!
//! Responses are single-byte text (cp1252) terminated by the same
//! delimiter. The error token `?` (and a bare `N` or `E` on some models)
//! means the radio refused the command.

use bytes::{BufMut, BytesMut};

use rigmem_core::error::FrameError;

/// The terminator/separator pair a radio uses to frame commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delimiter {
    /// Ends every command and response.
    pub terminator: &'static str,
    /// Joins command arguments. Empty for radios with none.
    pub separator: &'static str,
}

impl Delimiter {
    pub const fn new(terminator: &'static str, separator: &'static str) -> Self {
        Delimiter {
            terminator,
            separator,
        }
    }
}

/// `;`-terminated commands with no argument separator (Elecraft, Kenwood).
pub const SEMICOLON: Delimiter = Delimiter::new(";", "");

/// Replies that mean the radio refused a command.
pub const ERROR_TOKENS: &[&str] = &["?", "N", "E"];

/// How the trailing checksum byte of a frame is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumScheme {
    /// `((sum - 1) & 0xFF) ^ 0xFF`. Summing the frame with this byte
    /// appended gives zero modulo 256.
    #[default]
    InvertedSumMinusOne,
    /// `sum & 0xFF`, stored after the summed region.
    PlainSum,
}

impl ChecksumScheme {
    /// Checksum byte for `payload`.
    pub fn compute(self, payload: &[u8]) -> u8 {
        let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        match self {
            ChecksumScheme::InvertedSumMinusOne => sum.wrapping_sub(1) ^ 0xFF,
            ChecksumScheme::PlainSum => sum,
        }
    }

    /// Check a frame whose last byte is its checksum.
    pub fn verify(self, frame: &[u8]) -> Result<(), FrameError> {
        let Some((&stored, body)) = frame.split_last() else {
            return Err(FrameError::Incomplete);
        };
        let expected = self.compute(body);
        if stored == expected {
            Ok(())
        } else {
            Err(FrameError::ChecksumMismatch {
                residue: stored.wrapping_sub(expected),
            })
        }
    }
}

/// Checksum byte for `payload` using the command-frame formula
/// `((sum(payload) - 1) & 0xFF) ^ 0xFF`.
///
/// ```
/// use rigmem_link::protocol::compute_checksum;
///
/// let ck = compute_checksum(&[0x0C, 0x00, 0x40]);
/// assert_eq!(ck, 0xB4);
/// assert_eq!((0x0Cu32 + 0x40 + ck as u32) % 256, 0);
/// ```
pub fn compute_checksum(payload: &[u8]) -> u8 {
    ChecksumScheme::InvertedSumMinusOne.compute(payload)
}

/// Encode a command into raw bytes ready for transmission.
///
/// ```
/// use rigmem_link::protocol::{encode_command, SEMICOLON, Delimiter};
///
/// assert_eq!(encode_command("ID", &[], SEMICOLON), b"ID;");
/// assert_eq!(encode_command("AI", &["0"], SEMICOLON), b"AI0;");
/// assert_eq!(encode_command("KS", &["020", "1"], Delimiter::new("\r", ",")), b"KS020,1\r");
/// ```
pub fn encode_command(mnemonic: &str, args: &[&str], delimiter: Delimiter) -> Vec<u8> {
    let args_len: usize = args.iter().map(|a| a.len() + delimiter.separator.len()).sum();
    let mut buf = BytesMut::with_capacity(mnemonic.len() + args_len + delimiter.terminator.len());
    buf.put_slice(mnemonic.as_bytes());
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            buf.put_slice(delimiter.separator.as_bytes());
        }
        buf.put_slice(arg.as_bytes());
    }
    buf.put_slice(delimiter.terminator.as_bytes());
    buf.to_vec()
}

/// Hex argument of a memory read: address, length, checksum.
///
/// ```
/// use rigmem_link::protocol::encode_read_args;
///
/// assert_eq!(encode_read_args(0x0C00, 0x40), "0c0040b4");
/// ```
pub fn encode_read_args(address: u16, length: u8) -> String {
    let header = address_header(address, length);
    let checksum = compute_checksum(&header);
    format!("{}{checksum:02x}", hex::encode(header))
}

/// Hex argument of a memory write: address, length, payload, checksum.
///
/// The length field is taken from `payload`, which must fit in one byte.
pub fn encode_write_args(address: u16, payload: &[u8]) -> Result<String, FrameError> {
    let length = u8::try_from(payload.len())
        .map_err(|_| FrameError::InvalidHex(format!("{}-byte payload too long", payload.len())))?;
    let mut body = address_header(address, length).to_vec();
    body.extend_from_slice(payload);
    let checksum = compute_checksum(&body);
    Ok(format!("{}{checksum:02x}", hex::encode(body)))
}

/// A complete memory-read command frame.
pub fn encode_read_command(mnemonic: &str, address: u16, length: u8, delimiter: Delimiter) -> Vec<u8> {
    encode_command(mnemonic, &[&encode_read_args(address, length)], delimiter)
}

/// A complete memory-write command frame.
pub fn encode_write_command(
    mnemonic: &str,
    address: u16,
    payload: &[u8],
    delimiter: Delimiter,
) -> Result<Vec<u8>, FrameError> {
    let args = encode_write_args(address, payload)?;
    Ok(encode_command(mnemonic, &[&args], delimiter))
}

fn address_header(address: u16, length: u8) -> [u8; 3] {
    let [hi, lo] = address.to_be_bytes();
    [hi, lo, length]
}

/// Decode a hex payload, tolerating surrounding whitespace.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, FrameError> {
    hex::decode(text.trim()).map_err(|e| FrameError::InvalidHex(format!("{text:?}: {e}")))
}

/// A memory record returned by a read command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFrame {
    pub address: u16,
    pub length: u8,
    pub data: Vec<u8>,
}

/// Parse the hex body of a memory read reply (after the mnemonic) into its
/// address, length, and data, verifying the trailing checksum.
pub fn decode_memory_frame(hex_body: &str, scheme: ChecksumScheme) -> Result<MemoryFrame, FrameError> {
    let bytes = decode_hex(hex_body)?;
    if bytes.len() < 4 {
        return Err(FrameError::Incomplete);
    }
    scheme.verify(&bytes)?;
    let address = u16::from_be_bytes([bytes[0], bytes[1]]);
    let length = bytes[2];
    let data = bytes[3..bytes.len() - 1].to_vec();
    if data.len() != length as usize {
        return Err(FrameError::Garbled(format!(
            "length field {length} but {} data bytes",
            data.len()
        )));
    }
    Ok(MemoryFrame {
        address,
        length,
        data,
    })
}

/// Decode a cp1252 byte string.
///
/// The five code points cp1252 leaves undefined (0x81, 0x8D, 0x8F, 0x90,
/// 0x9D) are what a port at the wrong speed tends to produce, so they are
/// reported as [`FrameError::Garbled`].
pub fn decode_cp1252(raw: &[u8]) -> Result<String, FrameError> {
    raw.iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize]
                .ok_or_else(|| FrameError::Garbled(format!("undefined cp1252 byte {b:#04x}"))),
            _ => Ok(b as char),
        })
        .collect()
}

/// Encode text as cp1252. Characters cp1252 cannot represent are rejected.
pub fn encode_cp1252(text: &str) -> Result<Vec<u8>, FrameError> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code < 0x80 || (0xA0..=0xFF).contains(&code) {
                return Ok(code as u8);
            }
            CP1252_HIGH
                .iter()
                .position(|&m| m == Some(c))
                .map(|i| 0x80 + i as u8)
                .ok_or_else(|| FrameError::Garbled(format!("{c:?} has no cp1252 encoding")))
        })
        .collect()
}

const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Strip exactly one trailing terminator from a decoded response.
///
/// Fails with [`FrameError::Incomplete`] when the terminator never arrived.
pub fn decode_response<'a>(raw: &'a str, delimiter: Delimiter) -> Result<&'a str, FrameError> {
    raw.strip_suffix(delimiter.terminator)
        .ok_or(FrameError::Incomplete)
}

/// True if a stripped response is one of the radio's refusal tokens.
pub fn is_error_reply(payload: &str) -> bool {
    ERROR_TOKENS.contains(&payload.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -----------------------------------------------------------------------
    // Checksums
    // -----------------------------------------------------------------------

    #[test]
    fn checksum_known_values() {
        // Memory 0 read: address 0x0C00, length 0x40.
        assert_eq!(compute_checksum(&[0x0C, 0x00, 0x40]), 0xB4);
        // Empty payload: sum 0 - 1 = 0xFF, inverted = 0x00.
        assert_eq!(compute_checksum(&[]), 0x00);
        assert_eq!(compute_checksum(&[0x01]), 0xFF);
    }

    #[test]
    fn plain_sum_scheme() {
        assert_eq!(ChecksumScheme::PlainSum.compute(&[0xF0, 0x20]), 0x10);
        ChecksumScheme::PlainSum.verify(&[0xF0, 0x20, 0x10]).unwrap();
    }

    #[test]
    fn verify_reports_residue() {
        let err = ChecksumScheme::InvertedSumMinusOne
            .verify(&[0x0C, 0x00, 0x40, 0xB5])
            .unwrap_err();
        assert_eq!(err, FrameError::ChecksumMismatch { residue: 0x01 });
        assert_eq!(
            ChecksumScheme::InvertedSumMinusOne.verify(&[]),
            Err(FrameError::Incomplete)
        );
    }

    proptest! {
        #[test]
        fn appended_checksum_sums_to_zero(payload in proptest::collection::vec(any::<u8>(), 0..200)) {
            let ck = compute_checksum(&payload);
            let total = payload.iter().fold(ck as u32, |acc, &b| acc + b as u32);
            prop_assert_eq!(total % 256, 0);
            let mut framed = payload.clone();
            framed.push(ck);
            prop_assert!(ChecksumScheme::InvertedSumMinusOne.verify(&framed).is_ok());
        }
    }

    // -----------------------------------------------------------------------
    // Command encoding
    // -----------------------------------------------------------------------

    #[test]
    fn encode_bare_and_with_args() {
        assert_eq!(encode_command("ID", &[], SEMICOLON), b"ID;");
        assert_eq!(encode_command("AI", &["0"], SEMICOLON), b"AI0;");
        assert_eq!(encode_command("KS", &["0", "20"], SEMICOLON), b"KS020;");
    }

    #[test]
    fn encode_with_separator() {
        let d = Delimiter::new("\n", " ");
        assert_eq!(encode_command("FA", &["1", "2", "3"], d), b"FA1 2 3\n");
    }

    #[test]
    fn read_command_frames() {
        assert_eq!(encode_read_command("ER", 0x0C00, 0x40, SEMICOLON), b"ER0c0040b4;");
        // Memory 99: 0x0C00 + 99 * 0x40 = 0x24C0.
        let ck = compute_checksum(&[0x24, 0xC0, 0x40]);
        assert_eq!(
            encode_read_command("ER", 0x24C0, 0x40, SEMICOLON),
            format!("ER24c040{ck:02x};").into_bytes()
        );
    }

    #[test]
    fn write_command_covers_payload() {
        let frame = encode_write_command("EW", 0x0C40, &[0x07, 0x00], SEMICOLON).unwrap();
        let ck = compute_checksum(&[0x0C, 0x40, 0x02, 0x07, 0x00]);
        assert_eq!(frame, format!("EW0c40020700{ck:02x};").into_bytes());
    }

    #[test]
    fn write_rejects_oversized_payload() {
        assert!(encode_write_args(0, &[0u8; 256]).is_err());
    }

    // -----------------------------------------------------------------------
    // Memory frames
    // -----------------------------------------------------------------------

    #[test]
    fn memory_frame_round_trip() {
        let args = encode_write_args(0x0C80, &[1, 2, 3, 4]).unwrap();
        let frame = decode_memory_frame(&args, ChecksumScheme::InvertedSumMinusOne).unwrap();
        assert_eq!(frame.address, 0x0C80);
        assert_eq!(frame.length, 4);
        assert_eq!(frame.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn memory_frame_rejects_bad_checksum_and_hex() {
        assert!(matches!(
            decode_memory_frame("0c0001aa00", ChecksumScheme::InvertedSumMinusOne),
            Err(FrameError::ChecksumMismatch { .. })
        ));
        assert!(matches!(
            decode_memory_frame("zz", ChecksumScheme::InvertedSumMinusOne),
            Err(FrameError::InvalidHex(_))
        ));
        assert_eq!(
            decode_memory_frame("0c00", ChecksumScheme::InvertedSumMinusOne),
            Err(FrameError::Incomplete)
        );
    }

    #[test]
    fn memory_frame_rejects_length_mismatch() {
        // Claims 2 data bytes, carries 1.
        let body = [0x0Cu8, 0x00, 0x02, 0xAA];
        let ck = compute_checksum(&body);
        let text = format!("{}{ck:02x}", hex::encode(body));
        assert!(matches!(
            decode_memory_frame(&text, ChecksumScheme::InvertedSumMinusOne),
            Err(FrameError::Garbled(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Response decoding
    // -----------------------------------------------------------------------

    #[test]
    fn decode_strips_one_terminator() {
        assert_eq!(decode_response("ID017;", SEMICOLON), Ok("ID017"));
        assert_eq!(decode_response("ID017;;", SEMICOLON), Ok("ID017;"));
        assert_eq!(decode_response("ID017", SEMICOLON), Err(FrameError::Incomplete));
    }

    #[test]
    fn error_tokens() {
        assert!(is_error_reply("?"));
        assert!(is_error_reply("N"));
        assert!(is_error_reply("E"));
        assert!(!is_error_reply("ID017"));
    }

    #[test]
    fn cp1252_decodes_printable_and_high_bytes() {
        assert_eq!(decode_cp1252(b"ID017;").unwrap(), "ID017;");
        assert_eq!(decode_cp1252(&[0x80, 0xE9]).unwrap(), "\u{20AC}\u{E9}");
    }

    #[test]
    fn cp1252_undefined_bytes_are_garbled() {
        for b in [0x81u8, 0x8D, 0x8F, 0x90, 0x9D] {
            assert!(matches!(decode_cp1252(&[b]), Err(FrameError::Garbled(_))));
        }
    }

    #[test]
    fn cp1252_encode_round_trip() {
        let text = "W1AW \u{20AC}5 caf\u{E9}";
        assert_eq!(decode_cp1252(&encode_cp1252(text).unwrap()).unwrap(), text);
        assert!(encode_cp1252("\u{4E2D}").is_err());
    }
}
