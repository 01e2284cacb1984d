//! Elecraft memory record codec.
//!
//! K3-family radios expose each memory as a 64-byte EEPROM record at
//! `0x0C00 + number * 0x40`. The `ER` command reads one record and the
//! radio answers with the same hex framing used for writes:
//!
//! ```text
//! ER <addr:4> <len:2> <64 data bytes:128> <ck:2> ;
//! ```
//!
//! 138 characters before the terminator. The checksum makes the byte sum
//! of address, length, data and checksum zero modulo 256.
//!
//! # Record layout
//!
//! | Offset | Len | Field                                            |
//! |--------|-----|--------------------------------------------------|
//! | 0      | 5   | VFO A: MHz, 10 kHz, 100 Hz, 10 Hz, Hz (one byte each) |
//! | 5      | 5   | VFO B, same encoding                             |
//! | 10     | 1   | low nibble VFO A mode, high nibble VFO B mode    |
//! | 11     | 1   | data sub-mode                                    |
//! | 15     | 1   | band                                             |
//! | 16     | 1   | subtone, 1-based index into [`ELECRAFT_TONES`]   |
//! | 32     | 5   | label, indices into [`ELECRAFT_CHARSET`]         |
//! | 37     | 24  | comment, cp1252, padded with `0x00`              |
//!
//! `0xFF` in the first VFO A byte marks an unused memory.

use tracing::{debug, warn};

use rigmem_core::charset::Charset;
use rigmem_core::error::{Error, FrameError, Result};
use rigmem_core::layout::{FieldDef, FieldKind, FieldView, FieldViewMut, StructDef};
use rigmem_core::tones::CTCSS_TONES;
use rigmem_core::types::{ChannelRecord, Duplex, Mode, ToneMode};
use rigmem_link::Reply;
use rigmem_link::protocol::{self as link, ChecksumScheme};

/// Memory read mnemonic.
pub const READ_COMMAND: &str = "ER";
/// Memory write mnemonic.
pub const WRITE_COMMAND: &str = "EW";

/// Address of memory 0.
pub const MEMORY_BASE: u16 = 0x0C00;
/// Bytes per memory record.
pub const RECORD_LEN: usize = 0x40;
pub const NAME_LENGTH: usize = 5;
pub const COMMENT_LENGTH: usize = 24;

/// Checksum used by `ER`/`EW` frames.
pub const RECORD_CHECKSUM: ChecksumScheme = ChecksumScheme::InvertedSumMinusOne;

/// Replies this short carry no record data.
const SHORT_REPLY: usize = 11;

/// Marks an unused memory in the first frequency byte.
const EMPTY_MARKER: u8 = 0xFF;

/// The label alphabet. Index 0 (space) pads short labels.
pub const ELECRAFT_CHARSET: Charset =
    Charset::new(" ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789*+/@_", 0x00, '?');

/// Subtones: the standard CTCSS tones followed by a 1750 Hz burst.
pub const ELECRAFT_TONES: [u16; 51] = elecraft_tones();

const fn elecraft_tones() -> [u16; 51] {
    let mut tones = [17_500u16; 51];
    let mut i = 0;
    while i < CTCSS_TONES.len() {
        tones[i] = CTCSS_TONES[i];
        i += 1;
    }
    tones
}

/// Field map of one 64-byte record.
pub static RECORD: StructDef = StructDef {
    name: "elecraft_memory",
    size: RECORD_LEN,
    fields: &[
        FieldDef::new("vfoa", 0, FieldKind::Bytes { len: 5 }),
        FieldDef::new("vfob", 5, FieldKind::Bytes { len: 5 }),
        FieldDef::new("mode_a", 10, FieldKind::Bits { shift: 0, width: 4 }),
        FieldDef::new("mode_b", 10, FieldKind::Bits { shift: 4, width: 4 }),
        FieldDef::new("data_mode", 11, FieldKind::UInt { width: 1 }),
        FieldDef::new("band", 15, FieldKind::UInt { width: 1 }),
        FieldDef::new("subtone", 16, FieldKind::UInt { width: 1 }),
        FieldDef::new("label", 32, FieldKind::Bytes { len: NAME_LENGTH }),
        FieldDef::new("comment", 37, FieldKind::Bytes { len: COMMENT_LENGTH }),
    ],
};

// ---------------------------------------------------------------
// Field encodings
// ---------------------------------------------------------------

/// Decode a 5-byte frequency. `None` for an unused slot.
///
/// ```
/// use rigmem_elecraft::protocol::decode_freq;
///
/// assert_eq!(decode_freq(&[14, 7, 40, 0, 0]), Some(14_074_000));
/// assert_eq!(decode_freq(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF]), None);
/// ```
pub fn decode_freq(raw: &[u8]) -> Option<u64> {
    let [mhz, tens_khz, hundreds_hz, tens_hz, hz] = <[u8; 5]>::try_from(raw).ok()?;
    if mhz == EMPTY_MARKER {
        return None;
    }
    Some(
        u64::from(mhz) * 1_000_000
            + u64::from(tens_khz) * 10_000
            + u64::from(hundreds_hz) * 100
            + u64::from(tens_hz) * 10
            + u64::from(hz),
    )
}

/// Encode a frequency into the 5-byte record form.
pub fn encode_freq(freq: u64) -> Result<[u8; 5]> {
    let mhz = freq / 1_000_000;
    if mhz >= u64::from(EMPTY_MARKER) {
        return Err(Error::InvalidParameter(format!(
            "frequency {freq} Hz out of range"
        )));
    }
    Ok([
        mhz as u8,
        ((freq / 10_000) % 100) as u8,
        ((freq / 100) % 100) as u8,
        ((freq / 10) % 10) as u8,
        (freq % 10) as u8,
    ])
}

/// Mode for a stored mode nibble. Codes the radio uses for modes a memory
/// editor cannot represent map to [`Mode::Auto`].
pub fn decode_mode(code: u32) -> Mode {
    match code {
        0 => Mode::CW,
        1 => Mode::LSB,
        2 => Mode::USB,
        3 => Mode::Data,
        4 => Mode::AM,
        5 => Mode::FM,
        _ => Mode::Auto,
    }
}

pub fn encode_mode(mode: Mode) -> Option<u32> {
    match mode {
        Mode::CW => Some(0),
        Mode::LSB => Some(1),
        Mode::USB => Some(2),
        Mode::Data => Some(3),
        Mode::AM => Some(4),
        Mode::FM => Some(5),
        _ => None,
    }
}

fn decode_comment(raw: &[u8]) -> String {
    let is_pad = |b: &u8| *b == 0x00 || *b == 0xFF;
    let start = raw.iter().position(|b| !is_pad(b)).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !is_pad(b)).map_or(start, |p| p + 1);
    let text = &raw[start..end];
    link::decode_cp1252(text).unwrap_or_else(|e| {
        warn!(error = %e, "memory comment is not valid cp1252");
        String::from_utf8_lossy(text).into_owned()
    })
}

fn encode_comment(comment: &str) -> Result<Vec<u8>> {
    let mut raw = link::encode_cp1252(comment.trim_end())
        .map_err(|e| Error::InvalidParameter(format!("comment {comment:?}: {e}")))?;
    if raw.len() > COMMENT_LENGTH {
        return Err(Error::InvalidParameter(format!(
            "comment {comment:?} longer than {COMMENT_LENGTH} characters"
        )));
    }
    raw.resize(COMMENT_LENGTH, 0x00);
    Ok(raw)
}

// ---------------------------------------------------------------
// Records
// ---------------------------------------------------------------

/// Decode a 64-byte record into a channel.
///
/// VFO B becomes a split transmit frequency. A set subtone is shown as
/// tone mode so the application displays it.
pub fn decode_record(number: u32, data: &[u8]) -> Result<ChannelRecord> {
    let view = FieldView::over(&RECORD, data)?;
    let mut record = ChannelRecord::empty(number);

    let Some(freq) = decode_freq(view.bytes("vfoa")?) else {
        return Ok(record);
    };
    record.empty = false;
    record.freq = freq;
    record.mode = decode_mode(view.get("mode_a")?);
    record.duplex = Duplex::Split;
    record.offset = decode_freq(view.bytes("vfob")?).map_or(-1, |f| f as i64);
    record.name = ELECRAFT_CHARSET.decode(view.bytes("label")?);

    let subtone = view.get("subtone")? as usize;
    if (1..=ELECRAFT_TONES.len()).contains(&subtone) {
        record.tone_mode = ToneMode::Tone;
        record.tone = ELECRAFT_TONES[subtone - 1];
    }

    record.comment = decode_comment(view.bytes("comment")?);
    Ok(record)
}

/// Apply `record` to a record read from the radio.
///
/// Fields the channel model does not cover (band, VFO B mode, data
/// sub-mode, the reserved bytes) are left as the radio had them. Writing
/// an empty record only marks the slot unused.
pub fn encode_record(record: &ChannelRecord, data: &mut [u8]) -> Result<()> {
    let mut view = FieldViewMut::over(&RECORD, data)?;
    if record.empty {
        return view.set_bytes("vfoa", &[EMPTY_MARKER; 5]);
    }

    view.set_bytes("vfoa", &encode_freq(record.freq)?)?;
    view.set_bytes("vfob", &encode_freq(transmit_freq(record)?)?)?;

    if record.mode != Mode::Auto {
        let code = encode_mode(record.mode).ok_or_else(|| {
            Error::InvalidParameter(format!("mode {} cannot be stored in a memory", record.mode))
        })?;
        view.set("mode_a", code)?;
    }

    view.set_bytes("label", &ELECRAFT_CHARSET.encode(&record.name, NAME_LENGTH)?)?;

    let subtone = match record.tone_mode {
        ToneMode::None => 0,
        ToneMode::Tone => ELECRAFT_TONES
            .iter()
            .position(|&t| t == record.tone)
            .map(|i| i + 1)
            .ok_or_else(|| Error::InvalidParameter(format!("tone {} not supported", record.tone)))?,
        other => {
            return Err(Error::InvalidParameter(format!(
                "tone mode {other} not supported"
            )));
        }
    };
    view.set("subtone", subtone as u32)?;

    view.set_bytes("comment", &encode_comment(&record.comment)?)?;
    Ok(())
}

/// The VFO B frequency implied by a channel's duplex and offset.
fn transmit_freq(record: &ChannelRecord) -> Result<u64> {
    let offset = || {
        u64::try_from(record.offset)
            .map_err(|_| Error::InvalidParameter(format!("offset {} out of range", record.offset)))
    };
    match record.duplex {
        Duplex::Simplex => Ok(record.freq),
        Duplex::Split => offset(),
        Duplex::Plus => Ok(record.freq + offset()?),
        Duplex::Minus => record
            .freq
            .checked_sub(offset()?)
            .ok_or_else(|| Error::InvalidParameter("offset larger than frequency".into())),
    }
}

// ---------------------------------------------------------------
// Replies
// ---------------------------------------------------------------

/// Extract the record data from an `ER` reply.
///
/// `Ok(None)` means the slot reads as empty: the radio refused or sent
/// nothing, the checksum failed, or the reply carried no data. A reply
/// that is not an `ER` frame at all, or answers for another address, is
/// an error.
pub fn decode_read_reply(address: u16, reply: &Reply) -> Result<Option<Vec<u8>>> {
    if reply.is_error() || reply.text.is_empty() {
        warn!(
            address = format_args!("{address:#06x}"),
            reply = %reply.text,
            "radio returned error for memory read"
        );
        return Ok(None);
    }
    if !reply.terminated {
        return Err(FrameError::Incomplete.into());
    }
    let Some(body) = reply.text.strip_prefix(READ_COMMAND) else {
        return Err(Error::Protocol(format!(
            "unexpected reply to memory read: {:?}",
            reply.text
        )));
    };

    let frame = match link::decode_memory_frame(body, RECORD_CHECKSUM) {
        Ok(frame) => frame,
        Err(FrameError::ChecksumMismatch { residue }) => {
            warn!(
                address = format_args!("{address:#06x}"),
                residue = format_args!("{residue:#04x}"),
                "memory record checksum bad"
            );
            return Ok(None);
        }
        Err(FrameError::Incomplete) => {
            debug!(reply = %reply.text, "memory read returned no data");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if reply.text.len() <= SHORT_REPLY || frame.data.len() < RECORD_LEN {
        debug!(reply = %reply.text, "memory read returned no data");
        return Ok(None);
    }
    if frame.address != address {
        return Err(Error::Protocol(format!(
            "memory read for {address:#06x} answered for {:#06x}",
            frame.address
        )));
    }
    Ok(Some(frame.data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigmem_link::protocol::encode_write_args;

    fn sample() -> Vec<u8> {
        let mut data = vec![0u8; RECORD_LEN];
        data[0..5].copy_from_slice(&[14, 7, 40, 0, 0]);
        data[5..10].copy_from_slice(&[14, 7, 90, 0, 0]);
        data[10] = 0x23;
        data[16] = 9;
        // "FT8"
        data[32..35].copy_from_slice(&[6, 20, 35]);
        data[37..50].copy_from_slice(b"watering hole");
        data
    }

    fn reply(text: &str) -> Reply {
        Reply {
            text: text.to_string(),
            terminated: true,
        }
    }

    fn er_reply(address: u16, data: &[u8]) -> Reply {
        reply(&format!("ER{}", encode_write_args(address, data).unwrap()))
    }

    // -----------------------------------------------------------------------
    // Fields
    // -----------------------------------------------------------------------

    #[test]
    fn frequency_bytes() {
        assert_eq!(decode_freq(&[7, 4, 50, 1, 2]), Some(7_045_012));
        assert_eq!(encode_freq(7_045_012).unwrap(), [7, 4, 50, 1, 2]);
        assert_eq!(encode_freq(50_125_000).unwrap(), [50, 12, 50, 0, 0]);
        assert!(encode_freq(255_000_000).is_err());
        assert_eq!(decode_freq(&[1, 2, 3]), None);
    }

    #[test]
    fn mode_codes() {
        assert_eq!(decode_mode(3), Mode::Data);
        assert_eq!(decode_mode(5), Mode::FM);
        assert_eq!(decode_mode(7), Mode::Auto);
        assert_eq!(encode_mode(Mode::AM), Some(4));
        assert_eq!(encode_mode(Mode::NFM), None);
    }

    #[test]
    fn tone_table_ends_with_burst() {
        assert_eq!(ELECRAFT_TONES[0], 670);
        assert_eq!(ELECRAFT_TONES[49], 2541);
        assert_eq!(ELECRAFT_TONES[50], 17_500);
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    #[test]
    fn decode_populated_record() {
        let rec = decode_record(12, &sample()).unwrap();
        assert!(!rec.empty);
        assert_eq!(rec.number, 12);
        assert_eq!(rec.freq, 14_074_000);
        assert_eq!(rec.mode, Mode::Data);
        assert_eq!(rec.duplex, Duplex::Split);
        assert_eq!(rec.offset, 14_079_000);
        assert_eq!(rec.name, "FT8");
        assert_eq!(rec.tone_mode, ToneMode::Tone);
        assert_eq!(rec.tone, 885);
        assert_eq!(rec.comment, "watering hole");
    }

    #[test]
    fn decode_unused_record() {
        let mut data = sample();
        data[0] = 0xFF;
        let rec = decode_record(3, &data).unwrap();
        assert!(rec.empty);
        assert_eq!(rec.number, 3);
    }

    #[test]
    fn subtone_zero_means_no_tone() {
        let mut data = sample();
        data[16] = 0;
        assert_eq!(decode_record(0, &data).unwrap().tone_mode, ToneMode::None);
        data[16] = 51;
        assert_eq!(decode_record(0, &data).unwrap().tone, 17_500);
        data[16] = 52;
        assert_eq!(decode_record(0, &data).unwrap().tone_mode, ToneMode::None);
    }

    #[test]
    fn comment_padding_is_stripped() {
        let mut data = sample();
        data[37..61].fill(0xFF);
        data[38..42].copy_from_slice(b"DX w");
        assert_eq!(decode_record(0, &data).unwrap().comment, "DX w");
    }

    #[test]
    fn encode_preserves_unmodelled_bytes() {
        let mut data = sample();
        data[15] = 0x05;
        data[61] = 0xAB;
        let mut rec = decode_record(0, &data).unwrap();
        rec.freq = 7_074_000;
        rec.offset = 7_074_000;
        rec.mode = Mode::USB;
        rec.name = "WSJT".into();
        rec.tone_mode = ToneMode::None;
        rec.comment = "forty".into();

        encode_record(&rec, &mut data).unwrap();
        assert_eq!(&data[0..5], &[7, 7, 40, 0, 0]);
        assert_eq!(data[10], 0x22);
        assert_eq!(data[15], 0x05);
        assert_eq!(data[16], 0);
        assert_eq!(&data[32..37], &[23, 19, 10, 20, 0]);
        assert_eq!(&data[37..42], b"forty");
        assert!(data[42..61].iter().all(|&b| b == 0));
        assert_eq!(data[61], 0xAB);

        assert_eq!(decode_record(0, &data).unwrap(), rec);
    }

    #[test]
    fn encode_duplex_as_vfo_b() {
        let mut data = sample();
        let mut rec = ChannelRecord::new(0, 29_620_000);
        rec.mode = Mode::FM;
        rec.duplex = Duplex::Minus;
        rec.offset = 100_000;
        encode_record(&rec, &mut data).unwrap();
        assert_eq!(decode_freq(&data[5..10]), Some(29_520_000));

        rec.duplex = Duplex::Simplex;
        encode_record(&rec, &mut data).unwrap();
        assert_eq!(decode_freq(&data[5..10]), Some(29_620_000));
    }

    #[test]
    fn encode_empty_marks_slot_unused() {
        let mut data = sample();
        encode_record(&ChannelRecord::empty(0), &mut data).unwrap();
        assert_eq!(&data[0..5], &[0xFF; 5]);
        assert_eq!(data[16], 9);
        assert!(decode_record(0, &data).unwrap().empty);
    }

    #[test]
    fn encode_rejects_what_the_record_cannot_hold() {
        let mut data = sample();
        let mut rec = decode_record(0, &data).unwrap();
        rec.name = "TOOLONG".into();
        assert!(encode_record(&rec, &mut data).is_err());

        let mut rec = decode_record(0, &data).unwrap();
        rec.name = "lower".into();
        assert!(encode_record(&rec, &mut data).is_err());

        let mut rec = decode_record(0, &data).unwrap();
        rec.tone_mode = ToneMode::Dtcs;
        assert!(encode_record(&rec, &mut data).is_err());

        let mut rec = decode_record(0, &data).unwrap();
        rec.mode = Mode::WFM;
        assert!(encode_record(&rec, &mut data).is_err());

        let mut rec = decode_record(0, &data).unwrap();
        rec.comment = "x".repeat(25);
        assert!(encode_record(&rec, &mut data).is_err());
    }

    // -----------------------------------------------------------------------
    // Replies
    // -----------------------------------------------------------------------

    #[test]
    fn full_reply_yields_record() {
        let reply = er_reply(0x0C40, &sample());
        assert_eq!(reply.text.len(), 138);
        assert_eq!(decode_read_reply(0x0C40, &reply).unwrap(), Some(sample()));
    }

    #[test]
    fn refusals_read_as_empty() {
        for text in ["N", "E", "?", ""] {
            assert_eq!(decode_read_reply(0x0C00, &reply(text)).unwrap(), None, "{text:?}");
        }
        let silent = Reply {
            text: String::new(),
            terminated: false,
        };
        assert_eq!(decode_read_reply(0x0C00, &silent).unwrap(), None);
    }

    #[test]
    fn bad_checksum_reads_as_empty() {
        let mut reply = er_reply(0x0C00, &sample());
        let last = reply.text.len() - 1;
        let flipped = if reply.text.ends_with('0') { "1" } else { "0" };
        reply.text.replace_range(last.., flipped);
        assert_eq!(decode_read_reply(0x0C00, &reply).unwrap(), None);
    }

    #[test]
    fn short_reply_reads_as_empty() {
        let reply = er_reply(0x0C00, &[]);
        assert!(reply.text.len() <= 11);
        assert_eq!(decode_read_reply(0x0C00, &reply).unwrap(), None);
    }

    #[test]
    fn foreign_reply_is_an_error() {
        assert!(matches!(
            decode_read_reply(0x0C00, &reply("FA00014074000")),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            decode_read_reply(0x0C00, &er_reply(0x0C40, &sample())),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            decode_read_reply(0x0C00, &reply("ERzz")),
            Err(Error::Frame(FrameError::InvalidHex(_)))
        ));
    }

    #[test]
    fn partial_reply_is_incomplete() {
        let partial = Reply {
            text: "ER0c0040".into(),
            terminated: false,
        };
        assert!(matches!(
            decode_read_reply(0x0C00, &partial),
            Err(Error::Frame(FrameError::Incomplete))
        ));
    }
}
