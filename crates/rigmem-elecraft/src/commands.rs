//! Elecraft memory command builders.
//!
//! All functions are pure: they build [`Command`]s for a
//! [`CommandChannel`](rigmem_link::CommandChannel) to frame and send.

use rigmem_core::error::{AddressError, Error, Result};
use rigmem_link::Command;
use rigmem_link::protocol::{encode_read_args, encode_write_args};

use crate::protocol::{MEMORY_BASE, READ_COMMAND, RECORD_LEN, WRITE_COMMAND};

/// EEPROM address of memory `number`.
///
/// ```
/// use rigmem_elecraft::commands::record_address;
///
/// assert_eq!(record_address(0).unwrap(), 0x0C00);
/// assert_eq!(record_address(99).unwrap(), 0x24C0);
/// ```
pub fn record_address(number: u32) -> Result<u16> {
    u32::from(MEMORY_BASE)
        .checked_add(number.saturating_mul(RECORD_LEN as u32))
        .and_then(|a| u16::try_from(a).ok())
        .ok_or_else(|| AddressError::UnknownChannel(number.to_string()).into())
}

/// Build a "read memory" command (`ER<addr><len><ck>;`).
pub fn cmd_read_memory(number: u32) -> Result<Command> {
    let address = record_address(number)?;
    Ok(Command::new(READ_COMMAND).arg(encode_read_args(address, RECORD_LEN as u8)))
}

/// Build a "write memory" command (`EW<addr><len><data><ck>;`).
///
/// `record` must be a whole 64-byte record.
pub fn cmd_write_memory(number: u32, record: &[u8]) -> Result<Command> {
    if record.len() != RECORD_LEN {
        return Err(Error::InvalidParameter(format!(
            "memory record is {RECORD_LEN} bytes, got {}",
            record.len()
        )));
    }
    let address = record_address(number)?;
    Ok(Command::new(WRITE_COMMAND).arg(encode_write_args(address, record)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigmem_link::SEMICOLON;

    #[test]
    fn read_memory_zero() {
        let cmd = cmd_read_memory(0).unwrap();
        assert_eq!(cmd.encode(SEMICOLON), b"ER0c0040b4;");
    }

    #[test]
    fn read_quick_memory_follows_memory_99() {
        assert_eq!(record_address(100).unwrap(), 0x2500);
        assert_eq!(record_address(199).unwrap(), 0x3FC0);
        let cmd = cmd_read_memory(100).unwrap();
        assert!(String::from_utf8(cmd.encode(SEMICOLON)).unwrap().starts_with("ER250040"));
    }

    #[test]
    fn address_overflow() {
        assert!(record_address(u32::MAX).is_err());
        assert!(record_address(2000).is_err());
    }

    #[test]
    fn write_memory_frame() {
        let record = [0u8; RECORD_LEN];
        let frame = String::from_utf8(cmd_write_memory(1, &record).unwrap().encode(SEMICOLON)).unwrap();
        assert!(frame.starts_with("EW0c4040"));
        // mnemonic + addr + len + 64 bytes + checksum + terminator
        assert_eq!(frame.len(), 2 + 4 + 2 + 128 + 2 + 1);
        // 0x0C + 0x40 + 0x40 = 0x8C; ((0x8C - 1) ^ 0xFF) = 0x74
        assert!(frame.ends_with("74;"));
    }

    #[test]
    fn write_memory_requires_whole_record() {
        assert!(cmd_write_memory(1, &[0u8; 10]).is_err());
    }
}
