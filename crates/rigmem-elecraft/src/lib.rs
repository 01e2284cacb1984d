//! Elecraft live-mode memory channel backend for rigmem.
//!
//! K3, K3S, KX3 and KX2 transceivers serve their memory channels one
//! 64-byte EEPROM record at a time over the CAT link. This crate provides:
//!
//! - **Record codec** ([`protocol`]) -- the record layout, frequency and
//!   mode encodings, the label alphabet, and `ER` reply validation.
//! - **Command builders** ([`commands`]) -- checksummed `ER`/`EW` commands.
//! - **Settings** ([`settings`]) -- typed `AI`/`KS`/`PC` settings.
//! - **Model definitions** ([`models`]) -- the supported rigs and the
//!   shared channel map (memories 0-99, then 100 per-band quick memories).
//! - **Radio** ([`radio`]) -- a [`ChannelStore`](rigmem_core::ChannelStore)
//!   over the command link, with a per-session record cache.
//! - **Builder** ([`builder`]) -- negotiates the link and sets up the
//!   connection.
//!
//! The K4 replaced `ER`/`EW` with a different memory command; it connects
//! and takes settings, but its memory channels report unsupported.
//!
//! # Example
//!
//! ```
//! use rigmem_elecraft::commands::cmd_read_memory;
//! use rigmem_elecraft::protocol::decode_record;
//! use rigmem_link::SEMICOLON;
//!
//! // Read memory 0: address 0x0C00, 0x40 bytes, checksum 0xB4.
//! assert_eq!(cmd_read_memory(0).unwrap().encode(SEMICOLON), b"ER0c0040b4;");
//!
//! // An unused slot has 0xFF in its first frequency byte.
//! let mut record = [0u8; 64];
//! record[0] = 0xFF;
//! assert!(decode_record(0, &record).unwrap().empty);
//! ```

pub mod builder;
pub mod commands;
pub mod models;
pub mod protocol;
pub mod radio;
pub mod settings;

// Re-export the primary types for ergonomic `use rigmem_elecraft::*`.
pub use builder::ElecraftBuilder;
pub use models::ElecraftModel;
pub use radio::{ElecraftArray, ElecraftRadio};
pub use settings::{ElecraftSetting, SettingKind};
