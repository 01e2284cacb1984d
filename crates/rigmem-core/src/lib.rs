//! rigmem-core: Core traits, types, and error definitions for rigmem.
//!
//! This crate defines the radio-agnostic pieces every rigmem driver is
//! built from. Editing applications depend on these types without pulling
//! in a specific radio driver.
//!
//! # Key types
//!
//! - [`ChannelStore`] -- uniform channel access for any radio
//! - [`ChannelRecord`] / [`ChannelAddress`] -- the logical channel model
//! - [`Transport`] -- byte-level communication channel
//! - [`MemoryImage`] / [`StructDef`] -- named field views over a raw image
//! - [`Charset`] -- vendor label alphabets
//! - [`Error`] / [`Result`] -- error handling

pub mod charset;
pub mod error;
pub mod helpers;
pub mod layout;
pub mod store;
pub mod tones;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use rigmem_core::*`.
pub use charset::Charset;
pub use error::{AddressError, BankError, Error, FrameError, LinkError, Result};
pub use helpers::{fix_rounded_step, format_freq_mhz, required_step};
pub use layout::{ArrayDef, FieldDef, FieldKind, FieldView, FieldViewMut, MemoryImage, StructDef};
pub use store::ChannelStore;
pub use tones::{CTCSS_TONES, DTCS_CODES};
pub use transport::Transport;
pub use types::*;
